/// Password hashing module using Argon2id
///
/// Every account carries two stored values: an Argon2id PHC string and a
/// 64-character alphanumeric salt. The salt is appended to the plaintext
/// before hashing, so the PHC string (which embeds its own random salt) can
/// only be verified together with the account's stored salt.
///
/// # Security
///
/// - **Algorithm**: Argon2id
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash
///
/// Hashing is deliberately slow. Async callers should run it on the blocking
/// pool (`tokio::task::spawn_blocking`).
///
/// # Example
///
/// ```
/// use meetuj_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hashed = hash_password("super_secret_password_123")?;
/// assert!(verify_password("super_secret_password_123", &hashed.hash, &hashed.salt)?);
/// assert!(!verify_password("wrong_password", &hashed.hash, &hashed.salt)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};
use rand::{distributions::Alphanumeric, Rng};

/// Length of the per-account salt stored next to the hash
pub const SALT_LENGTH: usize = 64;

/// Minimum accepted password length
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Invalid password hash format
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

/// Hash and salt pair as persisted on an account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashedPassword {
    /// Argon2id PHC string
    pub hash: String,

    /// 64 alphanumeric characters
    pub salt: String,
}

/// Generates a fresh account salt from the OS random source
pub fn generate_salt() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(SALT_LENGTH)
        .map(char::from)
        .collect()
}

fn argon2_instance() -> Result<Argon2<'static>, PasswordError> {
    let params = ParamsBuilder::new()
        .m_cost(65536) // 64 MB
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

fn salted(password: &str, salt: &str) -> Vec<u8> {
    let mut input = Vec::with_capacity(password.len() + salt.len());
    input.extend_from_slice(password.as_bytes());
    input.extend_from_slice(salt.as_bytes());
    input
}

/// Hashes a password with a newly generated account salt
///
/// # Returns
///
/// The PHC string and the account salt. Both must be stored.
///
/// Example hash:
/// ```text
/// $argon2id$v=19$m=65536,t=3,p=4$c2FsdHNhbHRzYWx0$hash...
/// ```
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<HashedPassword, PasswordError> {
    let salt = generate_salt();
    let hash = hash_with_salt(password, &salt)?;

    Ok(HashedPassword { hash, salt })
}

/// Hashes a password with an existing account salt
pub fn hash_with_salt(password: &str, salt: &str) -> Result<String, PasswordError> {
    let phc_salt = SaltString::generate(&mut OsRng);

    let password_hash = argon2_instance()?
        .hash_password(&salted(password, salt), &phc_salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(password_hash.to_string())
}

/// Verifies a password against a stored hash and salt
///
/// The comparison is done by the Argon2 verifier in constant time.
///
/// # Returns
///
/// `Ok(true)` if the password matches, `Ok(false)` if it doesn't
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` if the stored hash cannot be parsed
pub fn verify_password(password: &str, hash: &str, salt: &str) -> Result<bool, PasswordError> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    // Parameters are embedded in the hash
    match Argon2::default().verify_password(&salted(password, salt), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

/// Well-formed hash with the production parameters that no password matches
const DECOY_HASH: &str =
    "$argon2id$v=19$m=65536,t=3,p=4$rOU8pacZkkFaPD5xKlZHUA$p9yHLk7FeWbNBGOU8yRTSigp3SQ2lp12saTL0D+Dyas";
const DECOY_SALT: &str = "u8jzPde0IgxLd6GncfBAepfJBd0Kh8oOOL8dKLzdocJ2isAjIhKtJ0RlgLKOmxgJ";

/// Runs one full verification against a hash no account owns
///
/// Used when a login names an unknown email, so that the rejection costs the
/// same Argon2 work as a wrong password. Always `Ok(false)` for a sound build.
pub fn verify_decoy(password: &str) -> Result<bool, PasswordError> {
    verify_password(password, DECOY_HASH, DECOY_SALT)
}

/// Validates password length
///
/// # Example
///
/// ```
/// use meetuj_shared::auth::password::validate_password_length;
///
/// assert!(validate_password_length("long enough").is_ok());
/// assert!(validate_password_length("short").is_err());
/// ```
pub fn validate_password_length(password: &str) -> Result<(), String> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(format!(
            "Password too short. Must be at least {} characters.",
            MIN_PASSWORD_LENGTH
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_format() {
        let hashed = hash_password("test_password_123").expect("Hash should succeed");

        assert!(hashed.hash.starts_with("$argon2id$"));
        assert!(hashed.hash.contains("v=19"));
        assert!(hashed.hash.contains("m=65536"));
        assert!(hashed.hash.contains("t=3"));
        assert!(hashed.hash.contains("p=4"));
    }

    #[test]
    fn test_salt_is_fixed_length_alphanumeric() {
        let salt = generate_salt();
        assert_eq!(salt.len(), SALT_LENGTH);
        assert!(salt.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(generate_salt(), generate_salt());
    }

    #[test]
    fn test_verify_password_correct() {
        let hashed = hash_password("correct_password").unwrap();
        assert!(verify_password("correct_password", &hashed.hash, &hashed.salt).unwrap());
    }

    #[test]
    fn test_single_character_mutation_fails() {
        let password = "correct_password";
        let hashed = hash_password(password).unwrap();

        let mutations = [
            "Correct_password",
            "correct_passwore",
            "correct-password",
            "correct_passwor",
            "correct_password!",
        ];

        for candidate in mutations {
            assert!(
                !verify_password(candidate, &hashed.hash, &hashed.salt).unwrap(),
                "'{}' should not verify",
                candidate
            );
        }
    }

    #[test]
    fn test_verify_with_wrong_salt_fails() {
        let hashed = hash_password("correct_password").unwrap();
        let other_salt = generate_salt();

        assert!(!verify_password("correct_password", &hashed.hash, &other_salt).unwrap());
    }

    #[test]
    fn test_verify_password_invalid_hash() {
        let result = verify_password("password", "invalid_hash", &generate_salt());
        assert!(matches!(result, Err(PasswordError::InvalidHash(_))));
    }

    #[test]
    fn test_decoy_uses_production_parameters() {
        let decoy = PasswordHash::new(DECOY_HASH).unwrap();
        let real_hash = hash_password("any password").unwrap();
        let real = PasswordHash::new(&real_hash.hash).unwrap();

        assert_eq!(decoy.algorithm, real.algorithm);
        assert_eq!(decoy.params.to_string(), real.params.to_string());
        assert_eq!(decoy.hash.map(|h| h.len()), real.hash.map(|h| h.len()));
        assert_eq!(DECOY_SALT.len(), SALT_LENGTH);
    }

    #[test]
    fn test_decoy_never_matches() {
        for password in ["", "password", "correct horse battery"] {
            assert!(!verify_decoy(password).unwrap());
        }
    }

    #[test]
    fn test_hash_verify_roundtrip() {
        for password in ["with spaces", "unicode-密码-パスワード", "with-special-chars!@#$%"] {
            let hashed = hash_password(password).unwrap();
            assert!(verify_password(password, &hashed.hash, &hashed.salt).unwrap());
        }
    }

    #[test]
    fn test_validate_password_length() {
        assert!(validate_password_length("12345678").is_ok());

        let err = validate_password_length("1234567").unwrap_err();
        assert!(err.contains("at least 8 characters"));
    }
}
