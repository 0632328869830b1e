/// Domain error taxonomy shared by the HTTP and WebSocket surfaces
///
/// | Variant             | Meaning                                             |
/// |---------------------|-----------------------------------------------------|
/// | `InvalidCredential` | bad/expired/malformed token, wrong password         |
/// | `NotFound`          | unknown account or meeting                          |
/// | `Conflict`          | duplicate email/contact/participant, non-owner edit |
/// | `ScheduleConflict`  | new or moved meeting overlaps an owned meeting      |
/// | `InvalidInput`      | malformed email, short password, bad duration       |
///
/// Everything else (database, hashing, task join failures) is internal.

use std::fmt;

use crate::auth::credentials::CredentialError;
use crate::auth::jwt::JwtError;
use crate::auth::password::PasswordError;
use crate::scheduling::ScheduleConflict;

/// Result alias for service operations
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Kind of entity named in a `NotFound` error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Account,
    Meeting,
    Contact,
    Participant,
    ProfilePicture,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityKind::Account => "Account",
            EntityKind::Meeting => "Meeting",
            EntityKind::Contact => "Contact",
            EntityKind::Participant => "Participant",
            EntityKind::ProfilePicture => "Profile picture",
        };
        f.write_str(name)
    }
}

/// Error returned by business operations
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Invalid credential: {0}")]
    InvalidCredential(#[from] CredentialError),

    #[error("{entity} {id} not found")]
    NotFound { entity: EntityKind, id: String },

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    ScheduleConflict(#[from] ScheduleConflict),

    #[error("{0}")]
    InvalidInput(String),

    #[error("Password operation failed: {0}")]
    Password(#[from] PasswordError),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServiceError {
    pub fn not_found(entity: EntityKind, id: impl fmt::Display) -> Self {
        ServiceError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<JwtError> for ServiceError {
    fn from(err: JwtError) -> Self {
        match err {
            JwtError::CreateError(msg) => ServiceError::Internal(msg),
            other => ServiceError::InvalidCredential(CredentialError::Token(other)),
        }
    }
}

/// Maps store errors, turning unique and check violations into domain errors
impl From<sqlx::Error> for ServiceError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(ref db_err) = err {
            match db_err.constraint() {
                Some("accounts_email_key") => {
                    return ServiceError::Conflict("Email already registered".to_string());
                }
                Some("contact_links_pkey") => {
                    return ServiceError::Conflict("Contact already in your contact list".to_string());
                }
                Some("contact_links_no_self") => {
                    return ServiceError::InvalidInput("Cannot add yourself as a contact".to_string());
                }
                Some("meeting_participants_pkey") => {
                    return ServiceError::Conflict("Account already participates in this meeting".to_string());
                }
                _ => {}
            }
        }

        ServiceError::Database(err)
    }
}

impl From<tokio::task::JoinError> for ServiceError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServiceError::Internal(format!("Blocking task failed: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = ServiceError::not_found(EntityKind::Meeting, "42");
        assert_eq!(err.to_string(), "Meeting 42 not found");
    }

    #[test]
    fn test_credential_errors_convert() {
        assert!(matches!(
            ServiceError::from(CredentialError::WrongPassword),
            ServiceError::InvalidCredential(CredentialError::WrongPassword)
        ));
    }

    #[test]
    fn test_jwt_errors_split_between_credential_and_internal() {
        assert!(matches!(
            ServiceError::from(JwtError::Expired),
            ServiceError::InvalidCredential(_)
        ));
        assert!(matches!(
            ServiceError::from(JwtError::CreateError("bad key".into())),
            ServiceError::Internal(_)
        ));
    }

    #[test]
    fn test_row_not_found_is_database_error() {
        assert!(matches!(
            ServiceError::from(sqlx::Error::RowNotFound),
            ServiceError::Database(_)
        ));
    }
}
