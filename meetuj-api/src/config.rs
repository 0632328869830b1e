/// Server configuration loaded from environment variables
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 8080)
/// - `CORS_ORIGINS`: comma-separated allowed origins, or `*` (default: `*`)
/// - `JWT_SECRET`: token signing secret, at least 32 characters (required)
/// - `ACCESS_TOKEN_EXPIRE_MINUTES`: token lifetime, at most one year (default: 30)
/// - `IMAGES_DIR`: profile picture directory (default: `images`)
/// - `PARTICIPANT_CHANGES`: `any` or `owner` (default: `any`)
/// - `CHECK_PARTICIPANT_CONFLICTS`: `true`/`false` (default: false)
/// - `LOG_FORMAT`: `json` for JSON logs, anything else for text
///
/// # Example
///
/// ```no_run
/// use meetuj_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Context;
use meetuj_shared::scheduling::{ParticipantPolicy, SchedulingPolicy};

/// Shortest accepted signing secret
pub const MIN_SECRET_LENGTH: usize = 32;

/// Longest accepted token lifetime (one year)
pub const MAX_TOKEN_EXPIRE_MINUTES: i64 = 525_600;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub scheduling: SchedulingPolicy,

    /// Where profile pictures are stored
    pub images_dir: PathBuf,

    pub log_format: LogFormat,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,

    /// Allowed CORS origins; empty means any
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone)]
pub struct AuthConfig {
    /// Signing secret. Keep it out of logs.
    pub jwt_secret: String,

    pub access_token_expire_minutes: i64,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &"<redacted>")
            .field("access_token_expire_minutes", &self.access_token_expire_minutes)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

impl Config {
    /// Loads configuration from the process environment, reading `.env`
    /// first when present
    ///
    /// # Errors
    ///
    /// Fails when a required variable is missing or a value does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from any key lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let database_url =
            lookup("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let jwt_secret =
            lookup("JWT_SECRET").context("JWT_SECRET environment variable is required")?;
        if jwt_secret.len() < MIN_SECRET_LENGTH {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_SECRET_LENGTH);
        }

        let access_token_expire_minutes: i64 =
            parse_or(&lookup, "ACCESS_TOKEN_EXPIRE_MINUTES", 30)?;
        if !(1..=MAX_TOKEN_EXPIRE_MINUTES).contains(&access_token_expire_minutes) {
            anyhow::bail!(
                "ACCESS_TOKEN_EXPIRE_MINUTES must be between 1 and {}",
                MAX_TOKEN_EXPIRE_MINUTES
            );
        }

        let cors_origins = lookup("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty() && *origin != "*")
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        let participant_changes = match lookup("PARTICIPANT_CHANGES") {
            Some(raw) => raw
                .parse::<ParticipantPolicy>()
                .map_err(|e| anyhow::anyhow!("PARTICIPANT_CHANGES: {}", e))?,
            None => ParticipantPolicy::default(),
        };

        let log_format = match lookup("LOG_FORMAT").as_deref().map(str::trim) {
            Some(format) if format.eq_ignore_ascii_case("json") => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            api: ApiConfig {
                host: lookup("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port: parse_or(&lookup, "API_PORT", 8080)?,
                cors_origins,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", 10)?,
            },
            auth: AuthConfig {
                jwt_secret,
                access_token_expire_minutes,
            },
            scheduling: SchedulingPolicy {
                participant_changes,
                check_participant_conflicts: parse_or(&lookup, "CHECK_PARTICIPANT_CONFLICTS", false)?,
            },
            images_dir: PathBuf::from(
                lookup("IMAGES_DIR").unwrap_or_else(|| "images".to_string()),
            ),
            log_format,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value '{}'", key, raw)),
        None => Ok(default),
    }
}
