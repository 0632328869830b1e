//! # Meetuj Shared Library
//!
//! Domain types, persistence and business operations used by the Meetuj API
//! server. Both the HTTP routes and the WebSocket dispatcher call into
//! [`services`], so the two surfaces share one set of rules.
//!
//! ## Module Organization
//!
//! - `auth`: password hashing, bearer tokens, the credential manager
//! - `db`: connection pool and embedded migrations
//! - `models`: accounts, meetings and contact links
//! - `scheduling`: the meeting overlap guard and scheduling policy
//! - `services`: registration, login, contacts, meetings and participants
//! - `error`: the domain error taxonomy

pub mod auth;
pub mod db;
pub mod error;
pub mod models;
pub mod scheduling;
pub mod services;

/// Current version of the Meetuj shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}
