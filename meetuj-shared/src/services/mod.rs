/// Business operations
///
/// Every operation takes the pool plus the acting account where one is
/// needed, and returns a [`ServiceResult`](crate::error::ServiceResult). The
/// HTTP handlers and the WebSocket dispatcher are thin adapters over these
/// functions.
///
/// - `accounts`: registration, login, profile management
/// - `contacts`: the symmetric contact list
/// - `meetings`: meeting CRUD with the scheduling guard, participants

pub mod accounts;
pub mod contacts;
pub mod meetings;

use serde::Deserialize;

/// Largest page any list operation returns
pub const MAX_PAGE_SIZE: i64 = 100;

/// Skip/limit window for list operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Pagination {
    #[serde(default)]
    pub skip: i64,

    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    MAX_PAGE_SIZE
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: MAX_PAGE_SIZE,
        }
    }
}

impl Pagination {
    /// Clamps to `skip >= 0` and `1 <= limit <= MAX_PAGE_SIZE`
    pub fn clamped(self) -> Self {
        Self {
            skip: self.skip.max(0),
            limit: self.limit.clamp(1, MAX_PAGE_SIZE),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pagination_clamps() {
        let page = Pagination { skip: -5, limit: 10_000 }.clamped();
        assert_eq!(page, Pagination { skip: 0, limit: MAX_PAGE_SIZE });

        let page = Pagination { skip: 20, limit: 0 }.clamped();
        assert_eq!(page.limit, 1);
        assert_eq!(page.skip, 20);
    }

    #[test]
    fn test_pagination_deserialize_defaults() {
        let page: Pagination = serde_json::from_str("{}").unwrap();
        assert_eq!(page, Pagination::default());

        let page: Pagination = serde_json::from_str(r#"{"limit": 5}"#).unwrap();
        assert_eq!(page, Pagination { skip: 0, limit: 5 });
    }
}
