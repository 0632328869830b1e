/// Database models for Meetuj
///
/// # Models
///
/// - `account`: registered accounts and credential columns
/// - `meeting`: scheduled meetings and their participant sets
/// - `contact`: mutual contact links between accounts
///
/// # Example
///
/// ```no_run
/// use meetuj_shared::models::account::Account;
/// use meetuj_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let first_page = Account::list(&pool, 20, 0).await?;
/// println!("{} accounts", first_page.len());
/// # Ok(())
/// # }
/// ```

pub mod account;
pub mod contact;
pub mod meeting;
