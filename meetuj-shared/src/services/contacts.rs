/// Contact list operations
///
/// Links are symmetric: adding B to A's contacts also adds A to B's, and
/// removal drops both directions.

use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::error::{EntityKind, ServiceError, ServiceResult};
use crate::models::account::Account;
use crate::models::contact::ContactLink;

fn reject_self_link(account_id: Uuid, contact_id: Uuid) -> ServiceResult<()> {
    if account_id == contact_id {
        return Err(ServiceError::InvalidInput(
            "Cannot add yourself as a contact".to_string(),
        ));
    }
    Ok(())
}

/// Contacts of an account, ordered by email
pub async fn list_contacts(pool: &PgPool, account_id: Uuid) -> ServiceResult<Vec<Account>> {
    Ok(ContactLink::list_contacts(pool, account_id).await?)
}

/// Links two accounts and returns the new contact
///
/// # Errors
///
/// - `InvalidInput` when linking an account to itself
/// - `NotFound` when the contact account does not exist
/// - `Conflict` when the accounts are already linked
pub async fn add_contact(
    pool: &PgPool,
    account_id: Uuid,
    contact_id: Uuid,
) -> ServiceResult<Account> {
    reject_self_link(account_id, contact_id)?;

    let contact = Account::find_by_id(pool, contact_id)
        .await?
        .ok_or_else(|| ServiceError::not_found(EntityKind::Account, contact_id))?;

    let mut tx = pool.begin().await?;

    if ContactLink::exists(&mut *tx, account_id, contact_id).await? {
        return Err(ServiceError::Conflict(
            "Contact already in your contact list".to_string(),
        ));
    }

    ContactLink::link(&mut *tx, account_id, contact_id).await?;
    tx.commit().await?;

    info!(%account_id, %contact_id, "Contact added");
    Ok(contact)
}

/// Unlinks two accounts
///
/// # Errors
///
/// - `InvalidInput` when the contact is the actor itself
/// - `NotFound` when no link exists
pub async fn remove_contact(pool: &PgPool, account_id: Uuid, contact_id: Uuid) -> ServiceResult<()> {
    reject_self_link(account_id, contact_id)?;

    let mut tx = pool.begin().await?;
    let removed = ContactLink::unlink(&mut *tx, account_id, contact_id).await?;

    if removed == 0 {
        return Err(ServiceError::not_found(EntityKind::Contact, contact_id));
    }

    tx.commit().await?;

    info!(%account_id, %contact_id, "Contact removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_link_rejected() {
        let id = Uuid::new_v4();
        assert!(matches!(
            reject_self_link(id, id),
            Err(ServiceError::InvalidInput(_))
        ));
        assert!(reject_self_link(id, Uuid::new_v4()).is_ok());
    }
}
