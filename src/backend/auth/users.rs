/**
 * User Model and Lookups
 *
 * Users are stored through the `Datastore`; these helpers are the only
 * place the auth handlers touch it.
 */

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::backend::store::{Datastore, StoreResult};

/// User struct representing a stored account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    /// Unique user ID (UUID)
    pub id: Uuid,
    /// User email address (unique)
    pub email: String,
    /// Name shown to other users
    pub display_name: String,
    /// Hashed password (bcrypt)
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Build a new account with a fresh id and timestamps
    pub fn new(email: &str, display_name: &str, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            email: email.to_string(),
            display_name: display_name.to_string(),
            password_hash,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Create a new user
///
/// # Returns
/// Created user, or `StoreError::Conflict` if the email is taken
pub async fn create_user(
    store: &dyn Datastore,
    email: &str,
    display_name: &str,
    password_hash: String,
) -> StoreResult<User> {
    let user = User::new(email, display_name, password_hash);
    store.insert_user(&user).await?;
    Ok(user)
}

/// Get user by email
pub async fn get_user_by_email(store: &dyn Datastore, email: &str) -> StoreResult<Option<User>> {
    store.find_user_by_email(email).await
}

/// Get user by ID
pub async fn get_user_by_id(store: &dyn Datastore, id: Uuid) -> StoreResult<Option<User>> {
    store.find_user_by_id(id).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::store::{MemoryStore, StoreError};

    #[tokio::test]
    async fn test_create_and_find_user() {
        let store = MemoryStore::new();
        let user = create_user(&store, "ada@example.com", "Ada", "hash".to_string())
            .await
            .unwrap();

        let by_email = get_user_by_email(&store, "ada@example.com").await.unwrap();
        assert_eq!(by_email.as_ref().map(|u| u.id), Some(user.id));

        let by_id = get_user_by_id(&store, user.id).await.unwrap();
        assert_eq!(by_id.map(|u| u.display_name), Some("Ada".to_string()));
    }

    #[tokio::test]
    async fn test_create_user_duplicate_email() {
        let store = MemoryStore::new();
        create_user(&store, "ada@example.com", "Ada", "hash".to_string())
            .await
            .unwrap();

        let result = create_user(&store, "ada@example.com", "Other", "hash".to_string()).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }
}
