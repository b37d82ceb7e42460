//! In-memory storage backend.
//!
//! Backs the test suite and local development without a PostgreSQL
//! instance. Data lives for the process only.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::cart::Cart;
use crate::catalog::Product;
use crate::error::{Result, ServerError};
use crate::store::{CartStore, CatalogStore, CredentialStore};
use crate::user::User;

/// Process-memory implementation of every store trait.
#[derive(Clone, Default)]
pub struct MemStore {
    users: Arc<RwLock<HashMap<Uuid, User>>>,
    products: Arc<RwLock<Vec<Product>>>,
    carts: Arc<RwLock<HashMap<Uuid, Cart>>>,
}

#[async_trait]
impl CredentialStore for MemStore {
    async fn insert(&self, user: &User) -> Result<()> {
        let mut users = self.users.write().await;

        let taken = users.values().any(|existing| {
            existing.username == user.username || existing.email == user.email
        });
        if taken {
            return Err(ServerError::DuplicateUser);
        }

        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        let email = identifier.to_lowercase();
        let users = self.users.read().await;

        Ok(users
            .values()
            .find(|user| user.username == identifier || user.email == email)
            .cloned())
    }
}

#[async_trait]
impl CatalogStore for MemStore {
    async fn insert(&self, product: &Product) -> Result<()> {
        self.products.write().await.push(product.clone());
        Ok(())
    }

    async fn list(&self) -> Result<Vec<Product>> {
        Ok(self.products.read().await.clone())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self
            .products
            .read()
            .await
            .iter()
            .find(|product| product.id == id)
            .cloned())
    }

    async fn count(&self) -> Result<i64> {
        Ok(self.products.read().await.len() as i64)
    }
}

#[async_trait]
impl CartStore for MemStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>> {
        Ok(self.carts.read().await.get(&user_id).cloned())
    }

    async fn upsert(&self, cart: &Cart) -> Result<()> {
        self.carts.write().await.insert(cart.user_id, cart.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(username: &str, email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            username: username.into(),
            email: email.into(),
            password: "$argon2id$stub".into(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_duplicate_user_rejected() {
        let store = MemStore::default();

        CredentialStore::insert(&store, &user("ada", "ada@example.com"))
            .await
            .unwrap();
        assert!(matches!(
            CredentialStore::insert(&store, &user("ada", "other@example.com"))
                .await,
            Err(ServerError::DuplicateUser)
        ));
        assert!(matches!(
            CredentialStore::insert(&store, &user("grace", "ada@example.com"))
                .await,
            Err(ServerError::DuplicateUser)
        ));
    }

    #[tokio::test]
    async fn test_find_by_identifier() {
        let store = MemStore::default();
        CredentialStore::insert(&store, &user("ada", "ada@example.com"))
            .await
            .unwrap();

        let by_username = store.find_by_identifier("ada").await.unwrap();
        assert!(by_username.is_some());

        // Email matching ignores case.
        let by_email = store.find_by_identifier("ADA@Example.Com").await.unwrap();
        assert!(by_email.is_some());

        let missing = store.find_by_identifier("grace").await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_cart_upsert_replaces() {
        let store = MemStore::default();
        let user_id = Uuid::new_v4();

        let mut cart = Cart::new(user_id);
        store.upsert(&cart).await.unwrap();

        cart.total_amount = 500;
        store.upsert(&cart).await.unwrap();

        let stored = store.find_by_user(user_id).await.unwrap().unwrap();
        assert_eq!(stored.id, cart.id);
        assert_eq!(stored.total_amount, 500);
    }
}
