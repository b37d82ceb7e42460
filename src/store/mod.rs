//! Storage backends behind async traits.

pub mod memory;
pub mod postgres;

pub use postgres::{
    DEFAULT_CREDENTIALS, DEFAULT_DATABASE_NAME, DEFAULT_POOL_SIZE, PgStore,
};

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRef;
use sqlx::PgPool;
use uuid::Uuid;

use crate::AppState;
use crate::cart::Cart;
use crate::catalog::Product;
use crate::error::Result;
use crate::user::User;

/// Persists user identity records.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a new user. `DuplicateUser` when username or email is taken.
    async fn insert(&self, user: &User) -> Result<()>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>>;

    /// Match `identifier` against username (exact) or email
    /// (case-insensitive).
    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>>;
}

/// Persists product records.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn insert(&self, product: &Product) -> Result<()>;

    /// All products, insertion order.
    async fn list(&self) -> Result<Vec<Product>>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>>;

    async fn count(&self) -> Result<i64>;
}

/// Persists one cart per user.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>>;

    /// Replace the stored cart in full, inserting it if absent.
    async fn upsert(&self, cart: &Cart) -> Result<()>;
}

/// Store handles constructed at startup and injected into services.
#[derive(Clone)]
pub struct Store {
    pub users: Arc<dyn CredentialStore>,
    pub products: Arc<dyn CatalogStore>,
    pub carts: Arc<dyn CartStore>,
}

impl Store {
    /// Bundle backed by PostgreSQL.
    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(postgres::PgStore::new(pool));

        Self {
            users: store.clone(),
            products: store.clone(),
            carts: store,
        }
    }

    /// Bundle backed by process memory.
    pub fn memory() -> Self {
        let store = Arc::new(memory::MemStore::default());

        Self {
            users: store.clone(),
            products: store.clone(),
            carts: store,
        }
    }
}

impl FromRef<AppState> for Store {
    fn from_ref(app_state: &AppState) -> Store {
        app_state.store.clone()
    }
}
