//! PostgreSQL storage backend.

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use crate::cart::{Cart, CartItem};
use crate::catalog::Product;
use crate::error::{Result, ServerError};
use crate::store::{CartStore, CatalogStore, CredentialStore};
use crate::user::User;

pub const DEFAULT_CREDENTIALS: &str = "postgres";
pub const DEFAULT_DATABASE_NAME: &str = "carta";
pub const DEFAULT_POOL_SIZE: u32 = 10;

/// PostgreSQL-backed implementation of every store trait.
#[derive(Clone)]
pub struct PgStore {
    pool: Pool<Postgres>,
}

impl PgStore {
    /// Create a new [`PgStore`] over an existing pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Init database connection pool.
    pub async fn connect(
        hostname: &str,
        username: &str,
        password: &str,
        db: &str,
        pool: u32,
    ) -> std::result::Result<PgPool, sqlx::Error> {
        let addr = format!("postgres://{username}:{password}@{hostname}/{db}");
        let pool = PgPoolOptions::new().max_connections(pool);
        let postgres = pool.connect(&addr).await?;

        tracing::info!(%hostname, %db, "postgres connected");

        Ok(postgres)
    }
}

#[async_trait]
impl CredentialStore for PgStore {
    async fn insert(&self, user: &User) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO users (id, username, email, password, created_at)
                VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                ServerError::DuplicateUser
            },
            _ => err.into(),
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, username, email, password, created_at
                FROM users WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_identifier(&self, identifier: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"SELECT id, username, email, password, created_at
                FROM users WHERE username = $1 OR email = LOWER($1)"#,
        )
        .bind(identifier)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn insert(&self, product: &Product) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO products
                (id, name, price, description, stock_quantity, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5, $6, $7)"#,
        )
        .bind(product.id)
        .bind(&product.name)
        .bind(product.price)
        .bind(&product.description)
        .bind(product.stock_quantity)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list(&self) -> Result<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            r#"SELECT id, name, price, description, stock_quantity, created_at, updated_at
                FROM products ORDER BY created_at"#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        let product = sqlx::query_as::<_, Product>(
            r#"SELECT id, name, price, description, stock_quantity, created_at, updated_at
                FROM products WHERE id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(product)
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar(r#"SELECT COUNT(*) FROM products"#)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

#[async_trait]
impl CartStore for PgStore {
    async fn find_by_user(&self, user_id: Uuid) -> Result<Option<Cart>> {
        let cart = sqlx::query_as::<_, Cart>(
            r#"SELECT id, user_id, total_amount, created_at, updated_at
                FROM carts WHERE user_id = $1"#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut cart) = cart else {
            return Ok(None);
        };

        cart.items = sqlx::query_as::<_, CartItem>(
            r#"SELECT product_id, quantity, unit_price
                FROM cart_items WHERE cart_id = $1 ORDER BY position"#,
        )
        .bind(cart.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(cart))
    }

    async fn upsert(&self, cart: &Cart) -> Result<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"INSERT INTO carts (id, user_id, total_amount, created_at, updated_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (id) DO UPDATE
                SET total_amount = $3, updated_at = $5"#,
        )
        .bind(cart.id)
        .bind(cart.user_id)
        .bind(cart.total_amount)
        .bind(cart.created_at)
        .bind(cart.updated_at)
        .execute(&mut *tx)
        .await?;

        sqlx::query(r#"DELETE FROM cart_items WHERE cart_id = $1"#)
            .bind(cart.id)
            .execute(&mut *tx)
            .await?;

        for (position, item) in cart.items.iter().enumerate() {
            sqlx::query(
                r#"INSERT INTO cart_items (cart_id, product_id, quantity, unit_price, position)
                    VALUES ($1, $2, $3, $4, $5)"#,
            )
            .bind(cart.id)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }
}
