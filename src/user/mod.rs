mod service;

pub use service::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User as saved on database.
#[derive(
    Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub username: String,
    /// Stored lowercase.
    pub email: String,
    /// Argon2id PHC string.
    #[serde(skip)]
    pub password: String,
    pub created_at: DateTime<Utc>,
}
