mod service;

pub use service::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Product as saved on database.
#[derive(
    Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Price in minor units (cents).
    pub price: i64,
    pub description: Option<String>,
    /// Advisory ceiling on cart quantities. Never decremented, there is no
    /// checkout flow.
    pub stock_quantity: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
