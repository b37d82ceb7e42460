mod service;

pub use service::*;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Cart as saved on database. One per user.
#[derive(
    Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: Uuid,
    pub user_id: Uuid,
    /// Insertion-ordered, at most one item per product.
    #[sqlx(skip)]
    pub items: Vec<CartItem>,
    /// Derived: Σ quantity × unit_price. Recomputed before every persist.
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One entry in a cart for a single product.
#[derive(
    Clone, Debug, PartialEq, Serialize, Deserialize, sqlx::FromRow,
)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub product_id: Uuid,
    pub quantity: i32,
    /// Captured from the product at add time, refreshed on merge.
    pub unit_price: i64,
}

impl Cart {
    /// Create an empty cart for `user_id`.
    pub fn new(user_id: Uuid) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            user_id,
            items: Vec::new(),
            total_amount: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Line item for `product_id`, if any.
    pub fn item(&self, product_id: Uuid) -> Option<&CartItem> {
        self.items.iter().find(|item| item.product_id == product_id)
    }

    pub fn item_mut(&mut self, product_id: Uuid) -> Option<&mut CartItem> {
        self.items
            .iter_mut()
            .find(|item| item.product_id == product_id)
    }

    /// Recompute the derived total and bump `updated_at`.
    pub fn refresh(&mut self) {
        self.total_amount = self
            .items
            .iter()
            .map(|item| i64::from(item.quantity) * item.unit_price)
            .sum();
        self.updated_at = Utc::now();
    }
}
