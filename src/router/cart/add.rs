use axum::{Extension, Json, extract::State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use crate::cart::Cart;
use crate::error::Result;
use crate::router::Valid;
use crate::user::User;

/// Add-to-cart request body.
///
/// Quantity bounds are owned by the cart service.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Body {
    pub product_id: Uuid,
    pub quantity: i32,
}

/// Handler to add a product to the cart, merging with any existing line.
pub async fn handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Valid(body): Valid<Body>,
) -> Result<Json<Cart>> {
    Ok(Json(
        state
            .cart
            .add_item(user.id, body.product_id, body.quantity)
            .await?,
    ))
}
