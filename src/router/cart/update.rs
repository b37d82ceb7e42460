use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::cart::Cart;
use crate::error::Result;
use crate::router::Valid;
use crate::user::User;

/// Replacement quantity for one cart line. Zero removes the line.
#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    pub quantity: i32,
}

/// Handler to set the quantity of a product already in the cart.
pub async fn handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(product_id): Path<String>,
    Valid(body): Valid<Body>,
) -> Result<Json<Cart>> {
    let product_id = super::parse_product_id(product_id)?;

    Ok(Json(
        state
            .cart
            .update_item(user.id, product_id, body.quantity)
            .await?,
    ))
}
