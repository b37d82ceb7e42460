use axum::extract::{Path, State};
use axum::{Extension, Json};

use crate::AppState;
use crate::cart::Cart;
use crate::error::Result;
use crate::user::User;

/// Handler to remove a product from the cart.
pub async fn handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(product_id): Path<String>,
) -> Result<Json<Cart>> {
    let product_id = super::parse_product_id(product_id)?;

    Ok(Json(state.cart.remove_item(user.id, product_id).await?))
}
