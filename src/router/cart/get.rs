use axum::{Extension, Json, extract::State};

use crate::AppState;
use crate::cart::Cart;
use crate::error::Result;
use crate::user::User;

/// Handler to view the cart of the requesting user.
pub async fn handler(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<Cart>> {
    Ok(Json(state.cart.get(user.id).await?))
}
