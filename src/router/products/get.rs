//! Single product details.

use axum::extract::{Path, State};
use axum::Json;

use crate::AppState;
use crate::catalog::Product;
use crate::error::Result;

/// Handler to get one product by id.
pub async fn handler(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<Product>> {
    Ok(Json(state.catalog.get(&product_id).await?))
}
