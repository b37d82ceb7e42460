//! Catalog-related HTTP API.
mod get;
mod list;

use axum::Router;
use axum::routing::get;

use crate::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        // `GET /products` goes to `list`.
        .route("/", get(list::handler))
        // `GET /products/:ID` goes to `get`.
        .route("/{product_id}", get(get::handler))
}

#[cfg(test)]
pub(super) mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use crate::AppState;
    use crate::catalog::Product;

    /// Insert a product directly into the state's store.
    pub(crate) async fn seed_product(
        state: &AppState,
        name: &str,
        price: i64,
        stock: i32,
    ) -> Product {
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            name: name.into(),
            price,
            description: None,
            stock_quantity: stock,
            created_at: now,
            updated_at: now,
        };
        state.store.products.insert(&product).await.unwrap();
        product
    }
}
