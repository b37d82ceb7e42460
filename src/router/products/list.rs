//! List the whole catalog.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::catalog::Product;
use crate::error::Result;

#[derive(Debug, Serialize, Deserialize)]
pub struct Response {
    pub count: usize,
    pub products: Vec<Product>,
}

/// Handler to list products.
pub async fn handler(
    State(state): State<AppState>,
) -> Result<Json<Response>> {
    let products = state.catalog.list().await?;

    Ok(Json(Response {
        count: products.len(),
        products,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::products::tests::seed_product;
    use crate::*;
    use axum::http::{Method, StatusCode};
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn test_list_empty_catalog() {
        let state = router::state();
        let app = app(state);

        let response =
            make_request(app, Method::GET, "/products", None, String::default())
                .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Response = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.count, 0);
        assert!(body.products.is_empty());
    }

    #[tokio::test]
    async fn test_list_returns_catalog_in_order() {
        let state = router::state();
        let app = app(state.clone());

        seed_product(&state, "Apple iPhone 15", 99_999, 50).await;
        seed_product(&state, "Samsung Galaxy S25", 89_999, 40).await;

        let response =
            make_request(app, Method::GET, "/products", None, String::default())
                .await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let body: Response = serde_json::from_slice(&body).unwrap();
        assert_eq!(body.count, 2);
        assert_eq!(body.products[0].name, "Apple iPhone 15");
        assert_eq!(body.products[1].name, "Samsung Galaxy S25");
    }
}
