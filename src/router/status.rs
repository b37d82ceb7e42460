//! Public status pages for front-end identification.

use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;

use crate::config::Configuration;

/// Routes exposed by this server, listed on the welcome page and on 404.
const ENDPOINTS: [&str; 9] = [
    "POST /auth/register",
    "POST /auth/login",
    "GET /products",
    "GET /products/{product_id}",
    "GET /cart",
    "POST /cart",
    "PUT /cart/{product_id}",
    "DELETE /cart/{product_id}",
    "GET /health",
];

/// Welcome page body.
#[derive(Serialize)]
pub struct Welcome {
    message: String,
    name: String,
    version: String,
    endpoints: &'static [&'static str],
}

/// Liveness probe body.
#[derive(Serialize)]
pub struct Status {
    status: &'static str,
    name: String,
    version: String,
}

/// Unknown-route body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotFound {
    error: &'static str,
    available_endpoints: &'static [&'static str],
}

/// Public welcome page with the route listing.
pub async fn welcome(
    State(config): State<Arc<Configuration>>,
) -> Json<Welcome> {
    Json(Welcome {
        message: format!("Welcome to the {} API", config.name),
        name: config.name.clone(),
        version: env!("CARGO_PKG_VERSION").into(),
        endpoints: &ENDPOINTS,
    })
}

/// Public server liveness probe.
pub async fn health(State(config): State<Arc<Configuration>>) -> Json<Status> {
    Json(Status {
        status: "ok",
        name: config.name.clone(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

/// Fallback for routes outside the table above.
pub async fn fallback() -> (StatusCode, Json<NotFound>) {
    (
        StatusCode::NOT_FOUND,
        Json(NotFound {
            error: "Route not found",
            available_endpoints: &ENDPOINTS,
        }),
    )
}
