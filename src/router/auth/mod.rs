//! Account-related HTTP API.
pub mod login;
pub mod register;

use axum::Router;
use axum::routing::post;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::user::User;

pub const TOKEN_TYPE: &str = "Bearer";

/// Session issued after registration or login.
#[derive(Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token_type: String,
    pub token: String,
    /// Seconds until the token expires.
    pub expires_in: u64,
    pub user: User,
}

pub fn router() -> Router<AppState> {
    Router::new()
        // `POST /auth/register` goes to `register`.
        .route("/register", post(register::handler))
        // `POST /auth/login` goes to `login`.
        .route("/login", post(login::handler))
}
