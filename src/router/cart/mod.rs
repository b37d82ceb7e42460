//! Cart-related HTTP API. Authorization required.
mod add;
mod get;
mod remove;
mod update;

use axum::extract::{Request, State};
use axum::http::header;
use axum::response::Response;
use axum::routing::{delete, get, post, put};
use axum::{Router, middleware};
use uuid::Uuid;

use crate::user::User;
use crate::{AppState, ServerError};

const BEARER: &str = "Bearer ";

/// Custom middleware for authentification.
///
/// Attaches the verified [`User`] to request extensions.
async fn auth(
    State(state): State<AppState>,
    mut req: Request,
    next: middleware::Next,
) -> Result<Response, ServerError> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix(BEARER))
        .ok_or(ServerError::Unauthorized)?;

    let claims = state.token.decode(token)?;
    let user_id =
        Uuid::parse_str(&claims.sub).map_err(|_| ServerError::InvalidToken)?;
    let user = state
        .users
        .find(user_id)
        .await?
        .ok_or(ServerError::UserNotFound)?;

    req.extensions_mut().insert::<User>(user);
    Ok(next.run(req).await)
}

fn parse_product_id(raw: String) -> Result<Uuid, ServerError> {
    Uuid::parse_str(&raw).map_err(|_| ServerError::InvalidIdentifier(raw))
}

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        // `GET /cart` goes to `get`.
        .route("/", get(get::handler))
        // `POST /cart` goes to `add`.
        .route("/", post(add::handler))
        // `PUT /cart/:PRODUCT` goes to `update`.
        .route("/{product_id}", put(update::handler))
        // `DELETE /cart/:PRODUCT` goes to `remove`.
        .route("/{product_id}", delete(remove::handler))
        .route_layer(middleware::from_fn_with_state(state, auth))
}
