use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::router::auth::{Session, TOKEN_TYPE};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    /// Username or email.
    #[validate(length(min = 1, max = 255))]
    pub identifier: String,
    #[validate(length(min = 1, max = 255))]
    pub password: String,
}

/// Handler to authenticate user.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<Json<Session>> {
    let user = state.users.login(&body.identifier, &body.password).await?;
    let token = state.token.create(&user.id.to_string())?;

    Ok(Json(Session {
        token_type: TOKEN_TYPE.to_owned(),
        token,
        expires_in: state.token.expiration(),
        user,
    }))
}
