use axum::{Json, extract::State, http::StatusCode};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::AppState;
use crate::error::Result;
use crate::router::Valid;
use crate::router::auth::{Session, TOKEN_TYPE};

#[derive(Debug, Serialize, Deserialize, Validate)]
pub struct Body {
    #[validate(
        length(min = 3, max = 30),
        custom(
            function = "crate::router::validate_username",
            message = "Username must be alphanumeric."
        )
    )]
    pub username: String,
    #[validate(email(message = "Email must be formatted."))]
    pub email: String,
    #[validate(length(
        min = 8,
        max = 255,
        message = "Password must contain at least 8 characters."
    ))]
    pub password: String,
}

/// Handler to register user.
pub async fn handler(
    State(state): State<AppState>,
    Valid(body): Valid<Body>,
) -> Result<(StatusCode, Json<Session>)> {
    let user = state
        .users
        .register(&body.username, &body.email, &body.password)
        .await?;
    let token = state.token.create(&user.id.to_string())?;

    Ok((
        StatusCode::CREATED,
        Json(Session {
            token_type: TOKEN_TYPE.to_owned(),
            token,
            expires_in: state.token.expiration(),
            user,
        }),
    ))
}

#[cfg(test)]
pub(super) mod tests {
    use super::*;
    use crate::*;
    use axum::http::Method;
    use http_body_util::BodyExt;
    use serde_json::json;

    #[tokio::test]
    async fn test_register_handler() {
        let state = router::state();
        let app = app(state.clone());

        let response = make_request(
            app,
            Method::POST,
            "/auth/register",
            None,
            json!({
                "username": "ada",
                "email": "Ada@Example.com",
                "password": "enchantress1843",
            })
            .to_string(),
        )
        .await;

        assert_eq!(response.status(), StatusCode::CREATED);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let raw = String::from_utf8(body.to_vec()).unwrap();
        assert!(!raw.contains("password"));

        let session: Session = serde_json::from_slice(&body).unwrap();
        assert_eq!(session.token_type, TOKEN_TYPE);
        assert_eq!(session.expires_in, state.token.expiration());
        assert_eq!(session.user.username, "ada");
        assert_eq!(session.user.email, "ada@example.com");

        let claims = state.token.decode(&session.token).unwrap();
        assert_eq!(claims.sub, session.user.id.to_string());
        assert_eq!(claims.iss, state.config.url);
    }

    #[tokio::test]
    async fn test_register_duplicate_username() {
        let state = router::state();
        let app = app(state.clone());

        let body = json!({
            "username": "ada",
            "email": "ada@example.com",
            "password": "enchantress1843",
        })
        .to_string();

        let response = make_request(
            app.clone(),
            Method::POST,
            "/auth/register",
            None,
            body.clone(),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);

        let response =
            make_request(app, Method::POST, "/auth/register", None, body).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_fields() {
        let state = router::state();
        let app = app(state);

        for body in [
            // malformed email.
            json!({
                "username": "ada",
                "email": "not-an-email",
                "password": "enchantress1843",
            }),
            // password below 8 characters.
            json!({
                "username": "ada",
                "email": "ada@example.com",
                "password": "short",
            }),
            // username with forbidden characters.
            json!({
                "username": "ada lovelace",
                "email": "ada@example.com",
                "password": "enchantress1843",
            }),
        ] {
            let response = make_request(
                app.clone(),
                Method::POST,
                "/auth/register",
                None,
                body.to_string(),
            )
            .await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }
}
