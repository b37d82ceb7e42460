//! Error handler for carta.

use axum::extract::rejection::JsonRejection;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use sqlx::Error as SQLxError;
use thiserror::Error;
use uuid::Uuid;
use validator::ValidationErrors;

pub type Result<T> = std::result::Result<T, ServerError>;

/// Enum representing server-side errors.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("validation error occurred")]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Axum(#[from] JsonRejection),

    #[error("SQL request failed: {0}")]
    Sql(#[from] SQLxError),

    #[error(transparent)]
    Crypto(#[from] crate::crypto::CryptoError),

    #[error("a user with this username or email already exists")]
    DuplicateUser,

    #[error("invalid username/email or password")]
    InvalidCredentials,

    #[error("invalid 'Authorization' header")]
    Unauthorized,

    #[error("token signature or format is invalid")]
    InvalidToken,

    #[error("token has expired")]
    ExpiredToken,

    #[error("token subject no longer exists")]
    UserNotFound,

    #[error("'{0}' is not a valid identifier")]
    InvalidIdentifier(String),

    #[error("quantity {0} is out of range")]
    InvalidQuantity(i32),

    #[error("product {0} does not exist")]
    ProductNotFound(Uuid),

    #[error("no cart exists for this user")]
    CartNotFound,

    #[error("product {0} has no line item in this cart")]
    ItemNotFound(Uuid),

    #[error("{requested} requested but only {available} in stock")]
    InsufficientStock { available: i32, requested: i32 },

    #[error("internal server error, {details}")]
    Internal { details: String },
}

impl From<jsonwebtoken::errors::Error> for ServerError {
    fn from(error: jsonwebtoken::errors::Error) -> Self {
        match error.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => ServerError::ExpiredToken,
            _ => ServerError::InvalidToken,
        }
    }
}

/// Structure for detailed error responses.
#[derive(Debug, Serialize)]
pub struct ResponseError {
    r#type: Option<String>,
    title: String,
    status: u16,
    detail: String,
    instance: Option<String>,
    errors: Option<Vec<FieldError>>,
}

impl ResponseError {
    /// Update error status code.
    pub fn status(mut self, code: StatusCode) -> Self {
        self.status = code.as_u16();
        self
    }

    /// Update `title` field.
    pub fn title(mut self, title: &str) -> Self {
        self.title = title.into();
        self
    }

    /// Add detailed error.
    pub fn details(mut self, description: &str) -> Self {
        self.detail = description.into();
        self
    }

    /// Automatically add errors field.
    pub fn errors(mut self, errors: &ValidationErrors) -> Self {
        self.errors = Some(parse_validation_errors(errors));
        self
    }

    /// Transform [`ResponseError`] into axum [`Response`].
    pub fn into_response(self) -> std::result::Result<Response, axum::http::Error> {
        if let Ok(body) = serde_json::to_string(&self) {
            Response::builder()
                .status(self.status)
                .header(header::CONTENT_TYPE, "application/json")
                .body(body.into())
        } else {
            Ok(internal_server_error())
        }
    }
}

impl Default for ResponseError {
    fn default() -> Self {
        Self {
            r#type: None,
            title: "Internal server error.".to_owned(),
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            detail: String::default(),
            instance: None,
            errors: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct FieldError {
    field: String,
    message: String,
}

fn parse_validation_errors(errors: &ValidationErrors) -> Vec<FieldError> {
    errors
        .field_errors()
        .iter()
        .flat_map(|(field, issues)| {
            issues.iter().map(move |issue| FieldError {
                field: field.to_string(),
                message: issue.to_string(),
            })
        })
        .collect()
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let response = ResponseError::default()
            .details(&self.to_string())
            .status(StatusCode::BAD_REQUEST);

        let response = match &self {
            ServerError::Validation(validation_errors) => response
                .title("There were validation errors with your request.")
                .errors(validation_errors),

            ServerError::Axum(rejection) => response
                .title("Request body could not be read.")
                .details(&rejection.body_text()),

            ServerError::DuplicateUser => {
                response.title("A user with this username or email already exists.")
            }

            ServerError::InvalidCredentials => {
                response.title("Invalid username/email or password.")
            }

            ServerError::Unauthorized => response
                .title("Missing or invalid 'Authorization' header.")
                .status(StatusCode::UNAUTHORIZED),

            ServerError::InvalidToken | ServerError::ExpiredToken => response
                .title("Session token was rejected.")
                .status(StatusCode::UNAUTHORIZED),

            ServerError::UserNotFound => response
                .title("Token subject no longer exists.")
                .status(StatusCode::UNAUTHORIZED),

            ServerError::InvalidIdentifier(_) => response.title("Malformed identifier."),

            ServerError::InvalidQuantity(_) => response.title("Quantity is out of range."),

            ServerError::ProductNotFound(_) => response
                .title("Product not found.")
                .status(StatusCode::NOT_FOUND),

            ServerError::CartNotFound => response
                .title("Cart not found.")
                .status(StatusCode::NOT_FOUND),

            ServerError::ItemNotFound(_) => response
                .title("Product not found in cart.")
                .status(StatusCode::NOT_FOUND),

            ServerError::InsufficientStock { .. } => response.title("Insufficient stock."),

            ServerError::Sql(err) => {
                tracing::error!(error = %err, "store request failed");

                ResponseError::default()
            }

            ServerError::Crypto(err) => {
                tracing::error!(error = %err, "crypto failure");

                ResponseError::default()
            }

            ServerError::Internal { details } => {
                tracing::error!(%details, "server returned 500 status");

                ResponseError::default()
            }
        };

        response
            .into_response()
            .unwrap_or_else(|_| internal_server_error())
    }
}

fn internal_server_error() -> Response {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(
            serde_json::json!({
                "type": null,
                "title": "Internal server error.",
                "status": StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
                "detail": null,
                "instance": null,
                "errors": null,
            })
            .to_string()
            .into(),
        )
        .unwrap_or_else(|_| Response::new("Internal server error".into()))
}
