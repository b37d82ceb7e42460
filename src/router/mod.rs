//! HTTP routes.

pub mod auth;
pub mod cart;
pub mod products;
pub mod status;

use axum::Json;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError};

use crate::error::{Result, ServerError};

/// JSON body extractor that rejects invalid payloads with the problem-detail
/// shape instead of axum's plain-text rejection.
pub struct Valid<T>(pub T);

impl<T, S> FromRequest<S> for Valid<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self> {
        let Json(body) = Json::<T>::from_request(req, state).await?;
        body.validate()?;

        Ok(Valid(body))
    }
}

/// Check username characters. Length is handled by the derive.
pub fn validate_username(username: &str) -> std::result::Result<(), ValidationError> {
    if username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        Ok(())
    } else {
        Err(ValidationError::new("username"))
    }
}

/// MUST NEVER be used in production.
#[cfg(test)]
pub(crate) fn state() -> crate::AppState {
    use std::sync::Arc;

    use crate::cart::CartService;
    use crate::catalog::CatalogService;
    use crate::config::Configuration;
    use crate::crypto::{PasswordManager, tests::fast_config};
    use crate::store::Store;
    use crate::token::TokenManager;
    use crate::user::UserService;

    let config = Arc::new(Configuration {
        name: "carta".to_owned(),
        url: "https://shop.example.com/".to_owned(),
        ..Default::default()
    });
    let store = Store::memory();
    let pwd = Arc::new(
        PasswordManager::new(Some(fast_config()))
            .expect("cannot build password manager"),
    );

    crate::AppState {
        users: UserService::new(store.users.clone(), pwd),
        catalog: CatalogService::new(store.products.clone()),
        cart: CartService::new(store.carts.clone(), store.products.clone()),
        token: TokenManager::new(&config.url, "test-secret", None),
        store,
        config,
    }
}
