//! Carta is a lightweight shopping backend with accounts, a product
//! catalog and per-user carts.

#[forbid(unsafe_code)]
#[deny(missing_docs, unused_mut)]
mod cart;
mod catalog;
mod crypto;
pub mod error;
mod router;
mod store;
pub mod telemetry;
mod token;
mod user;

pub mod config;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Bytes;
use axum::http::{Method, header};
use axum::routing::get;
use error::ServerError;
use rand::distributions::{Alphanumeric, DistString};
use tower::ServiceBuilder;
use tower_http::LatencyUnit;
use tower_http::cors::{Any, CorsLayer};
use tower_http::sensitive_headers::SetSensitiveHeadersLayer;
use tower_http::trace::{
    DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer,
};

/// MUST NEVER be used in production.
#[cfg(test)]
pub async fn make_request(
    app: Router,
    method: Method,
    path: &str,
    token: Option<&str>,
    body: String,
) -> axum::http::Response<axum::body::Body> {
    use axum::extract::Request;
    use tower::util::ServiceExt;

    dbg!(&method, path, &token, &body);

    let mut request = Request::builder()
        .method(method)
        .uri(path)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        request =
            request.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    app.oneshot(request.body(axum::body::Body::from(body)).unwrap())
        .await
        .unwrap()
}

/// State sharing between routes.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Configuration>,
    pub store: store::Store,
    pub users: user::UserService,
    pub catalog: catalog::CatalogService,
    pub cart: cart::CartService,
    pub token: token::TokenManager,
}

/// Create router.
pub fn app(state: AppState) -> Router {
    let middleware = ServiceBuilder::new()
        // Add high level tracing/logging to all requests.
        .layer(
            TraceLayer::new_for_http()
                .on_body_chunk(|chunk: &Bytes, latency: Duration, _span: &tracing::Span| {
                    tracing::trace!(size_bytes = chunk.len(), latency = ?latency, "sending body chunk")
                })
                .make_span_with(DefaultMakeSpan::new().include_headers(true).level(tracing::Level::INFO))
                .on_request(DefaultOnRequest::new())
                .on_response(DefaultOnResponse::new().include_headers(true).latency_unit(LatencyUnit::Micros)),
        )
        // Remove sensitive headers from trace.
        .layer(SetSensitiveHeadersLayer::new([header::AUTHORIZATION, header::COOKIE]))
        // Add CORS preflight support.
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
                .allow_headers(Any)
                .vary([header::AUTHORIZATION]),
        );

    Router::new()
        // `GET /` goes to `welcome`.
        .route("/", get(router::status::welcome))
        // `GET /health` goes to `health`.
        .route("/health", get(router::status::health))
        .nest("/auth", router::auth::router())
        .nest("/products", router::products::router())
        .nest("/cart", router::cart::router(state.clone()))
        .fallback(router::status::fallback)
        .with_state(state)
        .layer(middleware)
}

/// Initialize the application state.
pub async fn initialize_state() -> Result<AppState, Box<dyn std::error::Error>>
{
    // read configuration file.  let it in memory.
    let config = config::Configuration::default().read()?;

    let store = match config.driver {
        config::Driver::Postgres => {
            let Some(postgres) = &config.postgres else {
                tracing::error!(
                    "missing `postgres` entry on `config.yaml` file"
                );
                std::process::exit(0);
            };

            let pool = store::PgStore::connect(
                &postgres.address,
                &postgres
                    .username
                    .clone()
                    .unwrap_or(store::DEFAULT_CREDENTIALS.into()),
                &postgres
                    .password
                    .clone()
                    .unwrap_or(store::DEFAULT_CREDENTIALS.into()),
                &postgres
                    .database
                    .clone()
                    .unwrap_or(store::DEFAULT_DATABASE_NAME.into()),
                postgres.pool_size.unwrap_or(store::DEFAULT_POOL_SIZE),
            )
            .await?;

            // execute migrations scripts on start.
            sqlx::migrate!().run(&pool).await?;

            store::Store::postgres(pool)
        },
        config::Driver::Memory => {
            tracing::warn!("in-memory driver selected, data is lost on restart");
            store::Store::memory()
        },
    };

    let pwd =
        Arc::new(crypto::PasswordManager::new(config.argon2.clone())?);

    // handle jwt.
    let token = config.token.clone().unwrap_or_default();
    let secret = std::env::var("TOKEN_SECRET")
        .ok()
        .or(token.secret)
        .unwrap_or_else(|| {
            tracing::warn!(
                "no token secret configured, sessions will not survive a restart"
            );
            Alphanumeric.sample_string(&mut rand::thread_rng(), 64)
        });
    let token = token::TokenManager::new(&config.url, &secret, token.ttl);

    // seed catalog once the store is reachable.
    let catalog = catalog::CatalogService::new(store.products.clone());
    if let Some(seed) =
        config.catalog.as_ref().and_then(|catalog| catalog.seed.clone())
    {
        catalog.seed(&seed).await?;
    }

    Ok(AppState {
        users: user::UserService::new(store.users.clone(), pwd),
        catalog,
        cart: cart::CartService::new(store.carts.clone(), store.products.clone()),
        token,
        store,
        config,
    })
}
