use carta::config::DEFAULT_PORT;

#[tokio::main]
async fn main() {
    carta::telemetry::setup_logging();

    let state = match carta::initialize_state().await {
        Ok(state) => state,
        Err(error) => {
            tracing::error!(%error, "cannot initialize server state");
            std::process::exit(0);
        },
    };

    let port = std::env::var("PORT")
        .ok()
        .and_then(|port| port.parse::<u16>().ok())
        .or(state.config.port)
        .unwrap_or(DEFAULT_PORT);

    let listener =
        match tokio::net::TcpListener::bind(("0.0.0.0", port)).await {
            Ok(listener) => listener,
            Err(error) => {
                tracing::error!(%error, port, "cannot bind address");
                std::process::exit(0);
            },
        };

    tracing::info!(port, "server started");

    if let Err(error) = axum::serve(listener, carta::app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(%error, "server stopped unexpectedly");
    }
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        tracing::error!(%error, "cannot listen for the shutdown signal");
        return;
    }

    tracing::info!("shutting down");
}
