//! Motorpool HTTP server creation and serving.
use axum::{routing::get, Router};
use motorpool_service::ReservationService;
use tokio::signal;
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub service: ReservationService,
}

fn make_app() -> Result<Router<AppState>, crate::Error> {
    let app = Router::new()
        .route("/healthcheck", get(|| async { "ok" }))
        .merge(crate::api::router());

    Ok(app)
}

/// Serves the motorpool API on the given listener forever using the
/// supplied reservation service.
pub async fn serve_blocking(
    listener: std::net::TcpListener,
    service: ReservationService,
) -> Result<(), crate::Error> {
    let state = AppState { service };

    info!("starting server");

    axum::Server::from_tcp(listener)?
        .serve(make_app()?.with_state(state).into_make_service())
        .with_graceful_shutdown(shutdown())
        .await?;

    Ok(())
}

async fn shutdown() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("Cannot install handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    println!("\nShutting down the server.")
}
