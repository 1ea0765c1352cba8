//! taggraph-server: HTTP boundary for the tag graph.
//!
//! Translates requests onto the mutation service and recommendation engine
//! and maps their errors onto status codes. Holds no graph state of its own.

pub mod config;
pub mod error;
pub mod routes;

pub use routes::{build_router, AppState};

use tokio::net::TcpListener;

/// Bind `addr` and serve the router until ctrl-c.
pub async fn serve(addr: &str, state: AppState) -> std::io::Result<()> {
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "taggraph listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
