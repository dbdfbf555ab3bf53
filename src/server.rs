use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;

use crate::{config::RelayConfig, handlers, relay::Relay};

pub async fn serve(config: RelayConfig) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!(
        upstream = %config.upstream_url,
        text_model = %config.text_model,
        vision_model = %config.vision_model,
        "Relay configured"
    );

    let router = handlers::build_router(Arc::new(Relay::new(config)));

    // Start server
    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    axum::serve(listener, router.into_make_service())
        .await
        .context("Server error")?;
    Ok(())
}
