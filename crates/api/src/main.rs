use anyhow::Context;

use clientdesk_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    clientdesk_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    tracing::info!(?config, "configuration loaded");

    let app = clientdesk_api::app::build_app(&config)
        .await
        .context("failed to start services")?;

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
