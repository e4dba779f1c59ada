use anyhow::Context;

use keystone_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    keystone_observability::init();

    let config = AppConfig::from_env().context("invalid configuration")?;
    let bind_addr = config.bind_addr;

    let services = keystone_api::app::services::build_services(config).await?;
    let app = keystone_api::app::build_app(services);

    let listener = tokio::net::TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("failed to bind {bind_addr}"))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
