use std::net::SocketAddr;

use tokio::net::TcpListener;

use parley::bootstrap::{build_app_state, build_components, build_worker};
use parley::infrastructure::observability::{TracingConfig, init_tracing};
use parley::presentation::{create_router, load_settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (environment, settings) = load_settings()?;

    init_tracing(
        &TracingConfig {
            environment: environment.as_str().to_string(),
            level: settings.logging.level.clone(),
            json_format: settings.logging.json,
        },
        "api",
    );

    settings
        .validate(environment)
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    let components = build_components(&settings).await?;

    if settings.worker.enabled {
        let worker = build_worker(&components, &settings);
        tokio::spawn(worker.run());
        tracing::info!("Embedded chat worker started");
    } else {
        tracing::info!("Embedded chat worker disabled; expecting an external consumer");
    }

    let router = create_router(build_app_state(&components, &settings));

    let host: std::net::IpAddr = settings.server.host.parse()?;
    let addr = SocketAddr::from((host, settings.server.port));
    tracing::info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
