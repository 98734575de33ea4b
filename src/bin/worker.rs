use parley::bootstrap::{build_components, build_worker};
use parley::infrastructure::observability::{TracingConfig, init_tracing};
use parley::presentation::{QueueProvider, load_settings};

/// Standalone consumer. Run exactly one per job queue, with
/// `worker.enabled = false` on every API process sharing that queue.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (environment, settings) = load_settings()?;

    init_tracing(
        &TracingConfig {
            environment: environment.as_str().to_string(),
            level: settings.logging.level.clone(),
            json_format: settings.logging.json,
        },
        "worker",
    );

    settings
        .validate(environment)
        .map_err(|e| anyhow::anyhow!("invalid configuration: {}", e))?;

    if settings.queue.provider == QueueProvider::Memory {
        anyhow::bail!("a standalone worker cannot share an in-process queue; set queue.provider = \"redis\"");
    }

    let components = build_components(&settings).await?;
    let worker = build_worker(&components, &settings);

    tokio::select! {
        _ = worker.run() => {}
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("Shutdown signal received; stopping worker");
        }
    }

    Ok(())
}
