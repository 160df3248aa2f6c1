use agency_core::observability::logging::init_telemetry;
use agency_service::{config::Config, services::metrics::init_metrics, Application};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry("info,agency_service=debug");
    init_metrics();

    let config = Config::from_env()?;
    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}
