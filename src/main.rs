use std::time::Duration;

use anyhow::Result;
use kubeboard::{
    api::start_server, config::Config, controllers::DeploymentController, logging, Storage,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load()?;
    logging::init(&config.logging);

    tracing::info!("Starting kubeboard control-plane simulator");

    let storage = Storage::new(config.engine.clone());

    // Start deployment controller in background
    if config.engine.reconcile_interval_secs > 0 {
        let interval = Duration::from_secs(config.engine.reconcile_interval_secs);
        let deployment_controller = DeploymentController::new(storage.clone(), interval);
        tokio::spawn(async move {
            deployment_controller.run().await;
        });
    } else {
        tracing::info!("Deployment controller disabled; rollouts converge on restart only");
    }

    tracing::info!("Starting API server on {}:{}", config.server.host, config.server.port);
    start_server(storage, &config.server).await?;

    Ok(())
}
