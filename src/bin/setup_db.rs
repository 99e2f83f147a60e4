use interview_tracker::{
    config::Config,
    database::{pool::create_pool, schema::setup_database},
    telemetry::init_tracing,
};
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;
    init_tracing(config.log_format);

    let pool = create_pool(&config).await?;
    info!("Creating tables...");
    if let Err(e) = setup_database(&pool).await {
        tracing::error!(error = %e, "Failed to setup database");
        pool.close().await;
        return Err(e.into());
    }
    pool.close().await;
    Ok(())
}
