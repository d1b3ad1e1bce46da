use picbox_core::Config;
use picbox_infra::LogFormat;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let config = Config::from_env()?;

    let format = match config.log_format() {
        Some(raw) => raw.parse::<LogFormat>().map_err(anyhow::Error::msg)?,
        None => LogFormat::for_environment(config.is_production()),
    };
    picbox_infra::init_telemetry(
        picbox_api::constants::SERVICE_NAME,
        config.environment(),
        format,
    )
    .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    let (_state, router) = picbox_api::setup::initialize_app(config.clone()).await?;

    picbox_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
