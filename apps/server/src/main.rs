use optica_server::config::AppConfig;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    optica_server::init_tracing();

    info!("Starting optical shop server");

    let config = AppConfig::load()?;
    optica_server::run(config).await
}
