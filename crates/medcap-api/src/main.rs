use medcap_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (storage, model, routes)
    let (_state, router) = medcap_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    medcap_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
