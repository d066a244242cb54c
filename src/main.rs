use exploding_kittens_backend::{appstate, config::Config, server::Server};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()?;
    log::info!("Starting with {:?}", config);

    let app_state = appstate::new_real_appstate(&config)?;
    Server::run(app_state.clone(), config.port).await?;

    log::info!("Server stopped");
    app_state.shutdown()
}
