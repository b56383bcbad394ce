use schemaforge::Store;

mod config;
mod database;
mod error;
mod handlers;
mod server;

#[derive(Clone)]
pub struct AppState {
	store: Store,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	dotenvy::dotenv().ok();
	env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

	let config = config::ServerConfig::from_env()?;
	let store = database::initialize(&config).await?;

	server::start_http(&config.server_addr, AppState { store: store.clone() }).await?;

	store.close().await;
	log::info!("store connections closed");
	Ok(())
}
