use schemaforge::Store;

use crate::config::ServerConfig;

pub async fn initialize(config: &ServerConfig) -> Result<Store, schemaforge::Error> {
	let store = Store::builder().max_connections(config.max_connections).connect(&config.database_url).await?;
	store.bootstrap().await?;
	Ok(store)
}
