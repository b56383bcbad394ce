use std::env;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use thiserror::Error;

/// Everything but RFC 3986 unreserved characters is escaped in URL parts.
const URL_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'.').remove(b'_').remove(b'~');

#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("invalid value for {name}: {value:?}")]
	Invalid { name: &'static str, value: String },
}

/// Process settings, read once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
	pub database_url: String,
	pub max_connections: u32,
	pub server_addr: String,
}

impl ServerConfig {
	pub fn from_env() -> Result<Self, ConfigError> {
		Self::from_lookup(|key| env::var(key).ok())
	}

	/// Builds the config from any key lookup.
	///
	/// `DATABASE_URL` wins; otherwise a PostgreSQL URL is assembled from the
	/// libpq-style `PG*` variables.
	pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
		let database_url = match lookup("DATABASE_URL") {
			Some(url) => url,
			None => postgres_url(&lookup)?,
		};

		let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
			Some(value) => match value.parse::<u32>() {
				Ok(max) if max > 0 => max,
				_ => return Err(ConfigError::Invalid { name: "DATABASE_MAX_CONNECTIONS", value }),
			},
			None => 10,
		};

		let server_addr = lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8000".to_string());

		Ok(Self { database_url, max_connections, server_addr })
	}
}

fn postgres_url(lookup: &impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
	let host = lookup("PGHOST").unwrap_or_else(|| "localhost".to_string());
	let port = match lookup("PGPORT") {
		Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid { name: "PGPORT", value })?,
		None => 5432,
	};

	let mut url = String::from("postgres://");
	if let Some(user) = lookup("PGUSER") {
		url.extend(utf8_percent_encode(&user, URL_COMPONENT));
		if let Some(password) = lookup("PGPASSWORD") {
			url.push(':');
			url.extend(utf8_percent_encode(&password, URL_COMPONENT));
		}
		url.push('@');
	}
	url.push_str(&format!("{}:{}", host, port));
	if let Some(database) = lookup("PGDATABASE") {
		url.push('/');
		url.extend(utf8_percent_encode(&database, URL_COMPONENT));
	}
	Ok(url)
}
