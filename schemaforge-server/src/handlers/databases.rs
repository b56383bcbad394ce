use axum::{Json, extract::State, http::StatusCode};
use schemaforge::Database;
use serde::Deserialize;

use crate::{AppState, error::{ApiError, Context}};

#[derive(Debug, Deserialize)]
pub struct CreateDatabase {
	database_name: String,
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Database>>, ApiError> {
	Ok(Json(state.store.list_databases().await?))
}

pub async fn create(
	State(state): State<AppState>,
	Json(req): Json<CreateDatabase>,
) -> Result<(StatusCode, Json<Database>), ApiError> {
	let database = state.store.create_database(&req.database_name).await.context("create database")?;
	log::info!("created database {} ({})", database.id, database.name);
	Ok((StatusCode::CREATED, Json(database)))
}
