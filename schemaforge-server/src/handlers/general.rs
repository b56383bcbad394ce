use axum::{
	Json,
	extract::{Query, State},
};
use schemaforge::Datatype;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::{AppState, error::{ApiError, Context}};

#[derive(Debug, Deserialize)]
pub struct TableQuery {
	table_id: i64,
}

#[derive(Debug, Serialize)]
pub struct GeneratedSql {
	query: String,
}

#[derive(Debug, Serialize)]
pub struct TableName {
	table_name: String,
}

pub async fn root() -> Json<Value> {
	Json(json!({ "message": "Welcome to the Project Manager API!" }))
}

pub async fn generate_sql(
	State(state): State<AppState>,
	Query(req): Query<TableQuery>,
) -> Result<Json<GeneratedSql>, ApiError> {
	let query = state.store.generate_sql(req.table_id).await.context("generate SQL")?;
	Ok(Json(GeneratedSql { query }))
}

pub async fn get_table_name(
	State(state): State<AppState>,
	Query(req): Query<TableQuery>,
) -> Result<Json<TableName>, ApiError> {
	let table_name = state.store.get_table_name(req.table_id).await?;
	Ok(Json(TableName { table_name }))
}

pub async fn list_datatypes(State(state): State<AppState>) -> Result<Json<Vec<Datatype>>, ApiError> {
	Ok(Json(state.store.list_datatypes().await?))
}
