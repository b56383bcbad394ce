use axum::{
	Json,
	extract::{Path, Query, State},
	http::StatusCode,
};
use schemaforge::{NewTable, Table, TablePatch};
use serde::Deserialize;

use crate::{AppState, error::{ApiError, Context}};

#[derive(Debug, Deserialize)]
pub struct ProjectFilter {
	project_id: i64,
}

pub async fn list(
	State(state): State<AppState>,
	Query(filter): Query<ProjectFilter>,
) -> Result<Json<Vec<Table>>, ApiError> {
	Ok(Json(state.store.list_tables(filter.project_id).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Table>, ApiError> {
	Ok(Json(state.store.get_table(id).await?))
}

pub async fn create(
	State(state): State<AppState>,
	Json(req): Json<NewTable>,
) -> Result<(StatusCode, Json<Table>), ApiError> {
	let table = state.store.create_table(req).await.context("create table")?;
	Ok((StatusCode::CREATED, Json(table)))
}

pub async fn update(
	State(state): State<AppState>,
	Path(id): Path<i64>,
	Json(patch): Json<TablePatch>,
) -> Result<Json<Table>, ApiError> {
	Ok(Json(state.store.update_table(id, patch).await.context("update table")?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, ApiError> {
	if !state.store.delete_table(id).await.context("delete table")? {
		return Err(ApiError::NotFound("Table"));
	}
	Ok(StatusCode::NO_CONTENT)
}
