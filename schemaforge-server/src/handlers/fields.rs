use axum::{
	Json,
	extract::{Path, Query, State},
	http::StatusCode,
};
use schemaforge::{Field, FieldPatch, NewField};
use serde::Deserialize;

use crate::{AppState, error::{ApiError, Context}};

#[derive(Debug, Deserialize)]
pub struct TableFilter {
	table_id: i64,
}

pub async fn list(
	State(state): State<AppState>,
	Query(filter): Query<TableFilter>,
) -> Result<Json<Vec<Field>>, ApiError> {
	Ok(Json(state.store.list_fields(filter.table_id).await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Field>, ApiError> {
	Ok(Json(state.store.get_field(id).await?))
}

pub async fn create(
	State(state): State<AppState>,
	Json(req): Json<NewField>,
) -> Result<(StatusCode, Json<Field>), ApiError> {
	let field = state.store.create_field(req).await.context("create field")?;
	Ok((StatusCode::CREATED, Json(field)))
}

pub async fn update(
	State(state): State<AppState>,
	Path(id): Path<i64>,
	Json(patch): Json<FieldPatch>,
) -> Result<Json<Field>, ApiError> {
	Ok(Json(state.store.update_field(id, patch).await.context("update field")?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, ApiError> {
	if !state.store.delete_field(id).await.context("delete field")? {
		return Err(ApiError::NotFound("Field"));
	}
	Ok(StatusCode::NO_CONTENT)
}
