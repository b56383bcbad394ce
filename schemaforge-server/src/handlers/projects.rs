use axum::{
	Json,
	extract::{Path, State},
	http::StatusCode,
};
use schemaforge::{NewProject, Project, ProjectPatch};

use crate::{AppState, error::{ApiError, Context}};

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Project>>, ApiError> {
	Ok(Json(state.store.list_projects().await?))
}

pub async fn get(State(state): State<AppState>, Path(id): Path<i64>) -> Result<Json<Project>, ApiError> {
	Ok(Json(state.store.get_project(id).await?))
}

pub async fn create(
	State(state): State<AppState>,
	Json(req): Json<NewProject>,
) -> Result<(StatusCode, Json<Project>), ApiError> {
	let project = state.store.create_project(req).await.context("create project")?;
	Ok((StatusCode::CREATED, Json(project)))
}

pub async fn update(
	State(state): State<AppState>,
	Path(id): Path<i64>,
	Json(patch): Json<ProjectPatch>,
) -> Result<Json<Project>, ApiError> {
	Ok(Json(state.store.update_project(id, patch).await.context("update project")?))
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<i64>) -> Result<StatusCode, ApiError> {
	if !state.store.delete_project(id).await.context("delete project")? {
		return Err(ApiError::NotFound("Project"));
	}
	Ok(StatusCode::NO_CONTENT)
}
