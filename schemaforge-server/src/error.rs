use axum::{
	Json,
	http::StatusCode,
	response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
	#[error("{0} not found")]
	NotFound(&'static str),
	#[error("{0}")]
	InvalidRequest(String),
	#[error("{0}")]
	ServerError(String),
}

impl ApiError {
	fn from_store(err: schemaforge::Error, prefix: &str) -> Self {
		match err {
			schemaforge::Error::NotFound(kind) => ApiError::NotFound(kind),
			schemaforge::Error::InvalidRequest(msg) => ApiError::InvalidRequest(msg),
			schemaforge::Error::Store(e) => ApiError::ServerError(format!("{}: {}", prefix, e)),
		}
	}
}

impl From<schemaforge::Error> for ApiError {
	fn from(err: schemaforge::Error) -> Self {
		ApiError::from_store(err, "Internal server error")
	}
}

/// Names the failed operation in the detail of a store failure.
pub trait Context<T> {
	fn context(self, action: &str) -> Result<T, ApiError>;
}

impl<T> Context<T> for schemaforge::Result<T> {
	fn context(self, action: &str) -> Result<T, ApiError> {
		self.map_err(|err| ApiError::from_store(err, &format!("Failed to {}", action)))
	}
}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		let status = match self {
			ApiError::NotFound(_) => StatusCode::NOT_FOUND,
			ApiError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
			ApiError::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
		};

		if status.is_server_error() {
			log::error!("{}", self);
		}

		(status, Json(json!({ "detail": self.to_string() }))).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn store_failure() -> schemaforge::Error {
		schemaforge::Error::Store(sqlx::Error::Protocol("FOREIGN KEY constraint failed".to_string()))
	}

	#[test]
	fn store_failures_name_the_operation() {
		let err = Err::<(), _>(store_failure()).context("create project").unwrap_err();
		let detail = err.to_string();
		assert!(detail.starts_with("Failed to create project: "), "{detail}");
		assert!(detail.ends_with("FOREIGN KEY constraint failed"), "{detail}");

		let err = ApiError::from(store_failure());
		assert!(err.to_string().starts_with("Internal server error: "));
	}

	#[test]
	fn context_keeps_client_errors() {
		let err = Err::<(), _>(schemaforge::Error::NotFound("Table")).context("delete table").unwrap_err();
		assert_eq!(err.to_string(), "Table not found");
		assert_eq!(err.into_response().status(), StatusCode::NOT_FOUND);
	}
}
