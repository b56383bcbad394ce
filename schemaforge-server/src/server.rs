use axum::{
	Router,
	routing::get,
};
use tower_http::cors::CorsLayer;

use crate::{
	AppState,
	handlers::{databases, fields, general, projects, tables},
};

pub fn router(a_state: AppState) -> Router {
	// Collections answer with and without the trailing slash.
	let api_group = Router::new()
		.route("/database", get(databases::list).post(databases::create))
		.route("/database/", get(databases::list).post(databases::create))
		.route("/project", get(projects::list).post(projects::create))
		.route("/project/", get(projects::list).post(projects::create))
		.route("/project/{id}", get(projects::get).put(projects::update).delete(projects::delete))
		.route("/tables", get(tables::list).post(tables::create))
		.route("/tables/", get(tables::list).post(tables::create))
		.route("/tables/{id}", get(tables::get).put(tables::update).delete(tables::delete))
		.route("/fields", get(fields::list).post(fields::create))
		.route("/fields/", get(fields::list).post(fields::create))
		.route("/fields/{id}", get(fields::get).put(fields::update).delete(fields::delete))
		.route("/generate-sql", get(general::generate_sql))
		.route("/gettablename", get(general::get_table_name))
		.route("/datatype", get(general::list_datatypes));

	// Local design tool: any origin, method and header.
	Router::new()
		.route("/", get(general::root))
		.nest("/api", api_group)
		.layer(CorsLayer::permissive())
		.with_state(a_state)
}

pub async fn start_http(addr: &str, a_state: AppState) -> Result<(), Box<dyn std::error::Error>> {
	let listener = tokio::net::TcpListener::bind(addr).await?;
	log::info!("listening on {}", listener.local_addr()?);

	axum::serve(listener, router(a_state)).with_graceful_shutdown(shutdown_signal()).await?;
	log::info!("http server stopped");
	Ok(())
}

async fn shutdown_signal() {
	if let Err(e) = tokio::signal::ctrl_c().await {
		log::error!("failed to listen for shutdown signal: {}", e);
	}
	log::info!("shutdown requested");
}

#[cfg(test)]
mod tests {
	use axum::{
		body::Body,
		http::{Method, Request, StatusCode, header},
	};
	use schemaforge::Store;
	use serde_json::{Value, json};
	use tower::ServiceExt;

	use super::*;

	async fn app() -> Router {
		let store = Store::builder().max_connections(1).connect("sqlite::memory:").await.unwrap();
		store.bootstrap().await.unwrap();
		router(AppState { store })
	}

	async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
		let mut request = Request::builder().method(method).uri(uri);
		let body = match body {
			Some(json) => {
				request = request.header(header::CONTENT_TYPE, "application/json");
				Body::from(json.to_string())
			}
			None => Body::empty(),
		};

		let response = app.clone().oneshot(request.body(body).unwrap()).await.unwrap();
		let status = response.status();
		let is_json = response
			.headers()
			.get(header::CONTENT_TYPE)
			.is_some_and(|value| value.as_bytes().starts_with(b"application/json"));
		let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();

		// Extractor rejections answer in plain text.
		let value = if bytes.is_empty() {
			Value::Null
		} else if is_json {
			serde_json::from_slice(&bytes).unwrap()
		} else {
			Value::String(String::from_utf8_lossy(&bytes).into_owned())
		};
		(status, value)
	}

	/// Creates a database, a project and a table; returns the table id.
	async fn seed_table(app: &Router, name: &str) -> i64 {
		let (status, database) =
			send(app, Method::POST, "/api/database", Some(json!({ "database_name": "postgres" }))).await;
		assert_eq!(status, StatusCode::CREATED);

		let (status, project) = send(
			app,
			Method::POST,
			"/api/project",
			Some(json!({ "project_name": "shop", "database_id": database["database_id"] })),
		)
		.await;
		assert_eq!(status, StatusCode::CREATED);

		let (status, table) = send(
			app,
			Method::POST,
			"/api/tables",
			Some(json!({ "project_id": project["project_id"], "table_name": name })),
		)
		.await;
		assert_eq!(status, StatusCode::CREATED);
		table["table_id"].as_i64().unwrap()
	}

	#[tokio::test]
	async fn test_root_welcome() {
		let app = app().await;
		let (status, body) = send(&app, Method::GET, "/", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["message"], "Welcome to the Project Manager API!");
	}

	#[tokio::test]
	async fn test_generate_sql_endpoint() {
		let app = app().await;
		let table_id = seed_table(&app, "t").await;

		let (status, field) = send(
			&app,
			Method::POST,
			"/api/fields",
			Some(json!({
				"table_id": table_id,
				"field_name": "id",
				"field_datatype_id": 1,
				"is_primary": true,
				"is_auto_increment": true
			})),
		)
		.await;
		assert_eq!(status, StatusCode::CREATED);
		assert_eq!(field["field_name"], "id");
		assert_eq!(field["is_foreign_key"], false);

		let (status, body) = send(&app, Method::GET, &format!("/api/generate-sql?table_id={table_id}"), None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body, json!({ "query": "CREATE TABLE t (\n  id INTEGER SERIAL PRIMARY KEY\n);" }));

		let (status, body) = send(&app, Method::GET, &format!("/api/gettablename?table_id={table_id}"), None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body, json!({ "table_name": "t" }));

		let (status, body) = send(&app, Method::GET, "/api/generate-sql?table_id=9999", None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["detail"], "Table not found");
	}

	#[tokio::test]
	async fn test_project_update_rules() {
		let app = app().await;
		let (_, database) =
			send(&app, Method::POST, "/api/database", Some(json!({ "database_name": "postgres" }))).await;
		let (_, project) = send(
			&app,
			Method::POST,
			"/api/project",
			Some(json!({
				"project_name": "shop",
				"project_description": "storefront",
				"database_id": database["database_id"]
			})),
		)
		.await;
		let uri = format!("/api/project/{}", project["project_id"]);

		let (status, body) = send(&app, Method::PUT, &uri, Some(json!({}))).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert_eq!(body["detail"], "No valid fields to update");

		let (status, body) = send(&app, Method::PUT, &uri, Some(json!({ "project_name": "X" }))).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["project_name"], "X");
		assert_eq!(body["project_description"], "storefront");

		let (status, body) = send(&app, Method::GET, &uri, None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(body["project_name"], "X");

		let (status, body) = send(&app, Method::PUT, "/api/project/9999", Some(json!({ "project_name": "X" }))).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["detail"], "Project not found");
	}

	#[tokio::test]
	async fn test_delete_status_codes() {
		let app = app().await;
		let table_id = seed_table(&app, "orders").await;
		let uri = format!("/api/tables/{table_id}");

		let (status, body) = send(&app, Method::DELETE, &uri, None).await;
		assert_eq!(status, StatusCode::NO_CONTENT);
		assert_eq!(body, Value::Null);

		let (status, _) = send(&app, Method::GET, &uri, None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);

		let (status, body) = send(&app, Method::DELETE, &uri, None).await;
		assert_eq!(status, StatusCode::NOT_FOUND);
		assert_eq!(body["detail"], "Table not found");
	}

	#[tokio::test]
	async fn test_list_filters_and_catalog() {
		let app = app().await;
		let table_id = seed_table(&app, "orders").await;

		let (status, tables) = send(&app, Method::GET, "/api/tables?project_id=1", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(tables.as_array().map(Vec::len), Some(1));
		assert_eq!(tables[0]["table_id"], table_id);

		let (status, fields) = send(&app, Method::GET, &format!("/api/fields?table_id={table_id}"), None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(fields, json!([]));

		let (status, body) = send(&app, Method::GET, "/api/tables", None).await;
		assert_eq!(status, StatusCode::BAD_REQUEST);
		assert!(body.as_str().is_some_and(|text| text.contains("project_id")), "{body}");

		let (status, datatypes) = send(&app, Method::GET, "/api/datatype", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(datatypes[0]["display_name"], "Integer");
		assert_eq!(datatypes[0]["postgresql"], "INTEGER");
	}

	#[tokio::test]
	async fn test_store_failure_is_server_error() {
		let app = app().await;

		let (status, body) = send(
			&app,
			Method::POST,
			"/api/project",
			Some(json!({ "project_name": "orphan", "database_id": 9999 })),
		)
		.await;
		assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
		assert!(body["detail"].as_str().unwrap().starts_with("Failed to create project: "));
	}

	#[tokio::test]
	async fn test_collections_accept_trailing_slash() {
		let app = app().await;
		let (status, _) =
			send(&app, Method::POST, "/api/database/", Some(json!({ "database_name": "postgres" }))).await;
		assert_eq!(status, StatusCode::CREATED);

		let (status, projects) = send(&app, Method::GET, "/api/project/", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(projects, json!([]));

		let (status, databases) = send(&app, Method::GET, "/api/database", None).await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(databases[0]["database_name"], "postgres");
	}

	#[tokio::test]
	async fn test_table_accepts_datetime_local_input() {
		let app = app().await;
		let table_id = seed_table(&app, "orders").await;

		let (status, table) = send(
			&app,
			Method::PUT,
			&format!("/api/tables/{table_id}"),
			Some(json!({ "is_generated": true, "generated_date": "2024-05-01T10:30" })),
		)
		.await;
		assert_eq!(status, StatusCode::OK);
		assert_eq!(table["is_generated"], true);
		assert_eq!(table["generated_date"], "2024-05-01T10:30:00");

		let (status, table) = send(
			&app,
			Method::POST,
			"/api/tables",
			Some(json!({ "project_id": 1, "table_name": "audit", "generated_date": "2024-05-01T10:30:00Z" })),
		)
		.await;
		assert_eq!(status, StatusCode::CREATED);
		assert_eq!(table["generated_date"], "2024-05-01T10:30:00");
	}

	#[tokio::test]
	async fn test_cors_allows_any_origin() {
		let app = app().await;
		let request = Request::builder()
			.uri("/api/database")
			.header(header::ORIGIN, "http://localhost:5173")
			.body(Body::empty())
			.unwrap();

		let response = app.oneshot(request).await.unwrap();
		assert_eq!(response.status(), StatusCode::OK);
		assert_eq!(response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
	}
}
