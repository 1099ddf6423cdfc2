//! In-process organization backend the client tests talk to.

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use connect_core::Session;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Requests seen by the backend
#[derive(Clone, Default)]
pub struct Recorded {
    pub calls: Arc<Mutex<Vec<String>>>,
    pub bodies: Arc<Mutex<Vec<Value>>>,
}

pub async fn spawn() -> (Session, Recorded) {
    let recorded = Recorded::default();
    let app = Router::new()
        .route(
            "/api/external-sources",
            get(list_connectors).post(create_connector),
        )
        .route(
            "/api/external-sources/connectors/{name}",
            axum::routing::delete(delete_connector),
        )
        .route(
            "/api/external-sources/connectors/{name}/config",
            get(get_config).put(put_config),
        )
        .route("/api/external-sources/connectors/{name}/status", get(status))
        .route("/api/external-sources/connectors/{name}/pause", put(pause))
        .route("/api/external-sources/connectors/{name}/resume", put(resume))
        .route("/api/external-sources/plugins", get(plugins))
        .route(
            "/api/external-sources/plugins/{class}/config-defs",
            get(config_defs),
        )
        .route("/api/files", get(files))
        .route("/api/files/upload", post(upload))
        .route("/api/schema-registry/subjects", get(subjects))
        .route(
            "/api/schema-registry/subjects/{subject}/versions",
            post(register_schema),
        )
        .route("/api/schema-registry/health", get(health))
        .route("/api/kafka/topics", get(topics))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (Session::new(addr.to_string()), recorded)
}

async fn list_connectors() -> Json<Value> {
    Json(json!([{
        "name": "orders-src",
        "connectorClass": "org.apache.kafka.connect.file.FileStreamSourceConnector",
        "topics": "orders",
        "state": "RUNNING"
    }]))
}

async fn create_connector(State(rec): State<Recorded>, Json(body): Json<Value>) -> Response {
    let name = body["name"].as_str().unwrap_or_default().to_string();
    rec.bodies.lock().await.push(body);

    if name == "taken" {
        return (
            StatusCode::CONFLICT,
            Json(json!({"error": "Connector taken already exists"})),
        )
            .into_response();
    }
    (
        StatusCode::CREATED,
        Json(json!({"message": format!("Connector {} created", name)})),
    )
        .into_response()
}

async fn delete_connector(State(rec): State<Recorded>, Path(name): Path<String>) -> StatusCode {
    rec.calls.lock().await.push(format!("DELETE {}", name));
    StatusCode::NO_CONTENT
}

async fn get_config(Path(_name): Path<String>) -> Json<Value> {
    Json(json!({
        "connector.class": "org.apache.kafka.connect.file.FileStreamSourceConnector",
        "name": "orders-src",
        "topic": "orders"
    }))
}

async fn put_config(
    State(rec): State<Recorded>,
    Path(name): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    rec.calls.lock().await.push(format!("PUT config {}", name));
    rec.bodies.lock().await.push(body);
    StatusCode::OK
}

async fn status(Path(name): Path<String>) -> Response {
    if name == "missing" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Connector missing not found"})),
        )
            .into_response();
    }
    Json(json!({"name": name, "state": "RUNNING"})).into_response()
}

async fn pause(State(rec): State<Recorded>, Path(name): Path<String>) -> StatusCode {
    rec.calls.lock().await.push(format!("PUT pause {}", name));
    StatusCode::ACCEPTED
}

async fn resume(State(rec): State<Recorded>, Path(name): Path<String>) -> StatusCode {
    rec.calls.lock().await.push(format!("PUT resume {}", name));
    StatusCode::ACCEPTED
}

async fn plugins() -> Json<Value> {
    Json(json!([
        {"clazz": "org.apache.kafka.connect.file.FileStreamSourceConnector", "type": "source", "version": "3.7.0"},
        {"clazz": "org.apache.kafka.connect.mirror.MirrorSourceConnector", "type": "source"}
    ]))
}

async fn config_defs(Path(class): Path<String>) -> Response {
    if class == "io.x.Empty" {
        return (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "application/json")],
            "null",
        )
            .into_response();
    }
    Json(json!([
        {"name": "topic", "required": true, "documentation": "Target topic"},
        {"name": "batch.size", "required": false, "default_value": 2000, "group": "Common", "type": "INT"}
    ]))
    .into_response()
}

async fn files() -> Json<Value> {
    Json(json!([{"name": "lines.txt", "size": 4, "connectPath": "/data/lines.txt"}]))
}

async fn upload(State(rec): State<Recorded>, mut multipart: Multipart) -> Json<Value> {
    let mut file_name = String::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let field_name = field.name().unwrap_or_default().to_string();
        file_name = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.unwrap();
        rec.calls
            .lock()
            .await
            .push(format!("UPLOAD {} {} {}", field_name, file_name, data.len()));
    }
    Json(json!({"message": format!("Uploaded {}", file_name)}))
}

async fn subjects() -> Json<Value> {
    Json(json!(["orders-value"]))
}

async fn register_schema(
    State(rec): State<Recorded>,
    Path(subject): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    rec.calls.lock().await.push(format!("POST schema {}", subject));
    rec.bodies.lock().await.push(body);
    match subject.as_str() {
        "no-id" => Json(json!({"subject": "no-id"})).into_response(),
        "empty-body" => StatusCode::OK.into_response(),
        _ => Json(json!({"id": 7})).into_response(),
    }
}

async fn health() -> Json<Value> {
    Json(json!({"status": "UP"}))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TopicsQuery {
    #[serde(default)]
    include_internal: bool,
}

async fn topics(Query(query): Query<TopicsQuery>) -> Json<Value> {
    if query.include_internal {
        Json(json!(["__consumer_offsets", "orders"]))
    } else {
        Json(json!(["orders"]))
    }
}
