//! In-process stand-in for the knowledge-base API, served on an ephemeral
//! port. State is inspectable so tests can assert on what the client sent.

#![allow(dead_code)]

use axum::extract::{Multipart, Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

const STAMP: &str = "2025-01-01T10:00:00";

#[derive(Default)]
pub struct MockState {
    pub knowledge_bases: Vec<Value>,
    pub documents: Vec<Value>,
    pub total_vectors: u64,
    pub search_results: Vec<Value>,
    /// Raw JSON bodies received on `/search`.
    pub search_requests: Vec<Value>,
    /// `(filename, knowledge_base)` per upload request, in arrival order.
    pub uploads: Vec<(String, String)>,
    /// Filenames answered with a 400.
    pub reject_uploads: Vec<String>,
    /// Answer `/stats` with a bare 500.
    pub fail_stats: bool,
    next_id: u64,
}

type Shared = Arc<Mutex<MockState>>;

pub struct MockServer {
    /// Origin without the `/api/rag` prefix, e.g. `http://127.0.0.1:41234`.
    pub origin: String,
    pub base_url: String,
    state: Shared,
}

impl MockServer {
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState::default()));
        state
            .lock()
            .unwrap()
            .knowledge_bases
            .push(kb_json("default", None));

        let api = Router::new()
            .route("/knowledge-bases", get(list_kbs).post(create_kb))
            .route("/knowledge-bases/{name}", delete(delete_kb))
            .route("/documents", get(list_docs))
            .route("/documents/{id}", delete(delete_doc))
            .route("/upload", post(upload))
            .route("/search", post(search))
            .route("/stats", get(stats))
            .route("/health", get(health))
            .with_state(state.clone());
        let app = Router::new().nest("/api/rag", api);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let origin = format!("http://{}", addr);
        Self {
            base_url: format!("{}/api/rag", origin),
            origin,
            state,
        }
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut MockState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }
}

pub fn kb_json(name: &str, description: Option<&str>) -> Value {
    json!({
        "id": format!("kb-{}", name),
        "name": name,
        "description": description,
        "schema_name": format!("kb_{}", name.replace('-', "_")),
        "is_active": true,
        "created_at": STAMP,
        "updated_at": STAMP,
    })
}

pub fn doc_json(id: &str, filename: &str, size: usize) -> Value {
    let file_type = filename
        .rsplit_once('.')
        .map(|(_, ext)| format!(".{}", ext))
        .unwrap_or_default();
    json!({
        "id": id,
        "filename": filename,
        "file_type": file_type,
        "file_size": size,
        "is_processed": true,
        "created_at": STAMP,
        "updated_at": STAMP,
    })
}

pub fn hit_json(id: &str, filename: &str, text: &str, similarity: f64) -> Value {
    json!({
        "id": id,
        "chunk_text": text,
        "metadata": {"source": filename},
        "chunk_index": 0,
        "filename": filename,
        "file_type": ".md",
        "similarity": similarity,
    })
}

fn detail(status: StatusCode, text: impl Into<String>) -> Response {
    (status, Json(json!({ "detail": text.into() }))).into_response()
}

async fn list_kbs(State(state): State<Shared>) -> Json<Value> {
    Json(Value::Array(state.lock().unwrap().knowledge_bases.clone()))
}

async fn create_kb(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let name = body["name"].as_str().unwrap_or_default().to_string();
    let description = body.get("description").and_then(Value::as_str);

    let mut st = state.lock().unwrap();
    if st.knowledge_bases.iter().any(|kb| kb["name"] == name.as_str()) {
        return detail(
            StatusCode::BAD_REQUEST,
            format!("Knowledge base '{}' already exists", name),
        );
    }
    let kb = kb_json(&name, description);
    st.knowledge_bases.push(kb.clone());
    Json(kb).into_response()
}

async fn delete_kb(State(state): State<Shared>, Path(name): Path<String>) -> Response {
    let mut st = state.lock().unwrap();
    let before = st.knowledge_bases.len();
    st.knowledge_bases.retain(|kb| kb["name"] != name.as_str());
    if st.knowledge_bases.len() == before {
        return detail(StatusCode::NOT_FOUND, "Knowledge base not found");
    }
    Json(json!({ "message": format!("Knowledge base '{}' deleted successfully", name) }))
        .into_response()
}

async fn list_docs(State(state): State<Shared>) -> Json<Value> {
    Json(Value::Array(state.lock().unwrap().documents.clone()))
}

async fn delete_doc(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut st = state.lock().unwrap();
    let before = st.documents.len();
    st.documents.retain(|doc| doc["id"] != id.as_str());
    if st.documents.len() == before {
        return detail(StatusCode::NOT_FOUND, "Document not found");
    }
    st.total_vectors = st.total_vectors.saturating_sub(1);
    Json(json!({ "message": "Document deleted successfully" })).into_response()
}

async fn upload(State(state): State<Shared>, mut multipart: Multipart) -> Response {
    let mut filename = String::new();
    let mut knowledge_base = "default".to_string();
    let mut size = 0;
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                filename = field.file_name().unwrap_or_default().to_string();
                size = field.bytes().await.unwrap().len();
            }
            Some("knowledge_base") => knowledge_base = field.text().await.unwrap(),
            _ => {}
        }
    }

    let mut st = state.lock().unwrap();
    st.uploads.push((filename.clone(), knowledge_base));
    if st.reject_uploads.contains(&filename) {
        return detail(
            StatusCode::BAD_REQUEST,
            format!("Unsupported file type: {}", filename),
        );
    }
    st.next_id += 1;
    let id = format!("doc-{}", st.next_id);
    st.documents.push(doc_json(&id, &filename, size));
    st.total_vectors += 1;
    Json(json!({
        "document_id": id,
        "filename": filename,
        "status": "success",
        "message": "Document uploaded and processed successfully",
    }))
    .into_response()
}

async fn search(State(state): State<Shared>, Json(body): Json<Value>) -> Json<Value> {
    let mut st = state.lock().unwrap();
    st.search_requests.push(body);
    Json(Value::Array(st.search_results.clone()))
}

async fn stats(State(state): State<Shared>) -> Response {
    let st = state.lock().unwrap();
    if st.fail_stats {
        return (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response();
    }
    Json(json!({
        "vectorstore": {
            "collection": { "name": "ai_cs" },
            "total_vectors": st.total_vectors,
        }
    }))
    .into_response()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "database": "connected" }))
}
