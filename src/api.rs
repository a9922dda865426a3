//! Remote knowledge-base API.
//!
//! [`RagApi`] is the seam between the orchestration layer and the server.
//! [`HttpApi`] implements it over HTTP with `reqwest`; tests substitute an
//! in-memory implementation.
//!
//! # Endpoints
//!
//! | Method | Path | Body |
//! |--------|------|------|
//! | `GET`    | `/knowledge-bases` | |
//! | `POST`   | `/knowledge-bases` | `{name, description?}` |
//! | `DELETE` | `/knowledge-bases/{name}` | |
//! | `GET`    | `/documents` | |
//! | `POST`   | `/upload` | multipart `file` + `knowledge_base` |
//! | `DELETE` | `/documents/{id}` | |
//! | `POST`   | `/search` | `{query, knowledge_base, limit}` |
//! | `GET`    | `/stats` | |
//! | `GET`    | `/health` | |
//!
//! No request is retried. Without a configured timeout a stalled request
//! waits indefinitely.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::{ClientError, Result};
use crate::models::{
    Document, HealthStatus, KnowledgeBase, NewKnowledgeBase, SearchRequest, SearchResult, Stats,
    UploadFile, UploadReceipt,
};

/// Request/response contract of the remote API.
///
/// Implementations hold no view state; every call stands alone.
#[async_trait]
pub trait RagApi: Send + Sync {
    async fn list_knowledge_bases(&self) -> Result<Vec<KnowledgeBase>>;

    async fn create_knowledge_base(&self, kb: &NewKnowledgeBase) -> Result<KnowledgeBase>;

    async fn delete_knowledge_base(&self, name: &str) -> Result<()>;

    async fn list_documents(&self) -> Result<Vec<Document>>;

    /// Upload one file into the knowledge base named `knowledge_base`.
    async fn upload_document(&self, file: UploadFile, knowledge_base: &str)
        -> Result<UploadReceipt>;

    async fn delete_document(&self, id: &str) -> Result<()>;

    /// Results come back in server order (descending similarity).
    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>>;

    async fn stats(&self) -> Result<Stats>;

    async fn health(&self) -> Result<HealthStatus>;
}

/// [`RagApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

impl HttpApi {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::from_response(status, &body))
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = self.send(request).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl RagApi for HttpApi {
    async fn list_knowledge_bases(&self) -> Result<Vec<KnowledgeBase>> {
        debug!("GET /knowledge-bases");
        self.send_json(self.client.get(self.url("/knowledge-bases")))
            .await
    }

    async fn create_knowledge_base(&self, kb: &NewKnowledgeBase) -> Result<KnowledgeBase> {
        debug!(name = %kb.name, "POST /knowledge-bases");
        self.send_json(self.client.post(self.url("/knowledge-bases")).json(kb))
            .await
    }

    async fn delete_knowledge_base(&self, name: &str) -> Result<()> {
        debug!(name, "DELETE /knowledge-bases/{{name}}");
        let path = format!("/knowledge-bases/{}", urlencoding::encode(name));
        self.send(self.client.delete(self.url(&path))).await?;
        Ok(())
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        debug!("GET /documents");
        self.send_json(self.client.get(self.url("/documents"))).await
    }

    async fn upload_document(
        &self,
        file: UploadFile,
        knowledge_base: &str,
    ) -> Result<UploadReceipt> {
        debug!(filename = %file.filename, knowledge_base, "POST /upload");
        let part = Part::bytes(file.bytes).file_name(file.filename);
        let form = Form::new()
            .part("file", part)
            .text("knowledge_base", knowledge_base.to_string());
        let response = self
            .send(self.client.post(self.url("/upload")).multipart(form))
            .await?;
        // The receipt is informational; a success status is what counts.
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes).unwrap_or_default())
    }

    async fn delete_document(&self, id: &str) -> Result<()> {
        debug!(id, "DELETE /documents/{{id}}");
        let path = format!("/documents/{}", urlencoding::encode(id));
        self.send(self.client.delete(self.url(&path))).await?;
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        debug!(
            query = %request.query,
            knowledge_base = ?request.knowledge_base,
            limit = request.limit,
            "POST /search"
        );
        self.send_json(self.client.post(self.url("/search")).json(request))
            .await
    }

    async fn stats(&self) -> Result<Stats> {
        debug!("GET /stats");
        self.send_json(self.client.get(self.url("/stats"))).await
    }

    async fn health(&self) -> Result<HealthStatus> {
        debug!("GET /health");
        self.send_json(self.client.get(self.url("/health"))).await
    }
}
