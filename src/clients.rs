//! Stateless resource clients, one per resource kind.
//!
//! Each client wraps the shared [`RagApi`] and adds the local rules of its
//! resource: input validation that rejects a call before any request is
//! sent, and the confirmation gate in front of deletes. None of them keep
//! data between calls; refreshing what the view shows is the job of
//! [`crate::refresh`].

use std::sync::Arc;

use crate::api::RagApi;
use crate::confirm::Confirm;
use crate::error::{ClientError, Result};
use crate::models::{Document, KnowledgeBase, NewKnowledgeBase, SearchRequest, SearchResult, Stats};

pub const EMPTY_KB_NAME: &str = "Please enter a knowledge base name";
pub const EMPTY_QUERY: &str = "Please enter a search query";

/// Outcome of a gated delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deletion {
    Deleted,
    /// The confirmation was declined; nothing was sent.
    Declined,
}

#[derive(Clone)]
pub struct KnowledgeBaseClient {
    api: Arc<dyn RagApi>,
}

impl KnowledgeBaseClient {
    pub fn new(api: Arc<dyn RagApi>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<KnowledgeBase>> {
        self.api.list_knowledge_bases().await
    }

    pub async fn create(&self, name: &str, description: Option<String>) -> Result<KnowledgeBase> {
        if name.trim().is_empty() {
            return Err(ClientError::validation(EMPTY_KB_NAME));
        }
        self.api
            .create_knowledge_base(&NewKnowledgeBase::new(name, description))
            .await
    }

    pub async fn delete(&self, name: &str, confirm: &dyn Confirm) -> Result<Deletion> {
        let prompt = format!("Are you sure you want to delete knowledge base \"{}\"?", name);
        if !confirm.confirm(&prompt) {
            return Ok(Deletion::Declined);
        }
        self.api.delete_knowledge_base(name).await?;
        Ok(Deletion::Deleted)
    }
}

#[derive(Clone)]
pub struct DocumentClient {
    api: Arc<dyn RagApi>,
}

impl DocumentClient {
    pub fn new(api: Arc<dyn RagApi>) -> Self {
        Self { api }
    }

    pub async fn list(&self) -> Result<Vec<Document>> {
        self.api.list_documents().await
    }

    pub async fn delete(&self, id: &str, confirm: &dyn Confirm) -> Result<Deletion> {
        if !confirm.confirm("Are you sure you want to delete this document?") {
            return Ok(Deletion::Declined);
        }
        self.api.delete_document(id).await?;
        Ok(Deletion::Deleted)
    }
}

#[derive(Clone)]
pub struct SearchClient {
    api: Arc<dyn RagApi>,
    default_knowledge_base: String,
}

impl SearchClient {
    /// `default_knowledge_base` is the sentinel name that means "search the
    /// default scope"; it is sent to the server as `null`.
    pub fn new(api: Arc<dyn RagApi>, default_knowledge_base: impl Into<String>) -> Self {
        Self {
            api,
            default_knowledge_base: default_knowledge_base.into(),
        }
    }

    /// Build the request for a search, or reject it locally.
    pub fn request(
        &self,
        query: &str,
        knowledge_base: Option<&str>,
        limit: u32,
    ) -> Result<SearchRequest> {
        if query.trim().is_empty() {
            return Err(ClientError::validation(EMPTY_QUERY));
        }
        let knowledge_base = knowledge_base
            .filter(|kb| *kb != self.default_knowledge_base)
            .map(str::to_string);
        Ok(SearchRequest {
            query: query.to_string(),
            knowledge_base,
            limit,
        })
    }

    pub async fn send(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        self.api.search(request).await
    }
}

#[derive(Clone)]
pub struct StatsClient {
    api: Arc<dyn RagApi>,
}

impl StatsClient {
    pub fn new(api: Arc<dyn RagApi>) -> Self {
        Self { api }
    }

    pub async fn fetch(&self) -> Result<Stats> {
        self.api.stats().await
    }
}
