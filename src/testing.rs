//! In-memory [`RagApi`] used by unit tests.

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use reqwest::StatusCode;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{Barrier, Notify};

use crate::api::RagApi;
use crate::error::{ClientError, Result};
use crate::models::{
    Document, HealthStatus, KnowledgeBase, NewKnowledgeBase, SearchRequest, SearchResult, Stats,
    UploadFile, UploadReceipt, VectorstoreStats,
};

#[derive(Default)]
pub struct Calls {
    pub list_kbs: AtomicUsize,
    pub create_kb: AtomicUsize,
    pub delete_kb: AtomicUsize,
    pub list_docs: AtomicUsize,
    pub upload: AtomicUsize,
    pub delete_doc: AtomicUsize,
    pub search: AtomicUsize,
    pub stats: AtomicUsize,
}

impl Calls {
    pub fn total(&self) -> usize {
        [
            &self.list_kbs,
            &self.create_kb,
            &self.delete_kb,
            &self.list_docs,
            &self.upload,
            &self.delete_doc,
            &self.search,
            &self.stats,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }
}

#[derive(Default)]
struct Store {
    kbs: Vec<KnowledgeBase>,
    docs: Vec<Document>,
    vectors: u64,
    next_id: u64,
}

/// Fake server state. Uploads whose filename is in `reject_files` fail with
/// a 400; searches return `search_results[query]`, optionally after waiting
/// on the gate registered for that query.
#[derive(Default)]
pub struct FakeApi {
    pub calls: Calls,
    store: Mutex<Store>,
    reject_files: Mutex<HashSet<String>>,
    search_results: Mutex<HashMap<String, Vec<SearchResult>>>,
    search_gates: Mutex<HashMap<String, Arc<Notify>>>,
    pub search_requests: Mutex<Vec<SearchRequest>>,
    pub upload_targets: Mutex<Vec<(String, String)>>,
    fail_all: Mutex<Option<String>>,
    upload_gate: Mutex<Option<Arc<Barrier>>>,
    load_gate: Mutex<Option<Arc<Barrier>>>,
}

pub fn ts() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap()
}

pub fn kb(name: &str) -> KnowledgeBase {
    KnowledgeBase {
        id: format!("kb-{}", name),
        name: name.to_string(),
        description: None,
        schema_name: format!("kb_{}", name.replace('-', "_")),
        is_active: true,
        created_at: ts(),
        updated_at: ts(),
    }
}

pub fn hit(id: &str, similarity: f64) -> SearchResult {
    SearchResult {
        id: id.to_string(),
        chunk_text: format!("chunk {}", id),
        metadata: serde_json::json!({}),
        chunk_index: 0,
        filename: "policy.md".to_string(),
        file_type: "md".to_string(),
        similarity,
    }
}

impl FakeApi {
    pub fn new() -> Arc<Self> {
        let api = Self::default();
        api.store.lock().unwrap().kbs.push(kb("default"));
        Arc::new(api)
    }

    pub fn with_knowledge_base(self: &Arc<Self>, name: &str) -> Arc<Self> {
        self.store.lock().unwrap().kbs.push(kb(name));
        self.clone()
    }

    pub fn reject_file(&self, filename: &str) {
        self.reject_files
            .lock()
            .unwrap()
            .insert(filename.to_string());
    }

    pub fn set_search_results(&self, query: &str, results: Vec<SearchResult>) {
        self.search_results
            .lock()
            .unwrap()
            .insert(query.to_string(), results);
    }

    /// Make searches for `query` wait until the returned handle is notified.
    pub fn gate_search(&self, query: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.search_gates
            .lock()
            .unwrap()
            .insert(query.to_string(), gate.clone());
        gate
    }

    /// Make every subsequent call fail with a 500 carrying `detail`.
    pub fn fail_everything(&self, detail: &str) {
        *self.fail_all.lock().unwrap() = Some(detail.to_string());
    }

    /// Hold every upload until `n` of them are in flight at once.
    pub fn gate_uploads(&self, n: usize) {
        *self.upload_gate.lock().unwrap() = Some(Arc::new(Barrier::new(n)));
    }

    /// Hold the knowledge-base, document and stats reads until all three
    /// are in flight at once.
    pub fn gate_loads(&self) {
        *self.load_gate.lock().unwrap() = Some(Arc::new(Barrier::new(3)));
    }

    pub fn document_count(&self) -> usize {
        self.store.lock().unwrap().docs.len()
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    async fn wait_on(gate: &Mutex<Option<Arc<Barrier>>>) {
        let barrier = gate.lock().unwrap().clone();
        if let Some(barrier) = barrier {
            barrier.wait().await;
        }
    }

    fn check_failure(&self) -> Result<()> {
        match self.fail_all.lock().unwrap().as_ref() {
            Some(detail) => Err(ClientError::Api {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                detail: detail.clone(),
            }),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl RagApi for FakeApi {
    async fn list_knowledge_bases(&self) -> Result<Vec<KnowledgeBase>> {
        self.calls.list_kbs.fetch_add(1, Ordering::SeqCst);
        Self::wait_on(&self.load_gate).await;
        self.check_failure()?;
        Ok(self.store.lock().unwrap().kbs.clone())
    }

    async fn create_knowledge_base(&self, new_kb: &NewKnowledgeBase) -> Result<KnowledgeBase> {
        self.calls.create_kb.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        let mut store = self.store.lock().unwrap();
        if store.kbs.iter().any(|k| k.name == new_kb.name) {
            return Err(ClientError::Api {
                status: StatusCode::BAD_REQUEST,
                detail: format!("Knowledge base '{}' already exists", new_kb.name),
            });
        }
        let mut created = kb(&new_kb.name);
        created.description = new_kb.description.clone();
        store.kbs.push(created.clone());
        Ok(created)
    }

    async fn delete_knowledge_base(&self, name: &str) -> Result<()> {
        self.calls.delete_kb.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        let mut store = self.store.lock().unwrap();
        let before = store.kbs.len();
        store.kbs.retain(|k| k.name != name);
        if store.kbs.len() == before {
            return Err(ClientError::Api {
                status: StatusCode::NOT_FOUND,
                detail: "Knowledge base not found".to_string(),
            });
        }
        Ok(())
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        self.calls.list_docs.fetch_add(1, Ordering::SeqCst);
        Self::wait_on(&self.load_gate).await;
        self.check_failure()?;
        Ok(self.store.lock().unwrap().docs.clone())
    }

    async fn upload_document(
        &self,
        file: UploadFile,
        knowledge_base: &str,
    ) -> Result<UploadReceipt> {
        self.calls.upload.fetch_add(1, Ordering::SeqCst);
        self.upload_targets
            .lock()
            .unwrap()
            .push((file.filename.clone(), knowledge_base.to_string()));
        Self::wait_on(&self.upload_gate).await;
        self.check_failure()?;
        if self.reject_files.lock().unwrap().contains(&file.filename) {
            return Err(ClientError::Api {
                status: StatusCode::BAD_REQUEST,
                detail: "No text content extracted from file".to_string(),
            });
        }
        let mut store = self.store.lock().unwrap();
        store.next_id += 1;
        let id = format!("doc-{}", store.next_id);
        store.docs.push(Document {
            id: id.clone(),
            filename: file.filename.clone(),
            file_type: file
                .filename
                .rsplit('.')
                .next()
                .unwrap_or_default()
                .to_string(),
            file_size: file.bytes.len() as u64,
            is_processed: true,
            created_at: ts(),
            updated_at: ts(),
        });
        store.vectors += 1;
        Ok(UploadReceipt {
            document_id: Some(id),
            filename: file.filename,
            status: "uploaded".to_string(),
            message: "File uploaded and 1 chunks ingested into vectorstore.".to_string(),
        })
    }

    async fn delete_document(&self, id: &str) -> Result<()> {
        self.calls.delete_doc.fetch_add(1, Ordering::SeqCst);
        self.check_failure()?;
        let mut store = self.store.lock().unwrap();
        let before = store.docs.len();
        store.docs.retain(|d| d.id != id);
        if store.docs.len() == before {
            return Err(ClientError::Api {
                status: StatusCode::NOT_FOUND,
                detail: "Document not found".to_string(),
            });
        }
        store.vectors = store.vectors.saturating_sub(1);
        Ok(())
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchResult>> {
        self.calls.search.fetch_add(1, Ordering::SeqCst);
        self.search_requests.lock().unwrap().push(request.clone());
        let gate = self.search_gates.lock().unwrap().get(&request.query).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check_failure()?;
        Ok(self
            .search_results
            .lock()
            .unwrap()
            .get(&request.query)
            .cloned()
            .unwrap_or_default())
    }

    async fn stats(&self) -> Result<Stats> {
        self.calls.stats.fetch_add(1, Ordering::SeqCst);
        Self::wait_on(&self.load_gate).await;
        self.check_failure()?;
        Ok(Stats {
            vectorstore: VectorstoreStats {
                collection: "ai_cs".to_string(),
                total_vectors: self.store.lock().unwrap().vectors,
            },
        })
    }

    async fn health(&self) -> Result<HealthStatus> {
        Ok(HealthStatus {
            status: "healthy".to_string(),
            details: serde_json::Map::new(),
        })
    }
}
