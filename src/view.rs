//! The tabbed view model.
//!
//! [`View`] owns the only mutable state in the crate: the active tab, the
//! operator's selection and the last-fetched snapshots. Actions are async
//! methods on `&self`, so a front end can keep dispatching while earlier
//! actions are still waiting on the network. The snapshot mutex is held only
//! for synchronous slice updates, never across an `.await`.
//!
//! There is no request de-duplication and no cancellation. When two
//! operations write the same slice, the one that resolves last wins. Two
//! overlapping searches therefore show the results of whichever response
//! arrives last, not whichever search was issued last.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

use crate::api::RagApi;
use crate::clients::{
    Deletion, DocumentClient, KnowledgeBaseClient, SearchClient, StatsClient,
};
use crate::config::ViewConfig;
use crate::confirm::Confirm;
use crate::error::ClientError;
use crate::models::{Document, KnowledgeBase, SearchRequest, SearchResult, SelectedFile, Stats};
use crate::refresh::{Mutation, RefreshCoordinator, Resource};
use crate::upload::{UploadOrchestrator, NO_FILES_SELECTED};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Upload,
    Search,
    Manage,
    Stats,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::Upload, Tab::Search, Tab::Manage, Tab::Stats];

    pub fn label(self) -> &'static str {
        match self {
            Tab::Upload => "Upload Files",
            Tab::Search => "Search",
            Tab::Manage => "Manage",
            Tab::Stats => "Statistics",
        }
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = match self {
            Tab::Upload => "upload",
            Tab::Search => "search",
            Tab::Manage => "manage",
            Tab::Stats => "stats",
        };
        f.write_str(key)
    }
}

impl FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "upload" => Ok(Tab::Upload),
            "search" => Ok(Tab::Search),
            "manage" => Ok(Tab::Manage),
            "stats" => Ok(Tab::Stats),
            other => Err(format!(
                "unknown tab '{}': expected upload, search, manage, or stats",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A message for the operator, the terminal counterpart of an alert box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

/// Everything a front end renders from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewState {
    pub tab: Tab,

    pub selected_knowledge_base: String,
    pub selected_files: Vec<SelectedFile>,
    pub query: String,
    pub new_kb_name: String,
    pub new_kb_description: String,

    pub knowledge_bases: Vec<KnowledgeBase>,
    pub documents: Vec<Document>,
    pub search_results: Vec<SearchResult>,
    pub stats: Option<Stats>,

    pub upload_message: Option<Notice>,
    pub uploading: bool,
    pub searching: bool,
    pub notices: Vec<Notice>,
}

/// The snapshot behind a mutex that is never held across an await.
#[derive(Default)]
pub(crate) struct SharedState(Mutex<ViewState>);

impl SharedState {
    fn new(state: ViewState) -> Self {
        Self(Mutex::new(state))
    }

    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        let mut guard = self.0.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub(crate) fn read(&self) -> ViewState {
        self.update(|s| s.clone())
    }

    fn notify(&self, notice: Notice) {
        self.update(|s| s.notices.push(notice));
    }
}

/// A search captured at the moment it was triggered.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSearch {
    pub request: SearchRequest,
}

/// An upload batch captured at the moment it was triggered.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingUpload {
    pub files: Vec<SelectedFile>,
    pub knowledge_base: String,
}

pub struct View {
    state: SharedState,
    activated: AtomicBool,
    knowledge_bases: KnowledgeBaseClient,
    documents: DocumentClient,
    search: SearchClient,
    uploads: UploadOrchestrator,
    refresh: RefreshCoordinator,
    confirm: Arc<dyn Confirm>,
    search_limit: u32,
}

impl View {
    pub fn new(api: Arc<dyn RagApi>, config: &ViewConfig, confirm: Arc<dyn Confirm>) -> Self {
        let knowledge_bases = KnowledgeBaseClient::new(api.clone());
        let documents = DocumentClient::new(api.clone());
        let stats = StatsClient::new(api.clone());
        let refresh =
            RefreshCoordinator::new(knowledge_bases.clone(), documents.clone(), stats);

        let state = ViewState {
            selected_knowledge_base: config.default_knowledge_base.clone(),
            ..ViewState::default()
        };

        Self {
            state: SharedState::new(state),
            activated: AtomicBool::new(false),
            knowledge_bases,
            documents,
            search: SearchClient::new(api.clone(), config.default_knowledge_base.clone()),
            uploads: UploadOrchestrator::new(api),
            refresh,
            confirm,
            search_limit: config.search_limit,
        }
    }

    pub fn snapshot(&self) -> ViewState {
        self.state.read()
    }

    /// Drain pending notices, oldest first.
    pub fn take_notices(&self) -> Vec<Notice> {
        self.state.update(|s| std::mem::take(&mut s.notices))
    }

    /// Initial load: knowledge bases, documents and stats, concurrently.
    ///
    /// Runs once per view; later calls return `false` without any request.
    pub async fn activate(&self) -> bool {
        if self.activated.swap(true, Ordering::SeqCst) {
            return false;
        }
        self.refresh.load(Resource::ALL, &self.state).await;
        true
    }

    /// Pure local transition; renders from the snapshot already held.
    pub fn select_tab(&self, tab: Tab) {
        self.state.update(|s| s.tab = tab);
    }

    pub fn select_knowledge_base(&self, name: impl Into<String>) {
        let name = name.into();
        self.state.update(|s| s.selected_knowledge_base = name);
    }

    /// Replace the file selection. An empty pick leaves the selection alone.
    pub fn select_files(&self, files: Vec<SelectedFile>) {
        if files.is_empty() {
            return;
        }
        self.state.update(|s| {
            s.selected_files = files;
            s.upload_message = None;
        });
    }

    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.state.update(|s| s.query = query);
    }

    pub fn set_new_knowledge_base(&self, name: impl Into<String>, description: impl Into<String>) {
        let (name, description) = (name.into(), description.into());
        self.state.update(|s| {
            s.new_kb_name = name;
            s.new_kb_description = description;
        });
    }

    // ---- upload ----

    /// Capture the current selection as a batch, or record the validation
    /// message and return `None` when no files are selected.
    pub fn prepare_upload(&self) -> Option<PendingUpload> {
        self.state.update(|s| {
            if s.selected_files.is_empty() {
                s.upload_message = Some(Notice::error(NO_FILES_SELECTED));
                return None;
            }
            s.uploading = true;
            s.upload_message = None;
            Some(PendingUpload {
                files: s.selected_files.clone(),
                knowledge_base: s.selected_knowledge_base.clone(),
            })
        })
    }

    pub async fn run_upload(&self, pending: PendingUpload) {
        let message = match self
            .uploads
            .upload(&pending.files, &pending.knowledge_base)
            .await
        {
            Ok(summary) if summary.succeeded == 0 => Notice::error(summary.message()),
            Ok(summary) => Notice::info(summary.message()),
            Err(e) => Notice::error(format!("Error: {}", e.detail())),
        };

        self.state.update(|s| {
            s.upload_message = Some(message);
            s.selected_files.clear();
            s.uploading = false;
        });

        self.refresh.after(Mutation::UploadBatch, &self.state).await;
    }

    pub async fn upload(&self) {
        if let Some(pending) = self.prepare_upload() {
            self.run_upload(pending).await;
        }
    }

    // ---- search ----

    /// Capture the current query and knowledge base, or post the validation
    /// notice and return `None` when the query is blank.
    pub fn prepare_search(&self) -> Option<PendingSearch> {
        let (query, knowledge_base) = self
            .state
            .update(|s| (s.query.clone(), s.selected_knowledge_base.clone()));

        match self
            .search
            .request(&query, Some(knowledge_base.as_str()), self.search_limit)
        {
            Ok(request) => {
                self.state.update(|s| s.searching = true);
                Some(PendingSearch { request })
            }
            Err(e) => {
                self.state.notify(Notice::error(e.detail()));
                None
            }
        }
    }

    pub async fn run_search(&self, pending: PendingSearch) {
        let outcome = self.search.send(&pending.request).await;
        self.state.update(|s| {
            match outcome {
                Ok(results) => s.search_results = results,
                Err(e) => s
                    .notices
                    .push(Notice::error(format!("Search error: {}", e.detail()))),
            }
            s.searching = false;
        });
    }

    pub async fn search(&self) {
        if let Some(pending) = self.prepare_search() {
            self.run_search(pending).await;
        }
    }

    // ---- manage ----

    /// Create a knowledge base from the create form.
    pub async fn create_knowledge_base(&self) {
        let (name, description) = self
            .state
            .update(|s| (s.new_kb_name.clone(), s.new_kb_description.clone()));

        match self
            .knowledge_bases
            .create(&name, Some(description))
            .await
        {
            Ok(kb) => {
                info!(name = %kb.name, "knowledge base created");
                self.state.update(|s| {
                    s.new_kb_name.clear();
                    s.new_kb_description.clear();
                });
                self.state
                    .notify(Notice::info("Knowledge base created successfully!"));
                self.refresh
                    .after(Mutation::CreateKnowledgeBase, &self.state)
                    .await;
            }
            Err(e) => self.state.notify(failure("Error creating knowledge base", &e)),
        }
    }

    /// Delete a knowledge base after confirmation. The current selection is
    /// kept even when it names the deleted knowledge base.
    pub async fn delete_knowledge_base(&self, name: &str) {
        self.delete_knowledge_base_with(name, self.confirm.as_ref())
            .await
    }

    /// Like [`View::delete_knowledge_base`] with a one-off confirmation gate.
    pub async fn delete_knowledge_base_with(&self, name: &str, confirm: &dyn Confirm) {
        match self.knowledge_bases.delete(name, confirm).await {
            Ok(Deletion::Declined) => {}
            Ok(Deletion::Deleted) => {
                info!(name, "knowledge base deleted");
                self.state
                    .notify(Notice::info("Knowledge base deleted successfully!"));
                self.refresh
                    .after(Mutation::DeleteKnowledgeBase, &self.state)
                    .await;
            }
            Err(e) => self.state.notify(failure("Error deleting knowledge base", &e)),
        }
    }

    pub async fn delete_document(&self, id: &str) {
        self.delete_document_with(id, self.confirm.as_ref()).await
    }

    pub async fn delete_document_with(&self, id: &str, confirm: &dyn Confirm) {
        match self.documents.delete(id, confirm).await {
            Ok(Deletion::Declined) => {}
            Ok(Deletion::Deleted) => {
                info!(id, "document deleted");
                self.state
                    .notify(Notice::info("Document deleted successfully!"));
                self.refresh
                    .after(Mutation::DeleteDocument, &self.state)
                    .await;
            }
            Err(e) => self.state.notify(failure("Error deleting document", &e)),
        }
    }
}

/// Validation messages stand alone; server and transport errors get the
/// operation prefix.
fn failure(prefix: &str, err: &ClientError) -> Notice {
    if err.is_validation() {
        Notice::error(err.detail())
    } else {
        Notice::error(format!("{}: {}", prefix, err.detail()))
    }
}
