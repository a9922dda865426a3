//! Dependent re-reads after mutations.
//!
//! Every mutating operation declares which resources it invalidates
//! ([`Mutation::dependents`]) and [`RefreshCoordinator::after`] re-fetches
//! exactly those, concurrently. Each fetch writes its own slice of the view
//! snapshot as soon as it resolves, so a slow stats call never holds back
//! the document list. A failed fetch is logged and leaves its slice as it
//! was.

use futures::future::join_all;
use tracing::{debug, warn};

use crate::clients::{DocumentClient, KnowledgeBaseClient, StatsClient};
use crate::view::SharedState;

/// A slice of the view snapshot backed by a list or read endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    KnowledgeBases,
    Documents,
    Stats,
}

impl Resource {
    /// Everything loaded when a view is first activated.
    pub const ALL: &'static [Resource] =
        &[Resource::KnowledgeBases, Resource::Documents, Resource::Stats];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    CreateKnowledgeBase,
    DeleteKnowledgeBase,
    DeleteDocument,
    /// A settled upload batch, whatever its mix of outcomes.
    UploadBatch,
}

impl Mutation {
    pub fn dependents(self) -> &'static [Resource] {
        match self {
            Mutation::CreateKnowledgeBase | Mutation::DeleteKnowledgeBase => {
                &[Resource::KnowledgeBases, Resource::Stats]
            }
            Mutation::DeleteDocument | Mutation::UploadBatch => {
                &[Resource::Documents, Resource::Stats]
            }
        }
    }
}

#[derive(Clone)]
pub struct RefreshCoordinator {
    knowledge_bases: KnowledgeBaseClient,
    documents: DocumentClient,
    stats: StatsClient,
}

impl RefreshCoordinator {
    pub fn new(
        knowledge_bases: KnowledgeBaseClient,
        documents: DocumentClient,
        stats: StatsClient,
    ) -> Self {
        Self {
            knowledge_bases,
            documents,
            stats,
        }
    }

    /// Re-fetch the resources that `mutation` invalidates.
    pub(crate) async fn after(&self, mutation: Mutation, state: &SharedState) {
        debug!(?mutation, "refreshing dependents");
        self.load(mutation.dependents(), state).await;
    }

    /// Fetch `resources` concurrently, applying each as it resolves.
    pub(crate) async fn load(&self, resources: &[Resource], state: &SharedState) {
        join_all(resources.iter().map(|r| self.load_one(*r, state))).await;
    }

    async fn load_one(&self, resource: Resource, state: &SharedState) {
        match resource {
            Resource::KnowledgeBases => match self.knowledge_bases.list().await {
                Ok(kbs) => state.update(|s| s.knowledge_bases = kbs),
                Err(e) => warn!("Error loading knowledge bases: {}", e),
            },
            Resource::Documents => match self.documents.list().await {
                Ok(docs) => state.update(|s| s.documents = docs),
                Err(e) => warn!("Error loading documents: {}", e),
            },
            Resource::Stats => match self.stats.fetch().await {
                Ok(stats) => state.update(|s| s.stats = Some(stats)),
                Err(e) => warn!("Error loading stats: {}", e),
            },
        }
    }
}
