//! Concurrent upload of a batch of files.
//!
//! One request is issued per file, all at once, and the batch completes
//! only after every request has settled. A failing file never cancels the
//! others; its failure is counted and logged, not surfaced on its own.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::RagApi;
use crate::error::{ClientError, Result};
use crate::models::{SelectedFile, UploadFile, UploadReceipt};

pub const NO_FILES_SELECTED: &str = "Please select at least one file";

/// Aggregate result of one batch. `succeeded + failed` equals the number of
/// files submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl UploadSummary {
    /// `Uploaded 2 file(s), failed 1`
    pub fn message(&self) -> String {
        let mut msg = format!("Uploaded {} file(s)", self.succeeded);
        if self.failed > 0 {
            msg.push_str(&format!(", failed {}", self.failed));
        }
        msg
    }
}

#[derive(Clone)]
pub struct UploadOrchestrator {
    api: Arc<dyn RagApi>,
}

impl UploadOrchestrator {
    pub fn new(api: Arc<dyn RagApi>) -> Self {
        Self { api }
    }

    /// Upload every file in `files` into `knowledge_base`.
    ///
    /// Fails only when `files` is empty, in which case nothing is sent.
    pub async fn upload(&self, files: &[SelectedFile], knowledge_base: &str) -> Result<UploadSummary> {
        if files.is_empty() {
            return Err(ClientError::validation(NO_FILES_SELECTED));
        }

        let uploads = files
            .iter()
            .map(|file| async move { (file, self.upload_one(file, knowledge_base).await) });
        let outcomes = join_all(uploads).await;

        let mut summary = UploadSummary {
            succeeded: 0,
            failed: 0,
        };
        for (file, outcome) in outcomes {
            match outcome {
                Ok(_) => summary.succeeded += 1,
                Err(e) => {
                    warn!(file = %file.name, knowledge_base, "upload failed: {}", e);
                    summary.failed += 1;
                }
            }
        }

        info!(
            knowledge_base,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "upload batch settled"
        );
        Ok(summary)
    }

    async fn upload_one(&self, file: &SelectedFile, knowledge_base: &str) -> Result<UploadReceipt> {
        let payload = UploadFile::read(file).await?;
        self.api.upload_document(payload, knowledge_base).await
    }
}
