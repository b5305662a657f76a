//! Editing a generated CV's professional summary in place.
//!
//! The stored content only changes once the write succeeds. A failed write leaves the
//! previous summary in place and surfaces the error to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::generated_cv::GeneratedCv;
use crate::repository::CvRepository;

/// Persists a new summary for a generated CV and returns the updated record.
#[async_trait]
pub trait SummaryUpdater: Send + Sync {
    async fn update_summary(&self, cv_id: Uuid, summary: &str) -> Result<GeneratedCv, AppError>;
}

/// Writes summaries through the CV repository.
#[derive(Clone)]
pub struct RepositorySummaryUpdater {
    repo: Arc<dyn CvRepository>,
}

impl RepositorySummaryUpdater {
    pub fn new(repo: Arc<dyn CvRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl SummaryUpdater for RepositorySummaryUpdater {
    async fn update_summary(&self, cv_id: Uuid, summary: &str) -> Result<GeneratedCv, AppError> {
        let summary = summary.trim();
        match self.repo.update_cv_summary(cv_id, summary).await {
            Ok(Some(cv)) => {
                info!("Updated summary for CV {cv_id} ({} chars)", summary.len());
                Ok(cv)
            }
            Ok(None) => Err(AppError::NotFound(format!("GeneratedCv {cv_id} not found"))),
            Err(e) => {
                warn!("Summary update for CV {cv_id} failed: {e}");
                Err(e)
            }
        }
    }
}
