//! The storage port used by CV assembly and summary editing.
//!
//! `AppState` carries an `Arc<dyn CvRepository>`; production wires `PgRepository`,
//! tests use `MemoryRepository`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::entries::{Certification, Education, Language, Project, Skill, WorkExperience};
use crate::models::generated_cv::{GeneratedCv, GeneratedCvContent, GenerationStatus};
use crate::models::job_posting::JobPosting;
use crate::models::profile::Profile;

#[cfg(test)]
pub mod memory;
pub mod postgres;

pub use postgres::PgRepository;

/// Final state written once generation has run.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub status: GenerationStatus,
    pub content: Option<GeneratedCvContent>,
    pub error_message: Option<String>,
}

/// Profile-owned entries, each list in its presentation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileEntries {
    pub work_experience: Vec<WorkExperience>,
    pub education: Vec<Education>,
    pub skills: Vec<Skill>,
    pub projects: Vec<Project>,
    pub certifications: Vec<Certification>,
    pub languages: Vec<Language>,
}

#[async_trait]
pub trait CvRepository: Send + Sync {
    async fn get_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, AppError>;

    async fn list_profile_entries(&self, profile_id: Uuid) -> Result<ProfileEntries, AppError>;

    async fn get_job_posting(&self, job_posting_id: Uuid) -> Result<Option<JobPosting>, AppError>;

    /// Inserts a new record (expected to be `pending`).
    async fn insert_generated_cv(&self, cv: &GeneratedCv) -> Result<(), AppError>;

    async fn finish_generated_cv(
        &self,
        cv_id: Uuid,
        outcome: GenerationOutcome,
    ) -> Result<GeneratedCv, AppError>;

    async fn get_generated_cv(&self, cv_id: Uuid) -> Result<Option<GeneratedCv>, AppError>;

    async fn list_generated_cvs(&self, user_id: Uuid) -> Result<Vec<GeneratedCv>, AppError>;

    /// Replaces only `professional_summary` inside the stored content.
    /// Returns `None` when the CV does not exist or has no content yet.
    async fn update_cv_summary(
        &self,
        cv_id: Uuid,
        summary: &str,
    ) -> Result<Option<GeneratedCv>, AppError>;
}
