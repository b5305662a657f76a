//! In-memory `CvRepository` for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::generated_cv::{GeneratedCv, GenerationStatus};
use crate::models::job_posting::JobPosting;
use crate::models::profile::Profile;
use crate::repository::{CvRepository, GenerationOutcome, ProfileEntries};

#[derive(Default)]
pub struct MemoryRepository {
    pub profiles: Mutex<HashMap<Uuid, Profile>>,
    /// Stored already in presentation order.
    pub entries: Mutex<HashMap<Uuid, ProfileEntries>>,
    pub job_postings: Mutex<HashMap<Uuid, JobPosting>>,
    pub generated: Mutex<Vec<GeneratedCv>>,
    pub fail_summary_updates: bool,
    /// Rejects writes that mark a CV completed.
    pub fail_completion: bool,
}

impl MemoryRepository {
    pub fn with_profile(profile: Profile, entries: ProfileEntries) -> Self {
        let repo = Self::default();
        repo.entries.lock().unwrap().insert(profile.id, entries);
        repo.profiles.lock().unwrap().insert(profile.id, profile);
        repo
    }

    pub fn add_job_posting(&self, posting: JobPosting) {
        self.job_postings.lock().unwrap().insert(posting.id, posting);
    }

    pub fn generated(&self) -> Vec<GeneratedCv> {
        self.generated.lock().unwrap().clone()
    }
}

#[async_trait]
impl CvRepository for MemoryRepository {
    async fn get_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, AppError> {
        Ok(self.profiles.lock().unwrap().get(&profile_id).cloned())
    }

    async fn list_profile_entries(&self, profile_id: Uuid) -> Result<ProfileEntries, AppError> {
        Ok(self
            .entries
            .lock()
            .unwrap()
            .get(&profile_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_job_posting(&self, job_posting_id: Uuid) -> Result<Option<JobPosting>, AppError> {
        Ok(self.job_postings.lock().unwrap().get(&job_posting_id).cloned())
    }

    async fn insert_generated_cv(&self, cv: &GeneratedCv) -> Result<(), AppError> {
        self.generated.lock().unwrap().push(cv.clone());
        Ok(())
    }

    async fn finish_generated_cv(
        &self,
        cv_id: Uuid,
        outcome: GenerationOutcome,
    ) -> Result<GeneratedCv, AppError> {
        if self.fail_completion && outcome.status == GenerationStatus::Completed {
            return Err(AppError::ExternalService("content store unavailable".to_string()));
        }
        let mut generated = self.generated.lock().unwrap();
        let cv = generated
            .iter_mut()
            .find(|cv| cv.id == cv_id)
            .ok_or_else(|| AppError::NotFound(format!("GeneratedCv {cv_id} not found")))?;
        cv.generation_status = outcome.status;
        cv.content = outcome.content;
        cv.error_message = outcome.error_message;
        cv.updated_at = Utc::now();
        Ok(cv.clone())
    }

    async fn get_generated_cv(&self, cv_id: Uuid) -> Result<Option<GeneratedCv>, AppError> {
        Ok(self
            .generated
            .lock()
            .unwrap()
            .iter()
            .find(|cv| cv.id == cv_id)
            .cloned())
    }

    async fn list_generated_cvs(&self, user_id: Uuid) -> Result<Vec<GeneratedCv>, AppError> {
        let mut cvs: Vec<_> = self
            .generated
            .lock()
            .unwrap()
            .iter()
            .filter(|cv| cv.user_id == user_id)
            .cloned()
            .collect();
        cvs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cvs)
    }

    async fn update_cv_summary(
        &self,
        cv_id: Uuid,
        summary: &str,
    ) -> Result<Option<GeneratedCv>, AppError> {
        if self.fail_summary_updates {
            return Err(AppError::ExternalService("summary store unavailable".to_string()));
        }
        let mut generated = self.generated.lock().unwrap();
        let Some(cv) = generated.iter_mut().find(|cv| cv.id == cv_id) else {
            return Ok(None);
        };
        let Some(content) = cv.content.as_mut() else {
            return Ok(None);
        };
        content.professional_summary = summary.to_string();
        cv.updated_at = Utc::now();
        Ok(Some(cv.clone()))
    }
}
