//! CV Assembler: validates a request, snapshots the profile and runs the writer.
//!
//! Flow: validate (no writes) → snapshot entries → insert `pending` record →
//!       writer → mark `completed` or `failed`.
//!
//! Every request that passes validation leaves exactly one record behind, whatever
//! the writer does.

use chrono::Utc;
use serde::Deserialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::authz::ensure_same_user;
use crate::errors::AppError;
use crate::generation::tone::CvTone;
use crate::generation::writer::{known_section_titles, CvWriter, WriterRequest};
use crate::models::generated_cv::{
    GeneratedCv, GeneratedCvContent, GenerationStatus, TargetJob, CONTENT_SCHEMA_VERSION,
};
use crate::models::job_posting::JobPosting;
use crate::models::profile::Profile;
use crate::render::Template;
use crate::repository::{CvRepository, GenerationOutcome, ProfileEntries};
use crate::validation::is_http_url;

pub const DEFAULT_LANGUAGE: &str = "en";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembleRequest {
    pub profile_id: Option<Uuid>,
    pub job_posting_id: Option<Uuid>,
    #[serde(default)]
    pub include_profile_picture: bool,
    pub tone: Option<String>,
    pub cv_specific_photo_url: Option<String>,
    pub template_name: Option<String>,
    pub content_language: Option<String>,
}

/// A request that passed every check, with its referenced rows loaded.
#[derive(Debug)]
struct Checked {
    profile: Profile,
    posting: Option<JobPosting>,
    template: Template,
    tone: CvTone,
    photo_url: Option<String>,
    language: String,
    include_profile_picture: bool,
}

pub fn is_language_tag(tag: &str) -> bool {
    (2..=8).contains(&tag.len())
        && tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        && tag.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
}

async fn check_request(
    repo: &dyn CvRepository,
    caller: AuthUser,
    request: AssembleRequest,
) -> Result<Checked, AppError> {
    let profile_id = request
        .profile_id
        .ok_or_else(|| AppError::Validation("profileId is required".to_string()))?;
    let profile = repo
        .get_profile(profile_id)
        .await?
        .ok_or_else(|| AppError::Validation(format!("Profile {profile_id} does not exist")))?;
    ensure_same_user(profile.user_id, caller)?;

    let template = match request.template_name.as_deref() {
        Some(name) => name.parse::<Template>()?,
        None => Template::default(),
    };

    let posting = match request.job_posting_id {
        Some(posting_id) => {
            let posting = repo.get_job_posting(posting_id).await?.ok_or_else(|| {
                AppError::Validation(format!("JobPosting {posting_id} does not exist"))
            })?;
            if posting.user_id != profile.user_id {
                return Err(AppError::Forbidden(
                    "Job posting belongs to a different user than the profile".to_string(),
                ));
            }
            Some(posting)
        }
        None => None,
    };

    let photo_url = request
        .cv_specific_photo_url
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty());
    if let Some(url) = &photo_url {
        if !is_http_url(url) {
            return Err(AppError::Validation(
                "cvSpecificPhotoUrl must be an http(s) URL".to_string(),
            ));
        }
    }

    let language = request
        .content_language
        .map(|l| l.trim().to_string())
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());
    if !is_language_tag(&language) {
        return Err(AppError::Validation(format!(
            "contentLanguage '{language}' is not a language tag"
        )));
    }

    let tone = match request.tone.as_deref() {
        Some(tone) => tone.parse::<CvTone>()?,
        None => CvTone::default(),
    };

    Ok(Checked {
        profile,
        posting,
        template,
        tone,
        photo_url,
        language,
        include_profile_picture: request.include_profile_picture,
    })
}

/// Copies the display fields of every entry into a fresh content document.
pub fn snapshot_content(
    profile: &Profile,
    entries: &ProfileEntries,
    posting: Option<&JobPosting>,
) -> GeneratedCvContent {
    GeneratedCvContent {
        schema_version: CONTENT_SCHEMA_VERSION,
        professional_summary: profile.professional_summary.clone().unwrap_or_default(),
        target_job: posting.map(TargetJob::from),
        work_experience: entries.work_experience.iter().map(Into::into).collect(),
        education: entries.education.iter().map(Into::into).collect(),
        skills: entries.skills.iter().map(Into::into).collect(),
        projects: entries.projects.iter().map(Into::into).collect(),
        certifications: entries.certifications.iter().map(Into::into).collect(),
        languages: entries.languages.iter().map(Into::into).collect(),
        section_titles: None,
    }
}

/// Assembles and stores a generated CV for `caller`.
///
/// Returns the completed record. If the writer fails the record is stored as
/// `failed` and the failure is returned as `ExternalService`.
pub async fn assemble_cv(
    repo: &dyn CvRepository,
    writer: &dyn CvWriter,
    caller: AuthUser,
    request: AssembleRequest,
) -> Result<GeneratedCv, AppError> {
    let checked = check_request(repo, caller, request).await?;

    let entries = repo.list_profile_entries(checked.profile.id).await?;
    let mut content = snapshot_content(&checked.profile, &entries, checked.posting.as_ref());

    let now = Utc::now();
    let record = GeneratedCv {
        id: Uuid::new_v4(),
        user_id: checked.profile.user_id,
        profile_id: checked.profile.id,
        job_posting_id: checked.posting.as_ref().map(|p| p.id),
        generation_status: GenerationStatus::Pending,
        template_name: checked.template,
        tone: checked.tone,
        include_profile_picture: checked.include_profile_picture,
        cv_specific_photo_url: checked.photo_url.clone(),
        content_language: checked.language.clone(),
        content: None,
        error_message: None,
        created_at: now,
        updated_at: now,
    };
    repo.insert_generated_cv(&record).await?;
    info!(
        "Generating CV {} for profile {} (template={}, tone={}, language={})",
        record.id,
        record.profile_id,
        record.template_name.as_str(),
        record.tone.as_str(),
        record.content_language
    );

    let written = writer
        .write(&WriterRequest {
            profile: &checked.profile,
            content: &content,
            target_job: checked.posting.as_ref(),
            tone: checked.tone,
            language: &checked.language,
        })
        .await;

    match written {
        Ok(text) => {
            content.professional_summary = text.professional_summary;
            content.section_titles = known_section_titles(text.section_titles);
            let finished = repo
                .finish_generated_cv(
                    record.id,
                    GenerationOutcome {
                        status: GenerationStatus::Completed,
                        content: Some(content),
                        error_message: None,
                    },
                )
                .await;
            match finished {
                Ok(cv) => {
                    info!("Generated CV {} completed", cv.id);
                    Ok(cv)
                }
                Err(e) => {
                    // The record must not stay pending.
                    let marked = repo
                        .finish_generated_cv(
                            record.id,
                            GenerationOutcome {
                                status: GenerationStatus::Failed,
                                content: None,
                                error_message: Some(format!("saving generated content failed: {e}")),
                            },
                        )
                        .await;
                    if let Err(mark_err) = marked {
                        warn!("Could not mark CV {} as failed: {mark_err}", record.id);
                    }
                    Err(e)
                }
            }
        }
        Err(e) => {
            let message = e.to_string();
            warn!("Generated CV {} failed: {message}", record.id);
            repo.finish_generated_cv(
                record.id,
                GenerationOutcome {
                    status: GenerationStatus::Failed,
                    content: None,
                    error_message: Some(message.clone()),
                },
            )
            .await?;
            Err(AppError::ExternalService(format!(
                "CV generation failed: {message}"
            )))
        }
    }
}
