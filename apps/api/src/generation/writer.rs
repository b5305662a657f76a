//! Text generation for CVs: the professional summary and, for non-English CVs,
//! translated section titles.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::generation::prompts::{SUMMARY_PROMPT_TEMPLATE, SUMMARY_SYSTEM};
use crate::generation::tone::{get_tone_guide, CvTone};
use crate::llm_client::prompts::GROUNDING_INSTRUCTION;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::generated_cv::{CvSection, GeneratedCvContent};
use crate::models::job_posting::JobPosting;
use crate::models::profile::Profile;

#[derive(Debug, Error)]
pub enum WriterError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("writer returned an empty professional summary")]
    EmptySummary,

    #[error("failed to build prompt: {0}")]
    Prompt(#[from] serde_json::Error),
}

/// Everything a writer gets to see.
pub struct WriterRequest<'a> {
    pub profile: &'a Profile,
    pub content: &'a GeneratedCvContent,
    pub target_job: Option<&'a JobPosting>,
    pub tone: CvTone,
    pub language: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedText {
    pub professional_summary: String,
    #[serde(default)]
    pub section_titles: Option<BTreeMap<String, String>>,
}

#[async_trait]
pub trait CvWriter: Send + Sync {
    async fn write(&self, request: &WriterRequest<'_>) -> Result<GeneratedText, WriterError>;
}

/// Drops unknown section keys and blank titles; `None` if nothing survives.
pub fn known_section_titles(
    titles: Option<BTreeMap<String, String>>,
) -> Option<BTreeMap<String, String>> {
    let kept: BTreeMap<String, String> = titles?
        .into_iter()
        .filter(|(key, title)| {
            CvSection::ALL.iter().any(|s| s.key() == key.as_str()) && !title.trim().is_empty()
        })
        .map(|(key, title)| (key, title.trim().to_string()))
        .collect();
    (!kept.is_empty()).then_some(kept)
}

// ────────────────────────────────────────────────────────────────────────────
// LLM-backed writer
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct LlmCvWriter {
    llm: LlmClient,
}

impl LlmCvWriter {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl CvWriter for LlmCvWriter {
    async fn write(&self, request: &WriterRequest<'_>) -> Result<GeneratedText, WriterError> {
        let prompt = build_summary_prompt(request)?;
        let mut text: GeneratedText = self.llm.call_json(&prompt, SUMMARY_SYSTEM).await?;

        text.professional_summary = text.professional_summary.trim().to_string();
        if text.professional_summary.is_empty() {
            return Err(WriterError::EmptySummary);
        }
        text.section_titles = known_section_titles(text.section_titles);
        info!(
            "Summary written ({} chars, tone={})",
            text.professional_summary.len(),
            request.tone.as_str()
        );
        Ok(text)
    }
}

fn build_summary_prompt(request: &WriterRequest<'_>) -> Result<String, serde_json::Error> {
    let guide = get_tone_guide(request.tone);
    let tone_json = serde_json::to_string(&json!({
        "strong_verbs": guide.strong_verbs,
        "register": guide.register,
        "avoid": guide.avoid,
        "max_sentences": guide.max_sentences,
    }))?;

    let content = request.content;
    let profile_json = serde_json::to_string_pretty(&json!({
        "fullName": request.profile.full_name,
        "headline": request.profile.headline,
        "currentSummary": request.profile.professional_summary,
        "workExperience": content.work_experience,
        "education": content.education,
        "skills": content.skills,
        "projects": content.projects,
        "certifications": content.certifications,
        "languages": content.languages,
    }))?;

    let job_json = match request.target_job {
        Some(job) => serde_json::to_string_pretty(&json!({
            "title": job.title,
            "company": job.company,
            "description": job.description,
            "keywords": job.keywords,
        }))?,
        None => "null".to_string(),
    };

    let section_keys = CvSection::ALL
        .iter()
        .map(|s| s.key())
        .collect::<Vec<_>>()
        .join(", ");

    Ok(SUMMARY_PROMPT_TEMPLATE
        .replace("{grounding_instruction}", GROUNDING_INSTRUCTION)
        .replace("{tone}", request.tone.as_str())
        .replace("{tone_json}", &tone_json)
        .replace("{language}", request.language)
        .replace("{section_keys}", &section_keys)
        .replace("{profile_json}", &profile_json)
        .replace("{job_json}", &job_json))
}

// ────────────────────────────────────────────────────────────────────────────
// Offline writer
// ────────────────────────────────────────────────────────────────────────────

/// Used when no model is configured: keeps the profile's own summary.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProfileSummaryWriter;

#[async_trait]
impl CvWriter for ProfileSummaryWriter {
    async fn write(&self, request: &WriterRequest<'_>) -> Result<GeneratedText, WriterError> {
        let summary = request
            .profile
            .professional_summary
            .as_deref()
            .map(str::trim)
            .unwrap_or_default();
        if summary.is_empty() {
            warn!("Profile {} has no summary to reuse", request.profile.id);
        }
        Ok(GeneratedText {
            professional_summary: summary.to_string(),
            section_titles: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::test_fixtures::{content, profile};

    #[test]
    fn test_known_section_titles_filters_unknown_and_blank() {
        let mut titles = BTreeMap::new();
        titles.insert("experience".to_string(), " Expérience ".to_string());
        titles.insert("hobbies".to_string(), "Loisirs".to_string());
        titles.insert("skills".to_string(), "".to_string());
        let kept = known_section_titles(Some(titles)).unwrap();
        assert_eq!(kept.len(), 1);
        assert_eq!(kept["experience"], "Expérience");
    }

    #[test]
    fn test_known_section_titles_empty_is_none() {
        assert!(known_section_titles(Some(BTreeMap::new())).is_none());
        assert!(known_section_titles(None).is_none());
    }

    #[test]
    fn test_prompt_includes_tone_language_and_profile() {
        let (profile, content) = (profile(), content());
        let request = WriterRequest {
            profile: &profile,
            content: &content,
            target_job: None,
            tone: CvTone::Concise,
            language: "fr",
        };
        let prompt = build_summary_prompt(&request).unwrap();
        assert!(prompt.contains("TONE: concise"));
        assert!(prompt.contains("\"fr\""));
        assert!(prompt.contains("Trinity College"));
        assert!(prompt.contains("TARGET JOB (tailor the summary toward it; may be null):\nnull"));
        assert!(!prompt.contains("{profile_json}"));
    }

    #[tokio::test]
    async fn test_profile_summary_writer_reuses_profile_text() {
        let (profile, content) = (profile(), content());
        let request = WriterRequest {
            profile: &profile,
            content: &content,
            target_job: None,
            tone: CvTone::Professional,
            language: "en",
        };
        let text = ProfileSummaryWriter.write(&request).await.unwrap();
        assert_eq!(text.professional_summary, "Builds reliable systems.");
        assert!(text.section_titles.is_none());
    }

    #[test]
    fn test_generated_text_parses_model_json() {
        let text: GeneratedText = serde_json::from_str(
            r#"{"professionalSummary": "Engineer.", "sectionTitles": {"skills": "Compétences"}}"#,
        )
        .unwrap();
        assert_eq!(text.section_titles.unwrap()["skills"], "Compétences");
    }
}
