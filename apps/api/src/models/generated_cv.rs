//! Generated CV: a point-in-time snapshot of a profile, plus generation metadata.
//!
//! `GeneratedCvContent` is the single schema shared by the assembler and every
//! template. Entries are flattened copies of the profile's rows, not references, so
//! later profile edits never reach an already generated document. The only field
//! mutated after generation is `professional_summary`.

use std::collections::BTreeMap;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::generation::tone::CvTone;
use crate::models::entries::{Certification, Education, Language, Project, Skill, WorkExperience};
use crate::models::job_posting::JobPosting;
use crate::render::Template;

pub const CONTENT_SCHEMA_VERSION: u32 = 1;

// ────────────────────────────────────────────────────────────────────────────
// Content schema
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCvContent {
    pub schema_version: u32,
    pub professional_summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_job: Option<TargetJob>,
    pub work_experience: Vec<CvWorkExperience>,
    pub education: Vec<CvEducation>,
    pub skills: Vec<CvSkill>,
    pub projects: Vec<CvProject>,
    pub certifications: Vec<CvCertification>,
    pub languages: Vec<CvLanguage>,
    /// Section key (see `CvSection::key`) → display title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_titles: Option<BTreeMap<String, String>>,
}

impl GeneratedCvContent {
    /// Display title for a section, honouring overrides.
    pub fn title(&self, section: CvSection) -> &str {
        self.section_titles
            .as_ref()
            .and_then(|titles| titles.get(section.key()))
            .map(String::as_str)
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| section.default_title())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CvSection {
    Summary,
    Experience,
    Education,
    Skills,
    Projects,
    Certifications,
    Languages,
}

impl CvSection {
    pub const ALL: [CvSection; 7] = [
        CvSection::Summary,
        CvSection::Experience,
        CvSection::Education,
        CvSection::Skills,
        CvSection::Projects,
        CvSection::Certifications,
        CvSection::Languages,
    ];

    pub fn key(self) -> &'static str {
        match self {
            CvSection::Summary => "summary",
            CvSection::Experience => "experience",
            CvSection::Education => "education",
            CvSection::Skills => "skills",
            CvSection::Projects => "projects",
            CvSection::Certifications => "certifications",
            CvSection::Languages => "languages",
        }
    }

    pub fn default_title(self) -> &'static str {
        match self {
            CvSection::Summary => "Professional Summary",
            CvSection::Experience => "Work Experience",
            CvSection::Education => "Education",
            CvSection::Skills => "Skills",
            CvSection::Projects => "Projects",
            CvSection::Certifications => "Certifications",
            CvSection::Languages => "Languages",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetJob {
    pub job_posting_id: Uuid,
    pub title: String,
    pub company: Option<String>,
}

impl From<&JobPosting> for TargetJob {
    fn from(posting: &JobPosting) -> Self {
        Self {
            job_posting_id: posting.id,
            title: posting.title.clone(),
            company: posting.company.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvWorkExperience {
    pub job_title: String,
    pub company: String,
    pub location: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub description: Option<String>,
}

impl From<&WorkExperience> for CvWorkExperience {
    fn from(row: &WorkExperience) -> Self {
        Self {
            job_title: row.job_title.clone(),
            company: row.company.clone(),
            location: row.location.clone(),
            start_date: row.start_date,
            end_date: row.end_date,
            is_current: row.is_current,
            description: row.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvEducation {
    pub institution: String,
    pub degree: String,
    pub field_of_study: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub grade: Option<String>,
    pub description: Option<String>,
}

impl From<&Education> for CvEducation {
    fn from(row: &Education) -> Self {
        Self {
            institution: row.institution.clone(),
            degree: row.degree.clone(),
            field_of_study: row.field_of_study.clone(),
            start_date: row.start_date,
            end_date: row.end_date,
            grade: row.grade.clone(),
            description: row.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvSkill {
    pub name: String,
    pub category: Option<String>,
    pub proficiency: Option<String>,
}

impl From<&Skill> for CvSkill {
    fn from(row: &Skill) -> Self {
        Self {
            name: row.name.clone(),
            category: row.category.clone(),
            proficiency: row.proficiency.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvProject {
    pub name: String,
    pub description: Option<String>,
    pub technologies: Vec<String>,
    pub project_url: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl From<&Project> for CvProject {
    fn from(row: &Project) -> Self {
        Self {
            name: row.name.clone(),
            description: row.description.clone(),
            technologies: row.technologies.clone(),
            project_url: row.project_url.clone(),
            start_date: row.start_date,
            end_date: row.end_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvCertification {
    pub name: String,
    pub issuing_organization: String,
    pub issue_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
}

impl From<&Certification> for CvCertification {
    fn from(row: &Certification) -> Self {
        Self {
            name: row.name.clone(),
            issuing_organization: row.issuing_organization.clone(),
            issue_date: row.issue_date,
            expiration_date: row.expiration_date,
            credential_id: row.credential_id.clone(),
            credential_url: row.credential_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CvLanguage {
    pub name: String,
    pub proficiency: Option<String>,
}

impl From<&Language> for CvLanguage {
    fn from(row: &Language) -> Self {
        Self {
            name: row.name.clone(),
            proficiency: row.proficiency.clone(),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Generated CV record
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    Pending,
    Completed,
    Failed,
}

impl GenerationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GenerationStatus::Pending => "pending",
            GenerationStatus::Completed => "completed",
            GenerationStatus::Failed => "failed",
        }
    }
}

impl FromStr for GenerationStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(GenerationStatus::Pending),
            "completed" => Ok(GenerationStatus::Completed),
            "failed" => Ok(GenerationStatus::Failed),
            other => Err(anyhow::anyhow!("unknown generation status '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedCv {
    pub id: Uuid,
    pub user_id: Uuid,
    pub profile_id: Uuid,
    pub job_posting_id: Option<Uuid>,
    pub generation_status: GenerationStatus,
    pub template_name: Template,
    pub tone: CvTone,
    pub include_profile_picture: bool,
    pub cv_specific_photo_url: Option<String>,
    pub content_language: String,
    /// Absent while pending and when generation failed.
    pub content: Option<GeneratedCvContent>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw `generated_cvs` row; enums are stored as text.
#[derive(Debug, Clone, FromRow)]
pub struct GeneratedCvRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub profile_id: Uuid,
    pub job_posting_id: Option<Uuid>,
    pub generation_status: String,
    pub template_name: String,
    pub tone: String,
    pub include_profile_picture: bool,
    pub cv_specific_photo_url: Option<String>,
    pub content_language: String,
    pub content: Option<Json<GeneratedCvContent>>,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<GeneratedCvRow> for GeneratedCv {
    type Error = anyhow::Error;

    fn try_from(row: GeneratedCvRow) -> Result<Self, Self::Error> {
        Ok(GeneratedCv {
            id: row.id,
            user_id: row.user_id,
            profile_id: row.profile_id,
            job_posting_id: row.job_posting_id,
            generation_status: row.generation_status.parse()?,
            template_name: row
                .template_name
                .parse()
                .map_err(|_| anyhow::anyhow!("stored template '{}' is unknown", row.template_name))?,
            tone: row.tone.parse()?,
            include_profile_picture: row.include_profile_picture,
            cv_specific_photo_url: row.cv_specific_photo_url,
            content_language: row.content_language,
            content: row.content.map(|Json(content)| content),
            error_message: row.error_message,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_content() -> GeneratedCvContent {
        GeneratedCvContent {
            schema_version: CONTENT_SCHEMA_VERSION,
            professional_summary: String::new(),
            target_job: None,
            work_experience: vec![],
            education: vec![],
            skills: vec![],
            projects: vec![],
            certifications: vec![],
            languages: vec![],
            section_titles: None,
        }
    }

    #[test]
    fn test_title_defaults_without_overrides() {
        let content = empty_content();
        assert_eq!(content.title(CvSection::Experience), "Work Experience");
    }

    #[test]
    fn test_title_override_wins_and_blank_override_is_ignored() {
        let mut content = empty_content();
        let mut titles = BTreeMap::new();
        titles.insert("experience".to_string(), "Berufserfahrung".to_string());
        titles.insert("skills".to_string(), "  ".to_string());
        content.section_titles = Some(titles);
        assert_eq!(content.title(CvSection::Experience), "Berufserfahrung");
        assert_eq!(content.title(CvSection::Skills), "Skills");
    }

    #[test]
    fn test_content_uses_camel_case_and_omits_absent_titles() {
        let json = serde_json::to_value(empty_content()).unwrap();
        assert!(json.get("professionalSummary").is_some());
        assert!(json.get("workExperience").is_some());
        assert!(json.get("sectionTitles").is_none());
    }

    #[test]
    fn test_status_round_trips_through_text() {
        for status in [
            GenerationStatus::Pending,
            GenerationStatus::Completed,
            GenerationStatus::Failed,
        ] {
            assert_eq!(status.as_str().parse::<GenerationStatus>().unwrap(), status);
        }
        assert!("done".parse::<GenerationStatus>().is_err());
    }
}
