use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::authz::Owner;
use crate::errors::AppError;
use crate::models::job_posting::JobPosting;
use crate::resources::{ListScope, Resource};
use crate::validation::{Checks, FieldError, Validate, MAX_NAME_LEN};

/// Job descriptions are pasted whole, so they get more room than other free text.
const MAX_DESCRIPTION_LEN: usize = 50_000;
const MAX_KEYWORDS: usize = 100;

pub struct JobPostings;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPostingInput {
    #[serde(default)]
    pub title: String,
    pub company: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobPostingPatch {
    pub title: Option<String>,
    pub company: Option<String>,
    pub description: Option<String>,
    pub keywords: Option<Vec<String>>,
}

impl Validate for JobPostingInput {
    fn validate(&self) -> Vec<FieldError> {
        Checks::new()
            .required("title", &self.title, MAX_NAME_LEN)
            .max_len("company", self.company.as_deref(), MAX_NAME_LEN)
            .required("description", &self.description, MAX_DESCRIPTION_LEN)
            .check("keywords", self.keywords.len() <= MAX_KEYWORDS, "has too many entries")
            .finish()
    }
}

impl Validate for JobPostingPatch {
    fn validate(&self) -> Vec<FieldError> {
        Checks::new()
            .not_blank("title", self.title.as_deref(), MAX_NAME_LEN)
            .max_len("company", self.company.as_deref(), MAX_NAME_LEN)
            .not_blank("description", self.description.as_deref(), MAX_DESCRIPTION_LEN)
            .check(
                "keywords",
                self.keywords.as_ref().map_or(true, |k| k.len() <= MAX_KEYWORDS),
                "has too many entries",
            )
            .finish()
    }
}

#[async_trait]
impl Resource for JobPostings {
    const KIND: &'static str = "JobPosting";
    const TABLE: &'static str = "job_postings";
    const SCOPE: ListScope = ListScope::User;
    const ORDER_BY: &'static str = "created_at DESC";

    type Row = JobPosting;
    type Create = JobPostingInput;
    type Update = JobPostingPatch;

    fn parent_profile(_input: &JobPostingInput) -> Option<Uuid> {
        None
    }

    fn owner(row: &JobPosting) -> Owner {
        Owner::User(row.user_id)
    }

    async fn insert(pool: &PgPool, user_id: Uuid, input: JobPostingInput) -> Result<JobPosting, AppError> {
        Ok(sqlx::query_as::<_, JobPosting>(
            r#"
            INSERT INTO job_postings (id, user_id, title, company, description, keywords)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(input.title.trim())
        .bind(input.company)
        .bind(input.description)
        .bind(input.keywords)
        .fetch_one(pool)
        .await?)
    }

    async fn update(pool: &PgPool, id: Uuid, patch: JobPostingPatch) -> Result<Option<JobPosting>, AppError> {
        Ok(sqlx::query_as::<_, JobPosting>(
            r#"
            UPDATE job_postings SET
                title = COALESCE($2, title),
                company = COALESCE($3, company),
                description = COALESCE($4, description),
                keywords = COALESCE($5, keywords),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.title.as_deref().map(str::trim))
        .bind(patch.company)
        .bind(patch.description)
        .bind(patch.keywords)
        .fetch_optional(pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keywords_are_optional() {
        let input: JobPostingInput = serde_json::from_value(serde_json::json!({
            "title": "Backend Engineer",
            "description": "Build APIs in Rust."
        }))
        .unwrap();
        assert!(input.keywords.is_empty());
        assert!(input.validate().is_empty());
    }

    #[test]
    fn test_title_and_description_required() {
        let fields: Vec<_> = JobPostingInput::default()
            .validate()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["title", "description"]);
    }
}
