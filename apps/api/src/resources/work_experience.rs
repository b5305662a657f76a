use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::authz::Owner;
use crate::errors::AppError;
use crate::models::entries::WorkExperience;
use crate::resources::{ListScope, Resource};
use crate::validation::{Checks, FieldError, Validate, MAX_NAME_LEN, MAX_TEXT_LEN};

pub struct WorkExperiences;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperienceInput {
    pub profile_id: Option<Uuid>,
    #[serde(default)]
    pub job_title: String,
    #[serde(default)]
    pub company: String,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkExperiencePatch {
    pub job_title: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_current: Option<bool>,
    pub description: Option<String>,
}

const CURRENT_WITH_END: &str = "must be empty while isCurrent is set";

impl Validate for WorkExperienceInput {
    fn validate(&self) -> Vec<FieldError> {
        Checks::new()
            .check("profileId", self.profile_id.is_some(), "is required")
            .required("jobTitle", &self.job_title, MAX_NAME_LEN)
            .required("company", &self.company, MAX_NAME_LEN)
            .max_len("location", self.location.as_deref(), MAX_NAME_LEN)
            .check("startDate", self.start_date.is_some(), "is required")
            .date_order("endDate", self.start_date, self.end_date)
            .check(
                "endDate",
                !(self.is_current && self.end_date.is_some()),
                CURRENT_WITH_END,
            )
            .max_len("description", self.description.as_deref(), MAX_TEXT_LEN)
            .finish()
    }
}

impl Validate for WorkExperiencePatch {
    fn validate(&self) -> Vec<FieldError> {
        Checks::new()
            .not_blank("jobTitle", self.job_title.as_deref(), MAX_NAME_LEN)
            .not_blank("company", self.company.as_deref(), MAX_NAME_LEN)
            .max_len("location", self.location.as_deref(), MAX_NAME_LEN)
            .date_order("endDate", self.start_date, self.end_date)
            .check(
                "endDate",
                !(self.is_current == Some(true) && self.end_date.is_some()),
                CURRENT_WITH_END,
            )
            .max_len("description", self.description.as_deref(), MAX_TEXT_LEN)
            .finish()
    }
}

#[async_trait]
impl Resource for WorkExperiences {
    const KIND: &'static str = "WorkExperience";
    const TABLE: &'static str = "work_experiences";
    const SCOPE: ListScope = ListScope::Profile;
    const ORDER_BY: &'static str = "start_date DESC";

    type Row = WorkExperience;
    type Create = WorkExperienceInput;
    type Update = WorkExperiencePatch;

    fn parent_profile(input: &WorkExperienceInput) -> Option<Uuid> {
        input.profile_id
    }

    fn owner(row: &WorkExperience) -> Owner {
        Owner::Profile(row.profile_id)
    }

    fn validate_merged(existing: &WorkExperience, patch: &WorkExperiencePatch) -> Vec<FieldError> {
        let is_current = patch.is_current.unwrap_or(existing.is_current);
        let end_date = match patch.is_current {
            Some(true) => None,
            _ => patch.end_date.or(existing.end_date),
        };
        Checks::new()
            .date_order(
                "endDate",
                Some(patch.start_date.unwrap_or(existing.start_date)),
                end_date,
            )
            .check("endDate", !(is_current && end_date.is_some()), CURRENT_WITH_END)
            .finish()
    }

    async fn insert(
        pool: &PgPool,
        _user_id: Uuid,
        input: WorkExperienceInput,
    ) -> Result<WorkExperience, AppError> {
        Ok(sqlx::query_as::<_, WorkExperience>(
            r#"
            INSERT INTO work_experiences
                (id, profile_id, job_title, company, location, start_date, end_date,
                 is_current, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.profile_id)
        .bind(input.job_title.trim())
        .bind(input.company.trim())
        .bind(input.location)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.is_current)
        .bind(input.description)
        .fetch_one(pool)
        .await?)
    }

    async fn update(
        pool: &PgPool,
        id: Uuid,
        patch: WorkExperiencePatch,
    ) -> Result<Option<WorkExperience>, AppError> {
        // Turning isCurrent on clears any stored end date.
        Ok(sqlx::query_as::<_, WorkExperience>(
            r#"
            UPDATE work_experiences SET
                job_title = COALESCE($2, job_title),
                company = COALESCE($3, company),
                location = COALESCE($4, location),
                start_date = COALESCE($5, start_date),
                end_date = CASE WHEN $7 IS TRUE THEN NULL ELSE COALESCE($6, end_date) END,
                is_current = COALESCE($7, is_current),
                description = COALESCE($8, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.job_title.as_deref().map(str::trim))
        .bind(patch.company.as_deref().map(str::trim))
        .bind(patch.location)
        .bind(patch.start_date)
        .bind(patch.end_date)
        .bind(patch.is_current)
        .bind(patch.description)
        .fetch_optional(pool)
        .await?)
    }
}
