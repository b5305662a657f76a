use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::authz::Owner;
use crate::errors::AppError;
use crate::models::entries::Education;
use crate::resources::{ListScope, Resource};
use crate::validation::{Checks, FieldError, Validate, MAX_NAME_LEN, MAX_TEXT_LEN};

pub struct Educations;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationInput {
    pub profile_id: Option<Uuid>,
    #[serde(default)]
    pub institution: String,
    #[serde(default)]
    pub degree: String,
    pub field_of_study: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub grade: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EducationPatch {
    pub institution: Option<String>,
    pub degree: Option<String>,
    pub field_of_study: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub grade: Option<String>,
    pub description: Option<String>,
}

impl Validate for EducationInput {
    fn validate(&self) -> Vec<FieldError> {
        Checks::new()
            .check("profileId", self.profile_id.is_some(), "is required")
            .required("institution", &self.institution, MAX_NAME_LEN)
            .required("degree", &self.degree, MAX_NAME_LEN)
            .max_len("fieldOfStudy", self.field_of_study.as_deref(), MAX_NAME_LEN)
            .date_order("endDate", self.start_date, self.end_date)
            .max_len("grade", self.grade.as_deref(), MAX_NAME_LEN)
            .max_len("description", self.description.as_deref(), MAX_TEXT_LEN)
            .finish()
    }
}

impl Validate for EducationPatch {
    fn validate(&self) -> Vec<FieldError> {
        Checks::new()
            .not_blank("institution", self.institution.as_deref(), MAX_NAME_LEN)
            .not_blank("degree", self.degree.as_deref(), MAX_NAME_LEN)
            .max_len("fieldOfStudy", self.field_of_study.as_deref(), MAX_NAME_LEN)
            .date_order("endDate", self.start_date, self.end_date)
            .max_len("grade", self.grade.as_deref(), MAX_NAME_LEN)
            .max_len("description", self.description.as_deref(), MAX_TEXT_LEN)
            .finish()
    }
}

#[async_trait]
impl Resource for Educations {
    const KIND: &'static str = "Education";
    const TABLE: &'static str = "educations";
    const SCOPE: ListScope = ListScope::Profile;
    const ORDER_BY: &'static str = "start_date DESC";

    type Row = Education;
    type Create = EducationInput;
    type Update = EducationPatch;

    fn parent_profile(input: &EducationInput) -> Option<Uuid> {
        input.profile_id
    }

    fn owner(row: &Education) -> Owner {
        Owner::Profile(row.profile_id)
    }

    fn validate_merged(existing: &Education, patch: &EducationPatch) -> Vec<FieldError> {
        Checks::new()
            .date_order(
                "endDate",
                patch.start_date.or(existing.start_date),
                patch.end_date.or(existing.end_date),
            )
            .finish()
    }

    async fn insert(pool: &PgPool, _user_id: Uuid, input: EducationInput) -> Result<Education, AppError> {
        Ok(sqlx::query_as::<_, Education>(
            r#"
            INSERT INTO educations
                (id, profile_id, institution, degree, field_of_study, start_date, end_date,
                 grade, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.profile_id)
        .bind(input.institution.trim())
        .bind(input.degree.trim())
        .bind(input.field_of_study)
        .bind(input.start_date)
        .bind(input.end_date)
        .bind(input.grade)
        .bind(input.description)
        .fetch_one(pool)
        .await?)
    }

    async fn update(pool: &PgPool, id: Uuid, patch: EducationPatch) -> Result<Option<Education>, AppError> {
        Ok(sqlx::query_as::<_, Education>(
            r#"
            UPDATE educations SET
                institution = COALESCE($2, institution),
                degree = COALESCE($3, degree),
                field_of_study = COALESCE($4, field_of_study),
                start_date = COALESCE($5, start_date),
                end_date = COALESCE($6, end_date),
                grade = COALESCE($7, grade),
                description = COALESCE($8, description),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.institution.as_deref().map(str::trim))
        .bind(patch.degree.as_deref().map(str::trim))
        .bind(patch.field_of_study)
        .bind(patch.start_date)
        .bind(patch.end_date)
        .bind(patch.grade)
        .bind(patch.description)
        .fetch_optional(pool)
        .await?)
    }
}
