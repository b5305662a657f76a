use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::authz::Owner;
use crate::errors::AppError;
use crate::models::entries::Project;
use crate::resources::{ListScope, Resource};
use crate::validation::{Checks, FieldError, Validate, MAX_NAME_LEN, MAX_TEXT_LEN};

const MAX_TECHNOLOGIES: usize = 50;

pub struct Projects;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectInput {
    pub profile_id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    pub project_url: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub technologies: Option<Vec<String>>,
    pub project_url: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

fn check_technologies(checks: &mut Checks, technologies: &[String]) {
    checks.check(
        "technologies",
        technologies.len() <= MAX_TECHNOLOGIES,
        "has too many entries",
    );
    checks.check(
        "technologies",
        technologies
            .iter()
            .all(|t| !t.trim().is_empty() && t.chars().count() <= MAX_NAME_LEN),
        "entries must be non-blank and at most 200 characters",
    );
}

impl Validate for ProjectInput {
    fn validate(&self) -> Vec<FieldError> {
        let mut checks = Checks::new();
        checks
            .check("profileId", self.profile_id.is_some(), "is required")
            .required("name", &self.name, MAX_NAME_LEN)
            .max_len("description", self.description.as_deref(), MAX_TEXT_LEN)
            .url("projectUrl", self.project_url.as_deref())
            .date_order("endDate", self.start_date, self.end_date);
        check_technologies(&mut checks, &self.technologies);
        checks.finish()
    }
}

impl Validate for ProjectPatch {
    fn validate(&self) -> Vec<FieldError> {
        let mut checks = Checks::new();
        checks
            .not_blank("name", self.name.as_deref(), MAX_NAME_LEN)
            .max_len("description", self.description.as_deref(), MAX_TEXT_LEN)
            .url("projectUrl", self.project_url.as_deref())
            .date_order("endDate", self.start_date, self.end_date);
        if let Some(technologies) = &self.technologies {
            check_technologies(&mut checks, technologies);
        }
        checks.finish()
    }
}

#[async_trait]
impl Resource for Projects {
    const KIND: &'static str = "Project";
    const TABLE: &'static str = "projects";
    const SCOPE: ListScope = ListScope::Profile;
    const ORDER_BY: &'static str = "start_date DESC NULLS LAST, name";

    type Row = Project;
    type Create = ProjectInput;
    type Update = ProjectPatch;

    fn parent_profile(input: &ProjectInput) -> Option<Uuid> {
        input.profile_id
    }

    fn owner(row: &Project) -> Owner {
        Owner::Profile(row.profile_id)
    }

    fn validate_merged(existing: &Project, patch: &ProjectPatch) -> Vec<FieldError> {
        Checks::new()
            .date_order(
                "endDate",
                patch.start_date.or(existing.start_date),
                patch.end_date.or(existing.end_date),
            )
            .finish()
    }

    async fn insert(pool: &PgPool, _user_id: Uuid, input: ProjectInput) -> Result<Project, AppError> {
        Ok(sqlx::query_as::<_, Project>(
            r#"
            INSERT INTO projects
                (id, profile_id, name, description, technologies, project_url, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.profile_id)
        .bind(input.name.trim())
        .bind(input.description)
        .bind(input.technologies)
        .bind(input.project_url)
        .bind(input.start_date)
        .bind(input.end_date)
        .fetch_one(pool)
        .await?)
    }

    async fn update(pool: &PgPool, id: Uuid, patch: ProjectPatch) -> Result<Option<Project>, AppError> {
        Ok(sqlx::query_as::<_, Project>(
            r#"
            UPDATE projects SET
                name = COALESCE($2, name),
                description = COALESCE($3, description),
                technologies = COALESCE($4, technologies),
                project_url = COALESCE($5, project_url),
                start_date = COALESCE($6, start_date),
                end_date = COALESCE($7, end_date),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.description)
        .bind(patch.technologies)
        .bind(patch.project_url)
        .bind(patch.start_date)
        .bind(patch.end_date)
        .fetch_optional(pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_blank_technology_rejected() {
        let input = ProjectInput {
            profile_id: Some(Uuid::new_v4()),
            name: "pgbouncer-rs".to_string(),
            technologies: vec!["Rust".to_string(), " ".to_string()],
            ..Default::default()
        };
        assert_eq!(input.validate()[0].field, "technologies");
    }

    #[test]
    fn test_project_url_must_be_http() {
        let input = ProjectInput {
            profile_id: Some(Uuid::new_v4()),
            name: "pgbouncer-rs".to_string(),
            project_url: Some("github.com/jane/pgbouncer-rs".to_string()),
            ..Default::default()
        };
        assert_eq!(input.validate()[0].field, "projectUrl");
    }

    #[test]
    fn test_patch_without_technologies_skips_their_checks() {
        assert!(ProjectPatch::default().validate().is_empty());
    }

    #[test]
    fn test_patch_end_date_checked_against_stored_start() {
        let existing = Project {
            id: Uuid::new_v4(),
            profile_id: Uuid::new_v4(),
            name: "pgbouncer-rs".to_string(),
            description: None,
            technologies: vec!["Rust".to_string()],
            project_url: None,
            start_date: NaiveDate::from_ymd_opt(2022, 3, 1),
            end_date: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let patch = ProjectPatch {
            end_date: NaiveDate::from_ymd_opt(2021, 12, 1),
            ..Default::default()
        };
        assert!(patch.validate().is_empty());
        assert_eq!(Projects::validate_merged(&existing, &patch)[0].field, "endDate");
    }
}
