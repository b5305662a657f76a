//! CRUD resources for profiles, their entries, job postings and feedback.
//!
//! Each resource is a marker type implementing `Resource`; the generic handlers in
//! `handlers` do the shared work (auth, validation, 404s, ordering) and the impls only
//! provide their table, ordering and insert/update SQL.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use sqlx::{postgres::PgRow, FromRow, PgPool};
use uuid::Uuid;

use crate::authz::Owner;
use crate::errors::AppError;
use crate::validation::{FieldError, Validate};

pub mod certification;
pub mod education;
pub mod feedback;
pub mod handlers;
pub mod job_posting;
pub mod language;
pub mod profile;
pub mod project;
pub mod skill;
pub mod work_experience;

pub use certification::Certifications;
pub use education::Educations;
pub use feedback::Feedbacks;
pub use job_posting::JobPostings;
pub use language::Languages;
pub use profile::Profiles;
pub use project::Projects;
pub use skill::Skills;
pub use work_experience::WorkExperiences;

/// Which column a list query filters on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// `?profileId=`, column `profile_id`.
    Profile,
    /// `?userId=`, column `user_id`.
    User,
}

impl ListScope {
    pub fn column(self) -> &'static str {
        match self {
            ListScope::Profile => "profile_id",
            ListScope::User => "user_id",
        }
    }
}

#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Used in messages, e.g. "WorkExperience 42 not found".
    const KIND: &'static str;
    const TABLE: &'static str;
    const SCOPE: ListScope;
    const ORDER_BY: &'static str;

    type Row: for<'r> FromRow<'r, PgRow> + Serialize + Send + Sync + Unpin + 'static;
    type Create: DeserializeOwned + Validate + Send + 'static;
    type Update: DeserializeOwned + Validate + Send + 'static;

    /// Profile a new row will hang off, checked against the caller before insert.
    fn parent_profile(input: &Self::Create) -> Option<Uuid>;

    fn owner(row: &Self::Row) -> Owner;

    /// Checks the row as it will look once `patch` is applied. A patch can be valid on
    /// its own yet contradict stored values, e.g. an end date before the stored start.
    fn validate_merged(_existing: &Self::Row, _patch: &Self::Update) -> Vec<FieldError> {
        Vec::new()
    }

    async fn insert(pool: &PgPool, user_id: Uuid, input: Self::Create) -> Result<Self::Row, AppError>;

    /// Applies only the supplied fields. `None` if the row vanished.
    async fn update(pool: &PgPool, id: Uuid, patch: Self::Update) -> Result<Option<Self::Row>, AppError>;
}

pub async fn fetch_row<R: Resource>(pool: &PgPool, id: Uuid) -> Result<Option<R::Row>, AppError> {
    let sql = format!("SELECT * FROM {} WHERE id = $1", R::TABLE);
    Ok(sqlx::query_as::<_, R::Row>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?)
}

/// Rows owned by `scope_id`, in the resource's presentation order.
pub async fn list_rows<R: Resource>(pool: &PgPool, scope_id: Uuid) -> Result<Vec<R::Row>, AppError> {
    let sql = format!(
        "SELECT * FROM {} WHERE {} = $1 ORDER BY {}",
        R::TABLE,
        R::SCOPE.column(),
        R::ORDER_BY
    );
    Ok(sqlx::query_as::<_, R::Row>(&sql)
        .bind(scope_id)
        .fetch_all(pool)
        .await?)
}

pub async fn delete_row<R: Resource>(pool: &PgPool, id: Uuid) -> Result<bool, AppError> {
    let sql = format!("DELETE FROM {} WHERE id = $1", R::TABLE);
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

pub fn not_found<R: Resource>(id: Uuid) -> AppError {
    AppError::NotFound(format!("{} {id} not found", R::KIND))
}
