use async_trait::async_trait;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::generated_cv::{GeneratedCv, GeneratedCvRow};
use crate::models::job_posting::JobPosting;
use crate::models::profile::Profile;
use crate::repository::{CvRepository, GenerationOutcome, ProfileEntries};
use crate::resources::{
    fetch_row, list_rows, Certifications, Educations, JobPostings, Languages, Profiles, Projects,
    Skills, WorkExperiences,
};

#[derive(Clone)]
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn to_domain(row: GeneratedCvRow) -> Result<GeneratedCv, AppError> {
    Ok(GeneratedCv::try_from(row)?)
}

#[async_trait]
impl CvRepository for PgRepository {
    async fn get_profile(&self, profile_id: Uuid) -> Result<Option<Profile>, AppError> {
        fetch_row::<Profiles>(&self.pool, profile_id).await
    }

    async fn list_profile_entries(&self, profile_id: Uuid) -> Result<ProfileEntries, AppError> {
        let pool = &self.pool;
        let (work_experience, education, skills, projects, certifications, languages) = tokio::try_join!(
            list_rows::<WorkExperiences>(pool, profile_id),
            list_rows::<Educations>(pool, profile_id),
            list_rows::<Skills>(pool, profile_id),
            list_rows::<Projects>(pool, profile_id),
            list_rows::<Certifications>(pool, profile_id),
            list_rows::<Languages>(pool, profile_id),
        )?;
        Ok(ProfileEntries {
            work_experience,
            education,
            skills,
            projects,
            certifications,
            languages,
        })
    }

    async fn get_job_posting(&self, job_posting_id: Uuid) -> Result<Option<JobPosting>, AppError> {
        fetch_row::<JobPostings>(&self.pool, job_posting_id).await
    }

    async fn insert_generated_cv(&self, cv: &GeneratedCv) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO generated_cvs
                (id, user_id, profile_id, job_posting_id, generation_status, template_name,
                 tone, include_profile_picture, cv_specific_photo_url, content_language,
                 content, error_message, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(cv.id)
        .bind(cv.user_id)
        .bind(cv.profile_id)
        .bind(cv.job_posting_id)
        .bind(cv.generation_status.as_str())
        .bind(cv.template_name.as_str())
        .bind(cv.tone.as_str())
        .bind(cv.include_profile_picture)
        .bind(&cv.cv_specific_photo_url)
        .bind(&cv.content_language)
        .bind(cv.content.as_ref().map(Json))
        .bind(&cv.error_message)
        .bind(cv.created_at)
        .bind(cv.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn finish_generated_cv(
        &self,
        cv_id: Uuid,
        outcome: GenerationOutcome,
    ) -> Result<GeneratedCv, AppError> {
        let row = sqlx::query_as::<_, GeneratedCvRow>(
            r#"
            UPDATE generated_cvs SET
                generation_status = $2,
                content = $3,
                error_message = $4,
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(cv_id)
        .bind(outcome.status.as_str())
        .bind(outcome.content.map(Json))
        .bind(outcome.error_message)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("GeneratedCv {cv_id} not found")))?;
        to_domain(row)
    }

    async fn get_generated_cv(&self, cv_id: Uuid) -> Result<Option<GeneratedCv>, AppError> {
        sqlx::query_as::<_, GeneratedCvRow>("SELECT * FROM generated_cvs WHERE id = $1")
            .bind(cv_id)
            .fetch_optional(&self.pool)
            .await?
            .map(to_domain)
            .transpose()
    }

    async fn list_generated_cvs(&self, user_id: Uuid) -> Result<Vec<GeneratedCv>, AppError> {
        sqlx::query_as::<_, GeneratedCvRow>(
            "SELECT * FROM generated_cvs WHERE user_id = $1 ORDER BY created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(to_domain)
        .collect()
    }

    async fn update_cv_summary(
        &self,
        cv_id: Uuid,
        summary: &str,
    ) -> Result<Option<GeneratedCv>, AppError> {
        sqlx::query_as::<_, GeneratedCvRow>(
            r#"
            UPDATE generated_cvs SET
                content = jsonb_set(content, '{professionalSummary}', to_jsonb($2::text)),
                updated_at = NOW()
            WHERE id = $1 AND content IS NOT NULL
            RETURNING *
            "#,
        )
        .bind(cv_id)
        .bind(summary)
        .fetch_optional(&self.pool)
        .await?
        .map(to_domain)
        .transpose()
    }
}
