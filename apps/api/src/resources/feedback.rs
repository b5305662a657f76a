use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::authz::Owner;
use crate::errors::AppError;
use crate::models::feedback::Feedback;
use crate::resources::{ListScope, Resource};
use crate::validation::{Checks, FieldError, Validate, MAX_TEXT_LEN};

pub const MIN_RATING: i32 = 1;
pub const MAX_RATING: i32 = 5;

pub struct Feedbacks;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackInput {
    pub rating: Option<i32>,
    pub comment: Option<String>,
    pub generated_cv_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackPatch {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

impl Validate for FeedbackInput {
    fn validate(&self) -> Vec<FieldError> {
        Checks::new()
            .check("rating", self.rating.is_some(), "is required")
            .range("rating", self.rating, MIN_RATING, MAX_RATING)
            .max_len("comment", self.comment.as_deref(), MAX_TEXT_LEN)
            .finish()
    }
}

impl Validate for FeedbackPatch {
    fn validate(&self) -> Vec<FieldError> {
        Checks::new()
            .range("rating", self.rating, MIN_RATING, MAX_RATING)
            .max_len("comment", self.comment.as_deref(), MAX_TEXT_LEN)
            .finish()
    }
}

#[async_trait]
impl Resource for Feedbacks {
    const KIND: &'static str = "Feedback";
    const TABLE: &'static str = "feedback";
    const SCOPE: ListScope = ListScope::User;
    const ORDER_BY: &'static str = "created_at DESC";

    type Row = Feedback;
    type Create = FeedbackInput;
    type Update = FeedbackPatch;

    fn parent_profile(_input: &FeedbackInput) -> Option<Uuid> {
        None
    }

    fn owner(row: &Feedback) -> Owner {
        Owner::User(row.user_id)
    }

    async fn insert(pool: &PgPool, user_id: Uuid, input: FeedbackInput) -> Result<Feedback, AppError> {
        if let Some(cv_id) = input.generated_cv_id {
            let cv_owner =
                sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM generated_cvs WHERE id = $1")
                    .bind(cv_id)
                    .fetch_optional(pool)
                    .await?
                    .ok_or_else(|| {
                        AppError::Validation(format!("GeneratedCv {cv_id} does not exist"))
                    })?;
            if cv_owner != user_id {
                return Err(AppError::Forbidden(
                    "Feedback can only reference your own generated CVs".to_string(),
                ));
            }
        }

        Ok(sqlx::query_as::<_, Feedback>(
            r#"
            INSERT INTO feedback (id, user_id, generated_cv_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(input.generated_cv_id)
        .bind(input.rating)
        .bind(input.comment)
        .fetch_one(pool)
        .await?)
    }

    async fn update(pool: &PgPool, id: Uuid, patch: FeedbackPatch) -> Result<Option<Feedback>, AppError> {
        Ok(sqlx::query_as::<_, Feedback>(
            r#"
            UPDATE feedback SET
                rating = COALESCE($2, rating),
                comment = COALESCE($3, comment),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.rating)
        .bind(patch.comment)
        .fetch_optional(pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_bounds() {
        for (rating, ok) in [(0, false), (1, true), (5, true), (6, false)] {
            let input = FeedbackInput {
                rating: Some(rating),
                ..Default::default()
            };
            assert_eq!(input.validate().is_empty(), ok, "rating {rating}");
        }
    }

    #[test]
    fn test_missing_rating_rejected() {
        let errors = FeedbackInput::default().validate();
        assert_eq!(errors, vec![FieldError::new("rating", "is required")]);
    }
}
