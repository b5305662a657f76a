use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::authz::Owner;
use crate::errors::AppError;
use crate::models::entries::Language;
use crate::resources::{ListScope, Resource};
use crate::validation::{Checks, FieldError, Validate, MAX_NAME_LEN};

pub struct Languages;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguageInput {
    pub profile_id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    pub proficiency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LanguagePatch {
    pub name: Option<String>,
    pub proficiency: Option<String>,
}

impl Validate for LanguageInput {
    fn validate(&self) -> Vec<FieldError> {
        Checks::new()
            .check("profileId", self.profile_id.is_some(), "is required")
            .required("name", &self.name, MAX_NAME_LEN)
            .max_len("proficiency", self.proficiency.as_deref(), MAX_NAME_LEN)
            .finish()
    }
}

impl Validate for LanguagePatch {
    fn validate(&self) -> Vec<FieldError> {
        Checks::new()
            .not_blank("name", self.name.as_deref(), MAX_NAME_LEN)
            .max_len("proficiency", self.proficiency.as_deref(), MAX_NAME_LEN)
            .finish()
    }
}

#[async_trait]
impl Resource for Languages {
    const KIND: &'static str = "Language";
    const TABLE: &'static str = "languages";
    const SCOPE: ListScope = ListScope::Profile;
    const ORDER_BY: &'static str = "name ASC";

    type Row = Language;
    type Create = LanguageInput;
    type Update = LanguagePatch;

    fn parent_profile(input: &LanguageInput) -> Option<Uuid> {
        input.profile_id
    }

    fn owner(row: &Language) -> Owner {
        Owner::Profile(row.profile_id)
    }

    async fn insert(pool: &PgPool, _user_id: Uuid, input: LanguageInput) -> Result<Language, AppError> {
        Ok(sqlx::query_as::<_, Language>(
            r#"
            INSERT INTO languages (id, profile_id, name, proficiency)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.profile_id)
        .bind(input.name.trim())
        .bind(input.proficiency)
        .fetch_one(pool)
        .await?)
    }

    async fn update(pool: &PgPool, id: Uuid, patch: LanguagePatch) -> Result<Option<Language>, AppError> {
        Ok(sqlx::query_as::<_, Language>(
            r#"
            UPDATE languages SET
                name = COALESCE($2, name),
                proficiency = COALESCE($3, proficiency),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.proficiency)
        .fetch_optional(pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlong_proficiency_rejected() {
        let input = LanguageInput {
            profile_id: Some(Uuid::new_v4()),
            name: "Irish".to_string(),
            proficiency: Some("x".repeat(MAX_NAME_LEN + 1)),
        };
        assert_eq!(input.validate()[0].field, "proficiency");
    }
}
