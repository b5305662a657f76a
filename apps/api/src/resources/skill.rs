use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::authz::Owner;
use crate::errors::AppError;
use crate::models::entries::Skill;
use crate::resources::{ListScope, Resource};
use crate::validation::{Checks, FieldError, Validate, MAX_NAME_LEN};

pub struct Skills;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillInput {
    pub profile_id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    pub category: Option<String>,
    pub proficiency: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub proficiency: Option<String>,
}

impl Validate for SkillInput {
    fn validate(&self) -> Vec<FieldError> {
        Checks::new()
            .check("profileId", self.profile_id.is_some(), "is required")
            .required("name", &self.name, MAX_NAME_LEN)
            .max_len("category", self.category.as_deref(), MAX_NAME_LEN)
            .max_len("proficiency", self.proficiency.as_deref(), MAX_NAME_LEN)
            .finish()
    }
}

impl Validate for SkillPatch {
    fn validate(&self) -> Vec<FieldError> {
        Checks::new()
            .not_blank("name", self.name.as_deref(), MAX_NAME_LEN)
            .max_len("category", self.category.as_deref(), MAX_NAME_LEN)
            .max_len("proficiency", self.proficiency.as_deref(), MAX_NAME_LEN)
            .finish()
    }
}

#[async_trait]
impl Resource for Skills {
    const KIND: &'static str = "Skill";
    const TABLE: &'static str = "skills";
    const SCOPE: ListScope = ListScope::Profile;
    const ORDER_BY: &'static str = "name ASC";

    type Row = Skill;
    type Create = SkillInput;
    type Update = SkillPatch;

    fn parent_profile(input: &SkillInput) -> Option<Uuid> {
        input.profile_id
    }

    fn owner(row: &Skill) -> Owner {
        Owner::Profile(row.profile_id)
    }

    async fn insert(pool: &PgPool, _user_id: Uuid, input: SkillInput) -> Result<Skill, AppError> {
        Ok(sqlx::query_as::<_, Skill>(
            r#"
            INSERT INTO skills (id, profile_id, name, category, proficiency)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.profile_id)
        .bind(input.name.trim())
        .bind(input.category)
        .bind(input.proficiency)
        .fetch_one(pool)
        .await?)
    }

    async fn update(pool: &PgPool, id: Uuid, patch: SkillPatch) -> Result<Option<Skill>, AppError> {
        Ok(sqlx::query_as::<_, Skill>(
            r#"
            UPDATE skills SET
                name = COALESCE($2, name),
                category = COALESCE($3, category),
                proficiency = COALESCE($4, proficiency),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.category)
        .bind(patch.proficiency)
        .fetch_optional(pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_and_profile_required() {
        let fields: Vec<_> = SkillInput::default()
            .validate()
            .into_iter()
            .map(|e| e.field)
            .collect();
        assert_eq!(fields, vec!["profileId", "name"]);
    }
}
