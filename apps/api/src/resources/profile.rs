use async_trait::async_trait;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::authz::Owner;
use crate::errors::AppError;
use crate::models::profile::Profile;
use crate::resources::{ListScope, Resource};
use crate::validation::{Checks, FieldError, Validate, MAX_NAME_LEN, MAX_TEXT_LEN};

const MAX_PHONE_LEN: usize = 50;

pub struct Profiles;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    #[serde(default)]
    pub full_name: String,
    pub headline: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub professional_summary: Option<String>,
    pub profile_picture_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePatch {
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub linkedin_url: Option<String>,
    pub github_url: Option<String>,
    pub professional_summary: Option<String>,
    pub profile_picture_url: Option<String>,
}

/// Checks shared by create and patch; everything except the name.
#[allow(clippy::too_many_arguments)]
fn check_details(
    checks: &mut Checks,
    headline: Option<&str>,
    email: Option<&str>,
    phone: Option<&str>,
    location: Option<&str>,
    urls: [(&str, Option<&str>); 4],
    summary: Option<&str>,
) {
    checks
        .max_len("headline", headline, MAX_NAME_LEN)
        .email("email", email)
        .max_len("phone", phone, MAX_PHONE_LEN)
        .max_len("location", location, MAX_NAME_LEN)
        .max_len("professionalSummary", summary, MAX_TEXT_LEN);
    for (field, url) in urls {
        checks.url(field, url);
    }
}

impl Validate for ProfileInput {
    fn validate(&self) -> Vec<FieldError> {
        let mut checks = Checks::new();
        checks.required("fullName", &self.full_name, MAX_NAME_LEN);
        check_details(
            &mut checks,
            self.headline.as_deref(),
            self.email.as_deref(),
            self.phone.as_deref(),
            self.location.as_deref(),
            [
                ("website", self.website.as_deref()),
                ("linkedinUrl", self.linkedin_url.as_deref()),
                ("githubUrl", self.github_url.as_deref()),
                ("profilePictureUrl", self.profile_picture_url.as_deref()),
            ],
            self.professional_summary.as_deref(),
        );
        checks.finish()
    }
}

impl Validate for ProfilePatch {
    fn validate(&self) -> Vec<FieldError> {
        let mut checks = Checks::new();
        checks.not_blank("fullName", self.full_name.as_deref(), MAX_NAME_LEN);
        check_details(
            &mut checks,
            self.headline.as_deref(),
            self.email.as_deref(),
            self.phone.as_deref(),
            self.location.as_deref(),
            [
                ("website", self.website.as_deref()),
                ("linkedinUrl", self.linkedin_url.as_deref()),
                ("githubUrl", self.github_url.as_deref()),
                ("profilePictureUrl", self.profile_picture_url.as_deref()),
            ],
            self.professional_summary.as_deref(),
        );
        checks.finish()
    }
}

#[async_trait]
impl Resource for Profiles {
    const KIND: &'static str = "Profile";
    const TABLE: &'static str = "profiles";
    const SCOPE: ListScope = ListScope::User;
    const ORDER_BY: &'static str = "created_at ASC";

    type Row = Profile;
    type Create = ProfileInput;
    type Update = ProfilePatch;

    fn parent_profile(_input: &ProfileInput) -> Option<Uuid> {
        None
    }

    fn owner(row: &Profile) -> Owner {
        Owner::User(row.user_id)
    }

    async fn insert(pool: &PgPool, user_id: Uuid, input: ProfileInput) -> Result<Profile, AppError> {
        sqlx::query_as::<_, Profile>(
            r#"
            INSERT INTO profiles
                (id, user_id, full_name, headline, email, phone, location, website,
                 linkedin_url, github_url, professional_summary, profile_picture_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(input.full_name.trim())
        .bind(input.headline)
        .bind(input.email)
        .bind(input.phone)
        .bind(input.location)
        .bind(input.website)
        .bind(input.linkedin_url)
        .bind(input.github_url)
        .bind(input.professional_summary)
        .bind(input.profile_picture_url)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::from_insert(e, "A profile for this user"))
    }

    async fn update(pool: &PgPool, id: Uuid, patch: ProfilePatch) -> Result<Option<Profile>, AppError> {
        Ok(sqlx::query_as::<_, Profile>(
            r#"
            UPDATE profiles SET
                full_name = COALESCE($2, full_name),
                headline = COALESCE($3, headline),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                location = COALESCE($6, location),
                website = COALESCE($7, website),
                linkedin_url = COALESCE($8, linkedin_url),
                github_url = COALESCE($9, github_url),
                professional_summary = COALESCE($10, professional_summary),
                profile_picture_url = COALESCE($11, profile_picture_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.full_name.as_deref().map(str::trim))
        .bind(patch.headline)
        .bind(patch.email)
        .bind(patch.phone)
        .bind(patch.location)
        .bind(patch.website)
        .bind(patch.linkedin_url)
        .bind(patch.github_url)
        .bind(patch.professional_summary)
        .bind(patch.profile_picture_url)
        .fetch_optional(pool)
        .await?)
    }
}
