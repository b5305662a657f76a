use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::authz::Owner;
use crate::errors::AppError;
use crate::models::entries::Certification;
use crate::resources::{ListScope, Resource};
use crate::validation::{Checks, FieldError, Validate, MAX_NAME_LEN};

pub struct Certifications;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationInput {
    pub profile_id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub issuing_organization: String,
    pub issue_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificationPatch {
    pub name: Option<String>,
    pub issuing_organization: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub expiration_date: Option<NaiveDate>,
    pub credential_id: Option<String>,
    pub credential_url: Option<String>,
}

impl Validate for CertificationInput {
    fn validate(&self) -> Vec<FieldError> {
        Checks::new()
            .check("profileId", self.profile_id.is_some(), "is required")
            .required("name", &self.name, MAX_NAME_LEN)
            .required("issuingOrganization", &self.issuing_organization, MAX_NAME_LEN)
            .date_order("expirationDate", self.issue_date, self.expiration_date)
            .max_len("credentialId", self.credential_id.as_deref(), MAX_NAME_LEN)
            .url("credentialUrl", self.credential_url.as_deref())
            .finish()
    }
}

impl Validate for CertificationPatch {
    fn validate(&self) -> Vec<FieldError> {
        Checks::new()
            .not_blank("name", self.name.as_deref(), MAX_NAME_LEN)
            .not_blank(
                "issuingOrganization",
                self.issuing_organization.as_deref(),
                MAX_NAME_LEN,
            )
            .date_order("expirationDate", self.issue_date, self.expiration_date)
            .max_len("credentialId", self.credential_id.as_deref(), MAX_NAME_LEN)
            .url("credentialUrl", self.credential_url.as_deref())
            .finish()
    }
}

#[async_trait]
impl Resource for Certifications {
    const KIND: &'static str = "Certification";
    const TABLE: &'static str = "certifications";
    const SCOPE: ListScope = ListScope::Profile;
    const ORDER_BY: &'static str = "issue_date DESC";

    type Row = Certification;
    type Create = CertificationInput;
    type Update = CertificationPatch;

    fn parent_profile(input: &CertificationInput) -> Option<Uuid> {
        input.profile_id
    }

    fn owner(row: &Certification) -> Owner {
        Owner::Profile(row.profile_id)
    }

    fn validate_merged(existing: &Certification, patch: &CertificationPatch) -> Vec<FieldError> {
        Checks::new()
            .date_order(
                "expirationDate",
                patch.issue_date.or(existing.issue_date),
                patch.expiration_date.or(existing.expiration_date),
            )
            .finish()
    }

    async fn insert(
        pool: &PgPool,
        _user_id: Uuid,
        input: CertificationInput,
    ) -> Result<Certification, AppError> {
        Ok(sqlx::query_as::<_, Certification>(
            r#"
            INSERT INTO certifications
                (id, profile_id, name, issuing_organization, issue_date, expiration_date,
                 credential_id, credential_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(input.profile_id)
        .bind(input.name.trim())
        .bind(input.issuing_organization.trim())
        .bind(input.issue_date)
        .bind(input.expiration_date)
        .bind(input.credential_id)
        .bind(input.credential_url)
        .fetch_one(pool)
        .await?)
    }

    async fn update(
        pool: &PgPool,
        id: Uuid,
        patch: CertificationPatch,
    ) -> Result<Option<Certification>, AppError> {
        Ok(sqlx::query_as::<_, Certification>(
            r#"
            UPDATE certifications SET
                name = COALESCE($2, name),
                issuing_organization = COALESCE($3, issuing_organization),
                issue_date = COALESCE($4, issue_date),
                expiration_date = COALESCE($5, expiration_date),
                credential_id = COALESCE($6, credential_id),
                credential_url = COALESCE($7, credential_url),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(patch.name.as_deref().map(str::trim))
        .bind(patch.issuing_organization.as_deref().map(str::trim))
        .bind(patch.issue_date)
        .bind(patch.expiration_date)
        .bind(patch.credential_id)
        .bind(patch.credential_url)
        .fetch_optional(pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_expiry_before_issue_rejected() {
        let input = CertificationInput {
            profile_id: Some(Uuid::new_v4()),
            name: "CKA".to_string(),
            issuing_organization: "CNCF".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2023, 5, 1),
            expiration_date: NaiveDate::from_ymd_opt(2022, 5, 1),
            ..Default::default()
        };
        assert_eq!(input.validate()[0].field, "expirationDate");
    }

    #[test]
    fn test_patch_expiry_checked_against_stored_issue_date() {
        let existing = Certification {
            id: Uuid::new_v4(),
            profile_id: Uuid::new_v4(),
            name: "CKA".to_string(),
            issuing_organization: "CNCF".to_string(),
            issue_date: NaiveDate::from_ymd_opt(2023, 5, 1),
            expiration_date: None,
            credential_id: None,
            credential_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let patch = CertificationPatch {
            expiration_date: NaiveDate::from_ymd_opt(2022, 5, 1),
            ..Default::default()
        };
        assert!(patch.validate().is_empty());
        assert_eq!(
            Certifications::validate_merged(&existing, &patch)[0].field,
            "expirationDate"
        );
    }
}
