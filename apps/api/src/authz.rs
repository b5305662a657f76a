//! Ownership checks for user- and profile-scoped resources.

use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::errors::AppError;

/// Who a row ultimately belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    User(Uuid),
    /// Resolved to a user through `profiles.user_id`.
    Profile(Uuid),
}

#[derive(Clone)]
pub struct Authorizer {
    pool: PgPool,
}

impl Authorizer {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn profile_owner(&self, profile_id: Uuid) -> Result<Option<Uuid>, AppError> {
        Ok(
            sqlx::query_scalar::<_, Uuid>("SELECT user_id FROM profiles WHERE id = $1")
                .bind(profile_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Rejects with 404 if the profile is missing and 403 if it belongs to someone else.
    pub async fn require_profile(&self, profile_id: Uuid, caller: AuthUser) -> Result<(), AppError> {
        let owner = self
            .profile_owner(profile_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile {profile_id} not found")))?;
        ensure_same_user(owner, caller)
    }

    pub async fn require(&self, owner: Owner, caller: AuthUser) -> Result<(), AppError> {
        match owner {
            Owner::User(user_id) => ensure_same_user(user_id, caller),
            Owner::Profile(profile_id) => self.require_profile(profile_id, caller).await,
        }
    }
}

pub fn ensure_same_user(owner: Uuid, caller: AuthUser) -> Result<(), AppError> {
    if owner == caller.user_id {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "This resource belongs to another user".to_string(),
        ))
    }
}
