//! Generic CRUD handlers, instantiated per resource in `routes::build_router`.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::authz::ensure_same_user;
use crate::errors::AppError;
use crate::resources::{delete_row, fetch_row, list_rows, not_found, ListScope, Resource};
use crate::state::AppState;
use crate::validation::ensure_valid;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    pub profile_id: Option<Uuid>,
    pub user_id: Option<Uuid>,
}

/// POST /<resource>
pub async fn create<R: Resource>(
    State(state): State<AppState>,
    user: AuthUser,
    Json(input): Json<R::Create>,
) -> Result<(StatusCode, Json<R::Row>), AppError> {
    ensure_valid(&input)?;
    if let Some(profile_id) = R::parent_profile(&input) {
        state.authz.require_profile(profile_id, user).await?;
    }
    let row = R::insert(&state.db, user.user_id, input).await?;
    info!("Created {} for user {}", R::KIND, user.user_id);
    Ok((StatusCode::CREATED, Json(row)))
}

/// GET /<resource>?profileId= | ?userId=
pub async fn list<R: Resource>(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<R::Row>>, AppError> {
    let scope_id = match R::SCOPE {
        ListScope::Profile => {
            let profile_id = query.profile_id.ok_or_else(|| {
                AppError::Validation("profileId query parameter is required".to_string())
            })?;
            state.authz.require_profile(profile_id, user).await?;
            profile_id
        }
        ListScope::User => {
            let user_id = query.user_id.unwrap_or(user.user_id);
            ensure_same_user(user_id, user)?;
            user_id
        }
    };
    Ok(Json(list_rows::<R>(&state.db, scope_id).await?))
}

/// GET /<resource>/:id
pub async fn get<R: Resource>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<R::Row>, AppError> {
    let row = fetch_row::<R>(&state.db, id)
        .await?
        .ok_or_else(|| not_found::<R>(id))?;
    state.authz.require(R::owner(&row), user).await?;
    Ok(Json(row))
}

/// PATCH /<resource>/:id
pub async fn update<R: Resource>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<R::Update>,
) -> Result<Json<R::Row>, AppError> {
    let existing = fetch_row::<R>(&state.db, id)
        .await?
        .ok_or_else(|| not_found::<R>(id))?;
    state.authz.require(R::owner(&existing), user).await?;
    ensure_valid(&patch)?;
    let merged = R::validate_merged(&existing, &patch);
    if !merged.is_empty() {
        return Err(AppError::InvalidFields(merged));
    }

    let row = R::update(&state.db, id, patch)
        .await?
        .ok_or_else(|| not_found::<R>(id))?;
    Ok(Json(row))
}

/// DELETE /<resource>/:id
pub async fn delete<R: Resource>(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let existing = fetch_row::<R>(&state.db, id)
        .await?
        .ok_or_else(|| not_found::<R>(id))?;
    state.authz.require(R::owner(&existing), user).await?;

    if !delete_row::<R>(&state.db, id).await? {
        return Err(not_found::<R>(id));
    }
    info!("Deleted {} {id}", R::KIND);
    Ok(StatusCode::NO_CONTENT)
}
