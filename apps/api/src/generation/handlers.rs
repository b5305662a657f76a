//! Axum route handlers for generated CVs.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::authz::ensure_same_user;
use crate::errors::AppError;
use crate::export::ExportError;
use crate::generation::assembler::{assemble_cv, AssembleRequest};
use crate::models::generated_cv::GeneratedCv;
use crate::render::{render_cv, PhotoOptions, RenderedDocument, Template};
use crate::resources::handlers::ListQuery;
use crate::state::AppState;
use crate::validation::{ensure_valid, Checks, FieldError, Validate, MAX_TEXT_LEN};

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryPatch {
    #[serde(default)]
    pub professional_summary: String,
}

impl Validate for SummaryPatch {
    fn validate(&self) -> Vec<FieldError> {
        Checks::new()
            .required("professionalSummary", &self.professional_summary, MAX_TEXT_LEN)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TemplateQuery {
    pub template: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

fn cv_not_found(id: Uuid) -> AppError {
    AppError::NotFound(format!("GeneratedCv {id} not found"))
}

async fn load_owned(state: &AppState, id: Uuid, user: AuthUser) -> Result<GeneratedCv, AppError> {
    let cv = state
        .repo
        .get_generated_cv(id)
        .await?
        .ok_or_else(|| cv_not_found(id))?;
    ensure_same_user(cv.user_id, user)?;
    Ok(cv)
}

/// Renders a stored CV, optionally through a different template than it was made with.
async fn render_stored(
    state: &AppState,
    id: Uuid,
    user: AuthUser,
    query: TemplateQuery,
) -> Result<RenderedDocument, AppError> {
    let cv = load_owned(state, id, user).await?;
    let template = match query.template.as_deref() {
        Some(name) => name.parse::<Template>()?,
        None => cv.template_name,
    };
    let content = cv.content.as_ref().ok_or_else(|| {
        AppError::Validation(format!(
            "GeneratedCv {id} has no content (status: {})",
            cv.generation_status.as_str()
        ))
    })?;
    let profile = state
        .repo
        .get_profile(cv.profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Profile {} not found", cv.profile_id)))?;

    render_cv(
        template,
        content,
        &profile,
        PhotoOptions {
            include_profile_picture: cv.include_profile_picture,
            cv_specific_photo_url: cv.cv_specific_photo_url.as_deref(),
        },
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /generated-cv
pub async fn handle_create(
    State(state): State<AppState>,
    user: AuthUser,
    Json(request): Json<AssembleRequest>,
) -> Result<(StatusCode, Json<GeneratedCv>), AppError> {
    let cv = assemble_cv(state.repo.as_ref(), state.writer.as_ref(), user, request).await?;
    Ok((StatusCode::CREATED, Json(cv)))
}

/// GET /generated-cv?userId=
pub async fn handle_list(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<GeneratedCv>>, AppError> {
    let user_id = query.user_id.unwrap_or(user.user_id);
    ensure_same_user(user_id, user)?;
    Ok(Json(state.repo.list_generated_cvs(user_id).await?))
}

/// GET /generated-cv/:id
pub async fn handle_get(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<GeneratedCv>, AppError> {
    Ok(Json(load_owned(&state, id, user).await?))
}

/// PATCH /generated-cv/:id
///
/// Replaces `professionalSummary` inside the stored content; nothing else changes.
/// A failed write leaves the stored summary untouched.
pub async fn handle_update_summary(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(patch): Json<SummaryPatch>,
) -> Result<Json<GeneratedCv>, AppError> {
    let cv = load_owned(&state, id, user).await?;
    ensure_valid(&patch)?;
    if cv.content.is_none() {
        return Err(AppError::Validation(format!(
            "GeneratedCv {id} has no content to edit (status: {})",
            cv.generation_status.as_str()
        )));
    }

    let updated = state
        .summaries
        .update_summary(id, &patch.professional_summary)
        .await?;
    Ok(Json(updated))
}

/// GET /generated-cv/:id/preview?template=
pub async fn handle_preview(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<TemplateQuery>,
) -> Result<Html<String>, AppError> {
    let doc = render_stored(&state, id, user, query).await?;
    Ok(Html(doc.html))
}

/// GET /generated-cv/:id/pdf?template=
pub async fn handle_pdf(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Query(query): Query<TemplateQuery>,
) -> Result<Response, AppError> {
    let doc = render_stored(&state, id, user, query).await?;
    let exporter = state.exporter.as_ref().ok_or(ExportError::SurfaceUnavailable)?;
    let pdf = exporter.export(&doc).await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", pdf.file_name),
            ),
        ],
        pdf.bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_summary_rejected() {
        let patch = SummaryPatch {
            professional_summary: "   ".to_string(),
        };
        assert_eq!(patch.validate()[0].field, "professionalSummary");
    }

    #[test]
    fn test_summary_patch_ignores_other_fields() {
        let patch: SummaryPatch = serde_json::from_value(serde_json::json!({
            "professionalSummary": "Edited.",
            "workExperience": []
        }))
        .unwrap();
        assert_eq!(patch.professional_summary, "Edited.");
    }
}
