use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::JwtVerifier;
use crate::authz::Authorizer;
use crate::export::PdfExporter;
use crate::generation::writer::CvWriter;
use crate::render::summary_edit::SummaryUpdater;
use crate::repository::CvRepository;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub repo: Arc<dyn CvRepository>,
    pub authz: Authorizer,
    pub jwt: JwtVerifier,
    /// `LlmCvWriter` when an API key is configured, `ProfileSummaryWriter` otherwise.
    pub writer: Arc<dyn CvWriter>,
    pub summaries: Arc<dyn SummaryUpdater>,
    /// `None` when no render service is configured; PDF export then fails cleanly.
    pub exporter: Option<Arc<PdfExporter>>,
}
