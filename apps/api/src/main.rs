mod auth;
mod authz;
mod config;
mod db;
mod errors;
mod export;
mod generation;
mod llm_client;
mod models;
mod render;
mod repository;
mod resources;
mod routes;
mod state;
mod validation;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::JwtVerifier;
use crate::authz::Authorizer;
use crate::config::Config;
use crate::db::create_pool;
use crate::export::{pdf::RasterPdfEncoder, remote::RemoteSurface, ExportPipeline, PdfExporter};
use crate::generation::writer::{CvWriter, LlmCvWriter, ProfileSummaryWriter};
use crate::llm_client::LlmClient;
use crate::render::summary_edit::RepositorySummaryUpdater;
use crate::repository::{CvRepository, PgRepository};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV builder API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL (runs migrations)
    let db = create_pool(&config.database_url).await?;

    // Summary writer: LLM when a key is configured, the profile's own summary otherwise
    let writer: Arc<dyn CvWriter> = match &config.anthropic_api_key {
        Some(key) => {
            let llm = LlmClient::new(key.clone())?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Arc::new(LlmCvWriter::new(llm))
        }
        None => {
            warn!("ANTHROPIC_API_KEY not set; CVs will reuse the profile summary");
            Arc::new(ProfileSummaryWriter)
        }
    };

    let exporter = build_exporter(&config)?;

    let repo: Arc<dyn CvRepository> = Arc::new(PgRepository::new(db.clone()));
    let state = AppState {
        db: db.clone(),
        repo: repo.clone(),
        authz: Authorizer::new(db),
        jwt: JwtVerifier::new(&config.jwt_secret),
        writer,
        summaries: Arc::new(RepositorySummaryUpdater::new(repo)),
        exporter,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// PDF export needs a headless render service; without one the endpoint answers 502.
fn build_exporter(config: &Config) -> Result<Option<Arc<PdfExporter>>> {
    let Some(url) = config.render_service_url.as_deref() else {
        warn!("RENDER_SERVICE_URL not set; PDF export disabled");
        return Ok(None);
    };
    let surface = RemoteSurface::new(url)?;
    info!(
        "PDF export via {url} (settle {}ms)",
        config.export_settle.as_millis()
    );
    Ok(Some(Arc::new(
        ExportPipeline::new(surface, RasterPdfEncoder).with_settle(config.export_settle),
    )))
}
