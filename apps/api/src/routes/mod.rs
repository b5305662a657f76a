pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers as cv;
use crate::resources::{
    handlers, Certifications, Educations, Feedbacks, JobPostings, Languages, Profiles, Projects,
    Resource, Skills, WorkExperiences,
};
use crate::state::AppState;

/// `POST/GET /<path>` and `GET/PATCH/DELETE /<path>/:id` for one resource.
fn crud<R: Resource>(path: &str) -> Router<AppState> {
    Router::new()
        .route(path, get(handlers::list::<R>).post(handlers::create::<R>))
        .route(
            &format!("{path}/:id"),
            get(handlers::get::<R>)
                .patch(handlers::update::<R>)
                .delete(handlers::delete::<R>),
        )
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Content repository
        .merge(crud::<Profiles>("/profile"))
        .merge(crud::<WorkExperiences>("/work-experience"))
        .merge(crud::<Educations>("/education"))
        .merge(crud::<Skills>("/skill"))
        .merge(crud::<Projects>("/project"))
        .merge(crud::<Certifications>("/certification"))
        .merge(crud::<Languages>("/language"))
        .merge(crud::<JobPostings>("/job-postings"))
        .merge(crud::<Feedbacks>("/feedback"))
        // Generated CVs (append-only: no DELETE)
        .route("/generated-cv", post(cv::handle_create).get(cv::handle_list))
        .route(
            "/generated-cv/:id",
            get(cv::handle_get).patch(cv::handle_update_summary),
        )
        .route("/generated-cv/:id/preview", get(cv::handle_preview))
        .route("/generated-cv/:id/pdf", get(cv::handle_pdf))
        .with_state(state)
}
