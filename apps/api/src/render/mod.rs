//! Template Renderer: maps a `GeneratedCvContent` + `Profile` to a print-ready HTML page.
//!
//! Rendering is pure: no template mutates its input and the same input always yields
//! byte-identical output. Layouts are Tera templates over a shared `PageView` context
//! with autoescaping on, so adding a template means a `CvLayout` impl and its file.

use std::str::FromStr;
use std::sync::OnceLock;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use tera::{Context, Tera};

use crate::errors::AppError;
use crate::models::generated_cv::GeneratedCvContent;
use crate::models::profile::Profile;

mod creative;
mod executive;
mod minimal;
pub mod photo;
mod professional;
pub mod skills;
pub mod summary_edit;
pub mod view;

pub use photo::{resolve_photo, PhotoOptions};
use view::PageView;

const BASE_TEMPLATE: &str = include_str!("../../templates/cv/base.html");
const MACROS_TEMPLATE: &str = include_str!("../../templates/cv/macros.html");

/// The fixed set of layouts. Unknown names are rejected, never defaulted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Template {
    #[default]
    Professional,
    Creative,
    Executive,
    Minimal,
}

impl Template {
    pub const ALL: [Template; 4] = [
        Template::Professional,
        Template::Creative,
        Template::Executive,
        Template::Minimal,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Template::Professional => "Professional",
            Template::Creative => "Creative",
            Template::Executive => "Executive",
            Template::Minimal => "Minimal",
        }
    }

    fn layout(self) -> &'static dyn CvLayout {
        match self {
            Template::Professional => &professional::ProfessionalLayout,
            Template::Creative => &creative::CreativeLayout,
            Template::Executive => &executive::ExecutiveLayout,
            Template::Minimal => &minimal::MinimalLayout,
        }
    }
}

impl FromStr for Template {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Template::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AppError::UnknownTemplate(wanted.to_string()))
    }
}

/// Everything a layout may read. Borrowed, never mutated.
pub struct RenderContext<'a> {
    pub content: &'a GeneratedCvContent,
    pub profile: &'a Profile,
    pub photo_url: Option<&'a str>,
}

pub(crate) trait CvLayout: Sync {
    /// Name the template is registered under.
    fn template_name(&self) -> &'static str;

    /// Tera source; extends `base.html`.
    fn source(&self) -> &'static str;

    /// Adds layout-specific values on top of the shared `PageView`.
    fn extend_context(&self, _ctx: &RenderContext<'_>, _context: &mut Context) {}
}

fn build_engine() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    let mut sources = vec![("base.html", BASE_TEMPLATE), ("macros.html", MACROS_TEMPLATE)];
    sources.extend(
        Template::ALL
            .iter()
            .map(|t| (t.layout().template_name(), t.layout().source())),
    );
    tera.add_raw_templates(sources)?;
    Ok(tera)
}

/// Shared engine, compiled on first use.
fn engine() -> Result<&'static Tera, AppError> {
    static ENGINE: OnceLock<Tera> = OnceLock::new();
    if let Some(tera) = ENGINE.get() {
        return Ok(tera);
    }
    let tera = build_engine().context("compiling CV templates")?;
    Ok(ENGINE.get_or_init(|| tera))
}

/// A rendered, print-ready document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub template: Template,
    /// Subject's display name; the export derives the file name from it.
    pub display_name: String,
    pub html: String,
}

/// Renders a CV through the chosen template.
pub fn render_cv(
    template: Template,
    content: &GeneratedCvContent,
    profile: &Profile,
    photo: PhotoOptions<'_>,
) -> Result<RenderedDocument, AppError> {
    let photo_url = resolve_photo(
        photo.cv_specific_photo_url,
        photo.include_profile_picture,
        profile.profile_picture_url.as_deref(),
    );
    let ctx = RenderContext {
        content,
        profile,
        photo_url,
    };

    let layout = template.layout();
    let mut context = Context::from_serialize(PageView::new(template, &ctx))
        .context("building template context")?;
    layout.extend_context(&ctx, &mut context);

    let html = engine()?
        .render(layout.template_name(), &context)
        .with_context(|| format!("rendering {} template", template.as_str()))?;

    Ok(RenderedDocument {
        template,
        display_name: profile.full_name.clone(),
        html,
    })
}

#[cfg(test)]
pub(crate) mod test_fixtures {
    use chrono::{NaiveDate, TimeZone, Utc};
    use uuid::Uuid;

    use crate::models::generated_cv::*;
    use crate::models::profile::Profile;
    use crate::render::PhotoOptions;

    pub fn no_photo() -> PhotoOptions<'static> {
        PhotoOptions {
            include_profile_picture: false,
            cv_specific_photo_url: None,
        }
    }

    pub fn profile() -> Profile {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Profile {
            id: Uuid::nil(),
            user_id: Uuid::nil(),
            full_name: "Jane O'Brien-Smith".to_string(),
            headline: Some("Staff Engineer".to_string()),
            email: Some("jane@example.com".to_string()),
            phone: Some("+1 555 0100".to_string()),
            location: Some("Dublin".to_string()),
            website: Some("https://jane.dev".to_string()),
            linkedin_url: Some("https://linkedin.com/in/jane".to_string()),
            github_url: None,
            professional_summary: Some("Builds reliable systems.".to_string()),
            profile_picture_url: Some("https://cdn.example.com/jane.png".to_string()),
            created_at: ts,
            updated_at: ts,
        }
    }

    pub fn content() -> GeneratedCvContent {
        GeneratedCvContent {
            schema_version: CONTENT_SCHEMA_VERSION,
            professional_summary: "Engineer with 10 years of <systems> work & more.".to_string(),
            target_job: None,
            work_experience: vec![CvWorkExperience {
                job_title: "Staff Engineer".to_string(),
                company: "Acme".to_string(),
                location: Some("Remote".to_string()),
                start_date: NaiveDate::from_ymd_opt(2020, 3, 1).unwrap(),
                end_date: None,
                is_current: true,
                description: Some("Led the storage team.".to_string()),
            }],
            education: vec![CvEducation {
                institution: "Trinity College".to_string(),
                degree: "BSc".to_string(),
                field_of_study: Some("Computer Science".to_string()),
                start_date: NaiveDate::from_ymd_opt(2010, 9, 1),
                end_date: NaiveDate::from_ymd_opt(2014, 6, 1),
                grade: None,
                description: None,
            }],
            skills: vec![
                CvSkill {
                    name: "Go".to_string(),
                    category: Some("Backend".to_string()),
                    proficiency: None,
                },
                CvSkill {
                    name: "React".to_string(),
                    category: Some("Frontend".to_string()),
                    proficiency: None,
                },
                CvSkill {
                    name: "Rust".to_string(),
                    category: Some("Backend".to_string()),
                    proficiency: Some("Expert".to_string()),
                },
            ],
            projects: vec![],
            certifications: vec![],
            languages: vec![],
            section_titles: None,
        }
    }
}
