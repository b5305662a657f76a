//! Executive: dark banner header, summary first, grouped "core competencies" grid.

use tera::Context;

use crate::render::skills::group_skills_by_category;
use crate::render::{CvLayout, RenderContext};

pub struct ExecutiveLayout;

impl CvLayout for ExecutiveLayout {
    fn template_name(&self) -> &'static str {
        "executive.html"
    }

    fn source(&self) -> &'static str {
        include_str!("../../templates/cv/executive.html")
    }

    fn extend_context(&self, ctx: &RenderContext<'_>, context: &mut Context) {
        context.insert("skill_groups", &group_skills_by_category(&ctx.content.skills));
    }
}

#[cfg(test)]
mod tests {
    use crate::render::test_fixtures::{content, no_photo, profile};
    use crate::render::{render_cv, Template};

    #[test]
    fn test_summary_precedes_experience() {
        let doc = render_cv(Template::Executive, &content(), &profile(), no_photo()).unwrap();
        let out = doc.html;
        let summary = out.find("<section class=\"cv-section cv-summary\">").unwrap();
        let grid = out.find("<div class=\"exec-grid\">").unwrap();
        let experience = out.find("<section class=\"cv-section cv-experience\">").unwrap();
        assert!(summary < grid && grid < experience);
        assert!(out.contains("<h4>Backend</h4><ul><li>Go</li><li>Rust</li></ul>"));
    }
}
