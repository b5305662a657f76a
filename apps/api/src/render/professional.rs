//! Professional: single column, blue accents, skills listed as category rows.

use tera::Context;

use crate::render::skills::group_skills_by_category;
use crate::render::{CvLayout, RenderContext};

pub struct ProfessionalLayout;

impl CvLayout for ProfessionalLayout {
    fn template_name(&self) -> &'static str {
        "professional.html"
    }

    fn source(&self) -> &'static str {
        include_str!("../../templates/cv/professional.html")
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
    fn test_skills_rendered_as_category_rows() {
        let doc = render_cv(Template::Professional, &content(), &profile(), no_photo()).unwrap();
        let out = doc.html;
        assert!(out.contains("<span class=\"pro-skill-cat\">Backend</span><span>Go, Rust</span>"));
        assert!(out.contains("<span class=\"pro-skill-cat\">Frontend</span><span>React</span>"));
        assert!(out.find(">Backend<").unwrap() < out.find(">Frontend<").unwrap());
    }
}
