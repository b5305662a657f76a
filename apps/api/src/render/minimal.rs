//! Minimal: plain type, no colour, skills as one comma-separated line.

use crate::render::CvLayout;

pub struct MinimalLayout;

impl CvLayout for MinimalLayout {
    fn template_name(&self) -> &'static str {
        "minimal.html"
    }

    fn source(&self) -> &'static str {
        include_str!("../../templates/cv/minimal.html")
    }
}

#[cfg(test)]
mod tests {
    use crate::render::test_fixtures::{content, no_photo, profile};
    use crate::render::{render_cv, Template};

    #[test]
    fn test_skills_on_one_line() {
        let doc = render_cv(Template::Minimal, &content(), &profile(), no_photo()).unwrap();
        assert!(doc.html.contains("<p>Go, React, Rust</p>"));
        assert!(doc.html.contains("<h1>Jane O&#x27;Brien-Smith — Staff Engineer</h1>"));
    }
}
