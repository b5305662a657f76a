//! Creative: coloured sidebar (photo, contact, skill tags, languages) beside the main column.

use crate::render::CvLayout;

pub struct CreativeLayout;

impl CvLayout for CreativeLayout {
    fn template_name(&self) -> &'static str {
        "creative.html"
    }

    fn source(&self) -> &'static str {
        include_str!("../../templates/cv/creative.html")
    }
}
