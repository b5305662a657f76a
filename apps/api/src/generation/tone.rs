//! Tone calibration: maps the requested CV tone to phrasing guidance for the writer.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::AppError;

/// Requested voice of the generated summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CvTone {
    #[default]
    Professional,
    Enthusiastic,
    Concise,
    Formal,
}

impl CvTone {
    pub fn as_str(self) -> &'static str {
        match self {
            CvTone::Professional => "professional",
            CvTone::Enthusiastic => "enthusiastic",
            CvTone::Concise => "concise",
            CvTone::Formal => "formal",
        }
    }
}

impl FromStr for CvTone {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "professional" => Ok(CvTone::Professional),
            "enthusiastic" => Ok(CvTone::Enthusiastic),
            "concise" => Ok(CvTone::Concise),
            "formal" => Ok(CvTone::Formal),
            other => Err(AppError::Validation(format!(
                "tone must be one of professional, enthusiastic, concise, formal (got '{other}')"
            ))),
        }
    }
}

/// Phrasing guidance handed to the text generator.
#[derive(Debug, Clone)]
pub struct ToneGuide {
    pub strong_verbs: Vec<&'static str>,
    pub register: &'static str,
    pub avoid: Vec<&'static str>,
    pub max_sentences: u8,
}

pub fn get_tone_guide(tone: CvTone) -> ToneGuide {
    match tone {
        CvTone::Professional => ToneGuide {
            strong_verbs: vec!["Delivered", "Led", "Built", "Improved", "Designed"],
            register: "clear, confident and factual",
            avoid: vec!["passionate", "rockstar", "ninja"],
            max_sentences: 4,
        },
        CvTone::Enthusiastic => ToneGuide {
            strong_verbs: vec!["Championed", "Launched", "Drove", "Shipped", "Grew"],
            register: "energetic and warm, still grounded in facts",
            avoid: vec!["synergy", "guru"],
            max_sentences: 4,
        },
        CvTone::Concise => ToneGuide {
            strong_verbs: vec!["Built", "Led", "Shipped", "Cut", "Scaled"],
            register: "terse, no filler words",
            avoid: vec!["very", "really", "various", "responsible for"],
            max_sentences: 2,
        },
        CvTone::Formal => ToneGuide {
            strong_verbs: vec!["Directed", "Administered", "Established", "Oversaw"],
            register: "formal and impersonal, third person",
            avoid: vec!["awesome", "cool", "I'm"],
            max_sentences: 5,
        },
    }
}
