//! Prompt fragments shared by every model call.

/// Keeps generated text tied to the supplied profile.
pub const GROUNDING_INSTRUCTION: &str = "\
    CRITICAL: Use only facts present in the profile data provided. \
    Do NOT invent employers, titles, dates, degrees, metrics or skills. \
    If the profile does not support a claim, leave it out.";
