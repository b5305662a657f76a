// Prompt constants for CV text generation.
// Cross-cutting fragments live in llm_client::prompts.

/// System prompt for the summary writer.
pub const SUMMARY_SYSTEM: &str = "You are an expert CV writer. \
    You write the professional summary of a CV from verified profile data. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Summary prompt template.
/// Replace: {grounding_instruction}, {tone}, {tone_json}, {language},
///          {section_keys}, {profile_json}, {job_json}
pub const SUMMARY_PROMPT_TEMPLATE: &str = r#"{grounding_instruction}

Write the professional summary for the CV described below.

TONE: {tone}
TONE GUIDE (verbs to prefer, register, words to avoid, maximum sentences):
{tone_json}

OUTPUT LANGUAGE: write every string in the language with tag "{language}".

If the output language is not English, also translate the section titles.
Valid section keys: {section_keys}

Return a JSON object with this EXACT schema:
{
  "professionalSummary": "2-5 sentences",
  "sectionTitles": {"experience": "translated title"}
}
Omit "sectionTitles" when writing English.

PROFILE:
{profile_json}

TARGET JOB (tailor the summary toward it; may be null):
{job_json}"#;
