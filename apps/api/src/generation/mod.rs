// CV Assembler: snapshots a profile into a generated CV and writes its summary.
// All LLM calls go through llm_client; the writer port keeps assembly testable offline.

pub mod assembler;
pub mod handlers;
pub mod prompts;
pub mod tone;
pub mod writer;
