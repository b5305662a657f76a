pub mod entries;
pub mod feedback;
pub mod generated_cv;
pub mod job_posting;
pub mod profile;
