//! Render job orchestration domain logic.
//!
//! Everything here works on the job storage directory and the render
//! worker process; HTTP concerns live in the `api` crate.

pub mod artifact;
pub mod error;
pub mod job;
pub mod log_text;
pub mod progress;
pub mod render;
pub mod specification;
pub mod status;
pub mod workspace;
