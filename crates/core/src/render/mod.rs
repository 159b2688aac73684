//! Render worker supervision.
//!
//! The worker is an external process (normally the Python renderer) that is
//! opaque beyond its exit code and the files it leaves in `output/`. This
//! module starts it, captures its output into the job log and records how
//! it ended.

pub mod command;
pub mod marker;
pub mod supervisor;

pub use command::{RenderCommand, RenderQuality};
pub use marker::ExitMarker;
pub use supervisor::RenderSupervisor;
