//! Project id discovery for express keys
//!
//! Vertex AI addresses most endpoints by project, but an express key does not
//! reveal its project directly. The resolver probes a project-less endpoint
//! and reads the project id out of the resulting 404 message.

pub mod probe;
pub mod resolver;

pub use probe::{extract_project_id, ProbeOutcome, ResolutionError};
pub use resolver::ProjectResolver;
