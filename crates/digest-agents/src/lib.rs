//! Batch driver for the digest content validation gates.
//!
//! Reads generated content records from disk, runs them through a shared
//! [`gatekeeper::ValidationPipeline`], and writes the annotated records back
//! out for the site generator.

pub mod batch;
pub mod settings;
pub mod status;

pub use batch::{validate_files, BatchOptions, FileOutcome};
pub use settings::Overrides;
