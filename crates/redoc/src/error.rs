//! Errors with a meaning of their own
//!
//! Everything else travels as `anyhow::Error` with context attached.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RedocError {
    /// A path argument was given as an empty string
    #[error("please enter a non-empty string for {0}")]
    EmptyPath(&'static str),

    #[error("job script not found: {}", .0.display())]
    MissingJobScript(PathBuf),

    #[error("module query failed: {0}")]
    ModuleQuery(String),

    #[error("template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),
}
