//! redoc - Module documentation from ReFrame test runs
//!
//! Reads the job/build scripts a ReFrame test left in its output directory,
//! works out which files of the test's source directory the scripts use,
//! and renders a markdown page describing how to run the example.

pub mod annotate;
pub mod config;
pub mod error;
pub mod module_help;
pub mod paths;
pub mod pipeline;
pub mod preview;
pub mod probe;
pub mod relevance;
pub mod render;

pub use config::Config;
pub use error::RedocError;
pub use pipeline::{generate, Options};
