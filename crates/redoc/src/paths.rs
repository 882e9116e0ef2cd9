//! Path arguments and the ReFrame script naming convention

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

use crate::error::RedocError;

/// Validate a directory argument and drop a single trailing slash.
///
/// `flag` names the argument in the error message.
pub fn normalize_dir(flag: &'static str, value: &str) -> Result<String, RedocError> {
    if value.is_empty() {
        return Err(RedocError::EmptyPath(flag));
    }
    Ok(value.strip_suffix('/').unwrap_or(value).to_string())
}

/// Locations of the scripts ReFrame generates for one test
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptPaths {
    /// rfm_<name>_job.sh (required)
    pub job: PathBuf,
    /// rfm_<name>_build.sh (optional)
    pub build: PathBuf,
}

impl ScriptPaths {
    /// Derive script paths from a normalized output directory.
    ///
    /// The test name is the last `/`-separated component of the directory.
    pub fn for_output_dir(output_dir: &str) -> Self {
        let name = output_dir.rsplit('/').next().unwrap_or(output_dir);
        let dir = PathBuf::from(output_dir);

        Self {
            job: dir.join(format!("rfm_{}_job.sh", name)),
            build: dir.join(format!("rfm_{}_build.sh", name)),
        }
    }

    /// Read build + job script, concatenated in that order.
    pub fn read_combined(&self) -> Result<String> {
        if !self.job.is_file() {
            return Err(RedocError::MissingJobScript(self.job.clone()).into());
        }
        let job = fs::read_to_string(&self.job)
            .with_context(|| format!("Failed to read job script: {}", self.job.display()))?;

        let build = if self.build.exists() {
            fs::read_to_string(&self.build)
                .with_context(|| format!("Failed to read build script: {}", self.build.display()))?
        } else {
            debug!(path = %self.build.display(), "no build script");
            String::new()
        };

        Ok(build + &job)
    }
}
