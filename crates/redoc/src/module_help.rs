//! Module help text from the environment-module system
//!
//! Lmod's `spider` can dump the whole module tree as JSON
//! (`-o jsonSoftwarePage`). We pick out the help string of one package.

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use std::path::PathBuf;
use std::process::Command;
use std::sync::LazyLock;
use tracing::debug;

use crate::error::RedocError;

/// Help text that only tells you to load the module is not worth showing
static MODULE_LOAD_BOILERPLATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*module load").expect("valid regex"));

/// Something that can produce the JSON software page
pub trait ModuleIndex {
    fn software_page(&self) -> Result<String>;
}

/// Lmod spider invoked through the shell so `$MODULEPATH` is expanded
#[derive(Debug, Clone)]
pub struct LmodSpider {
    pub lmodrc_lua: PathBuf,
    pub spider: PathBuf,
}

impl LmodSpider {
    pub fn new(lmodrc_lua: impl Into<PathBuf>, spider: impl Into<PathBuf>) -> Self {
        Self {
            lmodrc_lua: lmodrc_lua.into(),
            spider: spider.into(),
        }
    }
}

impl ModuleIndex for LmodSpider {
    fn software_page(&self) -> Result<String> {
        debug!(spider = %self.spider.display(), "querying module tree");

        let output = Command::new("sh")
            .arg("-c")
            .arg(r#""$1" -o jsonSoftwarePage "$MODULEPATH""#)
            .arg("sh")
            .arg(&self.spider)
            .env("LMOD_RC", &self.lmodrc_lua)
            .output()
            .with_context(|| format!("Failed to run {}", self.spider.display()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(RedocError::ModuleQuery(format!(
                "{} exited with {}: {}",
                self.spider.display(),
                output.status,
                stderr
            ))
            .into());
        }

        String::from_utf8(output.stdout).context("spider output is not valid UTF-8")
    }
}

#[derive(Debug, Deserialize)]
struct Package {
    package: String,
    #[serde(default)]
    versions: Vec<Version>,
}

#[derive(Debug, Deserialize)]
struct Version {
    help: Option<String>,
}

/// Find the help text for `module` in a JSON software page.
///
/// Returns an empty string when the module is unknown, has no help, or
/// the help is just `module load` instructions.
pub fn extract_help(software_page: &str, module: &str) -> Result<String> {
    let packages: Vec<Package> =
        serde_json::from_str(software_page).context("Failed to parse module JSON")?;

    let help = packages
        .into_iter()
        .find(|p| p.package == module)
        .and_then(|p| p.versions.into_iter().next())
        .and_then(|v| v.help)
        .unwrap_or_default();

    if MODULE_LOAD_BOILERPLATE.is_match(&help) {
        debug!(module, "discarding module load boilerplate help");
        return Ok(String::new());
    }

    Ok(help)
}

/// Query `index` and extract the help for `module`
pub fn fetch_help(index: &dyn ModuleIndex, module: &str) -> Result<String> {
    let page = index.software_page()?;
    extract_help(&page, module)
}
