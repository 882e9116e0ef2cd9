//! Source directory probing

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Which makefile the source directory ships, if any.
///
/// `Makefile` wins over `makefile`; empty when neither exists.
pub fn detect_makefile(src_dir: &Path) -> &'static str {
    ["Makefile", "makefile"]
        .into_iter()
        .find(|name| src_dir.join(name).exists())
        .unwrap_or("")
}

/// Names of the immediate entries of `dir`, sorted
pub fn list_entries(dir: &Path) -> Result<Vec<String>> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .with_context(|| format!("Failed to list directory: {}", dir.display()))?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();

    names.sort();
    Ok(names)
}

/// Read a file as UTF-8 text; `None` when it does not decode (binary)
pub fn read_text(path: &Path) -> Result<Option<String>> {
    let bytes = fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(String::from_utf8(bytes).ok())
}
