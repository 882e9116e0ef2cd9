//! Which files of the source directory a test actually uses
//!
//! A file counts as used when its name, minus extension, shows up in the
//! job/build scripts or in another used text file. This is a plain
//! substring test, so short names over-match (`a` is found in `cat`).

use anyhow::Result;
use regex::Regex;
use std::collections::{HashSet, VecDeque};
use std::path::Path;
use std::sync::LazyLock;
use tracing::debug;

use crate::probe::read_text;

/// File extensions shown as source code
const SOURCE_EXTENSIONS: &[&str] = &[
    "c", "cc", "cpp",                   // C/C++
    "java",                             // Java
    "pl",                               // Perl
    "vb",                               // Visual Basic
    "swift",                            // Swift
    "f90", "f95", "f03", "for", "f",    // Fortran
    "py",                               // Python
    "sh",                               // Shell
];

static SOURCE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    let alternatives = SOURCE_EXTENSIONS.join("|");
    Regex::new(&format!(r"^[\S ]+\.({})$", alternatives)).expect("valid regex")
});

/// Relevant entries of a source directory, by kind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Inputs {
    pub source_files: Vec<String>,
    pub input_files: Vec<String>,
    pub input_directories: Vec<String>,
}

/// Name up to the first `.`
fn stem(name: &str) -> &str {
    name.split('.').next().unwrap_or(name)
}

/// Whether `name` looks like a source file
pub fn has_source_extension(name: &str) -> bool {
    SOURCE_NAME.is_match(name)
}

/// Find the entries of `src_dir` referenced from `text`, transitively.
///
/// `candidates` are entry names inside `src_dir`. Text files that are found
/// are scanned in turn; binary files and directories are leaves. Results
/// are in order of discovery.
pub fn find_relevant(src_dir: &Path, candidates: &[String], text: &str) -> Result<Vec<String>> {
    let mut found: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut pending: VecDeque<String> = VecDeque::from([text.to_string()]);

    while let Some(blob) = pending.pop_front() {
        for name in candidates {
            let key = stem(name);
            // dotfiles have an empty stem, which would match anything
            if key.is_empty() || seen.contains(name.as_str()) || !blob.contains(key) {
                continue;
            }

            seen.insert(name);
            found.push(name.clone());

            let path = src_dir.join(name);
            if !path.is_file() {
                continue;
            }
            match read_text(&path)? {
                Some(contents) => pending.push_back(contents),
                None => debug!(file = %name, "binary file, not scanning"),
            }
        }
    }

    Ok(found)
}

/// Sort relevant entries into directories, source files and other inputs
pub fn classify(src_dir: &Path, relevant: Vec<String>) -> Inputs {
    let mut inputs = Inputs::default();

    for name in relevant {
        if src_dir.join(&name).is_dir() {
            inputs.input_directories.push(name);
        } else if has_source_extension(&name) {
            inputs.source_files.push(name);
        } else {
            inputs.input_files.push(name);
        }
    }

    inputs
}
