//! Short previews of input files and directories for the rendered page

use anyhow::Result;
use std::path::Path;

use crate::probe::{list_entries, read_text};

/// Lines of a file shown before cutting off
pub const LINE_LIMIT: usize = 50;

/// Longest line shown in full, in characters
pub const MAX_LINE_LENGTH: usize = 120;

/// Directory entries listed before cutting off
pub const ITEM_LIMIT: usize = 25;

/// Appended to a file preview that was cut off
pub const FILE_TRUNCATION_MARKER: &str = ".\n.\n.\n";

/// Appended to a directory listing that was cut off
pub const DIR_TRUNCATION_MARKER: &str = ".\n.\n.";

/// First `LINE_LIMIT` lines of `src_dir/name`, long lines shortened
pub fn include_src_file(src_dir: &Path, name: &str) -> Result<String> {
    let Some(content) = read_text(&src_dir.join(name))? else {
        return Ok(format!(
            "(Unable to show preview of file '{}' because it is a binary.)",
            name
        ));
    };

    let mut preview = String::new();
    let mut lines = content.split_inclusive('\n');

    for line in lines.by_ref().take(LINE_LIMIT) {
        let body = line.trim_end_matches(['\n', '\r']);
        if body.chars().count() > MAX_LINE_LENGTH {
            preview.extend(body.chars().take(MAX_LINE_LENGTH - 3));
            preview.push_str("...");
            preview.push_str(&line[body.len()..]);
        } else {
            preview.push_str(line);
        }
    }

    if lines.next().is_some() {
        preview.push_str(FILE_TRUNCATION_MARKER);
    }

    Ok(preview)
}

/// Bullet list of the first `ITEM_LIMIT` entries of `src_dir/name`
pub fn include_input_dir(src_dir: &Path, name: &str) -> Result<String> {
    let entries = list_entries(&src_dir.join(name))?;

    let mut listing: String = entries
        .iter()
        .take(ITEM_LIMIT)
        .map(|entry| format!("- {}\n", entry))
        .collect();

    if entries.len() > ITEM_LIMIT {
        listing.push_str(DIR_TRUNCATION_MARKER);
    }

    Ok(listing)
}
