//! Gather everything about one test run and write its page

use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::annotate::annotate;
use crate::module_help::{fetch_help, ModuleIndex};
use crate::paths::ScriptPaths;
use crate::probe::{detect_makefile, list_entries};
use crate::relevance::{classify, find_relevant, Inputs};
use crate::render::{write_doc, DocContext, Renderer};

/// Inputs for one page, already validated
pub struct Options<'a> {
    pub module: String,
    /// Normalized test output directory
    pub output_dir: String,
    /// Normalized test source directory
    pub src_dir: Option<String>,
    pub module_index: Option<&'a dyn ModuleIndex>,
    pub docs_dir: PathBuf,
    pub template: Option<PathBuf>,
}

/// Collect the template values for `opts`
pub fn build_context(opts: &Options) -> Result<DocContext> {
    let module_help = match opts.module_index {
        Some(index) => fetch_help(index, &opts.module)?,
        None => {
            debug!("no module query configured, skipping help text");
            String::new()
        }
    };

    let src_dir = opts.src_dir.as_deref().map(Path::new);
    let makefile = src_dir.map(detect_makefile).unwrap_or("");

    let script = ScriptPaths::for_output_dir(&opts.output_dir).read_combined()?;

    let inputs = match src_dir {
        Some(dir) => {
            let candidates = list_entries(dir)?;
            let relevant = find_relevant(dir, &candidates, &script)?;
            debug!(count = relevant.len(), "relevant source entries");
            classify(dir, relevant)
        }
        None => Inputs::default(),
    };

    let annotated = annotate(&script, &opts.module);
    if annotated.run_commands.is_empty() {
        warn!(output_dir = %opts.output_dir, "scripts contain no commands");
    }

    Ok(DocContext {
        module: opts.module.clone(),
        module_help,
        source_files: inputs.source_files,
        makefile: makefile.to_string(),
        input_files: inputs.input_files,
        input_directories: inputs.input_directories,
        repository: opts.src_dir.clone().unwrap_or_default(),
        run_commands: annotated.run_commands,
        attribution: annotated.attribution,
    })
}

/// Build the page for `opts` and write it; returns the written path
pub fn generate(opts: &Options) -> Result<PathBuf> {
    let ctx = build_context(opts)?;

    let src_dir = opts.src_dir.as_deref().map(Path::new);
    let renderer = match &opts.template {
        Some(path) => Renderer::from_file(path, src_dir)?,
        None => Renderer::new(src_dir)?,
    };
    let page = renderer.render(&ctx)?;

    write_doc(&opts.docs_dir, &opts.module, &page)
}
