//! Rendering the documentation page
//!
//! The page is a Handlebars template. The built-in one is compiled into the
//! binary; a replacement can be configured. Two helpers let the template
//! pull in previews of the test's input files:
//!
//! - `{{include_src_file name}}` - first lines of a file
//! - `{{include_input_dir name}}` - bullet list of a directory

use anyhow::{Context as _, Result};
use handlebars::{
    Context, Handlebars, Helper, HelperDef, HelperResult, Output, RenderContext, RenderErrorReason,
};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::RedocError;
use crate::preview;

/// Built-in page template
pub const DEFAULT_TEMPLATE: &str = include_str!("../templates/doc.md.hbs");

const TEMPLATE_NAME: &str = "doc";

/// Everything the template can refer to
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocContext {
    pub module: String,
    pub module_help: String,
    pub source_files: Vec<String>,
    pub makefile: String,
    pub input_files: Vec<String>,
    pub input_directories: Vec<String>,
    pub repository: String,
    pub run_commands: String,
    pub attribution: String,
}

type Preview = fn(&Path, &str) -> Result<String>;

/// Template helper that previews an entry of the source directory
struct PreviewHelper {
    name: &'static str,
    src_dir: Option<PathBuf>,
    preview: Preview,
}

impl HelperDef for PreviewHelper {
    fn call<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
        out: &mut dyn Output,
    ) -> HelperResult {
        let entry = h
            .param(0)
            .and_then(|p| p.value().as_str())
            .ok_or(RenderErrorReason::ParamNotFoundForIndex(self.name, 0))?;

        let src_dir = self.src_dir.as_deref().ok_or_else(|| {
            RenderErrorReason::Other(format!("{}: no source directory given", self.name))
        })?;

        let text = (self.preview)(src_dir, entry)
            .map_err(|e| RenderErrorReason::Other(format!("{}: {:#}", self.name, e)))?;
        out.write(&text)?;
        // keep whatever follows on its own line
        if !text.is_empty() && !text.ends_with('\n') {
            out.write("\n")?;
        }
        Ok(())
    }
}

/// Template registry with the preview helpers bound to one source directory
pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    /// Renderer for the built-in template
    pub fn new(src_dir: Option<&Path>) -> Result<Self> {
        Self::with_template(DEFAULT_TEMPLATE, src_dir)
    }

    /// Renderer for a template read from `path`
    pub fn from_file(path: &Path, src_dir: Option<&Path>) -> Result<Self> {
        if !path.is_file() {
            return Err(RedocError::TemplateNotFound(path.to_path_buf()).into());
        }
        let template = fs::read_to_string(path)
            .with_context(|| format!("Failed to read template: {}", path.display()))?;
        Self::with_template(&template, src_dir)
    }

    pub fn with_template(template: &str, src_dir: Option<&Path>) -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.register_escape_fn(handlebars::no_escape);
        registry
            .register_template_string(TEMPLATE_NAME, template)
            .context("Failed to parse template")?;

        let helpers: [(&'static str, Preview); 2] = [
            ("include_src_file", preview::include_src_file),
            ("include_input_dir", preview::include_input_dir),
        ];
        for (name, preview) in helpers {
            registry.register_helper(
                name,
                Box::new(PreviewHelper {
                    name,
                    src_dir: src_dir.map(Path::to_path_buf),
                    preview,
                }),
            );
        }

        Ok(Self { registry })
    }

    pub fn render(&self, ctx: &DocContext) -> Result<String> {
        debug!(module = %ctx.module, "rendering page");
        self.registry
            .render(TEMPLATE_NAME, ctx)
            .context("Failed to render template")
    }
}

/// Write the page to `docs_dir/<module>.md`, replacing any previous one
pub fn write_doc(docs_dir: &Path, module: &str, content: &str) -> Result<PathBuf> {
    fs::create_dir_all(docs_dir)
        .with_context(|| format!("Failed to create directory: {}", docs_dir.display()))?;

    let path = docs_dir.join(format!("{}.md", module));
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;

    info!(path = %path.display(), "wrote documentation page");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn context() -> DocContext {
        DocContext {
            module: "gcc".to_string(),
            run_commands: "\n# Compile source code\ngcc -o hello hello.c".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_render_minimal() {
        let renderer = Renderer::new(None).unwrap();
        let page = renderer.render(&context()).unwrap();

        assert!(page.starts_with("# gcc\n"));
        assert!(page.contains("```bash\n\n# Compile source code\ngcc -o hello hello.c\n```"));
        assert!(!page.contains("### Source files"));
        assert!(!page.contains("Attribution"));
    }

    #[test]
    fn test_no_html_escaping() {
        let renderer = Renderer::with_template("{{run_commands}}", None).unwrap();
        let ctx = DocContext {
            run_commands: "./prog < in.txt > out.txt && echo \"done\"".to_string(),
            ..Default::default()
        };

        assert_eq!(
            renderer.render(&ctx).unwrap(),
            "./prog < in.txt > out.txt && echo \"done\""
        );
    }

    #[test]
    fn test_helpers_render_previews() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("hello.c"), "int main() { return 0; }\n").unwrap();
        fs::create_dir(temp.path().join("data")).unwrap();
        fs::write(temp.path().join("data").join("in.csv"), "1,2\n").unwrap();

        let renderer = Renderer::new(Some(temp.path())).unwrap();
        let ctx = DocContext {
            source_files: vec!["hello.c".to_string()],
            input_directories: vec!["data".to_string()],
            attribution: "Jane Doe".to_string(),
            ..context()
        };
        let page = renderer.render(&ctx).unwrap();

        assert!(page.contains("#### `hello.c`"));
        assert!(page.contains("int main() { return 0; }"));
        assert!(page.contains("#### `data/`"));
        assert!(page.contains("- in.csv"));
        assert!(page.contains("*Attribution: Jane Doe*"));
    }

    #[test]
    fn test_preview_fences_close_tightly() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("hello.c"), "int main() { return 0; }\n").unwrap();
        fs::write(temp.path().join("blob.dat"), [0xffu8, 0xfe]).unwrap();

        let renderer = Renderer::new(Some(temp.path())).unwrap();
        let ctx = DocContext {
            source_files: vec!["hello.c".to_string()],
            input_files: vec!["blob.dat".to_string()],
            ..context()
        };
        let page = renderer.render(&ctx).unwrap();

        assert!(page.contains("```\nint main() { return 0; }\n```\n"));
        assert!(page.contains("because it is a binary.)\n```\n"));
        assert!(!page.contains("return 0; }\n\n```"));
    }

    #[test]
    fn test_helper_without_source_dir_fails() {
        let renderer = Renderer::with_template("{{include_src_file \"x.c\"}}", None).unwrap();
        assert!(renderer.render(&DocContext::default()).is_err());
    }

    #[test]
    fn test_missing_template_file() {
        let temp = TempDir::new().unwrap();
        let err = Renderer::from_file(&temp.path().join("none.hbs"), None)
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<RedocError>(),
            Some(RedocError::TemplateNotFound(_))
        ));
    }

    #[test]
    fn test_custom_template_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("custom.hbs");
        fs::write(&path, "Module: {{module}}").unwrap();

        let renderer = Renderer::from_file(&path, None).unwrap();
        assert_eq!(renderer.render(&context()).unwrap(), "Module: gcc");
    }

    #[test]
    fn test_write_doc_creates_and_overwrites() {
        let temp = TempDir::new().unwrap();
        let docs = temp.path().join("docs");

        let path = write_doc(&docs, "gcc", "first").unwrap();
        assert_eq!(path, docs.join("gcc.md"));
        write_doc(&docs, "gcc", "second").unwrap();

        assert_eq!(fs::read_to_string(path).unwrap(), "second");
    }
}
