use std::path::{Path, PathBuf};

use crate::error::{ConvertError, Result};
use crate::generator::{Backend, BackendKind};

/// Whole-document conversion through the html2md library.
#[derive(Debug, Clone, Copy, Default)]
pub struct Html2mdBackend;

impl Html2mdBackend {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "html2md")]
pub fn run(html: &str) -> Result<String> {
    let markdown = ::html2md::parse_html(html);
    let markdown = crate::converter::normalize(&markdown);

    if markdown.is_empty() {
        return Err(ConvertError::EmptyOutput {
            backend: BackendKind::Simplified,
            path: PathBuf::new(),
        });
    }

    Ok(markdown)
}

#[cfg(not(feature = "html2md"))]
pub fn run(_html: &str) -> Result<String> {
    Err(ConvertError::BackendUnavailable {
        backend: BackendKind::Simplified,
        reason: "built without the `html2md` feature".to_string(),
    })
}

impl Backend for Html2mdBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Simplified
    }

    fn attempt_convert(&self, input: &Path, output: &Path) -> Result<PathBuf> {
        let html = crate::generator::read_html(input)?;
        let markdown = run(&html).map_err(|e| match e {
            ConvertError::EmptyOutput { backend, .. } => ConvertError::EmptyOutput {
                backend,
                path: output.to_path_buf(),
            },
            other => other,
        })?;
        crate::generator::write_markdown(output, &markdown)
    }
}

#[cfg(all(test, feature = "html2md"))]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_run_produces_markdown() {
        let markdown = run("<h1>Results</h1><p>All <b>good</b></p>").unwrap();
        assert!(markdown.contains("Results"));
        assert!(markdown.contains("**good**"));
    }

    #[test]
    fn test_empty_document_fails() {
        assert!(matches!(run("<html><body></body></html>"), Err(ConvertError::EmptyOutput { .. })));
    }

    #[test]
    fn test_writes_output_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("page.html");
        std::fs::write(&input, "<p>hello</p>").unwrap();

        let output = dir.path().join("page.md");
        let written = Html2mdBackend::new().attempt_convert(&input, &output).unwrap();
        assert_eq!(written, output);
        assert_eq!(std::fs::read_to_string(&output).unwrap(), "hello");
    }
}
