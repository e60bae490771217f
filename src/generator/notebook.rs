//! The custom backend: parse, walk cells, render, normalize.

use std::path::{Path, PathBuf};

use crate::config::Settings;
use crate::converter::{CellOptions, CellWalker, Document, ImageContext, normalize, render_cell};
use crate::error::{ConvertError, Result};
use crate::generator::{Backend, BackendKind, read_html, write_markdown};

#[derive(Debug, Clone)]
pub struct NotebookOptions {
    pub extract_images: bool,
    pub image_dir: String,
    pub cell_markers: Vec<String>,
    pub inline_code_max_len: usize,
    pub max_nesting_depth: usize,
    pub export_banner: bool,
}

impl Default for NotebookOptions {
    fn default() -> Self {
        Self::from(&Settings::default())
    }
}

impl From<&Settings> for NotebookOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            extract_images: settings.extract_images,
            image_dir: settings.image_dir.clone(),
            cell_markers: settings.cell_markers.clone(),
            inline_code_max_len: settings.inline_code_max_len,
            max_nesting_depth: settings.max_nesting_depth,
            export_banner: settings.export_banner,
        }
    }
}

/// Render `html` to Markdown; images go next to `markdown_path`.
pub fn render_document(html: &str, markdown_path: &Path, options: &NotebookOptions) -> Result<String> {
    let document = Document::parse(html, options.max_nesting_depth)?;
    let mut images = ImageContext::new(markdown_path, &options.image_dir, options.extract_images);
    let cell_options = CellOptions {
        inline_code_max_len: options.inline_code_max_len,
    };

    let mut lines = Vec::new();
    if options.export_banner {
        lines.extend(banner(&document));
    }

    let mut cells = 0;
    for cell in CellWalker::new(&document, &options.cell_markers) {
        let block = render_cell(cell, &mut images, cell_options);
        cells += 1;
        if block.is_blank() {
            continue;
        }
        lines.extend(block.lines);
        lines.push(String::new());
    }

    tracing::debug!(
        cells,
        images = images.extracted().len(),
        image_failures = images.failures(),
        "rendered notebook"
    );
    if !images.extracted().is_empty() {
        tracing::info!("images extracted to: {}", images.dir().display());
    }

    Ok(normalize(&lines.join("\n")))
}

fn banner(document: &Document) -> Vec<String> {
    let title = document.title().unwrap_or_else(|| "Notebook Export".to_string());
    let exported = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
    vec![
        format!("# {title}"),
        String::new(),
        format!("*Exported on {exported}*"),
        String::new(),
        "---".to_string(),
        String::new(),
    ]
}

#[derive(Debug, Clone, Default)]
pub struct NotebookBackend {
    options: NotebookOptions,
}

impl NotebookBackend {
    pub fn new(options: NotebookOptions) -> Self {
        Self { options }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(NotebookOptions::from(settings))
    }
}

impl Backend for NotebookBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Custom
    }

    fn attempt_convert(&self, input: &Path, output: &Path) -> Result<PathBuf> {
        let html = read_html(input)?;
        let markdown = render_document(&html, output, &self.options)?;
        if markdown.is_empty() {
            return Err(ConvertError::EmptyOutput {
                backend: BackendKind::Custom,
                path: output.to_path_buf(),
            });
        }
        write_markdown(output, &markdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn render(html: &str) -> String {
        let dir = TempDir::new().unwrap();
        render_document(html, &dir.path().join("out.md"), &NotebookOptions::default()).unwrap()
    }

    #[test]
    fn test_cells_are_separated() {
        let md = render(
            r#"<div class="jp-Cell"><h1>Load</h1><pre>df = load()</pre></div>
               <div class="jp-Cell"><p>Shape is fine</p></div>"#,
        );
        assert_eq!(md, "# Load\n`df = load()`\n\nShape is fine");
    }

    #[test]
    fn test_rule_order_wins_over_document_order() {
        let md = render("<p>intro</p><h2>Next</h2>");
        assert_eq!(md, "## Next\nintro");
    }

    #[test]
    fn test_banner() {
        let dir = TempDir::new().unwrap();
        let options = NotebookOptions {
            export_banner: true,
            ..NotebookOptions::default()
        };
        let md = render_document(
            "<title>Report</title><p>body</p>",
            &dir.path().join("out.md"),
            &options,
        )
        .unwrap();
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[0], "# Report");
        assert!(lines[2].starts_with("*Exported on "));
        assert_eq!(lines[4], "---");
        assert_eq!(lines[6], "body");
    }

    #[test]
    fn test_blank_cells_are_dropped() {
        let md = render(r#"<div class="cell"> </div><div class="cell"><p>x</p></div>"#);
        assert_eq!(md, "x");
    }

    #[test]
    fn test_images_counted_across_cells() {
        let dir = TempDir::new().unwrap();
        let md = render_document(
            r#"<div class="cell"><img src="data:image/png;base64,AAAA"></div>
               <div class="cell"><img src="data:image/jpeg;base64,AAAA"></div>"#,
            &dir.path().join("out.md"),
            &NotebookOptions::default(),
        )
        .unwrap();
        assert_eq!(md, "![Image](images/image_000.png)\n\n![Image](images/image_001.jpg)");
        assert!(dir.path().join("images/image_001.jpg").exists());
    }

    #[test]
    fn test_empty_document_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("e.html");
        std::fs::write(&input, r#"<body><div class="cell"></div></body>"#).unwrap();
        let output = dir.path().join("e.md");

        let err = NotebookBackend::default().attempt_convert(&input, &output).unwrap_err();
        assert!(matches!(
            err,
            ConvertError::EmptyOutput {
                backend: BackendKind::Custom,
                ..
            }
        ));
        assert!(!output.exists());
    }
}
