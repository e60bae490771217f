use crate::converter::document::{Element, ElementKind};
use crate::converter::image::{ImageContext, is_base64_data_uri};
use crate::converter::table::render_table;

/// Lines rendered for one cell.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderedBlock {
    pub lines: Vec<String>,
}

impl RenderedBlock {
    pub fn is_blank(&self) -> bool {
        self.lines.iter().all(|line| line.trim().is_empty())
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CellOptions {
    pub inline_code_max_len: usize,
}

impl Default for CellOptions {
    fn default() -> Self {
        Self { inline_code_max_len: 50 }
    }
}

/// Render one cell. Headings, code, images, tables and direct prose
/// children are emitted in that order, each scanning the whole cell.
pub fn render_cell(cell: &Element, images: &mut ImageContext, options: CellOptions) -> RenderedBlock {
    let mut block = RenderedBlock::default();

    render_headings(cell, &mut block);
    render_code(cell, &mut block, options);
    render_images(cell, images, &mut block);
    for table in cell.find_all(ElementKind::Table) {
        block.lines.extend(render_table(table));
    }
    render_prose(cell, &mut block);

    block
}

/// All `h1`s first, then all `h2`s, down to `h6`.
fn render_headings(cell: &Element, block: &mut RenderedBlock) {
    for level in 1..=6 {
        for heading in cell.find_all(ElementKind::Heading(level)) {
            let hashes = "#".repeat(usize::from(level));
            block.lines.push(format!("{hashes} {}", heading.text().trim()));
        }
    }
}

fn render_code(cell: &Element, block: &mut RenderedBlock, options: CellOptions) {
    for (element, parent) in cell.descendants_with_parent() {
        if !element.kind().is_code() {
            continue;
        }
        // the enclosing pre already emitted this
        if element.kind() == ElementKind::Code && parent.kind() == ElementKind::Pre {
            continue;
        }

        let code = element.text();
        if code.contains('\n') || code.chars().count() > options.inline_code_max_len {
            block.lines.push("```".to_string());
            block.lines.push(code.trim().to_string());
            block.lines.push("```".to_string());
        } else {
            block.lines.push(format!("`{}`", code.trim()));
        }
    }
}

fn render_images(cell: &Element, images: &mut ImageContext, block: &mut RenderedBlock) {
    for img in cell.find_all(ElementKind::Image) {
        let src = img.attr("src").unwrap_or_default();
        let alt = img.attr("alt").unwrap_or("Image");

        if !is_base64_data_uri(src) {
            block.lines.push(format!("![{alt}]({src})"));
        } else if !images.extraction_enabled() {
            block.lines.push(format!("*[Image: {alt}]*"));
        } else {
            match images.extract(src) {
                Ok(asset) => block.lines.push(format!("![{alt}]({})", asset.link)),
                Err(e) => tracing::warn!("{e}"),
            }
        }
    }
}

fn render_prose(cell: &Element, block: &mut RenderedBlock) {
    for child in cell.child_elements() {
        if child.kind() != ElementKind::Block {
            continue;
        }
        if child.contains_any(|kind| matches!(kind, ElementKind::Table | ElementKind::Image) || kind.is_code()) {
            continue;
        }
        let text = child.text();
        let text = text.trim();
        if !text.is_empty() {
            block.lines.push(text.to_string());
        }
    }
}
