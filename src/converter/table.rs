use crate::converter::document::{Element, ElementKind};

/// Render a `table` element as pipe-table lines.
///
/// A `---` separator follows the first row when that row has a `th`.
/// Rows without cells are dropped and ragged rows are kept as they are.
pub fn render_table(table: &Element) -> Vec<String> {
    let mut lines = Vec::new();

    for (i, row) in table.find_all(ElementKind::TableRow).enumerate() {
        let cells: Vec<&Element> = row
            .descendants()
            .filter(|e| matches!(e.kind(), ElementKind::TableCell { .. }))
            .collect();
        if cells.is_empty() {
            continue;
        }

        let texts: Vec<String> = cells.iter().map(|cell| cell.text().trim().to_string()).collect();
        lines.push(pipe_row(&texts));

        let has_header = cells
            .iter()
            .any(|cell| cell.kind() == ElementKind::TableCell { header: true });
        if i == 0 && has_header {
            lines.push(pipe_row(&vec!["---"; texts.len()]));
        }
    }

    lines
}

fn pipe_row<S: AsRef<str>>(cells: &[S]) -> String {
    let joined = cells.iter().map(|c| c.as_ref()).collect::<Vec<&str>>().join(" | ");
    format!("| {joined} |")
}
