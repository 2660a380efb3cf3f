use crate::loader::{NAME_COLUMN, QUERY_COLUMN};
use crate::models::SheetRow;

/// Renders the loaded rows as a Markdown table.
pub fn render_table(rows: &[SheetRow]) -> String {
    let mut out = format!("| Row | {NAME_COLUMN} | {QUERY_COLUMN} |\n|---|---|---|\n");
    for row in rows {
        out.push_str(&format!(
            "| {} | {} | {} |\n",
            row.row_number,
            escape(&row.name),
            escape(&row.query)
        ));
    }
    out
}

fn escape(cell: &str) -> String {
    cell.replace('|', "\\|").replace(['\r', '\n'], " ")
}
