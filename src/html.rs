//! Static HTML rendering of report tables

use crate::error::{ReconError, Result};
use anyhow::Context;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Inline style applied to highlighted cells
pub const HIGHLIGHT_STYLE: &str = "background-color: yellow";

const STYLESHEET: &str = "table.recon { border-collapse: collapse; font-family: sans-serif; \
font-size: 13px; }
table.recon th, table.recon td { border: 1px solid #ccc; padding: 4px 8px; }
table.recon thead th { background: #f0f0f0; }
table.recon th.row_heading { text-align: right; color: #555; }";

/// A rendered-ready table: string cells plus a highlight flag per cell
#[derive(Debug, Clone, PartialEq)]
pub struct ReportTable {
    pub title: String,
    pub headers: Vec<String>,
    pub index: Vec<usize>,
    pub cells: Vec<Vec<String>>,
    pub highlights: Vec<Vec<bool>>,
}

impl ReportTable {
    /// Render the full HTML document
    pub fn render_html(&self) -> String {
        let mut html = String::new();
        html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
        let _ = writeln!(html, "<title>{}</title>", escape_html(&self.title));
        let _ = writeln!(html, "<style>\n{}\n</style>", STYLESHEET);
        html.push_str("</head>\n<body>\n");
        let _ = writeln!(html, "<h1>{}</h1>", escape_html(&self.title));
        html.push_str("<table class=\"recon\">\n<thead>\n<tr><th class=\"blank\"></th>");
        for header in &self.headers {
            let _ = write!(html, "<th class=\"col_heading\">{}</th>", escape_html(header));
        }
        html.push_str("</tr>\n</thead>\n<tbody>\n");

        for (row, values) in self.cells.iter().enumerate() {
            let label = self.index.get(row).map(|l| l.to_string()).unwrap_or_default();
            let _ = write!(html, "<tr><th class=\"row_heading\">{}</th>", label);
            for (col, value) in values.iter().enumerate() {
                let highlighted = self
                    .highlights
                    .get(row)
                    .and_then(|flags| flags.get(col))
                    .copied()
                    .unwrap_or(false);
                if highlighted {
                    let _ = write!(
                        html,
                        "<td style=\"{}\">{}</td>",
                        HIGHLIGHT_STYLE,
                        escape_html(value)
                    );
                } else {
                    let _ = write!(html, "<td>{}</td>", escape_html(value));
                }
            }
            html.push_str("</tr>\n");
        }

        html.push_str("</tbody>\n</table>\n</body>\n</html>\n");
        html
    }

    /// Write the document, creating parent directories and replacing any
    /// previous file
    pub fn write_html(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating report directory {}", parent.display()))?;
        }
        fs::write(path, self.render_html()).map_err(|e| ReconError::Report {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

/// Escape text for HTML element content and attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}
