//! Operator-facing renderings of a successful configuration pass.

use crate::{ConfigAttribute, Message};

const COLUMN_GAP: &str = "  ";
const RULE: &str = "==========";

/// Left-aligned text columns sized to the widest cell of each column.
///
/// # Examples
///
/// ```
/// use bootseq::report::ColumnPrinter;
///
/// let mut printer = ColumnPrinter::new(["NAME", "VALUE"]);
/// printer.add_row(["a", "1"]);
/// printer.add_row(["longer", "2"]);
/// assert_eq!(
///     printer.generate_output(),
///     ["NAME    VALUE", "a       1", "longer  2"]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct ColumnPrinter<const N: usize> {
    headers: [String; N],
    rows: Vec<[String; N]>,
}

impl<const N: usize> ColumnPrinter<N> {
    /// Creates a printer with the given column headers.
    #[must_use]
    pub fn new(headers: [&str; N]) -> Self {
        Self {
            headers: headers.map(str::to_owned),
            rows: Vec::new(),
        }
    }

    /// Appends one row.
    pub fn add_row<S: Into<String>>(&mut self, values: [S; N]) {
        self.rows.push(values.map(Into::into));
    }

    /// Renders the header line followed by one line per row.
    #[must_use]
    pub fn generate_output(&self) -> Vec<String> {
        let mut widths = [0_usize; N];
        for row in std::iter::once(&self.headers).chain(&self.rows) {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        std::iter::once(&self.headers)
            .chain(&self.rows)
            .map(|row| render_row(row, &widths))
            .collect()
    }
}

fn render_row(row: &[String], widths: &[usize]) -> String {
    let mut line = String::new();
    for (index, (cell, &width)) in row.iter().zip(widths).enumerate() {
        if index > 0 {
            line.push_str(COLUMN_GAP);
        }
        line.push_str(cell);
        let padding = width.saturating_sub(cell.chars().count());
        line.extend(std::iter::repeat_n(' ', padding));
    }
    line.trim_end().to_owned()
}

/// Renders the PROPERTY / DEFAULT / RUNTIME / DESCRIPTION table.
#[must_use]
pub fn effective_configuration(attributes: &[ConfigAttribute]) -> Vec<String> {
    let mut printer = ColumnPrinter::new(["PROPERTY", "DEFAULT", "RUNTIME", "DESCRIPTION"]);
    for attribute in attributes {
        printer.add_row([
            attribute.property_name.as_str(),
            attribute.default_value.as_str(),
            attribute.current_value.as_str(),
            attribute.description.as_str(),
        ]);
    }
    printer.generate_output()
}

/// Renders all warnings as one numbered report, or `None` when there are
/// none.
///
/// # Examples
///
/// ```
/// use bootseq::{Message, report::warnings_report};
///
/// let report = warnings_report(&[Message::warning("a"), Message::warning("b")])
///     .expect("two warnings");
/// assert!(report.contains("1) a\n2) b\n"));
/// assert!(warnings_report(&[]).is_none());
/// ```
#[must_use]
pub fn warnings_report(warnings: &[Message]) -> Option<String> {
    if warnings.is_empty() {
        return None;
    }
    let numbered: String = warnings
        .iter()
        .enumerate()
        .map(|(index, warning)| format!("{}) {warning}\n", index + 1))
        .collect();
    Some(format!(
        "Configuration warnings\n{RULE}\n\nConfiguration should be updated:\n\n{numbered}\n{RULE}"
    ))
}
