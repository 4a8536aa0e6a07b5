//! Box-drawn text table.

use std::io::{self, Write};

/// Table with columns sized to their widest cell.
///
/// Widths count characters, not bytes.
#[derive(Debug, Clone)]
pub struct Table {
  headers: Vec<String>,
  rows: Vec<Vec<String>>,
  widths: Vec<usize>,
}

impl Table {
  pub fn new<S: Into<String>>(headers: impl IntoIterator<Item = S>) -> Self {
    let headers: Vec<String> = headers.into_iter().map(Into::into).collect();
    let widths = headers.iter().map(|h| width(h)).collect();
    Self {
      headers,
      rows: Vec::new(),
      widths,
    }
  }

  /// Add a row; missing cells are blank and extra cells are dropped.
  pub fn add_row<S: Into<String>>(&mut self, cells: impl IntoIterator<Item = S>) {
    let mut row: Vec<String> = cells
      .into_iter()
      .take(self.headers.len())
      .map(Into::into)
      .collect();
    row.resize(self.headers.len(), String::new());

    for (w, cell) in self.widths.iter_mut().zip(&row) {
      *w = (*w).max(width(cell));
    }
    self.rows.push(row);
  }

  pub fn render(&self, out: &mut impl Write) -> io::Result<()> {
    self.border(out, '┌', '┬', '┐')?;
    self.row(out, &self.headers)?;
    self.border(out, '├', '┼', '┤')?;
    for row in &self.rows {
      self.row(out, row)?;
    }
    self.border(out, '└', '┴', '┘')
  }

  fn border(&self, out: &mut impl Write, left: char, mid: char, right: char) -> io::Result<()> {
    let segments: Vec<String> = self.widths.iter().map(|w| "─".repeat(w + 2)).collect();
    writeln!(out, "{}{}{}", left, segments.join(&mid.to_string()), right)
  }

  fn row(&self, out: &mut impl Write, cells: &[String]) -> io::Result<()> {
    write!(out, "│")?;
    for (cell, w) in cells.iter().zip(&self.widths) {
      let pad = w - width(cell);
      write!(out, " {}{} │", cell, " ".repeat(pad))?;
    }
    writeln!(out)
  }
}

fn width(s: &str) -> usize {
  s.chars().count()
}

/// Shorten `s` to at most `max` characters, marking the cut with "...".
pub fn truncate(s: &str, max: usize) -> String {
  if width(s) <= max {
    return s.to_string();
  }
  let keep = max.saturating_sub(3);
  let mut out: String = s.chars().take(keep).collect();
  out.push_str("...");
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  fn render(table: &Table) -> String {
    let mut out = Vec::new();
    table.render(&mut out).unwrap();
    String::from_utf8(out).unwrap()
  }

  #[test]
  fn test_render_sizes_columns() {
    let mut table = Table::new(["ID", "NAME"]);
    table.add_row(["1", "Coffee"]);
    table.add_row(["100", "Tea"]);

    let expected = "\
┌─────┬────────┐
│ ID  │ NAME   │
├─────┼────────┤
│ 1   │ Coffee │
│ 100 │ Tea    │
└─────┴────────┘
";
    assert_eq!(render(&table), expected);
  }

  #[test]
  fn test_row_padding_and_overflow() {
    let mut table = Table::new(["A", "B"]);
    table.add_row(["x"]);
    table.add_row(["1", "2", "3"]);

    let output = render(&table);
    assert!(output.contains("│ x │   │"));
    assert!(output.contains("│ 1 │ 2 │"));
    assert!(!output.contains('3'));
  }

  #[test]
  fn test_multibyte_width() {
    let mut table = Table::new(["N"]);
    table.add_row(["€€€"]);
    assert!(render(&table).contains("│ €€€ │"));
  }

  #[test]
  fn test_truncate() {
    assert_eq!(truncate("short", 30), "short");
    let long = "a".repeat(31);
    let cut = truncate(&long, 30);
    assert_eq!(cut.chars().count(), 30);
    assert!(cut.ends_with("..."));
    assert_eq!(truncate(&"é".repeat(30), 30), "é".repeat(30));
  }
}
