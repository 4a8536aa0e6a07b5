//! Rendering of bill lists as table, CSV or JSON.

use clap::ValueEnum;
use color_eyre::{eyre::eyre, Result};
use serde::Serialize;
use std::io::Write;

use crate::cospend::types::{Bill, Project};

use super::amount::AmountFormatter;
use super::table::{truncate, Table};

const NAME_WIDTH: usize = 30;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Table,
  Csv,
  Json,
}

/// A bill with member, category and payment mode names filled in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BillRow {
  pub id: i64,
  pub date: String,
  pub name: String,
  pub amount: f64,
  pub paid_by: String,
  pub paid_for: Vec<String>,
  /// Empty when the bill has no category
  pub category: String,
  /// Empty when the bill has no payment mode
  pub payment_method: String,
}

/// Newest first: date descending, then creation timestamp descending.
/// A `limit` of 0 keeps everything.
pub fn sort_and_limit(bills: &mut Vec<Bill>, limit: usize) {
  bills.sort_by(|a, b| {
    b.date
      .cmp(&a.date)
      .then_with(|| b.timestamp.cmp(&a.timestamp))
  });
  if limit > 0 {
    bills.truncate(limit);
  }
}

/// Resolve IDs to names; unknown IDs render as `#<id>`.
pub fn resolve_rows(project: &Project, bills: &[Bill]) -> Vec<BillRow> {
  let member = |id: i64| {
    project
      .member(id)
      .map(|m| m.name.clone())
      .unwrap_or_else(|| format!("#{}", id))
  };
  let optional = |id: i64, name: Option<&str>| match (id, name) {
    (0, _) => String::new(),
    (_, Some(name)) => name.to_string(),
    (id, None) => format!("#{}", id),
  };

  bills
    .iter()
    .map(|bill| BillRow {
      id: bill.id,
      date: bill.date.clone(),
      name: bill.what.clone(),
      amount: bill.amount,
      paid_by: member(bill.payer_id),
      paid_for: bill.owers.iter().map(|o| member(o.id)).collect(),
      category: optional(
        bill.category_id,
        project.category(bill.category_id).map(|c| c.name.as_str()),
      ),
      payment_method: optional(
        bill.payment_mode_id,
        project
          .payment_mode(bill.payment_mode_id)
          .map(|pm| pm.name.as_str()),
      ),
    })
    .collect()
}

pub fn write_bills(
  out: &mut impl Write,
  format: OutputFormat,
  rows: &[BillRow],
  formatter: &AmountFormatter,
) -> Result<()> {
  match format {
    OutputFormat::Table => write_table(out, rows, formatter),
    OutputFormat::Csv => write_csv(out, rows),
    OutputFormat::Json => write_json(out, rows),
  }
}

fn write_table(out: &mut impl Write, rows: &[BillRow], formatter: &AmountFormatter) -> Result<()> {
  if rows.is_empty() {
    writeln!(out, "No bills found.")?;
    return Ok(());
  }

  let mut table = Table::new([
    "ID", "DATE", "NAME", "AMOUNT", "PAID BY", "PAID FOR", "CATEGORY", "METHOD",
  ]);

  for row in rows {
    table.add_row([
      row.id.to_string(),
      row.date.clone(),
      truncate(&row.name, NAME_WIDTH),
      formatter.format(row.amount),
      row.paid_by.clone(),
      row.paid_for.join(", "),
      or_dash(&row.category),
      or_dash(&row.payment_method),
    ]);
  }

  let total: f64 = rows.iter().map(|r| r.amount).sum();
  table.render(out)?;
  writeln!(out)?;
  writeln!(out, "Total: {} bill(s), {}", rows.len(), formatter.format(total))?;
  Ok(())
}

fn or_dash(s: &str) -> String {
  if s.is_empty() {
    "-".to_string()
  } else {
    s.to_string()
  }
}

fn write_csv(out: &mut impl Write, rows: &[BillRow]) -> Result<()> {
  let mut writer = csv::Writer::from_writer(out);

  writer
    .write_record([
      "ID",
      "Date",
      "Name",
      "Amount",
      "Paid By",
      "Paid For",
      "Category",
      "Payment Method",
    ])
    .map_err(|e| eyre!("Failed to write CSV: {}", e))?;

  for row in rows {
    writer
      .write_record([
        row.id.to_string(),
        row.date.clone(),
        row.name.clone(),
        format!("{:.2}", row.amount),
        row.paid_by.clone(),
        row.paid_for.join(", "),
        row.category.clone(),
        row.payment_method.clone(),
      ])
      .map_err(|e| eyre!("Failed to write CSV: {}", e))?;
  }

  writer
    .flush()
    .map_err(|e| eyre!("Failed to write CSV: {}", e))
}

fn write_json(out: &mut impl Write, rows: &[BillRow]) -> Result<()> {
  serde_json::to_writer_pretty(&mut *out, rows).map_err(|e| eyre!("Failed to write JSON: {}", e))?;
  writeln!(out)?;
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cospend::types::{Category, Member, Ower, PaymentMode};

  fn project() -> Project {
    Project {
      id: "p".into(),
      name: "P".into(),
      currency_name: "USD".into(),
      members: vec![
        Member {
          id: 1,
          name: "Alice".into(),
          user_id: "alice".into(),
          activated: true,
        },
        Member {
          id: 2,
          name: "Bob".into(),
          user_id: "bob".into(),
          activated: true,
        },
      ],
      categories: vec![Category {
        id: 3,
        name: "Food".into(),
        icon: String::new(),
        color: String::new(),
      }],
      payment_modes: vec![PaymentMode {
        id: 4,
        name: "Cash".into(),
        icon: String::new(),
        color: String::new(),
      }],
      currencies: Vec::new(),
    }
  }

  fn bill(id: i64, date: &str, timestamp: i64) -> Bill {
    Bill {
      id,
      what: format!("Bill {}", id),
      amount: 10.0,
      date: date.into(),
      payer_id: 1,
      owers: vec![Ower { id: 1, weight: 1.0 }, Ower { id: 2, weight: 1.0 }],
      comment: String::new(),
      payment_mode_id: 0,
      category_id: 0,
      repeat: "n".into(),
      timestamp,
    }
  }

  fn render(format: OutputFormat, rows: &[BillRow]) -> String {
    let mut out = Vec::new();
    write_bills(&mut out, format, rows, &AmountFormatter::new("en_US", "USD")).unwrap();
    String::from_utf8(out).unwrap()
  }

  #[test]
  fn test_sort_newest_first() {
    let mut bills = vec![
      bill(1, "2026-01-01", 5),
      bill(2, "2026-02-01", 1),
      bill(3, "2026-01-01", 9),
    ];
    sort_and_limit(&mut bills, 0);
    let ids: Vec<i64> = bills.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![2, 3, 1]);
  }

  #[test]
  fn test_limit_applies_after_sort() {
    let mut bills = vec![
      bill(1, "2026-01-01", 0),
      bill(2, "2026-03-01", 0),
      bill(3, "2026-02-01", 0),
    ];
    sort_and_limit(&mut bills, 2);
    let ids: Vec<i64> = bills.iter().map(|b| b.id).collect();
    assert_eq!(ids, vec![2, 3]);

    let mut bills = vec![bill(1, "2026-01-01", 0)];
    sort_and_limit(&mut bills, 5);
    assert_eq!(bills.len(), 1);
  }

  #[test]
  fn test_resolve_rows_names_and_placeholders() {
    let mut known = bill(1, "2026-01-01", 0);
    known.category_id = 3;
    known.payment_mode_id = 4;

    let mut unknown = bill(2, "2026-01-01", 0);
    unknown.payer_id = 9;
    unknown.owers = vec![Ower { id: 8, weight: 1.0 }];
    unknown.category_id = 77;
    unknown.payment_mode_id = 66;

    let rows = resolve_rows(&project(), &[known, bill(3, "2026-01-01", 0), unknown]);

    assert_eq!(rows[0].paid_by, "Alice");
    assert_eq!(rows[0].paid_for, vec!["Alice", "Bob"]);
    assert_eq!(rows[0].category, "Food");
    assert_eq!(rows[0].payment_method, "Cash");

    assert_eq!(rows[1].category, "");
    assert_eq!(rows[1].payment_method, "");

    assert_eq!(rows[2].paid_by, "#9");
    assert_eq!(rows[2].paid_for, vec!["#8"]);
    assert_eq!(rows[2].category, "#77");
    assert_eq!(rows[2].payment_method, "#66");
  }

  #[test]
  fn test_table_output() {
    let mut long = bill(1, "2026-01-01", 0);
    long.what = "A very long bill description that goes on".into();
    long.amount = 1234.5;
    let rows = resolve_rows(&project(), &[long, bill(2, "2026-01-02", 0)]);

    let output = render(OutputFormat::Table, &rows);
    assert!(output.starts_with('┌'));
    assert!(output.contains("│ ID │ DATE"));
    assert!(output.contains("A very long bill descriptio..."));
    assert!(output.contains("$1,234.50"));
    assert!(output.contains("Alice, Bob"));
    assert!(output.contains("│ -        │ -      │"));
    assert!(output.ends_with("\nTotal: 2 bill(s), $1,244.50\n"));
  }

  #[test]
  fn test_empty_outputs() {
    assert_eq!(render(OutputFormat::Table, &[]), "No bills found.\n");
    assert_eq!(render(OutputFormat::Json, &[]), "[]\n");
    assert_eq!(
      render(OutputFormat::Csv, &[]),
      "ID,Date,Name,Amount,Paid By,Paid For,Category,Payment Method\n"
    );
  }

  #[test]
  fn test_csv_output() {
    let mut b = bill(1, "2026-01-01", 0);
    b.what = "Pizza, large".into();
    b.amount = 12.5;
    let rows = resolve_rows(&project(), &[b]);

    let output = render(OutputFormat::Csv, &rows);
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1], "1,2026-01-01,\"Pizza, large\",12.50,Alice,\"Alice, Bob\",,");
  }

  #[test]
  fn test_json_output() {
    let rows = resolve_rows(&project(), &[bill(1, "2026-01-01", 0)]);
    let output = render(OutputFormat::Json, &rows);

    let value: serde_json::Value = serde_json::from_str(&output).unwrap();
    assert_eq!(value[0]["id"], 1);
    assert_eq!(value[0]["paid_by"], "Alice");
    assert_eq!(value[0]["paid_for"][1], "Bob");
    assert_eq!(value[0]["payment_method"], "");
    assert_eq!(value[0]["amount"], 10.0);
  }
}
