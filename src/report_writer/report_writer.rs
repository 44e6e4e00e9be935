//! Output sink for a finished report.
//!
//! JSON is the wire format downstream consumers read. The table format is a
//! flattened view of the same JSON document for people at a terminal.

use crate::dispatcher::Report;
use anyhow::{Context, Result};
use clap::ValueEnum;
use prettytable::{Cell, Row, Table, format};
use serde_json::Value;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::info;

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Debug, Clone, Default)]
pub struct ReportWriter {
    pub format: OutputFormat,
    /// Pretty-print JSON.
    pub expand: bool,
    pub suppress_stdout: bool,
    pub output_file: Option<PathBuf>,
    /// Append to `output_file` instead of replacing it.
    pub append: bool,
}

impl ReportWriter {
    pub fn render(&self, report: &Report) -> Result<String> {
        match self.format {
            OutputFormat::Json if self.expand => {
                serde_json::to_string_pretty(report).context("Failed to serialize report")
            }
            OutputFormat::Json => serde_json::to_string(report).context("Failed to serialize report"),
            OutputFormat::Table => {
                let value = serde_json::to_value(report).context("Failed to serialize report")?;
                Ok(render_tables(&value))
            }
        }
    }

    pub async fn write(&self, report: &Report) -> Result<()> {
        let rendered = self.render(report)?;

        if !self.suppress_stdout {
            println!("{}", rendered);
        }

        if let Some(path) = &self.output_file {
            let mut file = tokio::fs::OpenOptions::new()
                .create(true)
                .write(true)
                .append(self.append)
                .truncate(!self.append)
                .open(path)
                .await
                .with_context(|| format!("Failed to open output file: {}", path.display()))?;
            file.write_all(format!("{}\n", rendered).as_bytes())
                .await
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            file.flush()
                .await
                .with_context(|| format!("Failed to write output file: {}", path.display()))?;
            info!(path = %path.display(), append = self.append, "Report written");
        }
        Ok(())
    }
}

fn scalar_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table
}

fn key_value_table(fields: &[(&String, &Value)]) -> Table {
    let mut table = new_table();
    for (key, field) in fields {
        table.add_row(Row::new(vec![
            Cell::new(key).style_spec("b"),
            Cell::new(&scalar_text(field)),
        ]));
    }
    table
}

/// Rows of objects become one table, columns in first-seen key order.
fn records_table(records: &[Value]) -> Table {
    let mut columns: Vec<&str> = Vec::new();
    for record in records {
        if let Value::Object(fields) = record {
            for key in fields.keys() {
                if !columns.contains(&key.as_str()) {
                    columns.push(key);
                }
            }
        }
    }

    let mut table = new_table();
    table.set_titles(Row::new(
        columns.iter().map(|column| Cell::new(column).style_spec("b")).collect(),
    ));
    for record in records {
        let cells = columns
            .iter()
            .map(|column| match record.get(*column) {
                Some(value) => Cell::new(&scalar_text(value)),
                None => Cell::new(""),
            })
            .collect();
        table.add_row(Row::new(cells));
    }
    table
}

fn collect_tables(title: &str, value: &Value, tables: &mut Vec<(String, Table)>) {
    match value {
        Value::Array(records) => tables.push((title.to_string(), records_table(records))),
        Value::Object(fields) => {
            let (scalars, nested): (Vec<_>, Vec<_>) = fields
                .iter()
                .partition(|(_, field)| !field.is_array() && !field.is_object());
            if !scalars.is_empty() {
                tables.push((title.to_string(), key_value_table(&scalars)));
            }
            for (key, field) in nested {
                collect_tables(&format!("{}.{}", title, key), field, tables);
            }
        }
        other => {
            let mut table = new_table();
            table.add_row(Row::new(vec![Cell::new(&scalar_text(other))]));
            tables.push((title.to_string(), table));
        }
    }
}

fn render_tables(report: &Value) -> String {
    let mut tables = Vec::new();

    if let Value::Object(fields) = report {
        let envelope: Vec<_> = fields.iter().filter(|(key, _)| *key != "Checks").collect();
        tables.push(("Report".to_string(), key_value_table(&envelope)));
    }

    if let Some(Value::Array(checks)) = report.get("Checks") {
        for check in checks {
            if let Value::Object(sections) = check {
                for (section, body) in sections {
                    collect_tables(section, body, &mut tables);
                }
            }
        }
    }

    tables
        .iter()
        .map(|(title, table)| format!("{}\n{}", title, table))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rep_checker::CheckResult;
    use crate::rep_checker::check_result::{LagRecord, LagTime, SlaveEntry, SlaveSection};

    fn report() -> Report {
        let mut report = Report::new(Some("master".to_string()));
        report.checks.push(CheckResult::TimeLag(SlaveSection {
            slaves: vec![SlaveEntry::Checked(LagRecord {
                name: Some("slave1".to_string()),
                slave_uuid: "u1".to_string(),
                lag_time: LagTime::Seconds(17),
            })],
        }));
        report
    }

    #[test]
    fn test_render_json() {
        let writer = ReportWriter::default();
        let rendered = writer.render(&report()).unwrap();
        assert!(!rendered.contains('\n'));
        let value: Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["Checks"][0]["CheckSlaveTime"]["Slaves"][0]["LagTime"], 17);

        let expanded = ReportWriter {
            expand: true,
            ..ReportWriter::default()
        };
        assert!(expanded.render(&report()).unwrap().contains('\n'));
    }

    #[test]
    fn test_render_table() {
        let writer = ReportWriter {
            format: OutputFormat::Table,
            ..ReportWriter::default()
        };
        let rendered = writer.render(&report()).unwrap();
        assert!(rendered.contains("MySQLReplication"));
        assert!(rendered.contains("CheckSlaveTime.Slaves"));
        assert!(rendered.contains("Slave_UUID"));
        assert!(rendered.contains("slave1"));
        assert!(rendered.contains("17"));
    }

    #[tokio::test]
    async fn test_write_and_append_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        let writer = ReportWriter {
            suppress_stdout: true,
            output_file: Some(path.clone()),
            ..ReportWriter::default()
        };
        writer.write(&report()).await.unwrap();
        writer.write(&report()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 1);

        let appending = ReportWriter {
            append: true,
            ..writer
        };
        appending.write(&report()).await.unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 2);
    }
}
