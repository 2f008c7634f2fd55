//! Rendering of extracted records as a table, JSON or CSV.

use console::{Alignment, measure_text_width, pad_str};
use serde::Serialize;

use rcpt_core::ReceiptRecord;
use rcpt_core::models::receipt::COLUMNS;

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned text table
    Table,
    /// JSON array
    Json,
    /// CSV with a header row
    Csv,
}

/// A record as written to JSON.
#[derive(Serialize)]
struct RecordView<'a> {
    #[serde(rename = "Date")]
    date: Option<String>,
    #[serde(rename = "Vendor")]
    vendor: Option<&'a str>,
    #[serde(rename = "Total")]
    total: Option<String>,
    #[serde(rename = "Confidence", skip_serializing_if = "Option::is_none")]
    confidence: Option<f32>,
}

/// Render records; `confidences`, when given, runs parallel to `records`.
pub fn render(
    records: &[ReceiptRecord],
    confidences: Option<&[f32]>,
    format: OutputFormat,
) -> anyhow::Result<String> {
    match format {
        OutputFormat::Table => Ok(format_table(records, confidences)),
        OutputFormat::Json => format_json(records, confidences),
        OutputFormat::Csv => format_csv(records, confidences),
    }
}

fn headers(with_confidence: bool) -> Vec<&'static str> {
    let mut headers = COLUMNS.to_vec();
    if with_confidence {
        headers.push("Confidence");
    }
    headers
}

fn rows(records: &[ReceiptRecord], confidences: Option<&[f32]>) -> Vec<Vec<String>> {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let mut row = record.to_row().to_vec();
            if let Some(confidences) = confidences {
                row.push(
                    confidences
                        .get(i)
                        .map(|c| format!("{:.0}%", c * 100.0))
                        .unwrap_or_default(),
                );
            }
            row
        })
        .collect()
}

/// Plain table; the Total and Confidence columns are right-aligned.
pub fn format_table(records: &[ReceiptRecord], confidences: Option<&[f32]>) -> String {
    let headers = headers(confidences.is_some());
    let rows = rows(records, confidences);

    let mut widths: Vec<usize> = headers.iter().map(|h| measure_text_width(h)).collect();
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(measure_text_width(cell));
        }
    }

    let align = |col: usize| if col == 0 || col == 1 { Alignment::Left } else { Alignment::Right };

    let mut lines = Vec::with_capacity(rows.len() + 1);

    let join = |cells: &[String]| {
        let padded: Vec<_> = cells
            .iter()
            .enumerate()
            .map(|(col, cell)| pad_str(cell, widths[col], align(col), None))
            .collect();
        padded.join("  ").trim_end().to_string()
    };

    let header_cells: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
    lines.push(join(&header_cells));
    for row in &rows {
        lines.push(join(row));
    }

    lines.join("\n")
}

pub fn format_json(records: &[ReceiptRecord], confidences: Option<&[f32]>) -> anyhow::Result<String> {
    let views: Vec<RecordView<'_>> = records
        .iter()
        .enumerate()
        .map(|(i, record)| RecordView {
            date: record.date_iso(),
            vendor: record.vendor.as_deref(),
            total: record.total.map(|t| t.to_string()),
            confidence: confidences.and_then(|c| c.get(i).copied()),
        })
        .collect();

    Ok(serde_json::to_string_pretty(&views)?)
}

pub fn format_csv(records: &[ReceiptRecord], confidences: Option<&[f32]>) -> anyhow::Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(headers(confidences.is_some()))?;
    for row in rows(records, confidences) {
        wtr.write_record(&row)?;
    }

    let data = String::from_utf8(wtr.into_inner()?)?;
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn records() -> Vec<ReceiptRecord> {
        vec![
            ReceiptRecord::new(
                NaiveDate::from_ymd_opt(2024, 3, 15),
                Some("Acme Hardware".to_string()),
                Some("12.50".parse().unwrap()),
            ),
            ReceiptRecord::new(None, Some("Cafe, Ltd".to_string()), None),
        ]
    }

    #[test]
    fn test_table_layout() {
        let table = format_table(&records(), None);
        let lines: Vec<&str> = table.lines().collect();

        assert_eq!(lines[0], "Date        Vendor         Total");
        assert_eq!(lines[1], "2024-03-15  Acme Hardware  12.50");
        assert_eq!(lines[2], "            Cafe, Ltd");
    }

    #[test]
    fn test_table_with_confidence() {
        let table = format_table(&records()[..1], Some(&[0.7f32][..]));
        assert!(table.lines().next().unwrap().ends_with("Confidence"));
        assert!(table.lines().nth(1).unwrap().ends_with("70%"));
    }

    #[test]
    fn test_csv_quotes_and_blanks() {
        let csv = format_csv(&records(), None).unwrap();
        assert_eq!(
            csv,
            "Date,Vendor,Total\n2024-03-15,Acme Hardware,12.50\n,\"Cafe, Ltd\",\n"
        );
    }

    #[test]
    fn test_json_nulls() {
        let json = format_json(&records(), None).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["Total"], "12.50");
        assert_eq!(value[1]["Date"], serde_json::Value::Null);
        assert!(value[0].get("Confidence").is_none());
    }
}
