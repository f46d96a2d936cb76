use std::fmt::Write;

use colored::Colorize;
use raftsnap_sdk::InspectionReport;

const MIN_WIDTH: usize = 8;
const PADDING: usize = 6;

/// Left column width for a block of rows.
fn column_width<'a>(labels: impl Iterator<Item = &'a str>) -> usize {
    labels
        .map(|l| l.chars().count() + 1 + PADDING)
        .max()
        .unwrap_or(0)
        .max(MIN_WIDTH)
}

fn row(out: &mut String, width: usize, label: &str, value: impl std::fmt::Display) {
    let _ = writeln!(out, "{:<width$}{}", format!(" {label}"), value);
}

/// Aligned table: metadata rows, then the key breakdown if there is one.
pub fn text(report: &InspectionReport) -> String {
    let meta = &report.metadata;
    let mut out = String::new();

    let labels = ["ID", "Size", "Index", "Term", "Version"];
    let width = column_width(labels.into_iter());
    row(&mut out, width, "ID", &meta.id);
    row(&mut out, width, "Size", meta.size);
    row(&mut out, width, "Index", meta.index);
    row(&mut out, width, "Term", meta.term);
    row(&mut out, width, "Version", meta.version);

    if report.has_kv_stats() {
        let width = column_width(
            ["Key Name", "----", "Total"]
                .into_iter()
                .chain(report.buckets.iter().map(|b| b.prefix.as_str())),
        );
        out.push('\n');
        let _ = writeln!(
            out,
            "{}{}",
            format!("{:<width$}", " Key Name").bold(),
            "Count".bold()
        );
        row(&mut out, width, "----", "----");
        for bucket in &report.buckets {
            row(&mut out, width, &bucket.prefix, bucket.count);
        }
        row(&mut out, width, "----", "----");
        row(&mut out, width, "Total", report.total_count);
    }
    out
}

pub fn json(report: &InspectionReport) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(report)?)
}
