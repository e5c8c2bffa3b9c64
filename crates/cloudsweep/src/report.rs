//! Console and HTML rendering of the dry-run snapshot

use cloudsweep_cloud::{CloudError, Result};
use cloudsweep_core::{CleanupAction, ReportSink, Snapshot};
use colored::Colorize;
use serde::Serialize;
use std::path::PathBuf;

const REPORT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
<title>Cloud resources page</title>
<style>
body { font-family: sans-serif; margin: 2em; }
.cloud_box { border: 1px solid #ccc; border-radius: 6px; padding: 1.5em; }
#cloud_table { border-collapse: collapse; width: 100%; }
#cloud_table th, #cloud_table td { border: 1px solid #ddd; padding: 0.5em; text-align: left; }
#cloud_table th { background: #f0f0f0; }
</style>
</head>
<body>
<div class="cloud_box">
<h1>CLOUDSWEEP REPORT</h1>
<h3>{{ provider | upper }} RESOURCES</h3>
<table id="cloud_table">
<thead><tr><th>Category</th><th>Action</th><th>Resources</th></tr></thead>
<tbody>
{% for row in rows %}<tr>
<td>{{ row.category }}</td>
<td>{{ row.action }}</td>
<td><ul>{% for id in row.ids %}<li>{{ id }}</li>{% endfor %}</ul></td>
</tr>
{% endfor %}</tbody>
</table>
</div>
</body>
</html>
"#;

#[derive(Serialize)]
struct Row {
    category: String,
    action: String,
    ids: Vec<String>,
}

fn rows(snapshot: &Snapshot) -> Vec<Row> {
    let mut rows = Vec::new();
    for (kind, buckets) in snapshot.iter() {
        for action in [CleanupAction::Delete, CleanupAction::Stop, CleanupAction::Skip] {
            let ids = buckets.get(action);
            if !ids.is_empty() {
                rows.push(Row {
                    category: kind.to_string(),
                    action: action.to_string(),
                    ids: ids.to_vec(),
                });
            }
        }
    }
    rows
}

pub fn render_html(snapshot: &Snapshot) -> Result<String> {
    let mut context = tera::Context::new();
    context.insert("provider", &snapshot.provider);
    context.insert("rows", &rows(snapshot));
    tera::Tera::one_off(REPORT_TEMPLATE, &context, true)
        .map_err(|e| CloudError::Report(e.to_string()))
}

/// Dry-run sink: console summary plus an HTML report file
pub struct ConsoleHtmlSink {
    output_path: PathBuf,
}

impl ConsoleHtmlSink {
    pub fn new(output_path: PathBuf) -> Self {
        Self { output_path }
    }
}

impl ReportSink for ConsoleHtmlSink {
    fn emit(&self, snapshot: &Snapshot) -> Result<()> {
        if snapshot.is_empty() {
            println!("{}", "\nNo resources are eligible for cleanup!\n".green());
            return Ok(());
        }

        println!("{}", "\n=========== DRY SUMMARY ============\n".bold());
        println!("Resources eligible for cleanup ({}):", snapshot.provider);
        for row in rows(snapshot) {
            println!(
                "{}",
                format!("{} / {}:", row.category, row.action).bold()
            );
            for id in &row.ids {
                println!("  • {}", id.cyan());
            }
        }
        println!("{}", "\n====================================\n".bold());

        std::fs::write(&self.output_path, render_html(snapshot)?)?;
        tracing::info!("Wrote report to {}", self.output_path.display());
        Ok(())
    }
}
