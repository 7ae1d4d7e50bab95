//! Report rendering.
//!
//! Two formats are written under the reports directory:
//!
//! - a self-contained HTML page, `test_report_<YYYYmmdd_HHMMSS>.html`
//! - an Allure results directory, `allure_<YYYYmmdd_HHMMSS>/`, holding one
//!   `<uuid>-result.json` per scenario plus failure screenshots as
//!   attachments

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::harness::{ScenarioOutcome, ScenarioResult, SuiteReport};
use crate::result::VitrineResult;

const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Allure status of one result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllureStatus {
    Passed,
    Failed,
    Broken,
    Skipped,
}

impl From<&ScenarioOutcome> for AllureStatus {
    fn from(outcome: &ScenarioOutcome) -> Self {
        match outcome {
            ScenarioOutcome::Passed => Self::Passed,
            ScenarioOutcome::Failed(_) => Self::Failed,
            ScenarioOutcome::Skipped(_) => Self::Skipped,
            ScenarioOutcome::Errored(_) => Self::Broken,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllureLabel {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllureAttachment {
    pub name: String,
    /// File name relative to the results directory
    pub source: String,
    #[serde(rename = "type")]
    pub mime: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AllureStatusDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// One `<uuid>-result.json` document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AllureResult {
    pub uuid: String,
    pub history_id: String,
    pub name: String,
    pub full_name: String,
    pub status: AllureStatus,
    pub status_details: AllureStatusDetails,
    pub stage: String,
    /// Epoch milliseconds
    pub start: i64,
    pub stop: i64,
    pub labels: Vec<AllureLabel>,
    pub attachments: Vec<AllureAttachment>,
}

impl AllureResult {
    fn from_result(result: &ScenarioResult) -> Self {
        let start = result.started_at.timestamp_millis();
        let elapsed = i64::try_from(result.duration.as_millis()).unwrap_or(i64::MAX);
        let mut labels = vec![
            AllureLabel {
                name: "suite".to_string(),
                value: result.file.clone(),
            },
            AllureLabel {
                name: "framework".to_string(),
                value: "vitrine".to_string(),
            },
        ];
        labels.extend(result.markers.iter().map(|m| AllureLabel {
            name: "tag".to_string(),
            value: m.to_string(),
        }));
        Self {
            uuid: Uuid::new_v4().to_string(),
            history_id: result.path(),
            name: result.name.clone(),
            full_name: result.path(),
            status: AllureStatus::from(&result.outcome),
            status_details: AllureStatusDetails {
                message: result.outcome.message().map(str::to_string),
            },
            stage: "finished".to_string(),
            start,
            stop: start.saturating_add(elapsed),
            labels,
            attachments: Vec::new(),
        }
    }
}

/// Renders a [`SuiteReport`] to disk
#[derive(Debug, Clone, Copy)]
pub struct Reporter<'r> {
    report: &'r SuiteReport,
}

impl<'r> Reporter<'r> {
    #[must_use]
    pub const fn new(report: &'r SuiteReport) -> Self {
        Self { report }
    }

    fn stamp(at: DateTime<Local>) -> String {
        at.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Write the HTML report into `dir`, returning its path
    pub fn write_html(&self, dir: &Path) -> VitrineResult<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!(
            "test_report_{}.html",
            Self::stamp(self.report.started_at)
        ));
        std::fs::write(&path, self.render_html())?;
        tracing::info!(path = %path.display(), "HTML report written");
        Ok(path)
    }

    /// Self-contained HTML page
    #[must_use]
    pub fn render_html(&self) -> String {
        let report = self.report;
        let pass_rate = if report.total() == 0 {
            0.0
        } else {
            report.passed() as f64 / report.total() as f64 * 100.0
        };

        let mut html = String::from(
            r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Vitrine Test Report</title>
    <style>
        body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 20px; }
        .summary { background: #f5f5f5; padding: 20px; border-radius: 8px; margin-bottom: 20px; }
        .progress-bar { background: #ddd; height: 20px; border-radius: 10px; overflow: hidden; }
        .passed { background: #4caf50; height: 100%; }
        .test { padding: 10px; margin: 5px 0; border-radius: 4px; }
        .test.pass { background: #e8f5e9; border-left: 4px solid #4caf50; }
        .test.fail { background: #ffebee; border-left: 4px solid #f44336; }
        .test.error { background: #fce4ec; border-left: 4px solid #880e4f; }
        .test.skip { background: #fff3e0; border-left: 4px solid #ff9800; }
        .tag { font-size: 0.8em; background: #e0e0e0; border-radius: 3px; padding: 1px 5px; margin-left: 4px; }
        .message { color: #d32f2f; font-family: monospace; white-space: pre-wrap; }
        .screenshot { font-size: 0.9em; color: #555; }
    </style>
</head>
<body>
"#,
        );

        let _ = write!(
            html,
            r#"<div class="summary">
    <h1>{name}</h1>
    <h2>Results: {passed}/{total} passed ({rate:.1}%)</h2>
    <div class="progress-bar">
        <div class="passed" style="width: {rate:.1}%"></div>
    </div>
    <p>{failed} failed, {skipped} skipped, {errored} errored</p>
    <p>Backend: {backend} ({browser}) &middot; Started {started} &middot; Duration: {secs:.2}s</p>
</div>
"#,
            name = escape_html(&report.name),
            passed = report.passed(),
            total = report.total(),
            rate = pass_rate,
            failed = report.failed(),
            skipped = report.skipped(),
            errored = report.errored(),
            backend = escape_html(&report.backend),
            browser = report.browser,
            started = report.started_at.format("%Y-%m-%d %H:%M:%S"),
            secs = report.duration.as_secs_f64(),
        );

        html.push_str("<h2>Scenarios</h2>\n");
        for result in &report.results {
            let class = match result.outcome {
                ScenarioOutcome::Passed => "pass",
                ScenarioOutcome::Failed(_) => "fail",
                ScenarioOutcome::Skipped(_) => "skip",
                ScenarioOutcome::Errored(_) => "error",
            };
            let _ = write!(
                html,
                r#"<div class="test {class}">
    <strong>{path}</strong> - {label} ({ms:.2}ms)"#,
                path = escape_html(&result.path()),
                label = result.outcome.label(),
                ms = result.duration.as_secs_f64() * 1000.0,
            );
            for marker in &result.markers {
                let _ = write!(html, r#"<span class="tag">{marker}</span>"#);
            }
            html.push('\n');
            if let Some(message) = result.outcome.message() {
                let _ = writeln!(html, r#"    <div class="message">{}</div>"#, escape_html(message));
            }
            if let Some(shot) = &result.screenshot {
                let _ = writeln!(
                    html,
                    r#"    <div class="screenshot">Screenshot: {}</div>"#,
                    escape_html(&shot.display().to_string())
                );
            }
            html.push_str("</div>\n");
        }

        html.push_str(
            r"
<footer>
    <p>Generated by Vitrine</p>
</footer>
</body>
</html>
",
        );
        html
    }

    /// Allure result documents, one per scenario
    #[must_use]
    pub fn allure_results(&self) -> Vec<AllureResult> {
        self.report.results.iter().map(AllureResult::from_result).collect()
    }

    /// Write an Allure results directory into `dir`, returning its path
    ///
    /// Failure screenshots that still exist are copied next to the result
    /// files and attached.
    pub fn write_allure(&self, dir: &Path) -> VitrineResult<PathBuf> {
        let out = dir.join(format!("allure_{}", Self::stamp(self.report.started_at)));
        std::fs::create_dir_all(&out)?;
        for (result, mut allure) in self.report.results.iter().zip(self.allure_results()) {
            if let Some(shot) = result.screenshot.as_deref().filter(|p| p.exists()) {
                let source = format!("{}-attachment.png", Uuid::new_v4());
                std::fs::copy(shot, out.join(&source))?;
                allure.attachments.push(AllureAttachment {
                    name: "failure screenshot".to_string(),
                    source,
                    mime: "image/png".to_string(),
                });
            }
            let file = out.join(format!("{}-result.json", allure.uuid));
            std::fs::write(file, serde_json::to_string_pretty(&allure)?)?;
        }
        tracing::info!(path = %out.display(), results = self.report.total(), "Allure results written");
        Ok(out)
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
