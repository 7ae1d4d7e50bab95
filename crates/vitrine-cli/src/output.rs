//! Console output and progress reporting

use crate::config::TracebackStyle;
use console::{style, Style, Term};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;
use vitrine::{ScenarioOutcome, ScenarioResult, SuiteReport};

/// Progress and result printer for a suite run
///
/// Progress goes to stderr; results and the summary go to stdout so they
/// can be piped.
#[derive(Debug)]
pub struct ProgressReporter {
    out: Term,
    err: Term,
    spinner: Option<ProgressBar>,
    /// Whether to use colors
    pub use_color: bool,
    /// Quiet mode
    pub quiet: bool,
    /// Print every scenario, not just problems
    pub verbose: bool,
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new(true, false, false)
    }
}

impl ProgressReporter {
    #[must_use]
    pub fn new(use_color: bool, quiet: bool, verbose: bool) -> Self {
        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            spinner: None,
            use_color,
            quiet,
            verbose,
        }
    }

    /// Show a spinner while scenarios run
    pub fn start(&mut self, total: usize, backend: &str) {
        if self.quiet || !self.err.is_term() {
            return;
        }
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.green} {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(format!("running {total} scenarios on {backend}"));
        spinner.enable_steady_tick(Duration::from_millis(100));
        self.spinner = Some(spinner);
    }

    pub fn finish(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    fn line(&self, message: &str) {
        let _ = self.out.write_line(message);
    }

    fn badge(&self, outcome: &ScenarioOutcome) -> String {
        let label = outcome.label();
        if !self.use_color {
            return label.to_string();
        }
        match outcome {
            ScenarioOutcome::Passed => style(label).green().bold().to_string(),
            ScenarioOutcome::Skipped(_) => style(label).yellow().to_string(),
            ScenarioOutcome::Failed(_) | ScenarioOutcome::Errored(_) => {
                style(label).red().bold().to_string()
            }
        }
    }

    /// Print a section header
    pub fn header(&self, title: &str) {
        if self.quiet {
            return;
        }
        let styled = if self.use_color {
            style(title).bold().underlined().to_string()
        } else {
            format!("=== {title} ===")
        };
        self.line("");
        self.line(&styled);
    }

    /// One line per scenario; passes only when verbose, failures always
    pub fn result(&self, result: &ScenarioResult) {
        let show = match result.outcome {
            ScenarioOutcome::Passed => self.verbose,
            ScenarioOutcome::Skipped(_) => self.verbose || !self.quiet,
            ScenarioOutcome::Failed(_) | ScenarioOutcome::Errored(_) => true,
        };
        if !show {
            return;
        }
        let mut text = format!("{} {}", self.badge(&result.outcome), result.path());
        if let ScenarioOutcome::Skipped(reason) = &result.outcome {
            text.push_str(&format!(" ({reason})"));
        }
        self.line(&text);
    }

    /// Failure details in the chosen style
    pub fn failures(&self, report: &SuiteReport, traceback: TracebackStyle) {
        let failures = report.failures();
        if failures.is_empty() {
            return;
        }
        self.line("");
        self.line(&if self.use_color {
            style("FAILURES").red().bold().to_string()
        } else {
            "=== FAILURES ===".to_string()
        });
        for result in failures {
            self.line(&traceback.render(result));
        }
    }

    /// Print the one-line summary
    pub fn summary(&self, report: &SuiteReport) {
        self.line("");
        let line = report.summary_line();
        if !self.use_color {
            self.line(&line);
            return;
        }
        let status = if report.is_success() {
            Style::new().green().bold()
        } else {
            Style::new().red().bold()
        };
        match line.split_once(' ') {
            Some((word, rest)) => self.line(&format!("{} {rest}", status.apply_to(word))),
            None => self.line(&line),
        }
    }

    /// Point at where to look after a failed run
    pub fn diagnostics(&self, screenshots: &Path, reports: &Path) {
        self.line(&format!(
            "Failure screenshots: {}/  Reports: {}/",
            screenshots.display(),
            reports.display()
        ));
    }

    /// Print an info message
    pub fn info(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("ℹ").blue().bold().to_string()
        } else {
            "INFO".to_string()
        };
        self.line(&format!("{prefix} {message}"));
    }

    /// Print a warning message
    pub fn warning(&self, message: &str) {
        if self.quiet {
            return;
        }
        let prefix = if self.use_color {
            style("⚠").yellow().bold().to_string()
        } else {
            "WARN".to_string()
        };
        let _ = self.err.write_line(&format!("{prefix} {message}"));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use vitrine::{BrowserKind, Marker};

    fn report() -> SuiteReport {
        let result = |name: &str, outcome| ScenarioResult {
            file: "login".to_string(),
            name: name.to_string(),
            markers: vec![Marker::Login],
            outcome,
            duration: Duration::from_millis(3),
            started_at: chrono::Local::now(),
            screenshot: None,
        };
        SuiteReport {
            name: "vitrine".to_string(),
            backend: "fixture".to_string(),
            browser: BrowserKind::Chrome,
            started_at: chrono::Local::now(),
            duration: Duration::from_millis(9),
            results: vec![
                result("test_valid_login", ScenarioOutcome::Passed),
                result("test_logout", ScenarioOutcome::Skipped("no logout link".into())),
                result("test_invalid_email_login", ScenarioOutcome::Failed("accepted".into())),
            ],
        }
    }

    #[test]
    fn test_new_reporter() {
        let reporter = ProgressReporter::new(false, true, false);
        assert!(!reporter.use_color);
        assert!(reporter.quiet);
        assert!(ProgressReporter::default().use_color);
    }

    #[test]
    fn test_plain_badges() {
        let reporter = ProgressReporter::new(false, false, false);
        assert_eq!(reporter.badge(&ScenarioOutcome::Passed), "PASSED");
        assert_eq!(reporter.badge(&ScenarioOutcome::Errored("x".into())), "ERROR");
    }

    #[test]
    fn test_full_report_output() {
        let mut reporter = ProgressReporter::new(false, false, true);
        let report = report();
        reporter.start(report.total(), "fixture");
        reporter.finish();
        reporter.header("Scenarios");
        for result in &report.results {
            reporter.result(result);
        }
        reporter.failures(&report, TracebackStyle::Long);
        reporter.summary(&report);
        reporter.diagnostics(Path::new("screenshots"), Path::new("reports"));
        reporter.info("done");
        reporter.warning("careful");
    }

    #[test]
    fn test_colored_summary() {
        let reporter = ProgressReporter::new(true, true, false);
        reporter.summary(&report());
    }
}
