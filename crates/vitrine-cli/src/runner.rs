//! Suite execution for the CLI

use crate::cache::LastFailedCache;
use crate::config::{Backend, CliConfig};
use crate::error::{CliError, CliResult};
use crate::output::ProgressReporter;
use std::path::PathBuf;
use vitrine::fixture::{storefront, FixtureProvider, StoreState};
use vitrine::{plan, scenarios, Reporter, Scenario, Selection, SessionProvider, Settings, SuiteReport, SuiteRunner};

/// Files written by one run
#[derive(Debug, Clone, Default)]
pub struct RunArtifacts {
    pub html_report: Option<PathBuf>,
    pub allure_dir: Option<PathBuf>,
}

/// Selects, runs and reports the bundled scenario suite
#[derive(Debug)]
pub struct TestRunner {
    config: CliConfig,
    settings: Settings,
    cache: LastFailedCache,
    reporter: ProgressReporter,
}

impl TestRunner {
    /// `settings` should already be prepared for the configured backend
    #[must_use]
    pub fn new(config: CliConfig, settings: Settings) -> Self {
        let reporter = ProgressReporter::new(
            config.color.should_color(),
            config.verbosity.is_quiet(),
            config.verbosity.is_verbose(),
        );
        Self {
            config,
            settings,
            cache: LastFailedCache::default(),
            reporter,
        }
    }

    #[must_use]
    pub fn with_cache(mut self, cache: LastFailedCache) -> Self {
        self.cache = cache;
        self
    }

    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Scenarios a run with `selection` would execute, in order
    pub fn plan(&self, selection: &Selection) -> CliResult<Vec<Scenario>> {
        let last_failed = self.cache.load()?;
        let selected = plan(&scenarios::catalog(), selection, self.config.rerun, &last_failed);
        if selected.is_empty() {
            return Err(CliError::invalid_argument(format!(
                "no scenarios match {selection:?}"
            )));
        }
        Ok(selected)
    }

    /// Run the selection and print results
    ///
    /// Returns the report even when scenarios fail; `Err` means the suite
    /// could not run or its outputs could not be written.
    pub fn run(&mut self, selection: &Selection) -> CliResult<SuiteReport> {
        let selected = self.plan(selection)?;
        let provider = self.provider()?;
        tracing::info!(
            scenarios = selected.len(),
            backend = self.config.backend.as_str(),
            browser = %self.config.browser,
            "running suite"
        );

        self.reporter.start(selected.len(), self.config.backend.as_str());
        let report = SuiteRunner::new(provider.as_ref(), &self.settings)
            .with_browser(self.config.browser)
            .with_workers(self.config.effective_jobs())
            .run(&selected);
        self.reporter.finish();

        self.reporter.header("Scenarios");
        for result in &report.results {
            self.reporter.result(result);
        }
        self.reporter.failures(&report, self.config.traceback);

        let artifacts = self.write_reports(&report)?;
        if let Some(path) = &artifacts.html_report {
            self.reporter.info(&format!("HTML report: {}", path.display()));
        }
        if let Some(path) = &artifacts.allure_dir {
            self.reporter.info(&format!("Allure results: {}", path.display()));
        }

        if let Err(e) = self.cache.update(&report) {
            tracing::warn!(error = %e, path = %self.cache.path().display(), "could not update last-failed cache");
        }

        self.reporter.summary(&report);
        if !report.is_success() {
            self.reporter
                .diagnostics(self.settings.screenshots_dir(), self.settings.reports_dir());
        }
        Ok(report)
    }

    fn write_reports(&self, report: &SuiteReport) -> CliResult<RunArtifacts> {
        let dir = self.settings.reports_dir();
        let writer = Reporter::new(report);
        let mut artifacts = RunArtifacts::default();
        if self.config.html_report {
            artifacts.html_report = Some(
                writer
                    .write_html(dir)
                    .map_err(|e| CliError::report_generation(e.to_string()))?,
            );
        }
        if self.config.allure {
            artifacts.allure_dir = Some(
                writer
                    .write_allure(dir)
                    .map_err(|e| CliError::report_generation(e.to_string()))?,
            );
        }
        Ok(artifacts)
    }

    fn provider(&self) -> CliResult<Box<dyn SessionProvider>> {
        match self.config.backend {
            Backend::Fixture => Ok(Box::new(FixtureProvider::new(storefront(), StoreState::default))),
            Backend::Cdp => self.cdp_provider(),
        }
    }

    #[cfg(feature = "browser")]
    fn cdp_provider(&self) -> CliResult<Box<dyn SessionProvider>> {
        Ok(Box::new(vitrine::CdpProvider::new(self.config.headless)))
    }

    #[cfg(not(feature = "browser"))]
    fn cdp_provider(&self) -> CliResult<Box<dyn SessionProvider>> {
        Err(CliError::test_execution(
            "the cdp backend needs the `browser` feature; rebuild with --features browser or pass --backend fixture",
        ))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Verbosity;
    use tempfile::TempDir;
    use vitrine::{Marker, RerunMode};

    fn runner(dir: &TempDir, config: CliConfig) -> TestRunner {
        let settings = Backend::Fixture
            .prepare(Settings::default())
            .with_output_dirs(dir.path().join("screenshots"), dir.path().join("reports"));
        TestRunner::new(config.with_backend(Backend::Fixture), settings)
            .with_cache(LastFailedCache::in_dir(dir.path().join("cache")))
    }

    fn quiet() -> CliConfig {
        CliConfig::new().with_verbosity(Verbosity::Quiet)
    }

    #[test]
    fn test_plan_by_marker() {
        let dir = TempDir::new().unwrap();
        let selected = runner(&dir, quiet())
            .plan(&Selection::Marker(Marker::Login))
            .unwrap();
        assert!(!selected.is_empty());
        assert!(selected.iter().all(|s| s.has_marker(Marker::Login)));
    }

    #[test]
    fn test_empty_selection_is_rejected() {
        let dir = TempDir::new().unwrap();
        let err = runner(&dir, quiet())
            .plan(&Selection::File("checkout".to_string()))
            .unwrap_err();
        assert!(matches!(err, CliError::InvalidArgument { .. }));
    }

    #[test]
    fn test_run_writes_reports_and_cache() {
        let dir = TempDir::new().unwrap();
        let mut config = quiet();
        config.html_report = true;
        config.allure = true;
        let mut runner = runner(&dir, config);

        let report = runner
            .run(&Selection::Path("login::test_login_page_loads".to_string()))
            .unwrap();
        assert_eq!(report.total(), 1);
        assert!(report.is_success(), "{}", report.summary_line());

        let reports: Vec<_> = std::fs::read_dir(dir.path().join("reports"))
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert!(reports.iter().any(|n| n.starts_with("test_report_") && n.ends_with(".html")));
        assert!(reports.iter().any(|n| n.starts_with("allure_")));
        assert!(dir.path().join("cache").join("lastfailed.json").exists());
    }

    #[test]
    fn test_last_failed_runs_recorded_paths() {
        let dir = TempDir::new().unwrap();
        let cache = LastFailedCache::in_dir(dir.path().join("cache"));
        cache
            .store(&["home::test_logo_is_visible".to_string()].into())
            .unwrap();
        let runner = runner(&dir, quiet().with_rerun(RerunMode::LastFailed));
        let selected = runner.plan(&Selection::All).unwrap();
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].path(), "home::test_logo_is_visible");
    }

    #[cfg(not(feature = "browser"))]
    #[test]
    fn test_cdp_without_browser_feature() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::default().with_output_dirs(dir.path().join("s"), dir.path().join("r"));
        let mut runner = TestRunner::new(quiet(), settings)
            .with_cache(LastFailedCache::in_dir(dir.path().join("cache")));
        let err = runner.run(&Selection::Marker(Marker::Smoke)).unwrap_err();
        assert!(err.to_string().contains("browser"));
    }
}
