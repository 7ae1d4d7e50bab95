//! Scenario harness.
//!
//! A [`Scenario`] is a plain function over a [`ScenarioContext`]. The
//! [`SuiteRunner`] gives every scenario its own session, wrapped in a
//! [`SessionGuard`] so the browser is released exactly once whether the body
//! returns, fails or panics, and maps the body's result onto a
//! [`ScenarioOutcome`]:
//!
//! | body result                          | outcome   |
//! |--------------------------------------|-----------|
//! | `Ok(())`                             | `Passed`  |
//! | `Err(AssertionFailed)` ([`verify`])  | `Failed`  |
//! | `Err(PreconditionUnmet)` ([`assume`])| `Skipped` |
//! | any other error, or a panic          | `Errored` |

use std::collections::BTreeSet;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::config::Settings;
use crate::page::{BasePage, PageObject};
use crate::result::{VitrineError, VitrineResult};
use crate::session::{BrowserKind, Session, SessionGuard, SessionProvider};

/// Scenario body
pub type ScenarioFn = fn(&ScenarioContext<'_>) -> VitrineResult<()>;

/// Tags used to select scenarios
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Marker {
    Smoke,
    Regression,
    Login,
    Cart,
    Search,
    Wishlist,
    Navigation,
    Registration,
    Product,
    Shop,
    ForgotPassword,
    ErrorHandling,
}

impl Marker {
    pub const ALL: [Self; 12] = [
        Self::Smoke,
        Self::Regression,
        Self::Login,
        Self::Cart,
        Self::Search,
        Self::Wishlist,
        Self::Navigation,
        Self::Registration,
        Self::Product,
        Self::Shop,
        Self::ForgotPassword,
        Self::ErrorHandling,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Smoke => "smoke",
            Self::Regression => "regression",
            Self::Login => "login",
            Self::Cart => "cart",
            Self::Search => "search",
            Self::Wishlist => "wishlist",
            Self::Navigation => "navigation",
            Self::Registration => "registration",
            Self::Product => "product",
            Self::Shop => "shop",
            Self::ForgotPassword => "forgot_password",
            Self::ErrorHandling => "error_handling",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Marker {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == wanted)
            .ok_or_else(|| VitrineError::invalid_input(format!("unknown marker: {s}")))
    }
}

/// One independent test case
#[derive(Debug, Clone, Copy)]
pub struct Scenario {
    /// Catalog file, e.g. `login`
    pub file: &'static str,
    /// Scenario name within the file
    pub name: &'static str,
    pub markers: &'static [Marker],
    pub body: ScenarioFn,
}

impl Scenario {
    #[must_use]
    pub const fn new(
        file: &'static str,
        name: &'static str,
        markers: &'static [Marker],
        body: ScenarioFn,
    ) -> Self {
        Self {
            file,
            name,
            markers,
            body,
        }
    }

    /// `file::name`
    #[must_use]
    pub fn path(&self) -> String {
        format!("{}::{}", self.file, self.name)
    }

    #[must_use]
    pub fn has_marker(&self, marker: Marker) -> bool {
        self.markers.contains(&marker)
    }
}

/// What a scenario body sees: its own session and the shared settings
#[derive(Clone, Copy)]
pub struct ScenarioContext<'s> {
    session: &'s dyn Session,
    settings: &'s Settings,
}

impl fmt::Debug for ScenarioContext<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScenarioContext")
            .field("base_url", &self.settings.base_url())
            .finish_non_exhaustive()
    }
}

impl<'s> ScenarioContext<'s> {
    #[must_use]
    pub const fn new(session: &'s dyn Session, settings: &'s Settings) -> Self {
        Self { session, settings }
    }

    #[must_use]
    pub const fn session(&self) -> &'s dyn Session {
        self.session
    }

    #[must_use]
    pub const fn settings(&self) -> &'s Settings {
        self.settings
    }

    /// Bind a page object to this scenario's session
    #[must_use]
    pub fn page<P: PageObject<'s>>(&self) -> P {
        P::new(self.session, self.settings)
    }

    /// Bind a page object and navigate to it
    pub fn open<P: PageObject<'s>>(&self) -> VitrineResult<P> {
        let page = self.page::<P>();
        page.load()?;
        Ok(page)
    }
}

/// Fail the scenario unless `condition` holds
pub fn verify(condition: bool, message: impl Into<String>) -> VitrineResult<()> {
    if condition {
        Ok(())
    } else {
        Err(VitrineError::assertion(message))
    }
}

/// Fail the scenario unless `actual == expected`
pub fn verify_eq<T: PartialEq + fmt::Debug>(actual: T, expected: T, what: &str) -> VitrineResult<()> {
    verify(
        actual == expected,
        format!("{what}: expected {expected:?}, got {actual:?}"),
    )
}

/// Skip the scenario unless `condition` holds
pub fn assume(condition: bool, reason: impl Into<String>) -> VitrineResult<()> {
    if condition {
        Ok(())
    } else {
        Err(VitrineError::precondition(reason))
    }
}

/// How a scenario ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "message", rename_all = "snake_case")]
pub enum ScenarioOutcome {
    Passed,
    /// A verified condition was false
    Failed(String),
    /// A precondition was unmet
    Skipped(String),
    /// Any other error, including panics and session failures
    Errored(String),
}

impl ScenarioOutcome {
    /// Classify a body result
    #[must_use]
    pub fn from_result(result: VitrineResult<()>) -> Self {
        match result {
            Ok(()) => Self::Passed,
            Err(VitrineError::AssertionFailed { message }) => Self::Failed(message),
            Err(VitrineError::PreconditionUnmet { reason }) => Self::Skipped(reason),
            Err(other) => Self::Errored(other.to_string()),
        }
    }

    /// Failed or errored
    #[must_use]
    pub const fn is_failure(&self) -> bool {
        matches!(self, Self::Failed(_) | Self::Errored(_))
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Failed(_) => "FAILED",
            Self::Skipped(_) => "SKIPPED",
            Self::Errored(_) => "ERROR",
        }
    }

    /// Failure, skip or error message
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Passed => None,
            Self::Failed(m) | Self::Skipped(m) | Self::Errored(m) => Some(m),
        }
    }
}

impl fmt::Display for ScenarioOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.message() {
            Some(message) => write!(f, "{} ({message})", self.label()),
            None => f.write_str(self.label()),
        }
    }
}

/// One executed scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub file: String,
    pub name: String,
    pub markers: Vec<Marker>,
    pub outcome: ScenarioOutcome,
    pub duration: Duration,
    pub started_at: DateTime<Local>,
    /// Failure screenshot, when one was captured
    pub screenshot: Option<PathBuf>,
}

impl ScenarioResult {
    /// `file::name`
    #[must_use]
    pub fn path(&self) -> String {
        format!("{}::{}", self.file, self.name)
    }
}

/// Which scenarios to run
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Marker(Marker),
    /// Catalog file; `login`, `test_login` and `test_login.py` all name
    /// the same file
    File(String),
    /// `file::name` prefix
    Path(String),
}

impl Selection {
    #[must_use]
    pub fn matches(&self, scenario: &Scenario) -> bool {
        match self {
            Self::All => true,
            Self::Marker(marker) => scenario.has_marker(*marker),
            Self::File(file) => normalize_file(file) == scenario.file,
            Self::Path(prefix) => {
                let path = scenario.path();
                match prefix.split_once("::") {
                    Some((file, rest)) => {
                        path.starts_with(&format!("{}::{rest}", normalize_file(file)))
                    }
                    None => path.starts_with(&format!("{}::", normalize_file(prefix))),
                }
            }
        }
    }
}

fn normalize_file(file: &str) -> &str {
    let file = file.trim();
    let file = file.rsplit(['/', '\\']).next().unwrap_or(file);
    let file = file
        .strip_suffix(".py")
        .or_else(|| file.strip_suffix(".rs"))
        .unwrap_or(file);
    file.strip_prefix("test_").unwrap_or(file)
}

/// Rerun policy based on the previous run's failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RerunMode {
    #[default]
    Off,
    /// Only the last failures; everything selected when none are recorded
    LastFailed,
    /// Last failures first, then the rest
    FailedFirst,
}

/// Filter and order the catalog for one run
#[must_use]
pub fn plan(
    catalog: &[Scenario],
    selection: &Selection,
    rerun: RerunMode,
    last_failed: &BTreeSet<String>,
) -> Vec<Scenario> {
    let selected: Vec<Scenario> = catalog
        .iter()
        .filter(|s| selection.matches(s))
        .copied()
        .collect();
    let (failed, rest): (Vec<Scenario>, Vec<Scenario>) = selected
        .iter()
        .partition(|s| last_failed.contains(&s.path()));
    match rerun {
        RerunMode::Off => selected,
        RerunMode::LastFailed if failed.is_empty() => {
            tracing::info!("no recorded failures, running the full selection");
            selected
        }
        RerunMode::LastFailed => failed,
        RerunMode::FailedFirst => failed.into_iter().chain(rest).collect(),
    }
}

/// Runs scenarios, one fresh session each
pub struct SuiteRunner<'a> {
    provider: &'a dyn SessionProvider,
    settings: &'a Settings,
    browser: BrowserKind,
    workers: usize,
    screenshots: bool,
}

impl fmt::Debug for SuiteRunner<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SuiteRunner")
            .field("provider", &self.provider.name())
            .field("browser", &self.browser)
            .field("workers", &self.workers)
            .field("screenshots", &self.screenshots)
            .finish()
    }
}

impl<'a> SuiteRunner<'a> {
    #[must_use]
    pub fn new(provider: &'a dyn SessionProvider, settings: &'a Settings) -> Self {
        Self {
            provider,
            settings,
            browser: BrowserKind::default(),
            workers: 1,
            screenshots: true,
        }
    }

    #[must_use]
    pub const fn with_browser(mut self, browser: BrowserKind) -> Self {
        self.browser = browser;
        self
    }

    /// Worker threads; at least one
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Capture a screenshot when a scenario fails
    #[must_use]
    pub const fn with_failure_screenshots(mut self, enabled: bool) -> Self {
        self.screenshots = enabled;
        self
    }

    /// Run `scenarios`; results come back in the given order
    #[must_use]
    pub fn run(&self, scenarios: &[Scenario]) -> SuiteReport {
        let started_at = Local::now();
        let start = Instant::now();
        let workers = self.workers.min(scenarios.len()).max(1);
        tracing::info!(
            scenarios = scenarios.len(),
            workers,
            provider = self.provider.name(),
            "starting suite"
        );

        let results = if workers == 1 {
            scenarios.iter().map(|s| self.run_one(s)).collect()
        } else {
            let next = AtomicUsize::new(0);
            let slots: Mutex<Vec<Option<ScenarioResult>>> = Mutex::new(vec![None; scenarios.len()]);
            std::thread::scope(|scope| {
                for _ in 0..workers {
                    scope.spawn(|| loop {
                        let index = next.fetch_add(1, Ordering::SeqCst);
                        let Some(scenario) = scenarios.get(index) else {
                            break;
                        };
                        store_result(&slots, index, self.run_one(scenario));
                    });
                }
            });
            slots
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner)
                .into_iter()
                .flatten()
                .collect()
        };

        SuiteReport {
            name: "vitrine".to_string(),
            backend: self.provider.name().to_string(),
            browser: self.browser,
            started_at,
            duration: start.elapsed(),
            results,
        }
    }

    /// Run one scenario in its own session
    #[must_use]
    pub fn run_one(&self, scenario: &Scenario) -> ScenarioResult {
        let started_at = Local::now();
        let start = Instant::now();
        let path = scenario.path();
        tracing::info!(scenario = %path, "scenario started");

        let mut screenshot = None;
        let outcome = match self.provider.create_session(self.browser, self.settings) {
            Err(e) => ScenarioOutcome::Errored(format!("session setup failed: {e}")),
            Ok(session) => {
                let guard = SessionGuard::new(session);
                let outcome = guard.session().map_or_else(
                    || ScenarioOutcome::Errored("session closed before the scenario ran".to_string()),
                    |session| self.execute(scenario, session),
                );
                if outcome.is_failure() && self.screenshots {
                    screenshot = guard.session().and_then(|s| self.capture(scenario, s));
                }
                if let Err(e) = guard.close() {
                    tracing::warn!(scenario = %path, error = %e, "session teardown failed");
                }
                outcome
            }
        };

        let duration = start.elapsed();
        match &outcome {
            ScenarioOutcome::Passed => tracing::info!(scenario = %path, ?duration, "passed"),
            ScenarioOutcome::Skipped(reason) => tracing::info!(scenario = %path, reason, "skipped"),
            other => tracing::warn!(scenario = %path, outcome = %other, "scenario did not pass"),
        }
        ScenarioResult {
            file: scenario.file.to_string(),
            name: scenario.name.to_string(),
            markers: scenario.markers.to_vec(),
            outcome,
            duration,
            started_at,
            screenshot,
        }
    }

    fn execute(&self, scenario: &Scenario, session: &dyn Session) -> ScenarioOutcome {
        let ctx = ScenarioContext::new(session, self.settings);
        match panic::catch_unwind(AssertUnwindSafe(|| (scenario.body)(&ctx))) {
            Ok(result) => ScenarioOutcome::from_result(result),
            Err(payload) => ScenarioOutcome::Errored(format!("panicked: {}", panic_message(payload.as_ref()))),
        }
    }

    fn capture(&self, scenario: &Scenario, session: &dyn Session) -> Option<PathBuf> {
        let name = format!(
            "{}__{}_{}",
            scenario.file,
            scenario.name,
            Local::now().format("%Y%m%d_%H%M%S")
        );
        match BasePage::new(session, self.settings).take_screenshot(&name) {
            Ok(path) => Some(path),
            Err(e) => {
                tracing::warn!(scenario = %scenario.path(), error = %e, "failure screenshot not saved");
                None
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

/// Outcome of a suite run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteReport {
    pub name: String,
    /// Session provider, `fixture` or `cdp`
    pub backend: String,
    pub browser: BrowserKind,
    pub started_at: DateTime<Local>,
    pub duration: Duration,
    pub results: Vec<ScenarioResult>,
}

impl SuiteReport {
    fn count(&self, pick: fn(&ScenarioOutcome) -> bool) -> usize {
        self.results.iter().filter(|r| pick(&r.outcome)).count()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn passed(&self) -> usize {
        self.count(|o| matches!(o, ScenarioOutcome::Passed))
    }

    #[must_use]
    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, ScenarioOutcome::Failed(_)))
    }

    #[must_use]
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ScenarioOutcome::Skipped(_)))
    }

    #[must_use]
    pub fn errored(&self) -> usize {
        self.count(|o| matches!(o, ScenarioOutcome::Errored(_)))
    }

    /// No failures and no errors; skips are allowed
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed() == 0 && self.errored() == 0
    }

    #[must_use]
    pub fn failures(&self) -> Vec<&ScenarioResult> {
        self.results.iter().filter(|r| r.outcome.is_failure()).collect()
    }

    /// Paths of failed or errored scenarios
    #[must_use]
    pub fn failed_paths(&self) -> BTreeSet<String> {
        self.failures().into_iter().map(ScenarioResult::path).collect()
    }

    /// `PASSED 12 scenarios in 1.03s (10 passed, 0 failed, 2 skipped, 0 errored)`
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "{} {} scenarios in {:.2}s ({} passed, {} failed, {} skipped, {} errored)",
            if self.is_success() { "PASSED" } else { "FAILED" },
            self.total(),
            self.duration.as_secs_f64(),
            self.passed(),
            self.failed(),
            self.skipped(),
            self.errored()
        )
    }
}

/// Put a finished result into its slot, even if another worker poisoned the lock
fn store_result<T>(slots: &Mutex<Vec<Option<T>>>, index: usize, result: T) {
    let mut slots = slots.lock().unwrap_or_else(PoisonError::into_inner);
    slots[index] = Some(result);
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Timeouts;
    use crate::fixture::{El, FixtureDocument, FixtureProvider, FixtureSite};
    use crate::page::HomePage;

    fn site() -> FixtureSite {
        FixtureSite::new("https://shop.test").static_page(
            "/",
            FixtureDocument::new("Shop").with(El::div("header__logo").child(El::new("img"))),
        )
    }

    fn provider() -> FixtureProvider {
        FixtureProvider::new(site(), || ())
    }

    fn settings(dir: &std::path::Path) -> Settings {
        Settings::default()
            .with_base_url("https://shop.test/")
            .with_timeouts(Timeouts::uniform(50, 5))
            .with_output_dirs(dir.join("screenshots"), dir.join("reports"))
    }

    fn passes(ctx: &ScenarioContext<'_>) -> VitrineResult<()> {
        let home = ctx.page::<HomePage>();
        verify(home.is_logo_visible()?, "logo hidden")
    }

    fn fails(_: &ScenarioContext<'_>) -> VitrineResult<()> {
        verify_eq(1, 2, "answer")
    }

    fn skips(_: &ScenarioContext<'_>) -> VitrineResult<()> {
        assume(false, "cart is empty")
    }

    fn errors(_: &ScenarioContext<'_>) -> VitrineResult<()> {
        Err(VitrineError::session("browser crashed"))
    }

    fn panics(_: &ScenarioContext<'_>) -> VitrineResult<()> {
        panic!("boom")
    }

    const CATALOG: [Scenario; 5] = [
        Scenario::new("home", "test_logo", &[Marker::Smoke, Marker::Navigation], passes),
        Scenario::new("home", "test_fails", &[Marker::Regression], fails),
        Scenario::new("cart", "test_skips", &[Marker::Cart], skips),
        Scenario::new("cart", "test_errors", &[Marker::Cart, Marker::Smoke], errors),
        Scenario::new("login", "test_panics", &[Marker::Login], panics),
    ];

    mod outcome_tests {
        use super::*;

        #[test]
        fn test_from_result_classification() {
            assert_eq!(ScenarioOutcome::from_result(Ok(())), ScenarioOutcome::Passed);
            assert_eq!(
                ScenarioOutcome::from_result(verify(false, "nope")),
                ScenarioOutcome::Failed("nope".to_string())
            );
            assert_eq!(
                ScenarioOutcome::from_result(assume(false, "no coupon box")),
                ScenarioOutcome::Skipped("no coupon box".to_string())
            );
            assert!(matches!(
                ScenarioOutcome::from_result(Err(VitrineError::session("gone"))),
                ScenarioOutcome::Errored(_)
            ));
        }

        #[test]
        fn test_verify_eq_message() {
            let err = verify_eq("a", "b", "title").unwrap_err();
            assert_eq!(err.to_string(), "Assertion failed: title: expected \"b\", got \"a\"");
        }

        #[test]
        fn test_marker_parse() {
            assert_eq!("smoke".parse::<Marker>().unwrap(), Marker::Smoke);
            assert_eq!("forgot-password".parse::<Marker>().unwrap(), Marker::ForgotPassword);
            assert_eq!("error_handling".parse::<Marker>().unwrap(), Marker::ErrorHandling);
            assert!("flaky".parse::<Marker>().is_err());
        }
    }

    mod selection_tests {
        use super::*;

        fn paths(selected: &[Scenario]) -> Vec<String> {
            selected.iter().map(Scenario::path).collect()
        }

        #[test]
        fn test_marker_and_file_selection() {
            let none = BTreeSet::new();
            let smoke = plan(&CATALOG, &Selection::Marker(Marker::Smoke), RerunMode::Off, &none);
            assert_eq!(paths(&smoke), ["home::test_logo", "cart::test_errors"]);
            for spelling in ["cart", "test_cart", "test_cart.py", "tests/test_cart.py"] {
                let cart = plan(&CATALOG, &Selection::File(spelling.into()), RerunMode::Off, &none);
                assert_eq!(cart.len(), 2, "{spelling}");
            }
        }

        #[test]
        fn test_path_prefix_selection() {
            let none = BTreeSet::new();
            let one = plan(&CATALOG, &Selection::Path("test_home.py::test_fa".into()), RerunMode::Off, &none);
            assert_eq!(paths(&one), ["home::test_fails"]);
            let file = plan(&CATALOG, &Selection::Path("login".into()), RerunMode::Off, &none);
            assert_eq!(paths(&file), ["login::test_panics"]);
        }

        #[test]
        fn test_rerun_modes() {
            let last: BTreeSet<String> = ["cart::test_errors".to_string()].into();
            let lf = plan(&CATALOG, &Selection::All, RerunMode::LastFailed, &last);
            assert_eq!(paths(&lf), ["cart::test_errors"]);
            let ff = plan(&CATALOG, &Selection::All, RerunMode::FailedFirst, &last);
            assert_eq!(ff.len(), CATALOG.len());
            assert_eq!(ff[0].path(), "cart::test_errors");
            let nothing_recorded = plan(&CATALOG, &Selection::All, RerunMode::LastFailed, &BTreeSet::new());
            assert_eq!(nothing_recorded.len(), CATALOG.len());
        }
    }

    mod runner_tests {
        use super::*;

        #[test]
        fn test_suite_outcomes_and_teardown() {
            let dir = tempfile::tempdir().unwrap();
            let cfg = settings(dir.path());
            let provider = provider();
            let report = SuiteRunner::new(&provider, &cfg).run(&CATALOG);

            let outcomes: Vec<&str> = report.results.iter().map(|r| r.outcome.label()).collect();
            assert_eq!(outcomes, ["PASSED", "FAILED", "SKIPPED", "ERROR", "ERROR"]);
            assert!(report.results[4].outcome.message().unwrap().contains("boom"));
            assert!(!report.is_success());
            assert_eq!((report.passed(), report.failed(), report.skipped(), report.errored()), (1, 1, 1, 2));

            assert_eq!(provider.opened(), CATALOG.len());
            assert!(provider.quit_counts().iter().all(|&n| n == 1));
        }

        #[test]
        fn test_failure_screenshots_are_named_after_the_scenario() {
            let dir = tempfile::tempdir().unwrap();
            let cfg = settings(dir.path());
            let provider = provider();
            let runner = SuiteRunner::new(&provider, &cfg);
            let failed = runner.run_one(&CATALOG[1]);
            let shot = failed.screenshot.unwrap();
            let file = shot.file_name().unwrap().to_string_lossy().into_owned();
            assert!(file.starts_with("home__test_fails_"));
            assert!(file.ends_with(".png"));
            assert!(shot.exists());

            let passed = runner.run_one(&CATALOG[0]);
            assert!(passed.screenshot.is_none());
            let skipped = runner.with_failure_screenshots(false).run_one(&CATALOG[1]);
            assert!(skipped.screenshot.is_none());
        }

        #[test]
        fn test_parallel_run_keeps_catalog_order() {
            let dir = tempfile::tempdir().unwrap();
            let cfg = settings(dir.path());
            let provider = provider();
            let report = SuiteRunner::new(&provider, &cfg)
                .with_workers(3)
                .with_failure_screenshots(false)
                .run(&CATALOG);
            let paths: Vec<String> = report.results.iter().map(ScenarioResult::path).collect();
            let expected: Vec<String> = CATALOG.iter().map(Scenario::path).collect();
            assert_eq!(paths, expected);
            assert!(provider.quit_counts().iter().all(|&n| n == 1));
        }

        #[test]
        fn test_results_survive_a_poisoned_slot_lock() {
            let slots: Mutex<Vec<Option<&str>>> = Mutex::new(vec![None; 2]);
            std::thread::scope(|scope| {
                let poisoner = scope.spawn(|| {
                    let _guard = slots.lock().unwrap();
                    panic!("worker died holding the lock");
                });
                assert!(poisoner.join().is_err());
            });
            assert!(slots.is_poisoned());

            store_result(&slots, 1, "cart::test_add");
            store_result(&slots, 0, "home::test_logo");
            let stored = slots.into_inner().unwrap_or_else(PoisonError::into_inner);
            assert_eq!(stored, [Some("home::test_logo"), Some("cart::test_add")]);
        }

        #[test]
        fn test_summary_line() {
            let dir = tempfile::tempdir().unwrap();
            let cfg = settings(dir.path());
            let provider = provider();
            let report = SuiteRunner::new(&provider, &cfg).run(&CATALOG[..1]);
            assert!(report.is_success());
            let line = report.summary_line();
            assert!(line.starts_with("PASSED 1 scenarios in "));
            assert!(line.ends_with("(1 passed, 0 failed, 0 skipped, 0 errored)"));
        }
    }
}
