//! Suite settings.
//!
//! [`Settings`] is built once at process start, from defaults or a YAML
//! file, and then only borrowed. Builders consume `self`, so there is no
//! way to change a value after it has been handed to a session or a page.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::outcome::OutcomePolicy;
use crate::result::{VitrineError, VitrineResult};
use crate::session::BrowserKind;
use crate::test_data::UserRecord;

/// Default storefront under test
pub const DEFAULT_BASE_URL: &str = "https://instylekenya.co.ke/";

/// Pages with a canonical URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageKind {
    /// Storefront home
    Home,
    /// Customer login
    Login,
    /// Customer registration
    Register,
    /// Password recovery
    ForgotPassword,
    /// Shopping cart
    Cart,
    /// Wishlist
    Wishlist,
    /// Contact page
    Contact,
    /// About page
    About,
    /// Product listing
    Shop,
    /// Search results
    Search,
}

impl PageKind {
    /// All kinds, in menu order
    pub const ALL: [Self; 10] = [
        Self::Home,
        Self::Login,
        Self::Register,
        Self::ForgotPassword,
        Self::Cart,
        Self::Wishlist,
        Self::Contact,
        Self::About,
        Self::Shop,
        Self::Search,
    ];

    /// Default path relative to the base URL
    #[must_use]
    pub const fn default_path(&self) -> &'static str {
        match self {
            Self::Home => "",
            Self::Login => "account/login",
            Self::Register => "account/register",
            Self::ForgotPassword => "account/recover",
            Self::Cart => "cart",
            Self::Wishlist => "account/wishlist",
            Self::Contact => "pages/contact-us",
            Self::About => "pages/about-us",
            Self::Shop => "shop",
            Self::Search => "search",
        }
    }
}

/// Wait budgets, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timeouts {
    /// Default explicit wait
    pub explicit_wait_ms: u64,
    /// Default wait for multi-element lookups
    pub implicit_wait_ms: u64,
    /// Document ready budget after navigation
    pub page_load_ms: u64,
    /// Quick look for an optional signal (error banners)
    pub probe_ms: u64,
    /// Wait for a confirmation signal (success banners, visibility checks)
    pub confirm_ms: u64,
    /// Wait for an element to go away
    pub disappear_ms: u64,
    /// Polling cadence of the wait engine
    pub poll_interval_ms: u64,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            explicit_wait_ms: 20_000,
            implicit_wait_ms: 10_000,
            page_load_ms: 30_000,
            probe_ms: 3_000,
            confirm_ms: 5_000,
            disappear_ms: 10_000,
            poll_interval_ms: 250,
        }
    }
}

impl Timeouts {
    /// Same budget for every wait (handy for offline runs)
    #[must_use]
    pub const fn uniform(ms: u64, poll_interval_ms: u64) -> Self {
        Self {
            explicit_wait_ms: ms,
            implicit_wait_ms: ms,
            page_load_ms: ms,
            probe_ms: ms,
            confirm_ms: ms,
            disappear_ms: ms,
            poll_interval_ms,
        }
    }

    /// Explicit wait as a `Duration`
    #[must_use]
    pub const fn explicit(&self) -> Duration {
        Duration::from_millis(self.explicit_wait_ms)
    }

    /// Implicit wait as a `Duration`
    #[must_use]
    pub const fn implicit(&self) -> Duration {
        Duration::from_millis(self.implicit_wait_ms)
    }

    /// Page load budget as a `Duration`
    #[must_use]
    pub const fn page_load(&self) -> Duration {
        Duration::from_millis(self.page_load_ms)
    }

    /// Probe budget as a `Duration`
    #[must_use]
    pub const fn probe(&self) -> Duration {
        Duration::from_millis(self.probe_ms)
    }

    /// Confirmation budget as a `Duration`
    #[must_use]
    pub const fn confirm(&self) -> Duration {
        Duration::from_millis(self.confirm_ms)
    }

    /// Disappearance budget as a `Duration`
    #[must_use]
    pub const fn disappear(&self) -> Duration {
        Duration::from_millis(self.disappear_ms)
    }

    /// Polling cadence as a `Duration`
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Browser window size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowSize {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl WindowSize {
    /// Phone portrait
    pub const MOBILE: Self = Self::new(375, 667);
    /// Tablet portrait
    pub const TABLET: Self = Self::new(768, 1024);
    /// Small laptop
    pub const LAPTOP: Self = Self::new(1200, 800);

    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for WindowSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// Immutable suite settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    base_url: String,
    urls: BTreeMap<PageKind, String>,
    timeouts: Timeouts,
    window: WindowSize,
    test_user: UserRecord,
    search_terms: Vec<String>,
    categories: Vec<String>,
    outcome_policy: OutcomePolicy,
    screenshots_dir: PathBuf,
    reports_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            urls: BTreeMap::new(),
            timeouts: Timeouts::default(),
            window: WindowSize::default(),
            test_user: UserRecord::default_test_user(),
            search_terms: ["dress", "shoes", "handbag", "jewelry", "accessories"]
                .map(String::from)
                .to_vec(),
            categories: ["Dresses", "Shoes", "Bags", "Jewelry", "Accessories"]
                .map(String::from)
                .to_vec(),
            outcome_policy: OutcomePolicy::Optimistic,
            screenshots_dir: PathBuf::from("screenshots"),
            reports_dir: PathBuf::from("reports"),
        }
    }
}

impl Settings {
    /// Defaults, overridden by the YAML file at `path` when given
    pub fn load(path: Option<&Path>) -> VitrineResult<Self> {
        let settings = match path {
            Some(path) => {
                let text = std::fs::read_to_string(path).map_err(|e| {
                    VitrineError::config(format!("cannot read {}: {e}", path.display()))
                })?;
                serde_yaml_ng::from_str::<Self>(&text)?
            }
            None => Self::default(),
        };
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> VitrineResult<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(VitrineError::config(format!(
                "base_url must be an http(s) URL, got {:?}",
                self.base_url
            )));
        }
        if self.timeouts.poll_interval_ms == 0 {
            return Err(VitrineError::config("poll_interval_ms must be positive"));
        }
        if self.search_terms.is_empty() {
            return Err(VitrineError::config("search_terms must not be empty"));
        }
        Ok(())
    }

    /// Replace the base URL
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Replace the wait budgets
    #[must_use]
    pub const fn with_timeouts(mut self, timeouts: Timeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    /// Replace the outcome policy
    #[must_use]
    pub const fn with_outcome_policy(mut self, policy: OutcomePolicy) -> Self {
        self.outcome_policy = policy;
        self
    }

    /// Replace the output directories
    #[must_use]
    pub fn with_output_dirs(mut self, screenshots: impl Into<PathBuf>, reports: impl Into<PathBuf>) -> Self {
        self.screenshots_dir = screenshots.into();
        self.reports_dir = reports.into();
        self
    }

    /// Override the path of one page
    #[must_use]
    pub fn with_page_path(mut self, page: PageKind, path: impl Into<String>) -> Self {
        self.urls.insert(page, path.into());
        self
    }

    /// Base URL, as configured
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL of a page
    #[must_use]
    pub fn url_for(&self, page: PageKind) -> String {
        let path = self
            .urls
            .get(&page)
            .map_or(page.default_path(), String::as_str);
        self.absolute_url(path)
    }

    /// Resolve a path against the base URL; absolute URLs pass through
    #[must_use]
    pub fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            return path.to_string();
        }
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    /// Per-page URL map, with defaults filled in
    #[must_use]
    pub fn url_map(&self) -> BTreeMap<PageKind, String> {
        PageKind::ALL.iter().map(|&p| (p, self.url_for(p))).collect()
    }

    /// Wait budgets
    #[must_use]
    pub const fn timeouts(&self) -> &Timeouts {
        &self.timeouts
    }

    /// Window size
    #[must_use]
    pub const fn window(&self) -> WindowSize {
        self.window
    }

    /// Default test user
    #[must_use]
    pub const fn test_user(&self) -> &UserRecord {
        &self.test_user
    }

    /// Search terms exercised by the suite
    #[must_use]
    pub fn search_terms(&self) -> &[String] {
        &self.search_terms
    }

    /// Product categories exercised by the suite
    #[must_use]
    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// How actions without feedback are classified
    #[must_use]
    pub const fn outcome_policy(&self) -> OutcomePolicy {
        self.outcome_policy
    }

    /// Directory for screenshots
    #[must_use]
    pub fn screenshots_dir(&self) -> &Path {
        &self.screenshots_dir
    }

    /// Directory for reports
    #[must_use]
    pub fn reports_dir(&self) -> &Path {
        &self.reports_dir
    }

    /// Launch arguments for a browser
    #[must_use]
    pub fn browser_options(&self, browser: BrowserKind, headless: bool) -> Vec<String> {
        let WindowSize { width, height } = self.window;
        let mut args = match browser {
            BrowserKind::Chrome => vec![
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
                "--disable-gpu".to_string(),
                format!("--window-size={width},{height}"),
            ],
            BrowserKind::Firefox => vec![format!("--width={width}"), format!("--height={height}")],
        };
        if headless {
            args.push("--headless".to_string());
        }
        args
    }
}
