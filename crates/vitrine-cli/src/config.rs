//! CLI configuration

use crate::commands::Cli;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use vitrine::fixture::STOREFRONT_ORIGIN;
use vitrine::{BrowserKind, RerunMode, ScenarioResult, Settings, Timeouts};

/// CLI verbosity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Verbosity {
    /// Quiet - failures and the summary only
    Quiet,
    /// Normal - default output
    #[default]
    Normal,
    /// Verbose - one line per scenario, info logs
    Verbose,
    /// Debug - maximum output
    Debug,
}

impl Verbosity {
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: u8) -> Self {
        if quiet {
            return Self::Quiet;
        }
        match verbose {
            0 => Self::Normal,
            1 => Self::Verbose,
            _ => Self::Debug,
        }
    }

    /// Check if quiet mode
    #[must_use]
    pub const fn is_quiet(self) -> bool {
        matches!(self, Self::Quiet)
    }

    /// Check if verbose or higher
    #[must_use]
    pub const fn is_verbose(self) -> bool {
        matches!(self, Self::Verbose | Self::Debug)
    }

    /// Default `tracing` filter directive; `RUST_LOG` takes precedence
    #[must_use]
    pub const fn log_directive(self) -> &'static str {
        match self {
            Self::Quiet => "error",
            Self::Normal => "warn",
            Self::Verbose => "info",
            Self::Debug => "debug",
        }
    }
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ColorChoice {
    /// Always use colors
    Always,
    /// Use colors when output is a terminal
    #[default]
    Auto,
    /// Never use colors
    Never,
}

impl ColorChoice {
    /// Should use colors based on output detection
    #[must_use]
    pub fn should_color(self) -> bool {
        match self {
            Self::Always => true,
            Self::Never => false,
            Self::Auto => std::io::IsTerminal::is_terminal(&std::io::stdout()),
        }
    }
}

/// How much of a failure to print
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum TracebackStyle {
    /// Path and message
    #[default]
    Short,
    /// Path, markers, timing, message and screenshot
    Long,
    /// One line per failure
    Line,
    /// The raw outcome value
    Native,
}

impl TracebackStyle {
    /// Render one failed scenario
    #[must_use]
    pub fn render(self, result: &ScenarioResult) -> String {
        let message = result.outcome.message().unwrap_or_default();
        match self {
            Self::Line => format!(
                "{}: {}",
                result.path(),
                message.lines().next().unwrap_or_default()
            ),
            Self::Short => {
                let mut out = format!("{} [{}]", result.path(), result.outcome.label());
                for line in message.lines() {
                    out.push_str("\n    ");
                    out.push_str(line);
                }
                out
            }
            Self::Long => {
                let markers: Vec<&str> = result.markers.iter().map(|m| m.as_str()).collect();
                let mut out = format!(
                    "____ {} ____\nmarkers:  {}\nstarted:  {}\nduration: {:.3}s\noutcome:  {}\n\n{}",
                    result.path(),
                    markers.join(", "),
                    result.started_at.format("%Y-%m-%d %H:%M:%S"),
                    result.duration.as_secs_f64(),
                    result.outcome.label(),
                    message
                );
                if let Some(shot) = &result.screenshot {
                    out.push_str(&format!("\nscreenshot: {}", shot.display()));
                }
                out
            }
            Self::Native => format!("{}\n{:#?}", result.path(), result.outcome),
        }
    }
}

/// Where sessions come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
pub enum Backend {
    /// Chromium over the DevTools protocol
    #[default]
    Cdp,
    /// The bundled in-memory storefront
    Fixture,
}

impl Backend {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cdp => "cdp",
            Self::Fixture => "fixture",
        }
    }

    /// Adjust loaded settings for this backend
    ///
    /// The fixture storefront lives at its own origin and renders
    /// synchronously, so it gets that origin and short timeouts.
    #[must_use]
    pub fn prepare(self, settings: Settings) -> Settings {
        match self {
            Self::Cdp => settings,
            Self::Fixture => settings
                .with_base_url(format!("{STOREFRONT_ORIGIN}/"))
                .with_timeouts(Timeouts::uniform(150, 5)),
        }
    }
}

/// CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Verbosity level
    pub verbosity: Verbosity,
    /// Color output choice
    pub color: ColorChoice,
    /// Number of parallel workers (0 = auto-detect)
    pub parallel_jobs: usize,
    /// Failure detail style
    pub traceback: TracebackStyle,
    /// Write the HTML report
    pub html_report: bool,
    /// Write Allure results
    pub allure: bool,
    /// Last-failed handling
    #[serde(skip)]
    pub rerun: RerunMode,
    /// Session backend
    pub backend: Backend,
    /// Browser to drive
    pub browser: BrowserKind,
    /// Run without a browser window
    pub headless: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            verbosity: Verbosity::Normal,
            color: ColorChoice::Auto,
            parallel_jobs: 1,
            traceback: TracebackStyle::Short,
            html_report: false,
            allure: false,
            rerun: RerunMode::Off,
            backend: Backend::Cdp,
            browser: BrowserKind::Chrome,
            headless: false,
        }
    }
}

impl CliConfig {
    /// Create new default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration mirroring the parsed flags
    #[must_use]
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            verbosity: Verbosity::from_flags(cli.quiet, cli.verbose),
            color: cli.color.into(),
            parallel_jobs: cli.parallel.unwrap_or(1),
            traceback: cli.traceback,
            html_report: cli.html_report,
            allure: cli.allure,
            rerun: cli.rerun_mode(),
            backend: cli.backend,
            browser: cli.browser.into(),
            headless: cli.headless,
        }
    }

    /// Set verbosity
    #[must_use]
    pub const fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    /// Set color choice
    #[must_use]
    pub const fn with_color(mut self, color: ColorChoice) -> Self {
        self.color = color;
        self
    }

    /// Set parallel workers
    #[must_use]
    pub const fn with_parallel_jobs(mut self, jobs: usize) -> Self {
        self.parallel_jobs = jobs;
        self
    }

    #[must_use]
    pub const fn with_backend(mut self, backend: Backend) -> Self {
        self.backend = backend;
        self
    }

    #[must_use]
    pub const fn with_rerun(mut self, rerun: RerunMode) -> Self {
        self.rerun = rerun;
        self
    }

    /// Get effective number of parallel workers
    #[must_use]
    pub fn effective_jobs(&self) -> usize {
        if self.parallel_jobs == 0 {
            std::thread::available_parallelism()
                .map(std::num::NonZeroUsize::get)
                .unwrap_or(1)
        } else {
            self.parallel_jobs
        }
    }
}
