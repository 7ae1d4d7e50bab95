//! CLI argument definitions using clap

use crate::config::{Backend, TracebackStyle};
use clap::{ArgGroup, Parser, ValueEnum};
use std::path::PathBuf;
use vitrine::{BrowserKind, Marker, RerunMode, Selection};

/// Vitrine: run the storefront scenario suite
#[derive(Parser, Debug)]
#[command(name = "vitrine")]
#[command(author, version, about, long_about = None)]
#[command(group(ArgGroup::new("selection").multiple(false)))]
#[command(after_help = "Examples:\n  \
    vitrine --smoke --headless\n  \
    vitrine --cart --parallel 4 --html-report\n  \
    vitrine --file login --browser firefox\n  \
    vitrine --test login::test_valid_login -v\n  \
    vitrine --lf --backend fixture")]
pub struct Cli {
    /// Run smoke scenarios
    #[arg(long, group = "selection")]
    pub smoke: bool,

    /// Run regression scenarios
    #[arg(long, group = "selection")]
    pub regression: bool,

    /// Run login scenarios
    #[arg(long, group = "selection")]
    pub login: bool,

    /// Run cart scenarios
    #[arg(long, group = "selection")]
    pub cart: bool,

    /// Run search scenarios
    #[arg(long, group = "selection")]
    pub search: bool,

    /// Run wishlist scenarios
    #[arg(long, group = "selection")]
    pub wishlist: bool,

    /// Run navigation scenarios
    #[arg(long, group = "selection")]
    pub navigation: bool,

    /// Run scenarios carrying any marker (e.g. shop, product, forgot_password)
    #[arg(short, long, group = "selection", value_parser = parse_marker)]
    pub marker: Option<Marker>,

    /// Run one scenario file (e.g. `login`)
    #[arg(long, group = "selection", value_name = "NAME")]
    pub file: Option<String>,

    /// Run scenarios under a path prefix (e.g. `login::test_valid_login`)
    #[arg(long, group = "selection", value_name = "PATH")]
    pub test: Option<String>,

    /// Browser to drive
    #[arg(long, value_enum, default_value = "chrome")]
    pub browser: BrowserArg,

    /// Run the browser without a window
    #[arg(long)]
    pub headless: bool,

    /// Worker threads (0 = one per CPU)
    #[arg(short = 'n', long, value_name = "N")]
    pub parallel: Option<usize>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (only failures and the summary)
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Color output (auto, always, never)
    #[arg(long, value_enum, default_value = "auto")]
    pub color: ColorArg,

    /// Write an HTML report into the reports directory
    #[arg(long)]
    pub html_report: bool,

    /// Write Allure results into the reports directory
    #[arg(long)]
    pub allure: bool,

    /// Failure detail style
    #[arg(long = "tb", value_enum, default_value = "short")]
    pub traceback: TracebackStyle,

    /// Rerun only the scenarios that failed last time
    #[arg(long = "lf", conflicts_with = "failed_first")]
    pub last_failed: bool,

    /// Run the scenarios that failed last time first
    #[arg(long = "ff")]
    pub failed_first: bool,

    /// Session backend
    #[arg(long, value_enum, default_value = "cdp")]
    pub backend: Backend,

    /// Settings file (YAML)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Override the storefront base URL
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Print the selected scenario paths without running them
    #[arg(long)]
    pub list: bool,
}

impl Cli {
    /// Scenario selection from the mutually exclusive selection flags
    #[must_use]
    pub fn selection(&self) -> Selection {
        let flags = [
            (self.smoke, Marker::Smoke),
            (self.regression, Marker::Regression),
            (self.login, Marker::Login),
            (self.cart, Marker::Cart),
            (self.search, Marker::Search),
            (self.wishlist, Marker::Wishlist),
            (self.navigation, Marker::Navigation),
        ];
        if let Some((_, marker)) = flags.into_iter().find(|(set, _)| *set) {
            return Selection::Marker(marker);
        }
        if let Some(marker) = self.marker {
            return Selection::Marker(marker);
        }
        if let Some(file) = &self.file {
            return Selection::File(file.clone());
        }
        if let Some(path) = &self.test {
            return Selection::Path(path.clone());
        }
        Selection::All
    }

    #[must_use]
    pub const fn rerun_mode(&self) -> RerunMode {
        if self.last_failed {
            RerunMode::LastFailed
        } else if self.failed_first {
            RerunMode::FailedFirst
        } else {
            RerunMode::Off
        }
    }
}

fn parse_marker(s: &str) -> Result<Marker, String> {
    s.parse().map_err(|e: vitrine::VitrineError| e.to_string())
}

/// Browser argument for CLI
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum BrowserArg {
    /// Chrome / Chromium
    #[default]
    Chrome,
    /// Firefox
    Firefox,
}

impl From<BrowserArg> for BrowserKind {
    fn from(arg: BrowserArg) -> Self {
        match arg {
            BrowserArg::Chrome => Self::Chrome,
            BrowserArg::Firefox => Self::Firefox,
        }
    }
}

/// Color argument for CLI
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum ColorArg {
    /// Automatic color detection
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl From<ColorArg> for crate::config::ColorChoice {
    fn from(arg: ColorArg) -> Self {
        match arg {
            ColorArg::Auto => Self::Auto,
            ColorArg::Always => Self::Always,
            ColorArg::Never => Self::Never,
        }
    }
}
