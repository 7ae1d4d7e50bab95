//! Vitrine: page-object browser testing for storefronts
//!
//! Vitrine drives a storefront through page objects that wait explicitly,
//! tolerate markup drift through alternative selectors, and classify form
//! submissions into tri-state outcomes instead of guessing at success.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     VITRINE Architecture                         │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌─────────────┐   ┌─────────────┐              │
//! │  │ Scenario   │   │ Page        │   │ Session     │──► Chromium  │
//! │  │ catalog    │──►│ objects     │──►│ (trait)     │    (CDP)     │
//! │  │ + harness  │   │ + waits     │   │             │──► Fixture   │
//! │  └────────────┘   └─────────────┘   └─────────────┘    site      │
//! │        │                                                         │
//! │        ▼                                                         │
//! │  ┌────────────┐                                                  │
//! │  │ Reporter   │  HTML report, Allure results                     │
//! │  └────────────┘                                                  │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use vitrine::fixture::{storefront, FixtureProvider, StoreState, STOREFRONT_ORIGIN};
//! use vitrine::{plan, scenarios, RerunMode, Selection, Settings, SuiteRunner, Timeouts, Marker};
//!
//! let settings = Settings::default()
//!     .with_base_url(format!("{STOREFRONT_ORIGIN}/"))
//!     .with_timeouts(Timeouts::uniform(100, 5));
//! let provider = FixtureProvider::new(storefront(), StoreState::default);
//! let selected = plan(
//!     &scenarios::catalog(),
//!     &Selection::Marker(Marker::Login),
//!     RerunMode::Off,
//!     &Default::default(),
//! );
//! let report = SuiteRunner::new(&provider, &settings)
//!     .with_failure_screenshots(false)
//!     .run(&selected[..2]);
//! assert_eq!(report.total(), 2);
//! ```

#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

#[cfg(feature = "browser")]
#[allow(clippy::missing_errors_doc, clippy::significant_drop_tightening)]
mod browser;
mod config;
/// In-memory browser backend and the bundled demo storefront
pub mod fixture;
mod harness;
mod locator;
mod outcome;
/// Storefront page objects
pub mod page;
mod reporter;
mod result;
/// The bundled scenario catalog
pub mod scenarios;
mod session;
mod test_data;
mod wait;

#[cfg(feature = "browser")]
pub use browser::{CdpProvider, CdpSession};
pub use config::{PageKind, Settings, Timeouts, WindowSize, DEFAULT_BASE_URL};
pub use harness::{
    assume, plan, verify, verify_eq, Marker, RerunMode, Scenario, ScenarioContext, ScenarioFn,
    ScenarioOutcome, ScenarioResult, Selection, SuiteReport, SuiteRunner,
};
pub use locator::{Locator, Selector, Strategy};
pub use outcome::{AcceptSignal, Outcome, OutcomePolicy, OutcomeProbe};
pub use reporter::{
    AllureAttachment, AllureLabel, AllureResult, AllureStatus, AllureStatusDetails, Reporter,
};
pub use result::{VitrineError, VitrineResult};
pub use session::{
    BrowserKind, ElementRef, ElementState, ReadyState, Session, SessionGuard, SessionProvider,
};
pub use test_data::{looks_like_email, unique_email, InvalidData, UserRecord};
pub use wait::{
    resolve, resolve_indexed, wait_until, Condition, SessionPredicate, WaitOptions, WaitResult, Waiter,
    DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};

/// Everything a scenario author typically needs
pub mod prelude {
    pub use super::harness::*;
    pub use super::page::*;
    pub use super::{
        BrowserKind, InvalidData, Locator, Outcome, PageKind, Selector, Settings, Timeouts,
        UserRecord, VitrineError, VitrineResult, WindowSize,
    };
}
