//! Browser session abstraction.
//!
//! A [`Session`] is one live browser instance. Page objects borrow it; a
//! [`SessionGuard`] owns it for the length of one scenario and guarantees a
//! single `quit`.
//!
//! # Implementations
//!
//! - `FixtureSession` - in-memory document, for tests and offline runs
//! - `CdpSession` - real Chromium over CDP (`browser` feature)

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::{Settings, WindowSize};
use crate::locator::Selector;
use crate::result::{VitrineError, VitrineResult};

/// Opaque handle to an element found by a session
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ElementRef {
    id: String,
}

impl ElementRef {
    /// Wrap a backend-specific handle
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// Backend-specific handle
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for ElementRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Rendering state of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementState {
    /// Rendered (not `display:none`/`visibility:hidden`)
    pub displayed: bool,
    /// Accepts input
    pub enabled: bool,
    /// Rendered width in CSS pixels
    pub width: u32,
    /// Rendered height in CSS pixels
    pub height: u32,
}

impl ElementState {
    /// Displayed with a non-zero box
    #[must_use]
    pub const fn is_visible(&self) -> bool {
        self.displayed && self.width > 0 && self.height > 0
    }

    /// Visible and enabled
    #[must_use]
    pub const fn is_clickable(&self) -> bool {
        self.is_visible() && self.enabled
    }
}

/// `document.readyState`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadyState {
    /// Document still loading
    Loading,
    /// DOM parsed, subresources pending
    Interactive,
    /// Fully loaded
    Complete,
}

impl FromStr for ReadyState {
    type Err = VitrineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "loading" => Ok(Self::Loading),
            "interactive" => Ok(Self::Interactive),
            "complete" => Ok(Self::Complete),
            other => Err(VitrineError::session(format!(
                "unexpected document.readyState {other:?}"
            ))),
        }
    }
}

/// Browser family requested for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    /// Chrome / Chromium
    #[default]
    Chrome,
    /// Firefox
    Firefox,
}

impl BrowserKind {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Firefox => "firefox",
        }
    }
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A live browser session
///
/// All methods take `&self`: several page objects share one session within
/// a scenario, so implementations synchronise internally.
pub trait Session: Send + Sync {
    /// Load a URL
    fn navigate(&self, url: &str) -> VitrineResult<()>;

    /// Current URL
    fn current_url(&self) -> VitrineResult<String>;

    /// Document title
    fn title(&self) -> VitrineResult<String>;

    /// Document ready state
    fn ready_state(&self) -> VitrineResult<ReadyState>;

    /// All elements matching one selector, in document order
    fn find_elements(&self, selector: &Selector) -> VitrineResult<Vec<ElementRef>>;

    /// Elements matching one selector inside `parent`, in document order
    fn find_elements_within(
        &self,
        parent: &ElementRef,
        selector: &Selector,
    ) -> VitrineResult<Vec<ElementRef>>;

    /// Rendering state of an element
    fn element_state(&self, element: &ElementRef) -> VitrineResult<ElementState>;

    /// Click an element
    fn click(&self, element: &ElementRef) -> VitrineResult<()>;

    /// Clear an input
    fn clear(&self, element: &ElementRef) -> VitrineResult<()>;

    /// Type into an input; a trailing `\n` submits
    fn send_keys(&self, element: &ElementRef, text: &str) -> VitrineResult<()>;

    /// Text content
    fn text(&self, element: &ElementRef) -> VitrineResult<String>;

    /// Attribute or property value (`value` and `checked` reflect live state)
    fn attribute(&self, element: &ElementRef, name: &str) -> VitrineResult<Option<String>>;

    /// Select a `<select>` option by its visible text
    fn select_option(&self, element: &ElementRef, visible_text: &str) -> VitrineResult<()>;

    /// Scroll the element into the viewport
    fn scroll_into_view(&self, element: &ElementRef) -> VitrineResult<()>;

    /// Move the pointer over the element
    fn hover(&self, element: &ElementRef) -> VitrineResult<()>;

    /// Reload the page
    fn refresh(&self) -> VitrineResult<()>;

    /// Go back in history
    fn back(&self) -> VitrineResult<()>;

    /// Resize the viewport
    fn set_window_size(&self, size: WindowSize) -> VitrineResult<()>;

    /// Current viewport size
    fn window_size(&self) -> VitrineResult<WindowSize>;

    /// PNG screenshot of the viewport
    fn screenshot(&self) -> VitrineResult<Vec<u8>>;

    /// End the session and release the browser
    fn quit(&self) -> VitrineResult<()>;
}

/// Creates sessions on demand, one per scenario
pub trait SessionProvider: Send + Sync {
    /// Start a session for the given browser
    fn create_session(
        &self,
        browser: BrowserKind,
        settings: &Settings,
    ) -> VitrineResult<Box<dyn Session>>;

    /// Provider name for logs and reports
    fn name(&self) -> &str;
}

/// Exclusive owner of one session; quits it exactly once
///
/// Teardown happens on [`SessionGuard::close`] or, failing that, on drop,
/// which also covers a scenario body that panics.
pub struct SessionGuard {
    session: Option<Box<dyn Session>>,
}

impl fmt::Debug for SessionGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionGuard")
            .field("open", &self.session.is_some())
            .finish()
    }
}

impl SessionGuard {
    /// Take ownership of a session
    #[must_use]
    pub fn new(session: Box<dyn Session>) -> Self {
        Self {
            session: Some(session),
        }
    }

    /// Borrow the session, if still open
    #[must_use]
    pub fn session(&self) -> Option<&dyn Session> {
        self.session.as_deref()
    }

    /// Quit now and report the teardown result
    pub fn close(mut self) -> VitrineResult<()> {
        match self.session.take() {
            Some(session) => session.quit(),
            None => Ok(()),
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        if let Some(session) = self.session.take() {
            if let Err(e) = session.quit() {
                tracing::warn!(error = %e, "session teardown failed");
            }
        }
    }
}
