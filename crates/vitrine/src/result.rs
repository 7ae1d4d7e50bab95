//! Result and error types for Vitrine.
//!
//! Errors fall into three classes that callers treat differently:
//!
//! - **transient**: the element is not there *yet* (`NoSuchElement`,
//!   `StaleElement`). The wait engine keeps polling.
//! - **recoverable**: an optional affordance never showed up in time.
//!   Page objects turn these into `false` or an empty string.
//! - **session-fatal**: the browser is gone. Always propagated.

use thiserror::Error;

/// Result type for Vitrine operations
pub type VitrineResult<T> = Result<T, VitrineError>;

/// Errors that can occur in Vitrine
#[derive(Debug, Error)]
pub enum VitrineError {
    /// A required element was not found within the timeout
    #[error("Element not found: {locator} (waited {timeout_ms}ms)")]
    ElementNotFound {
        /// Locator description
        locator: String,
        /// Timeout in milliseconds
        timeout_ms: u64,
    },

    /// A wait condition did not hold within the timeout
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// Timeout in milliseconds
        ms: u64,
        /// What was waited for
        waited_for: String,
    },

    /// Lookup matched nothing in the current document
    #[error("No such element: {selector}")]
    NoSuchElement {
        /// Selector that matched nothing
        selector: String,
    },

    /// Element handle no longer refers to a node in the document
    #[error("Stale element reference: {element}")]
    StaleElement {
        /// Element handle
        element: String,
    },

    /// Element exists but cannot receive input
    #[error("Element {element} is not interactable: {message}")]
    NotInteractable {
        /// Element handle
        element: String,
        /// Error message
        message: String,
    },

    /// Selector could not be parsed or evaluated
    #[error("Invalid selector {selector}: {message}")]
    InvalidSelector {
        /// Selector text
        selector: String,
        /// Error message
        message: String,
    },

    /// Browser session crashed or became unreachable
    #[error("Session error: {message}")]
    Session {
        /// Error message
        message: String,
    },

    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunch {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    Navigation {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// Scenario assertion failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Scenario precondition not met (scenario is skipped)
    #[error("Precondition unmet: {reason}")]
    PreconditionUnmet {
        /// Why the scenario cannot run
        reason: String,
    },

    /// Invalid configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message
        message: String,
    },

    /// Argument outside the values a page supports
    #[error("Invalid input: {message}")]
    InvalidInput {
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml_ng::Error),
}

impl VitrineError {
    /// Create a session error
    pub fn session(message: impl Into<String>) -> Self {
        Self::Session {
            message: message.into(),
        }
    }

    /// Create an assertion failure
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }

    /// Create a precondition failure
    pub fn precondition(reason: impl Into<String>) -> Self {
        Self::PreconditionUnmet {
            reason: reason.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid-input error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// The "not yet found" class: worth polling again
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::NoSuchElement { .. } | Self::StaleElement { .. })
    }

    /// Errors a page object may convert into `false` or an empty result
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::ElementNotFound { .. }
                | Self::Timeout { .. }
                | Self::NoSuchElement { .. }
                | Self::StaleElement { .. }
                | Self::NotInteractable { .. }
        )
    }

    /// The browser is unusable; never swallowed
    #[must_use]
    pub const fn is_session_fatal(&self) -> bool {
        matches!(
            self,
            Self::Session { .. } | Self::BrowserLaunch { .. } | Self::Navigation { .. }
        )
    }
}
