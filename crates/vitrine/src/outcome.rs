//! Classification of submitted actions.
//!
//! After a page submits a form it gathers an [`OutcomeProbe`]: was a success
//! banner shown, was an error shown, did the URL move. The probe is
//! classified in that priority order; when none of the signals fired the
//! [`OutcomePolicy`] decides.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What made an outcome count as accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcceptSignal {
    /// An explicit success indicator was visible
    SuccessIndicator,
    /// The page navigated away
    UrlChanged,
    /// No signal at all; accepted by the optimistic policy
    Assumed,
}

/// Result of a submitted action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// The site took the action
    Accepted(AcceptSignal),
    /// The site refused and said why
    RejectedWithReason(String),
    /// Nothing observable happened
    RejectedSilently,
}

impl Outcome {
    /// `true` for any accepted variant
    #[must_use]
    pub const fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }

    /// Accepted on an observable signal, not on policy
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(
            self,
            Self::Accepted(AcceptSignal::SuccessIndicator | AcceptSignal::UrlChanged)
        )
    }

    /// Rejection message, if one was shown
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::RejectedWithReason(reason) => Some(reason),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted(AcceptSignal::SuccessIndicator) => f.write_str("accepted (success shown)"),
            Self::Accepted(AcceptSignal::UrlChanged) => f.write_str("accepted (navigated)"),
            Self::Accepted(AcceptSignal::Assumed) => f.write_str("accepted (assumed)"),
            Self::RejectedWithReason(reason) => write!(f, "rejected: {reason}"),
            Self::RejectedSilently => f.write_str("rejected silently"),
        }
    }
}

/// How an action without any feedback is classified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomePolicy {
    /// No signal counts as success
    #[default]
    Optimistic,
    /// No signal counts as a silent rejection
    Strict,
}

/// Signals observed after an action
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutcomeProbe {
    /// A success indicator was visible
    pub success_visible: bool,
    /// Text of a visible error indicator
    pub error_message: Option<String>,
    /// The URL moved away from the form
    pub url_changed: bool,
}

impl OutcomeProbe {
    /// Empty probe, no signals
    #[must_use]
    pub const fn new() -> Self {
        Self {
            success_visible: false,
            error_message: None,
            url_changed: false,
        }
    }

    /// Record a success indicator
    #[must_use]
    pub const fn success(mut self, visible: bool) -> Self {
        self.success_visible = visible;
        self
    }

    /// Record an error message (empty text counts as no error)
    #[must_use]
    pub fn error(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        self.error_message = (!message.trim().is_empty()).then(|| message.trim().to_string());
        self
    }

    /// Record a URL change
    #[must_use]
    pub const fn url_changed(mut self, changed: bool) -> Self {
        self.url_changed = changed;
        self
    }

    /// Classify: success, then error, then URL change, then policy
    #[must_use]
    pub fn classify(self, policy: OutcomePolicy) -> Outcome {
        if self.success_visible {
            return Outcome::Accepted(AcceptSignal::SuccessIndicator);
        }
        if let Some(message) = self.error_message {
            return Outcome::RejectedWithReason(message);
        }
        if self.url_changed {
            return Outcome::Accepted(AcceptSignal::UrlChanged);
        }
        match policy {
            OutcomePolicy::Optimistic => Outcome::Accepted(AcceptSignal::Assumed),
            OutcomePolicy::Strict => Outcome::RejectedSilently,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod classify_tests {
        use super::*;

        #[test]
        fn test_success_beats_error() {
            let outcome = OutcomeProbe::new()
                .success(true)
                .error("bad")
                .classify(OutcomePolicy::Strict);
            assert_eq!(outcome, Outcome::Accepted(AcceptSignal::SuccessIndicator));
        }

        #[test]
        fn test_error_beats_url_change() {
            let outcome = OutcomeProbe::new()
                .error("Email required")
                .url_changed(true)
                .classify(OutcomePolicy::Optimistic);
            assert_eq!(outcome.reason(), Some("Email required"));
            assert!(!outcome.is_accepted());
        }

        #[test]
        fn test_blank_error_is_ignored() {
            let outcome = OutcomeProbe::new().error("   ").classify(OutcomePolicy::Strict);
            assert_eq!(outcome, Outcome::RejectedSilently);
        }

        #[test]
        fn test_no_signal_follows_policy() {
            let optimistic = OutcomeProbe::new().classify(OutcomePolicy::Optimistic);
            let strict = OutcomeProbe::new().classify(OutcomePolicy::Strict);
            assert_eq!(optimistic, Outcome::Accepted(AcceptSignal::Assumed));
            assert!(optimistic.is_accepted());
            assert!(!optimistic.is_confirmed());
            assert_eq!(strict, Outcome::RejectedSilently);
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Outcome::RejectedWithReason("nope".into()).to_string(),
            "rejected: nope"
        );
        assert_eq!(OutcomePolicy::default(), OutcomePolicy::Optimistic);
    }

    proptest! {
        #[test]
        fn prop_policy_only_matters_without_signals(
            success in any::<bool>(),
            error in proptest::option::of("[a-z]{1,8}"),
            moved in any::<bool>(),
        ) {
            let probe = OutcomeProbe {
                success_visible: success,
                error_message: error.clone(),
                url_changed: moved,
            };
            let a = probe.clone().classify(OutcomePolicy::Optimistic);
            let b = probe.classify(OutcomePolicy::Strict);
            if success || error.is_some() || moved {
                prop_assert_eq!(a, b);
            } else {
                prop_assert_ne!(a, b);
            }
        }
    }
}
