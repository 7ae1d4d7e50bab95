//! Wait engine.
//!
//! Polls the session until a [`Condition`] holds or the timeout elapses.
//! The condition is always checked at least once, and the final sleep is
//! clipped to the remaining budget so a wait never overshoots its timeout
//! by more than one check.
//!
//! Only the "not yet found" error class (`NoSuchElement`, `StaleElement`)
//! is polled through; every other error from the session ends the wait
//! immediately.

use std::borrow::Cow;
use std::fmt;
use std::time::{Duration, Instant};

use crate::config::Timeouts;
use crate::locator::Locator;
use crate::result::{VitrineError, VitrineResult};
use crate::session::{ElementRef, ElementState, Session};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (20 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 20_000;

/// Default polling interval (250ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Explicit-wait budget and poll cadence from settings
    #[must_use]
    pub const fn from_timeouts(timeouts: &Timeouts) -> Self {
        Self {
            timeout_ms: timeouts.explicit_wait_ms,
            poll_interval_ms: timeouts.poll_interval_ms,
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set timeout from a `Duration`
    #[must_use]
    pub const fn with_timeout_duration(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// CONDITIONS
// =============================================================================

/// Predicate over the session for [`Condition::Custom`]
pub type SessionPredicate<'a> = dyn Fn(&dyn Session) -> VitrineResult<bool> + 'a;

/// What a wait is waiting for
pub enum Condition<'a> {
    /// At least one element exists, visible or not
    Presence(&'a Locator),
    /// An element is displayed with a non-zero box
    Visibility(&'a Locator),
    /// An element is visible and enabled
    Clickability(&'a Locator),
    /// No element exists, or none is displayed
    Absence(&'a Locator),
    /// Arbitrary predicate over the session
    Custom {
        /// Used in timeout errors and logs
        description: Cow<'a, str>,
        /// Polled until it returns `Ok(true)`
        predicate: &'a SessionPredicate<'a>,
    },
}

impl Condition<'_> {
    /// Human-readable description for errors and logs
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::Presence(l) => format!("presence of {l}"),
            Self::Visibility(l) => format!("visibility of {l}"),
            Self::Clickability(l) => format!("clickability of {l}"),
            Self::Absence(l) => format!("absence of {l}"),
            Self::Custom { description, .. } => description.to_string(),
        }
    }
}

impl fmt::Debug for Condition<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Condition").field(&self.description()).finish()
    }
}

// =============================================================================
// WAIT RESULT
// =============================================================================

/// Result of a successful wait
#[derive(Debug, Clone)]
pub struct WaitResult {
    /// Time spent waiting
    pub elapsed: Duration,
    /// Description of what was waited for
    pub waited_for: String,
    /// Matched elements: all of them for presence, the first qualifying one
    /// for visibility and clickability, none otherwise
    pub elements: Vec<ElementRef>,
}

impl WaitResult {
    /// First matched element, if any
    #[must_use]
    pub fn first(&self) -> Option<&ElementRef> {
        self.elements.first()
    }

    /// Consume into the first matched element
    #[must_use]
    pub fn into_first(self) -> Option<ElementRef> {
        self.elements.into_iter().next()
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

/// All elements matched by any alternative of the locator
///
/// Alternatives are tried in order; the union is deduplicated, keeping the
/// first occurrence. A lookup that reports "no such element" counts as an
/// empty match.
pub fn resolve(session: &dyn Session, locator: &Locator) -> VitrineResult<Vec<ElementRef>> {
    let mut out: Vec<ElementRef> = Vec::new();
    for selector in locator.alternatives().iter() {
        match session.find_elements(selector) {
            Ok(found) => {
                for element in found {
                    if !out.contains(&element) {
                        out.push(element);
                    }
                }
            }
            Err(e) if e.is_transient() => {}
            Err(e) => return Err(e),
        }
    }
    Ok(out)
}

/// Matches of the first alternative that finds anything
///
/// Positional operations index into this list, so an index always counts
/// elements of one selector in that selector's document order and never
/// spills over into a fallback alternative.
pub fn resolve_indexed(session: &dyn Session, locator: &Locator) -> VitrineResult<Vec<ElementRef>> {
    for selector in locator.alternatives().iter() {
        match session.find_elements(selector) {
            Ok(found) if !found.is_empty() => return Ok(found),
            Ok(_) => {}
            Err(e) if e.is_transient() => {}
            Err(e) => return Err(e),
        }
    }
    Ok(Vec::new())
}

/// State of an element, or `None` when it went stale under us
fn state_of(session: &dyn Session, element: &ElementRef) -> VitrineResult<Option<ElementState>> {
    match session.element_state(element) {
        Ok(state) => Ok(Some(state)),
        Err(e) if e.is_transient() => Ok(None),
        Err(e) => Err(e),
    }
}

fn first_where(
    session: &dyn Session,
    locator: &Locator,
    accept: fn(&ElementState) -> bool,
) -> VitrineResult<Option<Vec<ElementRef>>> {
    for element in resolve(session, locator)? {
        if state_of(session, &element)?.is_some_and(|s| accept(&s)) {
            return Ok(Some(vec![element]));
        }
    }
    Ok(None)
}

// =============================================================================
// WAITER
// =============================================================================

/// Waits on one session
#[derive(Clone, Copy)]
pub struct Waiter<'s> {
    session: &'s dyn Session,
    options: WaitOptions,
}

impl fmt::Debug for Waiter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Waiter")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<'s> Waiter<'s> {
    /// Create a waiter with the given options
    #[must_use]
    pub const fn new(session: &'s dyn Session, options: WaitOptions) -> Self {
        Self { session, options }
    }

    /// Same session, another timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.options = self.options.with_timeout_duration(timeout);
        self
    }

    /// Options in effect
    #[must_use]
    pub const fn options(&self) -> &WaitOptions {
        &self.options
    }

    /// Evaluate the condition once against the current document
    ///
    /// `Ok(None)` means "not yet"; transient lookup errors map to it.
    pub fn check(&self, condition: &Condition<'_>) -> VitrineResult<Option<Vec<ElementRef>>> {
        let session = self.session;
        let result = match condition {
            Condition::Presence(locator) => {
                let found = resolve(session, locator)?;
                Ok((!found.is_empty()).then_some(found))
            }
            Condition::Visibility(locator) => first_where(session, locator, ElementState::is_visible),
            Condition::Clickability(locator) => {
                first_where(session, locator, ElementState::is_clickable)
            }
            Condition::Absence(locator) => {
                let mut shown = false;
                for element in resolve(session, locator)? {
                    if state_of(session, &element)?.is_some_and(|s| s.displayed) {
                        shown = true;
                        break;
                    }
                }
                Ok((!shown).then(Vec::new))
            }
            Condition::Custom { predicate, .. } => {
                Ok(predicate(session)?.then(Vec::new))
            }
        };
        match result {
            Err(e) if e.is_transient() => Ok(None),
            other => other,
        }
    }

    /// Block until the condition holds or the timeout elapses
    ///
    /// # Errors
    ///
    /// `Timeout` when the budget runs out; any non-transient session error
    /// as soon as it occurs.
    pub fn until(&self, condition: &Condition<'_>) -> VitrineResult<WaitResult> {
        let waited_for = condition.description();
        let (elements, elapsed) = poll(&self.options, &waited_for, || self.check(condition))?;
        tracing::debug!(
            condition = %waited_for,
            elapsed_ms = elapsed.as_millis() as u64,
            "wait satisfied"
        );
        Ok(WaitResult {
            elapsed,
            waited_for,
            elements,
        })
    }

    /// Wait for presence; returns every match
    pub fn present(&self, locator: &Locator) -> VitrineResult<Vec<ElementRef>> {
        Ok(self.until(&Condition::Presence(locator))?.elements)
    }

    /// Wait for visibility; returns the first visible match
    pub fn visible(&self, locator: &Locator) -> VitrineResult<ElementRef> {
        self.single(&Condition::Visibility(locator))
    }

    /// Wait for clickability; returns the first clickable match
    pub fn clickable(&self, locator: &Locator) -> VitrineResult<ElementRef> {
        self.single(&Condition::Clickability(locator))
    }

    /// Wait for absence
    pub fn absent(&self, locator: &Locator) -> VitrineResult<()> {
        self.until(&Condition::Absence(locator)).map(|_| ())
    }

    fn single(&self, condition: &Condition<'_>) -> VitrineResult<ElementRef> {
        let waited_for = condition.description();
        self.until(condition)?
            .into_first()
            .ok_or(VitrineError::Timeout {
                ms: self.options.timeout_ms,
                waited_for,
            })
    }
}

// =============================================================================
// POLLING
// =============================================================================

/// Poll a predicate that does not need a session
///
/// Transient errors count as "not yet"; other errors end the wait.
pub fn wait_until<F>(mut predicate: F, waited_for: &str, options: &WaitOptions) -> VitrineResult<WaitResult>
where
    F: FnMut() -> VitrineResult<bool>,
{
    let (_, elapsed) = poll(options, waited_for, || match predicate() {
        Ok(true) => Ok(Some(())),
        Ok(false) => Ok(None),
        Err(e) if e.is_transient() => Ok(None),
        Err(e) => Err(e),
    })?;
    Ok(WaitResult {
        elapsed,
        waited_for: waited_for.to_string(),
        elements: Vec::new(),
    })
}

fn poll<T, F>(options: &WaitOptions, waited_for: &str, mut probe: F) -> VitrineResult<(T, Duration)>
where
    F: FnMut() -> VitrineResult<Option<T>>,
{
    let start = Instant::now();
    let timeout = options.timeout();
    let poll_interval = options.poll_interval().max(Duration::from_millis(1));
    loop {
        if let Some(value) = probe()? {
            return Ok((value, start.elapsed()));
        }
        let elapsed = start.elapsed();
        if elapsed >= timeout {
            tracing::debug!(condition = %waited_for, timeout_ms = options.timeout_ms, "wait timed out");
            return Err(VitrineError::Timeout {
                ms: options.timeout_ms,
                waited_for: waited_for.to_string(),
            });
        }
        std::thread::sleep(poll_interval.min(timeout - elapsed));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fixture::{El, FixtureDocument, FixtureSession};
    use crate::locator::Selector;
    use std::cell::Cell;

    const BANNER: Locator = Locator::new("banner", &[Selector::css(".banner")]);
    const SUBMIT: Locator = Locator::new("submit", &[Selector::css("button.submit")]);
    const NOTHING: Locator = Locator::new("nothing", &[Selector::css(".nothing-here")]);

    fn fast(timeout_ms: u64) -> WaitOptions {
        WaitOptions::new().with_timeout(timeout_ms).with_poll_interval(10)
    }

    fn session(doc: FixtureDocument) -> FixtureSession {
        FixtureSession::with_document("https://shop.test/", doc)
    }

    mod options_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let opts = WaitOptions::default();
            assert_eq!(opts.timeout(), Duration::from_secs(20));
            assert_eq!(opts.poll_interval(), Duration::from_millis(250));
        }

        #[test]
        fn test_from_timeouts() {
            let opts = WaitOptions::from_timeouts(&Timeouts::uniform(300, 15));
            assert_eq!(opts.timeout_ms, 300);
            assert_eq!(opts.poll_interval_ms, 15);
        }
    }

    mod condition_tests {
        use super::*;

        #[test]
        fn test_presence_ignores_visibility() {
            let s = session(FixtureDocument::new("t").with(El::div("banner").hidden()));
            let w = Waiter::new(&s, fast(50));
            assert_eq!(w.present(&BANNER).unwrap().len(), 1);
            assert!(w.visible(&BANNER).is_err());
        }

        #[test]
        fn test_clickability_needs_enabled() {
            let s = session(
                FixtureDocument::new("t").with(El::button("Go").class("submit").disabled()),
            );
            let w = Waiter::new(&s, fast(50));
            assert!(w.visible(&SUBMIT).is_ok());
            assert!(matches!(
                w.clickable(&SUBMIT).unwrap_err(),
                VitrineError::Timeout { ms: 50, .. }
            ));
        }

        #[test]
        fn test_absence_accepts_hidden() {
            let s = session(FixtureDocument::new("t").with(El::div("banner").hidden()));
            let w = Waiter::new(&s, fast(50));
            assert!(w.absent(&BANNER).is_ok());
            assert!(w.absent(&NOTHING).is_ok());
        }

        #[test]
        fn test_or_semantics_second_alternative() {
            const EITHER: Locator = Locator::new(
                "either",
                &[Selector::css("#missing"), Selector::css(".banner")],
            );
            let s = session(FixtureDocument::new("t").with(El::div("banner")));
            let w = Waiter::new(&s, fast(50));
            assert_eq!(w.present(&EITHER).unwrap().len(), 1);
        }

        #[test]
        fn test_union_is_deduplicated() {
            const TWICE: Locator = Locator::new(
                "twice",
                &[Selector::css(".banner"), Selector::css("div.banner")],
            );
            let s = session(FixtureDocument::new("t").with(El::div("banner")));
            assert_eq!(resolve(&s, &TWICE).unwrap().len(), 1);
        }

        #[test]
        fn test_custom_condition() {
            let s = session(FixtureDocument::new("Checkout"));
            let pred = |s: &dyn Session| -> VitrineResult<bool> { Ok(s.title()? == "Checkout") };
            let cond = Condition::Custom {
                description: "title is Checkout".into(),
                predicate: &pred,
            };
            let r = Waiter::new(&s, fast(50)).until(&cond).unwrap();
            assert_eq!(r.waited_for, "title is Checkout");
            assert!(r.elements.is_empty());
        }
    }

    mod timing_tests {
        use super::*;

        #[test]
        fn test_returns_soon_after_condition_holds() {
            let s = session(
                FixtureDocument::new("t")
                    .with(El::div("banner").appears_after(Duration::from_millis(60))),
            );
            let start = Instant::now();
            let el = Waiter::new(&s, fast(2_000)).visible(&BANNER);
            assert!(el.is_ok());
            let elapsed = start.elapsed();
            assert!(elapsed >= Duration::from_millis(60));
            assert!(elapsed < Duration::from_millis(1_000), "waited {elapsed:?}");
        }

        #[test]
        fn test_never_true_times_out_near_budget() {
            let s = session(FixtureDocument::new("t"));
            let start = Instant::now();
            let err = Waiter::new(&s, fast(120)).present(&NOTHING).unwrap_err();
            let elapsed = start.elapsed();
            assert!(matches!(err, VitrineError::Timeout { ms: 120, .. }));
            assert!(elapsed >= Duration::from_millis(120));
            assert!(elapsed < Duration::from_millis(600), "waited {elapsed:?}");
        }

        #[test]
        fn test_zero_timeout_checks_once() {
            let calls = Cell::new(0);
            let r = wait_until(
                || {
                    calls.set(calls.get() + 1);
                    Ok(false)
                },
                "never",
                &fast(0),
            );
            assert!(r.is_err());
            assert_eq!(calls.get(), 1);
        }
    }

    mod error_tests {
        use super::*;

        #[test]
        fn test_transient_errors_are_polled_through() {
            let calls = Cell::new(0);
            let r = wait_until(
                || {
                    calls.set(calls.get() + 1);
                    if calls.get() < 3 {
                        Err(VitrineError::NoSuchElement {
                            selector: "x".into(),
                        })
                    } else {
                        Ok(true)
                    }
                },
                "third time lucky",
                &fast(1_000),
            );
            assert!(r.is_ok());
            assert_eq!(calls.get(), 3);
        }

        #[test]
        fn test_session_errors_propagate_immediately() {
            let calls = Cell::new(0);
            let start = Instant::now();
            let err = wait_until(
                || {
                    calls.set(calls.get() + 1);
                    Err(VitrineError::session("browser crashed"))
                },
                "anything",
                &fast(5_000),
            )
            .unwrap_err();
            assert!(err.is_session_fatal());
            assert_eq!(calls.get(), 1);
            assert!(start.elapsed() < Duration::from_millis(500));
        }

        #[test]
        fn test_quit_session_is_fatal_for_waiter() {
            let s = session(FixtureDocument::new("t"));
            s.quit().unwrap();
            let err = Waiter::new(&s, fast(5_000)).present(&BANNER).unwrap_err();
            assert!(err.is_session_fatal());
        }
    }
}
