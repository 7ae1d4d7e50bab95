//! Common operation vocabulary for page objects.
//!
//! Two flavours of every query:
//!
//! - **total** operations (`is_visible`, `click`, `text`, `find_all`, ...)
//!   turn timeouts and other recoverable lookup failures into `false`, an
//!   empty string or an empty list, and log them at `warn`;
//! - **partial** operations (`find`) fail with `ElementNotFound`.
//!
//! Both propagate session-fatal errors. Element handles never outlive a
//! single operation: every call re-resolves its locator.

use std::path::PathBuf;
use std::time::Duration;

use crate::config::{PageKind, Settings, WindowSize};
use crate::locator::Locator;
use crate::result::{VitrineError, VitrineResult};
use crate::session::{ElementRef, ReadyState, Session};
use crate::wait::{self, Condition, WaitOptions, Waiter};

/// Convert a recoverable failure into `fallback`, logging it
pub(crate) fn recover<T>(result: VitrineResult<T>, fallback: T, action: &str) -> VitrineResult<T> {
    match result {
        Ok(value) => Ok(value),
        Err(e) if e.is_recoverable() => {
            tracing::warn!(action, error = %e, "recovered");
            Ok(fallback)
        }
        Err(e) => Err(e),
    }
}

/// Session plus settings plus a default timeout
#[derive(Clone, Copy)]
pub struct BasePage<'s> {
    session: &'s dyn Session,
    settings: &'s Settings,
    timeout: Duration,
}

impl std::fmt::Debug for BasePage<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasePage")
            .field("base_url", &self.settings.base_url())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl<'s> BasePage<'s> {
    /// Bind to a session; default timeout is the explicit wait
    #[must_use]
    pub fn new(session: &'s dyn Session, settings: &'s Settings) -> Self {
        Self {
            session,
            settings,
            timeout: settings.timeouts().explicit(),
        }
    }

    /// Copy of this page using another default timeout
    #[must_use]
    pub const fn within(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Underlying session
    #[must_use]
    pub fn session(&self) -> &'s dyn Session {
        self.session
    }

    /// Suite settings
    #[must_use]
    pub const fn settings(&self) -> &'s Settings {
        self.settings
    }

    /// Default timeout of this page
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Waiter bound to this page's session and timeout
    #[must_use]
    pub fn waiter(&self) -> Waiter<'s> {
        let options = WaitOptions::from_timeouts(self.settings.timeouts())
            .with_timeout_duration(self.timeout);
        Waiter::new(self.session, options)
    }

    // =========================================================================
    // NAVIGATION
    // =========================================================================

    /// Load a URL and wait for the document to be ready
    ///
    /// A document that never reaches `complete` is logged, not an error.
    pub fn navigate(&self, url: &str) -> VitrineResult<()> {
        tracing::info!(url, "navigate");
        self.session.navigate(url).map_err(|e| match e {
            VitrineError::Session { message } => VitrineError::Navigation {
                url: url.to_string(),
                message,
            },
            other => other,
        })?;
        self.wait_for_page_load()?;
        Ok(())
    }

    /// Load the configured URL of a page
    pub fn open(&self, page: PageKind) -> VitrineResult<()> {
        self.navigate(&self.settings.url_for(page))
    }

    /// Wait for `document.readyState == "complete"` within the page-load budget
    pub fn wait_for_page_load(&self) -> VitrineResult<bool> {
        let session = self.session;
        let options = WaitOptions::from_timeouts(self.settings.timeouts())
            .with_timeout_duration(self.settings.timeouts().page_load());
        let loaded = wait::wait_until(
            || Ok(session.ready_state()? == ReadyState::Complete),
            "document ready",
            &options,
        );
        recover(loaded.map(|_| true), false, "wait for page load")
    }

    /// Current URL
    pub fn current_url(&self) -> VitrineResult<String> {
        self.session.current_url()
    }

    /// Whether the current URL contains `fragment`
    pub fn url_contains(&self, fragment: &str) -> VitrineResult<bool> {
        Ok(self.session.current_url()?.contains(fragment))
    }

    /// Document title
    pub fn title(&self) -> VitrineResult<String> {
        self.session.title()
    }

    /// Reload and wait for the document
    pub fn refresh(&self) -> VitrineResult<()> {
        self.session.refresh()?;
        self.wait_for_page_load().map(|_| ())
    }

    /// Go back and wait for the document
    pub fn back(&self) -> VitrineResult<()> {
        self.session.back()?;
        self.wait_for_page_load().map(|_| ())
    }

    /// Resize the viewport
    pub fn set_window_size(&self, size: WindowSize) -> VitrineResult<()> {
        tracing::info!(width = size.width, height = size.height, "resize window");
        self.session.set_window_size(size)
    }

    /// Current viewport size
    pub fn window_size(&self) -> VitrineResult<WindowSize> {
        self.session.window_size()
    }

    /// Back to the configured window size
    pub fn reset_window_size(&self) -> VitrineResult<()> {
        self.set_window_size(self.settings.window())
    }

    /// Wait until the URL differs from `from`
    pub fn wait_for_url_change(&self, from: &str) -> VitrineResult<bool> {
        let session = self.session;
        let predicate = move |_: &dyn Session| -> VitrineResult<bool> {
            Ok(session.current_url()? != from)
        };
        let changed = self.waiter().until(&Condition::Custom {
            description: format!("URL to leave {from}").into(),
            predicate: &predicate,
        });
        recover(changed.map(|_| true), false, "wait for URL change")
    }

    // =========================================================================
    // LOOKUP
    // =========================================================================

    /// Wait for presence and return the first match
    ///
    /// # Errors
    ///
    /// `ElementNotFound` on timeout.
    pub fn find(&self, locator: &Locator) -> VitrineResult<ElementRef> {
        let found = self.waiter().present(locator).map(|all| all.into_iter().next());
        match found {
            Ok(Some(element)) => Ok(element),
            Ok(None) | Err(VitrineError::Timeout { .. }) => Err(VitrineError::ElementNotFound {
                locator: locator.to_string(),
                timeout_ms: self.timeout.as_millis() as u64,
            }),
            Err(e) => Err(e),
        }
    }

    /// Wait for presence and return every match; empty on timeout
    pub fn find_all(&self, locator: &Locator) -> VitrineResult<Vec<ElementRef>> {
        recover(self.waiter().present(locator), Vec::new(), "find all")
    }

    /// Wait for presence and return the matches positional operations index
    /// into; see [`wait::resolve_indexed`]
    pub fn find_indexed(&self, locator: &Locator) -> VitrineResult<Vec<ElementRef>> {
        if self.find_all(locator)?.is_empty() {
            return Ok(Vec::new());
        }
        wait::resolve_indexed(self.session, locator)
    }

    /// Snapshot check, no waiting
    pub fn is_present(&self, locator: &Locator) -> VitrineResult<bool> {
        Ok(!wait::resolve(self.session, locator)?.is_empty())
    }

    /// Snapshot count, no waiting
    pub fn count(&self, locator: &Locator) -> VitrineResult<usize> {
        Ok(wait::resolve(self.session, locator)?.len())
    }

    /// Wait for visibility; `false` on timeout
    pub fn is_visible(&self, locator: &Locator) -> VitrineResult<bool> {
        recover(self.waiter().visible(locator).map(|_| true), false, "is visible")
    }

    /// Wait for the element to be absent or hidden; `false` on timeout
    pub fn wait_for_absent(&self, locator: &Locator) -> VitrineResult<bool> {
        recover(self.waiter().absent(locator).map(|_| true), false, "wait for absent")
    }

    // =========================================================================
    // INTERACTION
    // =========================================================================

    /// Wait for clickability and click; `false` when it never became clickable
    pub fn click(&self, locator: &Locator) -> VitrineResult<bool> {
        let clicked = self.waiter().clickable(locator).and_then(|element| {
            tracing::info!(target_element = %locator, "click");
            self.session.click(&element)
        });
        recover(clicked.map(|()| true), false, "click")
    }

    /// Wait for clickability, optionally clear, then type
    pub fn type_text(&self, locator: &Locator, text: &str, clear: bool) -> VitrineResult<bool> {
        let typed = self.waiter().clickable(locator).and_then(|element| {
            if clear {
                self.session.clear(&element)?;
            }
            tracing::debug!(target_element = %locator, "type");
            self.session.send_keys(&element, text)
        });
        recover(typed.map(|()| true), false, "type")
    }

    /// Submit the input with Enter
    pub fn press_enter(&self, locator: &Locator) -> VitrineResult<bool> {
        let pressed = self
            .waiter()
            .clickable(locator)
            .and_then(|element| self.session.send_keys(&element, "\n"));
        recover(pressed.map(|()| true), false, "press enter")
    }

    /// Choose a `<select>` option by its visible text
    pub fn select_by_text(&self, locator: &Locator, visible_text: &str) -> VitrineResult<bool> {
        let selected = self
            .waiter()
            .clickable(locator)
            .and_then(|element| self.session.select_option(&element, visible_text));
        recover(selected.map(|()| true), false, "select option")
    }

    /// Scroll the first match into view; failures are logged only
    pub fn scroll_into_view(&self, locator: &Locator) -> VitrineResult<()> {
        let scrolled = self
            .find(locator)
            .and_then(|element| self.session.scroll_into_view(&element));
        recover(scrolled, (), "scroll into view")
    }

    /// Hover the first visible match; failures are logged only
    pub fn hover(&self, locator: &Locator) -> VitrineResult<()> {
        let hovered = self
            .waiter()
            .visible(locator)
            .and_then(|element| self.session.hover(&element));
        recover(hovered, (), "hover")
    }

    /// Click the `index`-th match, resolved just before clicking
    ///
    /// The index counts matches of the first alternative that finds any.
    pub fn click_nth(&self, locator: &Locator, index: usize) -> VitrineResult<bool> {
        let Some(element) = self.find_indexed(locator)?.into_iter().nth(index) else {
            tracing::warn!(target_element = %locator, index, "no element at index");
            return Ok(false);
        };
        let clicked = self.session.element_state(&element).and_then(|state| {
            if state.is_clickable() {
                self.session.click(&element).map(|()| true)
            } else {
                Ok(false)
            }
        });
        recover(clicked, false, "click nth")
    }

    /// Click the first match whose trimmed text equals `label`
    pub fn click_by_text(&self, locator: &Locator, label: &str) -> VitrineResult<bool> {
        for element in self.find_all(locator)? {
            let text = recover(self.session.text(&element), String::new(), "click by text")?;
            if text.trim() == label.trim() {
                let clicked = self.session.click(&element).map(|()| true);
                return recover(clicked, false, "click by text");
            }
        }
        tracing::warn!(target_element = %locator, label, "no element with text");
        Ok(false)
    }

    // =========================================================================
    // READING
    // =========================================================================

    /// Trimmed text of the first match; empty on timeout
    pub fn text(&self, locator: &Locator) -> VitrineResult<String> {
        let text = self
            .find(locator)
            .and_then(|element| self.session.text(&element));
        recover(text.map(|t| t.trim().to_string()), String::new(), "text")
    }

    /// Trimmed text of the first visible match; empty when none shows up
    pub fn visible_text(&self, locator: &Locator) -> VitrineResult<String> {
        let text = self
            .waiter()
            .visible(locator)
            .and_then(|element| self.session.text(&element));
        recover(text.map(|t| t.trim().to_string()), String::new(), "visible text")
    }

    /// Trimmed text of the `index`-th match, resolved just before reading
    pub fn text_of_nth(&self, locator: &Locator, index: usize) -> VitrineResult<String> {
        let Some(element) = self.find_indexed(locator)?.into_iter().nth(index) else {
            return Ok(String::new());
        };
        recover(
            self.session.text(&element).map(|t| t.trim().to_string()),
            String::new(),
            "text of nth",
        )
    }

    /// Trimmed, non-empty texts of every match
    pub fn texts(&self, locator: &Locator) -> VitrineResult<Vec<String>> {
        let mut out = Vec::new();
        for element in self.find_all(locator)? {
            let text = recover(self.session.text(&element), String::new(), "texts")?;
            let text = text.trim();
            if !text.is_empty() {
                out.push(text.to_string());
            }
        }
        Ok(out)
    }

    /// Attribute of the first match; empty when absent or on timeout
    pub fn attribute(&self, locator: &Locator, name: &str) -> VitrineResult<String> {
        let value = self
            .find(locator)
            .and_then(|element| self.session.attribute(&element, name));
        recover(value.map(Option::unwrap_or_default), String::new(), "attribute")
    }

    /// Attribute of every match that carries it
    pub fn attributes(&self, locator: &Locator, name: &str) -> VitrineResult<Vec<String>> {
        let mut out = Vec::new();
        for element in self.find_all(locator)? {
            if let Some(value) = recover(self.session.attribute(&element, name), None, "attributes")? {
                out.push(value);
            }
        }
        Ok(out)
    }

    /// First descendant of `parent` matched by any alternative, no waiting
    pub fn find_within(&self, parent: &ElementRef, locator: &Locator) -> VitrineResult<Option<ElementRef>> {
        for selector in locator.alternatives().iter() {
            match self.session.find_elements_within(parent, selector) {
                Ok(found) if !found.is_empty() => return Ok(found.into_iter().next()),
                Ok(_) => {}
                Err(e) if e.is_recoverable() => return Ok(None),
                Err(e) => return Err(e),
            }
        }
        Ok(None)
    }

    /// Trimmed text of the first descendant match; empty when absent
    pub fn text_within(&self, parent: &ElementRef, locator: &Locator) -> VitrineResult<String> {
        let Some(element) = self.find_within(parent, locator)? else {
            return Ok(String::new());
        };
        recover(
            self.session.text(&element).map(|t| t.trim().to_string()),
            String::new(),
            "text within",
        )
    }

    /// Attribute of the first descendant match; empty when absent
    pub fn attribute_within(
        &self,
        parent: &ElementRef,
        locator: &Locator,
        name: &str,
    ) -> VitrineResult<String> {
        let Some(element) = self.find_within(parent, locator)? else {
            return Ok(String::new());
        };
        recover(
            self.session.attribute(&element, name).map(Option::unwrap_or_default),
            String::new(),
            "attribute within",
        )
    }

    /// Click the first clickable descendant match
    pub fn click_within(&self, parent: &ElementRef, locator: &Locator) -> VitrineResult<bool> {
        let Some(element) = self.find_within(parent, locator)? else {
            return Ok(false);
        };
        let clicked = self.session.element_state(&element).and_then(|state| {
            if state.is_clickable() {
                self.session.click(&element).map(|()| true)
            } else {
                Ok(false)
            }
        });
        recover(clicked, false, "click within")
    }

    /// Clear and type into the first descendant match
    pub fn type_within(&self, parent: &ElementRef, locator: &Locator, text: &str) -> VitrineResult<bool> {
        let Some(element) = self.find_within(parent, locator)? else {
            return Ok(false);
        };
        let typed = self
            .session
            .clear(&element)
            .and_then(|()| self.session.send_keys(&element, text));
        recover(typed.map(|()| true), false, "type within")
    }

    /// Checkbox state of the first match; `false` when absent
    pub fn is_checked(&self, locator: &Locator) -> VitrineResult<bool> {
        let checked = self.attribute(locator, "checked")?;
        Ok(matches!(checked.as_str(), "true" | "checked"))
    }

    /// Enabled state of the first match, without waiting
    pub fn is_enabled_now(&self, locator: &Locator) -> VitrineResult<Option<bool>> {
        let Some(element) = wait::resolve(self.session, locator)?.into_iter().next() else {
            return Ok(None);
        };
        recover(
            self.session.element_state(&element).map(|s| Some(s.enabled)),
            None,
            "is enabled",
        )
    }

    // =========================================================================
    // ARTIFACTS
    // =========================================================================

    /// Save a PNG to `<screenshots_dir>/<name>.png`
    pub fn take_screenshot(&self, name: &str) -> VitrineResult<PathBuf> {
        let png = self.session.screenshot()?;
        let dir = self.settings.screenshots_dir();
        std::fs::create_dir_all(dir)?;
        let file = if name.ends_with(".png") {
            name.to_string()
        } else {
            format!("{name}.png")
        };
        let path = dir.join(file);
        std::fs::write(&path, png)?;
        tracing::info!(path = %path.display(), "screenshot saved");
        Ok(path)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::Timeouts;
    use crate::fixture::{El, FixtureDocument, FixtureSession};
    use crate::locator::Selector;
    use std::time::Instant;

    const FIELD: Locator = Locator::new("email field", &[Selector::css("input#email")]);
    const LOCKED: Locator = Locator::new("locked button", &[Selector::css("button.locked")]);
    const ITEMS: Locator = Locator::new("items", &[Selector::css("li.item")]);
    const MISSING: Locator = Locator::new("missing", &[Selector::css(".missing")]);
    const BANNER: Locator = Locator::new(
        "banner",
        &[Selector::css(".alert-success"), Selector::xpath("//div[@role='status']")],
    );

    fn settings() -> Settings {
        Settings::default()
            .with_base_url("https://shop.test/")
            .with_timeouts(Timeouts::uniform(80, 10))
    }

    fn session() -> FixtureSession {
        FixtureSession::with_document(
            "https://shop.test/",
            FixtureDocument::new("Page")
                .with(El::input("email").id("email"))
                .with(El::button("Locked").class("locked").disabled())
                .with(El::new("div").attr("role", "status").text("  Saved!  "))
                .with(
                    El::new("ul").children([
                        El::new("li").class("item").text("One"),
                        El::new("li").class("item").text("Two"),
                        El::new("li").class("item").text("   "),
                    ]),
                ),
        )
    }

    mod lookup_tests {
        use super::*;

        #[test]
        fn test_find_required_raises() {
            let s = session();
            let cfg = settings();
            let page = BasePage::new(&s, &cfg);
            let err = page.find(&MISSING).unwrap_err();
            assert!(matches!(err, VitrineError::ElementNotFound { timeout_ms: 80, .. }));
        }

        #[test]
        fn test_find_all_empty_on_timeout() {
            let s = session();
            let cfg = settings();
            let page = BasePage::new(&s, &cfg);
            assert!(page.find_all(&MISSING).unwrap().is_empty());
            assert_eq!(page.find_all(&ITEMS).unwrap().len(), 3);
        }

        #[test]
        fn test_or_semantics_only_second_alternative_matches() {
            let s = session();
            let cfg = settings();
            let page = BasePage::new(&s, &cfg);
            assert!(page.is_present(&BANNER).unwrap());
            assert!(page.is_visible(&BANNER).unwrap());
            assert_eq!(page.text(&BANNER).unwrap(), "Saved!");
        }

        #[test]
        fn test_is_visible_idempotent() {
            let s = session();
            let cfg = settings();
            let page = BasePage::new(&s, &cfg);
            let first = page.is_visible(&MISSING).unwrap();
            let second = page.is_visible(&MISSING).unwrap();
            assert_eq!(first, second);
            assert_eq!(page.is_visible(&FIELD).unwrap(), page.is_visible(&FIELD).unwrap());
        }

        #[test]
        fn test_texts_skip_blank() {
            let s = session();
            let cfg = settings();
            let page = BasePage::new(&s, &cfg);
            assert_eq!(page.texts(&ITEMS).unwrap(), vec!["One", "Two"]);
            assert_eq!(page.text_of_nth(&ITEMS, 1).unwrap(), "Two");
            assert_eq!(page.text_of_nth(&ITEMS, 9).unwrap(), "");
        }
    }

    mod interaction_tests {
        use super::*;

        #[test]
        fn test_click_never_clickable_returns_false_within_budget() {
            let s = session();
            let cfg = settings();
            let page = BasePage::new(&s, &cfg);
            let start = Instant::now();
            assert!(!page.click(&LOCKED).unwrap());
            assert!(!page.type_text(&LOCKED, "x", true).unwrap());
            assert!(start.elapsed() < Duration::from_millis(1_000));
        }

        #[test]
        fn test_type_then_read_value() {
            let s = session();
            let cfg = settings();
            let page = BasePage::new(&s, &cfg);
            assert!(page.type_text(&FIELD, "a@b.co", true).unwrap());
            assert!(page.type_text(&FIELD, "x@y.co", true).unwrap());
            assert_eq!(page.attribute(&FIELD, "value").unwrap(), "x@y.co");
        }

        #[test]
        fn test_click_by_text_matches_trimmed_label() {
            let s = session();
            let cfg = settings();
            let page = BasePage::new(&s, &cfg);
            assert!(page.click_by_text(&ITEMS, "Two").unwrap());
            assert!(!page.click_by_text(&ITEMS, "Three").unwrap());
        }

        #[test]
        fn test_positional_ops_count_within_first_matching_alternative() {
            const REMOVE: Locator = Locator::new(
                "remove buttons",
                &[Selector::css("li button.remove"), Selector::css("a.remove")],
            );
            let s = FixtureSession::with_document(
                "https://shop.test/",
                FixtureDocument::new("Cart")
                    .with(El::new("a").class("remove").text("Clear saved items"))
                    .with(El::new("ul").children([
                        El::new("li").child(El::button("Remove shirt").class("remove")),
                        El::new("li").child(El::button("Remove shoes").class("remove")),
                    ])),
            );
            let cfg = settings();
            let page = BasePage::new(&s, &cfg);
            assert_eq!(page.find_indexed(&REMOVE).unwrap().len(), 2);
            assert_eq!(page.text_of_nth(&REMOVE, 0).unwrap(), "Remove shirt");
            assert_eq!(page.text_of_nth(&REMOVE, 1).unwrap(), "Remove shoes");
            assert_eq!(page.text_of_nth(&REMOVE, 2).unwrap(), "");
            assert!(!page.click_nth(&REMOVE, 2).unwrap());
            assert!(page.click_nth(&REMOVE, 1).unwrap());
            assert_eq!(page.count(&REMOVE).unwrap(), 3);
        }

        #[test]
        fn test_best_effort_ops_swallow_timeouts() {
            let s = session();
            let cfg = settings();
            let page = BasePage::new(&s, &cfg);
            page.scroll_into_view(&MISSING).unwrap();
            page.hover(&MISSING).unwrap();
            assert_eq!(page.text(&MISSING).unwrap(), "");
            assert_eq!(page.attribute(&MISSING, "href").unwrap(), "");
        }

        #[test]
        fn test_session_errors_propagate() {
            let s = session();
            let cfg = settings();
            let page = BasePage::new(&s, &cfg);
            s.quit().unwrap();
            assert!(page.is_visible(&FIELD).unwrap_err().is_session_fatal());
            assert!(page.click(&FIELD).unwrap_err().is_session_fatal());
        }
    }

    mod artifact_tests {
        use super::*;

        #[test]
        fn test_screenshot_written() {
            let dir = tempfile::tempdir().unwrap();
            let cfg = settings().with_output_dirs(dir.path().join("shots"), dir.path().join("rep"));
            let s = session();
            let page = BasePage::new(&s, &cfg);
            let path = page.take_screenshot("home").unwrap();
            assert!(path.ends_with("shots/home.png"));
            assert!(std::fs::read(&path).unwrap().starts_with(b"\x89PNG"));
        }
    }

    #[test]
    fn test_page_load_waits_for_ready_state() {
        let s = FixtureSession::with_document(
            "https://shop.test/",
            FixtureDocument::new("Slow").loading_for(Duration::from_millis(40)),
        );
        let cfg = settings().with_timeouts(Timeouts::uniform(500, 10));
        let page = BasePage::new(&s, &cfg);
        page.navigate("https://shop.test/").unwrap();
        assert_eq!(s.ready_state().unwrap(), ReadyState::Complete);
    }
}
