//! Link discovery, breadcrumbs and a basic reachability check.
//!
//! [`BasePage::links`] snapshots the anchors of the current document and
//! [`BasePage::verify_links`] visits them one by one, sorting each into
//! working, broken (the target renders an error page) or errored (the
//! navigation itself failed).

use std::time::Duration;

use serde::Serialize;

use super::{recover, BasePage};
use crate::locator::{Locator, Selector};
use crate::result::{VitrineError, VitrineResult};
use crate::wait;

/// Links visited by one check unless the caller asks for more
pub const MAX_LINKS_CHECKED: usize = 10;

const ANCHORS: Locator = Locator::new("links", &[Selector::css("a[href]")]);
const NOT_FOUND_NOTICE: Locator = Locator::new(
    "not found notice",
    &[
        Selector::css(".not-found"),
        Selector::css(".template-404"),
        Selector::css(".error-404"),
    ],
);
const BREADCRUMB_STEPS: Locator = Locator::new(
    "breadcrumb steps",
    &[
        Selector::css(".breadcrumbs > *"),
        Selector::css(".breadcrumb li"),
        Selector::css("nav[aria-label='breadcrumb'] li"),
    ],
);
const BREADCRUMB_LINKS: Locator = Locator::new(
    "breadcrumb links",
    &[
        Selector::css(".breadcrumbs a"),
        Selector::css(".breadcrumb a"),
        Selector::css("nav[aria-label='breadcrumb'] a"),
    ],
);
const ERROR_TITLE_MARKERS: [&str; 3] = ["404", "not found", "error"];

/// An anchor of the current page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// Absolute target URL
    pub href: String,
    /// Trimmed link text, empty for image links
    pub text: String,
}

impl Link {
    /// Whether the target lives on the same origin as `base_url`
    #[must_use]
    pub fn is_internal(&self, base_url: &str) -> bool {
        origin(&self.href) == origin(base_url)
    }
}

/// A link whose navigation failed outright
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkError {
    pub href: String,
    pub message: String,
}

/// Outcome of [`BasePage::verify_links`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    /// Loaded a regular page
    pub working: Vec<String>,
    /// Loaded an error page
    pub broken: Vec<String>,
    /// Could not be loaded at all
    pub errors: Vec<LinkError>,
}

impl LinkReport {
    /// Links visited
    #[must_use]
    pub fn checked(&self) -> usize {
        self.working.len() + self.broken.len() + self.errors.len()
    }

    /// Nothing broken and nothing errored
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.broken.is_empty() && self.errors.is_empty()
    }
}

/// `scheme://host[:port]` of a URL, the whole string when it has no scheme
fn origin(url: &str) -> &str {
    let Some((_, rest)) = url.split_once("://") else {
        return url;
    };
    let host_len = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    &url[..url.len() - rest.len() + host_len]
}

/// Absolute URL of an `href`, `None` for anchors that do not load a page
fn resolve_href(base_url: &str, href: &str) -> Option<String> {
    let href = href.trim();
    let lower = href.to_ascii_lowercase();
    if href.is_empty()
        || href.starts_with('#')
        || ["mailto:", "tel:", "javascript:"].iter().any(|s| lower.starts_with(s))
    {
        return None;
    }
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Some(href.to_string());
    }
    if let Some(path) = href.strip_prefix('/') {
        return Some(format!("{}/{path}", origin(base_url)));
    }
    Some(format!("{}/{href}", base_url.trim_end_matches('/')))
}

impl BasePage<'_> {
    /// Anchors of the current document that load a page, in document order
    ///
    /// Snapshot only: no waiting. Fragment, `mailto:`, `tel:` and
    /// `javascript:` links are left out.
    pub fn links(&self) -> VitrineResult<Vec<Link>> {
        let session = self.session();
        let base_url = session.current_url()?;
        let mut links = Vec::new();
        for element in wait::resolve(session, &ANCHORS)? {
            let href = recover(session.attribute(&element, "href"), None, "link href")?;
            let Some(href) = href.and_then(|h| resolve_href(&base_url, &h)) else {
                continue;
            };
            let text = recover(session.text(&element), String::new(), "link text")?;
            links.push(Link {
                href,
                text: text.trim().to_string(),
            });
        }
        tracing::debug!(count = links.len(), "links collected");
        Ok(links)
    }

    /// Breadcrumb trail texts, empty when the page has none
    pub fn breadcrumbs(&self) -> VitrineResult<Vec<String>> {
        self.within(self.settings().timeouts().probe())
            .texts(&BREADCRUMB_STEPS)
    }

    /// Follow the breadcrumb labelled `label`
    pub fn click_breadcrumb(&self, label: &str) -> VitrineResult<bool> {
        if !self.click_by_text(&BREADCRUMB_LINKS, label)? {
            return Ok(false);
        }
        self.wait_for_page_load()
    }

    /// Error page heuristic: an error word in the title or a not-found notice
    ///
    /// Reads the current document without waiting.
    pub fn is_error_page(&self) -> VitrineResult<bool> {
        let title = self.title()?.to_lowercase();
        if ERROR_TITLE_MARKERS.iter().any(|m| title.contains(m)) {
            return Ok(true);
        }
        self.within(Duration::ZERO).is_present(&NOT_FOUND_NOTICE)
    }

    /// Visit at most `max_links` links, then return to the current page
    ///
    /// A failed navigation is recorded against its link; a dead session is
    /// still an error.
    pub fn verify_links(&self, links: &[Link], max_links: usize) -> VitrineResult<LinkReport> {
        let start = self.current_url()?;
        let mut report = LinkReport::default();
        for link in links.iter().take(max_links) {
            match self.navigate(&link.href) {
                Ok(()) if self.is_error_page()? => {
                    tracing::warn!(href = %link.href, "broken link");
                    report.broken.push(link.href.clone());
                }
                Ok(()) => report.working.push(link.href.clone()),
                Err(VitrineError::Navigation { message, .. }) => {
                    self.session().current_url()?;
                    tracing::error!(href = %link.href, %message, "link failed to load");
                    report.errors.push(LinkError {
                        href: link.href.clone(),
                        message,
                    });
                }
                Err(e) => return Err(e),
            }
        }
        self.navigate(&start)?;
        tracing::info!(
            working = report.working.len(),
            broken = report.broken.len(),
            errors = report.errors.len(),
            "links verified"
        );
        Ok(report)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::{Settings, Timeouts};
    use crate::fixture::{El, FixtureDocument, FixtureSession, FixtureSite};
    use crate::session::Session;

    fn site() -> FixtureSite {
        FixtureSite::new("https://shop.test")
            .static_page(
                "/",
                FixtureDocument::new("Shop").with(El::new("footer").children([
                    El::link("/pages/about-us", "About"),
                    El::link("/pages/gone", "Old page"),
                    El::link("https://facebook.com/shop", "Facebook"),
                    El::link("mailto:hello@shop.test", "Mail us"),
                    El::link("#top", "Back to top"),
                    El::link("", "Empty"),
                ])),
            )
            .static_page(
                "/pages/about-us",
                FixtureDocument::new("About us").with(El::div("breadcrumbs").children([
                    El::link("/", "Home"),
                    El::new("span").text("About us"),
                ])),
            )
    }

    fn settings() -> Settings {
        Settings::default()
            .with_base_url("https://shop.test/")
            .with_timeouts(Timeouts::uniform(60, 5))
    }

    #[test]
    fn test_origin_and_href_resolution() {
        assert_eq!(origin("https://shop.test/cart?x=1"), "https://shop.test");
        assert_eq!(origin("http://localhost:8080"), "http://localhost:8080");
        assert_eq!(
            resolve_href("https://shop.test/pages/a", "/cart").as_deref(),
            Some("https://shop.test/cart")
        );
        assert_eq!(
            resolve_href("https://shop.test/pages/", "faq").as_deref(),
            Some("https://shop.test/pages/faq")
        );
        assert_eq!(resolve_href("https://shop.test/", "MAILTO:x@y.z"), None);
        assert_eq!(resolve_href("https://shop.test/", "  "), None);
    }

    #[test]
    fn test_links_skip_non_page_anchors() {
        let s = FixtureSession::open(site(), (), "/");
        let cfg = settings();
        let page = BasePage::new(&s, &cfg);
        let links = page.links().unwrap();
        let hrefs: Vec<&str> = links.iter().map(|l| l.href.as_str()).collect();
        assert_eq!(
            hrefs,
            [
                "https://shop.test/pages/about-us",
                "https://shop.test/pages/gone",
                "https://facebook.com/shop"
            ]
        );
        assert_eq!(links[0].text, "About");
        assert!(links[0].is_internal(cfg.base_url()));
        assert!(!links[2].is_internal(cfg.base_url()));
    }

    #[test]
    fn test_verify_links_sorts_and_returns() {
        let s = FixtureSession::open(site(), (), "/");
        let cfg = settings();
        let page = BasePage::new(&s, &cfg);
        let internal: Vec<Link> = page
            .links()
            .unwrap()
            .into_iter()
            .filter(|l| l.is_internal(cfg.base_url()))
            .collect();
        let report = page.verify_links(&internal, MAX_LINKS_CHECKED).unwrap();
        assert_eq!(report.working, ["https://shop.test/pages/about-us"]);
        assert_eq!(report.broken, ["https://shop.test/pages/gone"]);
        assert!(!report.is_clean());
        assert_eq!(report.checked(), 2);
        assert_eq!(s.title().unwrap(), "Shop");
    }

    #[test]
    fn test_verify_links_respects_cap() {
        let s = FixtureSession::open(site(), (), "/");
        let cfg = settings();
        let page = BasePage::new(&s, &cfg);
        let links = page.links().unwrap();
        let report = page.verify_links(&links, 1).unwrap();
        assert_eq!(report.checked(), 1);
        assert!(report.is_clean());
    }

    #[test]
    fn test_breadcrumb_trail() {
        let s = FixtureSession::open(site(), (), "/pages/about-us");
        let cfg = settings();
        let page = BasePage::new(&s, &cfg);
        assert_eq!(page.breadcrumbs().unwrap(), ["Home", "About us"]);
        assert!(!page.click_breadcrumb("Shop").unwrap());
        assert!(page.click_breadcrumb("Home").unwrap());
        assert_eq!(s.title().unwrap(), "Shop");
        assert!(page.breadcrumbs().unwrap().is_empty());
    }

    #[test]
    fn test_error_page_detection() {
        let s = FixtureSession::open(site(), (), "/nowhere");
        let cfg = settings();
        let page = BasePage::new(&s, &cfg);
        assert!(page.is_error_page().unwrap());
        page.navigate("https://shop.test/pages/about-us").unwrap();
        assert!(!page.is_error_page().unwrap());
    }

    #[test]
    fn test_dead_session_is_not_a_link_error() {
        let s = FixtureSession::open(site(), (), "/");
        let cfg = settings();
        let page = BasePage::new(&s, &cfg);
        let links = page.links().unwrap();
        s.quit().unwrap();
        assert!(page.verify_links(&links, 3).unwrap_err().is_session_fatal());
    }
}
