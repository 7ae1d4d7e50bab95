//! Locator abstraction for element selection.
//!
//! A [`Locator`] is a named list of alternative [`Selector`]s. An element
//! matches the locator when it matches **any** alternative, so pages can
//! carry fallbacks for markup that varies between themes and releases.
//!
//! Locators are plain constants:
//!
//! ```
//! use vitrine::{Locator, Selector};
//!
//! const SUBMIT: Locator = Locator::new(
//!     "login submit button",
//!     &[Selector::css("button[type='submit']"), Selector::id("login-submit")],
//! );
//! assert_eq!(SUBMIT.alternatives().len(), 2);
//! ```

use std::borrow::Cow;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Strategy used to interpret a selector value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    /// CSS selector (e.g., "button.primary")
    Css,
    /// XPath expression
    XPath,
    /// Exact trimmed text content
    Text,
    /// Element id attribute
    Id,
}

impl Strategy {
    /// Short prefix used when displaying selectors
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::XPath => "xpath",
            Self::Text => "text",
            Self::Id => "id",
        }
    }
}

/// A single (strategy, value) pair
///
/// Selectors borrow their value, so constant locator tables carry no drop
/// glue and can be built in `const` items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Selector<'a> {
    strategy: Strategy,
    value: &'a str,
}

impl<'a> Selector<'a> {
    /// Selector with an explicit strategy
    #[must_use]
    pub const fn new(strategy: Strategy, value: &'a str) -> Self {
        Self { strategy, value }
    }

    /// CSS selector
    #[must_use]
    pub const fn css(value: &'a str) -> Self {
        Self::new(Strategy::Css, value)
    }

    /// XPath selector
    #[must_use]
    pub const fn xpath(value: &'a str) -> Self {
        Self::new(Strategy::XPath, value)
    }

    /// Text selector
    #[must_use]
    pub const fn text(value: &'a str) -> Self {
        Self::new(Strategy::Text, value)
    }

    /// Id selector
    #[must_use]
    pub const fn id(value: &'a str) -> Self {
        Self::new(Strategy::Id, value)
    }

    /// Selector strategy
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Selector value
    #[must_use]
    pub const fn value(&self) -> &'a str {
        self.value
    }

    /// JavaScript expression evaluating to an array of matching elements
    #[must_use]
    pub fn to_query(&self) -> String {
        let v = js_string(self.value);
        match self.strategy {
            Strategy::Css => format!("Array.from(document.querySelectorAll({v}))"),
            Strategy::XPath => format!(
                "(() => {{ const r = document.evaluate({v}, document, null, \
                 XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null); const out = []; \
                 for (let i = 0; i < r.snapshotLength; i++) {{ out.push(r.snapshotItem(i)); }} \
                 return out; }})()"
            ),
            Strategy::Text => format!(
                "Array.from(document.querySelectorAll('body *')).filter(el => \
                 el.textContent.trim() === {v} && \
                 !Array.from(el.children).some(c => c.textContent.trim() === {v}))"
            ),
            Strategy::Id => format!("[document.getElementById({v})].filter(Boolean)"),
        }
    }
}

impl fmt::Display for Selector<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy.prefix(), self.value)
    }
}

/// Quote a value as a JavaScript string literal
pub(crate) fn js_string(value: &str) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| String::from("\"\""))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Alternatives {
    Static(&'static [Selector<'static>]),
    Owned(Vec<(Strategy, String)>),
}

/// Named set of alternative selectors, matched with OR semantics
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    description: Cow<'static, str>,
    alternatives: Alternatives,
}

impl Locator {
    /// Constant locator
    #[must_use]
    pub const fn new(description: &'static str, alternatives: &'static [Selector<'static>]) -> Self {
        Self {
            description: Cow::Borrowed(description),
            alternatives: Alternatives::Static(alternatives),
        }
    }

    /// Locator built at runtime (e.g., a category link by its label)
    ///
    /// The selector values are copied, so they may borrow from temporaries.
    #[must_use]
    pub fn dynamic(description: impl Into<String>, alternatives: &[Selector<'_>]) -> Self {
        Self {
            description: Cow::Owned(description.into()),
            alternatives: Alternatives::Owned(
                alternatives
                    .iter()
                    .map(|s| (s.strategy, s.value.to_owned()))
                    .collect(),
            ),
        }
    }

    /// Single-selector locator described by its own selector text
    #[must_use]
    pub fn single(selector: Selector<'_>) -> Self {
        Self::dynamic(selector.to_string(), &[selector])
    }

    /// Human-readable name
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Alternatives, in priority order
    #[must_use]
    pub fn alternatives(&self) -> Cow<'_, [Selector<'_>]> {
        match &self.alternatives {
            Alternatives::Static(list) => Cow::Borrowed(*list),
            Alternatives::Owned(list) => Cow::Owned(
                list.iter()
                    .map(|(strategy, value)| Selector::new(*strategy, value))
                    .collect(),
            ),
        }
    }

    /// Append the alternatives of another locator
    #[must_use]
    pub fn or(self, other: &Self) -> Self {
        let mut alternatives = self.alternatives().into_owned();
        let other_alternatives = other.alternatives();
        alternatives.extend(other_alternatives.iter().copied());
        Self::dynamic(
            format!("{} or {}", self.description, other.description),
            &alternatives,
        )
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.description)?;
        for (i, alt) in self.alternatives().iter().enumerate() {
            if i > 0 {
                write!(f, " | ")?;
            }
            write!(f, "{alt}")?;
        }
        write!(f, "]")
    }
}
