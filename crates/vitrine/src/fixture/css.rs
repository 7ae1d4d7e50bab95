//! CSS selector subset for fixture documents.
//!
//! Supported: selector groups (`a, b`), descendant and child (`>`)
//! combinators, type and universal selectors, `#id`, `.class`, and
//! attribute selectors `[a]`, `[a=v]`, `[a~=v]`, `[a*=v]`, `[a^=v]`,
//! `[a$=v]`. Pseudo-classes are rejected.

use super::document::{FixtureDocument, NodeId};
use crate::result::{VitrineError, VitrineResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Word,
    Contains,
    Prefix,
    Suffix,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrSelector {
    name: String,
    op: AttrOp,
    value: String,
}

impl AttrSelector {
    fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Equals => actual == self.value,
            AttrOp::Word => actual.split_whitespace().any(|w| w == self.value),
            AttrOp::Contains => !self.value.is_empty() && actual.contains(&self.value),
            AttrOp::Prefix => !self.value.is_empty() && actual.starts_with(&self.value),
            AttrOp::Suffix => !self.value.is_empty() && actual.ends_with(&self.value),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    ids: Vec<String>,
    classes: Vec<String>,
    attrs: Vec<AttrSelector>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Combinator {
    Descendant,
    Child,
}

/// One complex selector, stored right to left
#[derive(Debug, Clone, PartialEq, Eq)]
struct Complex {
    subject: Compound,
    ancestors: Vec<(Combinator, Compound)>,
}

/// Parsed selector group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CssSelector {
    source: String,
    group: Vec<Complex>,
}

impl CssSelector {
    /// Parse a selector group
    pub fn parse(source: &str) -> VitrineResult<Self> {
        let mut group = Vec::new();
        for part in split_top_level(source) {
            group.push(Parser::new(source, part).complex()?);
        }
        if group.is_empty() {
            return Err(invalid(source, "empty selector"));
        }
        Ok(Self {
            source: source.to_string(),
            group,
        })
    }

    /// Original selector text
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Matching live nodes, in document order
    pub fn select<S>(&self, doc: &FixtureDocument<S>) -> Vec<NodeId> {
        doc.elements()
            .into_iter()
            .filter(|&n| self.group.iter().any(|c| matches_complex(doc, n, c)))
            .collect()
    }
}

fn invalid(selector: &str, message: &str) -> VitrineError {
    VitrineError::InvalidSelector {
        selector: selector.to_string(),
        message: message.to_string(),
    }
}

/// Split on commas that are not inside brackets or quotes
fn split_top_level(source: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in source.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(source[start..i].trim());
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(source[start..].trim());
    parts.into_iter().filter(|p| !p.is_empty()).collect()
}

struct Parser<'a> {
    full: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(full: &'a str, part: &str) -> Self {
        Self {
            full,
            chars: part.chars().collect(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek();
        self.pos += 1;
        c
    }

    fn skip_ws(&mut self) -> bool {
        let start = self.pos;
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
        self.pos > start
    }

    fn ident(&mut self) -> VitrineResult<String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            self.pos += 1;
        }
        if self.pos == start {
            return Err(invalid(self.full, "expected identifier"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn complex(mut self) -> VitrineResult<Complex> {
        let mut compounds = vec![self.compound()?];
        let mut combinators = Vec::new();
        loop {
            let had_ws = self.skip_ws();
            match self.peek() {
                None => break,
                Some('>') => {
                    self.bump();
                    self.skip_ws();
                    combinators.push(Combinator::Child);
                }
                Some(_) if had_ws => combinators.push(Combinator::Descendant),
                Some(c) => {
                    return Err(invalid(self.full, &format!("unexpected character {c:?}")));
                }
            }
            compounds.push(self.compound()?);
        }
        let subject = compounds.pop().unwrap_or_default();
        let ancestors = combinators
            .into_iter()
            .rev()
            .zip(compounds.into_iter().rev())
            .collect();
        Ok(Complex { subject, ancestors })
    }

    fn compound(&mut self) -> VitrineResult<Compound> {
        let mut compound = Compound::default();
        let mut empty = true;
        match self.peek() {
            Some('*') => {
                self.bump();
                empty = false;
            }
            Some(c) if c.is_alphabetic() => {
                compound.tag = Some(self.ident()?.to_ascii_lowercase());
                empty = false;
            }
            _ => {}
        }
        loop {
            match self.peek() {
                Some('#') => {
                    self.bump();
                    compound.ids.push(self.ident()?);
                }
                Some('.') => {
                    self.bump();
                    compound.classes.push(self.ident()?);
                }
                Some('[') => {
                    self.bump();
                    compound.attrs.push(self.attribute()?);
                }
                Some(':') => return Err(invalid(self.full, "pseudo-classes are not supported")),
                _ => break,
            }
            empty = false;
        }
        if empty {
            return Err(invalid(self.full, "expected a simple selector"));
        }
        Ok(compound)
    }

    fn attribute(&mut self) -> VitrineResult<AttrSelector> {
        self.skip_ws();
        let name = self.ident()?;
        self.skip_ws();
        let op = match self.bump() {
            Some(']') => {
                return Ok(AttrSelector {
                    name,
                    op: AttrOp::Exists,
                    value: String::new(),
                })
            }
            Some('=') => AttrOp::Equals,
            Some(c @ ('~' | '*' | '^' | '$')) => {
                if self.bump() != Some('=') {
                    return Err(invalid(self.full, "expected '=' in attribute selector"));
                }
                match c {
                    '~' => AttrOp::Word,
                    '*' => AttrOp::Contains,
                    '^' => AttrOp::Prefix,
                    _ => AttrOp::Suffix,
                }
            }
            _ => return Err(invalid(self.full, "malformed attribute selector")),
        };
        self.skip_ws();
        let value = match self.peek() {
            Some(q @ ('\'' | '"')) => {
                self.bump();
                let start = self.pos;
                while self.peek().is_some_and(|c| c != q) {
                    self.pos += 1;
                }
                let value: String = self.chars[start..self.pos].iter().collect();
                if self.bump() != Some(q) {
                    return Err(invalid(self.full, "unterminated string"));
                }
                value
            }
            _ => self.ident()?,
        };
        self.skip_ws();
        if self.bump() != Some(']') {
            return Err(invalid(self.full, "expected ']'"));
        }
        Ok(AttrSelector { name, op, value })
    }
}

fn matches_compound<S>(doc: &FixtureDocument<S>, node: NodeId, compound: &Compound) -> bool {
    let Some(n) = doc.node(node) else {
        return false;
    };
    compound.tag.as_deref().map_or(true, |t| n.tag() == t)
        && compound.ids.iter().all(|id| n.attr("id") == Some(id))
        && compound.classes.iter().all(|c| n.has_class(c))
        && compound.attrs.iter().all(|a| a.matches(n.attr(&a.name)))
}

fn matches_complex<S>(doc: &FixtureDocument<S>, node: NodeId, complex: &Complex) -> bool {
    matches_compound(doc, node, &complex.subject) && matches_ancestors(doc, node, &complex.ancestors)
}

fn matches_ancestors<S>(
    doc: &FixtureDocument<S>,
    node: NodeId,
    rest: &[(Combinator, Compound)],
) -> bool {
    let Some(((combinator, compound), tail)) = rest.split_first() else {
        return true;
    };
    let mut parent = doc.parent_of(node);
    match combinator {
        Combinator::Child => parent.is_some_and(|p| {
            matches_compound(doc, p, compound) && matches_ancestors(doc, p, tail)
        }),
        Combinator::Descendant => {
            while let Some(p) = parent {
                if matches_compound(doc, p, compound) && matches_ancestors(doc, p, tail) {
                    return true;
                }
                parent = doc.parent_of(p);
            }
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::fixture::document::El;
    use proptest::prelude::*;

    fn doc() -> FixtureDocument {
        FixtureDocument::new("t").with(
            El::new("form")
                .id("login")
                .class("customer-login")
                .child(El::input("email").id("email").attr("name", "customer[email]"))
                .child(El::input("password").attr("name", "customer[password]"))
                .child(
                    El::div("actions")
                        .child(El::button("Sign in").attr("type", "submit").class("btn primary")),
                ),
        )
    }

    fn count(selector: &str) -> usize {
        CssSelector::parse(selector).unwrap().select(&doc()).len()
    }

    mod parse_tests {
        use super::*;

        #[test]
        fn test_rejects_pseudo() {
            assert!(CssSelector::parse("a:hover").is_err());
        }

        #[test]
        fn test_rejects_empty() {
            assert!(CssSelector::parse("  ").is_err());
            assert!(CssSelector::parse(",").is_err());
        }

        #[test]
        fn test_rejects_unterminated_attr() {
            assert!(CssSelector::parse("input[type='email'").is_err());
        }

        #[test]
        fn test_group_split_ignores_commas_in_quotes() {
            let sel = CssSelector::parse("a[title='x, y'], b").unwrap();
            assert_eq!(sel.group.len(), 2);
        }
    }

    mod match_tests {
        use super::*;

        #[test]
        fn test_type_id_class() {
            assert_eq!(count("input"), 2);
            assert_eq!(count("#email"), 1);
            assert_eq!(count("form.customer-login"), 1);
            assert_eq!(count(".btn.primary"), 1);
            assert_eq!(count(".missing"), 0);
        }

        #[test]
        fn test_attribute_operators() {
            assert_eq!(count("input[type='email']"), 1);
            assert_eq!(count("input[type=\"password\"]"), 1);
            assert_eq!(count("[name*='email']"), 1);
            assert_eq!(count("[name^='customer']"), 2);
            assert_eq!(count("[name$='[password]']"), 1);
            assert_eq!(count("button[class~='primary']"), 1);
            assert_eq!(count("[type]"), 3);
        }

        #[test]
        fn test_combinators() {
            assert_eq!(count("form button"), 1);
            assert_eq!(count("form > button"), 0);
            assert_eq!(count("form > .actions > button"), 1);
            assert_eq!(count("#login input"), 2);
        }

        #[test]
        fn test_group_is_union_in_document_order() {
            let sel = CssSelector::parse("button, #email").unwrap();
            let d = doc();
            let found = sel.select(&d);
            assert_eq!(found.len(), 2);
            assert_eq!(d.node(found[0]).unwrap().tag(), "input");
        }

        #[test]
        fn test_universal() {
            assert_eq!(count(".actions > *"), 1);
        }
    }

    proptest! {
        #[test]
        fn prop_class_selector_finds_exactly_tagged(n in 0usize..8, class in "[a-z]{3,8}") {
            let mut d = FixtureDocument::<()>::new("p");
            for _ in 0..n {
                d = d.with(El::div(&class));
            }
            d = d.with(El::div("zzz-other"));
            let sel = CssSelector::parse(&format!(".{class}")).unwrap();
            let expected = if class == "zzz-other" { n + 1 } else { n };
            prop_assert_eq!(sel.select(&d).len(), expected);
        }
    }
}
