//! XPath subset for fixture documents.
//!
//! Location paths of `//` and `/` steps with a name test (`tag` or `*`) and
//! predicates built from `@attr`, `@attr='v'`, `text()='v'`, `.='v'`,
//! `normalize-space()='v'`, `contains(x, 'v')` and `starts-with(x, 'v')`,
//! combined with `and` / `or`.

use super::document::{FixtureDocument, NodeId, ROOT};
use crate::result::{VitrineError, VitrineResult};

/// Virtual document node above `<html>`
const DOCUMENT: NodeId = NodeId::MAX;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Child,
    Descendant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Operand {
    Attr(String),
    OwnText,
    StringValue,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pred {
    HasAttr(String),
    Equals(Operand, String),
    Contains(Operand, String),
    StartsWith(Operand, String),
    And(Box<Pred>, Box<Pred>),
    Or(Box<Pred>, Box<Pred>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    axis: Axis,
    name: Option<String>,
    predicates: Vec<Pred>,
}

/// Parsed XPath location path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XPath {
    source: String,
    steps: Vec<Step>,
}

impl XPath {
    /// Parse an expression
    pub fn parse(source: &str) -> VitrineResult<Self> {
        let mut parser = Parser {
            source,
            chars: source.trim().chars().collect(),
            pos: 0,
        };
        let steps = parser.path()?;
        Ok(Self {
            source: source.to_string(),
            steps,
        })
    }

    /// Matching live nodes, in document order
    pub fn select<S>(&self, doc: &FixtureDocument<S>) -> Vec<NodeId> {
        let mut context = vec![DOCUMENT];
        for step in &self.steps {
            let mut next: Vec<NodeId> = Vec::new();
            for &node in &context {
                let candidates = match (step.axis, node == DOCUMENT) {
                    (Axis::Child, true) => vec![ROOT],
                    (Axis::Descendant, true) => {
                        let mut all = vec![ROOT];
                        all.extend(descendants(doc, ROOT));
                        all
                    }
                    (Axis::Child, false) => doc.children_of(node),
                    (Axis::Descendant, false) => descendants(doc, node),
                };
                for c in candidates {
                    if step_matches(doc, c, step) && !next.contains(&c) {
                        next.push(c);
                    }
                }
            }
            context = next;
        }
        let order = doc.elements();
        let mut out: Vec<NodeId> = order.into_iter().filter(|n| context.contains(n)).collect();
        out.dedup();
        out
    }

    /// Original expression
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

fn descendants<S>(doc: &FixtureDocument<S>, node: NodeId) -> Vec<NodeId> {
    let mut out = Vec::new();
    let mut stack: Vec<NodeId> = doc.children_of(node).into_iter().rev().collect();
    while let Some(n) = stack.pop() {
        out.push(n);
        stack.extend(doc.children_of(n).into_iter().rev());
    }
    out
}

fn step_matches<S>(doc: &FixtureDocument<S>, node: NodeId, step: &Step) -> bool {
    let Some(n) = doc.node(node) else {
        return false;
    };
    step.name.as_deref().map_or(true, |name| n.tag() == name)
        && step.predicates.iter().all(|p| eval(doc, node, p))
}

fn operand_value<S>(doc: &FixtureDocument<S>, node: NodeId, operand: &Operand) -> Option<String> {
    match operand {
        Operand::Attr(name) => doc.attr_of(node, name),
        Operand::OwnText => doc.node(node).map(|n| n.text.clone()),
        Operand::StringValue => Some(
            doc.text_content(node)
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
        ),
    }
}

fn eval<S>(doc: &FixtureDocument<S>, node: NodeId, pred: &Pred) -> bool {
    match pred {
        Pred::HasAttr(name) => doc.attr_of(node, name).is_some(),
        Pred::Equals(op, v) => operand_value(doc, node, op).is_some_and(|a| &a == v),
        Pred::Contains(op, v) => operand_value(doc, node, op).is_some_and(|a| a.contains(v.as_str())),
        Pred::StartsWith(op, v) => {
            operand_value(doc, node, op).is_some_and(|a| a.starts_with(v.as_str()))
        }
        Pred::And(a, b) => eval(doc, node, a) && eval(doc, node, b),
        Pred::Or(a, b) => eval(doc, node, a) || eval(doc, node, b),
    }
}

struct Parser<'a> {
    source: &'a str,
    chars: Vec<char>,
    pos: usize,
}

impl Parser<'_> {
    fn err(&self, message: &str) -> VitrineError {
        VitrineError::InvalidSelector {
            selector: self.source.to_string(),
            message: format!("{message} at offset {}", self.pos),
        }
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn eat(&mut self, s: &str) -> bool {
        let expected: Vec<char> = s.chars().collect();
        if self.chars[self.pos..].starts_with(&expected) {
            self.pos += expected.len();
            true
        } else {
            false
        }
    }

    fn skip_ws(&mut self) {
        while self.peek().is_some_and(char::is_whitespace) {
            self.pos += 1;
        }
    }

    fn name(&mut self) -> VitrineResult<String> {
        let start = self.pos;
        while self
            .peek()
            .is_some_and(|c| c.is_alphanumeric() || c == '-' || c == '_')
        {
            self.pos += 1;
        }
        if start == self.pos {
            return Err(self.err("expected a name"));
        }
        Ok(self.chars[start..self.pos].iter().collect())
    }

    fn path(&mut self) -> VitrineResult<Vec<Step>> {
        let mut steps = Vec::new();
        while self.pos < self.chars.len() {
            let axis = if self.eat("//") {
                Axis::Descendant
            } else if self.eat("/") {
                Axis::Child
            } else {
                return Err(self.err("expected '/' or '//'"));
            };
            let name = if self.eat("*") {
                None
            } else {
                Some(self.name()?.to_ascii_lowercase())
            };
            let mut predicates = Vec::new();
            while self.eat("[") {
                self.skip_ws();
                predicates.push(self.or_expr()?);
                self.skip_ws();
                if !self.eat("]") {
                    return Err(self.err("expected ']'"));
                }
            }
            steps.push(Step {
                axis,
                name,
                predicates,
            });
        }
        if steps.is_empty() {
            return Err(self.err("empty expression"));
        }
        Ok(steps)
    }

    fn or_expr(&mut self) -> VitrineResult<Pred> {
        let mut left = self.and_expr()?;
        loop {
            self.skip_ws();
            if self.eat("or ") {
                self.skip_ws();
                let right = self.and_expr()?;
                left = Pred::Or(Box::new(left), Box::new(right));
            } else {
                return Ok(left);
            }
        }
    }

    fn and_expr(&mut self) -> VitrineResult<Pred> {
        let mut left = self.primary()?;
        loop {
            self.skip_ws();
            if self.eat("and ") {
                self.skip_ws();
                let right = self.primary()?;
                left = Pred::And(Box::new(left), Box::new(right));
            } else {
                return Ok(left);
            }
        }
    }

    fn primary(&mut self) -> VitrineResult<Pred> {
        self.skip_ws();
        if self.eat("contains(") {
            let (op, v) = self.call_args()?;
            return Ok(Pred::Contains(op, v));
        }
        if self.eat("starts-with(") {
            let (op, v) = self.call_args()?;
            return Ok(Pred::StartsWith(op, v));
        }
        if self.peek() == Some('@') {
            let op = self.operand()?;
            self.skip_ws();
            if self.eat("=") {
                self.skip_ws();
                let v = self.literal()?;
                return Ok(Pred::Equals(op, v));
            }
            return match op {
                Operand::Attr(name) => Ok(Pred::HasAttr(name)),
                _ => Err(self.err("expected '='")),
            };
        }
        let op = self.operand()?;
        self.skip_ws();
        if !self.eat("=") {
            return Err(self.err("expected '='"));
        }
        self.skip_ws();
        let v = self.literal()?;
        Ok(Pred::Equals(op, v))
    }

    fn call_args(&mut self) -> VitrineResult<(Operand, String)> {
        self.skip_ws();
        let op = self.operand()?;
        self.skip_ws();
        if !self.eat(",") {
            return Err(self.err("expected ','"));
        }
        self.skip_ws();
        let v = self.literal()?;
        self.skip_ws();
        if !self.eat(")") {
            return Err(self.err("expected ')'"));
        }
        Ok((op, v))
    }

    fn operand(&mut self) -> VitrineResult<Operand> {
        if self.eat("@") {
            return Ok(Operand::Attr(self.name()?));
        }
        if self.eat("text()") {
            return Ok(Operand::OwnText);
        }
        if self.eat("normalize-space()") || self.eat("normalize-space(.)") {
            return Ok(Operand::StringValue);
        }
        if self.eat("normalize-space(text())") {
            return Ok(Operand::OwnText);
        }
        if self.eat(".") {
            return Ok(Operand::StringValue);
        }
        Err(self.err("unsupported operand"))
    }

    fn literal(&mut self) -> VitrineResult<String> {
        let quote = match self.peek() {
            Some(q @ ('\'' | '"')) => q,
            _ => return Err(self.err("expected string literal")),
        };
        self.pos += 1;
        let start = self.pos;
        while self.peek().is_some_and(|c| c != quote) {
            self.pos += 1;
        }
        if self.peek() != Some(quote) {
            return Err(self.err("unterminated string literal"));
        }
        let value = self.chars[start..self.pos].iter().collect();
        self.pos += 1;
        Ok(value)
    }
}
