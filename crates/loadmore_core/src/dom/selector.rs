//! Selector subset used for element lookups.
//!
//! # Responsibility
//! - Parse compound selectors (`tag`, `#id`, `.class`) joined by descendant
//!   whitespace.
//! - Match one element against a parsed selector given its ancestor chain.
//!
//! # Invariants
//! - A parsed selector always holds at least one compound.
//! - Identifiers are validated at parse time; matching never fails.

use crate::dom::{DomError, DomResult};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{Display, Formatter};

static COMPOUND_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?P<tag>\*|[A-Za-z][A-Za-z0-9-]*)?(?P<parts>(?:[#.][A-Za-z_-][A-Za-z0-9_-]*)*)$")
        .expect("valid compound selector regex")
});
static PART_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([#.])([A-Za-z_-][A-Za-z0-9_-]*)").expect("valid selector part regex")
});

/// Read-only view of an element as seen by selector matching.
pub trait SelectorSubject {
    /// Lower-case tag name.
    fn tag_name(&self) -> &str;
    /// Value of the `id` attribute, if any.
    fn element_id(&self) -> Option<&str>;
    fn has_class(&self, class: &str) -> bool;
}

/// One compound selector such as `article.tease-card` or `#loadMore`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Compound {
    /// `None` for `*` or when no tag was given.
    pub tag: Option<String>,
    pub ids: Vec<String>,
    pub classes: Vec<String>,
}

impl Compound {
    fn matches<E: SelectorSubject + ?Sized>(&self, element: &E) -> bool {
        if let Some(tag) = &self.tag {
            if !element.tag_name().eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if !self
            .ids
            .iter()
            .all(|id| element.element_id() == Some(id.as_str()))
        {
            return false;
        }
        self.classes.iter().all(|class| element.has_class(class))
    }
}

/// Parsed descendant-chain selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    compounds: Vec<Compound>,
}

impl Selector {
    /// Parses selector text like `.news-container` or `main article.tease-card`.
    ///
    /// # Errors
    /// - `DomError::InvalidSelector` for blank input, unsupported combinators,
    ///   pseudo-classes, attribute selectors, or malformed identifiers.
    pub fn parse(source: &str) -> DomResult<Self> {
        let trimmed = source.trim();
        if trimmed.is_empty() {
            return Err(DomError::InvalidSelector(source.to_string()));
        }

        let compounds = trimmed
            .split_whitespace()
            .map(|token| parse_compound(token).ok_or_else(|| DomError::InvalidSelector(source.to_string())))
            .collect::<DomResult<Vec<_>>>()?;

        Ok(Self {
            source: trimmed.split_whitespace().collect::<Vec<_>>().join(" "),
            compounds,
        })
    }

    /// Normalized selector text.
    pub fn as_str(&self) -> &str {
        self.source.as_str()
    }

    pub fn compounds(&self) -> &[Compound] {
        &self.compounds
    }

    /// Returns whether `element` matches, with `ancestors` yielded nearest first.
    ///
    /// Descendant combinators are matched greedily from right to left, which
    /// is exact when every combinator is a descendant combinator.
    pub fn matches<'a, E, I>(&self, element: &E, ancestors: I) -> bool
    where
        E: SelectorSubject + ?Sized + 'a,
        I: IntoIterator<Item = &'a E>,
    {
        let Some((last, rest)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(element) {
            return false;
        }

        let mut pending = rest.iter().rev().peekable();
        for ancestor in ancestors {
            match pending.peek() {
                Some(compound) if compound.matches(ancestor) => {
                    pending.next();
                }
                Some(_) => {}
                None => break,
            }
        }
        pending.peek().is_none()
    }
}

impl Display for Selector {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for Selector {
    type Err = DomError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

fn parse_compound(token: &str) -> Option<Compound> {
    let captures = COMPOUND_RE.captures(token)?;
    let mut compound = Compound {
        tag: captures
            .name("tag")
            .map(|tag| tag.as_str())
            .filter(|tag| *tag != "*")
            .map(str::to_ascii_lowercase),
        ..Compound::default()
    };

    let parts = captures.name("parts").map_or("", |parts| parts.as_str());
    for part in PART_RE.captures_iter(parts) {
        let name = part[2].to_string();
        match &part[1] {
            "#" => compound.ids.push(name),
            _ => compound.classes.push(name),
        }
    }

    Some(compound)
}
