//! Minimal CSS selector matching for delegated event handling and lookups.
//!
//! Supported: type selectors, `#id`, `.class`, `[attr]`, `[attr="value"]`,
//! compounds of those, and the descendant combinator (whitespace).

use crate::dom::{Document, NodeId};
use crate::error::DocViewError;

#[derive(Debug, Clone, PartialEq, Eq)]
enum AttrTest {
    Present(String),
    Equals(String, String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrTest>,
}

impl Compound {
    fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let node = doc.node(id);
        if !node.is_element() {
            return false;
        }
        if let Some(tag) = &self.tag {
            if !node.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(want) = &self.id {
            if node.attr("id") != Some(want.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| node.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|t| match t {
            AttrTest::Present(name) => node.attr(name).is_some(),
            AttrTest::Equals(name, value) => node.attr(name) == Some(value.as_str()),
        })
    }
}

/// A parsed selector: compounds joined by descendant combinators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    source: String,
    compounds: Vec<Compound>,
}

impl Selector {
    pub fn parse(source: &str) -> Result<Self, DocViewError> {
        let compounds = source
            .split_ascii_whitespace()
            .map(|part| parse_compound(part).ok_or_else(|| DocViewError::InvalidSelector(source.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        if compounds.is_empty() {
            return Err(DocViewError::InvalidSelector(source.to_string()));
        }
        Ok(Self {
            source: source.to_string(),
            compounds,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Right-to-left match: the last compound must match `id`, the rest must
    /// match some chain of ancestors in order.
    pub fn matches(&self, doc: &Document, id: NodeId) -> bool {
        let Some((last, rest)) = self.compounds.split_last() else {
            return false;
        };
        if !last.matches(doc, id) {
            return false;
        }
        let mut cursor = doc.parent(id);
        for compound in rest.iter().rev() {
            loop {
                let Some(node) = cursor else {
                    return false;
                };
                cursor = doc.parent(node);
                if compound.matches(doc, node) {
                    break;
                }
            }
        }
        true
    }
}

impl std::fmt::Display for Selector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for Selector {
    type Err = DocViewError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn take_ident(chars: &[char], pos: &mut usize) -> Option<String> {
    let start = *pos;
    while *pos < chars.len() && is_ident_char(chars[*pos]) {
        *pos += 1;
    }
    if *pos == start {
        None
    } else {
        Some(chars[start..*pos].iter().collect())
    }
}

fn parse_compound(part: &str) -> Option<Compound> {
    let chars: Vec<char> = part.chars().collect();
    let mut pos = 0;
    let mut compound = Compound::default();

    if chars.first() == Some(&'*') {
        pos += 1;
    } else if chars.first().map(|c| is_ident_char(*c)).unwrap_or(false) {
        compound.tag = Some(take_ident(&chars, &mut pos)?.to_ascii_lowercase());
    }

    while pos < chars.len() {
        match chars[pos] {
            '#' => {
                pos += 1;
                compound.id = Some(take_ident(&chars, &mut pos)?);
            }
            '.' => {
                pos += 1;
                compound.classes.push(take_ident(&chars, &mut pos)?);
            }
            '[' => {
                pos += 1;
                let name = take_ident(&chars, &mut pos)?;
                match chars.get(pos)? {
                    ']' => {
                        pos += 1;
                        compound.attrs.push(AttrTest::Present(name));
                    }
                    '=' => {
                        pos += 1;
                        let value = take_attr_value(&chars, &mut pos)?;
                        if chars.get(pos) != Some(&']') {
                            return None;
                        }
                        pos += 1;
                        compound.attrs.push(AttrTest::Equals(name, value));
                    }
                    _ => return None,
                }
            }
            _ => return None,
        }
    }
    Some(compound)
}

fn take_attr_value(chars: &[char], pos: &mut usize) -> Option<String> {
    match chars.get(*pos)? {
        q @ ('"' | '\'') => {
            let quote = *q;
            *pos += 1;
            let start = *pos;
            while *pos < chars.len() && chars[*pos] != quote {
                *pos += 1;
            }
            if *pos >= chars.len() {
                return None;
            }
            let value = chars[start..*pos].iter().collect();
            *pos += 1;
            Some(value)
        }
        _ => take_ident(chars, pos),
    }
}
