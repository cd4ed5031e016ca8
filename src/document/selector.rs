/*!
 * Ignore selectors.
 *
 * A small CSS selector subset, enough to name the parts of a page whose text
 * must never be collected: type (`nav`, `*`), id (`#menu`), class (`.skip`),
 * attribute presence and equality (`[data-notranslate]`, `[lang="en"]`),
 * compounds of those (`div.note#top`), descendant combinators (`footer a`)
 * and comma lists. Anything else is rejected when the selector is parsed.
 */

use markup5ever_rcdom::Handle;

use crate::errors::ConfigError;
use super::{class_list, get_node_attr, get_node_name, parent_of};

/// One simple condition of a compound selector
#[derive(Debug, Clone, PartialEq, Eq)]
enum Condition {
    Tag(String),
    Id(String),
    Class(String),
    HasAttr(String),
    AttrEquals(String, String),
}

/// Conditions that must all hold for a single element
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    conditions: Vec<Condition>,
}

impl Compound {
    fn matches(&self, node: &Handle) -> bool {
        let Some(tag) = get_node_name(node) else {
            return false;
        };

        self.conditions.iter().all(|condition| match condition {
            Condition::Tag(name) => tag.eq_ignore_ascii_case(name),
            Condition::Id(id) => get_node_attr(node, "id").as_deref() == Some(id.as_str()),
            Condition::Class(class) => class_list(node).iter().any(|c| c == class),
            Condition::HasAttr(attr) => get_node_attr(node, attr).is_some(),
            Condition::AttrEquals(attr, value) => get_node_attr(node, attr).as_deref() == Some(value.as_str()),
        })
    }
}

/// A chain of compounds joined by descendant combinators
#[derive(Debug, Clone, PartialEq, Eq)]
struct Selector {
    /// Outermost ancestor first, subject last
    compounds: Vec<Compound>,
}

impl Selector {
    fn matches(&self, node: &Handle) -> bool {
        let Some((subject, ancestors)) = self.compounds.split_last() else {
            return false;
        };

        if !subject.matches(node) {
            return false;
        }

        // Descendant-only chains can be matched greedily, nearest ancestor first
        let mut remaining = ancestors.iter().rev().peekable();
        let mut current = parent_of(node);
        while let Some(compound) = remaining.peek() {
            let Some(ancestor) = current else {
                return false;
            };
            if compound.matches(&ancestor) {
                remaining.next();
            }
            current = parent_of(&ancestor);
        }

        true
    }
}

/// Compiled ignore-selector list
#[derive(Debug, Clone, Default)]
pub struct IgnoreSelectors {
    selectors: Vec<Selector>,
}

impl IgnoreSelectors {
    /// Parse selector strings; each string may itself be a comma list
    pub fn parse(sources: &[String]) -> Result<Self, ConfigError> {
        let mut selectors = Vec::new();

        for source in sources {
            for part in source.split(',') {
                let part = part.trim();
                if part.is_empty() {
                    return Err(invalid(source, "empty selector"));
                }
                selectors.push(parse_selector(part).map_err(|reason| invalid(source, &reason))?);
            }
        }

        Ok(Self { selectors })
    }

    /// Whether any selector matches the element
    pub fn matches(&self, node: &Handle) -> bool {
        self.selectors.iter().any(|selector| selector.matches(node))
    }

    /// Number of selectors after comma lists are split
    pub fn len(&self) -> usize {
        self.selectors.len()
    }

    /// Check if there are no selectors
    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }
}

fn invalid(selector: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidSelector {
        selector: selector.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_selector(source: &str) -> Result<Selector, String> {
    let compounds = source
        .split_whitespace()
        .map(parse_compound)
        .collect::<Result<Vec<_>, _>>()?;

    if compounds.is_empty() {
        return Err("empty selector".to_string());
    }

    Ok(Selector { compounds })
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}

fn parse_compound(source: &str) -> Result<Compound, String> {
    let chars: Vec<char> = source.chars().collect();
    let mut pos = 0;
    let mut compound = Compound::default();

    let read_ident = |pos: &mut usize| -> String {
        let start = *pos;
        while *pos < chars.len() && is_ident_char(chars[*pos]) {
            *pos += 1;
        }
        chars[start..*pos].iter().collect()
    };

    if pos < chars.len() && chars[pos] == '*' {
        pos += 1;
    } else if pos < chars.len() && is_ident_char(chars[pos]) {
        compound.conditions.push(Condition::Tag(read_ident(&mut pos).to_ascii_lowercase()));
    }

    while pos < chars.len() {
        let marker = chars[pos];
        pos += 1;

        match marker {
            '#' | '.' => {
                let ident = read_ident(&mut pos);
                if ident.is_empty() {
                    return Err(format!("expected a name after '{}'", marker));
                }
                compound.conditions.push(if marker == '#' {
                    Condition::Id(ident)
                } else {
                    Condition::Class(ident)
                });
            },
            '[' => {
                let close = chars[pos..]
                    .iter()
                    .position(|&c| c == ']')
                    .ok_or_else(|| "unterminated attribute selector".to_string())?;
                let inner: String = chars[pos..pos + close].iter().collect();
                pos += close + 1;
                compound.conditions.push(parse_attribute(&inner)?);
            },
            '>' | '+' | '~' => return Err(format!("combinator '{}' is not supported", marker)),
            ':' => return Err("pseudo-classes are not supported".to_string()),
            other => return Err(format!("unexpected character '{}'", other)),
        }
    }

    if compound.conditions.is_empty() && source != "*" {
        return Err("empty selector".to_string());
    }

    Ok(compound)
}

fn parse_attribute(inner: &str) -> Result<Condition, String> {
    match inner.split_once('=') {
        None => {
            let name = inner.trim();
            if name.is_empty() || !name.chars().all(is_ident_char) {
                return Err(format!("invalid attribute name '{}'", name));
            }
            Ok(Condition::HasAttr(name.to_ascii_lowercase()))
        },
        Some((name, value)) => {
            let name = name.trim();
            if name.is_empty() || !name.chars().all(is_ident_char) {
                return Err(format!("invalid attribute name '{}'", name));
            }
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            Ok(Condition::AttrEquals(name.to_ascii_lowercase(), value.to_string()))
        },
    }
}
