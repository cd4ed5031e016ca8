use log::trace;
use markup5ever_rcdom::{Handle, NodeData};

use crate::translation::normalize::normalize;
use super::get_node_name;
use super::selector::IgnoreSelectors;

/// Elements whose content is never text for readers
const NON_TEXT_ELEMENTS: &[&str] = &["script", "style", "noscript", "template"];

/// One translatable text leaf of a content region
#[derive(Debug, Clone)]
pub struct TextUnit {
    /// The text node itself; translations are written back here
    pub location: Handle,
    /// Text exactly as found in the document
    pub original: String,
    /// Normalized text, never empty
    pub normalized: String,
}

/// Collects text units from a content region in a fixed order
///
/// Elements are visited depth-first in document order, the region itself
/// first. For each element its direct text children come before its child
/// elements. The index of a unit in the result is what ties it to its
/// translation, so this order must not change between collection and merge.
#[derive(Debug, Clone, Copy)]
pub struct Collector<'a> {
    ignore: &'a IgnoreSelectors,
}

impl<'a> Collector<'a> {
    /// Create a collector that skips elements matching `ignore`
    pub fn new(ignore: &'a IgnoreSelectors) -> Self {
        Self { ignore }
    }

    /// Collect the units of a region
    pub fn collect(&self, region: &Handle) -> Vec<TextUnit> {
        let mut units = Vec::new();
        self.visit(region, &mut units);
        units
    }

    fn is_excluded(&self, element: &Handle) -> bool {
        let Some(name) = get_node_name(element) else {
            return true;
        };

        if NON_TEXT_ELEMENTS.contains(&name) {
            return true;
        }

        if self.ignore.matches(element) {
            trace!("Skipping ignored <{}>", name);
            return true;
        }

        false
    }

    fn visit(&self, element: &Handle, units: &mut Vec<TextUnit>) {
        if self.is_excluded(element) {
            return;
        }

        let children = element.children.borrow();

        for child in children.iter() {
            if let NodeData::Text { contents } = &child.data {
                let original = contents.borrow().to_string();
                let normalized = normalize(&original);
                if !normalized.is_empty() {
                    units.push(TextUnit {
                        location: child.clone(),
                        original,
                        normalized,
                    });
                }
            }
        }

        for child in children.iter() {
            if matches!(child.data, NodeData::Element { .. }) {
                self.visit(child, units);
            }
        }
    }
}
