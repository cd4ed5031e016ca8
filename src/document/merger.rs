/*!
 * Writes translations into a document and splices them into the target.
 *
 * The source document is used as a working copy: translated strings replace
 * its text leaves, its internal links are re-pointed at the target locale,
 * and the children of its content region are then moved into the target
 * document's content region. Finally the target's locale markers are
 * updated.
 */

use html5ever::tendril::StrTendril;
use log::debug;
use markup5ever_rcdom::{Handle, NodeData};
use std::collections::BTreeSet;

use crate::errors::DocumentError;
use super::collector::TextUnit;
use super::{
    Document, append_child, class_list, descendant_elements, get_node_attr, set_class_list,
    set_node_attr, take_children,
};

/// Attribute that carries internal links
const LINK_ATTRIBUTE: &str = "href";

/// What a merge changed in the target document
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Text leaves rewritten
    pub units_written: usize,
    /// Link attributes re-pointed to the target locale
    pub links_rewritten: usize,
    /// The target had no content region and one was created
    pub region_created: bool,
}

/// Settings of one source-to-target merge
#[derive(Debug, Clone)]
pub struct Merger {
    /// Content region id
    pub region_id: String,
    /// Link prefix of the source locale, e.g. `/kor/`
    pub source_prefix: String,
    /// Link prefix of the target locale, e.g. `/chn/`
    pub target_prefix: String,
    /// Locale marker class of the target
    pub target_marker: String,
    /// Value for the root `lang` attribute
    pub target_lang: String,
    /// Every class that marks a locale; removed from the target root first
    pub known_markers: BTreeSet<String>,
}

impl Merger {
    /// Merge translated source content into `target`
    ///
    /// `units` must come from `source`'s content region and `translations`
    /// must be index-aligned with them. `source` is consumed as the working
    /// copy; the target is mutated in memory and not saved.
    pub fn merge(
        &self,
        source: Document,
        units: &[TextUnit],
        translations: &[String],
        target: &Document,
    ) -> Result<MergeReport, DocumentError> {
        let source_region = source.content_region(&self.region_id)?;

        let units_written = apply_translations(units, translations)?;
        let links_rewritten = rewrite_links(&source_region, &self.source_prefix, &self.target_prefix);
        let region_created = splice_region(&source_region, target, &self.region_id);
        update_locale_metadata(target, &self.known_markers, &self.target_marker, &self.target_lang);

        debug!(
            "Merged {} units into {:?} ({} links rewritten{})",
            units_written,
            target.path(),
            links_rewritten,
            if region_created { ", region created" } else { "" }
        );

        Ok(MergeReport {
            units_written,
            links_rewritten,
            region_created,
        })
    }
}

/// Write each translation into its unit's text leaf
///
/// The leaf keeps the leading and trailing whitespace of its original text.
pub fn apply_translations(units: &[TextUnit], translations: &[String]) -> Result<usize, DocumentError> {
    if units.len() != translations.len() {
        return Err(DocumentError::UnitCountMismatch {
            expected: units.len(),
            actual: translations.len(),
        });
    }

    for (unit, translation) in units.iter().zip(translations) {
        if let NodeData::Text { contents } = &unit.location.data {
            let text = with_original_padding(&unit.original, translation);
            *contents.borrow_mut() = StrTendril::from_slice(&text);
        }
    }

    Ok(units.len())
}

/// Surround a translation with the whitespace that framed the original
pub fn with_original_padding(original: &str, translation: &str) -> String {
    let core = original.trim();
    if core.is_empty() {
        return translation.to_string();
    }

    let leading = &original[..original.len() - original.trim_start().len()];
    let trailing = &original[original.trim_end().len()..];
    format!("{}{}{}", leading, translation.trim(), trailing)
}

/// Re-point links under `from_prefix` to `to_prefix`
///
/// Every `href` in the subtree, the root included, is checked. Values that do
/// not start with `from_prefix` are left alone. Returns the number rewritten.
pub fn rewrite_links(root: &Handle, from_prefix: &str, to_prefix: &str) -> usize {
    if from_prefix.is_empty() || from_prefix == to_prefix {
        return 0;
    }

    let mut rewritten = 0;
    for element in descendant_elements(root) {
        let Some(value) = get_node_attr(&element, LINK_ATTRIBUTE) else {
            continue;
        };

        if let Some(rest) = value.strip_prefix(from_prefix) {
            set_node_attr(&element, LINK_ATTRIBUTE, Some(&format!("{}{}", to_prefix, rest)));
            rewritten += 1;
        }
    }

    rewritten
}

/// Move the children of `source_region` into the target's content region
///
/// Existing target content is discarded. When the target has no content
/// region a `<div>` with the region id is appended to its body (or its root
/// element when there is no body). Returns whether a region was created.
pub fn splice_region(source_region: &Handle, target: &Document, region_id: &str) -> bool {
    let (target_region, created) = match target.find_by_id(region_id) {
        Some(region) => (region, false),
        None => {
            let region = target.create_element("div", &[("id", region_id)]);
            let container = target
                .body()
                .or_else(|| target.html_element())
                .unwrap_or_else(|| target.root().clone());
            append_child(&container, region.clone());
            (region, true)
        },
    };

    take_children(&target_region);
    for child in take_children(source_region) {
        append_child(&target_region, child);
    }

    created
}

/// Set the target's locale marker class and `lang` attribute on `<html>`
pub fn update_locale_metadata(target: &Document, known_markers: &BTreeSet<String>, marker: &str, lang: &str) {
    let Some(html) = target.html_element() else {
        return;
    };

    let mut classes: Vec<String> = class_list(&html)
        .into_iter()
        .filter(|class| !known_markers.contains(class))
        .collect();
    if !classes.iter().any(|class| class == marker) {
        classes.push(marker.to_string());
    }
    set_class_list(&html, &classes);
    set_node_attr(&html, "lang", Some(lang));
}
