/*!
 * HTML document model.
 *
 * Thin wrapper around an html5ever `RcDom` plus the node helpers the
 * collector and the merger share:
 * - `selector`: ignore-selector parsing and matching
 * - `collector`: ordered text-unit collection from the content region
 * - `merger`: writing translations back and splicing into the target
 *
 * Node handles are reference counted and not thread safe, so documents stay
 * on the task that loaded them.
 */

use html5ever::interface::{Attribute, QualName};
use html5ever::serialize::{SerializeOpts, TraversalScope, serialize};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::tree_builder::create_element;
use html5ever::{LocalName, namespace_url, ns, parse_document};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::errors::DocumentError;

pub mod collector;
pub mod merger;
pub mod selector;

pub use collector::{Collector, TextUnit};
pub use merger::{MergeReport, Merger};
pub use selector::IgnoreSelectors;

/// A parsed HTML document
pub struct Document {
    /// File the document was loaded from, if any
    path: Option<PathBuf>,
    /// Parsed tree
    dom: RcDom,
}

impl Document {
    /// Parse a document from markup
    pub fn parse(html: &str) -> Self {
        let dom = parse_document(RcDom::default(), Default::default()).one(html);
        Self { path: None, dom }
    }

    /// Load and parse a document; invalid UTF-8 is replaced, not rejected
    pub fn load(path: &Path) -> Result<Self, DocumentError> {
        let bytes = fs::read(path).map_err(|e| DocumentError::io(path, e))?;
        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut bytes.as_slice())
            .map_err(|e| DocumentError::io(path, e))?;

        Ok(Self {
            path: Some(path.to_path_buf()),
            dom,
        })
    }

    /// File the document was loaded from
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Document node
    pub fn root(&self) -> &Handle {
        &self.dom.document
    }

    /// The `<html>` element
    pub fn html_element(&self) -> Option<Handle> {
        child_element(&self.dom.document, "html")
    }

    /// The `<body>` element
    pub fn body(&self) -> Option<Handle> {
        self.html_element().and_then(|html| child_element(&html, "body"))
    }

    /// First element, in document order, whose `id` equals `id`
    pub fn find_by_id(&self, id: &str) -> Option<Handle> {
        find_element(&self.dom.document, &|node: &Handle| get_node_attr(node, "id").as_deref() == Some(id))
    }

    /// Content region of the document, or an error naming the document
    pub fn content_region(&self, region_id: &str) -> Result<Handle, DocumentError> {
        self.find_by_id(region_id)
            .ok_or_else(|| DocumentError::MissingContentRegion {
                path: self.path.clone().unwrap_or_default(),
                region_id: region_id.to_string(),
            })
    }

    /// Create a detached html element owned by this document
    pub fn create_element(&self, tag: &str, attributes: &[(&str, &str)]) -> Handle {
        let attrs = attributes
            .iter()
            .map(|(name, value)| Attribute {
                name: QualName::new(None, ns!(), LocalName::from(*name)),
                value: StrTendril::from_slice(value),
            })
            .collect();

        create_element(&self.dom, QualName::new(None, ns!(html), LocalName::from(tag)), attrs)
    }

    /// Serialize the whole document
    pub fn to_html(&self) -> io::Result<String> {
        serialize_node(&self.dom.document, TraversalScope::ChildrenOnly(None))
    }

    /// Serialize the document to `path`, creating parent directories
    pub fn save(&self, path: &Path) -> Result<(), DocumentError> {
        let html = self.to_html().map_err(|e| DocumentError::io(path, e))?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DocumentError::io(parent, e))?;
        }

        fs::write(path, html).map_err(|e| DocumentError::io(path, e))
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document").field("path", &self.path).finish_non_exhaustive()
    }
}

/// Serialize a node, or only its children
pub fn serialize_node(node: &Handle, scope: TraversalScope) -> io::Result<String> {
    let mut buf: Vec<u8> = Vec::new();
    let serializable: SerializableHandle = node.clone().into();
    let opts = SerializeOpts {
        traversal_scope: scope,
        ..Default::default()
    };
    serialize(&mut buf, &serializable, opts)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Markup of a node's children
pub fn inner_html(node: &Handle) -> io::Result<String> {
    serialize_node(node, TraversalScope::ChildrenOnly(None))
}

/// Local name of an element
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// Attribute value of an element
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// Set an attribute, or remove it when `attr_value` is `None`
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<&str>) {
    let NodeData::Element { attrs, .. } = &node.data else {
        return;
    };

    let mut attrs = attrs.borrow_mut();
    match attr_value {
        Some(value) => {
            if let Some(attr) = attrs.iter_mut().find(|attr| &*attr.name.local == attr_name) {
                attr.value = StrTendril::from_slice(value);
            } else {
                attrs.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                    value: StrTendril::from_slice(value),
                });
            }
        },
        None => attrs.retain(|attr| &*attr.name.local != attr_name),
    }
}

/// Whitespace-separated tokens of the `class` attribute
pub fn class_list(node: &Handle) -> Vec<String> {
    get_node_attr(node, "class")
        .map(|classes| classes.split_whitespace().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Replace the `class` attribute; an empty list removes it
pub fn set_class_list(node: &Handle, classes: &[String]) {
    if classes.is_empty() {
        set_node_attr(node, "class", None);
    } else {
        set_node_attr(node, "class", Some(&classes.join(" ")));
    }
}

/// Parent of a node, leaving the node's parent link in place
pub fn parent_of(node: &Handle) -> Option<Handle> {
    let weak = node.parent.take();
    let parent = weak.as_ref().and_then(|w| w.upgrade());
    node.parent.set(weak);
    parent
}

/// Append `child` to `parent`, updating the child's parent link
pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// Remove every child of `parent`, returning them detached
pub fn take_children(parent: &Handle) -> Vec<Handle> {
    let children: Vec<Handle> = parent.children.borrow_mut().drain(..).collect();
    for child in &children {
        child.parent.set(None);
    }
    children
}

/// Concatenated text of a subtree
pub fn text_content(node: &Handle) -> String {
    let mut text = String::new();
    collect_text(node, &mut text);
    text
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}

/// First direct child element with the given name
pub fn child_element(parent: &Handle, tag: &str) -> Option<Handle> {
    parent
        .children
        .borrow()
        .iter()
        .find(|child| get_node_name(child) == Some(tag))
        .cloned()
}

/// First element in document order, the node itself included, matching `predicate`
pub fn find_element(node: &Handle, predicate: &dyn Fn(&Handle) -> bool) -> Option<Handle> {
    if matches!(node.data, NodeData::Element { .. }) && predicate(node) {
        return Some(node.clone());
    }

    for child in node.children.borrow().iter() {
        if let Some(found) = find_element(child, predicate) {
            return Some(found);
        }
    }

    None
}

/// Every element of a subtree in document order, the root included
pub fn descendant_elements(node: &Handle) -> Vec<Handle> {
    let mut elements = Vec::new();
    push_elements(node, &mut elements);
    elements
}

fn push_elements(node: &Handle, out: &mut Vec<Handle>) {
    if matches!(node.data, NodeData::Element { .. }) {
        out.push(node.clone());
    }
    for child in node.children.borrow().iter() {
        push_elements(child, out);
    }
}
