//! Key to node resolution.
//!
//! The projector and the merger both go through [`resolve`], so a key is
//! always read from and written to the same element.

use roxmltree::{Document, Node};

use crate::schema::{Category, KeyShape, SchemaRegistry, SettingKey};

/// Name of the document element.
pub const ROOT_ELEMENT: &str = "root";

const CAMERA: &str = "camera";
const ENTRY: &str = "entry";
const ENTRY_LABEL: &str = "label";
const ENTRY_VALUE: &str = "activeOption";

/// The `<root>` element, if the document has one.
pub fn root<'a, 'input>(doc: &'a Document<'input>) -> Option<Node<'a, 'input>> {
    let root = doc.root_element();
    root.has_tag_name(ROOT_ELEMENT).then_some(root)
}

/// First element child of `node` named `name`.
pub fn child_element<'a, 'input>(node: Node<'a, 'input>, name: &str) -> Option<Node<'a, 'input>> {
    node.children()
        .find(|child| child.is_element() && child.has_tag_name(name))
}

/// Node holding the fields of `category`.
pub fn anchor<'a, 'input>(doc: &'a Document<'input>, category: Category) -> Option<Node<'a, 'input>> {
    category
        .anchor_path()
        .iter()
        .try_fold(root(doc)?, |node, name| child_element(node, name))
}

/// Trimmed text of the first text child, or `""`.
pub fn value_text<'a>(node: Node<'a, '_>) -> &'a str {
    node.children()
        .find(|child| child.is_text())
        .and_then(|text| text.text())
        .map(str::trim)
        .unwrap_or("")
}

/// Resolve `key` to the element whose text holds its value.
///
/// Only keys registered under `category` resolve. Graphics keys prefer a
/// direct child of the anchor over an `<entry>` with a matching label.
pub fn resolve<'a, 'input>(
    doc: &'a Document<'input>,
    registry: &SchemaRegistry,
    category: Category,
    key: &str,
) -> Option<Node<'a, 'input>> {
    registry.rule_in(category, key)?;
    let anchor = anchor(doc, category)?;

    match category {
        Category::Sound | Category::Device => child_element(anchor, key),
        Category::Graphics => child_element(anchor, key).or_else(|| entry_value(anchor, key)),
        Category::Control => match SettingKey::from(key).shape() {
            KeyShape::Compound { mode, field } => camera_field(anchor, mode, field),
            KeyShape::Simple(_) => None,
        },
    }
}

/// `activeOption` of the first `<entry>` labelled `label` that has one.
pub(crate) fn entry_value<'a, 'input>(anchor: Node<'a, 'input>, label: &str) -> Option<Node<'a, 'input>> {
    anchor
        .children()
        .filter(|child| is_entry(*child) && entry_label(*child) == Some(label))
        .find_map(entry_option)
}

/// The `activeOption` element of an `<entry>`.
pub(crate) fn entry_option<'a, 'input>(entry: Node<'a, 'input>) -> Option<Node<'a, 'input>> {
    child_element(entry, ENTRY_VALUE)
}

/// Trimmed label of an `<entry>` element.
pub(crate) fn entry_label<'a>(entry: Node<'a, '_>) -> Option<&'a str> {
    child_element(entry, ENTRY_LABEL).map(value_text)
}

pub(crate) fn is_entry(node: Node<'_, '_>) -> bool {
    node.is_element() && node.has_tag_name(ENTRY)
}

/// First `<mode>/<camera>/<field>` path under the control anchor.
fn camera_field<'a, 'input>(
    anchor: Node<'a, 'input>,
    mode: &str,
    field: &str,
) -> Option<Node<'a, 'input>> {
    anchor
        .children()
        .filter(|child| child.is_element() && child.has_tag_name(mode))
        .flat_map(cameras)
        .find_map(|camera| child_element(camera, field))
}

/// Camera nodes of one control mode, in document order.
pub(crate) fn cameras<'a, 'input>(
    mode_node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    mode_node
        .children()
        .filter(|child| child.is_element() && child.has_tag_name(CAMERA))
}
