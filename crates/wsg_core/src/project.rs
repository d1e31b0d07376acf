//! Document to view projection.

use roxmltree::{Document, Node};

use crate::document::{DocumentResult, PreferencesDocument};
use crate::resolve::{anchor, cameras, entry_label, entry_option, is_entry, resolve, value_text};
use crate::schema::{Category, SchemaRegistry, SettingKey};
use crate::view::CategorizedSettings;

/// Project the registered settings of `document`.
///
/// Entries appear in document order. A node is emitted only if resolving
/// its key leads back to that same node, so each key appears once and is
/// bound to the element the merger will write.
pub fn project(
    document: &PreferencesDocument,
    registry: &SchemaRegistry,
) -> DocumentResult<CategorizedSettings> {
    let doc = document.tree()?;
    Ok(project_tree(&doc, registry))
}

pub(crate) fn project_tree(doc: &Document<'_>, registry: &SchemaRegistry) -> CategorizedSettings {
    let mut view = CategorizedSettings::new();

    for category in Category::ALL {
        let Some(section) = anchor(doc, category) else {
            tracing::debug!("No {} section in document", category);
            continue;
        };

        for (key, node) in candidates(section, category) {
            let bound = resolve(doc, registry, category, key.as_str());
            if bound.map(|resolved| resolved.id()) == Some(node.id()) {
                view.push(category, key, value_text(node));
            }
        }
    }

    tracing::debug!("Projected {} setting(s)", view.len());
    view
}

/// Every `(key, node)` pair a category could project, in document order.
fn candidates<'a, 'input>(
    anchor: Node<'a, 'input>,
    category: Category,
) -> Vec<(SettingKey, Node<'a, 'input>)> {
    let elements = anchor.children().filter(|child| child.is_element());

    match category {
        Category::Sound | Category::Device => elements
            .map(|node| (SettingKey::from(node.tag_name().name()), node))
            .collect(),
        Category::Graphics => elements
            .filter_map(|node| {
                if is_entry(node) {
                    let label = entry_label(node)?;
                    let value = entry_option(node)?;
                    Some((SettingKey::from(label), value))
                } else {
                    Some((SettingKey::from(node.tag_name().name()), node))
                }
            })
            .collect(),
        Category::Control => elements
            .flat_map(|mode| {
                let mode_name = mode.tag_name().name();
                cameras(mode).flat_map(move |camera| {
                    camera
                        .children()
                        .filter(|field| field.is_element())
                        .map(move |field| {
                            (SettingKey::compound(mode_name, field.tag_name().name()), field)
                        })
                })
            })
            .collect(),
    }
}
