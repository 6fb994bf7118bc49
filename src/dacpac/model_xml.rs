//! model.xml → [`SchemaModel`]

use std::path::Path;

use anyhow::Result;
use roxmltree::{Document, Node};
use tracing::debug;

use crate::error::Dac2SqlError;
use crate::model::{Annotation, ModelObject, ObjectKind, QualifiedName, Reference, SchemaModel};

const NS: &str = "http://schemas.microsoft.com/sqlserver/dac/Serialization/2012/02";

/// Relationships that place an object beneath another one, checked in order.
const PARENT_RELATIONSHIPS: &[&str] = &["DefiningTable", "IndexedObject", "Parent", "Host"];

/// Parse a model.xml document. `source` is only used in error messages.
pub fn parse_model_xml(xml: &str, source: &Path) -> Result<SchemaModel> {
    let doc = Document::parse(xml).map_err(|e| Dac2SqlError::ModelParseError {
        path: source.to_path_buf(),
        source: e,
    })?;

    let root = doc.root_element();
    let model_node = if is_ns_element(&root, "Model") {
        Some(root)
    } else {
        find_child(&root, "Model")
    }
    .ok_or_else(|| Dac2SqlError::ModelElementMissing {
        path: source.to_path_buf(),
    })?;

    let mut model = SchemaModel::new();
    for node in find_children(&model_node, "Element") {
        let object = read_element(&node);
        // Unnamed constraints are kept as long as something owns them
        if object.name.is_empty() && parent_reference(&object).is_none() {
            debug!("Ignoring unnamed {} element", object.kind);
            continue;
        }
        model.add_object(object);
    }

    link_children(&mut model);
    Ok(model)
}

/// Attach every object to the closest registered object its parent relationship points at.
fn link_children(model: &mut SchemaModel) {
    let mut links = Vec::new();
    for (id, object) in model.iter() {
        let Some(target) = parent_reference(object) else {
            continue;
        };
        match model.resolve_owner(target) {
            Some(parent) => links.push((parent, id)),
            None => debug!("{} {} references unknown parent {}", object.kind, object.name, target),
        }
    }

    for (parent, child) in links {
        model.add_child(parent, child);
    }
}

fn parent_reference(object: &ModelObject) -> Option<&QualifiedName> {
    PARENT_RELATIONSHIPS
        .iter()
        .find_map(|relationship| object.reference(relationship))
}

fn read_element(node: &Node) -> ModelObject {
    let kind = ObjectKind::from_type_name(node.attribute("Type").unwrap_or_default());
    let name = node
        .attribute("Name")
        .map(QualifiedName::parse)
        .unwrap_or_default();
    let mut object = ModelObject::new(kind, name);

    for child in node.children().filter(|c| c.is_element()) {
        if child.tag_name().namespace() != Some(NS) {
            continue;
        }
        match child.tag_name().name() {
            "Property" => {
                if let Some((name, value)) = read_property(&child) {
                    object.properties.insert(name, value);
                }
            }
            "Relationship" => {
                let Some(name) = child.attribute("Name") else {
                    continue;
                };
                let entries = read_relationship(&child);
                object
                    .relationships
                    .entry(name.to_string())
                    .or_default()
                    .extend(entries);
            }
            "Annotation" | "AttachedAnnotation" => {
                object.annotations.push(Annotation {
                    annotation_type: child.attribute("Type").unwrap_or_default().to_string(),
                    properties: find_children(&child, "Property")
                        .iter()
                        .filter_map(read_property)
                        .collect(),
                });
            }
            _ => {}
        }
    }
    object
}

/// `<Property Name Value/>` or `<Property Name><Value>text</Value></Property>`.
fn read_property(node: &Node) -> Option<(String, String)> {
    let name = node.attribute("Name")?.to_string();
    let value = match node.attribute("Value") {
        Some(v) => v.to_string(),
        None => find_child(node, "Value")
            .map(|v| element_text(&v))
            .unwrap_or_default(),
    };
    Some((name, value))
}

fn read_relationship(node: &Node) -> Vec<Reference> {
    let mut entries = Vec::new();
    for entry in find_children(node, "Entry") {
        if let Some(refs) = find_child(&entry, "References") {
            if let Some(name) = refs.attribute("Name") {
                entries.push(Reference::Named(QualifiedName::parse(name)));
            }
        } else if let Some(inline) = find_child(&entry, "Element") {
            entries.push(Reference::Inline(Box::new(read_element(&inline))));
        }
    }
    entries
}

/// Concatenated text and CDATA content of an element.
fn element_text(node: &Node) -> String {
    node.children()
        .filter(|c| c.is_text())
        .filter_map(|c| c.text())
        .collect()
}

/// Check if a node is an element with the given local name in the DAC namespace.
fn is_ns_element(node: &Node, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local_name
        && node.tag_name().namespace() == Some(NS)
}

fn find_child<'a, 'input>(
    parent: &Node<'a, 'input>,
    local_name: &str,
) -> Option<Node<'a, 'input>> {
    parent.children().find(|c| is_ns_element(c, local_name))
}

fn find_children<'a, 'input>(
    parent: &Node<'a, 'input>,
    local_name: &str,
) -> Vec<Node<'a, 'input>> {
    parent
        .children()
        .filter(|c| is_ns_element(c, local_name))
        .collect()
}
