//! In-memory schema model consumed by the extraction pipeline

use std::collections::{BTreeMap, HashMap};

use super::{ObjectKind, QualifiedName};

/// Index of a top-level object within a [`SchemaModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId(usize);

/// One entry of a relationship: either a reference to another named element
/// or an element defined inline (columns, type specifiers, parameters).
#[derive(Debug, Clone, PartialEq)]
pub enum Reference {
    Named(QualifiedName),
    Inline(Box<ModelObject>),
}

impl Reference {
    /// The referenced name, if this is a named reference.
    pub fn name(&self) -> Option<&QualifiedName> {
        match self {
            Reference::Named(name) => Some(name),
            Reference::Inline(_) => None,
        }
    }

    /// The inline element, if this entry defines one.
    pub fn inline(&self) -> Option<&ModelObject> {
        match self {
            Reference::Named(_) => None,
            Reference::Inline(object) => Some(object),
        }
    }
}

/// An annotation attached to an element, e.g. `SysCommentsObjectAnnotation`.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    pub annotation_type: String,
    pub properties: BTreeMap<String, String>,
}

/// A model element: top-level objects carry children, inline elements never do.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelObject {
    pub name: QualifiedName,
    pub kind: ObjectKind,
    pub properties: BTreeMap<String, String>,
    pub relationships: BTreeMap<String, Vec<Reference>>,
    pub annotations: Vec<Annotation>,
    children: Vec<ObjectId>,
}

impl ModelObject {
    pub fn new(kind: ObjectKind, name: QualifiedName) -> Self {
        Self {
            name,
            kind,
            properties: BTreeMap::new(),
            relationships: BTreeMap::new(),
            annotations: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_property(mut self, name: &str, value: &str) -> Self {
        self.properties.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_reference(mut self, relationship: &str, target: QualifiedName) -> Self {
        self.relationships
            .entry(relationship.to_string())
            .or_default()
            .push(Reference::Named(target));
        self
    }

    pub fn with_inline(mut self, relationship: &str, element: ModelObject) -> Self {
        self.relationships
            .entry(relationship.to_string())
            .or_default()
            .push(Reference::Inline(Box::new(element)));
        self
    }

    pub fn with_annotation(mut self, annotation_type: &str, properties: &[(&str, &str)]) -> Self {
        self.annotations.push(Annotation {
            annotation_type: annotation_type.to_string(),
            properties: properties
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        });
        self
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    /// True when the property is present and spelled `True` (model.xml booleans).
    pub fn flag(&self, name: &str) -> bool {
        self.property(name)
            .is_some_and(|v| v.eq_ignore_ascii_case("true"))
    }

    pub fn relationship(&self, name: &str) -> &[Reference] {
        self.relationships
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The first named reference of a relationship.
    pub fn reference(&self, relationship: &str) -> Option<&QualifiedName> {
        self.relationship(relationship).iter().find_map(Reference::name)
    }

    pub fn annotation_property(&self, annotation_type: &str, property: &str) -> Option<&str> {
        self.annotations
            .iter()
            .filter(|a| a.annotation_type == annotation_type)
            .find_map(|a| a.properties.get(property))
            .map(String::as_str)
    }
}

/// The complete model: top-level objects in enumeration order plus their child links.
#[derive(Debug, Clone, Default)]
pub struct SchemaModel {
    objects: Vec<ModelObject>,
    by_name: HashMap<QualifiedName, ObjectId>,
}

impl SchemaModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a top-level object. The first object registered under a name wins name lookups.
    pub fn add_object(&mut self, object: ModelObject) -> ObjectId {
        let id = ObjectId(self.objects.len());
        if !object.name.is_empty() {
            self.by_name.entry(object.name.clone()).or_insert(id);
        }
        self.objects.push(object);
        id
    }

    /// Record `child` as a child of `parent`. Children are enumerated in insertion order.
    pub fn add_child(&mut self, parent: ObjectId, child: ObjectId) {
        if parent == child || child.0 >= self.objects.len() {
            return;
        }
        if let Some(p) = self.objects.get_mut(parent.0) {
            if !p.children.contains(&child) {
                p.children.push(child);
            }
        }
    }

    pub fn get(&self, id: ObjectId) -> Option<&ModelObject> {
        self.objects.get(id.0)
    }

    /// All user-defined objects in model enumeration order, children included.
    pub fn objects(&self) -> impl Iterator<Item = &ModelObject> {
        self.objects.iter()
    }

    /// Objects paired with their ids, in enumeration order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &ModelObject)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, object)| (ObjectId(i), object))
    }

    /// Children of an object in the order they were linked.
    pub fn children<'a>(&'a self, object: &'a ModelObject) -> impl Iterator<Item = &'a ModelObject> {
        object.children.iter().filter_map(|id| self.get(*id))
    }

    pub fn find(&self, name: &QualifiedName) -> Option<ObjectId> {
        self.by_name.get(name).copied()
    }

    pub fn find_object(&self, name: &QualifiedName) -> Option<&ModelObject> {
        self.find(name).and_then(|id| self.get(id))
    }

    /// Resolve a name to the closest registered object, walking outward through
    /// parent names. A column reference such as `[dbo].[Orders].[Id]` resolves to
    /// the `[dbo].[Orders]` table.
    pub fn resolve_owner(&self, name: &QualifiedName) -> Option<ObjectId> {
        let mut current = Some(name.clone());
        while let Some(candidate) = current {
            if let Some(id) = self.find(&candidate) {
                return Some(id);
            }
            current = candidate.parent();
        }
        None
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
