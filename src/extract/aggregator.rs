//! Single-pass grouping of model objects into output definitions

use std::collections::HashMap;

use tracing::debug;

use crate::model::{ModelObject, SchemaModel};
use crate::script::ScriptExtractor;

use super::{belongs_to_parent, DefinitionKey, SchemaDefinition};

/// Counters collected during aggregation, reported once the pass is done.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AggregationStats {
    /// Objects visited at the top level of the enumeration
    pub objects_visited: usize,
    /// Fragments appended to a group (own scripts and child scripts)
    pub fragments: usize,
    /// Extractions that failed and were skipped
    pub skipped: usize,
    /// Child-kind objects passed over at the top level
    pub deferred_children: usize,
}

/// Groups model objects into [`SchemaDefinition`]s.
///
/// Tables and views get one group per key, holding their own script followed by
/// the scripts of their child objects. Every other extractable object that is
/// not itself a child kind gets a single-fragment group of its own.
pub struct DefinitionAggregator<'e, E: ScriptExtractor + ?Sized> {
    extractor: &'e E,
    definitions: Vec<SchemaDefinition>,
    grouped: HashMap<DefinitionKey, usize>,
    stats: AggregationStats,
}

impl<'e, E: ScriptExtractor + ?Sized> DefinitionAggregator<'e, E> {
    pub fn new(extractor: &'e E) -> Self {
        Self {
            extractor,
            definitions: Vec::new(),
            grouped: HashMap::new(),
            stats: AggregationStats::default(),
        }
    }

    /// Aggregate every object of `model` in enumeration order.
    pub fn aggregate(mut self, model: &SchemaModel) -> (Vec<SchemaDefinition>, AggregationStats) {
        for object in model.objects() {
            self.add(model, object);
        }
        (self.definitions, self.stats)
    }

    /// Process one top-level object.
    pub fn add(&mut self, model: &SchemaModel, object: &ModelObject) {
        self.stats.objects_visited += 1;
        let key = DefinitionKey::for_object(object);

        if key.category.aggregates_children() {
            let slot = self.group_for(key);
            if let Some(script) = self.extract(object) {
                self.push_fragment(slot, script);
            }
            for child in model.children(object) {
                if !belongs_to_parent(child) {
                    continue;
                }
                if let Some(script) = self.extract(child) {
                    self.push_fragment(slot, script);
                }
            }
            return;
        }

        if belongs_to_parent(object) {
            self.stats.deferred_children += 1;
            return;
        }

        if let Some(script) = self.extract(object) {
            let mut definition = SchemaDefinition::new(key);
            definition.definitions.push(script);
            self.stats.fragments += 1;
            self.definitions.push(definition);
        }
    }

    /// Consume the aggregator, returning the groups in creation order.
    pub fn finish(self) -> Vec<SchemaDefinition> {
        self.definitions
    }

    pub fn stats(&self) -> AggregationStats {
        self.stats
    }

    fn group_for(&mut self, key: DefinitionKey) -> usize {
        if let Some(&slot) = self.grouped.get(&key) {
            return slot;
        }
        let slot = self.definitions.len();
        self.definitions.push(SchemaDefinition::new(key.clone()));
        self.grouped.insert(key, slot);
        slot
    }

    fn push_fragment(&mut self, slot: usize, script: String) {
        self.definitions[slot].definitions.push(script);
        self.stats.fragments += 1;
    }

    fn extract(&mut self, object: &ModelObject) -> Option<String> {
        match self.extractor.try_extract(object) {
            Ok(script) => Some(script),
            Err(e) => {
                debug!("Skipping {} - {}", object.name, e);
                self.stats.skipped += 1;
                None
            }
        }
    }
}
