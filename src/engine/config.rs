//! Engine configuration: exploration budgets and classification tables.
//!
//! All configuration is immutable value data passed into the engine by the
//! host. There are no global registries: two walks with different
//! classifiers can run side by side.

use std::collections::HashSet;

use crate::cfg::Symbol;

/// Immutable name tables identifying collection types and their members.
///
/// The engine does not resolve real type systems; it recognizes collections
/// and their size/mutator members by name, using tables supplied by the
/// host. The default tables cover the common collection vocabulary.
///
/// # Examples
///
/// ```rust
/// use pathscope::engine::CollectionClassifier;
///
/// let classifier = CollectionClassifier::default();
/// assert!(classifier.is_size_accessor("Count"));
/// assert!(classifier.is_adding_method("Add"));
///
/// let custom = classifier.with_collection_type("RingBuffer");
/// assert!(custom.is_collection_type("RingBuffer"));
/// ```
#[derive(Debug, Clone)]
pub struct CollectionClassifier {
    collection_types: HashSet<String>,
    size_accessors: HashSet<String>,
    adding_methods: HashSet<String>,
    removing_methods: HashSet<String>,
    clearing_methods: HashSet<String>,
    null_ambiguous_methods: HashSet<String>,
}

impl CollectionClassifier {
    /// Returns a classifier with empty tables.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            collection_types: HashSet::new(),
            size_accessors: HashSet::new(),
            adding_methods: HashSet::new(),
            removing_methods: HashSet::new(),
            clearing_methods: HashSet::new(),
            null_ambiguous_methods: HashSet::new(),
        }
    }

    /// Adds a known collection type name.
    #[must_use]
    pub fn with_collection_type(mut self, name: impl Into<String>) -> Self {
        self.collection_types.insert(name.into());
        self
    }

    /// Adds a size-like accessor name.
    #[must_use]
    pub fn with_size_accessor(mut self, name: impl Into<String>) -> Self {
        self.size_accessors.insert(name.into());
        self
    }

    /// Adds a method name whose call leaves the receiver non-empty.
    #[must_use]
    pub fn with_adding_method(mut self, name: impl Into<String>) -> Self {
        self.adding_methods.insert(name.into());
        self
    }

    /// Adds a method name whose call invalidates emptiness knowledge.
    #[must_use]
    pub fn with_removing_method(mut self, name: impl Into<String>) -> Self {
        self.removing_methods.insert(name.into());
        self
    }

    /// Adds a method name whose call leaves the receiver empty.
    #[must_use]
    pub fn with_clearing_method(mut self, name: impl Into<String>) -> Self {
        self.clearing_methods.insert(name.into());
        self
    }

    /// Adds a method name whose result may or may not be null.
    #[must_use]
    pub fn with_null_ambiguous_method(mut self, name: impl Into<String>) -> Self {
        self.null_ambiguous_methods.insert(name.into());
        self
    }

    /// Returns `true` if `name` is a known collection type.
    #[must_use]
    pub fn is_collection_type(&self, name: &str) -> bool {
        self.collection_types.contains(name)
    }

    /// Returns `true` if the symbol's declared type is a known collection.
    #[must_use]
    pub fn is_collection(&self, symbol: &Symbol) -> bool {
        symbol
            .type_name()
            .is_some_and(|name| self.is_collection_type(name))
    }

    /// Returns `true` if `name` reads a collection's element count.
    #[must_use]
    pub fn is_size_accessor(&self, name: &str) -> bool {
        self.size_accessors.contains(name)
    }

    /// Returns `true` if calling `name` guarantees a non-empty receiver.
    #[must_use]
    pub fn is_adding_method(&self, name: &str) -> bool {
        self.adding_methods.contains(name)
    }

    /// Returns `true` if calling `name` invalidates emptiness knowledge.
    #[must_use]
    pub fn is_removing_method(&self, name: &str) -> bool {
        self.removing_methods.contains(name)
    }

    /// Returns `true` if calling `name` guarantees an empty receiver.
    #[must_use]
    pub fn is_clearing_method(&self, name: &str) -> bool {
        self.clearing_methods.contains(name)
    }

    /// Returns `true` if `name` returns a possibly-null result, forking the
    /// state into both nullability outcomes.
    #[must_use]
    pub fn is_null_ambiguous_method(&self, name: &str) -> bool {
        self.null_ambiguous_methods.contains(name)
    }
}

impl Default for CollectionClassifier {
    /// The standard vocabulary of collection types and members.
    fn default() -> Self {
        let mut classifier = Self::empty();
        for name in [
            "Array",
            "ArrayList",
            "Collection",
            "Dictionary",
            "HashSet",
            "LinkedList",
            "List",
            "ObservableCollection",
            "Queue",
            "SortedDictionary",
            "SortedList",
            "SortedSet",
            "Stack",
        ] {
            classifier = classifier.with_collection_type(name);
        }
        for name in ["Count", "Length"] {
            classifier = classifier.with_size_accessor(name);
        }
        for name in ["Add", "AddRange", "Enqueue", "Insert", "InsertRange", "Push", "TryAdd"] {
            classifier = classifier.with_adding_method(name);
        }
        for name in [
            "Dequeue",
            "ExceptWith",
            "Pop",
            "Remove",
            "RemoveAll",
            "RemoveAt",
            "RemoveRange",
            "TryDequeue",
            "TryPop",
        ] {
            classifier = classifier.with_removing_method(name);
        }
        classifier = classifier.with_clearing_method("Clear");
        for name in [
            "ElementAtOrDefault",
            "Find",
            "FirstOrDefault",
            "GetValueOrDefault",
            "LastOrDefault",
            "SingleOrDefault",
        ] {
            classifier = classifier.with_null_ambiguous_method(name);
        }
        classifier
    }
}

/// Exploration budgets and classification tables for one engine instance.
///
/// Budgets are soft limits: exceeding one truncates further exploration and
/// yields partial results flagged as truncated, never an error.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    max_block_visits: u32,
    max_states_per_block: usize,
    max_steps: usize,
    classifier: CollectionClassifier,
}

impl EngineConfig {
    /// How often one path may re-enter the same block before the engine
    /// stops following it around a loop.
    #[must_use]
    pub const fn max_block_visits(&self) -> u32 {
        self.max_block_visits
    }

    /// Upper bound on distinct states tracked per block.
    #[must_use]
    pub const fn max_states_per_block(&self) -> usize {
        self.max_states_per_block
    }

    /// Global budget on operation-processing steps for one walk.
    #[must_use]
    pub const fn max_steps(&self) -> usize {
        self.max_steps
    }

    /// The classification tables in effect.
    #[must_use]
    pub const fn classifier(&self) -> &CollectionClassifier {
        &self.classifier
    }

    /// Replaces the per-path block revisit budget.
    #[must_use]
    pub const fn with_max_block_visits(mut self, visits: u32) -> Self {
        self.max_block_visits = visits;
        self
    }

    /// Replaces the per-block state cap.
    #[must_use]
    pub const fn with_max_states_per_block(mut self, states: usize) -> Self {
        self.max_states_per_block = states;
        self
    }

    /// Replaces the global step budget.
    #[must_use]
    pub const fn with_max_steps(mut self, steps: usize) -> Self {
        self.max_steps = steps;
        self
    }

    /// Replaces the classification tables.
    #[must_use]
    pub fn with_classifier(mut self, classifier: CollectionClassifier) -> Self {
        self.classifier = classifier;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            // Two passes over a loop body: one to discover the widened
            // intervals, one to propagate them.
            max_block_visits: 2,
            max_states_per_block: 128,
            max_steps: 20_000,
            classifier: CollectionClassifier::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cfg::{SymbolKind, TypeHint};

    #[test]
    fn test_default_tables() {
        let classifier = CollectionClassifier::default();
        assert!(classifier.is_collection_type("List"));
        assert!(classifier.is_size_accessor("Count"));
        assert!(classifier.is_size_accessor("Length"));
        assert!(classifier.is_adding_method("Push"));
        assert!(classifier.is_removing_method("Dequeue"));
        assert!(classifier.is_clearing_method("Clear"));
        assert!(classifier.is_null_ambiguous_method("FirstOrDefault"));
        assert!(!classifier.is_collection_type("String"));
    }

    #[test]
    fn test_symbol_classification_needs_type_name() {
        let classifier = CollectionClassifier::default();
        let list = Symbol::new("items", SymbolKind::Local, TypeHint::Reference)
            .with_type_name("List");
        let untyped = Symbol::new("thing", SymbolKind::Local, TypeHint::Reference);
        assert!(classifier.is_collection(&list));
        assert!(!classifier.is_collection(&untyped));
    }

    #[test]
    fn test_config_builders() {
        let config = EngineConfig::default()
            .with_max_block_visits(5)
            .with_max_states_per_block(16)
            .with_max_steps(100);
        assert_eq!(config.max_block_visits(), 5);
        assert_eq!(config.max_states_per_block(), 16);
        assert_eq!(config.max_steps(), 100);
    }
}
