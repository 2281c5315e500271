//! The persistent namespace shared by every evaluated snippet.

use std::collections::BTreeMap;

use crate::value::Value;

/// Mapping from identifier to value.
///
/// Created once and mutated in place by executed snippets for the life of
/// the process. The store itself is inert: it never evaluates anything and
/// is never reset between snippets. Holds `Rc`-backed values, so it is not
/// `Sync`; evaluation is strictly serialized.
#[derive(Debug, Default)]
pub struct Namespace {
    bindings: BTreeMap<String, Value>,
}

impl Namespace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.bindings.get(name)
    }

    /// Insert or overwrite a binding.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.bindings.insert(name.into(), value);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// All current bindings, in name order.
    pub fn bindings(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.bindings.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
