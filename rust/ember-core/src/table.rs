//! Global variable bindings keyed by interned name.

use std::collections::HashMap;

use crate::strings::StringId;
use crate::value::Value;

#[derive(Debug, Default)]
pub struct Globals {
    bindings: HashMap<StringId, Value>,
}

impl Globals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: StringId) -> Option<Value> {
        self.bindings.get(&name).copied()
    }

    /// Bind `name` to `value`, overwriting any previous binding.
    /// Returns `true` when `name` was not bound before.
    pub fn set(&mut self, name: StringId, value: Value) -> bool {
        self.bindings.insert(name, value).is_none()
    }

    /// Remove a binding. Returns `true` if one existed.
    pub fn delete(&mut self, name: StringId) -> bool {
        self.bindings.remove(&name).is_some()
    }

    pub fn contains(&self, name: StringId) -> bool {
        self.bindings.contains_key(&name)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StringId, Value)> + '_ {
        self.bindings.iter().map(|(k, v)| (*k, *v))
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}
