//! Interned string heap.
//!
//! Every string object the VM ever sees is registered here exactly once per
//! distinct content, so a [`StringId`] comparison is a content comparison.
//! Objects are never freed individually; the whole heap is released by
//! [`Heap::clear`] or when it is dropped.

use std::collections::HashMap;

/// Handle to an interned string. Carries the heap generation it was issued
/// in, so handles from before a [`Heap::clear`] never alias new strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StringId {
    index: u32,
    generation: u32,
}

impl StringId {
    pub fn index(self) -> u32 {
        self.index
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

/// Immutable string object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjString {
    chars: Box<str>,
}

impl ObjString {
    pub fn as_str(&self) -> &str {
        &self.chars
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }
}

/// Arena of string objects plus the intern index that maps content to its
/// canonical handle.
#[derive(Debug, Default)]
pub struct Heap {
    strings: Vec<ObjString>,
    lookup: HashMap<Box<str>, StringId>,
    generation: u32,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the canonical handle for `s`, allocating it on first sight.
    pub fn intern(&mut self, s: &str) -> StringId {
        if let Some(&id) = self.lookup.get(s) {
            return id;
        }
        self.insert(s.to_owned())
    }

    /// Like [`Heap::intern`] but takes ownership of a freshly built buffer.
    pub fn intern_owned(&mut self, s: String) -> StringId {
        if let Some(&id) = self.lookup.get(s.as_str()) {
            return id;
        }
        self.insert(s)
    }

    fn insert(&mut self, chars: String) -> StringId {
        let id = StringId {
            index: self.strings.len() as u32,
            generation: self.generation,
        };
        self.strings.push(ObjString {
            chars: chars.clone().into_boxed_str(),
        });
        self.lookup.insert(chars.into_boxed_str(), id);
        id
    }

    /// `None` for handles from another generation or another heap's range.
    pub fn resolve(&self, id: StringId) -> Option<&ObjString> {
        if id.generation != self.generation {
            return None;
        }
        self.strings.get(id.index as usize)
    }

    /// Concatenate two interned strings and intern the result.
    /// Returns `None` if either handle does not belong to this heap.
    pub fn concat(&mut self, a: StringId, b: StringId) -> Option<StringId> {
        let left = self.resolve(a)?;
        let right = self.resolve(b)?;
        let mut joined = String::with_capacity(left.len() + right.len());
        joined.push_str(left.as_str());
        joined.push_str(right.as_str());
        Some(self.intern_owned(joined))
    }

    /// Number of live string objects.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Release every object and start a new generation. Handles issued
    /// before the call resolve to `None` from then on, even once new strings
    /// reuse their slots.
    pub fn clear(&mut self) {
        self.lookup.clear();
        self.strings.clear();
        self.generation = self.generation.wrapping_add(1);
    }
}
