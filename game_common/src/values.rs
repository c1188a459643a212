//! Per-object value tables.
//!
//! Scripts attach ad-hoc data to simulated objects by string key. The tables are separate
//! from the typed fields of the objects and never alias them.

use ahash::HashMap;

use crate::id::UniqueId;

/// Typed key-value side tables of a single object.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ValueMap {
    strings: HashMap<String, String>,
    numbers: HashMap<String, f64>,
    objects: HashMap<String, UniqueId>,
}

impl ValueMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.strings.get(key).map(String::as_str)
    }

    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.strings.insert(key.into(), value.into());
    }

    pub fn remove_string(&mut self, key: &str) -> Option<String> {
        self.strings.remove(key)
    }

    pub fn has_string(&self, key: &str) -> bool {
        self.strings.contains_key(key)
    }

    pub fn get_number(&self, key: &str) -> Option<f64> {
        self.numbers.get(key).copied()
    }

    pub fn set_number(&mut self, key: impl Into<String>, value: f64) {
        self.numbers.insert(key.into(), value);
    }

    pub fn remove_number(&mut self, key: &str) -> Option<f64> {
        self.numbers.remove(key)
    }

    pub fn has_number(&self, key: &str) -> bool {
        self.numbers.contains_key(key)
    }

    /// Returns the object referenced by `key`. The reference is not owning; the object may no
    /// longer exist.
    pub fn get_object(&self, key: &str) -> Option<UniqueId> {
        self.objects.get(key).copied()
    }

    pub fn set_object(&mut self, key: impl Into<String>, object: UniqueId) {
        self.objects.insert(key.into(), object);
    }

    pub fn remove_object(&mut self, key: &str) -> Option<UniqueId> {
        self.objects.remove(key)
    }

    pub fn has_object(&self, key: &str) -> bool {
        self.objects.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty() && self.numbers.is_empty() && self.objects.is_empty()
    }

    pub fn clear(&mut self) {
        self.strings.clear();
        self.numbers.clear();
        self.objects.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::ValueMap;
    use crate::id::UniqueId;

    #[test]
    fn value_kinds_are_separate() {
        let mut values = ValueMap::new();
        values.set_string("key", "text");
        values.set_number("key", 4.5);

        assert_eq!(values.get_string("key"), Some("text"));
        assert_eq!(values.get_number("key"), Some(4.5));
        assert!(!values.has_object("key"));

        assert_eq!(values.remove_number("key"), Some(4.5));
        assert!(values.has_string("key"));
        assert!(!values.has_number("key"));
    }

    #[test]
    fn object_references() {
        let mut values = ValueMap::new();
        let id = UniqueId::new();
        values.set_object("target", id);
        assert_eq!(values.get_object("target"), Some(id));

        values.clear();
        assert!(values.is_empty());
    }
}
