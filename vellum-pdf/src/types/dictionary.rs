use std::collections::BTreeMap;

use smol_str::SmolStr;

use crate::types::object::Object;

/// A PDF dictionary: name keys mapped to arbitrary object values.
///
/// Keys are stored unescaped and must be unique; a `BTreeMap` keeps the
/// serialization order deterministic.
///
/// # Examples
/// <<
///   /Type /Catalog
///   /Pages 2 0 R
/// >>
#[derive(Debug, Default, PartialEq, Clone)]
pub struct Dictionary {
    records: BTreeMap<SmolStr, Object>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry.
    pub fn set<K: Into<SmolStr>>(&mut self, key: K, value: Object) {
        let _ = self.records.insert(key.into(), value);
    }

    pub fn remove(&mut self, key: &str) -> Option<Object> {
        self.records.remove(key)
    }
}

impl<K: std::convert::Into<SmolStr>> From<Vec<(K, Object)>> for Dictionary {
    fn from(value: Vec<(K, Object)>) -> Self {
        let value = value.into_iter().map(|(key, val)| (key.into(), val));

        Self {
            records: BTreeMap::from_iter(value),
        }
    }
}

impl<K: std::convert::Into<SmolStr>, const N: usize> From<[(K, Object); N]> for Dictionary {
    fn from(value: [(K, Object); N]) -> Self {
        let value = value.map(|(key, val)| (key.into(), val));

        Self {
            records: BTreeMap::from(value),
        }
    }
}

impl std::ops::Deref for Dictionary {
    type Target = BTreeMap<SmolStr, Object>;

    fn deref(&self) -> &Self::Target {
        &self.records
    }
}
