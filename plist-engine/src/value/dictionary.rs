/*!
 An insertion-ordered map from string keys to property list values.
*/

use indexmap::{map::IntoIter, IndexMap};

use crate::value::Value;

/// A dictionary that remembers the order keys were first inserted in
///
/// Encoders walk entries in this order, so the same tree always serializes to the same bytes.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    entries: IndexMap<String, Value>,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: IndexMap::with_capacity(capacity),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries.get_mut(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert a value, returning the previous value if the key already existed
    ///
    /// Replacing a value keeps the key in its original position.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.entries.insert(key.into(), value)
    }

    /// Iterate over the entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.values()
    }
}

/// Two dictionaries are equal when they hold equal entries in the same order
impl PartialEq for Dictionary {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl<K: Into<String>> FromIterator<(K, Value)> for Dictionary {
    fn from_iter<T: IntoIterator<Item = (K, Value)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value))
                .collect(),
        }
    }
}

impl IntoIterator for Dictionary {
    type Item = (String, Value);
    type IntoIter = IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use crate::value::{dictionary::Dictionary, Value};

    #[test]
    fn can_keep_insertion_order() {
        let dictionary: Dictionary = [
            ("zebra", Value::from(1)),
            ("apple", Value::from(2)),
            ("mango", Value::from(3)),
        ]
        .into_iter()
        .collect();

        let keys: Vec<&String> = dictionary.keys().collect();
        assert_eq!(keys, vec!["zebra", "apple", "mango"]);
    }

    #[test]
    fn can_replace_in_place() {
        let mut dictionary = Dictionary::new();
        dictionary.insert("a", Value::from(1));
        dictionary.insert("b", Value::from(2));
        let old = dictionary.insert("a", Value::from(3));

        assert_eq!(old, Some(Value::from(1)));
        assert_eq!(dictionary.len(), 2);
        assert_eq!(dictionary.keys().next().unwrap(), "a");
        assert_eq!(dictionary.get("a"), Some(&Value::from(3)));
    }

    #[test]
    fn cant_get_missing_key() {
        let dictionary = Dictionary::new();

        assert!(dictionary.get("missing").is_none());
        assert!(!dictionary.contains_key("missing"));
    }
}
