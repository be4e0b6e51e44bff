use hashbrown::HashMap as Map;

/// In-memory key-value map; the replicated state.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Store(Map<String, String>);

impl Store {
    pub fn get(&self, key: &str) -> Option<&String> {
        self.0.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Upserts, returning the previous value.
    pub fn insert(&mut self, key: String, value: String) -> Option<String> {
        self.0.insert(key, value)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn upsert_and_remove() {
        let mut store = Store::default();
        assert_eq!(store.insert("Age".into(), "30".into()), None);
        assert_eq!(store.insert("Age".into(), "31".into()), Some("30".into()));
        assert_eq!(store.get("Age").map(String::as_str), Some("31"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.remove("Age"), Some("31".into()));
        assert_eq!(store.remove("Age"), None);
        assert!(store.is_empty());
    }
}
