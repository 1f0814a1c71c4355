//! Entity key to page path lookups, e.g. the target of a list's
//! "Add New" entry. Tables are built explicitly and passed to whoever
//! navigates; there is no global registry.
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable(IndexMap<String, String>);

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, path: impl Into<String>) -> Self {
        self.insert(key, path);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, path: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), path.into())
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Path of the creation page for `key`: the entry registered as
    /// `<key>.new`, falling back to `<path>/new`.
    pub fn add_new_target(&self, key: &str) -> Option<String> {
        if let Some(path) = self.0.get(&format!("{key}.new")) {
            return Some(path.clone());
        }
        self.lookup(key)
            .map(|path| format!("{}/new", path.trim_end_matches('/')))
    }

    /// Reverse lookup: the key registered for `path`.
    pub fn key_for(&self, path: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(_, p)| p.as_str() == path)
            .map(|(k, _)| k.as_str())
    }

    /// Entries from `other` win over existing ones.
    pub fn merge(&mut self, other: RouteTable) {
        self.0.extend(other.0);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for RouteTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn lookups_and_overrides() {
        let mut routes: RouteTable = [
            ("bookings", "/bookings"),
            ("bookings.new", "/bookings/create"),
            ("vehicles", "/fleet/vehicles/"),
        ]
        .into_iter()
        .collect();

        assert_eq!(routes.lookup("bookings"), Some("/bookings"));
        assert_eq!(routes.lookup("invoices"), None);
        assert_eq!(routes.add_new_target("bookings").as_deref(), Some("/bookings/create"));
        assert_eq!(
            routes.add_new_target("vehicles").as_deref(),
            Some("/fleet/vehicles/new")
        );
        assert_eq!(routes.key_for("/bookings"), Some("bookings"));

        routes.merge(RouteTable::new().with("vehicles", "/vehicles"));
        assert_eq!(routes.lookup("vehicles"), Some("/vehicles"));
        assert_eq!(routes.len(), 3);
    }

    #[test]
    fn deserializes_from_a_map() {
        let routes: RouteTable =
            serde_json::from_str(r#"{"drivers":"/drivers","claims":"/claims"}"#).unwrap();
        let keys: Vec<_> = routes.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["drivers", "claims"]);
    }
}
