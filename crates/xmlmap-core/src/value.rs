//! Output model: ordered maps, leaf strings, and lists of repeated siblings.

use indexmap::IndexMap;
use serde::{Serialize, Serializer};

/// Insertion-ordered map of keys to converted values.
pub type Map = IndexMap<String, Value>;

/// Converted form of one XML element, or of a group of same-named siblings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Leaf element carrying only text.
    Text(String),
    /// Element with attributes and/or child elements.
    Map(Map),
    /// Same-named siblings in document order.
    List(Vec<Value>),
}

impl Value {
    pub fn is_text(&self) -> bool {
        matches!(self, Value::Text(_))
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Map> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Look up `key` when this value is a map.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Append `value` under `key` in `map`, turning a second occurrence into a
    /// list and extending an existing list.
    pub(crate) fn insert_child(map: &mut Map, key: String, value: Value) {
        match map.get_mut(&key) {
            None => {
                map.insert(key, value);
            }
            Some(Value::List(items)) => items.push(value),
            Some(slot) => {
                let first = std::mem::replace(slot, Value::List(Vec::with_capacity(2)));
                if let Value::List(items) = slot {
                    items.push(first);
                    items.push(value);
                }
            }
        }
    }
}

impl From<String> for Value {
    fn from(text: String) -> Self {
        Value::Text(text)
    }
}

impl From<&str> for Value {
    fn from(text: &str) -> Self {
        Value::Text(text.to_string())
    }
}

impl From<Map> for Value {
    fn from(map: Map) -> Self {
        Value::Map(map)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Text(text) => serializer.serialize_str(text),
            Value::Map(map) => map.serialize(serializer),
            Value::List(items) => items.serialize(serializer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_sibling_turns_into_list() {
        let mut map = Map::new();
        Value::insert_child(&mut map, "item".into(), "x".into());
        assert_eq!(map.get("item"), Some(&Value::from("x")));

        Value::insert_child(&mut map, "item".into(), "y".into());
        Value::insert_child(&mut map, "item".into(), "z".into());
        let items = map.get("item").and_then(Value::as_list).expect("list");
        let texts: Vec<_> = items.iter().filter_map(Value::as_str).collect();
        assert_eq!(texts, ["x", "y", "z"]);
    }

    #[test]
    fn map_sibling_joins_list_with_text_sibling() {
        let mut map = Map::new();
        let mut attrs = Map::new();
        attrs.insert("attribute_id".into(), "1".into());
        Value::insert_child(&mut map, "entry".into(), "plain".into());
        Value::insert_child(&mut map, "entry".into(), Value::Map(attrs.clone()));
        assert_eq!(
            map.get("entry"),
            Some(&Value::List(vec!["plain".into(), Value::Map(attrs)]))
        );
    }

    #[test]
    fn accessors_reject_other_variants() {
        let text = Value::from("hi");
        assert!(text.is_text());
        assert!(text.as_map().is_none());
        assert!(text.get("hi").is_none());
        let list = Value::List(vec![]);
        assert!(list.is_list());
        assert!(list.as_str().is_none());
    }

    #[test]
    fn serializes_as_plain_json() {
        let mut inner = Map::new();
        inner.insert("attribute_id".into(), "7".into());
        let mut root = Map::new();
        root.insert("b".into(), Value::Map(inner));
        root.insert("a".into(), Value::List(vec!["1".into(), "2".into()]));
        let json = serde_json::to_string(&Value::Map(root)).expect("serialize");
        assert_eq!(json, r#"{"b":{"attribute_id":"7"},"a":["1","2"]}"#);
    }
}
