use std::collections::BTreeMap;

use crate::interface::ValuesProvider;
use crate::value::Value;

/// A provider backed by a map of root-level values.
///
/// Nested properties are looked up in [`Value::Map`] containers; any other
/// container has no properties.
///
/// ```
/// use tinyvel::{MapProvider, render};
///
/// let provider = MapProvider::new().with("name", "World");
/// assert_eq!(render("Hello ${name}!", &provider).unwrap(), "Hello World!\r\n");
/// ```
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MapProvider {
    root: BTreeMap<String, Value>,
}

impl MapProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert<N: Into<String>, V: Into<Value>>(&mut self, name: N, value: V) -> &mut Self {
        self.root.insert(name.into(), value.into());
        self
    }

    pub fn with<N: Into<String>, V: Into<Value>>(mut self, name: N, value: V) -> Self {
        self.insert(name, value);
        self
    }

    pub fn get<T: AsRef<str>>(&self, name: T) -> Option<&Value> {
        self.root.get(name.as_ref())
    }

    /// Builds a provider whose root properties are the fields of `model`.
    ///
    /// # Errors
    /// - If `model` cannot be serialized.
    #[cfg(feature = "serde")]
    pub fn from_serializable<T: serde::Serialize + ?Sized>(
        model: &T,
    ) -> crate::TinyvelResult<Self> {
        let root = match Value::from_serializable(model)? {
            Value::Map(map) => map,
            other => {
                tracing::debug!(kind = %other.kind(), "model is not a map, root is empty");
                BTreeMap::new()
            }
        };
        Ok(Self { root })
    }
}

impl From<BTreeMap<String, Value>> for MapProvider {
    fn from(root: BTreeMap<String, Value>) -> Self {
        Self { root }
    }
}

impl<N: Into<String>, V: Into<Value>> FromIterator<(N, V)> for MapProvider {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            root: iter
                .into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        }
    }
}

impl ValuesProvider for MapProvider {
    fn property(&self, container: Option<&Value>, name: &str) -> Option<Value> {
        match container {
            None => self.root.get(name).cloned(),
            Some(value) => value.as_map().and_then(|map| map.get(name)).cloned(),
        }
    }
}
