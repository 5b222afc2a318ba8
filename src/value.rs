use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// The coarse type of a [`Value`], used when reporting type errors.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Int,
    Float,
    Char,
    String,
    List,
    Array,
    Map,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Null => "null",
            Self::Bool => "boolean",
            Self::Int => "integer",
            Self::Float => "float",
            Self::Char => "char",
            Self::String => "string",
            Self::List => "list",
            Self::Array => "array",
            Self::Map => "map",
        };
        f.write_str(name)
    }
}

/// A densely typed array of primitives.
///
/// Every kind is boxed into a generic [`Value`] when iterated, so a
/// `#foreach` over `[1, 2, 3]` behaves the same whether the data arrived as a
/// `Vec<i32>` or as a list of values.
#[derive(Debug, Clone, PartialEq)]
pub enum PrimitiveArray {
    Bytes(Vec<u8>),
    Short(Vec<i16>),
    Int(Vec<i32>),
    Long(Vec<i64>),
    Float(Vec<f32>),
    Double(Vec<f64>),
    Char(Vec<char>),
    Bool(Vec<bool>),
}

impl PrimitiveArray {
    pub fn len(&self) -> usize {
        match self {
            Self::Bytes(v) => v.len(),
            Self::Short(v) => v.len(),
            Self::Int(v) => v.len(),
            Self::Long(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Double(v) => v.len(),
            Self::Char(v) => v.len(),
            Self::Bool(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Boxes every element into a [`Value`], preserving order.
    pub fn to_values(&self) -> Vec<Value> {
        match self {
            Self::Bytes(v) => v.iter().map(|x| Value::Int(i64::from(*x))).collect(),
            Self::Short(v) => v.iter().map(|x| Value::Int(i64::from(*x))).collect(),
            Self::Int(v) => v.iter().map(|x| Value::Int(i64::from(*x))).collect(),
            Self::Long(v) => v.iter().map(|x| Value::Int(*x)).collect(),
            Self::Float(v) => v.iter().map(|x| Value::Float(f64::from(*x))).collect(),
            Self::Double(v) => v.iter().map(|x| Value::Float(*x)).collect(),
            Self::Char(v) => v.iter().map(|x| Value::Char(*x)).collect(),
            Self::Bool(v) => v.iter().map(|x| Value::Bool(*x)).collect(),
        }
    }
}

macro_rules! primitive_array_from {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<Vec<$ty>> for PrimitiveArray {
                fn from(v: Vec<$ty>) -> Self {
                    Self::$variant(v)
                }
            }

            impl From<&[$ty]> for PrimitiveArray {
                fn from(v: &[$ty]) -> Self {
                    Self::$variant(v.to_vec())
                }
            }
        )*
    };
}

primitive_array_from! {
    u8 => Bytes,
    i16 => Short,
    i32 => Int,
    i64 => Long,
    f32 => Float,
    f64 => Double,
    char => Char,
    bool => Bool,
}

/// An opaque piece of template data.
///
/// The interpreter only looks inside a value to decide truthiness (`#if`) and
/// to iterate it (`#foreach`); property access and display are left to the
/// [`ValuesProvider`](crate::ValuesProvider).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Char(char),
    String(String),
    /// A generic ordered collection.
    List(Vec<Value>),
    /// A typed array of primitives.
    Array(PrimitiveArray),
    /// A property container, keyed by property name.
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Null => ValueKind::Null,
            Self::Bool(_) => ValueKind::Bool,
            Self::Int(_) => ValueKind::Int,
            Self::Float(_) => ValueKind::Float,
            Self::Char(_) => ValueKind::Char,
            Self::String(_) => ValueKind::String,
            Self::List(_) => ValueKind::List,
            Self::Array(_) => ValueKind::Array,
            Self::Map(_) => ValueKind::Map,
        }
    }

    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Only an exact boolean `true` is truthy. Numbers, strings and
    /// collections are all false, whatever their content.
    pub const fn is_true(&self) -> bool {
        matches!(self, Self::Bool(true))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            Self::Null
            | Self::Bool(_)
            | Self::Int(_)
            | Self::Float(_)
            | Self::Char(_)
            | Self::List(_)
            | Self::Array(_)
            | Self::Map(_) => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Self::Map(m) => Some(m),
            Self::Null
            | Self::Bool(_)
            | Self::Int(_)
            | Self::Float(_)
            | Self::Char(_)
            | Self::String(_)
            | Self::List(_)
            | Self::Array(_) => None,
        }
    }

    /// Normalizes a list or any primitive array into an ordered sequence of
    /// values. Returns `None` for everything else.
    pub fn iterate(&self) -> Option<Vec<Value>> {
        match self {
            Self::List(items) => Some(items.clone()),
            Self::Array(array) => Some(array.to_values()),
            Self::Null
            | Self::Bool(_)
            | Self::Int(_)
            | Self::Float(_)
            | Self::Char(_)
            | Self::String(_)
            | Self::Map(_) => None,
        }
    }

    /// Converts any serializable model into a value tree. Structs and maps
    /// become [`Value::Map`], sequences become [`Value::List`].
    ///
    /// # Errors
    /// - If the model cannot be represented as JSON (e.g. non-string map keys).
    #[cfg(feature = "serde")]
    pub fn from_serializable<T: serde::Serialize + ?Sized>(
        model: &T,
    ) -> crate::TinyvelResult<Self> {
        serde_json::to_value(model)
            .map(Self::from)
            .map_err(|e| crate::TinyvelError::Serialization {
                message: e.to_string(),
            })
    }
}

fn write_joined<I>(f: &mut fmt::Formatter<'_>, items: I) -> fmt::Result
where
    I: IntoIterator<Item = Value>,
{
    f.write_str("[")?;
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", item)?;
    }
    f.write_str("]")
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{}", b),
            Self::Int(i) => write!(f, "{}", i),
            // `{:?}` keeps the fraction of whole floats: `1.0`, not `1`.
            Self::Float(x) => write!(f, "{:?}", x),
            Self::Char(c) => write!(f, "{}", c),
            Self::String(s) => f.write_str(s),
            Self::List(items) => write_joined(f, items.iter().cloned()),
            Self::Array(array) => write_joined(f, array.to_values()),
            Self::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

macro_rules! value_from {
    ($($ty:ty => |$v:ident| $body:expr),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from($v: $ty) -> Self {
                    $body
                }
            }
        )*
    };
}

value_from! {
    bool => |v| Self::Bool(v),
    u8 => |v| Self::Int(i64::from(v)),
    i8 => |v| Self::Int(i64::from(v)),
    i16 => |v| Self::Int(i64::from(v)),
    u16 => |v| Self::Int(i64::from(v)),
    i32 => |v| Self::Int(i64::from(v)),
    u32 => |v| Self::Int(i64::from(v)),
    i64 => |v| Self::Int(v),
    f32 => |v| Self::Float(f64::from(v)),
    f64 => |v| Self::Float(v),
    char => |v| Self::Char(v),
    String => |v| Self::String(v),
    &str => |v| Self::String(v.to_string()),
    PrimitiveArray => |v| Self::Array(v),
    BTreeMap<String, Value> => |v| Self::Map(v),
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Self::List(v.into_iter().map(Into::into).collect())
    }
}

impl<V: Into<Value>> From<HashMap<String, V>> for Value {
    fn from(v: HashMap<String, V>) -> Self {
        Self::Map(v.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<V: Into<Value>> FromIterator<V> for Value {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::List(iter.into_iter().map(Into::into).collect())
    }
}

#[cfg(feature = "serde")]
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::List(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => {
                Self::Map(map.into_iter().map(|(k, v)| (k, Self::from(v))).collect())
            }
        }
    }
}

#[cfg(feature = "serde")]
impl serde::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::{SerializeMap, SerializeSeq};

        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Int(i) => serializer.serialize_i64(*i),
            Self::Float(x) => serializer.serialize_f64(*x),
            Self::Char(c) => serializer.serialize_char(*c),
            Self::String(s) => serializer.serialize_str(s),
            Self::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Array(array) => {
                let items = array.to_values();
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in &items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            Self::Map(map) => {
                let mut m = serializer.serialize_map(Some(map.len()))?;
                for (key, value) in map {
                    m.serialize_entry(key, value)?;
                }
                m.end()
            }
        }
    }
}

#[cfg(feature = "serde")]
impl<'de> serde::Deserialize<'de> for Value {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        serde_json::Value::deserialize(deserializer).map(Self::from)
    }
}
