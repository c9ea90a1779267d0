//! Dynamic values flowing through the engine.
//!
//! Arguments, decoded bodies and adapted results are all expressed as
//! [`Value`]s. Composite records carry their type name so that form
//! descriptors and type descriptors can be matched without reflection.
//! Typed Rust structs cross into and out of the engine through the serde
//! bridge ([`Value::from_serialize`] and [`Value::deserialize_into`]).

mod descriptor;
mod json;

use std::sync::Arc;

use bytes::Bytes;
pub use descriptor::{Shape, TypeDescriptor};

/// Type name given to JSON objects decoded without a composite descriptor.
pub const ANONYMOUS_COMPOSITE: &str = "object";

/// A dynamically typed value.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Char(char),
    Text(String),
    Bytes(Bytes),
    Sequence(Vec<Value>),
    Composite(Composite),
}

impl Value {
    /// Short name of the value's kind, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Char(_) => "char",
            Self::Text(_) => "text",
            Self::Bytes(_) => "bytes",
            Self::Sequence(_) => "sequence",
            Self::Composite(_) => "composite",
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool { matches!(self, Self::Null) }

    /// Locale-independent textual form of a scalar.
    ///
    /// Returns `None` for null, bytes, sequences and composites.
    ///
    /// # Examples
    ///
    /// ```
    /// use restframe::value::Value;
    ///
    /// assert_eq!(Value::Float(2.5).text_form().as_deref(), Some("2.5"));
    /// assert_eq!(Value::Bool(true).text_form().as_deref(), Some("true"));
    /// assert_eq!(Value::Null.text_form(), None);
    /// ```
    #[must_use]
    pub fn text_form(&self) -> Option<String> {
        match self {
            Self::Bool(value) => Some(value.to_string()),
            Self::Integer(value) => Some(value.to_string()),
            Self::Float(value) => Some(value.to_string()),
            Self::Char(value) => Some(value.to_string()),
            Self::Text(value) => Some(value.clone()),
            Self::Null | Self::Bytes(_) | Self::Sequence(_) | Self::Composite(_) => None,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_composite(&self) -> Option<&Composite> {
        match self {
            Self::Composite(composite) => Some(composite),
            _ => None,
        }
    }

    /// Convert any serialisable Rust value into a [`Value`].
    ///
    /// JSON objects become composites named `type_name`; nested objects use
    /// [`ANONYMOUS_COMPOSITE`].
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be serialised.
    pub fn from_serialize<T>(value: &T, type_name: &str) -> Result<Self, serde_json::Error>
    where
        T: serde::Serialize + ?Sized,
    {
        let json = serde_json::to_value(value)?;
        let descriptor = match json {
            serde_json::Value::Object(_) => TypeDescriptor::composite(type_name),
            _ => TypeDescriptor::Any,
        };
        json::from_json(json, &descriptor).map_err(<serde_json::Error as serde::de::Error>::custom)
    }

    /// Deserialise this value into a Rust type.
    ///
    /// # Errors
    ///
    /// Returns an error if the value does not match `T`'s shape.
    pub fn deserialize_into<T>(&self) -> Result<T, serde_json::Error>
    where
        T: serde::de::DeserializeOwned,
    {
        serde_json::from_value(json::to_json(self))
    }
}

impl serde::Serialize for Value {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serde::Serialize::serialize(&json::to_json(self), serializer)
    }
}

macro_rules! value_from {
    ($($source:ty => $variant:ident $(as $cast:ty)?),* $(,)?) => {
        $(
            impl From<$source> for Value {
                fn from(value: $source) -> Self { Self::$variant(value $(as $cast)?) }
            }
        )*
    };
}

value_from!(
    bool => Bool,
    i64 => Integer,
    i32 => Integer as i64,
    i16 => Integer as i64,
    u32 => Integer as i64,
    u16 => Integer as i64,
    u8 => Integer as i64,
    f64 => Float,
    f32 => Float as f64,
    char => Char,
    String => Text,
    Bytes => Bytes,
    Composite => Composite,
);

impl From<&str> for Value {
    fn from(value: &str) -> Self { Self::Text(value.to_owned()) }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self { Self::Sequence(items.into_iter().map(Into::into).collect()) }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self { value.map_or(Self::Null, Into::into) }
}

/// A named record with ordered fields.
///
/// Equality ignores field order and treats an absent field as null, so a
/// record rebuilt field-by-field compares equal to the original.
///
/// # Examples
///
/// ```
/// use restframe::value::{Composite, Value};
///
/// let person = Composite::new("Person").with("name", "Ada").with("age", 36);
/// assert_eq!(person.get("age"), Some(&Value::Integer(36)));
/// ```
#[derive(Clone, Debug)]
pub struct Composite {
    type_name: Arc<str>,
    fields: Vec<(String, Value)>,
}

impl Composite {
    /// Create an empty record of `type_name`.
    #[must_use]
    pub fn new(type_name: impl Into<Arc<str>>) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
        }
    }

    /// Builder-style [`Composite::set`].
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    /// Set `name` to `value`, keeping the field's position if it exists.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(field, _)| *field == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    #[must_use]
    pub fn type_name(&self) -> &str { &self.type_name }

    /// Fields in insertion order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(name, value)| (name.as_str(), value))
    }

    #[must_use]
    pub fn len(&self) -> usize { self.fields.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.fields.is_empty() }
}

impl PartialEq for Composite {
    fn eq(&self, other: &Self) -> bool {
        let covers = |left: &Self, right: &Self| {
            left.fields
                .iter()
                .all(|(name, value)| right.get(name).unwrap_or(&Value::Null) == value)
        };
        self.type_name == other.type_name && covers(self, other) && covers(other, self)
    }
}

pub(crate) use json::{from_json, to_json};

#[cfg(test)]
mod tests;
