//! Tagged type descriptors.
//!
//! A [`TypeDescriptor`] names the type of a parameter, a form field or a
//! declared return type. Return types wrap a body type in one or more
//! [`Shape`]s, which the call adapter registry peels off outer-to-inner.

use std::{fmt, sync::Arc};

use super::Value;

/// Outer structural pattern of a declared return type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Absent values (null body, empty body, 404) become `None`.
    Optional,
    /// The body is a sequence of the inner type.
    Collection,
    /// The call runs on a separate execution context behind a handle.
    Deferred,
    /// A page of inner values plus a cursor to the next page.
    Paginated,
    /// Status, headers and decoded body together.
    Response,
    /// A shape handled by a user-registered adapter.
    Custom(Arc<str>),
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Optional => f.write_str("Optional"),
            Self::Collection => f.write_str("Collection"),
            Self::Deferred => f.write_str("Deferred"),
            Self::Paginated => f.write_str("Paginated"),
            Self::Response => f.write_str("Response"),
            Self::Custom(name) => f.write_str(name),
        }
    }
}

/// Explicit description of a value type.
///
/// # Examples
///
/// ```
/// use restframe::value::{Shape, TypeDescriptor};
///
/// let declared = TypeDescriptor::deferred(TypeDescriptor::optional(TypeDescriptor::Integer));
/// assert_eq!(declared.shape(), Some(&Shape::Deferred));
/// assert_eq!(declared.to_string(), "Deferred<Optional<Integer>>");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// No value; the response body is ignored.
    Unit,
    Bool,
    Integer,
    Float,
    Char,
    Text,
    Bytes,
    /// Any value; decoding is untyped and conformance always holds.
    Any,
    /// A named composite record.
    Composite(Arc<str>),
    /// A repeated value.
    Sequence(Box<TypeDescriptor>),
    /// A return shape wrapped around an inner type.
    Shaped(Shape, Box<TypeDescriptor>),
}

impl TypeDescriptor {
    /// Named composite type.
    #[must_use]
    pub fn composite(name: impl Into<Arc<str>>) -> Self { Self::Composite(name.into()) }

    /// Sequence of `inner`.
    #[must_use]
    pub fn sequence(inner: Self) -> Self { Self::Sequence(Box::new(inner)) }

    /// `inner` wrapped in `shape`.
    #[must_use]
    pub fn shaped(shape: Shape, inner: Self) -> Self { Self::Shaped(shape, Box::new(inner)) }

    #[must_use]
    pub fn optional(inner: Self) -> Self { Self::shaped(Shape::Optional, inner) }

    #[must_use]
    pub fn collection(inner: Self) -> Self { Self::shaped(Shape::Collection, inner) }

    #[must_use]
    pub fn deferred(inner: Self) -> Self { Self::shaped(Shape::Deferred, inner) }

    #[must_use]
    pub fn paginated(inner: Self) -> Self { Self::shaped(Shape::Paginated, inner) }

    #[must_use]
    pub fn response(inner: Self) -> Self { Self::shaped(Shape::Response, inner) }

    /// Outermost shape, if this is a shaped type.
    #[must_use]
    pub fn shape(&self) -> Option<&Shape> {
        match self {
            Self::Shaped(shape, _) => Some(shape),
            _ => None,
        }
    }

    /// Type wrapped by a shape or a sequence.
    #[must_use]
    pub fn inner(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::Shaped(_, inner) | Self::Sequence(inner) => Some(inner),
            _ => None,
        }
    }

    /// Composite type name, if this is a composite.
    #[must_use]
    pub fn composite_name(&self) -> Option<&str> {
        match self {
            Self::Composite(name) => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_composite(&self) -> bool { matches!(self, Self::Composite(_)) }

    #[must_use]
    pub fn is_repeated(&self) -> bool { matches!(self, Self::Sequence(_)) }

    /// Element type of a sequence.
    #[must_use]
    pub fn element_type(&self) -> Option<&TypeDescriptor> {
        match self {
            Self::Sequence(inner) => Some(inner),
            _ => None,
        }
    }

    /// Returns true when `value` satisfies this type.
    ///
    /// Null satisfies only `Unit`, `Any` and optional shapes. Shaped types
    /// check their inner type; sequences check every element.
    #[must_use]
    pub fn conforms(&self, value: &Value) -> bool {
        match (self, value) {
            (Self::Any, _)
            | (Self::Unit | Self::Shaped(Shape::Optional, _), Value::Null)
            | (Self::Bool, Value::Bool(_))
            | (Self::Integer, Value::Integer(_))
            | (Self::Float, Value::Float(_))
            | (Self::Char, Value::Char(_))
            | (Self::Text, Value::Text(_))
            | (Self::Bytes, Value::Bytes(_)) => true,
            (Self::Composite(name), Value::Composite(composite)) => {
                composite.type_name() == name.as_ref()
            }
            (Self::Sequence(inner), Value::Sequence(items)) => {
                items.iter().all(|item| inner.conforms(item))
            }
            (Self::Shaped(_, inner), value) => inner.conforms(value),
            _ => false,
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unit => f.write_str("Unit"),
            Self::Bool => f.write_str("Bool"),
            Self::Integer => f.write_str("Integer"),
            Self::Float => f.write_str("Float"),
            Self::Char => f.write_str("Char"),
            Self::Text => f.write_str("Text"),
            Self::Bytes => f.write_str("Bytes"),
            Self::Any => f.write_str("Any"),
            Self::Composite(name) => write!(f, "Composite({name})"),
            Self::Sequence(inner) => write!(f, "Sequence<{inner}>"),
            Self::Shaped(shape, inner) => write!(f, "{shape}<{inner}>"),
        }
    }
}
