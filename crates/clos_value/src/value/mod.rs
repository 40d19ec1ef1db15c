//! Runtime values passed to and returned from dispatch.
//!
//! # Classification
//!
//! Every variant except `Object` and `Foreign` is a primitive with a fixed
//! tag (`int`, `string`, ...). `Object` is nominal: its class tag names the
//! most specific type, and the dispatcher asks a type introspector for the
//! rest of its chain. `Foreign` wraps an arbitrary host value that only a
//! custom introspector can classify.
//!
//! # Construction
//!
//! Heap-backed variants are built through factory functions:
//!
//! ```text
//! let s = Value::string("hello");
//! let dog = Value::object("Dog", [("name", Value::string("Rex"))]);
//! let file = Value::resource("file", 3);
//! ```

mod heap;
mod object;

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use clos_ir::{PrimitiveType, TypeTag};

pub use heap::Heap;
pub use object::{Instance, Resource};

/// Runtime value seen by the dispatcher and its handlers.
#[derive(Clone)]
pub enum Value {
    /// Absence of a value.
    Void,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Heap<String>),
    List(Heap<Vec<Value>>),
    /// String-keyed map, iterated in key order.
    Map(Heap<BTreeMap<String, Value>>),
    /// Opaque host resource (file, socket, ...).
    Resource(Heap<Resource>),
    /// Instance of a nominal class.
    Object(Heap<Instance>),
    /// Arbitrary host value.
    Foreign(Heap<dyn Any + Send + Sync>),
}

impl Value {
    pub fn string(s: impl Into<String>) -> Self {
        Value::Str(Heap::new(s.into()))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Heap::new(items))
    }

    pub fn map<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let map = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Value::Map(Heap::new(map))
    }

    pub fn resource(kind: impl Into<String>, id: u64) -> Self {
        Value::Resource(Heap::new(Resource::new(kind, id)))
    }

    /// Create an instance of `class` with the given fields.
    ///
    /// Class names are nominal: `Value::instance("int")` is an object of a
    /// class named `int`, distinct from the primitive `int`. A `*` class
    /// name leaves the object unclassified, so it matches only the wildcard.
    pub fn object<K, I>(class: impl Into<TypeTag>, fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        let class = class.into().into_nominal();
        Value::Object(Heap::new(Instance::new(class, fields)))
    }

    /// Create an instance of `class` with no fields. See `Value::object`.
    pub fn instance(class: impl Into<TypeTag>) -> Self {
        Self::object(class, std::iter::empty::<(String, Value)>())
    }

    pub fn foreign<T: Any + Send + Sync>(value: T) -> Self {
        let arc: Arc<dyn Any + Send + Sync> = Arc::new(value);
        Value::Foreign(Heap::from_arc(arc))
    }

    /// The built-in type of this value, or `None` for nominal and foreign values.
    pub fn primitive_type(&self) -> Option<PrimitiveType> {
        match self {
            Value::Void => Some(PrimitiveType::Void),
            Value::Bool(_) => Some(PrimitiveType::Bool),
            Value::Int(_) => Some(PrimitiveType::Int),
            Value::Float(_) => Some(PrimitiveType::Float),
            Value::Str(_) => Some(PrimitiveType::String),
            Value::List(_) => Some(PrimitiveType::List),
            Value::Map(_) => Some(PrimitiveType::Map),
            Value::Resource(_) => Some(PrimitiveType::Resource),
            Value::Object(_) | Value::Foreign(_) => None,
        }
    }

    /// Most specific tag known without consulting an introspector.
    ///
    /// Foreign values report the wildcard.
    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::Object(instance) => instance.class().clone(),
            Value::Foreign(_) => TypeTag::Wildcard,
            _ => self
                .primitive_type()
                .map_or(TypeTag::Wildcard, TypeTag::Primitive),
        }
    }

    /// Type name for diagnostics.
    pub fn type_name(&self) -> String {
        match self {
            Value::Foreign(_) => "foreign".to_string(),
            _ => self.type_tag().to_string(),
        }
    }

    #[inline]
    pub fn is_void(&self) -> bool {
        matches!(self, Value::Void)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(x) => Some(*x),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    pub fn as_instance(&self) -> Option<&Instance> {
        match self {
            Value::Object(instance) => Some(&**instance),
            _ => None,
        }
    }

    /// Borrow a foreign payload as `T`.
    pub fn downcast_foreign<T: Any>(&self) -> Option<&T> {
        match self {
            Value::Foreign(payload) => payload.downcast_ref::<T>(),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Void, Value::Void) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Resource(a), Value::Resource(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => a == b,
            (Value::Foreign(a), Value::Foreign(b)) => Heap::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => f.write_str("void"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(n) => write!(f, "{n}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {value}")?;
                }
                f.write_str("}")
            }
            Value::Resource(resource) => write!(f, "{resource}"),
            Value::Object(instance) => write!(f, "{instance}"),
            Value::Foreign(_) => f.write_str("<foreign>"),
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Void => f.write_str("Void"),
            Value::Bool(b) => write!(f, "Bool({b})"),
            Value::Int(n) => write!(f, "Int({n})"),
            Value::Float(x) => write!(f, "Float({x})"),
            Value::Str(s) => write!(f, "Str({:?})", s.as_str()),
            Value::List(items) => f.debug_tuple("List").field(&items.as_slice()).finish(),
            Value::Map(map) => f.debug_tuple("Map").field(&**map).finish(),
            Value::Resource(resource) => write!(f, "Resource({resource})"),
            Value::Object(instance) => write!(f, "Object({instance})"),
            Value::Foreign(_) => f.write_str("Foreign(..)"),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}
