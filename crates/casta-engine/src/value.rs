//! Dynamic member values
//!
//! Data members, method arguments, and method results all carry [`Value`].
//! Objects are stored by reference: cloning a [`Value::Object`] clones the
//! handle, not the instance, so two values can observe the same mutations.

use std::fmt;
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::instance::Instance;

/// Dynamic value held by data members and passed to and from methods
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Absent value
    Null,
    /// Boolean
    Bool(bool),
    /// 64-bit signed integer
    Int(i64),
    /// 64-bit float
    Float(f64),
    /// UTF-8 string
    Str(String),
    /// Ordered list of values
    List(Vec<Value>),
    /// Shared reference to a class instance
    Object(ObjectRef),
}

impl Value {
    /// Create a null value
    pub fn null() -> Value {
        Value::Null
    }

    /// Create a boolean value
    pub fn bool(b: bool) -> Value {
        Value::Bool(b)
    }

    /// Create an integer value
    pub fn int(i: i64) -> Value {
        Value::Int(i)
    }

    /// Create a float value
    pub fn float(f: f64) -> Value {
        Value::Float(f)
    }

    /// Create a string value
    pub fn str(s: impl Into<String>) -> Value {
        Value::Str(s.into())
    }

    /// Create a list value
    pub fn list(items: Vec<Value>) -> Value {
        Value::List(items)
    }

    /// Wrap an instance into a shared object value
    pub fn object(instance: Instance) -> Value {
        Value::Object(ObjectRef::new(instance))
    }

    /// Human-readable name of the value's type
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::List(_) => "list",
            Value::Object(_) => "object",
        }
    }

    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Get the boolean payload, if any
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get the integer payload, if any
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get the float payload, if any
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get the string payload, if any
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Get the list payload, if any
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Get the object payload, if any
    pub fn as_object(&self) -> Option<&ObjectRef> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Value {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Value {
        Value::Int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Value {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::Str(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::Str(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Value {
        Value::List(items)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => f.write_str(s),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Object(obj) => write!(f, "<instance of '{}'>", obj.lock().class_name()),
        }
    }
}

/// Shared, mutable handle to an [`Instance`]
///
/// Cloning the handle aliases the instance. Equality is identity: two
/// handles compare equal only when they point at the same instance.
#[derive(Clone)]
pub struct ObjectRef(Arc<Mutex<Instance>>);

impl ObjectRef {
    /// Wrap an instance into a shared handle
    pub fn new(instance: Instance) -> ObjectRef {
        ObjectRef(Arc::new(Mutex::new(instance)))
    }

    /// Lock the instance for reading or mutation
    pub fn lock(&self) -> MutexGuard<'_, Instance> {
        self.0.lock()
    }

    /// Check whether two handles alias the same instance
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for ObjectRef {
    fn eq(&self, other: &ObjectRef) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectRef('{}')", self.lock().class_name())
    }
}
