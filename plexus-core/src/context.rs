//! Dispatch context
//!
//! A cheaply clonable handle to the caller-supplied context value. Every
//! capability receives one; async capabilities clone it into their futures.
//! The context is read-only shared state. Extensions that need to hand data
//! onward return it from their capability, which the reduction protocol
//! threads into the next call.

use crate::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Caller-supplied context handle passed to every capability invocation
#[derive(Debug, Clone, Default)]
pub struct Context {
    inner: Arc<Value>,
}

impl Context {
    /// Wrap a value as a context
    pub fn new(value: Value) -> Self {
        Self { inner: Arc::new(value) }
    }

    /// The null context, used when the caller supplies none
    pub fn null() -> Self {
        Self::default()
    }

    /// Build an object context from key/value entries
    pub fn object(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self::new(Value::Object(entries.into_iter().collect::<HashMap<_, _>>()))
    }

    /// The underlying context value
    pub fn value(&self) -> &Value {
        &self.inner
    }

    /// Field access on an object context; Error value if absent or not an object
    pub fn get(&self, key: &str) -> Value {
        self.inner.get(key)
    }

    pub fn is_null(&self) -> bool {
        self.inner.is_null()
    }
}

impl From<Value> for Context {
    fn from(value: Value) -> Self {
        Self::new(value)
    }
}
