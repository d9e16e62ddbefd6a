//! Point registry
//!
//! Maps namespace strings to points with get-or-create semantics. The
//! registry is explicitly constructed and explicitly passed; it lives for
//! the life of the process and points are never removed during normal
//! operation.

use crate::point::Point;
use std::collections::HashMap;

/// Process-lifetime mapping from namespace to [`Point`]
#[derive(Debug, Default)]
pub struct Registry {
    points: HashMap<String, Point>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The point for `namespace`, created lazily on first reference
    pub fn point(&mut self, namespace: &str) -> &mut Point {
        self.points
            .entry(namespace.to_string())
            .or_insert_with(|| Point::new(namespace))
    }

    /// Non-creating lookup
    pub fn peek(&self, namespace: &str) -> Option<&Point> {
        self.points.get(namespace)
    }

    /// Registered namespace names, sorted for deterministic iteration
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.points.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
