//! Dotted address parsing
//!
//! An address names a point and one or more methods, with an optional
//! extension selector: `namespace.path.method[,method2,...][#id]`. The
//! namespace is everything up to the last dot; the method part may be a
//! comma-separated list, consumed in declaration order.

use crate::error::{AddressError, RegistryError};

/// A parsed dispatch address
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Address {
    raw: String,
    namespace: String,
    methods: Vec<String>,
    id: Option<String>,
}

impl Address {
    /// Parse `namespace.path.method[,m2,...][#id]`
    pub fn parse(input: &str) -> Result<Self, AddressError> {
        let (name, id) = match input.split_once('#') {
            Some((_, id)) if id.is_empty() => {
                return Err(AddressError::EmptyId(input.to_string()));
            }
            Some((name, id)) => (name, Some(id.to_string())),
            None => (input, None),
        };

        let dot = name
            .rfind('.')
            .ok_or_else(|| AddressError::MissingSeparator(input.to_string()))?;
        let namespace = &name[..dot];
        if namespace.is_empty() {
            return Err(AddressError::EmptyNamespace(input.to_string()));
        }

        let method_part = &name[dot + 1..];
        let methods: Vec<String> = method_part.split(',').map(str::to_string).collect();
        if methods.iter().any(String::is_empty) {
            return Err(AddressError::EmptyMethod(input.to_string()));
        }

        Ok(Self {
            raw: input.to_string(),
            namespace: namespace.to_string(),
            methods,
            id,
        })
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// The `#id` extension selector, if present
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// The single method named by this address; multi-method addresses
    /// belong to `invoke_all`.
    pub(crate) fn single_method(&self) -> Result<&str, RegistryError> {
        match self.methods.as_slice() {
            [only] => Ok(only),
            _ => Err(RegistryError::MultipleMethods { address: self.raw.clone() }),
        }
    }
}
