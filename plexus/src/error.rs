//! Hard, caller-visible errors
//!
//! Contract violations and address problems are raised synchronously as
//! `Result::Err`. Per-extension dispatch failures are not here; those travel
//! as `Value::Error` slots inside the collected results.

use thiserror::Error;

/// Error type for address parsing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("address '{0}' has no namespace/method separator")]
    MissingSeparator(String),

    #[error("address '{0}' has an empty namespace")]
    EmptyNamespace(String),

    #[error("address '{0}' has an empty method name")]
    EmptyMethod(String),

    #[error("address '{0}' has an empty extension id after '#'")]
    EmptyId(String),

    #[error("address '{0}' needs a '#id' extension selector")]
    MissingId(String),
}

/// Error type for registration and dispatch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error("extension '{id}' must not provide its own 'invoke' capability (point '{point}')")]
    ReservedInvoke { point: String, id: String },

    #[error("Circular references detected for extension point '{point}' and extension '{id}'")]
    CircularReference { point: String, id: String },

    #[error("did not have id '{id}' for namespace '{point}'")]
    UnknownExtension { point: String, id: String },

    #[error("address '{address}' names multiple methods; use invoke_all")]
    MultipleMethods { address: String },
}
