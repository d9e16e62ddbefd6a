//! Plexus Core - Fundamental types
//!
//! This crate provides the core types used throughout Plexus:
//! - `Value`: Runtime values exchanged with extensions
//! - `PlexusError`: Structured dispatch errors carried as values
//! - `Context`: Caller-supplied context handle for capability invocation

mod context;
mod error;
mod value;

pub use context::Context;
pub use error::{codes, PlexusError, Severity};
pub use value::Value;

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::codes;
    pub use crate::{Context, PlexusError, Severity, Value};
}
