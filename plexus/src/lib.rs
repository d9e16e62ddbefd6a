//! Plexus Extension Points
//!
//! An in-process extension-point registry:
//! - Points (named slots holding ordered extensions)
//! - Extensions (capability bundles with index/before/after placement)
//! - Dispatch by dotted address (`namespace.path.method[,m2][#id]`)
//! - Broadcast invocation and sequential reduction, sync and async

mod address;
mod dispatch;
mod error;
mod extension;
mod loader;
mod order;
mod point;
mod registry;

pub use address::Address;
pub use error::{AddressError, RegistryError};
pub use extension::{
    AsyncCapability, Capability, Extension, ExtensionDef, Index, SyncCapability, ANONYMOUS_ID,
    ANONYMOUS_INDEX, DEFAULT_INDEX, RESERVED_INVOKE,
};
pub use loader::{load_modules, Bootstrap, ModuleProvider, StaticModules};
pub use point::Point;
pub use registry::Registry;

/// Re-export core types for extension authors
pub mod prelude {
    pub use crate::{
        load_modules, Address, AddressError, Bootstrap, Capability, Extension, ExtensionDef,
        Index, ModuleProvider, Point, Registry, RegistryError, StaticModules,
    };
    pub use plexus_core::prelude::*;
}
