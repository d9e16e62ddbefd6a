//! Module loading
//!
//! A bootstrap module is anything that can install extensions into a
//! registry. Providers enumerate discoverable module ids and resolve each
//! to its bootstrap entry point; [`load_modules`] runs every resolved
//! bootstrap against one registry, logging failures instead of aborting,
//! and reports whether every module installed cleanly.

use crate::error::RegistryError;
use crate::registry::Registry;
use plexus_core::Value;
use std::sync::Arc;

/// One installable unit of extensions
pub trait Bootstrap {
    fn bootstrap(&self, registry: &mut Registry, args: &[Value]) -> Result<(), RegistryError>;
}

impl<F> Bootstrap for F
where
    F: Fn(&mut Registry, &[Value]) -> Result<(), RegistryError>,
{
    fn bootstrap(&self, registry: &mut Registry, args: &[Value]) -> Result<(), RegistryError> {
        self(registry, args)
    }
}

/// A source of discoverable bootstrap modules
pub trait ModuleProvider {
    /// Ids of every discoverable module, in load order
    fn module_ids(&self) -> Vec<String>;

    /// Resolve an id to its bootstrap entry point. An id without one is
    /// not an error; it is skipped during loading.
    fn resolve(&self, id: &str) -> Option<Arc<dyn Bootstrap>>;
}

/// Static provider over an owned module list
#[derive(Default)]
pub struct StaticModules {
    modules: Vec<(String, Arc<dyn Bootstrap>)>,
}

impl StaticModules {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module(mut self, id: impl Into<String>, module: impl Bootstrap + 'static) -> Self {
        self.modules.push((id.into(), Arc::new(module)));
        self
    }
}

impl ModuleProvider for StaticModules {
    fn module_ids(&self) -> Vec<String> {
        self.modules.iter().map(|(id, _)| id.clone()).collect()
    }

    fn resolve(&self, id: &str) -> Option<Arc<dyn Bootstrap>> {
        self.modules
            .iter()
            .find(|(module_id, _)| module_id == id)
            .map(|(_, module)| Arc::clone(module))
    }
}

/// Install every module from `provider` into `registry`.
///
/// Ids that resolve to no bootstrap entry are skipped. A failing bootstrap
/// is logged and does not stop the remaining modules. Returns `true` only
/// when every resolved module installed without error.
pub fn load_modules(
    provider: &dyn ModuleProvider,
    registry: &mut Registry,
    args: &[Value],
) -> bool {
    let mut all_ok = true;
    for id in provider.module_ids() {
        let Some(module) = provider.resolve(&id) else {
            tracing::debug!(module = %id, "module has no bootstrap entry, skipped");
            continue;
        };
        match module.bootstrap(registry, args) {
            Ok(()) => {
                tracing::debug!(module = %id, "module loaded");
            }
            Err(err) => {
                tracing::error!(module = %id, error = %err, "module failed to load");
                all_ok = false;
            }
        }
    }
    all_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extension::ExtensionDef;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    }

    fn hockey_module(registry: &mut Registry, _args: &[Value]) -> Result<(), RegistryError> {
        registry
            .point("canada.hockey")
            .extend(ExtensionDef::named("puck").with_capability("slapshot", |_, _| {
                Value::Text("score!".into())
            }))?;
        Ok(())
    }

    fn broken_module(_registry: &mut Registry, _args: &[Value]) -> Result<(), RegistryError> {
        Err(RegistryError::UnknownExtension {
            point: "canada.hockey".into(),
            id: "zamboni".into(),
        })
    }

    /// Provider whose first id never resolves
    struct Spotty(StaticModules);

    impl ModuleProvider for Spotty {
        fn module_ids(&self) -> Vec<String> {
            let mut ids = vec!["phantom".to_string()];
            ids.extend(self.0.module_ids());
            ids
        }

        fn resolve(&self, id: &str) -> Option<Arc<dyn Bootstrap>> {
            self.0.resolve(id)
        }
    }

    #[test]
    fn test_load_installs_extensions() {
        init_tracing();
        let provider = StaticModules::new().with_module("hockey", hockey_module);
        let mut registry = Registry::new();
        assert!(load_modules(&provider, &mut registry, &[]));
        assert!(registry.point("canada.hockey").has("puck"));
    }

    #[test]
    fn test_failing_module_does_not_stop_the_rest() {
        init_tracing();
        let provider = StaticModules::new()
            .with_module("broken", broken_module)
            .with_module("hockey", hockey_module);
        let mut registry = Registry::new();
        assert!(!load_modules(&provider, &mut registry, &[]));
        assert!(registry.point("canada.hockey").has("puck"));
    }

    #[test]
    fn test_unresolvable_id_is_skipped() {
        let provider = Spotty(StaticModules::new().with_module("hockey", hockey_module));
        let mut registry = Registry::new();
        assert!(load_modules(&provider, &mut registry, &[]));
        assert!(registry.point("canada.hockey").has("puck"));
    }

    #[test]
    fn test_args_reach_modules() {
        fn arg_module(registry: &mut Registry, args: &[Value]) -> Result<(), RegistryError> {
            let id = args
                .first()
                .and_then(Value::as_text)
                .unwrap_or("default")
                .to_string();
            registry.point("canada.args").extend(ExtensionDef::named(id))?;
            Ok(())
        }
        let provider = StaticModules::new().with_module("args", arg_module);
        let mut registry = Registry::new();
        assert!(load_modules(&provider, &mut registry, &["custom".into()]));
        assert!(registry.point("canada.args").has("custom"));
    }
}
