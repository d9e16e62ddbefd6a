//! Extension records and capabilities
//!
//! An extension is a passive record: an id, ordering hints, and an
//! open-ended set of named capabilities. Capabilities are resolved by
//! name at dispatch time; a missing name degrades to an error slot,
//! never to an aborted dispatch.

use crate::error::RegistryError;
use futures::future::BoxFuture;
use plexus_core::{Context, PlexusError, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// Synthetic id assigned to anonymous registrations
pub const ANONYMOUS_ID: &str = "default";

/// Index assigned to anonymous registrations (sorts early among equals)
pub const ANONYMOUS_INDEX: i64 = 100;

/// Index assigned to named registrations without an explicit index
/// (sorts last among unanchored entries)
pub const DEFAULT_INDEX: i64 = 1_000_000_000;

/// Capability name attached by the point itself; never user-supplied
pub const RESERVED_INVOKE: &str = "invoke";

/// Sort position of an extension within its point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Index {
    /// Before every numeric index
    First,
    /// Numeric position, ascending
    At(i64),
    /// After every numeric index
    Last,
}

impl Ord for Index {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use std::cmp::Ordering;
        match (self, other) {
            (Index::First, Index::First) | (Index::Last, Index::Last) => Ordering::Equal,
            (Index::First, _) => Ordering::Less,
            (_, Index::First) => Ordering::Greater,
            (Index::Last, _) => Ordering::Greater,
            (_, Index::Last) => Ordering::Less,
            (Index::At(a), Index::At(b)) => a.cmp(b),
        }
    }
}

impl PartialOrd for Index {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl From<i64> for Index {
    fn from(n: i64) -> Self {
        Index::At(n)
    }
}

/// Synchronous capability: called with the dispatch context and arguments
pub type SyncCapability = Arc<dyn Fn(&Context, &[Value]) -> Value + Send + Sync>;

/// Asynchronous capability: owns a context clone for the life of its future
pub type AsyncCapability = Arc<dyn Fn(Context, Vec<Value>) -> BoxFuture<'static, Value> + Send + Sync>;

/// A named callable member of an extension
#[derive(Clone)]
pub enum Capability {
    Sync(SyncCapability),
    Async(AsyncCapability),
}

/// A registered extension: immutable once committed to a point
pub struct Extension {
    id: String,
    index: Index,
    before: Option<String>,
    after: Option<String>,
    capabilities: HashMap<String, Capability>,
}

impl Extension {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn index(&self) -> Index {
        self.index
    }

    pub fn before(&self) -> Option<&str> {
        self.before.as_deref()
    }

    pub fn after(&self) -> Option<&str> {
        self.after.as_deref()
    }

    /// The anchor this extension is ordered relative to; `before` wins
    /// when both hints are present.
    pub fn anchor(&self) -> Option<&str> {
        self.before.as_deref().or(self.after.as_deref())
    }

    pub fn has_capability(&self, name: &str) -> bool {
        self.capabilities.contains_key(name)
    }

    pub fn capability_names(&self) -> impl Iterator<Item = &str> {
        self.capabilities.keys().map(String::as_str)
    }

    /// Derived dispatch entry attached at registration time.
    ///
    /// Looks up `method` among this extension's capabilities. A missing
    /// method, or an async capability reached from this synchronous path,
    /// logs a diagnostic and yields an error slot rather than failing the
    /// whole dispatch.
    pub fn invoke(&self, ctx: &Context, method: &str, args: &[Value]) -> Value {
        match self.capabilities.get(method) {
            Some(Capability::Sync(f)) => f(ctx, args),
            Some(Capability::Async(_)) => {
                tracing::warn!(
                    extension = %self.id,
                    method,
                    "async capability reached from sync dispatch"
                );
                Value::Error(PlexusError::async_capability(&self.id, method))
            }
            None => {
                tracing::warn!(
                    extension = %self.id,
                    method,
                    "extension does not provide requested capability"
                );
                Value::Error(PlexusError::missing_capability(&self.id, method))
            }
        }
    }

    /// Async variant of [`invoke`](Self::invoke); sync capabilities are
    /// called inline, async ones are awaited.
    pub async fn invoke_async(&self, ctx: &Context, method: &str, args: Vec<Value>) -> Value {
        match self.capabilities.get(method) {
            Some(Capability::Sync(f)) => f(ctx, &args),
            Some(Capability::Async(f)) => f(ctx.clone(), args).await,
            None => {
                tracing::warn!(
                    extension = %self.id,
                    method,
                    "extension does not provide requested capability"
                );
                Value::Error(PlexusError::missing_capability(&self.id, method))
            }
        }
    }
}

impl std::fmt::Debug for Extension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.capability_names().collect();
        names.sort_unstable();
        f.debug_struct("Extension")
            .field("id", &self.id)
            .field("index", &self.index)
            .field("before", &self.before)
            .field("after", &self.after)
            .field("capabilities", &names)
            .finish()
    }
}

/// Registration record a plugin author hands to `Point::extend`
#[derive(Default)]
pub struct ExtensionDef {
    id: Option<String>,
    index: Option<Index>,
    before: Option<String>,
    after: Option<String>,
    capabilities: HashMap<String, Capability>,
}

impl ExtensionDef {
    /// A named registration
    pub fn named(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// An anonymous registration: receives the synthetic id and a low index
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_index(mut self, index: impl Into<Index>) -> Self {
        self.index = Some(index.into());
        self
    }

    /// Anchor this extension immediately before `id`
    pub fn with_before(mut self, id: impl Into<String>) -> Self {
        self.before = Some(id.into());
        self
    }

    /// Anchor this extension immediately after `id`
    pub fn with_after(mut self, id: impl Into<String>) -> Self {
        self.after = Some(id.into());
        self
    }

    pub fn with_capability<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Context, &[Value]) -> Value + Send + Sync + 'static,
    {
        self.capabilities.insert(name.into(), Capability::Sync(Arc::new(f)));
        self
    }

    pub fn with_capability_async<F, Fut>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(Context, Vec<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Value> + Send + 'static,
    {
        self.capabilities.insert(
            name.into(),
            Capability::Async(Arc::new(move |ctx, args| Box::pin(f(ctx, args)))),
        );
        self
    }

    /// Apply registration defaults and seal the record for `point`.
    ///
    /// Fails when the record carries its own `invoke` capability.
    pub(crate) fn seal(self, point: &str) -> Result<Extension, RegistryError> {
        if self.capabilities.contains_key(RESERVED_INVOKE) {
            return Err(RegistryError::ReservedInvoke {
                point: point.to_string(),
                id: self.id.unwrap_or_else(|| ANONYMOUS_ID.to_string()),
            });
        }

        let (id, default_index) = match self.id {
            Some(id) => (id, DEFAULT_INDEX),
            None => (ANONYMOUS_ID.to_string(), ANONYMOUS_INDEX),
        };

        Ok(Extension {
            id,
            index: self.index.unwrap_or(Index::At(default_index)),
            before: self.before,
            after: self.after,
            capabilities: self.capabilities,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod index_tests {
        use super::*;

        #[test]
        fn test_first_sorts_before_numbers() {
            assert!(Index::First < Index::At(i64::MIN));
            assert!(Index::First < Index::Last);
        }

        #[test]
        fn test_last_sorts_after_numbers() {
            assert!(Index::Last > Index::At(i64::MAX));
        }

        #[test]
        fn test_numbers_ascending() {
            assert!(Index::At(-100) < Index::At(100));
        }
    }

    mod seal_tests {
        use super::*;

        #[test]
        fn test_anonymous_defaults() {
            let ext = ExtensionDef::anonymous().seal("canada.eh").unwrap();
            assert_eq!(ext.id(), ANONYMOUS_ID);
            assert_eq!(ext.index(), Index::At(ANONYMOUS_INDEX));
        }

        #[test]
        fn test_named_without_index_sorts_last() {
            let ext = ExtensionDef::named("igloo").seal("canada.eh").unwrap();
            assert_eq!(ext.index(), Index::At(DEFAULT_INDEX));
        }

        #[test]
        fn test_explicit_index_kept() {
            let ext = ExtensionDef::named("hot")
                .with_index(-100)
                .seal("canada.swappable")
                .unwrap();
            assert_eq!(ext.index(), Index::At(-100));
        }

        #[test]
        fn test_reserved_invoke_rejected() {
            let err = ExtensionDef::named("bad")
                .with_capability(RESERVED_INVOKE, |_, _| Value::Null)
                .seal("canada.eh")
                .unwrap_err();
            assert!(matches!(err, RegistryError::ReservedInvoke { .. }));
        }

        #[test]
        fn test_before_wins_as_anchor() {
            let ext = ExtensionDef::named("both")
                .with_before("b")
                .with_after("a")
                .seal("p")
                .unwrap();
            assert_eq!(ext.anchor(), Some("b"));
        }
    }

    mod invoke_tests {
        use super::*;

        fn sample() -> Extension {
            ExtensionDef::named("puck")
                .with_capability("slapshot", |_ctx, args| {
                    let prefix = args.first().and_then(Value::as_text).unwrap_or("");
                    Value::Text(format!("{}score!", prefix))
                })
                .seal("canada.hockey")
                .unwrap()
        }

        #[test]
        fn test_invoke_calls_capability() {
            let ext = sample();
            let out = ext.invoke(&Context::null(), "slapshot", &["he shoots...".into()]);
            assert_eq!(out.as_text(), Some("he shoots...score!"));
        }

        #[test]
        fn test_invoke_missing_capability_degrades() {
            let ext = sample();
            let out = ext.invoke(&Context::null(), "wristshot", &[]);
            let err = out.as_error().unwrap();
            assert_eq!(err.code, plexus_core::codes::MISSING_CAPABILITY);
        }

        #[test]
        fn test_sync_invoke_of_async_capability_degrades() {
            let ext = ExtensionDef::named("awaits")
                .with_capability_async("doit", |_ctx, _args| async { Value::Null })
                .seal("canada.asyncs.eh")
                .unwrap();
            let out = ext.invoke(&Context::null(), "doit", &[]);
            let err = out.as_error().unwrap();
            assert_eq!(err.code, plexus_core::codes::ASYNC_CAPABILITY);
        }

        #[tokio::test]
        async fn test_invoke_async_awaits() {
            let ext = ExtensionDef::named("awaits")
                .with_capability_async("doit", |_ctx, args| async move {
                    let a = args[0].as_text().unwrap_or("").to_string();
                    let b = args[1].as_text().unwrap_or("").to_string();
                    Value::Text(format!("{}{} yay!", a, b))
                })
                .seal("canada.asyncs.eh")
                .unwrap();
            let out = ext
                .invoke_async(&Context::null(), "doit", vec!["async".into(), "await".into()])
                .await;
            assert_eq!(out.as_text(), Some("asyncawait yay!"));
        }

        #[tokio::test]
        async fn test_invoke_async_falls_through_to_sync() {
            let ext = sample();
            let out = ext.invoke_async(&Context::null(), "slapshot", vec![]).await;
            assert_eq!(out.as_text(), Some("score!"));
        }
    }
}
