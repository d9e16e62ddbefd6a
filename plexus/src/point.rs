//! Extension points
//!
//! A `Point` owns the ordered extension collection for one namespace:
//! registration, enable/disable visibility, membership queries, and the two
//! dispatch primitives (broadcast `invoke`, reducing `exec`, plus their
//! async variants). Every successful registration re-runs the ordering
//! engine; the committed sequence is the iteration order for everything
//! downstream.

use crate::error::RegistryError;
use crate::extension::{Extension, ExtensionDef, Index};
use crate::order::{commit_order, Orphans};
use plexus_core::{Context, Value};
use regex::RegexBuilder;
use std::collections::HashSet;
use std::sync::Arc;

/// One named extension slot
pub struct Point {
    id: String,
    extensions: Vec<Arc<Extension>>,
    disabled: HashSet<String>,
    orphans: Orphans,
}

impl Point {
    pub(crate) fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            extensions: Vec::new(),
            disabled: HashSet::new(),
            orphans: Orphans::default(),
        }
    }

    /// The namespace this point serves
    pub fn id(&self) -> &str {
        &self.id
    }

    // ========== Registration ==========

    /// Register an extension and re-sort.
    ///
    /// Anonymous records receive the synthetic default id and a low index;
    /// named records without an index sort last among unanchored entries.
    /// Registering an id that is already present (committed or parked) is a
    /// silent no-op; replace by calling [`remove`](Self::remove) first.
    ///
    /// Fails when the record carries its own `invoke` capability or when
    /// the registration would create a circular before/after chain. On
    /// failure the point's committed order and orphan state are unchanged.
    pub fn extend(&mut self, def: ExtensionDef) -> Result<&mut Self, RegistryError> {
        let ext = def.seal(&self.id)?;

        if self.has(ext.id()) || self.orphans.contains(ext.id()) {
            tracing::debug!(point = %self.id, extension = %ext.id(), "duplicate registration ignored");
            return Ok(self);
        }

        let mut candidate = self.extensions.clone();
        candidate.push(Arc::new(ext));
        let (ordered, orphans) = commit_order(&self.id, &candidate, &self.orphans)?;
        self.extensions = ordered;
        self.orphans = orphans;
        Ok(self)
    }

    /// Evict an id from storage, the disabled set, and the orphan lists.
    ///
    /// Returns whether anything was removed. A subsequent `extend` with the
    /// same id is accepted as a fresh registration.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.extensions.len();
        self.extensions.retain(|ext| ext.id() != id);
        let removed = self.extensions.len() != before || self.orphans.contains(id);
        self.orphans.remove(id);
        self.disabled.remove(id);
        removed
    }

    // ========== Lookup ==========

    /// Exact membership test against committed storage
    pub fn has(&self, id: &str) -> bool {
        self.extensions.iter().any(|ext| ext.id() == id)
    }

    /// Pattern lookup: `pattern` is compiled as a case-insensitive,
    /// multi-line regex and tested against stored ids; the first match in
    /// committed order wins. This is intentional pattern semantics, not
    /// exact lookup: `get("pu.*")` finds an extension with id `puck`. An
    /// invalid pattern degrades to literal comparison. Use
    /// [`get_exact`](Self::get_exact) for ids containing metacharacters.
    pub fn get(&self, pattern: &str) -> Option<Arc<Extension>> {
        match RegexBuilder::new(pattern)
            .case_insensitive(true)
            .multi_line(true)
            .build()
        {
            Ok(re) => self
                .extensions
                .iter()
                .find(|ext| re.is_match(ext.id()))
                .cloned(),
            Err(err) => {
                tracing::debug!(point = %self.id, pattern, error = %err, "invalid id pattern, falling back to literal match");
                self.get_exact(pattern)
            }
        }
    }

    /// Literal-match accessor
    pub fn get_exact(&self, id: &str) -> Option<Arc<Extension>> {
        self.extensions.iter().find(|ext| ext.id() == id).cloned()
    }

    /// Ids currently parked awaiting an anchor
    pub fn orphans(&self) -> Vec<&str> {
        self.orphans.ids()
    }

    // ========== Visibility ==========

    /// Hide an id from the visible view; `"*"` hides everything.
    /// Non-destructive: storage and ordering are untouched.
    pub fn disable(&mut self, id: &str) -> &mut Self {
        self.disabled.insert(id.to_string());
        self
    }

    /// Restore an id (or `"*"`) to the visible view, in its previously
    /// committed position.
    pub fn enable(&mut self, id: &str) -> &mut Self {
        self.disabled.remove(id);
        self
    }

    pub fn is_enabled(&self, id: &str) -> bool {
        !self.disabled.contains(id) && !self.disabled.contains("*")
    }

    /// The visible view: committed order minus disabled ids
    pub fn list(&self) -> impl Iterator<Item = &Arc<Extension>> {
        self.extensions.iter().filter(|ext| self.is_enabled(ext.id()))
    }

    pub fn each(&self, mut f: impl FnMut(&Arc<Extension>)) {
        self.list().for_each(|ext| f(ext));
    }

    pub fn map<T>(&self, f: impl FnMut(&Arc<Extension>) -> T) -> Vec<T> {
        self.list().map(f).collect()
    }

    pub fn filter(&self, mut pred: impl FnMut(&Arc<Extension>) -> bool) -> Vec<Arc<Extension>> {
        self.list().filter(|ext| pred(ext)).cloned().collect()
    }

    pub fn reduce<T>(&self, seed: T, mut f: impl FnMut(T, &Arc<Extension>) -> T) -> T {
        let mut acc = seed;
        for ext in self.list() {
            acc = f(acc, ext);
        }
        acc
    }

    /// Extract one metadata field per visible extension
    pub fn pluck(&self, key: &str) -> Vec<Value> {
        self.map(|ext| match key {
            "id" => Value::Text(ext.id().to_string()),
            "index" => match ext.index() {
                Index::First => Value::Text("first".to_string()),
                Index::Last => Value::Text("last".to_string()),
                Index::At(n) => Value::Int(n),
            },
            "before" => ext.before().map_or(Value::Null, |a| Value::Text(a.to_string())),
            "after" => ext.after().map_or(Value::Null, |a| Value::Text(a.to_string())),
            _ => Value::Null,
        })
    }

    /// Number of visible extensions
    pub fn count(&self) -> usize {
        self.list().count()
    }

    // ========== Dispatch ==========

    /// Broadcast `method` to every visible extension, collecting one result
    /// per extension in committed order. A missing capability yields an
    /// error slot for that extension only and never aborts the broadcast.
    pub fn invoke(&self, ctx: Option<&Context>, method: &str, args: &[Value]) -> Vec<Value> {
        let ctx = ctx.cloned().unwrap_or_default();
        tracing::debug!(point = %self.id, method, visible = self.count(), "broadcast invoke");
        self.list().map(|ext| ext.invoke(&ctx, method, args)).collect()
    }

    /// Broadcast with sequential awaiting: async capabilities are resolved
    /// one at a time, preserving committed order.
    pub async fn invoke_async(&self, ctx: Option<&Context>, method: &str, args: &[Value]) -> Vec<Value> {
        let ctx = ctx.cloned().unwrap_or_default();
        let mut collected = Vec::with_capacity(self.count());
        for ext in self.list() {
            collected.push(ext.invoke_async(&ctx, method, args.to_vec()).await);
        }
        collected
    }

    /// Sequential reduction: the first visible extension receives the
    /// original arguments; each subsequent one receives the previous
    /// non-null return value prepended. Only the final value is returned
    /// (`Null` when nothing is visible).
    pub fn exec(&self, ctx: Option<&Context>, method: &str, args: &[Value]) -> Value {
        let ctx = ctx.cloned().unwrap_or_default();
        let mut prev = Value::Null;
        for ext in self.list() {
            let step = self.step_args(&prev, args);
            prev = ext.invoke(&ctx, method, &step);
        }
        prev
    }

    /// Async reduction: identical to [`exec`](Self::exec), but each step is
    /// awaited before the next begins. Each step's input is the prior
    /// step's output, so the suspension is strictly sequential.
    pub async fn exec_async(&self, ctx: Option<&Context>, method: &str, args: &[Value]) -> Value {
        let ctx = ctx.cloned().unwrap_or_default();
        let mut prev = Value::Null;
        for ext in self.list() {
            let step = self.step_args(&prev, args);
            prev = ext.invoke_async(&ctx, method, step).await;
        }
        prev
    }

    fn step_args(&self, prev: &Value, args: &[Value]) -> Vec<Value> {
        if prev.is_null() {
            args.to_vec()
        } else {
            let mut step = Vec::with_capacity(args.len() + 1);
            step.push(prev.clone());
            step.extend_from_slice(args);
            step
        }
    }
}

impl std::fmt::Debug for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Point")
            .field("id", &self.id)
            .field("extensions", &self.extensions)
            .field("disabled", &self.disabled)
            .field("orphans", &self.orphans.ids())
            .finish()
    }
}
