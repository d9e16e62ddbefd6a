//! Ordering engine
//!
//! Turns an unordered extension set plus pending orphans into one flat
//! deterministic sequence. Unanchored extensions sort by index
//! (`First` < numbers ascending < `Last`); anchored extensions are spliced
//! immediately before or after their anchor, recursively. Extensions whose
//! anchor is not present stay parked in the orphan maps and are re-attempted
//! on every sort. The engine is a pure function over snapshots: callers
//! commit its output only on success, so a failed sort leaves point state
//! untouched and the failure reproducible on retry.

use crate::error::RegistryError;
use crate::extension::Extension;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// Extensions waiting for an anchor that has not been registered yet,
/// grouped by anchor id.
#[derive(Clone, Debug, Default)]
pub(crate) struct Orphans {
    pub(crate) before: HashMap<String, Vec<Arc<Extension>>>,
    pub(crate) after: HashMap<String, Vec<Arc<Extension>>>,
}

impl Orphans {
    /// Ids of all parked extensions
    pub(crate) fn ids(&self) -> Vec<&str> {
        self.before
            .values()
            .chain(self.after.values())
            .flatten()
            .map(|ext| ext.id())
            .collect()
    }

    pub(crate) fn contains(&self, id: &str) -> bool {
        self.before
            .values()
            .chain(self.after.values())
            .flatten()
            .any(|ext| ext.id() == id)
    }

    /// Evict an extension from every pending group
    pub(crate) fn remove(&mut self, id: &str) {
        for groups in [&mut self.before, &mut self.after] {
            groups.values_mut().for_each(|list| list.retain(|ext| ext.id() != id));
            groups.retain(|_, list| !list.is_empty());
        }
    }
}

/// Compute the committed order for `stored` given pending `orphans`.
///
/// Returns the new flat sequence together with the orphans left unresolved.
/// Fails with [`RegistryError::CircularReference`] when a before/after chain
/// re-enters an id, either during the walk or among the leftovers.
pub(crate) fn commit_order(
    point: &str,
    stored: &[Arc<Extension>],
    orphans: &Orphans,
) -> Result<(Vec<Arc<Extension>>, Orphans), RegistryError> {
    let mut befores = orphans.before.clone();
    let mut afters = orphans.after.clone();
    let mut basic: Vec<Arc<Extension>> = Vec::with_capacity(stored.len());

    // Partition: anchored extensions join their anchor's pending group,
    // everything else sorts by index.
    for ext in stored {
        if let Some(anchor) = ext.before() {
            befores.entry(anchor.to_string()).or_default().push(Arc::clone(ext));
        } else if let Some(anchor) = ext.after() {
            afters.entry(anchor.to_string()).or_default().push(Arc::clone(ext));
        } else {
            basic.push(Arc::clone(ext));
        }
    }
    basic.sort_by(|a, b| a.index().cmp(&b.index()));

    let mut ordered: Vec<Arc<Extension>> = Vec::with_capacity(stored.len());
    let mut guard: HashSet<String> = HashSet::new();
    for ext in basic {
        place(point, ext, &mut ordered, &mut befores, &mut afters, &mut guard)?;
    }

    let leftovers = Orphans { before: befores, after: afters };
    scan_leftover_chains(point, &leftovers)?;

    Ok((ordered, leftovers))
}

/// Splice one extension into the output: its before-group first, itself,
/// then its after-group, each group sorted by index and resolved
/// recursively. The guard is the cycle detector for the current walk.
fn place(
    point: &str,
    ext: Arc<Extension>,
    ordered: &mut Vec<Arc<Extension>>,
    befores: &mut HashMap<String, Vec<Arc<Extension>>>,
    afters: &mut HashMap<String, Vec<Arc<Extension>>>,
    guard: &mut HashSet<String>,
) -> Result<(), RegistryError> {
    if !guard.insert(ext.id().to_string()) {
        return Err(RegistryError::CircularReference {
            point: point.to_string(),
            id: ext.id().to_string(),
        });
    }

    if let Some(mut group) = befores.remove(ext.id()) {
        group.sort_by(|a, b| a.index().cmp(&b.index()));
        for member in group {
            place(point, member, ordered, befores, afters, guard)?;
        }
    }

    let id = ext.id().to_string();
    ordered.push(ext);

    if let Some(mut group) = afters.remove(&id) {
        group.sort_by(|a, b| a.index().cmp(&b.index()));
        for member in group {
            place(point, member, ordered, befores, afters, guard)?;
        }
    }

    guard.remove(&id);
    Ok(())
}

/// Detect cycles among extensions that stayed parked after the walk.
///
/// A leftover whose anchor chain dead-ends at an absent id is legitimately
/// parked. A chain that revisits an id (including a self-anchor) can never
/// resolve and is a fatal ordering error.
fn scan_leftover_chains(point: &str, leftovers: &Orphans) -> Result<(), RegistryError> {
    let mut waiting: HashMap<&str, &str> = HashMap::new();
    for (anchor, group) in leftovers.before.iter().chain(leftovers.after.iter()) {
        for ext in group {
            waiting.insert(ext.id(), anchor.as_str());
        }
    }

    for (&start, _) in &waiting {
        let mut seen: HashSet<&str> = HashSet::new();
        seen.insert(start);
        let mut cursor = start;
        while let Some(&anchor) = waiting.get(cursor) {
            if !seen.insert(anchor) {
                return Err(RegistryError::CircularReference {
                    point: point.to_string(),
                    id: start.to_string(),
                });
            }
            cursor = anchor;
        }
    }
    Ok(())
}
