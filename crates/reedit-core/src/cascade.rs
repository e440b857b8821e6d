//! Host → dependents registry
//!
//! A dependent is an item holding a `Ref` attribute that points at a host
//! (a scheduled item pointing at its task, for instance). The registry is
//! the reverse index of those references. It is consulted when an edit
//! removing a host is constructed, so the removal can carry one
//! `RemoveFromHost` SubEdit per dependent and undo restores them together.

use std::collections::{BTreeMap, BTreeSet};

use reedit_core_types::ItemId;

/// One dependent reference to a host
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DependentRef {
    pub dependent: ItemId,
    pub ref_name: String,
}

/// Reverse index from host to the references pointing at it
///
/// Iteration order is deterministic (ordered by host, then dependent,
/// then attribute name) so cascades expand the same way every time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CascadeRegistry {
    hosts: BTreeMap<ItemId, BTreeSet<DependentRef>>,
}

impl CascadeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `dependent.ref_name` points at `host`
    ///
    /// Returns false if the link was already registered.
    pub fn register(&mut self, dependent: ItemId, host: ItemId, ref_name: &str) -> bool {
        self.hosts.entry(host).or_default().insert(DependentRef {
            dependent,
            ref_name: ref_name.to_string(),
        })
    }

    /// Forget that `dependent.ref_name` points at `host`
    ///
    /// Returns false if no such link was registered.
    pub fn deregister(&mut self, dependent: ItemId, host: ItemId, ref_name: &str) -> bool {
        let Some(dependents) = self.hosts.get_mut(&host) else {
            return false;
        };
        let removed = dependents.remove(&DependentRef {
            dependent,
            ref_name: ref_name.to_string(),
        });
        if dependents.is_empty() {
            self.hosts.remove(&host);
        }
        removed
    }

    /// Currently registered dependents of `host`
    pub fn dependents_of(&self, host: ItemId) -> Vec<DependentRef> {
        self.hosts
            .get(&host)
            .map(|deps| deps.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn has_dependents(&self, host: ItemId) -> bool {
        self.hosts.contains_key(&host)
    }

    /// Drop every link in which `item` is the host or the dependent
    ///
    /// Used when an item's slot is reclaimed. Returns the number of links
    /// dropped.
    pub fn forget_item(&mut self, item: ItemId) -> usize {
        let mut dropped = self.hosts.remove(&item).map_or(0, |deps| deps.len());
        self.hosts.retain(|_, deps| {
            let before = deps.len();
            deps.retain(|d| d.dependent != item);
            dropped += before - deps.len();
            !deps.is_empty()
        });
        dropped
    }

    /// Total number of registered links
    pub fn len(&self) -> usize {
        self.hosts.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }
}
