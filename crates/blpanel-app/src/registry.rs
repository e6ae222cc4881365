//! Device registry - the single source of truth for known devices
//!
//! Owns the deduplicated address-to-record mapping. The "known addresses"
//! set is the key space of the map itself, not a separate structure. All
//! mutation happens from the engine's single execution context; the
//! registry is deliberately not shared or locked.

use std::collections::HashMap;

use blpanel_core::prelude::*;
use blpanel_core::{DeviceRecord, DeviceState};

/// Whether an upsert changed the visible device set.
///
/// `Ignored` covers three distinct cases that all leave the rendered list
/// untouched: a record with no address, a duplicate of a known address,
/// and a newly admitted record whose name hides it from rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new visible record was admitted
    Applied,
    /// Nothing to render changed
    Ignored,
}

/// Deduplicated mapping from hardware address to device record.
///
/// Merge policy is first-write-wins: the first announcement seen for an
/// address fixes the record's display fields, and later announcements for
/// the same address are dropped. This mirrors how "known" membership was
/// tracked historically -- a later, better-named announcement for a
/// hidden device is silently lost -- and is preserved deliberately rather
/// than switched to last-write-wins. `clear()` resets the policy per
/// discovery cycle.
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    records: HashMap<String, DeviceRecord>,
    /// Admission order of addresses, for stable full re-renders
    order: Vec<String>,
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply the merge policy to one record.
    ///
    /// Returns [`UpsertOutcome::Applied`] only when the record was
    /// admitted and is visible; the caller uses that to decide whether a
    /// render callback fires.
    pub fn upsert(&mut self, record: DeviceRecord) -> UpsertOutcome {
        if record.address.is_empty() {
            // A record lacking an identifier is a no-op.
            return UpsertOutcome::Ignored;
        }

        if self.records.contains_key(&record.address) {
            trace!("Duplicate announcement for {} dropped", record.address);
            return UpsertOutcome::Ignored;
        }

        let hidden = record.is_hidden();
        self.order.push(record.address.clone());
        self.records.insert(record.address.clone(), record);

        if hidden {
            // Occupies the known slot but is never rendered.
            UpsertOutcome::Ignored
        } else {
            UpsertOutcome::Applied
        }
    }

    /// Lookup for detail views
    pub fn get(&self, address: &str) -> Option<&DeviceRecord> {
        self.records.get(address)
    }

    pub fn contains(&self, address: &str) -> bool {
        self.records.contains_key(address)
    }

    /// Refresh status and icon from an explicit state query.
    ///
    /// This is the only path that changes `status` or `icon`; push
    /// traffic never does. Returns whether anything changed (unknown
    /// addresses change nothing).
    pub fn set_state(&mut self, address: &str, state: &DeviceState) -> bool {
        let Some(record) = self.records.get_mut(address) else {
            return false;
        };

        let mut changed = false;

        let status = state.status();
        if record.status != status {
            record.status = status;
            changed = true;
        }

        if state.icon.is_some() && record.icon != state.icon {
            record.icon = state.icon.clone();
            changed = true;
        }

        changed
    }

    /// Visible records in admission order, for a full re-render
    pub fn all(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.order
            .iter()
            .filter_map(|address| self.records.get(address))
            .filter(|record| !record.is_hidden())
    }

    /// Number of visible records
    pub fn visible_count(&self) -> usize {
        self.all().count()
    }

    /// Number of known addresses, hidden ones included
    pub fn known_count(&self) -> usize {
        self.records.len()
    }

    /// Drop all records; the next upsert of any address is treated as new
    pub fn clear(&mut self) {
        self.records.clear();
        self.order.clear();
    }

    /// Remove a record locally. Does not talk to the agent; callers pair
    /// this with the command client's forget call.
    pub fn forget(&mut self, address: &str) -> Option<DeviceRecord> {
        let removed = self.records.remove(address);
        if removed.is_some() {
            self.order.retain(|a| a != address);
        }
        removed
    }
}
