//! Memory Hazard Detection.
//!
//! Loads and stores may only reorder around each other when they touch different
//! addresses. This module implements the ordering guards applied before a load reads
//! memory or a store commits to it. It provides:
//! 1. **RAW guard:** A load waits for every earlier pending store to the same address.
//! 2. **WAR/WAW guard:** A store waits for every earlier pending load or store to the
//!    same address.
//!
//! "Earlier" is decided by issue sequence number, so two in-flight instances of the
//! same loop-body instruction are still ordered correctly.

use crate::core::station::{Slot, StationId, StationPool};

/// Checks if a load must wait for an earlier store to the same address.
///
/// # Arguments
///
/// * `pool` - The station pool, before this cycle's mutations.
/// * `id` - The station holding the load.
///
/// # Returns
///
/// `true` if an older busy store aliases the load's address.
///
/// # Examples
///
/// ```ignore
/// // sw x5, 0(a2)    <- issued first, still waiting for x5
/// // lw x6, 0(a2)    <- must not read memory yet
/// assert!(load_blocked(&pool, load_id));
/// ```
pub fn load_blocked(pool: &StationPool, id: StationId) -> bool {
    let Some(load) = pool.get(id).slot.as_ref() else {
        return false;
    };
    older_conflict(pool, load, Slot::is_store)
}

/// Checks if a store must wait for an earlier load or store to the same address.
///
/// # Arguments
///
/// * `pool` - The station pool, before this cycle's mutations.
/// * `id` - The station holding the store.
///
/// # Returns
///
/// `true` if an older busy load or store aliases the store's address.
pub fn store_blocked(pool: &StationPool, id: StationId) -> bool {
    let Some(store) = pool.get(id).slot.as_ref() else {
        return false;
    };
    older_conflict(pool, store, |other| other.is_load() || other.is_store())
}

/// Looks for a busy slot issued before `slot`, matching `kind`, aliasing its address.
fn older_conflict(pool: &StationPool, slot: &Slot, kind: impl Fn(&Slot) -> bool) -> bool {
    let Some(addr) = slot.address.as_ref() else {
        return false;
    };
    pool.busy().any(|(_, _, other)| {
        other.seq < slot.seq
            && kind(other)
            && other.address.as_ref().is_some_and(|a| a.aliases(addr))
    })
}
