//! Hub reconciliation, the one place where Hub-reported currency
//! replaces the locally computed values.
//!
//! Design:
//!   - The Hub is authoritative for `coins` and `total_points` once a pet
//!     is registered. Local values before that are provisional.
//!   - Values are overwritten, never added, so replaying the same response
//!     (a network retry) is a no-op.
//!   - Nothing else in the snapshot is touched. Decay never writes these
//!     two fields, so a decay tick and a reconciliation can interleave
//!     without losing each other's update.

use crate::{hub::HubBalance, snapshot::PetSnapshot};

pub fn merge_hub_reconciliation(snapshot: &PetSnapshot, hub: &HubBalance) -> PetSnapshot {
    let mut next = snapshot.clone();
    next.coins = hub.balance;
    next.hub.total_points = hub.total_points;
    next
}
