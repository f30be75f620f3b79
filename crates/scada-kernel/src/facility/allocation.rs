//! Burn-rate allocation across priority groups (§4.4.1).

use std::collections::BTreeMap;

use scada_types::{Tenths, UnitId};

/// A unit's current operator-configured ceiling, as seen by the allocator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitLimit {
    pub unit: UnitId,
    pub lim_br10: Tenths,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AllocationResult {
    pub assignments: BTreeMap<UnitId, Tenths>,
    pub residual: Tenths,
}

/// Allocates `desired_mb_per_tick` across four priority groups, highest
/// priority (group 1) first. Each group's units are stable-sorted ascending
/// by `lim_br10` (ties keep declaration order) before the share/cap walk
/// described in §4.4.1 steps 2b-2c.
pub fn allocate_burn(desired_mb_per_tick: f64, groups: &[Vec<UnitLimit>; 4]) -> AllocationResult {
    let mut unallocated = Tenths::from_mb_per_tick(desired_mb_per_tick);
    let mut assignments = BTreeMap::new();

    for group in groups {
        let mut sorted = group.clone();
        sorted.sort_by_key(|u| u.lim_br10);
        let (group_assignments, remainder) = allocate_group(&sorted, unallocated);
        assignments.extend(group_assignments);
        unallocated = remainder;
    }

    AllocationResult {
        assignments,
        residual: unallocated,
    }
}

/// Distributes `unallocated` tenths across one priority group's units
/// (already sorted ascending by limit), returning per-unit assignments and
/// whatever the group could not absorb.
fn allocate_group(
    sorted_units: &[UnitLimit],
    mut unallocated: Tenths,
) -> (BTreeMap<UnitId, Tenths>, Tenths) {
    let mut assignments = BTreeMap::new();
    let n = sorted_units.len();
    if n == 0 {
        return (assignments, unallocated);
    }

    let mut remaining_count = n;
    let mut base = Tenths::new(unallocated.get() / remaining_count as u32);

    for (i, u) in sorted_units.iter().enumerate() {
        let is_last = i == n - 1;
        // The last unit absorbs whatever base's integer division dropped.
        let share = if is_last { unallocated } else { base };

        let capped = share > u.lim_br10;
        let assigned = share.min(u.lim_br10);
        assignments.insert(u.unit, assigned);
        unallocated = unallocated.saturating_sub(assigned);
        remaining_count -= 1;

        // Uncapped units all take the same base share; only a cap forces a
        // recompute over the remaining units (step c).
        if remaining_count > 0 && capped {
            base = Tenths::new(unallocated.get() / remaining_count as u32);
        }
    }

    (assignments, unallocated)
}
