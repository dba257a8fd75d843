//! Rule-based greedy allocator.

use super::types::{Allocation, DispatchInput};

/// Distributes one timestep's solar supply with a deterministic greedy policy.
///
/// Surplus (`solar >= demand`): the consumer takes exactly its demand, the
/// battery absorbs as much of the excess as its headroom allows, and the
/// remainder goes to the grid as export.
///
/// Deficit (`solar < demand`): the consumer takes all solar plus whatever the
/// battery can discharge. The grid stays at zero: unmet demand beyond the
/// stored energy is left as a shortfall, visible to callers as
/// `consumer_kw < demand_kw`. This asymmetry (grid absorbs excess but never
/// covers deficit) is a property of the policy, not an oversight.
///
/// Inputs are assumed validated; see [`DispatchInput::validate`].
pub fn allocate(input: &DispatchInput) -> Allocation {
    if input.solar_kw >= input.demand_kw {
        let excess = input.solar_kw - input.demand_kw;
        let headroom = input.capacity_kwh - input.level_kwh;
        let charge = excess.min(headroom);
        Allocation {
            consumer_kw: input.demand_kw,
            battery_change_kwh: charge,
            grid_kw: excess - charge,
        }
    } else {
        let shortfall = input.demand_kw - input.solar_kw;
        let discharge = input.level_kwh.min(shortfall);
        Allocation {
            consumer_kw: input.solar_kw + discharge,
            battery_change_kwh: -discharge,
            grid_kw: 0.0,
        }
    }
}
