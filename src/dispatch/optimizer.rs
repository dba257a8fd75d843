//! Optimization-based allocator: a fixed-shape linear program minimizing grid draw.

use good_lp::{Solution, SolverModel, constraint, variable, variables};

use super::rule_based;
use super::types::{Allocation, DispatchInput};

/// Per-path energy flows found by the solver (all kW, all >= 0).
#[derive(Debug, Clone, Copy)]
pub struct FlowSplit {
    /// Solar delivered directly to the consumer.
    pub solar_to_consumer: f32,
    /// Battery discharge delivered to the consumer.
    pub battery_to_consumer: f32,
    /// Grid draw delivered to the consumer.
    pub grid_to_consumer: f32,
    /// Solar routed into the battery.
    pub solar_to_battery: f32,
}

impl FlowSplit {
    /// Collapses the four flows into the caller-facing allocation.
    pub fn into_allocation(self) -> Allocation {
        Allocation {
            consumer_kw: self.solar_to_consumer + self.battery_to_consumer + self.grid_to_consumer,
            battery_change_kwh: self.solar_to_battery - self.battery_to_consumer,
            grid_kw: self.grid_to_consumer,
        }
    }
}

/// Solves the min-grid flow problem for one timestep.
///
/// The seam exists so the allocator can be exercised with a stub solver that
/// forces either the success or the fallback path.
pub trait FlowSolver {
    /// Returns the optimal flow split, or `None` when no feasible solution
    /// was found (infeasible inputs or solver non-convergence).
    fn solve_min_grid(&self, input: &DispatchInput) -> Option<FlowSplit>;
}

/// Production solver backed by the Clarabel interior-point method via `good_lp`.
///
/// The program has four variables and four linear inequality constraints:
/// minimize grid draw subject to meeting demand, not double-allocating solar,
/// not over-discharging, and not over-charging.
#[derive(Debug, Default, Clone, Copy)]
pub struct LinearFlowSolver;

impl FlowSolver for LinearFlowSolver {
    fn solve_min_grid(&self, input: &DispatchInput) -> Option<FlowSplit> {
        let solar = f64::from(input.solar_kw);
        let demand = f64::from(input.demand_kw);
        let capacity = f64::from(input.capacity_kwh);
        let level = f64::from(input.level_kwh);

        let mut vars = variables!();
        let solar_to_consumer = vars.add(variable().min(0.0).max(solar));
        let battery_to_consumer = vars.add(variable().min(0.0).max(level));
        let grid_to_consumer = vars.add(variable().min(0.0));
        let solar_to_battery = vars.add(variable().min(0.0).max(solar));

        let model = vars
            .minimise(grid_to_consumer)
            .using(good_lp::clarabel)
            .with(constraint!(
                solar_to_consumer + battery_to_consumer + grid_to_consumer >= demand
            ))
            .with(constraint!(solar_to_consumer + solar_to_battery <= solar))
            .with(constraint!(battery_to_consumer <= level))
            .with(constraint!(solar_to_battery <= capacity - level));

        match model.solve() {
            Ok(solution) => {
                // Interior-point tolerances can leave values a hair below zero.
                let value = |v| (solution.value(v).max(0.0)) as f32;
                Some(FlowSplit {
                    solar_to_consumer: value(solar_to_consumer),
                    battery_to_consumer: value(battery_to_consumer),
                    grid_to_consumer: value(grid_to_consumer),
                    solar_to_battery: value(solar_to_battery),
                })
            }
            Err(_) => None,
        }
    }
}

/// Allocates via the given solver, falling back to the rule-based policy when
/// the solver reports no feasible solution.
///
/// The fallback is the sole error-recovery path: callers never see a distinct
/// solver error.
pub fn allocate_with<S: FlowSolver>(solver: &S, input: &DispatchInput) -> Allocation {
    match solver.solve_min_grid(input) {
        Some(split) => split.into_allocation(),
        None => rule_based::allocate(input),
    }
}
