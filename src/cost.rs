//! Cost and savings accounting.
//!
//! Two deliberately distinct formulas coexist here. The single-allocation
//! breakdown values savings against *demand*; the per-series projection
//! values them against *consumer* delivery. The divergence is intentional
//! and each formula is tested on its own.

use std::fmt;

use crate::dispatch::Allocation;
use crate::sim::StepRecord;

/// Monetary view of a single allocation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostBreakdown {
    /// Cost of the grid power ($).
    pub grid_cost: f32,
    /// Value of demand met without the grid ($).
    pub savings: f32,
    /// Total cost for the step ($); currently equals `grid_cost`.
    pub total_cost: f32,
}

impl fmt::Display for CostBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "grid cost=${:.2}  savings=${:.2}  total=${:.2}",
            self.grid_cost, self.savings, self.total_cost
        )
    }
}

/// Computes cost and savings for one allocation.
///
/// `savings = (demand - grid) * price`, demand-based. A negative grid value
/// never inflates savings past the full demand value.
pub fn cost_breakdown(allocation: &Allocation, demand_kw: f32, price_per_kwh: f32) -> CostBreakdown {
    let grid_cost = allocation.grid_kw * price_per_kwh;
    let savings = if allocation.grid_kw >= 0.0 {
        (demand_kw - allocation.grid_kw) * price_per_kwh
    } else {
        demand_kw * price_per_kwh
    };
    CostBreakdown {
        grid_cost,
        savings,
        total_cost: grid_cost,
    }
}

/// Per-step monetary projection over a simulated series.
///
/// Derived data only: holds no state beyond what the step records imply.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostRecord {
    /// Cost of this step's grid power ($).
    pub grid_cost: f32,
    /// Value of consumer delivery not sourced from the grid ($).
    pub savings: f32,
    /// Running sum of `savings` in step order ($).
    pub cumulative_savings: f32,
}

/// Projects a simulated series into per-step costs with running savings.
///
/// `savings = (consumer - grid) * price`, consumer-based, unlike
/// [`cost_breakdown`]. Negative grid falls back to `consumer * price`.
pub fn cumulative_costs(records: &[StepRecord], price_per_kwh: f32) -> Vec<CostRecord> {
    let mut cumulative = 0.0;
    records
        .iter()
        .map(|record| {
            let grid_cost = record.grid_kw * price_per_kwh;
            let savings = if record.grid_kw >= 0.0 {
                (record.consumer_kw - record.grid_kw) * price_per_kwh
            } else {
                record.consumer_kw * price_per_kwh
            };
            cumulative += savings;
            CostRecord {
                grid_cost,
                savings,
                cumulative_savings: cumulative,
            }
        })
        .collect()
}

/// Aggregate report over a complete run, computed post-hoc from the step and
/// cost records so the table and the summary can never disagree.
#[derive(Debug, Clone)]
pub struct CostReport {
    /// Sum of per-step grid costs ($).
    pub total_grid_cost: f32,
    /// Final cumulative savings ($).
    pub total_savings: f32,
    /// Largest grid draw across the run (kW).
    pub peak_grid_kw: f32,
    /// Total battery energy moved, charge plus discharge (kWh).
    pub battery_throughput_kwh: f32,
    /// Steps where delivery fell short of demand.
    pub shortfall_hours: usize,
}

impl CostReport {
    /// Builds the report from matching step and cost record slices.
    pub fn from_records(records: &[StepRecord], costs: &[CostRecord], demand_kw: f32) -> Self {
        let mut total_grid_cost = 0.0_f32;
        let mut peak_grid_kw = 0.0_f32;
        let mut battery_throughput_kwh = 0.0_f32;
        let mut shortfall_hours = 0_usize;

        for record in records {
            peak_grid_kw = peak_grid_kw.max(record.grid_kw);
            battery_throughput_kwh += record.battery_change_kwh.abs();
            if record.consumer_kw + 1e-3 < demand_kw {
                shortfall_hours += 1;
            }
        }
        for cost in costs {
            total_grid_cost += cost.grid_cost;
        }
        let total_savings = costs.last().map_or(0.0, |c| c.cumulative_savings);

        Self {
            total_grid_cost,
            total_savings,
            peak_grid_kw,
            battery_throughput_kwh,
            shortfall_hours,
        }
    }
}

impl fmt::Display for CostReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Cost Report ---")?;
        writeln!(f, "Total grid cost:     ${:.2}", self.total_grid_cost)?;
        writeln!(f, "Total savings:       ${:.2}", self.total_savings)?;
        writeln!(f, "Peak grid draw:      {:.2} kW", self.peak_grid_kw)?;
        writeln!(
            f,
            "Battery throughput:  {:.2} kWh",
            self.battery_throughput_kwh
        )?;
        write!(f, "Shortfall hours:     {}", self.shortfall_hours)
    }
}
