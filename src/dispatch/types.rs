//! Core dispatch types: allocator inputs, allocation results, and validation errors.

use std::fmt;

/// Inputs to a single dispatch decision.
///
/// All four values describe one timestep: the forecast solar supply, the
/// consumer demand competing for it, and the battery state that may absorb
/// surplus or cover deficit.
#[derive(Debug, Clone, Copy)]
pub struct DispatchInput {
    /// Predicted solar output (kW, >= 0).
    pub solar_kw: f32,
    /// Consumer demand (kW, >= 0).
    pub demand_kw: f32,
    /// Battery capacity (kWh, >= 0).
    pub capacity_kwh: f32,
    /// Current battery level (kWh, in `[0, capacity_kwh]`).
    pub level_kwh: f32,
}

impl DispatchInput {
    /// Checks all input ranges, returning the first violation found.
    ///
    /// Runs before any allocator so that out-of-range values never reach the
    /// solver or get clamped silently.
    ///
    /// # Errors
    ///
    /// Returns a `DispatchError` naming the offending field when a value is
    /// non-finite, negative, or when `level_kwh > capacity_kwh`.
    pub fn validate(&self) -> Result<(), DispatchError> {
        let checks = [
            ("solar_kw", self.solar_kw),
            ("demand_kw", self.demand_kw),
            ("capacity_kwh", self.capacity_kwh),
            ("level_kwh", self.level_kwh),
        ];
        for (field, value) in checks {
            if !value.is_finite() {
                return Err(DispatchError::new(field, "must be finite"));
            }
            if value < 0.0 {
                return Err(DispatchError::new(field, "must be >= 0"));
            }
        }
        if self.level_kwh > self.capacity_kwh {
            return Err(DispatchError::new("level_kwh", "must be <= capacity_kwh"));
        }
        Ok(())
    }
}

/// Result of distributing one timestep's solar supply.
///
/// Immutable once produced. Energy balance on the rule-based path:
/// every kW of supply is accounted for among consumer, battery, and grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Allocation {
    /// Power delivered to the consumer (kW, >= 0).
    pub consumer_kw: f32,
    /// Signed battery flow for this step (kWh over the hour; positive = charge).
    pub battery_change_kwh: f32,
    /// Grid power (kW): draw under the optimizing policy, surplus export
    /// under the rule-based surplus branch.
    pub grid_kw: f32,
}

impl Allocation {
    /// Unmet demand after solar and battery contributions (kW, >= 0).
    ///
    /// Shortfall is data, not an error: the rule-based policy deliberately
    /// leaves demand uncovered rather than drawing from the grid.
    pub fn shortfall_kw(&self, demand_kw: f32) -> f32 {
        (demand_kw - self.consumer_kw).max(0.0)
    }
}

impl fmt::Display for Allocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "consumer={:.2} kW  battery={:+.2} kWh  grid={:.2} kW",
            self.consumer_kw, self.battery_change_kwh, self.grid_kw
        )
    }
}

/// Dispatch input validation error with field name and constraint description.
#[derive(Debug, Clone)]
pub struct DispatchError {
    /// Name of the offending input field (e.g., `"demand_kw"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl DispatchError {
    pub(crate) fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dispatch error: {} — {}", self.field, self.message)
    }
}
