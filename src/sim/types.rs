//! Simulation parameters and per-step output records.

use std::fmt;

/// Timing and reproducibility parameters for one simulation run.
#[derive(Debug, Clone)]
pub struct SimParams {
    /// Number of hourly steps to simulate (>= 1).
    pub horizon_hours: u32,
    /// Hour of day at which the run starts (0–23).
    pub start_hour: u32,
    /// Day of year for the whole run (1–365).
    pub day_of_year: u32,
    /// Master random seed for weather perturbation.
    pub seed: u64,
}

impl SimParams {
    /// Creates validated simulation parameters.
    ///
    /// # Panics
    ///
    /// Panics if `horizon_hours` is zero, `start_hour > 23`, or
    /// `day_of_year` is outside `1..=365`.
    pub fn new(horizon_hours: u32, start_hour: u32, day_of_year: u32, seed: u64) -> Self {
        assert!(horizon_hours >= 1, "horizon_hours must be >= 1");
        assert!(start_hour <= 23, "start_hour must be in 0..=23");
        assert!(
            (1..=365).contains(&day_of_year),
            "day_of_year must be in 1..=365"
        );
        Self {
            horizon_hours,
            start_hour,
            day_of_year,
            seed,
        }
    }
}

/// Fixed site parameters: the demand competing for supply and the battery
/// bounds.
#[derive(Debug, Clone)]
pub struct SiteParams {
    /// Constant consumer demand (kW, >= 0).
    pub demand_kw: f32,
    /// Battery capacity (kWh, >= 0).
    pub capacity_kwh: f32,
    /// Battery level at the start of the run (kWh, in `[0, capacity_kwh]`).
    pub initial_level_kwh: f32,
}

impl SiteParams {
    /// Creates validated site parameters.
    ///
    /// # Panics
    ///
    /// Panics if demand or capacity is negative, or the initial level lies
    /// outside `[0, capacity_kwh]`.
    pub fn new(demand_kw: f32, capacity_kwh: f32, initial_level_kwh: f32) -> Self {
        assert!(demand_kw >= 0.0, "demand_kw must be >= 0");
        assert!(capacity_kwh >= 0.0, "capacity_kwh must be >= 0");
        assert!(
            (0.0..=capacity_kwh).contains(&initial_level_kwh),
            "initial_level_kwh must be in [0, capacity_kwh]"
        );
        Self {
            demand_kw,
            capacity_kwh,
            initial_level_kwh,
        }
    }
}

/// Complete record of one simulated hour.
///
/// Created once per step and immutable afterwards; the weather fields hold
/// the perturbed values actually fed to the forecast, not the base scenario
/// values.
#[derive(Debug, Clone)]
pub struct StepRecord {
    /// Hour of day for this step (0–23, wraps across midnight).
    pub hour: u32,
    /// Predicted solar output (kW).
    pub solar_kw: f32,
    /// Power delivered to the consumer (kW).
    pub consumer_kw: f32,
    /// Signed battery flow (kWh; positive = charge).
    pub battery_change_kwh: f32,
    /// Battery level after this step's clamp (kWh); also the carry-over
    /// into the next step.
    pub battery_level_kwh: f32,
    /// Grid power (kW).
    pub grid_kw: f32,
    /// Perturbed irradiance used for this step (W/m²).
    pub irradiance_wm2: f32,
    /// Perturbed cloud cover used for this step (%).
    pub cloud_cover_pct: f32,
    /// Perturbed temperature used for this step (°C).
    pub temperature_c: f32,
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "h={:>2} | solar={:>7.2} kW  consumer={:>7.2} kW  \
             battery={:>+8.2} kWh (level={:>7.2})  grid={:>7.2} kW | \
             irr={:>6.1} W/m2  cloud={:>5.1}%  temp={:>4.1}C",
            self.hour,
            self.solar_kw,
            self.consumer_kw,
            self.battery_change_kwh,
            self.battery_level_kwh,
            self.grid_kw,
            self.irradiance_wm2,
            self.cloud_cover_pct,
            self.temperature_c,
        )
    }
}
