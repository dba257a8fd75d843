//! Shared test fixtures for integration tests.

use solarflow::dispatch::{DispatchInput, DispatchStrategy, Dispatcher};
use solarflow::forecast::ConstantForecast;
use solarflow::sim::{Engine, SimParams, SiteParams, Weather};

/// Default simulation parameters (6 hours from noon, day 180, seed 42).
pub fn default_params() -> SimParams {
    SimParams::new(6, 12, 180, 42)
}

/// Default site (400 kW demand, 200 kWh battery at 100 kWh).
pub fn default_site() -> SiteParams {
    SiteParams::new(400.0, 200.0, 100.0)
}

/// Sunny base weather (800 W/m², 10% cloud, 30 °C).
pub fn sunny_weather() -> Weather {
    Weather {
        irradiance_wm2: 800.0,
        cloud_cover_pct: 10.0,
        temperature_c: 30.0,
    }
}

/// Dispatch input from plain values, in allocator argument order.
pub fn dispatch_input(solar: f32, demand: f32, capacity: f32, level: f32) -> DispatchInput {
    DispatchInput {
        solar_kw: solar,
        demand_kw: demand,
        capacity_kwh: capacity,
        level_kwh: level,
    }
}

/// Rule-based engine over a constant forecast.
pub fn constant_engine(
    params: SimParams,
    site: SiteParams,
    forecast_kw: f32,
    strategy: DispatchStrategy,
) -> Engine<ConstantForecast> {
    Engine::new(
        params,
        site,
        sunny_weather(),
        ConstantForecast(forecast_kw),
        Dispatcher::new(strategy),
    )
}
