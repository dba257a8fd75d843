//! TOML-based scenario configuration and weather presets.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::dispatch::DispatchStrategy;

/// Top-level scenario configuration parsed from TOML.
///
/// All fields default to the `sunny` scenario. Load from TOML with
/// [`ScenarioConfig::from_toml_file`] or pick a named preset with
/// [`ScenarioConfig::from_preset`].
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScenarioConfig {
    /// Horizon, timing, seed, and dispatch parameters.
    #[serde(default)]
    pub simulation: SimulationConfig,
    /// Base weather conditions before per-step perturbation.
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Demand and plant parameters.
    #[serde(default)]
    pub site: SiteConfig,
    /// Battery bounds and starting level.
    #[serde(default)]
    pub battery: BatteryConfig,
}

/// Horizon, timing, seed, and dispatch parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Number of hourly steps to simulate (>= 1).
    pub horizon_hours: u32,
    /// Hour of day at which the run starts (0–23).
    pub start_hour: u32,
    /// Day of year (1–365).
    pub day_of_year: u32,
    /// Master random seed for weather perturbation.
    pub seed: u64,
    /// Dispatch strategy: `"rule"` or `"optimal"`.
    pub dispatch: String,
    /// Grid electricity price ($/kWh).
    pub price_per_kwh: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            horizon_hours: 6,
            start_hour: 12,
            day_of_year: 180,
            seed: 42,
            dispatch: "optimal".to_string(),
            price_per_kwh: 0.15,
        }
    }
}

/// Base weather conditions before per-step perturbation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WeatherConfig {
    /// Solar irradiance (W/m², 0–1000).
    pub irradiance_wm2: f32,
    /// Cloud cover (%, 0–100).
    pub cloud_cover_pct: f32,
    /// Ambient temperature (°C, 0–40).
    pub temperature_c: f32,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        // The sunny preset.
        Self {
            irradiance_wm2: 800.0,
            cloud_cover_pct: 10.0,
            temperature_c: 30.0,
        }
    }
}

/// Demand and plant parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Constant consumer demand (kW).
    pub demand_kw: f32,
    /// Nominal plant capacity for the built-in forecast model (kW).
    pub panel_kw_peak: f32,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            demand_kw: 400.0,
            panel_kw_peak: 1000.0,
        }
    }
}

/// Battery bounds and starting level.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BatteryConfig {
    /// Battery capacity (kWh).
    pub capacity_kwh: f32,
    /// Battery level at the start of the run (kWh).
    pub initial_level_kwh: f32,
}

impl Default for BatteryConfig {
    fn default() -> Self {
        Self {
            capacity_kwh: 200.0,
            initial_level_kwh: 100.0,
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"simulation.horizon_hours"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {} — {}", self.field, self.message)
    }
}

impl ScenarioConfig {
    /// Returns the sunny preset (clear sky, the default scenario).
    pub fn sunny() -> Self {
        Self {
            simulation: SimulationConfig::default(),
            weather: WeatherConfig::default(),
            site: SiteConfig::default(),
            battery: BatteryConfig::default(),
        }
    }

    /// Returns the cloudy preset: weak irradiance under heavy cover.
    pub fn cloudy() -> Self {
        Self {
            weather: WeatherConfig {
                irradiance_wm2: 300.0,
                cloud_cover_pct: 70.0,
                temperature_c: 20.0,
            },
            ..Self::sunny()
        }
    }

    /// Returns the stormy preset: minimal output, shortfall territory.
    pub fn stormy() -> Self {
        Self {
            weather: WeatherConfig {
                irradiance_wm2: 100.0,
                cloud_cover_pct: 90.0,
                temperature_c: 15.0,
            },
            ..Self::sunny()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["sunny", "cloudy", "stormy"];

    /// Loads a scenario from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "sunny" => Ok(Self::sunny()),
            "cloudy" => Ok(Self::cloudy()),
            "stormy" => Ok(Self::stormy()),
            _ => Err(ConfigError {
                field: "preset".to_string(),
                message: format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            }),
        }
    }

    /// Parses a scenario from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError {
            field: "scenario".to_string(),
            message: format!("cannot read \"{}\": {e}", path.display()),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a scenario from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError {
            field: "toml".to_string(),
            message: e.to_string(),
        })
    }

    /// Parses the configured dispatch strategy.
    pub fn strategy(&self) -> Option<DispatchStrategy> {
        DispatchStrategy::from_name(&self.simulation.dispatch)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let s = &self.simulation;

        if s.horizon_hours == 0 {
            errors.push(ConfigError {
                field: "simulation.horizon_hours".into(),
                message: "must be >= 1".into(),
            });
        }
        if s.start_hour > 23 {
            errors.push(ConfigError {
                field: "simulation.start_hour".into(),
                message: "must be in 0..=23".into(),
            });
        }
        if !(1..=365).contains(&s.day_of_year) {
            errors.push(ConfigError {
                field: "simulation.day_of_year".into(),
                message: "must be in 1..=365".into(),
            });
        }
        if self.strategy().is_none() {
            errors.push(ConfigError {
                field: "simulation.dispatch".into(),
                message: format!(
                    "must be one of {}, got \"{}\"",
                    DispatchStrategy::NAMES.join(", "),
                    s.dispatch
                ),
            });
        }
        if !(s.price_per_kwh.is_finite() && s.price_per_kwh >= 0.0) {
            errors.push(ConfigError {
                field: "simulation.price_per_kwh".into(),
                message: "must be >= 0".into(),
            });
        }

        let w = &self.weather;
        if !(0.0..=1000.0).contains(&w.irradiance_wm2) {
            errors.push(ConfigError {
                field: "weather.irradiance_wm2".into(),
                message: "must be in [0, 1000]".into(),
            });
        }
        if !(0.0..=100.0).contains(&w.cloud_cover_pct) {
            errors.push(ConfigError {
                field: "weather.cloud_cover_pct".into(),
                message: "must be in [0, 100]".into(),
            });
        }
        if !(0.0..=40.0).contains(&w.temperature_c) {
            errors.push(ConfigError {
                field: "weather.temperature_c".into(),
                message: "must be in [0, 40]".into(),
            });
        }

        let site = &self.site;
        if !(site.demand_kw.is_finite() && site.demand_kw >= 0.0) {
            errors.push(ConfigError {
                field: "site.demand_kw".into(),
                message: "must be >= 0".into(),
            });
        }
        if !(site.panel_kw_peak.is_finite() && site.panel_kw_peak >= 0.0) {
            errors.push(ConfigError {
                field: "site.panel_kw_peak".into(),
                message: "must be >= 0".into(),
            });
        }

        let battery = &self.battery;
        if !(battery.capacity_kwh.is_finite() && battery.capacity_kwh >= 0.0) {
            errors.push(ConfigError {
                field: "battery.capacity_kwh".into(),
                message: "must be >= 0".into(),
            });
        }
        if !(0.0..=battery.capacity_kwh).contains(&battery.initial_level_kwh) {
            errors.push(ConfigError {
                field: "battery.initial_level_kwh".into(),
                message: "must be in [0, battery.capacity_kwh]".into(),
            });
        }

        errors
    }
}
