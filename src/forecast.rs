//! Solar output forecasting contract and built-in estimator.

use std::f32::consts::PI;

/// Weather and calendar features handed to a forecast model for one hour.
#[derive(Debug, Clone, Copy)]
pub struct ForecastInputs {
    /// Hour of day (0–23).
    pub hour: u32,
    /// Day of year (1–365).
    pub day_of_year: u32,
    /// Solar irradiance (W/m², 0–1000).
    pub irradiance_wm2: f32,
    /// Cloud cover (%, 0–100).
    pub cloud_cover_pct: f32,
    /// Ambient temperature (°C, 0–40).
    pub temperature_c: f32,
}

/// Predicts solar output from weather and calendar features.
///
/// External collaborator contract: implementations must be deterministic for
/// identical inputs and return a non-negative value. The simulation engine
/// treats the model as a black box.
pub trait SolarForecast {
    /// Predicted plant output in kW (>= 0).
    fn predict_kw(&self, inputs: &ForecastInputs) -> f32;
}

/// Deterministic physical estimate of plant output.
///
/// Stands in for a trained model when none is wired up: nominal capacity
/// scaled by irradiance, a half-cosine daylight profile, a seasonal factor,
/// cloud attenuation, and a high-temperature derate.
#[derive(Debug, Clone, Copy)]
pub struct ClearSkyModel {
    /// Nominal plant capacity at 1000 W/m² (kW).
    pub kw_peak: f32,
}

/// Hour at which generation starts (inclusive).
const SUNRISE_HOUR: f32 = 6.0;
/// Hour at which generation ends (exclusive).
const SUNSET_HOUR: f32 = 18.0;
/// Output lost per percent of cloud cover.
const CLOUD_ATTENUATION: f32 = 0.007;
/// Output lost per °C above the rating temperature.
const TEMP_COEFF_PER_C: f32 = 0.004;
/// Cell rating temperature (°C).
const RATING_TEMP_C: f32 = 25.0;

impl ClearSkyModel {
    /// Creates a model for a plant of the given nominal capacity.
    ///
    /// Negative capacities are clamped to zero.
    pub fn new(kw_peak: f32) -> Self {
        Self {
            kw_peak: kw_peak.max(0.0),
        }
    }

    /// Half-cosine daylight fraction: 0 outside [sunrise, sunset), peaking at
    /// solar noon.
    fn daylight_frac(hour: u32) -> f32 {
        let h = hour as f32;
        if h < SUNRISE_HOUR || h >= SUNSET_HOUR {
            return 0.0;
        }
        let x = (h - SUNRISE_HOUR) / (SUNSET_HOUR - SUNRISE_HOUR);
        (PI * x).sin()
    }

    /// Seasonal capacity factor peaking at the summer solstice.
    fn seasonal_frac(day_of_year: u32) -> f32 {
        let phase = 2.0 * PI * (day_of_year as f32 - 172.0) / 365.0;
        0.85 + 0.15 * phase.cos()
    }
}

impl SolarForecast for ClearSkyModel {
    fn predict_kw(&self, inputs: &ForecastInputs) -> f32 {
        let irradiance_frac = (inputs.irradiance_wm2 / 1000.0).clamp(0.0, 1.0);
        let cloud_factor = 1.0 - CLOUD_ATTENUATION * inputs.cloud_cover_pct.clamp(0.0, 100.0);
        let temp_derate = 1.0 - TEMP_COEFF_PER_C * (inputs.temperature_c - RATING_TEMP_C).max(0.0);

        let kw = self.kw_peak
            * irradiance_frac
            * Self::daylight_frac(inputs.hour)
            * Self::seasonal_frac(inputs.day_of_year)
            * cloud_factor
            * temp_derate;
        kw.max(0.0)
    }
}

/// Fixed-output forecast for tests and demos.
#[derive(Debug, Clone, Copy)]
pub struct ConstantForecast(pub f32);

impl SolarForecast for ConstantForecast {
    fn predict_kw(&self, _inputs: &ForecastInputs) -> f32 {
        self.0.max(0.0)
    }
}
