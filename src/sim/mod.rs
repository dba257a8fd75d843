//! Multi-hour simulation: engine, weather perturbation, and records.

pub mod engine;
pub mod types;
/// Seeded weather perturbation applied before each forecast call.
pub mod weather;

pub use engine::Engine;
pub use types::{SimParams, SiteParams, StepRecord};
pub use weather::{Weather, WeatherModel};
