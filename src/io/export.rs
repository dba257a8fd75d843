//! CSV export for cost-annotated simulation results.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::cost::CostRecord;
use crate::sim::StepRecord;

/// Column header for CSV export.
const HEADER: &str = "hour,solar_kw,consumer_kw,battery_change_kwh,battery_level_kwh,\
                      grid_kw,irradiance_wm2,cloud_cover_pct,temperature_c,\
                      grid_cost,savings,cumulative_savings";

/// Exports a cost-annotated run to a CSV file at the given path.
///
/// # Arguments
///
/// * `records` - Complete simulation step records
/// * `costs` - Matching cost records from [`crate::cost::cumulative_costs`]
/// * `path` - Output file path
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(records: &[StepRecord], costs: &[CostRecord], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(records, costs, buf)
}

/// Writes a cost-annotated run as CSV to any writer.
///
/// One row per step; the step and cost slices are zipped, so rows beyond the
/// shorter slice are dropped. Output is deterministic for identical inputs.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(
    records: &[StepRecord],
    costs: &[CostRecord],
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);

    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for (record, cost) in records.iter().zip(costs.iter()) {
        wtr.write_record(&[
            record.hour.to_string(),
            format!("{:.4}", record.solar_kw),
            format!("{:.4}", record.consumer_kw),
            format!("{:.4}", record.battery_change_kwh),
            format!("{:.4}", record.battery_level_kwh),
            format!("{:.4}", record.grid_kw),
            format!("{:.4}", record.irradiance_wm2),
            format!("{:.4}", record.cloud_cover_pct),
            format!("{:.4}", record.temperature_c),
            format!("{:.4}", cost.grid_cost),
            format!("{:.4}", cost.savings),
            format!("{:.4}", cost.cumulative_savings),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
