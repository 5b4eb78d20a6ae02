//! CSV export of simulation history.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::grid::GridSnapshot;

const HEADER: &str = "time_s,frequency_hz,rocof_hz_per_s,generation_mw,consumption_mw,raw_imbalance_mw,\
                       nuclear_mw,hydro_reservoir_mw,run_of_river_mw,wind_mw,solar_mw,chp_mw,peakers_mw,net_import_mw,\
                       residential_heating_mw,residential_other_mw,services_mw,transport_mw,industry_mw,grid_losses_mw,\
                       bess_power_mw,ffr_mw";

/// Exports a tick history to a CSV file at `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_csv(history: &[GridSnapshot], path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    let buf = io::BufWriter::new(file);
    write_csv(history, buf)
}

/// Writes a tick history as CSV to any writer.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_csv(history: &[GridSnapshot], writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(HEADER.split(',').map(str::trim))?;

    for s in history {
        wtr.write_record(&[
            s.time_s.to_string(),
            format!("{:.4}", s.frequency_hz),
            format!("{:.6}", s.rocof_hz_per_s),
            format!("{:.4}", s.generation_mw),
            format!("{:.4}", s.consumption_mw),
            format!("{:.4}", s.raw_imbalance_mw),
            format!("{:.4}", s.supply.nuclear_mw),
            format!("{:.4}", s.supply.hydro_reservoir_mw),
            format!("{:.4}", s.supply.run_of_river_mw),
            format!("{:.4}", s.supply.wind_mw),
            format!("{:.4}", s.supply.solar_mw),
            format!("{:.4}", s.supply.chp_mw),
            format!("{:.4}", s.supply.peakers_mw),
            format!("{:.4}", s.supply.net_import_mw),
            format!("{:.4}", s.demand.residential_heating_mw),
            format!("{:.4}", s.demand.residential_other_mw),
            format!("{:.4}", s.demand.services_mw),
            format!("{:.4}", s.demand.transport_mw),
            format!("{:.4}", s.demand.industry_mw),
            format!("{:.4}", s.demand.grid_losses_mw),
            format!("{:.4}", s.bess_power_mw),
            format!("{:.4}", s.ffr_mw),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
