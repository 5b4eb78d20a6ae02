//! Historical-replay source: a directory of CSVs for one day (spec §6
//! "Replay source"), read when `useSimulation=false`.

use std::collections::HashMap;
use std::path::Path;

use crate::error::LoadError;

/// Parses `HH:MM:SS` into seconds since midnight.
fn parse_time(file: &'static str, value: &str) -> Result<i32, LoadError> {
    let mut parts = value.splitn(3, ':');
    let (Some(h), Some(m), Some(s)) = (parts.next(), parts.next(), parts.next()) else {
        return Err(LoadError::BadCell { file, column: "time", value: value.to_string() });
    };
    let parse_part = |p: &str| p.parse::<i32>().map_err(|_| LoadError::BadCell { file, column: "time", value: value.to_string() });
    Ok(parse_part(h)? * 3600 + parse_part(m)? * 60 + parse_part(s)?)
}

fn parse_f32(file: &'static str, column: &'static str, value: &str) -> Result<f32, LoadError> {
    value.parse::<f32>().map_err(|_| LoadError::BadCell { file, column, value: value.to_string() })
}

fn read_csv(_file: &'static str, path: &Path) -> Result<csv::Reader<std::fs::File>, LoadError> {
    std::fs::File::open(path)
        .map(csv::Reader::from_reader)
        .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })
}

/// 1 Hz frequency trace for one simulated day, carried forward across any
/// missing seconds.
#[derive(Debug, Clone)]
pub struct FrequencyTrace {
    pub frequency_hz: Vec<f32>,
}

pub fn load_frequency(dir: &Path) -> Result<FrequencyTrace, LoadError> {
    const FILE: &str = "frequency.csv";
    let path = dir.join(FILE);
    let mut reader = read_csv(FILE, &path)?;

    let mut by_second: HashMap<i32, f32> = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(|_| LoadError::BadCell { file: FILE, column: "frequency_hz", value: String::new() })?;
        let time = record.get(0).ok_or(LoadError::MissingColumn { file: FILE, column: "time" })?;
        let freq = record.get(1).ok_or(LoadError::MissingColumn { file: FILE, column: "frequency_hz" })?;
        by_second.insert(parse_time(FILE, time)?, parse_f32(FILE, "frequency_hz", freq)?);
    }

    let mut frequency_hz = Vec::with_capacity(86_400);
    let mut last: Option<f32> = None;
    for t in 0..86_400 {
        let value = match by_second.get(&t) {
            Some(&v) => v,
            None => last.ok_or(LoadError::MissingRow { file: FILE, time: t.to_string() })?,
        };
        last = Some(value);
        frequency_hz.push(value);
    }

    Ok(FrequencyTrace { frequency_hz })
}

/// 15-minute resolution production breakdown for one simulated day.
#[derive(Debug, Clone, Default)]
pub struct ProductionRow {
    pub hydro: f32,
    pub nuclear: f32,
    pub solar: f32,
    pub thermal: f32,
    pub wind: f32,
    pub wind_offshore: f32,
    pub energy_storage: f32,
    pub other: f32,
    pub total: f32,
}

pub fn load_production(dir: &Path) -> Result<Vec<ProductionRow>, LoadError> {
    const FILE: &str = "production.csv";
    let path = dir.join(FILE);
    let mut reader = read_csv(FILE, &path)?;

    let headers = reader.headers().map_err(|_| LoadError::MissingColumn { file: FILE, column: "time" })?.clone();
    let col = |name: &'static str| -> Result<usize, LoadError> {
        headers.iter().position(|h| h == name).ok_or(LoadError::MissingColumn { file: FILE, column: name })
    };
    let (time_i, hydro_i, nuclear_i, solar_i, thermal_i, wind_i, wind_offshore_i, storage_i, other_i, total_i) = (
        col("time")?, col("hydro")?, col("nuclear")?, col("solar")?, col("thermal")?,
        col("wind")?, col("wind_offshore")?, col("energy_storage")?, col("other")?, col("total")?,
    );

    let mut by_slot: HashMap<i32, ProductionRow> = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(|_| LoadError::BadCell { file: FILE, column: "total", value: String::new() })?;
        let get = |i: usize, column: &'static str| -> Result<f32, LoadError> {
            parse_f32(FILE, column, record.get(i).ok_or(LoadError::MissingColumn { file: FILE, column })?)
        };
        let time_s = parse_time(FILE, record.get(time_i).ok_or(LoadError::MissingColumn { file: FILE, column: "time" })?)?;
        by_slot.insert(time_s / 900, ProductionRow {
            hydro: get(hydro_i, "hydro")?,
            nuclear: get(nuclear_i, "nuclear")?,
            solar: get(solar_i, "solar")?,
            thermal: get(thermal_i, "thermal")?,
            wind: get(wind_i, "wind")?,
            wind_offshore: get(wind_offshore_i, "wind_offshore")?,
            energy_storage: get(storage_i, "energy_storage")?,
            other: get(other_i, "other")?,
            total: get(total_i, "total")?,
        });
    }

    let mut rows = Vec::with_capacity(96);
    let mut last: Option<ProductionRow> = None;
    for slot in 0..96 {
        let row = match by_slot.remove(&slot) {
            Some(r) => r,
            None => last.clone().ok_or(LoadError::MissingRow { file: FILE, time: slot.to_string() })?,
        };
        last = Some(row.clone());
        rows.push(row);
    }
    Ok(rows)
}

/// 15-minute resolution consumption breakdown for one simulated day.
#[derive(Debug, Clone, Default)]
pub struct ConsumptionRow {
    pub flex: f32,
    pub metered: f32,
    pub profiled: f32,
    pub total: f32,
}

pub fn load_consumption(dir: &Path) -> Result<Vec<ConsumptionRow>, LoadError> {
    const FILE: &str = "consumption.csv";
    let path = dir.join(FILE);
    let mut reader = read_csv(FILE, &path)?;

    let headers = reader.headers().map_err(|_| LoadError::MissingColumn { file: FILE, column: "time" })?.clone();
    let col = |name: &'static str| -> Result<usize, LoadError> {
        headers.iter().position(|h| h == name).ok_or(LoadError::MissingColumn { file: FILE, column: name })
    };
    let (time_i, flex_i, metered_i, profiled_i, total_i) = (col("time")?, col("flex")?, col("metered")?, col("profiled")?, col("total")?);

    let mut by_slot: HashMap<i32, ConsumptionRow> = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(|_| LoadError::BadCell { file: FILE, column: "total", value: String::new() })?;
        let get = |i: usize, column: &'static str| -> Result<f32, LoadError> {
            parse_f32(FILE, column, record.get(i).ok_or(LoadError::MissingColumn { file: FILE, column })?)
        };
        let time_s = parse_time(FILE, record.get(time_i).ok_or(LoadError::MissingColumn { file: FILE, column: "time" })?)?;
        by_slot.insert(time_s / 900, ConsumptionRow {
            flex: get(flex_i, "flex")?,
            metered: get(metered_i, "metered")?,
            profiled: get(profiled_i, "profiled")?,
            total: get(total_i, "total")?,
        });
    }

    let mut rows = Vec::with_capacity(96);
    let mut last: Option<ConsumptionRow> = None;
    for slot in 0..96 {
        let row = match by_slot.remove(&slot) {
            Some(r) => r,
            None => last.clone().ok_or(LoadError::MissingRow { file: FILE, time: slot.to_string() })?,
        };
        last = Some(row.clone());
        rows.push(row);
    }
    Ok(rows)
}

/// Hourly market prices for one simulated day.
#[derive(Debug, Clone, Default)]
pub struct PriceRow {
    pub day_ahead: f32,
    pub fcrn: f32,
    pub imbalance_up: f32,
    pub imbalance_down: f32,
}

pub fn load_prices(dir: &Path) -> Result<Vec<PriceRow>, LoadError> {
    const FILE: &str = "prices.csv";
    let path = dir.join(FILE);
    let mut reader = read_csv(FILE, &path)?;

    let headers = reader.headers().map_err(|_| LoadError::MissingColumn { file: FILE, column: "time" })?.clone();
    let col = |name: &'static str| -> Result<usize, LoadError> {
        headers.iter().position(|h| h == name).ok_or(LoadError::MissingColumn { file: FILE, column: name })
    };
    let (time_i, da_i, fcrn_i, up_i, down_i) = (col("time")?, col("day_ahead")?, col("fcrn")?, col("imbalance_up")?, col("imbalance_down")?);

    let mut by_hour: HashMap<i32, PriceRow> = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(|_| LoadError::BadCell { file: FILE, column: "day_ahead", value: String::new() })?;
        let get = |i: usize, column: &'static str| -> Result<f32, LoadError> {
            parse_f32(FILE, column, record.get(i).ok_or(LoadError::MissingColumn { file: FILE, column })?)
        };
        let time_s = parse_time(FILE, record.get(time_i).ok_or(LoadError::MissingColumn { file: FILE, column: "time" })?)?;
        by_hour.insert(time_s / 3600, PriceRow {
            day_ahead: get(da_i, "day_ahead")?,
            fcrn: get(fcrn_i, "fcrn")?,
            imbalance_up: get(up_i, "imbalance_up")?,
            imbalance_down: get(down_i, "imbalance_down")?,
        });
    }

    let mut rows = Vec::with_capacity(24);
    let mut last: Option<PriceRow> = None;
    for hour in 0..24 {
        let row = match by_hour.remove(&hour) {
            Some(r) => r,
            None => last.clone().ok_or(LoadError::MissingRow { file: FILE, time: hour.to_string() })?,
        };
        last = Some(row.clone());
        rows.push(row);
    }
    Ok(rows)
}

/// A full day's replay data, loaded from a directory of CSVs.
#[derive(Debug, Clone)]
pub struct ReplayDay {
    pub frequency: FrequencyTrace,
    pub production: Vec<ProductionRow>,
    pub consumption: Vec<ConsumptionRow>,
    pub prices: Vec<PriceRow>,
}

pub fn load_day(dir: &Path) -> Result<ReplayDay, LoadError> {
    Ok(ReplayDay {
        frequency: load_frequency(dir)?,
        production: load_production(dir)?,
        consumption: load_consumption(dir)?,
        prices: load_prices(dir)?,
    })
}
