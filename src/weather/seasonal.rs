//! Pure seasonal/diurnal target curves (spec §4.2: "follow cosine-of-day-of-year
//! curves"; "diurnal temperature uses a sine centred on hour 5").

use std::f32::consts::PI;

const DAYS_PER_YEAR: f32 = 365.0;

fn day_phase(day_of_year: u16, peak_day: f32) -> f32 {
    2.0 * PI * (f32::from(day_of_year) - peak_day) / DAYS_PER_YEAR
}

/// Seasonal cosine centred on `peak_day`, oscillating between `mean - amp`
/// and `mean + amp`.
pub fn seasonal_cosine(day_of_year: u16, mean: f32, amp: f32, peak_day: f32) -> f32 {
    mean + amp * day_phase(day_of_year, peak_day).cos()
}

/// Diurnal sine centred on hour 5 (coldest just before dawn), amplitude `amp`.
/// `hour_of_day` may be fractional.
pub fn diurnal_sine(hour_of_day: f32, amp: f32) -> f32 {
    -amp * (2.0 * PI * (hour_of_day - 5.0) / 24.0).cos()
}

/// Coarse solar elevation-angle proxy in \[-1, 1\] (sin of elevation), peaking
/// at local solar noon and tracking day length with season.
pub fn solar_elevation_sin(day_of_year: u16, hour_of_day: f32) -> f32 {
    let day_length_h = 12.0 + 4.5 * day_phase(day_of_year, 172.0).cos() * -1.0;
    let half = day_length_h / 2.0;
    let sunrise = 12.0 - half;
    let sunset = 12.0 + half;
    if hour_of_day <= sunrise || hour_of_day >= sunset {
        return -0.05;
    }
    let frac = (hour_of_day - sunrise) / (sunset - sunrise);
    let max_elev_sin = 0.3 + 0.6 * day_phase(day_of_year, 172.0).cos() * -1.0;
    max_elev_sin.clamp(0.1, 0.95) * (PI * frac).sin()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seasonal_cosine_peaks_at_peak_day() {
        let v = seasonal_cosine(172, 10.0, 10.0, 172.0);
        assert!((v - 20.0).abs() < 1e-3);
    }

    #[test]
    fn diurnal_sine_minimum_at_hour_five() {
        let v5 = diurnal_sine(5.0, 3.0);
        let v17 = diurnal_sine(17.0, 3.0);
        assert!(v5 < v17);
    }

    #[test]
    fn solar_elevation_negative_at_midnight() {
        assert!(solar_elevation_sin(172, 0.0) < 0.0);
    }

    #[test]
    fn solar_elevation_positive_at_noon() {
        assert!(solar_elevation_sin(172, 12.0) > 0.0);
    }
}
