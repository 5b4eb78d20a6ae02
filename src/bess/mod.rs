//! Battery fleet: per-unit SoC accounting and DA/FCR/auto market allocation
//! with an FCR-N direction latch (spec §4.8).

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Mode {
    None,
    Charge,
    Discharge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum Market {
    Da,
    Fcr,
    Auto,
    Inactive,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BessUnitConfig {
    pub max_power_mw: f32,
    pub capacity_mwh: f32,
    pub round_trip_efficiency: f32,
    pub initial_soc01: f32,
}

impl Default for BessUnitConfig {
    fn default() -> Self {
        Self { max_power_mw: 10.0, capacity_mwh: 20.0, round_trip_efficiency: 0.90, initial_soc01: 0.5 }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BessUnit {
    pub config_max_power_mw: f32,
    pub config_capacity_mwh: f32,
    pub config_round_trip_efficiency: f32,
    pub soc01: f32,
    pub current_power_mw: f32,
    pub mode: Mode,
    pub market: Market,
    pub cumulative_charged_mwh: f32,
    pub cumulative_discharged_mwh: f32,
    pub clipped: bool,
}

impl BessUnit {
    pub fn new(config: &BessUnitConfig) -> Self {
        Self {
            config_max_power_mw: config.max_power_mw,
            config_capacity_mwh: config.capacity_mwh,
            config_round_trip_efficiency: config.round_trip_efficiency,
            soc01: config.initial_soc01.clamp(0.0, 1.0),
            current_power_mw: 0.0,
            mode: Mode::None,
            market: Market::Inactive,
            cumulative_charged_mwh: 0.0,
            cumulative_discharged_mwh: 0.0,
            clipped: false,
        }
    }

    /// `target_mw` is signed: positive = discharge, negative = charge.
    fn step(&mut self, target_mw: f32, dt_s: f32) {
        let target = target_mw.clamp(-self.config_max_power_mw, self.config_max_power_mw);
        let sqrt_eta = self.config_round_trip_efficiency.max(1e-6).sqrt();

        let stored_mwh = self.soc01 as f64 * self.config_capacity_mwh as f64;
        let delta_mwh = if target >= 0.0 {
            -(target as f64) * dt_s as f64 / 3600.0
        } else {
            -(target as f64) * dt_s as f64 / 3600.0 * sqrt_eta as f64
        };

        let new_stored = stored_mwh + delta_mwh;
        let clamped_stored = new_stored.clamp(0.0, self.config_capacity_mwh as f64);
        self.clipped = (clamped_stored - new_stored).abs() > 1e-9 * self.config_capacity_mwh as f64;

        let actual_power_mw = if self.clipped {
            let achievable_delta = clamped_stored - stored_mwh;
            if target >= 0.0 {
                (-achievable_delta * 3600.0 / dt_s as f64) as f32
            } else {
                (-achievable_delta * 3600.0 / (dt_s as f64 * sqrt_eta as f64)) as f32
            }
        } else {
            target
        };

        self.current_power_mw = actual_power_mw;
        self.soc01 = if self.config_capacity_mwh > 0.0 {
            (clamped_stored / self.config_capacity_mwh as f64) as f32
        } else {
            0.0
        };

        if actual_power_mw > 0.0 {
            self.cumulative_discharged_mwh += actual_power_mw * dt_s / 3600.0;
        } else if actual_power_mw < 0.0 {
            self.cumulative_charged_mwh += -actual_power_mw * dt_s / 3600.0;
        }

        if self.mode != Mode::None && (self.soc01 <= 1e-6 || self.soc01 >= 1.0 - 1e-6) {
            self.mode = Mode::None;
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BessFleetConfig {
    pub units: Vec<BessUnitConfig>,
}

/// Length-24 signed MW day-ahead bid and non-negative MW FCR bid, one entry
/// per hour (spec §3 "Bids").
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "api", derive(serde::Serialize))]
pub struct Bids {
    pub da_mw: [f32; 24],
    pub fcr_mw: [f32; 24],
}

pub struct BessFleet {
    units: Vec<BessUnit>,
    fcr_latch_timer_s: f32,
    fcr_latch_sign: i8,
    fcr_active_direction: i8,
    da_hour: Option<usize>,
    da_delivered_mwh_this_hour: f32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BessFleetBreakdown {
    pub total_power_mw: f32,
    pub fcr_required_mw: f32,
}

impl BessFleet {
    pub fn new(config: &BessFleetConfig) -> Self {
        let units = if config.units.is_empty() {
            vec![BessUnit::new(&BessUnitConfig::default())]
        } else {
            config.units.iter().map(BessUnit::new).collect()
        };
        Self {
            units,
            fcr_latch_timer_s: 0.0,
            fcr_latch_sign: 0,
            fcr_active_direction: 0,
            da_hour: None,
            da_delivered_mwh_this_hour: 0.0,
        }
    }

    pub fn units(&self) -> &[BessUnit] {
        &self.units
    }

    pub fn set_unit_mode(&mut self, id: usize, mode: Mode) -> Option<()> {
        self.units.get_mut(id).map(|u| u.mode = mode)
    }

    pub fn set_unit_market(&mut self, id: usize, market: Market) -> Option<()> {
        self.units.get_mut(id).map(|u| u.market = market)
    }

    fn update_fcr_latch(&mut self, frequency_hz: f32, dt_s: f32) {
        if frequency_hz == 50.0 {
            self.fcr_latch_timer_s = 0.0;
            self.fcr_latch_sign = 0;
            self.fcr_active_direction = 0;
            return;
        }
        let sign: i8 = if frequency_hz < 50.0 { -1 } else { 1 };
        if sign == self.fcr_latch_sign {
            self.fcr_latch_timer_s += dt_s;
        } else {
            self.fcr_latch_sign = sign;
            self.fcr_latch_timer_s = dt_s;
        }
        if self.fcr_latch_timer_s >= 3.0 {
            self.fcr_active_direction = sign;
        }
    }

    /// `seconds_remaining_in_hour` must be > 0; callers clamp via a floor to
    /// avoid the divide-by-near-zero described for the DA controller.
    pub fn step(
        &mut self,
        bids: &Bids,
        hour: usize,
        seconds_remaining_in_hour: f32,
        frequency_hz: f32,
        dt_s: f32,
    ) -> BessFleetBreakdown {
        self.update_fcr_latch(frequency_hz, dt_s);

        if self.da_hour != Some(hour) {
            self.da_hour = Some(hour);
            self.da_delivered_mwh_this_hour = 0.0;
        }

        let da_bid_mw = bids.da_mw[hour];
        let fcr_bid_mw = bids.fcr_mw[hour];

        // Manual-mode units are excluded from both group capacities and
        // market auto-join.
        let mut da_group: Vec<usize> = Vec::new();
        let mut fcr_group: Vec<usize> = Vec::new();

        for i in 0..self.units.len() {
            if self.units[i].mode != Mode::None || self.units[i].market != Market::Auto {
                continue;
            }
            let fcr_capacity: f32 = self.units.iter().enumerate()
                .filter(|(j, u)| *j != i && u.mode == Mode::None && u.market == Market::Fcr)
                .map(|(_, u)| u.config_max_power_mw)
                .sum();
            self.units[i].market = if fcr_bid_mw > 0.0 && fcr_capacity < fcr_bid_mw {
                Market::Fcr
            } else if da_bid_mw != 0.0 {
                Market::Da
            } else {
                Market::Inactive
            };
        }

        for (i, unit) in self.units.iter().enumerate() {
            if unit.mode != Mode::None {
                continue;
            }
            match unit.market {
                Market::Da => da_group.push(i),
                Market::Fcr => fcr_group.push(i),
                _ => {}
            }
        }

        let da_group_capacity: f32 = da_group.iter().map(|&i| self.units[i].config_max_power_mw).sum();
        let fcr_group_capacity: f32 = fcr_group.iter().map(|&i| self.units[i].config_max_power_mw).sum();

        // Target the bid's *remaining* undelivered energy for the hour, not
        // the full nominal bid every tick, so the group converges on the
        // bid's total MWh rather than over-delivering once capacity allows
        // a higher instantaneous rate (spec §4.8).
        let remaining_da_mwh = da_bid_mw - self.da_delivered_mwh_this_hour;
        let floored_seconds = seconds_remaining_in_hour.max(1.0);
        let da_group_target_mw = if da_group_capacity > 0.0 {
            (remaining_da_mwh * 3600.0 / floored_seconds).clamp(-da_group_capacity, da_group_capacity)
        } else {
            0.0
        };

        let fcr_required_mw = -(self.fcr_active_direction as f32) * fcr_bid_mw;
        let fcr_group_target_mw = fcr_required_mw.clamp(-fcr_group_capacity, fcr_group_capacity);

        let mut total_power_mw = 0.0;
        let mut da_delivered_mw = 0.0;
        for (i, unit) in self.units.iter_mut().enumerate() {
            if unit.mode == Mode::Charge {
                unit.step(-unit.config_max_power_mw, dt_s);
            } else if unit.mode == Mode::Discharge {
                unit.step(unit.config_max_power_mw, dt_s);
            } else if da_group.contains(&i) {
                let share = if da_group_capacity > 0.0 { unit.config_max_power_mw / da_group_capacity } else { 0.0 };
                unit.step(da_group_target_mw * share, dt_s);
                da_delivered_mw += unit.current_power_mw;
            } else if fcr_group.contains(&i) {
                let share = if fcr_group_capacity > 0.0 { unit.config_max_power_mw / fcr_group_capacity } else { 0.0 };
                unit.step(fcr_group_target_mw * share, dt_s);
            } else {
                unit.step(0.0, dt_s);
            }
            total_power_mw += unit.current_power_mw;
        }
        self.da_delivered_mwh_this_hour += da_delivered_mw * dt_s / 3600.0;

        BessFleetBreakdown { total_power_mw, fcr_required_mw }
    }
}
