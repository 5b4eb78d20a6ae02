//! 15-minute ISP imbalance settlement (spec §4.9).

use serde::Deserialize;

pub const ISP_SECONDS: i32 = 900;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "api", derive(serde::Serialize))]
pub enum ImbalanceDirection {
    UpRegulating,
    DownRegulating,
    NoRegulation,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SettlementConfig {
    pub imbalance_deadband_mw: f32,
    pub frequency_deadband_hz: f32,
    pub fees_enabled: bool,
    pub per_mwh_actual_fee_eur: f32,
    pub per_mwh_deviation_fee_eur: f32,
    pub weekly_fee_eur: f32,
}

impl Default for SettlementConfig {
    fn default() -> Self {
        Self {
            imbalance_deadband_mw: 150.0,
            frequency_deadband_hz: 0.01,
            fees_enabled: true,
            per_mwh_actual_fee_eur: 2.0,
            per_mwh_deviation_fee_eur: 1.15,
            weekly_fee_eur: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "api", derive(serde::Serialize))]
pub struct LastSettlement {
    pub direction: Option<ImbalanceDirection>,
    pub scheduled_mwh: f32,
    pub actual_mwh: f32,
    pub deviation_mwh: f32,
    pub price_eur_per_mwh: f32,
    pub imbalance_cashflow_eur: f32,
    pub fees_eur: f32,
    pub net_cashflow_eur: f32,
}

impl Default for ImbalanceDirection {
    fn default() -> Self {
        ImbalanceDirection::NoRegulation
    }
}

/// Hourly DA reference price plus the up/down imbalance prices, read by the
/// settlement at ISP rollover.
#[derive(Debug, Clone, Copy, Default)]
pub struct SettlementPrices {
    pub day_ahead_eur_per_mwh: f32,
    pub imbalance_up_eur_per_mwh: f32,
    pub imbalance_down_eur_per_mwh: f32,
}

pub struct Settlement {
    config: SettlementConfig,
    isp_elapsed_s: i32,
    scheduled_mwh: f32,
    actual_mwh: f32,
    system_imbalance_mwh: f32,
    imbalance_mw_sum: f32,
    frequency_hz_sum: f32,
    samples: u32,
    last: LastSettlement,
    cumulative_net_cash_eur: f32,
    cumulative_deviation_mwh: f32,
}

impl Settlement {
    pub fn new(config: SettlementConfig) -> Self {
        Self {
            config,
            isp_elapsed_s: 0,
            scheduled_mwh: 0.0,
            actual_mwh: 0.0,
            system_imbalance_mwh: 0.0,
            imbalance_mw_sum: 0.0,
            frequency_hz_sum: 0.0,
            samples: 0,
            last: LastSettlement::default(),
            cumulative_net_cash_eur: 0.0,
            cumulative_deviation_mwh: 0.0,
        }
    }

    pub fn last(&self) -> LastSettlement {
        self.last
    }

    pub fn cumulative_net_cash_eur(&self) -> f32 {
        self.cumulative_net_cash_eur
    }

    pub fn cumulative_deviation_mwh(&self) -> f32 {
        self.cumulative_deviation_mwh
    }

    /// `da_schedule_mw` is the current hour's DA bid; `actual_net_power_mw`
    /// is positive for net discharge/export of the settled resource.
    pub fn step(&mut self, da_schedule_mw: f32, actual_net_power_mw: f32, system_imbalance_mw: f32, frequency_hz: f32, prices: &SettlementPrices, dt_s: f32) {
        self.scheduled_mwh += da_schedule_mw * dt_s / 3600.0;
        self.actual_mwh += actual_net_power_mw * dt_s / 3600.0;
        self.system_imbalance_mwh += system_imbalance_mw * dt_s / 3600.0;
        self.imbalance_mw_sum += system_imbalance_mw;
        self.frequency_hz_sum += frequency_hz;
        self.samples += 1;
        self.isp_elapsed_s += dt_s as i32;

        if self.isp_elapsed_s >= ISP_SECONDS {
            self.rollover(prices);
            self.isp_elapsed_s = 0;
        }
    }

    fn rollover(&mut self, prices: &SettlementPrices) {
        let samples = self.samples.max(1) as f32;
        let avg_imbalance_mw = self.imbalance_mw_sum / samples;
        let avg_frequency_hz = self.frequency_hz_sum / samples;

        let direction = if avg_imbalance_mw > self.config.imbalance_deadband_mw
            && (avg_frequency_hz - 50.0) > self.config.frequency_deadband_hz
        {
            ImbalanceDirection::UpRegulating
        } else if avg_imbalance_mw < -self.config.imbalance_deadband_mw
            && (avg_frequency_hz - 50.0) < -self.config.frequency_deadband_hz
        {
            ImbalanceDirection::DownRegulating
        } else {
            ImbalanceDirection::NoRegulation
        };

        let price = match direction {
            ImbalanceDirection::UpRegulating => prices.imbalance_up_eur_per_mwh,
            ImbalanceDirection::DownRegulating => prices.imbalance_down_eur_per_mwh,
            ImbalanceDirection::NoRegulation => prices.day_ahead_eur_per_mwh,
        };

        let deviation_mwh = self.actual_mwh - self.scheduled_mwh;
        let imbalance_cashflow_eur = deviation_mwh * price;

        let fees_eur = if self.config.fees_enabled {
            self.config.per_mwh_actual_fee_eur * self.actual_mwh.abs()
                + self.config.per_mwh_deviation_fee_eur * deviation_mwh.abs()
                + self.config.weekly_fee_eur * (ISP_SECONDS as f32 / (7.0 * 86_400.0))
        } else {
            0.0
        };

        let net_cashflow_eur = imbalance_cashflow_eur - fees_eur;

        self.cumulative_net_cash_eur += net_cashflow_eur;
        self.cumulative_deviation_mwh += deviation_mwh;

        self.last = LastSettlement {
            direction: Some(direction),
            scheduled_mwh: self.scheduled_mwh,
            actual_mwh: self.actual_mwh,
            deviation_mwh,
            price_eur_per_mwh: price,
            imbalance_cashflow_eur,
            fees_eur,
            net_cashflow_eur,
        };

        self.scheduled_mwh = 0.0;
        self.actual_mwh = 0.0;
        self.system_imbalance_mwh = 0.0;
        self.imbalance_mw_sum = 0.0;
        self.frequency_hz_sum = 0.0;
        self.samples = 0;
    }
}
