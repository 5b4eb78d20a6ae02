//! Industry: nine sectors on continuous/manufacturing/mining schedules plus
//! a demand-response curtailment bank (spec §4.4).

use serde::Deserialize;

use super::DemandContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScheduleKind {
    Continuous,
    Manufacturing,
    Mining,
}

struct Sector {
    name: &'static str,
    base_mw: f32,
    schedule: ScheduleKind,
}

const SECTORS: [Sector; 9] = [
    Sector { name: "steel", base_mw: 1800.0, schedule: ScheduleKind::Continuous },
    Sector { name: "pulp_paper", base_mw: 1500.0, schedule: ScheduleKind::Continuous },
    Sector { name: "chemicals", base_mw: 1300.0, schedule: ScheduleKind::Continuous },
    Sector { name: "mining", base_mw: 1100.0, schedule: ScheduleKind::Mining },
    Sector { name: "cement", base_mw: 600.0, schedule: ScheduleKind::Manufacturing },
    Sector { name: "food_processing", base_mw: 700.0, schedule: ScheduleKind::Manufacturing },
    Sector { name: "machinery", base_mw: 900.0, schedule: ScheduleKind::Manufacturing },
    Sector { name: "electronics", base_mw: 500.0, schedule: ScheduleKind::Manufacturing },
    Sector { name: "other_manufacturing", base_mw: 800.0, schedule: ScheduleKind::Manufacturing },
];

const MANUFACTURING_BY_HOUR: [f32; 24] = [
    0.35, 0.35, 0.35, 0.35, 0.40, 0.55, 0.80, 0.95, 1.00, 1.00, 1.00, 0.95, 0.85, 0.95, 1.00, 1.00,
    0.95, 0.80, 0.55, 0.45, 0.40, 0.38, 0.36, 0.35,
];
const MINING_BY_HOUR: [f32; 24] = [
    0.85, 0.85, 0.85, 0.85, 0.85, 0.85, 0.90, 0.95, 1.00, 1.00, 1.00, 0.95, 0.90, 0.95, 1.00, 1.00,
    1.00, 0.95, 0.90, 0.88, 0.86, 0.85, 0.85, 0.85,
];

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IndustryConfig {
    pub dr_payback_per_hour_mwh: f32,
    pub dr_stress_threshold: f32,
    pub dr_max_curtail_fraction: f32,
}

impl Default for IndustryConfig {
    fn default() -> Self {
        Self {
            dr_payback_per_hour_mwh: 400.0,
            dr_stress_threshold: 0.35,
            dr_max_curtail_fraction: 0.15,
        }
    }
}

pub struct IndustryModel {
    config: IndustryConfig,
    dr_bank_mwh: f32,
}

impl IndustryModel {
    pub fn new(config: IndustryConfig) -> Self {
        Self { config, dr_bank_mwh: 0.0 }
    }

    pub fn step(&mut self, ctx: &DemandContext) -> f32 {
        let hour = ctx.clock.local_hour() as usize;
        let scheduled_mw: f32 = SECTORS
            .iter()
            .map(|sector| {
                let factor = match sector.schedule {
                    ScheduleKind::Continuous => 1.0,
                    ScheduleKind::Manufacturing => MANUFACTURING_BY_HOUR[hour],
                    ScheduleKind::Mining => MINING_BY_HOUR[hour],
                };
                sector.base_mw * factor
            })
            .sum();

        let curtailed_mw = if ctx.grid_stress01 > self.config.dr_stress_threshold {
            let max_curtail = scheduled_mw * self.config.dr_max_curtail_fraction;
            let amount = max_curtail * ((ctx.grid_stress01 - self.config.dr_stress_threshold) / (1.0 - self.config.dr_stress_threshold)).clamp(0.0, 1.0);
            self.dr_bank_mwh += amount / 3600.0;
            amount
        } else {
            0.0
        };

        let payback_mw = if ctx.grid_stress01 <= self.config.dr_stress_threshold && self.dr_bank_mwh > 0.0 {
            let pay = (self.config.dr_payback_per_hour_mwh).min(self.dr_bank_mwh * 3600.0);
            self.dr_bank_mwh = (self.dr_bank_mwh - pay / 3600.0).max(0.0);
            pay
        } else {
            0.0
        };

        (scheduled_mw - curtailed_mw + payback_mw).max(0.0) * ctx.curtailment01
    }

    pub fn dr_bank_mwh(&self) -> f32 {
        self.dr_bank_mwh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::Clock;
    use crate::weather::SynopticState;

    fn synoptic() -> SynopticState {
        SynopticState {
            temperature_c: 8.0,
            front_offset_c: 0.0,
            wind_mps: 4.0,
            cloud_cover01: 0.3,
            is_snowing: false,
            snow_intensity_mmph: 0.0,
        }
    }

    #[test]
    fn stress_above_threshold_curtails_and_banks_energy() {
        let clock = Clock::new(10);
        let mut model = IndustryModel::new(IndustryConfig::default());
        model.step(&DemandContext { clock: &clock, synoptic: &synoptic(), curtailment01: 1.0, grid_stress01: 0.9 });
        assert!(model.dr_bank_mwh() > 0.0);
    }

    #[test]
    fn payback_happens_once_stress_subsides() {
        let clock = Clock::new(10);
        let mut model = IndustryModel::new(IndustryConfig::default());
        model.step(&DemandContext { clock: &clock, synoptic: &synoptic(), curtailment01: 1.0, grid_stress01: 0.9 });
        let banked = model.dr_bank_mwh();
        assert!(banked > 0.0);
        model.step(&DemandContext { clock: &clock, synoptic: &synoptic(), curtailment01: 1.0, grid_stress01: 0.1 });
        assert!(model.dr_bank_mwh() < banked);
    }
}
