//! mFRR: block-scheduled tertiary reserve with activation delay.

use serde::Deserialize;

use super::{ramp_toward_asymmetric, FrequencyBand};

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MfrrConfig {
    pub block_mw: f32,
    pub max_blocks_at_once: u32,
    pub activation_delay_s: f32,
    pub trigger_imbalance_mw: f32,
    pub trigger_persistence_s: f32,
    pub afrr_saturation_trigger01: f32,
    pub ramp_up_mw_per_s: f32,
    pub ramp_down_mw_per_s: f32,
}

impl Default for MfrrConfig {
    fn default() -> Self {
        Self {
            block_mw: 100.0,
            max_blocks_at_once: 5,
            activation_delay_s: 300.0,
            trigger_imbalance_mw: 500.0,
            trigger_persistence_s: 180.0,
            afrr_saturation_trigger01: 0.80,
            ramp_up_mw_per_s: 10.0,
            ramp_down_mw_per_s: 15.0,
        }
    }
}

struct PendingBlock {
    timer_s: f32,
    signed_mw: f32,
}

pub struct MfrrController {
    config: MfrrConfig,
    pending: Vec<PendingBlock>,
    activated_mw: f32,
    current_mw: f32,
    trigger_timer_s: f32,
}

impl MfrrController {
    pub fn new(config: MfrrConfig) -> Self {
        Self { config, pending: Vec::new(), activated_mw: 0.0, current_mw: 0.0, trigger_timer_s: 0.0 }
    }

    pub fn current_mw(&self) -> f32 {
        self.current_mw
    }

    fn is_triggered(&self, band: FrequencyBand, net_imbalance_mw: f32, afrr_saturation01: f32) -> bool {
        !matches!(band, FrequencyBand::Normal)
            || net_imbalance_mw.abs() > self.config.trigger_imbalance_mw
            || afrr_saturation01 >= self.config.afrr_saturation_trigger01
    }

    pub fn step(
        &mut self,
        band: FrequencyBand,
        net_imbalance_mw: f32,
        afrr_saturation01: f32,
        capacity_up_mw: f32,
        capacity_down_mw: f32,
        dt_s: f32,
    ) -> f32 {
        if self.is_triggered(band, net_imbalance_mw, afrr_saturation01) {
            self.trigger_timer_s += dt_s;
        } else {
            self.trigger_timer_s = 0.0;
        }

        if self.trigger_timer_s >= self.config.trigger_persistence_s
            && self.pending.len() < self.config.max_blocks_at_once as usize
        {
            let direction = -net_imbalance_mw.signum();
            self.pending.push(PendingBlock { timer_s: 0.0, signed_mw: direction * self.config.block_mw });
            self.trigger_timer_s = 0.0;
        }

        let mut still_pending = Vec::with_capacity(self.pending.len());
        for mut block in self.pending.drain(..) {
            block.timer_s += dt_s;
            if block.timer_s >= self.config.activation_delay_s {
                self.activated_mw += block.signed_mw;
            } else {
                still_pending.push(block);
            }
        }
        self.pending = still_pending;
        self.activated_mw = self.activated_mw.clamp(-capacity_down_mw, capacity_up_mw);

        self.current_mw = ramp_toward_asymmetric(self.current_mw, self.activated_mw, self.config.ramp_up_mw_per_s, self.config.ramp_down_mw_per_s, dt_s);
        self.current_mw
    }
}
