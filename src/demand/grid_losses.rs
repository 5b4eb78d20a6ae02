//! Transmission/distribution losses: two-stage low-pass on incoming flow,
//! then a fixed-plus-quadratic loss model, itself smoothed (spec §4.4).

use serde::Deserialize;

use super::low_pass;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridLossesConfig {
    pub flow_tau_s: f32,
    pub loss_tau_s: f32,
    pub fixed_loss_mw: f32,
    pub quadratic_coeff_per_mw: f32,
}

impl Default for GridLossesConfig {
    fn default() -> Self {
        Self {
            flow_tau_s: 30.0,
            loss_tau_s: 10.0,
            fixed_loss_mw: 150.0,
            quadratic_coeff_per_mw: 2.2e-6,
        }
    }
}

pub struct GridLossesModel {
    config: GridLossesConfig,
    smoothed_flow_mw: f32,
    smoothed_loss_mw: f32,
}

impl GridLossesModel {
    pub fn new(config: GridLossesConfig) -> Self {
        Self { config, smoothed_flow_mw: 0.0, smoothed_loss_mw: 0.0 }
    }

    pub fn step(&mut self, incoming_flow_mw: f32) -> f32 {
        self.smoothed_flow_mw = low_pass(self.smoothed_flow_mw, incoming_flow_mw, self.config.flow_tau_s, 1.0);
        let target_loss = self.config.fixed_loss_mw
            + self.config.quadratic_coeff_per_mw * self.smoothed_flow_mw * self.smoothed_flow_mw;
        self.smoothed_loss_mw = low_pass(self.smoothed_loss_mw, target_loss, self.config.loss_tau_s, 1.0);
        self.smoothed_loss_mw.max(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn higher_flow_yields_higher_losses_at_steady_state() {
        let mut low = GridLossesModel::new(GridLossesConfig::default());
        let mut high = GridLossesModel::new(GridLossesConfig::default());
        let mut low_loss = 0.0;
        let mut high_loss = 0.0;
        for _ in 0..2000 {
            low_loss = low.step(10_000.0);
            high_loss = high.step(60_000.0);
        }
        assert!(high_loss > low_loss);
    }

    #[test]
    fn losses_never_negative() {
        let mut model = GridLossesModel::new(GridLossesConfig::default());
        assert!(model.step(0.0) >= 0.0);
    }
}
