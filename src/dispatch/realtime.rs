//! Real-time setpoint correction and escalation (spec §4.6 "Real-time").

use serde::Deserialize;

use super::plan::DispatchPlan;

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RealTimeConfig {
    pub hydro_df_gain_mw_per_hz: f32,
    pub import_df_gain_mw_per_hz: f32,
    pub escalation_freq_hz: f32,
    pub dr_freq_hz: f32,
    pub peaker_freq_hz: f32,
    pub saturation_threshold01: f32,
    pub dr_shed_mw: f32,
}

impl Default for RealTimeConfig {
    fn default() -> Self {
        Self {
            hydro_df_gain_mw_per_hz: 3500.0,
            import_df_gain_mw_per_hz: 1500.0,
            escalation_freq_hz: 49.70,
            dr_freq_hz: 49.75,
            peaker_freq_hz: 49.70,
            saturation_threshold01: 0.85,
            dr_shed_mw: 500.0,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SetpointsNow {
    pub nuclear_mw: f32,
    pub hydro_reservoir_mw: f32,
    pub net_import_mw: f32,
    pub peakers_mw: f32,
    pub dr_shed_mw: f32,
}

/// Per-tick real-time correction inputs.
pub struct RealTimeInputs {
    pub hour: usize,
    pub frequency_hz: f32,
    pub fcr_saturation01: f32,
    pub afrr_saturation01: f32,
    pub hydro_headroom_mw: f32,
    pub import_headroom_mw: f32,
}

pub fn compute_setpoints(config: &RealTimeConfig, plan: &DispatchPlan, inputs: &RealTimeInputs) -> SetpointsNow {
    let df = 50.0 - inputs.frequency_hz;

    let hydro_correction = (config.hydro_df_gain_mw_per_hz * df).clamp(-inputs.hydro_headroom_mw, inputs.hydro_headroom_mw);
    let import_correction = (config.import_df_gain_mw_per_hz * df).clamp(-inputs.import_headroom_mw, inputs.import_headroom_mw);

    let escalated = inputs.frequency_hz <= config.escalation_freq_hz
        || inputs.fcr_saturation01 >= config.saturation_threshold01
        || inputs.afrr_saturation01 >= config.saturation_threshold01;

    let mut dr_shed_mw = 0.0;
    let mut peaker_boost_mw = 0.0;
    if escalated {
        if inputs.frequency_hz <= config.dr_freq_hz {
            dr_shed_mw = config.dr_shed_mw;
        }
        if inputs.frequency_hz <= config.peaker_freq_hz {
            peaker_boost_mw = config.dr_shed_mw;
        }
    }

    SetpointsNow {
        nuclear_mw: plan.nuclear_mw[inputs.hour],
        hydro_reservoir_mw: plan.hydro_reservoir_mw[inputs.hour] + hydro_correction,
        net_import_mw: plan.net_import_mw[inputs.hour] + import_correction,
        peakers_mw: plan.peakers_mw[inputs.hour] + peaker_boost_mw,
        dr_shed_mw,
    }
}
