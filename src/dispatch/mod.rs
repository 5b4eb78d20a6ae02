//! Hierarchical dispatcher: day-ahead planning plus real-time correction
//! with reserve-availability allocation (spec §4.6).

pub mod plan;
pub mod realtime;

use serde::Deserialize;

pub use plan::{compute_plan, DispatchPlan, PlanConfig, PlanInputs, HOURS_PER_DAY};
pub use realtime::{compute_setpoints, RealTimeConfig, RealTimeInputs, SetpointsNow};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatcherConfig {
    pub plan: PlanConfig,
    pub realtime: RealTimeConfig,
}

/// Reserve power available to the frequency layer, split up/down per
/// product (spec §4.6 "Reserve availability").
#[derive(Debug, Clone, Copy, Default)]
pub struct ReserveAvailability {
    pub fcr_up_mw: f32,
    pub fcr_down_mw: f32,
    pub afrr_up_mw: f32,
    pub afrr_down_mw: f32,
    pub mfrr_up_mw: f32,
    pub mfrr_down_mw: f32,
}

/// Headroom figures the dispatcher derives reserve availability from.
pub struct HeadroomInputs {
    pub hydro_up_mw: f32,
    pub hydro_down_mw: f32,
    pub import_up_mw: f32,
    pub import_down_mw: f32,
    pub peakers_up_mw: f32,
    pub dr_up_mw: f32,
    pub hour: usize,
}

pub fn compute_reserve_availability(plan: &DispatchPlan, headroom: &HeadroomInputs) -> ReserveAvailability {
    let h = headroom.hour;
    ReserveAvailability {
        fcr_up_mw: plan.fcr_target_mw[h].min(headroom.hydro_up_mw),
        fcr_down_mw: plan.fcr_target_mw[h].min(headroom.hydro_down_mw),
        afrr_up_mw: plan.afrr_target_mw[h].min(headroom.hydro_up_mw + headroom.import_up_mw),
        afrr_down_mw: plan.afrr_target_mw[h].min(headroom.hydro_down_mw + headroom.import_down_mw),
        mfrr_up_mw: plan.mfrr_target_mw[h].min(headroom.peakers_up_mw + headroom.import_up_mw + headroom.dr_up_mw),
        mfrr_down_mw: plan.mfrr_target_mw[h].min(headroom.import_down_mw),
    }
}
