//! Grid aggregator: sums producer and consumer contributions into one
//! per-tick snapshot (spec §2 "Grid aggregator").

use crate::demand::DemandBreakdown;
use crate::frequency::{FrequencyBand, FrequencyBreakdown};
use crate::supply::SupplyBreakdown;

/// Everything the orchestrator needs to append to history for one tick.
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "api", derive(serde::Serialize))]
pub struct GridSnapshot {
    pub time_s: i32,
    pub demand: DemandBreakdown,
    pub supply: SupplyBreakdown,
    pub bess_power_mw: f32,
    pub ffr_mw: f32,
    pub load_shed_mw: f32,
    pub generation_mw: f32,
    pub consumption_mw: f32,
    pub raw_imbalance_mw: f32,
    pub frequency_hz: f32,
    pub rocof_hz_per_s: f32,
    pub frequency_band: FrequencyBand,
}

#[derive(Default)]
pub struct GridAggregator;

impl GridAggregator {
    pub fn new() -> Self {
        Self
    }

    #[allow(clippy::too_many_arguments)]
    pub fn step(
        &self,
        time_s: i32,
        demand: DemandBreakdown,
        supply: SupplyBreakdown,
        bess_power_mw: f32,
        ffr_mw: f32,
        load_shed_mw: f32,
        frequency: FrequencyBreakdown,
    ) -> GridSnapshot {
        let generation_mw = supply.total_mw() + bess_power_mw.max(0.0) + ffr_mw;
        let consumption_mw = (demand.total_mw() + (-bess_power_mw).max(0.0) - load_shed_mw).max(0.0);
        let raw_imbalance_mw = generation_mw - consumption_mw;

        GridSnapshot {
            time_s,
            demand,
            supply,
            bess_power_mw,
            ffr_mw,
            load_shed_mw,
            generation_mw,
            consumption_mw,
            raw_imbalance_mw,
            frequency_hz: frequency.frequency_hz,
            rocof_hz_per_s: frequency.rocof_hz_per_s,
            frequency_band: frequency.band,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::classify_band;

    #[test]
    fn balanced_supply_and_demand_yields_zero_imbalance() {
        let aggregator = GridAggregator::new();
        let demand = DemandBreakdown::default();
        let supply = SupplyBreakdown::default();
        let frequency = FrequencyBreakdown {
            frequency_hz: 50.0,
            rocof_hz_per_s: 0.0,
            band: classify_band(50.0),
            auto_shed_request_mw: 0.0,
            integrated_energy_imbalance_mwh: 0.0,
        };
        let snapshot = aggregator.step(0, demand, supply, 0.0, 0.0, 0.0, frequency);
        assert_eq!(snapshot.raw_imbalance_mw, 0.0);
    }

    #[test]
    fn discharging_bess_adds_to_generation() {
        let aggregator = GridAggregator::new();
        let demand = DemandBreakdown::default();
        let supply = SupplyBreakdown::default();
        let frequency = FrequencyBreakdown {
            frequency_hz: 50.0,
            rocof_hz_per_s: 0.0,
            band: classify_band(50.0),
            auto_shed_request_mw: 0.0,
            integrated_energy_imbalance_mwh: 0.0,
        };
        let snapshot = aggregator.step(0, demand, supply, 10.0, 0.0, 0.0, frequency);
        assert!(snapshot.generation_mw >= 10.0);
    }
}
