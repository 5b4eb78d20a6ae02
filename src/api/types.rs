//! API response and query types.

use serde::{Deserialize, Serialize};

use crate::bess::Bids;
use crate::grid::GridSnapshot;
use crate::world::{MarketPrices, Phase};

/// `GET /state` response: latest snapshot, clock position, and settlement KPIs.
#[derive(Debug, Serialize)]
pub struct StateResponse {
    pub time_s: i32,
    pub day_of_year: u16,
    pub phase: &'static str,
    pub latest: Option<GridSnapshot>,
    pub cumulative_net_cash_eur: f32,
    pub cumulative_deviation_mwh: f32,
}

pub fn phase_label(phase: Phase) -> &'static str {
    match phase {
        Phase::WarmingUp => "warming_up",
        Phase::Running => "running",
        Phase::DayComplete => "day_complete",
    }
}

/// `GET /history` query parameters: an inclusive `time_s` range.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub from: Option<i32>,
    pub to: Option<i32>,
}

/// `GET /bids` response: current DA/FCR bid arrays and market prices.
#[derive(Debug, Serialize)]
pub struct BidsResponse {
    pub bids: Bids,
    pub prices: MarketPrices,
}

/// Error response body for 400-class errors.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::World;

    #[test]
    fn phase_label_covers_all_variants() {
        assert_eq!(phase_label(Phase::WarmingUp), "warming_up");
        assert_eq!(phase_label(Phase::Running), "running");
        assert_eq!(phase_label(Phase::DayComplete), "day_complete");
    }

    #[test]
    fn state_response_serializes_with_no_history() {
        let world = World::new(crate::config::baseline());
        let response = StateResponse {
            time_s: world.clock().time_s(),
            day_of_year: world.clock().day_of_year(),
            phase: phase_label(world.phase()),
            latest: world.history().last().copied(),
            cumulative_net_cash_eur: world.settlement().cumulative_net_cash_eur(),
            cumulative_deviation_mwh: world.settlement().cumulative_deviation_mwh(),
        };
        let json = serde_json::to_string(&response).expect("should serialize");
        assert!(json.contains("\"phase\":\"warming_up\""));
        assert!(json.contains("\"latest\":null"));
    }
}
