//! Request handlers for the API endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use super::AppState;
use super::types::{BidsResponse, ErrorResponse, HistoryQuery, StateResponse, phase_label};

/// Returns the clock position, latest snapshot, and settlement KPIs.
///
/// `GET /state` → 200 + `StateResponse` JSON
pub async fn get_state(State(state): State<Arc<AppState>>) -> Json<StateResponse> {
    let world = state.world.lock().unwrap_or_else(|e| e.into_inner());
    Json(StateResponse {
        time_s: world.clock().time_s(),
        day_of_year: world.clock().day_of_year(),
        phase: phase_label(world.phase()),
        latest: world.history().last().copied(),
        cumulative_net_cash_eur: world.settlement().cumulative_net_cash_eur(),
        cumulative_deviation_mwh: world.settlement().cumulative_deviation_mwh(),
    })
}

/// Returns grid snapshots, optionally filtered by a `time_s` range.
///
/// `GET /history` → 200 + `Vec<GridSnapshot>` JSON (full current-day history)
/// `GET /history?from=N&to=M` → filtered range (inclusive)
/// `GET /history?from=900&to=300` → 400 + `ErrorResponse`
pub async fn get_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> impl IntoResponse {
    let from = query.from.unwrap_or(i32::MIN);
    let to = query.to.unwrap_or(i32::MAX);

    if from > to {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("`from` ({from}) must be <= `to` ({to})"),
            }),
        ));
    }

    let world = state.world.lock().unwrap_or_else(|e| e.into_inner());
    let snapshots: Vec<_> = world
        .history()
        .iter()
        .filter(|s| s.time_s >= from && s.time_s <= to)
        .copied()
        .collect();

    Ok(Json(snapshots))
}

/// Returns the current DA/FCR bid arrays and market prices.
///
/// `GET /bids` → 200 + `BidsResponse` JSON
pub async fn get_bids(State(state): State<Arc<AppState>>) -> Json<BidsResponse> {
    let world = state.world.lock().unwrap_or_else(|e| e.into_inner());
    Json(BidsResponse {
        bids: world.bids(),
        prices: world.market_prices(),
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::body::Body;
    use axum::http::Request;
    use tower::util::ServiceExt;

    use super::*;
    use crate::api::router;
    use crate::world::World;

    fn make_test_state() -> Arc<AppState> {
        let mut world = World::new(crate::config::baseline());
        for _ in 0..10 {
            world.tick();
        }
        Arc::new(AppState {
            world: Mutex::new(world),
        })
    }

    #[tokio::test]
    async fn state_returns_200() {
        let state = make_test_state();
        let app = router(state);

        let req = Request::builder().uri("/state").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json.get("time_s").is_some());
        assert!(json.get("phase").is_some());
    }

    #[tokio::test]
    async fn history_returns_all_ticks() {
        let state = make_test_state();
        let app = router(state);

        let req = Request::builder().uri("/history").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.len(), 10);
    }

    #[tokio::test]
    async fn history_range_query() {
        let state = make_test_state();
        let app = router(state);

        let req = Request::builder()
            .uri("/history?from=3&to=5")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: Vec<serde_json::Value> = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.len(), 3); // time_s 3,4,5
    }

    #[tokio::test]
    async fn history_invalid_range_returns_400() {
        let state = make_test_state();
        let app = router(state);

        let req = Request::builder()
            .uri("/history?from=5&to=1")
            .body(Body::empty())
            .unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn bids_returns_200() {
        let state = make_test_state();
        let app = router(state);

        let req = Request::builder().uri("/bids").body(Body::empty()).unwrap();
        let resp = app.oneshot(req).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert!(json.get("bids").is_some());
        assert!(json.get("prices").is_some());
    }
}
