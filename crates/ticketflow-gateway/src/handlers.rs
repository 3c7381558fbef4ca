// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway snapshot endpoints.
//!
//! The WebSocket stream carries live updates; these endpoints exist so a
//! (re)connecting client can take a full snapshot before following events.

use axum::{extract::State, Json};
use serde::Serialize;

use ticketflow_core::Ticket;

use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub uptime_secs: u64,
}

/// Response body for GET /api/status.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub health: &'static str,
    pub total_processed: u64,
    pub resolved: u64,
    pub failed_attempts: u64,
    pub escalated: u64,
    pub success_rate_percent: f64,
    pub active_tickets: usize,
    pub connected_observers: usize,
}

/// GET /health - liveness probe.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// GET /api/status - workflow metrics and connection counts.
pub async fn get_status(State(state): State<GatewayState>) -> Json<StatusResponse> {
    let metrics = state.orchestrator.metrics();
    Json(StatusResponse {
        health: metrics.health,
        total_processed: metrics.total_processed,
        resolved: metrics.resolved,
        failed_attempts: metrics.failed_attempts,
        escalated: metrics.escalated,
        success_rate_percent: metrics.success_rate_percent,
        active_tickets: state.orchestrator.store().len(),
        connected_observers: state.orchestrator.broadcaster().observer_count(),
    })
}

/// GET /api/tickets - full ticket snapshot, oldest first.
pub async fn get_tickets(State(state): State<GatewayState>) -> Json<Vec<Ticket>> {
    let mut tickets = state.orchestrator.store().list();
    tickets.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    Json(tickets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ticketflow_test_utils::TestHarness;

    #[tokio::test]
    async fn health_reports_ok() {
        let harness = TestHarness::builder().build();
        let state = GatewayState::new(harness.orchestrator);
        let Json(body) = get_health(State(state)).await;
        assert_eq!(body.status, "ok");
    }

    #[tokio::test]
    async fn status_reflects_store_and_metrics() {
        let harness = TestHarness::builder().build();
        let state = GatewayState::new(harness.orchestrator.clone());
        harness.submit_and_settle("Keyboard keys sticking").await.unwrap();

        let Json(body) = get_status(State(state)).await;
        assert_eq!(body.active_tickets, 1);
        assert_eq!(body.resolved + body.escalated, 1);
    }

    #[tokio::test]
    async fn tickets_snapshot_is_oldest_first() {
        let harness = TestHarness::builder().build();
        let state = GatewayState::new(harness.orchestrator.clone());
        let first = harness.submit_and_settle("First reported issue").await.unwrap();
        let second = harness.submit_and_settle("Second reported issue").await.unwrap();

        let Json(tickets) = get_tickets(State(state)).await;
        assert_eq!(tickets.len(), 2);
        assert_eq!(tickets[0].id, first.id);
        assert_eq!(tickets[1].id, second.id);
    }
}
