// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end orchestration scenarios over the mock triage stack.

use std::sync::Arc;

use ticketflow_core::{Category, ServerEvent, Severity, TicketStatus};
use ticketflow_test_utils::{MockExecutor, TestHarness};

/// Position in the forward path of the status graph; used to check that a
/// connected observer never sees a status move backwards on a clean run.
fn topo_index(status: TicketStatus) -> usize {
    match status {
        TicketStatus::Received => 0,
        TicketStatus::Processing => 1,
        TicketStatus::Classified => 2,
        TicketStatus::Delegating => 3,
        TicketStatus::Working => 4,
        TicketStatus::Resolved => 5,
        TicketStatus::Failed | TicketStatus::Escalated => 6,
    }
}

#[tokio::test]
async fn security_ticket_runs_the_remediation_protocol() {
    let executor = Arc::new(
        MockExecutor::new("phishguard", Category::Security).with_steps(vec![
            ("analyze", "indicators extracted"),
            ("contain", "2 URLs blocked"),
            ("eradicate", "5 messages purged"),
        ]),
    );
    let harness = TestHarness::builder()
        .with_classifier_outcomes(vec![Ok(Category::Security)])
        .with_executor(Arc::clone(&executor) as Arc<_>)
        .build();

    let ticket = harness
        .submit_and_settle("Suspicious email from CEO requesting wire transfer")
        .await
        .unwrap();

    assert_eq!(ticket.status, TicketStatus::Resolved);
    assert_eq!(ticket.category, Some(Category::Security));
    assert_eq!(executor.run_count(), 1);

    let step_entries: Vec<_> = ticket
        .log
        .iter()
        .filter(|e| e.associated_status == Some(TicketStatus::Working) && e.source == "phishguard")
        .collect();
    assert_eq!(step_entries.len(), 3);

    let summary = ticket
        .log
        .iter()
        .rfind(|e| e.severity == Severity::Success)
        .expect("missing final summary entry");
    assert!(summary.message.contains("3 items handled"));
}

#[tokio::test]
async fn general_ticket_takes_the_service_desk_path() {
    let executor = Arc::new(
        MockExecutor::new("servicedesk", Category::General)
            .with_steps(vec![("review", "queued for the desk")]),
    );
    let harness = TestHarness::builder()
        .with_classifier_outcomes(vec![Ok(Category::General)])
        .with_executor(executor)
        .build();

    let ticket = harness
        .submit_and_settle("Password reset request")
        .await
        .unwrap();

    assert_eq!(ticket.status, TicketStatus::Resolved);
    assert_eq!(ticket.category, Some(Category::General));
    let summaries: Vec<_> = ticket
        .log
        .iter()
        .filter(|e| e.severity == Severity::Success)
        .collect();
    assert_eq!(summaries.len(), 1, "exactly one summary entry expected");
}

#[tokio::test]
async fn classifier_failure_falls_back_and_never_blocks_routing() {
    let harness = TestHarness::builder()
        .with_classifier_outcomes(vec![Err("model quota exhausted".to_string())])
        .with_executor(Arc::new(MockExecutor::new("desk", Category::General)))
        .build();

    let ticket = harness
        .submit_and_settle("Monitor shows vertical lines")
        .await
        .unwrap();

    assert_eq!(ticket.status, TicketStatus::Resolved);
    assert_eq!(ticket.category, Some(Category::FALLBACK));
    let warning = ticket
        .log
        .iter()
        .find(|e| e.severity == Severity::Warning && e.source == "classifier")
        .expect("fallback warning entry missing");
    assert!(warning.message.contains("falling back"));
}

#[tokio::test]
async fn exhausted_retries_land_in_escalated() {
    let executor = Arc::new(MockExecutor::new("flaky", Category::General).always_failing());
    let harness = TestHarness::builder()
        .with_executor(Arc::clone(&executor) as Arc<_>)
        .with_max_retries(2)
        .build();

    let ticket = harness
        .submit_and_settle("Laptop will not power on")
        .await
        .unwrap();

    assert_eq!(ticket.status, TicketStatus::Escalated);
    assert_eq!(ticket.retry_count, 2);
    // Initial attempt plus two automatic retries.
    assert_eq!(executor.run_count(), 3);
    let failure = ticket.error.expect("structured error missing");
    assert_eq!(failure.code, "executor");

    // The cycle passed through failed before each retry.
    let failed_entries = ticket
        .log
        .iter()
        .filter(|e| e.associated_status == Some(TicketStatus::Failed))
        .count();
    assert!(failed_entries >= 2);
}

#[tokio::test]
async fn transient_failure_recovers_within_the_retry_budget() {
    let executor = Arc::new(MockExecutor::new("flaky", Category::General).failing_times(1));
    let harness = TestHarness::builder()
        .with_executor(Arc::clone(&executor) as Arc<_>)
        .with_max_retries(2)
        .build();

    let ticket = harness
        .submit_and_settle("Shared drive mapping lost")
        .await
        .unwrap();

    assert_eq!(ticket.status, TicketStatus::Resolved);
    assert_eq!(ticket.retry_count, 1);
    assert_eq!(executor.run_count(), 2);
}

#[tokio::test]
async fn connected_observer_sees_statuses_in_forward_order() {
    let harness = TestHarness::builder()
        .with_executor(Arc::new(MockExecutor::new("desk", Category::General)))
        .build();
    let mut rx = harness.broadcaster.subscribe();

    let ticket = harness
        .submit_and_settle("Projector remote missing")
        .await
        .unwrap();

    let statuses: Vec<TicketStatus> = TestHarness::drain_events(&mut rx)
        .into_iter()
        .filter_map(|event| match event {
            ServerEvent::WorkflowUpdate {
                ticket_id, status, ..
            } if ticket_id == ticket.id => Some(status),
            _ => None,
        })
        .collect();

    assert_eq!(statuses.first(), Some(&TicketStatus::Received));
    assert_eq!(statuses.last(), Some(&TicketStatus::Resolved));
    for pair in statuses.windows(2) {
        assert!(
            topo_index(pair[0]) <= topo_index(pair[1]),
            "status regressed: {:?}",
            statuses
        );
    }
}

#[tokio::test]
async fn tickets_progress_independently() {
    let slow = Arc::new(
        MockExecutor::new("slow", Category::Security).with_steps(vec![("analyze", "looking")]),
    );
    let fast = Arc::new(MockExecutor::new("fast", Category::General));
    let harness = TestHarness::builder()
        .with_classifier_outcomes(vec![Ok(Category::Security), Ok(Category::General)])
        .with_executor(slow)
        .with_executor(fast)
        .build();

    let first = harness.orchestrator.submit("Phishing mail in finance inbox");
    let second = harness.orchestrator.submit("New mouse for reception");
    let (first, second) = (first.unwrap(), second.unwrap());

    let a = harness.wait_for_settled(&first).await;
    let b = harness.wait_for_settled(&second).await;
    assert_eq!(a.status, TicketStatus::Resolved);
    assert_eq!(b.status, TicketStatus::Resolved);
    assert_eq!(a.category, Some(Category::Security));
    assert_eq!(b.category, Some(Category::General));
}

#[tokio::test]
async fn metrics_track_outcomes() {
    let harness = TestHarness::builder()
        .with_executor(Arc::new(MockExecutor::new("flaky", Category::General).always_failing()))
        .with_max_retries(0)
        .build();

    harness.submit_and_settle("Desk phone static").await.unwrap();

    let metrics = harness.orchestrator.metrics();
    assert_eq!(metrics.escalated, 1);
    assert_eq!(metrics.resolved, 0);
    assert_eq!(metrics.failed_attempts, 1);
    assert_eq!(metrics.success_rate_percent, 0.0);
    assert_eq!(metrics.health, "degraded");
}

#[tokio::test]
async fn manual_retry_is_rejected_for_active_and_exhausted_tickets() {
    let harness = TestHarness::builder()
        .with_executor(Arc::new(MockExecutor::new("flaky", Category::General).always_failing()))
        .with_max_retries(1)
        .build();

    let ticket = harness.submit_and_settle("Badge reader offline").await.unwrap();
    assert_eq!(ticket.status, TicketStatus::Escalated);

    // Budget exhausted: permanent escalation, no further retries.
    let result = harness.orchestrator.retry(&ticket.id);
    assert!(result.is_err());

    // Resolved tickets are not retryable either.
    let harness2 = TestHarness::builder()
        .with_executor(Arc::new(MockExecutor::new("desk", Category::General)))
        .build();
    let resolved = harness2.submit_and_settle("Replace chair wheel").await.unwrap();
    assert!(harness2.orchestrator.retry(&resolved.id).is_err());
}
