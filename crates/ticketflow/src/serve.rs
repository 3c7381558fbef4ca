// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ticketflow serve` command implementation.
//!
//! Wires the workflow store, event broadcaster, triage components, and
//! orchestrator together and serves them through the gateway until a
//! shutdown signal arrives.

use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use ticketflow_config::TicketflowConfig;
use ticketflow_core::{Classifier, SpecialistExecutor, TicketflowError};
use ticketflow_gateway::{GatewayState, ServerConfig};
use ticketflow_triage::{GeneralExecutor, KeywordClassifier, SecurityExecutor};
use ticketflow_workflow::{EventBroadcaster, Orchestrator, WorkflowStore};

/// Runs the `ticketflow serve` command.
pub async fn run_serve(config: TicketflowConfig) -> Result<(), TicketflowError> {
    init_tracing(&config.log.level);

    info!("starting ticketflow serve");

    let store = Arc::new(WorkflowStore::new());
    let broadcaster = EventBroadcaster::new();
    let classifier: Arc<dyn Classifier> = Arc::new(KeywordClassifier::new());
    let executors: Vec<Arc<dyn SpecialistExecutor>> = vec![
        Arc::new(SecurityExecutor::with_step_delay(Duration::from_millis(
            config.workflow.step_delay_ms,
        ))),
        Arc::new(GeneralExecutor::new()),
    ];
    let orchestrator = Arc::new(Orchestrator::new(
        store,
        broadcaster,
        classifier,
        executors,
        config.workflow.max_retries,
    ));

    let server_config = ServerConfig {
        host: config.server.host.clone(),
        port: config.server.port,
    };
    let state = GatewayState::new(orchestrator);

    tokio::select! {
        result = ticketflow_gateway::start_server(&server_config, state) => result,
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
            Ok(())
        }
    }
}

pub(crate) fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ticketflow={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
