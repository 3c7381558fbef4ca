// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for values figment cannot check.

use ticketflow_core::TicketflowError;

use crate::model::TicketflowConfig;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validates constraints that hold across fields.
pub fn validate_config(config: &TicketflowConfig) -> Result<(), TicketflowError> {
    if config.sync.backoff_base_ms == 0 {
        return Err(TicketflowError::Config(
            "sync.backoff_base_ms must be greater than zero".to_string(),
        ));
    }
    if config.sync.backoff_cap_ms < config.sync.backoff_base_ms {
        return Err(TicketflowError::Config(format!(
            "sync.backoff_cap_ms ({}) must be >= sync.backoff_base_ms ({})",
            config.sync.backoff_cap_ms, config.sync.backoff_base_ms
        )));
    }
    if config.sync.max_reconnect_attempts == 0 {
        return Err(TicketflowError::Config(
            "sync.max_reconnect_attempts must be greater than zero".to_string(),
        ));
    }
    if config.sync.heartbeat_interval_secs == 0 {
        return Err(TicketflowError::Config(
            "sync.heartbeat_interval_secs must be greater than zero".to_string(),
        ));
    }
    if !LOG_LEVELS.contains(&config.log.level.as_str()) {
        return Err(TicketflowError::Config(format!(
            "log.level must be one of {LOG_LEVELS:?}, got {:?}",
            config.log.level
        )));
    }
    Ok(())
}
