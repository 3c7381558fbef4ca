// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration system for the Ticketflow workflow engine.
//!
//! Provides TOML configuration parsing with strict validation
//! (`deny_unknown_fields`) and `TICKETFLOW_*` environment variable overrides.
//!
//! # Usage
//!
//! ```no_run
//! let config = ticketflow_config::load_and_validate().expect("config errors");
//! println!("bind: {}:{}", config.server.host, config.server.port);
//! ```

pub mod loader;
pub mod model;
pub mod validation;

pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::TicketflowConfig;

use ticketflow_core::TicketflowError;

/// Load configuration from the default locations and validate it.
pub fn load_and_validate() -> Result<TicketflowConfig, TicketflowError> {
    let config = loader::load_config().map_err(|e| TicketflowError::Config(e.to_string()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// Load configuration from a TOML string and validate it.
///
/// Useful for testing and explicit configuration.
pub fn load_and_validate_str(toml_content: &str) -> Result<TicketflowConfig, TicketflowError> {
    let config = loader::load_config_from_str(toml_content)
        .map_err(|e| TicketflowError::Config(e.to_string()))?;
    validation::validate_config(&config)?;
    Ok(config)
}
