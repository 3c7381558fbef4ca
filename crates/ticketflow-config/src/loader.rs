// SPDX-FileCopyrightText: 2026 Ticketflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Merge order: compiled defaults, then `./ticketflow.toml`, then
//! `TICKETFLOW_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::TicketflowConfig;

/// Load configuration from the local directory with env var overrides.
pub fn load_config() -> Result<TicketflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TicketflowConfig::default()))
        .merge(Toml::file("ticketflow.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no file lookup, no env).
///
/// Used for testing and explicit inline configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<TicketflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TicketflowConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TicketflowConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TicketflowConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")`: `TICKETFLOW_SYNC_BACKOFF_BASE_MS`
/// must map to `sync.backoff_base_ms`, not `sync.backoff.base.ms`.
fn env_provider() -> Env {
    Env::prefixed("TICKETFLOW_").map(|key| {
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("server_", "server.", 1)
            .replacen("workflow_", "workflow.", 1)
            .replacen("sync_", "sync.", 1)
            .replacen("log_", "log.", 1);
        mapped.into()
    })
}
