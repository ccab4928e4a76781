// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Runtime configuration: CLI flag, then environment, then default.

use anyhow::{Context, Result};
use chrono::Duration;
use std::path::PathBuf;

pub const ENV_DB: &str = "CAMPAIGNBOOK_DB";
pub const ENV_ADDR: &str = "CAMPAIGNBOOK_ADDR";
pub const ENV_SESSION_TTL: &str = "CAMPAIGNBOOK_SESSION_TTL_SECS";
pub const ENV_LOG: &str = "CAMPAIGNBOOK_LOG";

pub const DEFAULT_ADDR: &str = "127.0.0.1:8000";
/// Two weeks.
pub const DEFAULT_SESSION_TTL_SECS: i64 = 1_209_600;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub addr: String,
    pub session_ttl: Duration,
}

impl Config {
    pub fn resolve(db_flag: Option<&str>, addr_flag: Option<&str>) -> Result<Self> {
        let db_path = match db_flag
            .map(str::to_string)
            .or_else(|| std::env::var(ENV_DB).ok())
        {
            Some(p) => PathBuf::from(p),
            None => crate::db::db_path()?,
        };
        let addr = addr_flag
            .map(str::to_string)
            .or_else(|| std::env::var(ENV_ADDR).ok())
            .unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let ttl_secs = match std::env::var(ENV_SESSION_TTL) {
            Ok(v) => v
                .trim()
                .parse::<i64>()
                .with_context(|| format!("Invalid {} '{}'", ENV_SESSION_TTL, v))?,
            Err(_) => DEFAULT_SESSION_TTL_SECS,
        };
        Ok(Config {
            db_path,
            addr,
            session_ttl: Duration::seconds(ttl_secs),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from("campaignbook.sqlite"),
            addr: DEFAULT_ADDR.to_string(),
            session_ttl: Duration::seconds(DEFAULT_SESSION_TTL_SECS),
        }
    }
}

/// Installs the global subscriber, filtered by `CAMPAIGNBOOK_LOG` (default `info`).
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_env(ENV_LOG)
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
