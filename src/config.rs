// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Configuration module - loads settings from environment variables.

use crate::amount::Slippage;
use crate::error::{SwapError, SwapResult};
use crate::registry::ChainRegistry;
use std::path::PathBuf;
use tracing::info;

/// Default port for the HTTP surface.
pub const DEFAULT_SERVER_PORT: u16 = 8080;

/// Runtime configuration for the engine and its HTTP surface.
#[derive(Debug, Clone)]
pub struct Config {
    /// Builtin deployments, or those from `REGISTRY_PATH`, with
    /// `RPC_URL_<CHAIN>` overrides applied.
    pub registry: ChainRegistry,
    pub default_slippage: Slippage,
    pub server_port: u16,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> SwapResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> SwapResult<Self> {
        let mut registry = match var("REGISTRY_PATH").filter(|p| !p.trim().is_empty()) {
            Some(path) => {
                let path = PathBuf::from(path);
                info!("📖 Loading registry from {}", path.display());
                ChainRegistry::from_path(&path)?
            }
            None => ChainRegistry::builtin(),
        };

        let keys: Vec<String> = registry.supported_chains().into_iter().map(str::to_string).collect();
        for key in keys {
            if let Some(url) = var(&rpc_url_var(&key)) {
                registry.set_rpc_url(&key, url)?;
            }
        }

        let default_slippage = match var("DEFAULT_SLIPPAGE_PCT") {
            Some(raw) => raw.parse()?,
            None => Slippage::default(),
        };

        let server_port = match var("SERVER_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .map_err(|e| SwapError::config(format!("Invalid SERVER_PORT {raw}: {e}")))?,
            None => DEFAULT_SERVER_PORT,
        };

        Ok(Self { registry, default_slippage, server_port })
    }
}

/// `ethereum` -> `RPC_URL_ETHEREUM`; dashes become underscores.
fn rpc_url_var(chain_key: &str) -> String {
    format!("RPC_URL_{}", chain_key.to_uppercase().replace('-', "_"))
}
