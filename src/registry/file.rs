// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! TOML registry files, for deployments and token lists that differ from
//! the builtin tables.
//!
//! ```toml
//! [chains.base]
//! chain_id = 8453
//! name = "Base"
//! router = "0x2626664c2603336E57B271c5C0b26F421741e481"
//! quoter = "0x3d4e44Eb1374240CE5F1B871ab261CD16335B76a"
//! explorer = "https://basescan.org/tx/{hash}"
//! rpc_url = "https://mainnet.base.org"
//! native_symbol = "ETH"
//! wrapped_native_symbol = "WETH"
//! fee_tiers = [500, 3000, 10000]
//!
//! [chains.base.tokens]
//! ETH = { address = "0x4200000000000000000000000000000000000006", decimals = 18 }
//! WETH = { address = "0x4200000000000000000000000000000000000006", decimals = 18 }
//! ```

use super::{ChainDescriptor, ChainRegistry, FeeTier, TokenDescriptor};
use crate::error::{SwapError, SwapResult};
use alloy::primitives::Address;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// On-disk registry layout.
#[derive(Debug, Clone, Deserialize)]
pub struct RegistryFile {
    pub chains: BTreeMap<String, ChainEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainEntry {
    pub chain_id: u64,
    pub name: String,
    pub router: Address,
    pub quoter: Address,
    pub explorer: String,
    pub rpc_url: String,
    pub native_symbol: String,
    pub wrapped_native_symbol: String,
    #[serde(default = "default_fee_tiers")]
    pub fee_tiers: Vec<FeeTier>,
    pub tokens: BTreeMap<String, TokenEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenEntry {
    pub address: Address,
    pub decimals: u8,
}

fn default_fee_tiers() -> Vec<FeeTier> {
    FeeTier::ALL.to_vec()
}

impl ChainEntry {
    fn into_descriptor(self, key: String) -> SwapResult<ChainDescriptor> {
        let native_symbol = self.native_symbol.to_uppercase();
        let mut tokens = BTreeMap::new();
        for (symbol, entry) in self.tokens {
            let symbol = symbol.to_uppercase();
            let token = TokenDescriptor {
                symbol: symbol.clone(),
                address: entry.address,
                decimals: entry.decimals,
                native: symbol == native_symbol,
            };
            if tokens.insert(symbol.clone(), token).is_some() {
                return Err(SwapError::config(format!("{key}: duplicate token {symbol}")));
            }
        }

        let mut fee_tiers = self.fee_tiers;
        fee_tiers.sort();
        fee_tiers.dedup();

        Ok(ChainDescriptor {
            key: key.to_lowercase(),
            chain_id: self.chain_id,
            name: self.name,
            router: self.router,
            quoter: self.quoter,
            explorer_tx_template: self.explorer,
            rpc_url: self.rpc_url,
            native_symbol,
            wrapped_native_symbol: self.wrapped_native_symbol.to_uppercase(),
            fee_tiers,
            tokens,
        })
    }
}

impl ChainRegistry {
    /// Parse and validate a registry from TOML text.
    pub fn from_toml_str(contents: &str) -> SwapResult<Self> {
        let file: RegistryFile = toml::from_str(contents).map_err(SwapError::config)?;
        let chains = file
            .chains
            .into_iter()
            .map(|(key, entry)| entry.into_descriptor(key))
            .collect::<SwapResult<Vec<_>>>()?;
        ChainRegistry::new(chains)
    }

    /// Load a registry file from disk.
    pub fn from_path(path: impl AsRef<Path>) -> SwapResult<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SwapError::config(format!("reading {}: {e}", path.display())))?;
        Self::from_toml_str(&contents)
    }
}
