// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Chain and token registry.
//!
//! Immutable after startup; every lookup that names an unknown chain or
//! token fails here, before any RPC round-trip is attempted.

mod builtin;
mod file;

use crate::error::{SwapError, SwapResult};
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Pool fee tier, in hundredths of a basis point ("pips").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum FeeTier {
    /// 0.01%
    Lowest,
    /// 0.05%
    Low,
    /// 0.3%
    Medium,
    /// 1%
    High,
}

impl FeeTier {
    /// Every tier, ascending by fee.
    pub const ALL: [FeeTier; 4] = [FeeTier::Lowest, FeeTier::Low, FeeTier::Medium, FeeTier::High];

    /// Fee in pips as passed to the pool contracts (3000 = 0.3%).
    pub fn pips(&self) -> u32 {
        match self {
            FeeTier::Lowest => 100,
            FeeTier::Low => 500,
            FeeTier::Medium => 3000,
            FeeTier::High => 10_000,
        }
    }

    /// Fee as a percentage string without trailing zeros.
    pub fn percent(&self) -> &'static str {
        match self {
            FeeTier::Lowest => "0.01",
            FeeTier::Low => "0.05",
            FeeTier::Medium => "0.3",
            FeeTier::High => "1",
        }
    }
}

impl TryFrom<u32> for FeeTier {
    type Error = SwapError;

    fn try_from(pips: u32) -> Result<Self, Self::Error> {
        FeeTier::ALL
            .into_iter()
            .find(|tier| tier.pips() == pips)
            .ok_or_else(|| SwapError::config(format!("unknown fee tier {pips}")))
    }
}

impl From<FeeTier> for u32 {
    fn from(tier: FeeTier) -> u32 {
        tier.pips()
    }
}

impl fmt::Display for FeeTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.percent())
    }
}

/// A token on one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenDescriptor {
    pub symbol: String,
    /// Contract address; the wrapped-native contract for the native asset.
    pub address: Address,
    pub decimals: u8,
    /// True for the chain's native asset (ETH, MATIC).
    pub native: bool,
}

/// One deployment of the AMM.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainDescriptor {
    /// Symbolic key, e.g. `ethereum`.
    pub key: String,
    pub chain_id: u64,
    pub name: String,
    /// SwapRouter02 deployment.
    pub router: Address,
    /// QuoterV2 deployment.
    pub quoter: Address,
    /// Block-explorer transaction URL with a `{hash}` placeholder.
    pub explorer_tx_template: String,
    pub rpc_url: String,
    pub native_symbol: String,
    pub wrapped_native_symbol: String,
    /// Tiers probed by the quote engine, ascending.
    pub fee_tiers: Vec<FeeTier>,
    /// Keyed by upper-case symbol.
    pub tokens: BTreeMap<String, TokenDescriptor>,
}

impl ChainDescriptor {
    /// Case-insensitive token lookup.
    pub fn token(&self, symbol: &str) -> Option<&TokenDescriptor> {
        self.tokens.get(&symbol.trim().to_uppercase())
    }

    /// Whether `symbol` is this chain's native asset.
    pub fn is_native(&self, symbol: &str) -> bool {
        symbol.trim().eq_ignore_ascii_case(&self.native_symbol)
    }

    /// Explorer link for a transaction hash.
    pub fn explorer_tx_url(&self, tx_hash: &str) -> String {
        self.explorer_tx_template.replace("{hash}", tx_hash)
    }

    /// Check the descriptor's internal invariants.
    fn validate(&self) -> SwapResult<()> {
        if self.fee_tiers.is_empty() {
            return Err(SwapError::config(format!("{}: no fee tiers", self.key)));
        }
        for token in self.tokens.values() {
            if token.decimals > crate::amount::MAX_DECIMALS {
                return Err(SwapError::config(format!(
                    "{}: {} declares {} decimals",
                    self.key, token.symbol, token.decimals
                )));
            }
        }
        let native = self.token(&self.native_symbol).ok_or_else(|| {
            SwapError::config(format!("{}: native {} not listed", self.key, self.native_symbol))
        })?;
        let wrapped = self.token(&self.wrapped_native_symbol).ok_or_else(|| {
            SwapError::config(format!(
                "{}: wrapped native {} not listed",
                self.key, self.wrapped_native_symbol
            ))
        })?;
        if native.address != wrapped.address {
            return Err(SwapError::config(format!(
                "{}: {} and {} resolve to different addresses",
                self.key, native.symbol, wrapped.symbol
            )));
        }
        if !self.explorer_tx_template.contains("{hash}") {
            return Err(SwapError::config(format!("{}: explorer template lacks {{hash}}", self.key)));
        }
        Ok(())
    }
}

/// Listing view of a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainSummary<'a> {
    pub key: &'a str,
    pub chain_id: u64,
    pub name: &'a str,
    pub native_symbol: &'a str,
    pub fee_tiers: &'a [FeeTier],
    pub tokens: Vec<&'a str>,
}

impl ChainDescriptor {
    pub fn summary(&self) -> ChainSummary<'_> {
        ChainSummary {
            key: &self.key,
            chain_id: self.chain_id,
            name: &self.name,
            native_symbol: &self.native_symbol,
            fee_tiers: &self.fee_tiers,
            tokens: self.tokens.keys().map(String::as_str).collect(),
        }
    }
}

/// Every supported deployment, keyed by chain key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainRegistry {
    chains: BTreeMap<String, ChainDescriptor>,
}

impl ChainRegistry {
    /// Build a registry, validating every chain.
    pub fn new(chains: impl IntoIterator<Item = ChainDescriptor>) -> SwapResult<Self> {
        let mut map = BTreeMap::new();
        for chain in chains {
            chain.validate()?;
            if map.values().any(|c: &ChainDescriptor| c.chain_id == chain.chain_id) {
                return Err(SwapError::config(format!("duplicate chain id {}", chain.chain_id)));
            }
            if map.insert(chain.key.clone(), chain).is_some() {
                return Err(SwapError::config("duplicate chain key"));
            }
        }
        if map.is_empty() {
            return Err(SwapError::config("registry has no chains"));
        }
        Ok(Self { chains: map })
    }

    /// The deployments shipped with the crate.
    pub fn builtin() -> Self {
        Self { chains: builtin::chains().into_iter().map(|c| (c.key.clone(), c)).collect() }
    }

    /// Look up a chain by symbolic key.
    pub fn resolve_chain(&self, chain_key: &str) -> SwapResult<&ChainDescriptor> {
        self.chains
            .get(&chain_key.trim().to_lowercase())
            .ok_or_else(|| SwapError::UnsupportedChain(chain_key.to_string()))
    }

    /// Look up a chain by numeric id.
    pub fn resolve_chain_by_id(&self, chain_id: u64) -> SwapResult<&ChainDescriptor> {
        self.chains
            .values()
            .find(|c| c.chain_id == chain_id)
            .ok_or_else(|| SwapError::UnsupportedChain(chain_id.to_string()))
    }

    /// Look up a token on a chain.
    pub fn resolve_token(&self, chain_key: &str, symbol: &str) -> SwapResult<&TokenDescriptor> {
        let chain = self.resolve_chain(chain_key)?;
        chain.token(symbol).ok_or_else(|| SwapError::unsupported_token(&chain.key, symbol))
    }

    /// Chain keys, sorted.
    pub fn supported_chains(&self) -> Vec<&str> {
        self.chains.keys().map(String::as_str).collect()
    }

    /// Token symbols listed on a chain, sorted.
    pub fn supported_tokens(&self, chain_key: &str) -> SwapResult<Vec<&str>> {
        Ok(self.resolve_chain(chain_key)?.tokens.keys().map(String::as_str).collect())
    }

    /// All chain descriptors.
    pub fn chains(&self) -> impl Iterator<Item = &ChainDescriptor> {
        self.chains.values()
    }

    /// Replace a chain's RPC endpoint. Only used while assembling the
    /// registry at startup.
    pub fn set_rpc_url(&mut self, chain_key: &str, rpc_url: String) -> SwapResult<()> {
        let chain = self
            .chains
            .get_mut(&chain_key.trim().to_lowercase())
            .ok_or_else(|| SwapError::UnsupportedChain(chain_key.to_string()))?;
        chain.rpc_url = rpc_url;
        Ok(())
    }
}
