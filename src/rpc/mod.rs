// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Read-only chain access: quoter simulation and allowance reads over
//! JSON-RPC `eth_call`.

#[cfg(test)]
pub(crate) mod mock;
mod provider;

use crate::error::SwapResult;
use crate::registry::{ChainDescriptor, FeeTier};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;

pub use provider::{create_provider, RpcChainReader};

/// One single-hop quote request against one fee tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierQuoteRequest {
    pub token_in: Address,
    pub token_out: Address,
    pub amount_in: U256,
    pub fee: FeeTier,
}

/// What a quoter probe for a single fee tier came back with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// The pool exists and the simulated swap produced output.
    Quoted { amount_out: U256, gas_estimate: U256 },
    /// The simulation reverted or returned nothing: no pool or no liquidity.
    NoPool,
    /// The endpoint could not be reached or answered malformed data.
    Unreachable(String),
}

/// Read access to a chain's contracts.
///
/// Implementations must not retry or time out on their own; callers wrap
/// the engine's futures in their own timeouts.
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Simulate `quoteExactInputSingle` on the chain's quoter.
    async fn quote_exact_input_single(
        &self,
        chain: &ChainDescriptor,
        request: TierQuoteRequest,
    ) -> ProbeOutcome;

    /// Read `token.allowance(owner, spender)`.
    async fn allowance(
        &self,
        chain: &ChainDescriptor,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> SwapResult<U256>;
}
