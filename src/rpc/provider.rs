// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Provider setup and the JSON-RPC backed [`ChainReader`].

use super::{ChainReader, ProbeOutcome, TierQuoteRequest};
use crate::contracts::{IQuoterV2, IERC20};
use crate::error::{SwapError, SwapResult};
use crate::registry::{ChainDescriptor, ChainRegistry};
use alloy::{
    contract::Error as ContractError,
    primitives::{
        aliases::{U160, U24},
        Address, U256,
    },
    providers::{DynProvider, Provider, ProviderBuilder},
    rpc::json_rpc::ErrorPayload,
    transports::{http::reqwest::Url, RpcError},
};
use async_trait::async_trait;
use std::collections::HashMap;
use tracing::{debug, info};

/// Create a read-only HTTP provider. No wallet is attached: the engine
/// never signs.
pub fn create_provider(rpc_url: &str) -> SwapResult<DynProvider> {
    let url: Url = rpc_url
        .parse()
        .map_err(|e| SwapError::config(format!("Invalid RPC URL {rpc_url}: {e}")))?;

    Ok(ProviderBuilder::new().connect_http(url).erased())
}

/// [`ChainReader`] backed by one HTTP provider per chain.
#[derive(Clone)]
pub struct RpcChainReader {
    providers: HashMap<u64, DynProvider>,
}

impl RpcChainReader {
    /// Build a provider for every chain in the registry. Connecting is lazy,
    /// so no request is made here.
    pub fn new(registry: &ChainRegistry) -> SwapResult<Self> {
        let mut providers = HashMap::new();
        for chain in registry.chains() {
            providers.insert(chain.chain_id, create_provider(&chain.rpc_url)?);
            info!("📡 {} ({}): {}", chain.name, chain.chain_id, chain.rpc_url);
        }
        Ok(Self { providers })
    }

    fn provider(&self, chain: &ChainDescriptor) -> SwapResult<&DynProvider> {
        self.providers
            .get(&chain.chain_id)
            .ok_or_else(|| SwapError::connectivity(&chain.key, "no provider configured"))
    }
}

/// Split a failed quoter call into "pool absent" and "endpoint broken".
///
/// Only an execution revert, or return data that does not decode, means
/// there is nothing to quote. Any other JSON-RPC error reply (rate limits,
/// auth, unsupported method) and every transport failure is unreachable.
fn classify_quote_error(err: ContractError) -> ProbeOutcome {
    match err {
        ContractError::TransportError(RpcError::ErrorResp(payload)) if is_revert(&payload) => {
            debug!("quoter reverted: {}", payload.message);
            ProbeOutcome::NoPool
        }
        ContractError::TransportError(RpcError::ErrorResp(payload)) => {
            ProbeOutcome::Unreachable(payload.to_string())
        }
        ContractError::TransportError(e) => ProbeOutcome::Unreachable(e.to_string()),
        other => {
            debug!("quoter returned no usable data: {}", other);
            ProbeOutcome::NoPool
        }
    }
}

/// Code 3 is the standard revert code; some nodes only say so in the
/// message, others only attach the revert data.
fn is_revert(payload: &ErrorPayload) -> bool {
    payload.code == 3
        || payload.message.to_lowercase().contains("revert")
        || payload.data.as_ref().is_some_and(|data| data.get().trim_matches('"').starts_with("0x"))
}

#[async_trait]
impl ChainReader for RpcChainReader {
    async fn quote_exact_input_single(
        &self,
        chain: &ChainDescriptor,
        request: TierQuoteRequest,
    ) -> ProbeOutcome {
        let provider = match self.provider(chain) {
            Ok(provider) => provider,
            Err(e) => return ProbeOutcome::Unreachable(e.to_string()),
        };
        let quoter = IQuoterV2::new(chain.quoter, provider);

        let params = IQuoterV2::QuoteExactInputSingleParams {
            tokenIn: request.token_in,
            tokenOut: request.token_out,
            amountIn: request.amount_in,
            fee: U24::from(request.fee.pips()),
            sqrtPriceLimitX96: U160::ZERO,
        };

        match quoter.quoteExactInputSingle(params).call().await {
            Ok(result) => ProbeOutcome::Quoted {
                amount_out: result.amountOut,
                gas_estimate: result.gasEstimate,
            },
            Err(e) => classify_quote_error(e),
        }
    }

    async fn allowance(
        &self,
        chain: &ChainDescriptor,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> SwapResult<U256> {
        let provider = self.provider(chain)?;
        let contract = IERC20::new(token, provider);

        contract
            .allowance(owner, spender)
            .call()
            .await
            .map_err(|e| SwapError::connectivity(&chain.key, format!("allowance failed: {e}")))
    }
}
