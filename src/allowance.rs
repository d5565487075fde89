// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Router allowance checks and unlimited-approval payloads.

use crate::amount::{from_base_units, to_base_units};
use crate::contracts::IERC20;
use crate::error::{SwapError, SwapResult};
use crate::quote::positive_base_units;
use crate::registry::ChainRegistry;
use crate::rpc::ChainReader;
use crate::tx::UnsignedTransaction;
use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use serde::Serialize;
use tracing::{debug, info};

/// Reported in place of an allowance for native assets.
pub const UNLIMITED: &str = "unlimited";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AllowanceStatus {
    pub needs_approval: bool,
    /// Human-decimal allowance granted to the router, or `unlimited`.
    pub current_allowance: String,
}

pub struct AllowanceChecker<'a, R: ChainReader> {
    registry: &'a ChainRegistry,
    reader: &'a R,
}

impl<'a, R: ChainReader> AllowanceChecker<'a, R> {
    pub fn new(registry: &'a ChainRegistry, reader: &'a R) -> Self {
        Self { registry, reader }
    }

    /// Whether `owner` must approve the router before swapping `amount` of
    /// `symbol`. Native assets never need approval and are not looked up.
    pub async fn check_allowance(
        &self,
        chain_key: &str,
        symbol: &str,
        owner: Address,
        amount: &str,
    ) -> SwapResult<AllowanceStatus> {
        let chain = self.registry.resolve_chain(chain_key)?;
        let token =
            chain.token(symbol).ok_or_else(|| SwapError::unsupported_token(&chain.key, symbol))?;
        if token.native {
            // any well-formed amount, zero included
            to_base_units(amount, token.decimals)?;
            debug!("{} is native on {}, no approval needed", token.symbol, chain.key);
            return Ok(AllowanceStatus { needs_approval: false, current_allowance: UNLIMITED.to_string() });
        }
        let requested = positive_base_units(amount, token.decimals)?;

        let current = self.reader.allowance(chain, token.address, owner, chain.router).await?;
        let needs_approval = current < requested;

        info!(
            "🔐 {} allowance for {} on {}: {} (need {}){}",
            token.symbol,
            owner,
            chain.key,
            from_base_units(current, token.decimals),
            from_base_units(requested, token.decimals),
            if needs_approval { " - approval required" } else { "" }
        );

        Ok(AllowanceStatus { needs_approval, current_allowance: from_base_units(current, token.decimals) })
    }
}

/// `approve(router, MAX)` on the token contract.
pub fn build_approval_transaction(
    registry: &ChainRegistry,
    chain_key: &str,
    symbol: &str,
) -> SwapResult<UnsignedTransaction> {
    let chain = registry.resolve_chain(chain_key)?;
    let token = chain.token(symbol).ok_or_else(|| SwapError::unsupported_token(&chain.key, symbol))?;
    if token.native {
        return Err(SwapError::invalid_request(format!(
            "{} is native on {} and needs no approval",
            token.symbol, chain.key
        )));
    }

    let data = IERC20::approveCall { spender: chain.router, amount: U256::MAX }.abi_encode();
    debug!("Approval payload for {} on {}: spender {}", token.symbol, chain.key, chain.router);

    Ok(UnsignedTransaction { to: token.address, data: data.into(), value: U256::ZERO, gas_limit: None })
}
