// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Quote engine: probes every fee tier of a pair and keeps the best price.

use crate::amount::{from_base_units, to_base_units, Slippage};
use crate::error::{SwapError, SwapResult};
use crate::registry::{ChainDescriptor, ChainRegistry, FeeTier, TokenDescriptor};
use crate::rpc::{ChainReader, ProbeOutcome, TierQuoteRequest};
use alloy::primitives::U256;
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Best available single-hop price for a pair.
///
/// Only valid for the caller's immediate use; prices move every block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub chain: String,
    pub token_in: String,
    pub token_out: String,
    /// Input amount, normalised to the input token's precision.
    pub amount_in: String,
    pub amount_out: String,
    /// `amount_out` less slippage; the swap reverts below this.
    pub min_amount_out: String,
    /// e.g. `ETH -> USDC (0.3% pool)`
    pub route: String,
    /// Serialized as pips (3000).
    pub fee_tier: FeeTier,
    pub slippage: Slippage,
    /// Gas the quoter reports for the swap itself.
    pub gas_estimate: U256,
}

/// Outcome of comparing every tier's probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TierSelection {
    Best { fee: FeeTier, amount_out: U256, gas_estimate: U256 },
    NoLiquidity,
    /// Every probe failed on the wire; carries the last failure.
    AllUnreachable(String),
}

/// Pick the tier with the strictly greatest output.
///
/// Expects one entry per probed tier, all resolved. Zero output counts as
/// no liquidity. On equal output the earlier (cheaper) tier is kept.
pub(crate) fn select_best(probes: &[(FeeTier, ProbeOutcome)]) -> TierSelection {
    let mut best: Option<(FeeTier, U256, U256)> = None;
    let mut unreachable = 0;
    let mut last_failure = String::new();

    for (fee, outcome) in probes {
        match outcome {
            ProbeOutcome::Quoted { amount_out, gas_estimate } if !amount_out.is_zero() => {
                if best.map_or(true, |(_, incumbent, _)| *amount_out > incumbent) {
                    best = Some((*fee, *amount_out, *gas_estimate));
                }
            }
            ProbeOutcome::Quoted { .. } | ProbeOutcome::NoPool => {}
            ProbeOutcome::Unreachable(reason) => {
                unreachable += 1;
                last_failure = reason.clone();
            }
        }
    }

    match best {
        Some((fee, amount_out, gas_estimate)) => TierSelection::Best { fee, amount_out, gas_estimate },
        None if !probes.is_empty() && unreachable == probes.len() => {
            TierSelection::AllUnreachable(last_failure)
        }
        None => TierSelection::NoLiquidity,
    }
}

/// Resolves a pair and finds its best fee tier.
pub struct QuoteEngine<'a, R: ChainReader> {
    registry: &'a ChainRegistry,
    reader: &'a R,
}

impl<'a, R: ChainReader> QuoteEngine<'a, R> {
    pub fn new(registry: &'a ChainRegistry, reader: &'a R) -> Self {
        Self { registry, reader }
    }

    /// Quote `amount_in` of `token_in` for `token_out` on `chain_key`.
    ///
    /// Every enabled fee tier is probed concurrently; the comparison only
    /// starts once all of them have answered.
    pub async fn get_quote(
        &self,
        chain_key: &str,
        token_in: &str,
        token_out: &str,
        amount_in: &str,
        slippage: Slippage,
    ) -> SwapResult<Quote> {
        let chain = self.registry.resolve_chain(chain_key)?;
        let (tin, tout) = resolve_pair(chain, token_in, token_out)?;
        let amount_in_units = positive_base_units(amount_in, tin.decimals)?;

        debug!(
            "Probing {} tiers for {} -> {} on {}",
            chain.fee_tiers.len(),
            tin.symbol,
            tout.symbol,
            chain.key
        );

        let probes = join_all(chain.fee_tiers.iter().map(|&fee| async move {
            let request = TierQuoteRequest {
                token_in: tin.address,
                token_out: tout.address,
                amount_in: amount_in_units,
                fee,
            };
            let outcome = self.reader.quote_exact_input_single(chain, request).await;
            debug!("{} tier {}: {:?}", chain.key, fee, outcome);
            (fee, outcome)
        }))
        .await;

        let failed = probes
            .iter()
            .filter(|(_, outcome)| matches!(outcome, ProbeOutcome::Unreachable(_)))
            .count();
        if failed > 0 && failed < probes.len() {
            warn!("{} of {} tier probes on {} failed on the wire", failed, probes.len(), chain.key);
        }

        let (fee, amount_out, gas_estimate) = match select_best(&probes) {
            TierSelection::Best { fee, amount_out, gas_estimate } => (fee, amount_out, gas_estimate),
            TierSelection::NoLiquidity => {
                return Err(SwapError::NoLiquidity {
                    chain: chain.key.clone(),
                    token_in: tin.symbol.clone(),
                    token_out: tout.symbol.clone(),
                })
            }
            TierSelection::AllUnreachable(reason) => {
                return Err(SwapError::connectivity(&chain.key, reason));
            }
        };

        let min_out = slippage.apply(amount_out);
        let quote = Quote {
            chain: chain.key.clone(),
            token_in: tin.symbol.clone(),
            token_out: tout.symbol.clone(),
            amount_in: from_base_units(amount_in_units, tin.decimals),
            amount_out: from_base_units(amount_out, tout.decimals),
            min_amount_out: from_base_units(min_out, tout.decimals),
            route: format!("{} -> {} ({}% pool)", tin.symbol, tout.symbol, fee.percent()),
            fee_tier: fee,
            slippage,
            gas_estimate,
        };

        info!("💱 {} {} = {} on {}", quote.amount_in, quote.route, quote.amount_out, chain.name);

        Ok(quote)
    }
}

/// Resolve both sides of a pair and reject swapping an asset for itself.
pub(crate) fn resolve_pair<'c>(
    chain: &'c ChainDescriptor,
    token_in: &str,
    token_out: &str,
) -> SwapResult<(&'c TokenDescriptor, &'c TokenDescriptor)> {
    let tin = chain.token(token_in).ok_or_else(|| SwapError::unsupported_token(&chain.key, token_in))?;
    let tout =
        chain.token(token_out).ok_or_else(|| SwapError::unsupported_token(&chain.key, token_out))?;
    if tin.address == tout.address {
        return Err(SwapError::invalid_request(format!(
            "{} and {} are the same asset on {}",
            tin.symbol, tout.symbol, chain.key
        )));
    }
    Ok((tin, tout))
}

/// Base units of a strictly positive amount.
pub(crate) fn positive_base_units(amount: &str, decimals: u8) -> SwapResult<U256> {
    let units = to_base_units(amount, decimals)?;
    if units.is_zero() {
        return Err(SwapError::invalid_amount(amount, "must be greater than zero"));
    }
    Ok(units)
}
