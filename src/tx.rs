// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Unsigned swap payloads: `exactInputSingle` wrapped in a deadline
//! `multicall` on the router.

use crate::amount::{to_base_units, Slippage};
use crate::contracts::ISwapRouter02;
use crate::error::{SwapError, SwapResult};
use crate::quote::{positive_base_units, resolve_pair, Quote};
use crate::registry::ChainRegistry;
use alloy::primitives::{
    aliases::{U160, U24},
    Address, Bytes, U256,
};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Gas-limit hint attached to swap payloads.
pub const SWAP_GAS_LIMIT: u64 = 300_000;

/// Seconds a built swap stays executable.
pub const DEADLINE_SECS: u64 = 20 * 60;

/// A transaction ready for the caller to fill in nonce and fees, sign and
/// broadcast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    pub to: Address,
    pub data: Bytes,
    /// Wei attached; non-zero only for native-in swaps.
    pub value: U256,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gas_limit: Option<u64>,
}

impl UnsignedTransaction {
    pub fn into_request(self) -> TransactionRequest {
        let request =
            TransactionRequest::default().to(self.to).value(self.value).input(self.data.into());
        match self.gas_limit {
            Some(gas_limit) => request.gas_limit(gas_limit),
            None => request,
        }
    }
}

/// What the caller wants to swap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapRequest {
    pub chain: String,
    pub token_in: String,
    pub token_out: String,
    pub amount_in: String,
    pub recipient: Address,
    #[serde(default)]
    pub slippage: Slippage,
}

/// Build the swap for `request` at the price fixed by `quote`.
pub fn build_swap_transaction(
    registry: &ChainRegistry,
    request: &SwapRequest,
    quote: &Quote,
) -> SwapResult<UnsignedTransaction> {
    let now = u64::try_from(chrono::Utc::now().timestamp())
        .map_err(|_| SwapError::config("system clock is before the epoch"))?;
    build_swap_transaction_at(registry, request, quote, now)
}

/// [`build_swap_transaction`] with an explicit clock, in unix seconds.
pub fn build_swap_transaction_at(
    registry: &ChainRegistry,
    request: &SwapRequest,
    quote: &Quote,
    now: u64,
) -> SwapResult<UnsignedTransaction> {
    let chain = registry.resolve_chain(&request.chain)?;
    let (tin, tout) = resolve_pair(chain, &request.token_in, &request.token_out)?;
    let amount_in = positive_base_units(&request.amount_in, tin.decimals)?;

    if request.recipient.is_zero() {
        return Err(SwapError::InvalidAddress(request.recipient.to_string()));
    }

    // the quote must describe this exact swap
    let quoted_in = to_base_units(&quote.amount_in, tin.decimals)?;
    if quote.chain != chain.key
        || quote.token_in != tin.symbol
        || quote.token_out != tout.symbol
        || quoted_in != amount_in
    {
        return Err(SwapError::invalid_request(format!(
            "quote is for {} {} -> {} on {}, request is {} {} -> {} on {}",
            quote.amount_in,
            quote.token_in,
            quote.token_out,
            quote.chain,
            request.amount_in,
            tin.symbol,
            tout.symbol,
            chain.key
        )));
    }
    if !chain.fee_tiers.contains(&quote.fee_tier) {
        return Err(SwapError::invalid_request(format!(
            "fee tier {} is not enabled on {}",
            quote.fee_tier, chain.key
        )));
    }
    let min_out = to_base_units(&quote.min_amount_out, tout.decimals)?;

    let swap = ISwapRouter02::exactInputSingleCall {
        params: ISwapRouter02::ExactInputSingleParams {
            tokenIn: tin.address,
            tokenOut: tout.address,
            fee: U24::from(quote.fee_tier.pips()),
            recipient: request.recipient,
            amountIn: amount_in,
            amountOutMinimum: min_out,
            sqrtPriceLimitX96: U160::ZERO,
        },
    };

    let deadline = now
        .checked_add(DEADLINE_SECS)
        .ok_or_else(|| SwapError::invalid_request(format!("deadline overflows from {now}")))?;
    let multicall = ISwapRouter02::multicallCall {
        deadline: U256::from(deadline),
        data: vec![Bytes::from(swap.abi_encode())],
    };

    let value = if tin.native { amount_in } else { U256::ZERO };

    info!(
        "🔨 Built swap {} {} on {} (min out {} {}, deadline {})",
        quote.amount_in, quote.route, chain.key, quote.min_amount_out, tout.symbol, deadline
    );

    Ok(UnsignedTransaction {
        to: chain.router,
        data: multicall.abi_encode().into(),
        value,
        gas_limit: Some(SWAP_GAS_LIMIT),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::from_base_units;
    use crate::registry::FeeTier;

    const NOW: u64 = 1_700_000_000;

    fn recipient() -> Address {
        Address::repeat_byte(0x42)
    }

    fn request(chain: &str, token_in: &str, token_out: &str, amount_in: &str) -> SwapRequest {
        SwapRequest {
            chain: chain.to_string(),
            token_in: token_in.to_string(),
            token_out: token_out.to_string(),
            amount_in: amount_in.to_string(),
            recipient: recipient(),
            slippage: Slippage::default(),
        }
    }

    /// A quote as the engine would produce it for `request`.
    fn quote_for(registry: &ChainRegistry, request: &SwapRequest, out_units: u128, fee: FeeTier) -> Quote {
        let chain = registry.resolve_chain(&request.chain).unwrap();
        let (tin, tout) = resolve_pair(chain, &request.token_in, &request.token_out).unwrap();
        let amount_out = U256::from(out_units);
        Quote {
            chain: chain.key.clone(),
            token_in: tin.symbol.clone(),
            token_out: tout.symbol.clone(),
            amount_in: from_base_units(to_base_units(&request.amount_in, tin.decimals).unwrap(), tin.decimals),
            amount_out: from_base_units(amount_out, tout.decimals),
            min_amount_out: from_base_units(request.slippage.apply(amount_out), tout.decimals),
            route: format!("{} -> {} ({}% pool)", tin.symbol, tout.symbol, fee.percent()),
            fee_tier: fee,
            slippage: request.slippage,
            gas_estimate: U256::ZERO,
        }
    }

    fn decode(tx: &UnsignedTransaction) -> (U256, ISwapRouter02::ExactInputSingleParams) {
        let multicall = ISwapRouter02::multicallCall::abi_decode(&tx.data).unwrap();
        assert_eq!(multicall.data.len(), 1);
        let swap = ISwapRouter02::exactInputSingleCall::abi_decode(&multicall.data[0]).unwrap();
        (multicall.deadline, swap.params)
    }

    #[test]
    fn test_native_in_carries_value() {
        let registry = ChainRegistry::builtin();
        let req = request("polygon", "MATIC", "USDC", "10");
        let quote = quote_for(&registry, &req, 4_200_000, FeeTier::Medium);

        let tx = build_swap_transaction_at(&registry, &req, &quote, NOW).unwrap();
        let polygon = registry.resolve_chain("polygon").unwrap();
        assert_eq!(tx.value, U256::from(10_000_000_000_000_000_000u128));
        assert_eq!(tx.to, polygon.router);
        assert_eq!(tx.gas_limit, Some(SWAP_GAS_LIMIT));

        let (_, params) = decode(&tx);
        assert_eq!(params.tokenIn, polygon.token("WMATIC").unwrap().address);
        assert_eq!(params.amountIn, tx.value);
    }

    #[test]
    fn test_erc20_in_carries_no_value() {
        let registry = ChainRegistry::builtin();
        let req = request("polygon", "USDC", "MATIC", "10");
        let quote = quote_for(&registry, &req, 23_000_000_000_000_000_000, FeeTier::Medium);

        let tx = build_swap_transaction_at(&registry, &req, &quote, NOW).unwrap();
        assert_eq!(tx.value, U256::ZERO);
        let (_, params) = decode(&tx);
        assert_eq!(params.amountIn, U256::from(10_000_000u64));
    }

    #[test]
    fn test_encodes_quote_bounds_and_deadline() {
        let registry = ChainRegistry::builtin();
        let req = request("ethereum", "ETH", "USDC", "1.0");
        let quote = quote_for(&registry, &req, 3_501_150_000, FeeTier::High);
        assert_eq!(quote.min_amount_out, "3483.644250");

        let tx = build_swap_transaction_at(&registry, &req, &quote, NOW).unwrap();
        let ethereum = registry.resolve_chain("ethereum").unwrap();
        let (deadline, params) = decode(&tx);

        assert_eq!(deadline, U256::from(NOW + 1200));
        assert_eq!(params.tokenIn, ethereum.token("WETH").unwrap().address);
        assert_eq!(params.tokenOut, ethereum.token("USDC").unwrap().address);
        assert_eq!(params.fee, U24::from(10_000u32));
        assert_eq!(params.recipient, recipient());
        assert_eq!(params.amountOutMinimum, U256::from(3_483_644_250u64));
        assert_eq!(params.sqrtPriceLimitX96, U160::ZERO);
    }

    #[test]
    fn test_rejects_mismatched_quote() {
        let registry = ChainRegistry::builtin();
        let req = request("base", "ETH", "USDC", "1");
        let quote = quote_for(&registry, &req, 3_000_000_000, FeeTier::Low);

        let mut other_amount = req.clone();
        other_amount.amount_in = "2".to_string();
        let mut other_token = req.clone();
        other_token.token_out = "WETH".to_string();
        let mut other_chain = req.clone();
        other_chain.chain = "optimism".to_string();

        for bad in [other_amount, other_chain] {
            let err = build_swap_transaction_at(&registry, &bad, &quote, NOW).unwrap_err();
            assert!(matches!(err, SwapError::InvalidRequest(_)), "{err}");
        }
        // ETH -> WETH is rejected before the quote is even looked at
        assert!(build_swap_transaction_at(&registry, &other_token, &quote, NOW).is_err());

        // trailing zeros in the amount are not a mismatch
        let mut padded = req.clone();
        padded.amount_in = "1.000".to_string();
        assert!(build_swap_transaction_at(&registry, &padded, &quote, NOW).is_ok());
    }

    #[test]
    fn test_rejects_disabled_fee_tier() {
        let mut base = ChainRegistry::builtin().resolve_chain("base").unwrap().clone();
        base.fee_tiers = vec![FeeTier::Low, FeeTier::Medium];
        let registry = ChainRegistry::new([base]).unwrap();

        let req = request("base", "ETH", "USDC", "1");
        let enabled = quote_for(&registry, &req, 3_000_000_000, FeeTier::Medium);
        assert!(build_swap_transaction_at(&registry, &req, &enabled, NOW).is_ok());

        let disabled = quote_for(&registry, &req, 3_000_000_000, FeeTier::High);
        let err = build_swap_transaction_at(&registry, &req, &disabled, NOW).unwrap_err();
        assert!(matches!(err, SwapError::InvalidRequest(_)), "{err}");
    }

    #[test]
    fn test_rejects_deadline_overflow() {
        let registry = ChainRegistry::builtin();
        let req = request("ethereum", "ETH", "USDC", "1");
        let quote = quote_for(&registry, &req, 3_500_000_000, FeeTier::Low);

        let err = build_swap_transaction_at(&registry, &req, &quote, u64::MAX - 10).unwrap_err();
        assert!(matches!(err, SwapError::InvalidRequest(_)), "{err}");
        assert!(build_swap_transaction_at(&registry, &req, &quote, u64::MAX - DEADLINE_SECS).is_ok());
    }

    #[test]
    fn test_rejects_zero_recipient() {
        let registry = ChainRegistry::builtin();
        let mut req = request("arbitrum", "ARB", "USDC", "5");
        let quote = quote_for(&registry, &req, 4_000_000, FeeTier::Medium);
        req.recipient = Address::ZERO;
        assert!(matches!(
            build_swap_transaction_at(&registry, &req, &quote, NOW),
            Err(SwapError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_wall_clock_deadline_is_in_the_future() {
        let registry = ChainRegistry::builtin();
        let req = request("optimism", "ETH", "OP", "0.1");
        let quote = quote_for(&registry, &req, 150_000_000_000_000_000_000, FeeTier::Medium);

        let before = chrono::Utc::now().timestamp() as u64;
        let tx = build_swap_transaction(&registry, &req, &quote).unwrap();
        let (deadline, _) = decode(&tx);
        assert!(deadline >= U256::from(before + DEADLINE_SECS));
    }

    #[test]
    fn test_serializes_as_hex() {
        let tx = UnsignedTransaction {
            to: Address::repeat_byte(0xaa),
            data: Bytes::from(vec![0xde, 0xad]),
            value: U256::from(255u64),
            gas_limit: None,
        };
        let json = serde_json::to_value(&tx).unwrap();
        assert_eq!(json["data"], "0xdead");
        assert_eq!(json["value"], "0xff");
        assert!(json.get("gasLimit").is_none());
    }

    #[test]
    fn test_into_request() {
        let tx = UnsignedTransaction {
            to: Address::repeat_byte(0xaa),
            data: Bytes::from(vec![1, 2, 3]),
            value: U256::from(7u64),
            gas_limit: Some(SWAP_GAS_LIMIT),
        };
        let request = tx.clone().into_request();
        assert_eq!(request.to, Some(tx.to.into()));
        assert_eq!(request.value, Some(tx.value));
        assert_eq!(request.gas, Some(SWAP_GAS_LIMIT));
        assert_eq!(request.input.input(), Some(&tx.data));
        assert_eq!(request.nonce, None);
    }

    #[test]
    fn test_request_slippage_defaults() {
        let json = format!(
            r#"{{"chain":"base","tokenIn":"ETH","tokenOut":"USDC","amountIn":"1","recipient":"{}"}}"#,
            recipient()
        );
        let req: SwapRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(req.slippage, Slippage::default());
    }
}
