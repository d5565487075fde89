// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Deployments shipped with the crate.

use super::{ChainDescriptor, FeeTier, TokenDescriptor};
use alloy::primitives::{address, Address};
use std::collections::BTreeMap;

/// SwapRouter02, same address on most deployments.
const ROUTER_02: Address = address!("68b3465833fb72A70ecDF485E0e4C7bD8665Fc45");

/// QuoterV2, same address on most deployments.
const QUOTER_V2: Address = address!("61fFE014bA17989E743c5F6cB21bF9697530B21e");

/// Canonical WETH predeploy on OP-stack chains.
const OP_STACK_WETH: Address = address!("4200000000000000000000000000000000000006");

struct ChainSpec {
    key: &'static str,
    chain_id: u64,
    name: &'static str,
    router: Address,
    quoter: Address,
    explorer: &'static str,
    rpc_url: &'static str,
    native: &'static str,
    wrapped: &'static str,
    tokens: &'static [(&'static str, Address, u8)],
}

const CHAINS: &[ChainSpec] = &[
    ChainSpec {
        key: "ethereum",
        chain_id: 1,
        name: "Ethereum",
        router: ROUTER_02,
        quoter: QUOTER_V2,
        explorer: "https://etherscan.io/tx/{hash}",
        rpc_url: "https://eth.llamarpc.com",
        native: "ETH",
        wrapped: "WETH",
        tokens: &[
            ("ETH", address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"), 18),
            ("WETH", address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"), 18),
            ("USDC", address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"), 6),
            ("USDT", address!("dAC17F958D2ee523a2206206994597C13D831ec7"), 6),
            ("WBTC", address!("2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599"), 8),
            ("DAI", address!("6B175474E89094C44Da98b954EedeAC495271d0F"), 18),
        ],
    },
    ChainSpec {
        key: "arbitrum",
        chain_id: 42161,
        name: "Arbitrum",
        router: ROUTER_02,
        quoter: QUOTER_V2,
        explorer: "https://arbiscan.io/tx/{hash}",
        rpc_url: "https://arb1.arbitrum.io/rpc",
        native: "ETH",
        wrapped: "WETH",
        tokens: &[
            ("ETH", address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1"), 18),
            ("WETH", address!("82aF49447D8a07e3bd95BD0d56f35241523fBab1"), 18),
            ("USDC", address!("af88d065e77c8cC2239327C5EDb3A432268e5831"), 6),
            ("USDT", address!("Fd086bC7CD5C481DCC9C85ebE478A1C0b69FCbb9"), 6),
            ("ARB", address!("912CE59144191C1204E64559FE8253a0e49E6548"), 18),
        ],
    },
    ChainSpec {
        key: "base",
        chain_id: 8453,
        name: "Base",
        router: address!("2626664c2603336E57B271c5C0b26F421741e481"),
        quoter: address!("3d4e44Eb1374240CE5F1B871ab261CD16335B76a"),
        explorer: "https://basescan.org/tx/{hash}",
        rpc_url: "https://mainnet.base.org",
        native: "ETH",
        wrapped: "WETH",
        tokens: &[
            ("ETH", OP_STACK_WETH, 18),
            ("WETH", OP_STACK_WETH, 18),
            ("USDC", address!("833589fCD6eDb6E08f4c7C32D4f71b54bdA02913"), 6),
        ],
    },
    ChainSpec {
        key: "polygon",
        chain_id: 137,
        name: "Polygon",
        router: ROUTER_02,
        quoter: QUOTER_V2,
        explorer: "https://polygonscan.com/tx/{hash}",
        rpc_url: "https://polygon-rpc.com",
        native: "MATIC",
        wrapped: "WMATIC",
        tokens: &[
            ("MATIC", address!("0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270"), 18),
            ("WMATIC", address!("0d500B1d8E8eF31E21C99d1Db9A6444d3ADf1270"), 18),
            ("USDC", address!("3c499c542cEF5E3811e1192ce70d8cC03d5c3359"), 6),
            ("USDT", address!("c2132D05D31c914a87C6611C10748AEb04B58e8F"), 6),
            ("WETH", address!("7ceB23fD6bC0adD59E62ac25578270cFf1b9f619"), 18),
        ],
    },
    ChainSpec {
        key: "optimism",
        chain_id: 10,
        name: "Optimism",
        router: ROUTER_02,
        quoter: QUOTER_V2,
        explorer: "https://optimistic.etherscan.io/tx/{hash}",
        rpc_url: "https://mainnet.optimism.io",
        native: "ETH",
        wrapped: "WETH",
        tokens: &[
            ("ETH", OP_STACK_WETH, 18),
            ("WETH", OP_STACK_WETH, 18),
            ("USDC", address!("0b2C639c533813f4Aa9D7837CAf62653d097Ff85"), 6),
            ("OP", address!("4200000000000000000000000000000000000042"), 18),
        ],
    },
];

/// Descriptors for every builtin deployment.
pub(super) fn chains() -> Vec<ChainDescriptor> {
    CHAINS.iter().map(ChainSpec::descriptor).collect()
}

impl ChainSpec {
    fn descriptor(&self) -> ChainDescriptor {
        let tokens: BTreeMap<String, TokenDescriptor> = self
            .tokens
            .iter()
            .map(|&(symbol, address, decimals)| {
                let token = TokenDescriptor {
                    symbol: symbol.to_string(),
                    address,
                    decimals,
                    native: symbol == self.native,
                };
                (symbol.to_string(), token)
            })
            .collect();

        ChainDescriptor {
            key: self.key.to_string(),
            chain_id: self.chain_id,
            name: self.name.to_string(),
            router: self.router,
            quoter: self.quoter,
            explorer_tx_template: self.explorer.to_string(),
            rpc_url: self.rpc_url.to_string(),
            native_symbol: self.native.to_string(),
            wrapped_native_symbol: self.wrapped.to_string(),
            fee_tiers: FeeTier::ALL.to_vec(),
            tokens,
        }
    }
}
