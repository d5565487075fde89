// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Multi-chain concentrated-liquidity swap engine: fee-tier quote discovery,
//! allowance checks and unsigned approval/swap payloads.

pub mod allowance;
pub mod amount;
pub mod config;
pub mod contracts;
pub mod engine;
pub mod error;
pub mod quote;
pub mod registry;
pub mod rpc;
pub mod server;
pub mod tx;

pub use allowance::AllowanceStatus;
pub use amount::Slippage;
pub use config::Config;
pub use engine::{SwapEngine, SwapPlan};
pub use error::{ErrorKind, SwapError, SwapResult};
pub use quote::Quote;
pub use registry::{ChainDescriptor, ChainRegistry, ChainSummary, FeeTier, TokenDescriptor};
pub use rpc::{ChainReader, RpcChainReader};
pub use tx::{SwapRequest, UnsignedTransaction};
