// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error types for the swap engine.

use serde::Serialize;

/// Coarse classification of a [`SwapError`], used by callers to decide
/// between rendering a message and retrying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Unknown chain or token, bad registry or environment.
    Configuration,
    /// Malformed amount, slippage, address or request.
    Validation,
    /// No fee tier returned a usable quote.
    Liquidity,
    /// The chain endpoint could not be reached or answered garbage.
    Connectivity,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Configuration => write!(f, "configuration"),
            ErrorKind::Validation => write!(f, "validation"),
            ErrorKind::Liquidity => write!(f, "liquidity"),
            ErrorKind::Connectivity => write!(f, "connectivity"),
        }
    }
}

/// An error returned by the swap engine
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SwapError {
    /// The chain key or id is not in the registry
    #[error("unsupported chain: {0}")]
    UnsupportedChain(String),
    /// The token symbol is not listed for the chain
    #[error("unsupported token {symbol} on {chain}")]
    UnsupportedToken {
        /// Chain key the lookup was made against
        chain: String,
        /// The offending symbol
        symbol: String,
    },
    /// Invalid runtime or registry configuration
    #[error("config error: {0}")]
    Config(String),
    /// The amount string could not be converted to base units
    #[error("invalid amount {amount:?}: {reason}")]
    InvalidAmount {
        /// The amount as supplied
        amount: String,
        /// Why it was rejected
        reason: String,
    },
    /// Slippage outside [0, 100) or unparseable
    #[error("invalid slippage {0:?}: must be a percentage in [0, 100)")]
    InvalidSlippage(String),
    /// Address could not be parsed
    #[error("invalid address {0:?}")]
    InvalidAddress(String),
    /// The request is well formed but cannot be served as asked
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// None of the probed fee tiers has a pool with liquidity
    #[error("no liquidity for {token_in}/{token_out} on {chain}")]
    NoLiquidity {
        /// Chain key
        chain: String,
        /// Input symbol
        token_in: String,
        /// Output symbol
        token_out: String,
    },
    /// The RPC endpoint failed
    #[error("rpc error on {chain}: {reason}")]
    Connectivity {
        /// Chain key
        chain: String,
        /// Transport-level description
        reason: String,
    },
}

impl SwapError {
    /// Create a new unsupported token error
    pub fn unsupported_token(chain: &str, symbol: &str) -> Self {
        SwapError::UnsupportedToken { chain: chain.to_string(), symbol: symbol.to_string() }
    }

    /// Create a new config error
    #[allow(clippy::needless_pass_by_value)]
    pub fn config<T: ToString>(e: T) -> Self {
        SwapError::Config(e.to_string())
    }

    /// Create a new invalid amount error
    pub fn invalid_amount<T: ToString>(amount: &str, reason: T) -> Self {
        SwapError::InvalidAmount { amount: amount.to_string(), reason: reason.to_string() }
    }

    /// Create a new invalid request error
    #[allow(clippy::needless_pass_by_value)]
    pub fn invalid_request<T: ToString>(e: T) -> Self {
        SwapError::InvalidRequest(e.to_string())
    }

    /// Create a new connectivity error
    pub fn connectivity<T: ToString>(chain: &str, reason: T) -> Self {
        SwapError::Connectivity { chain: chain.to_string(), reason: reason.to_string() }
    }

    /// The taxonomy bucket this error falls into
    pub fn kind(&self) -> ErrorKind {
        match self {
            SwapError::UnsupportedChain(_)
            | SwapError::UnsupportedToken { .. }
            | SwapError::Config(_) => ErrorKind::Configuration,
            SwapError::InvalidAmount { .. }
            | SwapError::InvalidSlippage(_)
            | SwapError::InvalidAddress(_)
            | SwapError::InvalidRequest(_) => ErrorKind::Validation,
            SwapError::NoLiquidity { .. } => ErrorKind::Liquidity,
            SwapError::Connectivity { .. } => ErrorKind::Connectivity,
        }
    }

    /// Whether retrying the same request later may succeed. The engine never
    /// retries on its own.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Connectivity
    }
}

/// Result alias used throughout the crate
pub type SwapResult<T> = Result<T, SwapError>;
