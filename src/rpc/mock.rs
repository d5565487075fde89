// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! Scripted [`ChainReader`] for tests. Never used outside `cfg(test)`.

use super::{ChainReader, ProbeOutcome, TierQuoteRequest};
use crate::error::{SwapError, SwapResult};
use crate::registry::{ChainDescriptor, FeeTier};
use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

#[derive(Default)]
pub(crate) struct MockChainReader {
    tiers: Mutex<HashMap<FeeTier, ProbeOutcome>>,
    allowance: Mutex<Option<SwapResult<U256>>>,
    requests: Mutex<Vec<TierQuoteRequest>>,
    quote_calls: AtomicUsize,
    allowance_calls: AtomicUsize,
}

impl MockChainReader {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Script a tier's answer. Unscripted tiers answer `NoPool`.
    pub(crate) fn with_tier(self, fee: FeeTier, outcome: ProbeOutcome) -> Self {
        self.tiers.lock().unwrap().insert(fee, outcome);
        self
    }

    pub(crate) fn with_quote(self, fee: FeeTier, amount_out: u128) -> Self {
        self.with_tier(
            fee,
            ProbeOutcome::Quoted {
                amount_out: U256::from(amount_out),
                gas_estimate: U256::from(120_000u64),
            },
        )
    }

    pub(crate) fn with_allowance(self, allowance: SwapResult<U256>) -> Self {
        *self.allowance.lock().unwrap() = Some(allowance);
        self
    }

    pub(crate) fn quote_calls(&self) -> usize {
        self.quote_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn allowance_calls(&self) -> usize {
        self.allowance_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<TierQuoteRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChainReader for MockChainReader {
    async fn quote_exact_input_single(
        &self,
        _chain: &ChainDescriptor,
        request: TierQuoteRequest,
    ) -> ProbeOutcome {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        // let sibling probes start before this one answers
        tokio::task::yield_now().await;
        self.tiers.lock().unwrap().get(&request.fee).cloned().unwrap_or(ProbeOutcome::NoPool)
    }

    async fn allowance(
        &self,
        chain: &ChainDescriptor,
        _token: Address,
        _owner: Address,
        _spender: Address,
    ) -> SwapResult<U256> {
        self.allowance_calls.fetch_add(1, Ordering::SeqCst);
        self.allowance
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Err(SwapError::connectivity(&chain.key, "allowance not scripted")))
    }
}
