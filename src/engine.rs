// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! The caller-facing swap engine.
//!
//! Stateless apart from the shared registry and chain reader: every call
//! stands alone and nothing is signed or submitted. Callers sequence
//! quote, approval and swap themselves.

use crate::allowance::{self, AllowanceChecker, AllowanceStatus};
use crate::amount::Slippage;
use crate::error::SwapResult;
use crate::quote::{Quote, QuoteEngine};
use crate::registry::ChainRegistry;
use crate::rpc::ChainReader;
use crate::tx::{self, SwapRequest, UnsignedTransaction};
use alloy::primitives::Address;
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

/// Everything needed to execute a swap, in submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapPlan {
    pub quote: Quote,
    pub allowance: AllowanceStatus,
    /// Present when the router must be approved first. Its confirmation
    /// has to land before the swap is sent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approval: Option<UnsignedTransaction>,
    pub swap: UnsignedTransaction,
}

pub struct SwapEngine<R: ChainReader> {
    registry: Arc<ChainRegistry>,
    reader: Arc<R>,
}

impl<R: ChainReader> Clone for SwapEngine<R> {
    fn clone(&self) -> Self {
        Self { registry: Arc::clone(&self.registry), reader: Arc::clone(&self.reader) }
    }
}

impl<R: ChainReader> SwapEngine<R> {
    pub fn new(registry: ChainRegistry, reader: R) -> Self {
        Self { registry: Arc::new(registry), reader: Arc::new(reader) }
    }

    pub fn registry(&self) -> &ChainRegistry {
        &self.registry
    }

    pub async fn get_quote(
        &self,
        chain_key: &str,
        token_in: &str,
        token_out: &str,
        amount_in: &str,
        slippage: Slippage,
    ) -> SwapResult<Quote> {
        QuoteEngine::new(&self.registry, self.reader.as_ref())
            .get_quote(chain_key, token_in, token_out, amount_in, slippage)
            .await
    }

    pub async fn check_allowance(
        &self,
        chain_key: &str,
        symbol: &str,
        owner: Address,
        amount: &str,
    ) -> SwapResult<AllowanceStatus> {
        AllowanceChecker::new(&self.registry, self.reader.as_ref())
            .check_allowance(chain_key, symbol, owner, amount)
            .await
    }

    pub fn build_approval_transaction(
        &self,
        chain_key: &str,
        symbol: &str,
    ) -> SwapResult<UnsignedTransaction> {
        allowance::build_approval_transaction(&self.registry, chain_key, symbol)
    }

    pub fn build_swap_transaction(
        &self,
        request: &SwapRequest,
        quote: &Quote,
    ) -> SwapResult<UnsignedTransaction> {
        tx::build_swap_transaction(&self.registry, request, quote)
    }

    /// Quote, check the owner's allowance and build both payloads.
    ///
    /// The quote and the allowance read run concurrently.
    pub async fn prepare_swap(&self, request: &SwapRequest, owner: Address) -> SwapResult<SwapPlan> {
        let (quote, allowance) = tokio::try_join!(
            self.get_quote(
                &request.chain,
                &request.token_in,
                &request.token_out,
                &request.amount_in,
                request.slippage
            ),
            self.check_allowance(&request.chain, &request.token_in, owner, &request.amount_in),
        )?;

        let approval = if allowance.needs_approval {
            Some(self.build_approval_transaction(&request.chain, &request.token_in)?)
        } else {
            None
        };
        let swap = self.build_swap_transaction(request, &quote)?;

        info!(
            "📋 Prepared {} on {} for {}{}",
            quote.route,
            quote.chain,
            owner,
            if approval.is_some() { " (approval first)" } else { "" }
        );

        Ok(SwapPlan { quote, allowance, approval, swap })
    }

    pub fn supported_chains(&self) -> Vec<&str> {
        self.registry.supported_chains()
    }

    pub fn supported_tokens(&self, chain_key: &str) -> SwapResult<Vec<&str>> {
        self.registry.supported_tokens(chain_key)
    }

    pub fn explorer_tx_url(&self, chain_key: &str, tx_hash: &str) -> SwapResult<String> {
        Ok(self.registry.resolve_chain(chain_key)?.explorer_tx_url(tx_hash))
    }
}
