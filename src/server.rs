// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! JSON-over-HTTP surface for the swap engine.

use crate::amount::Slippage;
use crate::engine::SwapEngine;
use crate::error::{ErrorKind, SwapError};
use crate::registry::ChainSummary;
use crate::rpc::ChainReader;
use crate::tx::SwapRequest;
use alloy::primitives::Address;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

/// Shared by every handler.
pub struct ServerState<R: ChainReader> {
    pub engine: SwapEngine<R>,
    /// Applied when a request leaves slippage out.
    pub default_slippage: Slippage,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteBody {
    chain: String,
    token_in: String,
    token_out: String,
    amount_in: String,
    slippage: Option<Slippage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AllowanceBody {
    chain: String,
    token: String,
    owner: Address,
    amount: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApproveBody {
    chain: String,
    token: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SwapBody {
    chain: String,
    token_in: String,
    token_out: String,
    amount_in: String,
    recipient: Address,
    slippage: Option<Slippage>,
    /// Account whose allowance is checked; defaults to the recipient.
    owner: Option<Address>,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: ErrorKind,
    message: String,
}

/// Error half of every handler.
struct ApiError(SwapError);

impl From<SwapError> for ApiError {
    fn from(err: SwapError) -> Self {
        Self(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self(SwapError::invalid_request(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let status = match kind {
            ErrorKind::Configuration | ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Liquidity => StatusCode::NOT_FOUND,
            ErrorKind::Connectivity => StatusCode::BAD_GATEWAY,
        };
        if kind == ErrorKind::Connectivity {
            warn!("Upstream failure: {}", self.0);
        }
        (status, Json(ErrorBody { error: kind, message: self.0.to_string() })).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Routes over `engine`, ready to be served or driven in-process.
pub fn router<R: ChainReader + 'static>(state: Arc<ServerState<R>>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/chains", get(list_chains::<R>))
        .route("/quote", post(quote::<R>))
        .route("/allowance", post(allowance::<R>))
        .route("/approve", post(approve::<R>))
        .route("/swap", post(swap::<R>))
        .with_state(state)
}

/// Bind `0.0.0.0:port` and serve until the listener fails.
pub async fn start_server<R: ChainReader + 'static>(
    port: u16,
    state: Arc<ServerState<R>>,
) -> std::io::Result<()> {
    let addr = format!("0.0.0.0:{}", port);
    info!("🌐 Starting swap API on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router(state)).await
}

async fn health_check() -> &'static str {
    "OK"
}

async fn list_chains<R: ChainReader>(
    State(state): State<Arc<ServerState<R>>>,
) -> Json<serde_json::Value> {
    let chains: Vec<ChainSummary<'_>> = state.engine.registry().chains().map(|c| c.summary()).collect();
    Json(serde_json::json!({ "chains": chains }))
}

async fn quote<R: ChainReader>(
    State(state): State<Arc<ServerState<R>>>,
    body: Result<Json<QuoteBody>, JsonRejection>,
) -> ApiResult<crate::quote::Quote> {
    let Json(body) = body?;
    let slippage = body.slippage.unwrap_or(state.default_slippage);
    let quote = state
        .engine
        .get_quote(&body.chain, &body.token_in, &body.token_out, &body.amount_in, slippage)
        .await?;
    Ok(Json(quote))
}

async fn allowance<R: ChainReader>(
    State(state): State<Arc<ServerState<R>>>,
    body: Result<Json<AllowanceBody>, JsonRejection>,
) -> ApiResult<crate::allowance::AllowanceStatus> {
    let Json(body) = body?;
    let status = state.engine.check_allowance(&body.chain, &body.token, body.owner, &body.amount).await?;
    Ok(Json(status))
}

async fn approve<R: ChainReader>(
    State(state): State<Arc<ServerState<R>>>,
    body: Result<Json<ApproveBody>, JsonRejection>,
) -> ApiResult<crate::tx::UnsignedTransaction> {
    let Json(body) = body?;
    Ok(Json(state.engine.build_approval_transaction(&body.chain, &body.token)?))
}

async fn swap<R: ChainReader>(
    State(state): State<Arc<ServerState<R>>>,
    body: Result<Json<SwapBody>, JsonRejection>,
) -> ApiResult<crate::engine::SwapPlan> {
    let Json(body) = body?;
    let owner = body.owner.unwrap_or(body.recipient);
    let request = SwapRequest {
        chain: body.chain,
        token_in: body.token_in,
        token_out: body.token_out,
        amount_in: body.amount_in,
        recipient: body.recipient,
        slippage: body.slippage.unwrap_or(state.default_slippage),
    };
    Ok(Json(state.engine.prepare_swap(&request, owner).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{ChainRegistry, FeeTier};
    use crate::rpc::mock::MockChainReader;
    use crate::rpc::ProbeOutcome;
    use alloy::primitives::U256;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    fn app(reader: MockChainReader) -> Router {
        router(Arc::new(ServerState {
            engine: SwapEngine::new(ChainRegistry::builtin(), reader),
            default_slippage: Slippage::default(),
        }))
    }

    async fn send(app: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn test_health() {
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app(MockChainReader::new()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_chains() {
        let (status, body) = send(app(MockChainReader::new()), "GET", "/chains", None).await;
        assert_eq!(status, StatusCode::OK);
        let chains = body["chains"].as_array().unwrap();
        assert_eq!(chains.len(), 5);
        let polygon = chains.iter().find(|c| c["key"] == "polygon").unwrap();
        assert_eq!(polygon["chainId"], 137);
        assert_eq!(polygon["nativeSymbol"], "MATIC");
        assert_eq!(polygon["feeTiers"], json!([100, 500, 3000, 10000]));
    }

    #[tokio::test]
    async fn test_quote() {
        let reader = MockChainReader::new()
            .with_quote(FeeTier::Medium, 3_498_200_000)
            .with_quote(FeeTier::High, 3_501_150_000);
        let body = json!({"chain": "ethereum", "tokenIn": "ETH", "tokenOut": "USDC", "amountIn": "1.0"});

        let (status, quote) = send(app(reader), "POST", "/quote", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(quote["amountOut"], "3501.150000");
        assert_eq!(quote["minAmountOut"], "3483.644250");
        assert_eq!(quote["feeTier"], 10000);
        assert_eq!(quote["slippage"], "0.5");
        assert_eq!(quote["route"], "ETH -> USDC (1% pool)");
    }

    #[tokio::test]
    async fn test_error_statuses() {
        let quote = |token_out: &str| {
            json!({"chain": "base", "tokenIn": "ETH", "tokenOut": token_out, "amountIn": "1"})
        };

        let (status, body) = send(app(MockChainReader::new()), "POST", "/quote", Some(quote("DOGE"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "configuration");

        let (status, body) = send(app(MockChainReader::new()), "POST", "/quote", Some(quote("USDC"))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "liquidity");

        let mut down = MockChainReader::new();
        for fee in FeeTier::ALL {
            down = down.with_tier(fee, ProbeOutcome::Unreachable("refused".into()));
        }
        let (status, body) = send(app(down), "POST", "/quote", Some(quote("USDC"))).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert_eq!(body["error"], "connectivity");

        let (status, body) =
            send(app(MockChainReader::new()), "POST", "/quote", Some(json!({"chain": "base"}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "validation");
    }

    #[tokio::test]
    async fn test_allowance_and_approve() {
        let owner = Address::repeat_byte(0x22);
        let reader = MockChainReader::new().with_allowance(Ok(U256::from(50_000_000u64)));
        let body = json!({"chain": "ethereum", "token": "USDC", "owner": owner, "amount": "100"});

        let (status, allowance) = send(app(reader), "POST", "/allowance", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(allowance, json!({"needsApproval": true, "currentAllowance": "50.000000"}));

        let body = json!({"chain": "ethereum", "token": "USDC"});
        let (status, tx) = send(app(MockChainReader::new()), "POST", "/approve", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(tx["value"], "0x0");
        assert!(tx["data"].as_str().unwrap().starts_with("0x095ea7b3"));
    }

    #[tokio::test]
    async fn test_swap_plan() {
        let recipient = Address::repeat_byte(0x33);
        let reader = MockChainReader::new().with_quote(FeeTier::Medium, 4_200_000);
        let body = json!({
            "chain": "polygon",
            "tokenIn": "MATIC",
            "tokenOut": "USDC",
            "amountIn": "10",
            "recipient": recipient,
            "slippage": 1
        });

        let (status, plan) = send(app(reader), "POST", "/swap", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(plan["quote"]["slippage"], "1");
        assert!(plan.get("approval").is_none());
        assert_eq!(plan["swap"]["value"], "0x8ac7230489e80000");
        assert_eq!(plan["swap"]["gasLimit"], 300_000);
    }
}
