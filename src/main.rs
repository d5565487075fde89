// Copyright (C) 2025 Category Labs, Inc.
// SPDX-License-Identifier: GPL-3.0-or-later

//! AMM swap engine - quotes and unsigned swap payloads across EVM chains

use amm_swap_engine::server::{start_server, ServerState};
use amm_swap_engine::{Config, RpcChainReader, Slippage, SwapEngine, SwapRequest};

use alloy::primitives::Address;
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(name = "amm-swap-engine")]
#[command(about = "Quote swaps and build unsigned swap transactions")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Best price across every fee tier
    Quote {
        #[arg(long)]
        chain: String,
        #[arg(long)]
        token_in: String,
        #[arg(long)]
        token_out: String,
        /// Human-decimal input amount, e.g. 1.5
        #[arg(long)]
        amount: String,
        /// Percent; defaults to DEFAULT_SLIPPAGE_PCT
        #[arg(long)]
        slippage: Option<Slippage>,
    },
    /// Check whether the router may spend an owner's tokens
    Allowance {
        #[arg(long)]
        chain: String,
        #[arg(long)]
        token: String,
        #[arg(long)]
        owner: Address,
        #[arg(long)]
        amount: String,
    },
    /// Build an unlimited approval for the router
    Approve {
        #[arg(long)]
        chain: String,
        #[arg(long)]
        token: String,
    },
    /// Quote and build the swap transaction
    Swap {
        #[arg(long)]
        chain: String,
        #[arg(long)]
        token_in: String,
        #[arg(long)]
        token_out: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        recipient: Address,
        #[arg(long)]
        slippage: Option<Slippage>,
    },
    /// Quote, allowance, approval and swap in one go
    Prepare {
        #[arg(long)]
        chain: String,
        #[arg(long)]
        token_in: String,
        #[arg(long)]
        token_out: String,
        #[arg(long)]
        amount: String,
        #[arg(long)]
        recipient: Address,
        /// Defaults to the recipient
        #[arg(long)]
        owner: Option<Address>,
        #[arg(long)]
        slippage: Option<Slippage>,
    },
    /// List chains and their tokens
    Chains,
    /// Serve the JSON API
    Serve {
        /// Overrides SERVER_PORT
        #[arg(long)]
        port: Option<u16>,
    },
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging; stdout is reserved for JSON output
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let reader = RpcChainReader::new(&config.registry)?;
    let engine = SwapEngine::new(config.registry.clone(), reader);
    let default_slippage = config.default_slippage;

    match cli.command {
        Commands::Quote { chain, token_in, token_out, amount, slippage } => {
            let quote = engine
                .get_quote(&chain, &token_in, &token_out, &amount, slippage.unwrap_or(default_slippage))
                .await?;
            print_json(&quote)?;
        }
        Commands::Allowance { chain, token, owner, amount } => {
            print_json(&engine.check_allowance(&chain, &token, owner, &amount).await?)?;
        }
        Commands::Approve { chain, token } => {
            print_json(&engine.build_approval_transaction(&chain, &token)?)?;
        }
        Commands::Swap { chain, token_in, token_out, amount, recipient, slippage } => {
            let request = SwapRequest {
                chain,
                token_in,
                token_out,
                amount_in: amount,
                recipient,
                slippage: slippage.unwrap_or(default_slippage),
            };
            let quote = engine
                .get_quote(
                    &request.chain,
                    &request.token_in,
                    &request.token_out,
                    &request.amount_in,
                    request.slippage,
                )
                .await?;
            let transaction = engine.build_swap_transaction(&request, &quote)?;
            print_json(&serde_json::json!({ "quote": quote, "transaction": transaction }))?;
        }
        Commands::Prepare { chain, token_in, token_out, amount, recipient, owner, slippage } => {
            let request = SwapRequest {
                chain,
                token_in,
                token_out,
                amount_in: amount,
                recipient,
                slippage: slippage.unwrap_or(default_slippage),
            };
            print_json(&engine.prepare_swap(&request, owner.unwrap_or(recipient)).await?)?;
        }
        Commands::Chains => {
            let chains: Vec<_> = engine.registry().chains().map(|chain| chain.summary()).collect();
            print_json(&serde_json::json!({ "chains": chains }))?;
        }
        Commands::Serve { port } => {
            let port = port.unwrap_or(config.server_port);
            info!("🚀 Serving {} chains", engine.supported_chains().len());
            start_server(port, Arc::new(ServerState { engine, default_slippage })).await?;
        }
    }

    Ok(())
}
