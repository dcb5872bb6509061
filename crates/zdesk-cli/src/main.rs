//! zdesk, an MCP server bridging Zendesk Support over stdio.

use std::io;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use zdesk_api::ZendeskClient;
use zdesk_config::{CliOverrides, ZdeskConfig};
use zdesk_core::{Server, ServerConfig};
use zdesk_mcp::Transport;
use zdesk_tools::ToolRegistry;

#[derive(Parser)]
#[command(name = "zdesk", version, about = "An MCP server for Zendesk Support")]
struct Cli {
    /// Zendesk subdomain (overrides ZENDESK_SUBDOMAIN)
    #[arg(long)]
    subdomain: Option<String>,

    /// Agent email for API authentication (overrides ZENDESK_EMAIL)
    #[arg(long)]
    email: Option<String>,

    /// API token (overrides ZENDESK_API_TOKEN)
    #[arg(long)]
    api_token: Option<String>,

    /// Enable verbose/debug logging
    #[arg(long)]
    verbose: bool,
}

// The peer drives concurrency through request interleaving, not threads:
// every in-flight request is a task on one cooperative executor.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol stream; all logging goes to stderr.
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .init();

    let config = ZdeskConfig::load(CliOverrides {
        subdomain: cli.subdomain,
        email: cli.email,
        api_token: cli.api_token,
    })
    .map_err(|e| anyhow::anyhow!("{e}"))?;

    let mut client = ZendeskClient::with_timeout(
        &config.subdomain,
        &config.email,
        &config.api_token,
        Duration::from_millis(config.request_timeout_ms),
    )
    .context("Failed to create Zendesk client")?
    .with_retry_policy(config.retry.clone());
    if let Some(base_url) = &config.base_url {
        client = client.with_base_url(base_url);
    }

    let registry = ToolRegistry::with_builtins(Arc::new(client));
    let server = Server::new(
        registry,
        ServerConfig {
            shutdown_timeout: Duration::from_millis(config.shutdown_timeout_ms),
            ..ServerConfig::default()
        },
    );

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    server
        .run(Transport::stdio(), cancel)
        .await
        .context("Transport failed")?;

    Ok(())
}
