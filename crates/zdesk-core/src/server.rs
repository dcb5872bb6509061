//! The MCP server loop: handshake, request intake, concurrent dispatch,
//! graceful shutdown.
//!
//! Requests are read in arrival order; each `tools/call` runs as its own
//! task so a slow upstream call never blocks intake, and responses complete
//! in whatever order the backend allows. The correlation id is the only
//! ordering the peer may rely on.

use std::sync::Arc;
use std::time::Duration;

use tokio::io::AsyncBufRead;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use zdesk_mcp::jsonrpc::{JsonRpcRequest, JsonRpcResponse, codes};
use zdesk_mcp::protocol::{CallToolParams, InitializeResult, ToolEntry};
use zdesk_mcp::transport::{Inbound, ResponseSender, Transport, TransportError};
use zdesk_tools::ToolRegistry;

use crate::dispatch::dispatch;

/// Server identity and shutdown tuning.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    /// How long in-flight dispatches may run after shutdown begins.
    pub shutdown_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "zdesk".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            shutdown_timeout: Duration::from_secs(10),
        }
    }
}

/// The session/lifecycle manager: owns the registry and drives one
/// connection from handshake to shutdown.
pub struct Server {
    registry: Arc<ToolRegistry>,
    config: ServerConfig,
}

impl Server {
    pub fn new(registry: ToolRegistry, config: ServerConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
        }
    }

    /// Run until end of stream or cancellation.
    ///
    /// A cancellation signal stops intake only: requests already dispatched
    /// run to completion, bounded by the shutdown timeout, then stragglers
    /// are aborted. Only transport-breaking failures return an error.
    pub async fn run<R>(
        &self,
        mut transport: Transport<R>,
        cancel: CancellationToken,
    ) -> Result<(), TransportError>
    where
        R: AsyncBufRead + Unpin,
    {
        let sender = transport.sender();
        let mut in_flight: JoinSet<()> = JoinSet::new();
        let mut initialized = false;
        let mut fatal = None;

        tracing::info!(
            "{} v{} serving {} tools",
            self.config.name,
            self.config.version,
            self.registry.len()
        );

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::info!("shutdown signal received");
                    break;
                }
                inbound = transport.receive() => {
                    let Some(inbound) = inbound else {
                        tracing::info!("end of stream");
                        break;
                    };
                    let outcome = match inbound {
                        Inbound::Malformed { id, message } => {
                            tracing::warn!("malformed frame: {message}");
                            sender
                                .send(JsonRpcResponse::error(
                                    id,
                                    codes::PARSE_ERROR,
                                    format!("ProtocolDecodeError: {message}"),
                                ))
                                .await
                        }
                        Inbound::Notification(n) => {
                            match n.method.as_str() {
                                "notifications/initialized" => {
                                    tracing::debug!("peer reports initialized");
                                }
                                other => {
                                    tracing::debug!(method = other, "ignoring notification");
                                }
                            }
                            Ok(())
                        }
                        Inbound::Request(req) => {
                            self.handle_request(req, &sender, &mut in_flight, &mut initialized)
                                .await
                        }
                    };
                    if let Err(e) = outcome {
                        tracing::error!("transport failed: {e}");
                        fatal = Some(e);
                        break;
                    }
                }
            }
        }

        // Drain in-flight dispatches, bounded by the shutdown timeout.
        let drain = async {
            while in_flight.join_next().await.is_some() {}
        };
        if tokio::time::timeout(self.config.shutdown_timeout, drain)
            .await
            .is_err()
        {
            tracing::warn!(
                "shutdown timeout ({:?}) elapsed; abandoning remaining dispatches",
                self.config.shutdown_timeout
            );
            in_flight.abort_all();
            while in_flight.join_next().await.is_some() {}
        }

        drop(sender);
        transport.shutdown().await;

        match fatal {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    async fn handle_request(
        &self,
        req: JsonRpcRequest,
        sender: &ResponseSender,
        in_flight: &mut JoinSet<()>,
        initialized: &mut bool,
    ) -> Result<(), TransportError> {
        match req.method.as_str() {
            "initialize" => {
                if *initialized {
                    return sender
                        .send(JsonRpcResponse::error(
                            Some(req.id),
                            codes::INVALID_REQUEST,
                            "server is already initialized",
                        ))
                        .await;
                }
                *initialized = true;
                let result = InitializeResult::new(&self.config.name, &self.config.version);
                let payload = serde_json::to_value(result)
                    .unwrap_or_else(|_| serde_json::json!({}));
                sender.send(JsonRpcResponse::success(req.id, payload)).await
            }
            "ping" => {
                sender
                    .send(JsonRpcResponse::success(req.id, serde_json::json!({})))
                    .await
            }
            "tools/list" => {
                if !*initialized {
                    return self.reject_uninitialized(req, sender).await;
                }
                let tools: Vec<ToolEntry> = self
                    .registry
                    .definitions()
                    .into_iter()
                    .map(|def| ToolEntry {
                        name: def.name,
                        description: def.description,
                        input_schema: def.input_schema.to_json_schema(),
                    })
                    .collect();
                sender
                    .send(JsonRpcResponse::success(
                        req.id,
                        serde_json::json!({"tools": tools}),
                    ))
                    .await
            }
            "tools/call" => {
                if !*initialized {
                    return self.reject_uninitialized(req, sender).await;
                }
                let params: CallToolParams =
                    match serde_json::from_value(req.params.unwrap_or(serde_json::Value::Null)) {
                        Ok(p) => p,
                        Err(e) => {
                            return sender
                                .send(JsonRpcResponse::error(
                                    Some(req.id),
                                    codes::INVALID_PARAMS,
                                    format!("invalid tools/call params: {e}"),
                                ))
                                .await;
                        }
                    };

                // One task per in-flight call; the read loop moves on.
                let registry = Arc::clone(&self.registry);
                let sender = sender.clone();
                let id = req.id;
                in_flight.spawn(async move {
                    let result = dispatch(&registry, params).await;
                    let payload = serde_json::to_value(result)
                        .unwrap_or_else(|_| serde_json::json!({}));
                    if sender
                        .send(JsonRpcResponse::success(id, payload))
                        .await
                        .is_err()
                    {
                        tracing::warn!("response dropped: transport already closed");
                    }
                });
                Ok(())
            }
            other => {
                tracing::debug!(method = other, "unknown method");
                sender
                    .send(JsonRpcResponse::error(
                        Some(req.id),
                        codes::METHOD_NOT_FOUND,
                        format!("method not found: {other}"),
                    ))
                    .await
            }
        }
    }

    async fn reject_uninitialized(
        &self,
        req: JsonRpcRequest,
        sender: &ResponseSender,
    ) -> Result<(), TransportError> {
        sender
            .send(JsonRpcResponse::error(
                Some(req.id),
                codes::NOT_INITIALIZED,
                "server has not been initialized",
            ))
            .await
    }
}
