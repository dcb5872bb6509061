//! Newline-delimited JSON-RPC transport.
//!
//! Reads framed messages from the inbound half and funnels outbound
//! responses through a single writer task, so concurrently completing
//! dispatches never interleave bytes on the wire. Framing is per line:
//! a malformed line yields a decode error for that frame only and the
//! stream position stays consistent.

use crate::jsonrpc::{JsonRpcNotification, JsonRpcRequest, JsonRpcResponse, RequestId};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines, Stdin};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Transport failures that make the channel unusable. These are fatal and
/// trigger shutdown; everything else is surfaced per frame.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("response channel closed")]
    ChannelClosed,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One decoded inbound frame.
#[derive(Debug)]
pub enum Inbound {
    Request(JsonRpcRequest),
    Notification(JsonRpcNotification),
    /// Undecodable frame, with the correlation id recovered when possible.
    Malformed {
        id: Option<RequestId>,
        message: String,
    },
}

/// Handle for emitting responses from concurrently running dispatch tasks.
#[derive(Clone)]
pub struct ResponseSender {
    tx: mpsc::Sender<JsonRpcResponse>,
}

impl ResponseSender {
    pub async fn send(&self, response: JsonRpcResponse) -> Result<(), TransportError> {
        self.tx
            .send(response)
            .await
            .map_err(|_| TransportError::ChannelClosed)
    }
}

/// Server-side message transport over a duplex byte channel.
pub struct Transport<R> {
    lines: Lines<R>,
    response_tx: mpsc::Sender<JsonRpcResponse>,
    writer_handle: JoinHandle<()>,
}

impl Transport<BufReader<Stdin>> {
    /// Transport over the process's stdin/stdout, the production channel.
    pub fn stdio() -> Self {
        Self::new(BufReader::new(tokio::io::stdin()), tokio::io::stdout())
    }
}

impl<R: AsyncBufRead + Unpin> Transport<R> {
    /// Build a transport from a read half and a write half.
    ///
    /// The write half is moved into a background task that serializes each
    /// response as one line and flushes after every write.
    pub fn new<W>(reader: R, writer: W) -> Self
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (response_tx, mut response_rx) = mpsc::channel::<JsonRpcResponse>(64);
        let writer_handle = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(response) = response_rx.recv().await {
                let serialized = match serde_json::to_string(&response) {
                    Ok(s) => s,
                    Err(e) => {
                        tracing::error!("failed to serialize response: {e}");
                        continue;
                    }
                };
                if writer.write_all(serialized.as_bytes()).await.is_err() {
                    break;
                }
                if writer.write_all(b"\n").await.is_err() {
                    break;
                }
                if writer.flush().await.is_err() {
                    break;
                }
            }
        });

        Self {
            lines: reader.lines(),
            response_tx,
            writer_handle,
        }
    }

    /// Read the next inbound frame. `None` means end of stream (or an
    /// unrecoverable read failure, which is equivalent for the caller).
    pub async fn receive(&mut self) -> Option<Inbound> {
        loop {
            let line = match self.lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => return None,
                Err(e) => {
                    tracing::error!("inbound channel read failed: {e}");
                    return None;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            return Some(decode_frame(&line));
        }
    }

    /// A cloneable handle for emitting responses.
    pub fn sender(&self) -> ResponseSender {
        ResponseSender {
            tx: self.response_tx.clone(),
        }
    }

    /// Close the outbound side: stop accepting responses and wait for the
    /// writer task to flush what it already has. The wait is bounded so a
    /// leaked `ResponseSender` clone cannot stall shutdown indefinitely.
    pub async fn shutdown(self) {
        drop(self.response_tx);
        let flushed =
            tokio::time::timeout(std::time::Duration::from_secs(5), self.writer_handle).await;
        if flushed.is_err() {
            tracing::warn!("writer task still busy at shutdown; detaching");
        }
    }
}

/// Decode one frame, recovering the correlation id on a best-effort basis.
fn decode_frame(line: &str) -> Inbound {
    let value: serde_json::Value = match serde_json::from_str(line) {
        Ok(v) => v,
        Err(e) => {
            return Inbound::Malformed {
                id: None,
                message: format!("invalid JSON frame: {e}"),
            };
        }
    };

    let id = match value.get("id") {
        None | Some(serde_json::Value::Null) => None,
        Some(raw) => match serde_json::from_value::<RequestId>(raw.clone()) {
            Ok(id) => Some(id),
            Err(_) => {
                return Inbound::Malformed {
                    id: None,
                    message: "request id must be a string or a number".to_string(),
                };
            }
        },
    };

    let method = match value.get("method").and_then(serde_json::Value::as_str) {
        Some(m) => m.to_string(),
        None => {
            return Inbound::Malformed {
                id,
                message: "frame has no method".to_string(),
            };
        }
    };

    let params = match value.get("params") {
        None | Some(serde_json::Value::Null) => None,
        Some(p) => Some(p.clone()),
    };

    match id {
        Some(id) => Inbound::Request(JsonRpcRequest { id, method, params }),
        None => Inbound::Notification(JsonRpcNotification { method, params }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jsonrpc::codes;
    use tokio::io::AsyncReadExt;

    fn reader_from(input: &str) -> BufReader<std::io::Cursor<Vec<u8>>> {
        BufReader::new(std::io::Cursor::new(input.as_bytes().to_vec()))
    }

    #[tokio::test]
    async fn receive_request_frame() {
        let input = r#"{"jsonrpc":"2.0","id":1,"method":"tools/list"}"#.to_string() + "\n";
        let (_, write_half) = tokio::io::duplex(1024);
        let mut transport = Transport::new(reader_from(&input), write_half);

        match transport.receive().await {
            Some(Inbound::Request(req)) => {
                assert_eq!(req.id, RequestId::Number(1));
                assert_eq!(req.method, "tools/list");
                assert!(req.params.is_none());
            }
            other => panic!("expected Request, got: {other:?}"),
        }
        assert!(transport.receive().await.is_none());
    }

    #[tokio::test]
    async fn receive_notification_frame() {
        let input =
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#.to_string() + "\n";
        let (_, write_half) = tokio::io::duplex(1024);
        let mut transport = Transport::new(reader_from(&input), write_half);

        match transport.receive().await {
            Some(Inbound::Notification(n)) => {
                assert_eq!(n.method, "notifications/initialized");
            }
            other => panic!("expected Notification, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_json_recovers_nothing() {
        let input = "this is not json\n";
        let (_, write_half) = tokio::io::duplex(1024);
        let mut transport = Transport::new(reader_from(input), write_half);

        match transport.receive().await {
            Some(Inbound::Malformed { id, message }) => {
                assert!(id.is_none());
                assert!(message.contains("invalid JSON frame"));
            }
            other => panic!("expected Malformed, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_frame_with_recoverable_id() {
        let input = r#"{"jsonrpc":"2.0","id":"req-9"}"#.to_string() + "\n";
        let (_, write_half) = tokio::io::duplex(1024);
        let mut transport = Transport::new(reader_from(&input), write_half);

        match transport.receive().await {
            Some(Inbound::Malformed { id, message }) => {
                assert_eq!(id, Some(RequestId::String("req-9".into())));
                assert!(message.contains("no method"));
            }
            other => panic!("expected Malformed, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn null_id_is_not_a_request() {
        // id:null cannot be correlated, so the frame with a method decodes
        // as a notification rather than a request.
        let input = r#"{"jsonrpc":"2.0","id":null,"method":"ping"}"#.to_string() + "\n";
        let (_, write_half) = tokio::io::duplex(1024);
        let mut transport = Transport::new(reader_from(&input), write_half);

        assert!(matches!(
            transport.receive().await,
            Some(Inbound::Notification(_))
        ));
    }

    #[tokio::test]
    async fn blank_lines_skipped() {
        let input = format!("\n  \n{}\n", r#"{"jsonrpc":"2.0","id":2,"method":"ping"}"#);
        let (_, write_half) = tokio::io::duplex(1024);
        let mut transport = Transport::new(reader_from(&input), write_half);

        assert!(matches!(
            transport.receive().await,
            Some(Inbound::Request(_))
        ));
    }

    #[tokio::test]
    async fn responses_written_as_lines_in_order() {
        let (mut peer, write_half) = tokio::io::duplex(4096);
        let transport = Transport::new(reader_from(""), write_half);
        let sender = transport.sender();

        sender
            .send(JsonRpcResponse::success(
                RequestId::Number(1),
                serde_json::json!({"a": 1}),
            ))
            .await
            .unwrap();
        sender
            .send(JsonRpcResponse::error(
                Some(RequestId::Number(2)),
                codes::METHOD_NOT_FOUND,
                "Method not found",
            ))
            .await
            .unwrap();
        drop(sender);
        transport.shutdown().await;

        let mut written = String::new();
        peer.read_to_string(&mut written).await.unwrap();
        let lines: Vec<&str> = written.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["id"], 1);
        assert_eq!(first["result"]["a"], 1);
        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn send_fails_once_writer_breaks() {
        let (peer, write_half) = tokio::io::duplex(64);
        let transport = Transport::new(reader_from(""), write_half);
        let sender = transport.sender();
        // Peer hangs up; the next write breaks the pipe and the writer task
        // exits, closing the channel.
        drop(peer);

        let mut saw_closed = false;
        for _ in 0..50 {
            let result = sender
                .send(JsonRpcResponse::success(
                    RequestId::Number(1),
                    serde_json::json!({}),
                ))
                .await;
            if matches!(result, Err(TransportError::ChannelClosed)) {
                saw_closed = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }
        assert!(saw_closed, "sends should fail after the pipe breaks");

        drop(sender);
        transport.shutdown().await;
    }
}
