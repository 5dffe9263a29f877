//! `restake-lp serve`: the task performer over line-delimited JSON on TCP.
//!
//! One request per line: `{"task_id": "...", "payload": {...}}`.
//! One response per line: the `TaskResponse`, or `{"task_id", "error"}`.

use std::net::SocketAddr;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use restake_lp_performer::{TaskPerformer, TaskRequest};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, info, warn};

/// Longest request line accepted before the connection is dropped.
pub const MAX_LINE_BYTES: usize = 64 * 1024;

pub async fn run(bind: SocketAddr, timeout: Duration) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("Cannot bind {bind}"))?;
    info!(%bind, timeout_secs = timeout.as_secs(), "task performer listening");

    loop {
        let (stream, peer) = listener.accept().await.context("accept failed")?;
        tokio::spawn(async move {
            if let Err(err) = serve_connection(stream, peer, timeout, MAX_LINE_BYTES).await {
                warn!(%peer, %err, "connection closed with error");
            }
        });
    }
}

async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    timeout: Duration,
    max_line: usize,
) -> Result<()> {
    debug!(%peer, "connection opened");
    let performer = TaskPerformer::new();
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();

    loop {
        buf.clear();
        let mut limited = (&mut reader).take(max_line as u64 + 1);
        let read = match tokio::time::timeout(timeout, limited.read_until(b'\n', &mut buf)).await {
            Ok(read) => read?,
            Err(_) => {
                debug!(%peer, "read timed out");
                break;
            }
        };
        if read == 0 {
            break;
        }

        let oversized = buf.len() > max_line && buf.last() != Some(&b'\n');
        let reply = if oversized {
            warn!(%peer, max_line, "request line too long");
            json!({ "task_id": Value::Null, "error": format!("request line exceeds {max_line} bytes") })
        } else {
            let line = String::from_utf8_lossy(&buf);
            if line.trim().is_empty() {
                continue;
            }
            respond(&performer, &line, unix_now())
        };

        let mut reply = reply.to_string();
        reply.push('\n');
        tokio::time::timeout(timeout, writer.write_all(reply.as_bytes()))
            .await
            .context("write timed out")??;
        if oversized {
            break;
        }
    }

    debug!(%peer, "connection closed");
    Ok(())
}

/// Answer one request line.
pub fn respond(performer: &TaskPerformer, line: &str, timestamp: i64) -> Value {
    let request: TaskRequest = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(err) => {
            return json!({
                "task_id": Value::Null,
                "error": format!("invalid task request: {err}"),
            })
        }
    };

    match performer.handle(&request, timestamp) {
        Ok(response) => json!({ "task_id": response.task_id, "result": response.result }),
        Err(err) => json!({ "task_id": request.task_id, "error": err.to_string() }),
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn restake_line_is_acknowledged() {
        let line = r#"{"task_id":"t1","payload":{"type":"restake","restake":{"protocol":"eigenlayer","amount":"1000","token":"stETH"}}}"#;
        let reply = respond(&TaskPerformer::new(), line, 42);

        assert_eq!(reply["task_id"], "t1");
        assert_eq!(reply["result"]["status"], "completed");
        assert_eq!(reply["result"]["timestamp"], 42);
    }

    #[test]
    fn invalid_task_reports_error_with_id() {
        let line = r#"{"task_id":"t2","payload":{"type":"teleport"}}"#;
        let reply = respond(&TaskPerformer::new(), line, 0);

        assert_eq!(reply["task_id"], "t2");
        assert!(reply["error"].as_str().unwrap().contains("teleport"));
    }

    #[test]
    fn malformed_line_reports_error() {
        let reply = respond(&TaskPerformer::new(), "{not json", 0);
        assert!(reply["task_id"].is_null());
        assert!(reply["error"].as_str().unwrap().starts_with("invalid task request"));
    }

    #[tokio::test]
    async fn serves_requests_over_tcp() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, peer) = listener.accept().await.unwrap();
            serve_connection(stream, peer, Duration::from_secs(5), MAX_LINE_BYTES).await.unwrap();
        });

        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        writer
            .write_all(b"{\"task_id\":\"t3\",\"payload\":{\"type\":\"withdraw\"}}\n")
            .await
            .unwrap();

        let mut lines = BufReader::new(reader).lines();
        let reply: Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert_eq!(reply["task_id"], "t3");
        assert_eq!(reply["result"]["action"], "withdraw");
    }

    #[tokio::test]
    async fn oversized_line_is_refused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (stream, peer) = listener.accept().await.unwrap();
            serve_connection(stream, peer, Duration::from_secs(5), 16).await.unwrap();
        });

        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        writer.write_all(&[b'x'; 17]).await.unwrap();

        let mut lines = BufReader::new(reader).lines();
        let reply: Value = serde_json::from_str(&lines.next_line().await.unwrap().unwrap()).unwrap();
        assert!(reply["task_id"].is_null());
        assert_eq!(reply["error"], "request line exceeds 16 bytes");
        assert!(lines.next_line().await.unwrap().is_none());
        server.await.unwrap();
    }
}
