use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tracing::{debug, error, info};

use crate::handlers;
use crate::protocol::{encode, ErrorResponse, Request, INVALID_PARAMS};
use crate::state::DaemonState;

/// Handle a single client connection
pub async fn handle_client(stream: TcpStream, state: Arc<DaemonState>) {
    let peer = stream
        .peer_addr()
        .map(|a| a.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    info!("Client connected: {peer}");

    if let Err(e) = handle_client_inner(stream, state).await {
        debug!("Client {peer} error: {e}");
    }

    info!("Client disconnected: {peer}");
}

async fn handle_client_inner(stream: TcpStream, state: Arc<DaemonState>) -> Result<(), String> {
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);
    let mut line = String::new();

    // Requests on one connection are served strictly in order
    loop {
        line.clear();
        match reader.read_line(&mut line).await {
            Ok(0) => break, // EOF
            Ok(_) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }

                let response = process_request(trimmed, &state).await;
                if let Err(e) = writer.write_all(response.as_bytes()).await {
                    error!("Failed to write response: {e}");
                    break;
                }
                if let Err(e) = writer.write_all(b"\n").await {
                    error!("Failed to write newline: {e}");
                    break;
                }
            }
            Err(e) => return Err(format!("Read error: {e}")),
        }
    }

    Ok(())
}

/// Process a single request and return JSON response
async fn process_request(line: &str, state: &DaemonState) -> String {
    let request: Request = match serde_json::from_str(line) {
        Ok(r) => r,
        Err(e) => {
            let resp = ErrorResponse::new(0, INVALID_PARAMS, format!("Invalid JSON: {e}"));
            return encode(&resp);
        }
    };

    handlers::dispatch(&request, state).await
}
