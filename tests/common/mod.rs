//! Shared utilities for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use api_forwarder::forward::{OutboundRequest, Transport, TransportError, UpstreamResponse};
use axum::http::{HeaderValue, StatusCode};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;

/// Transport that records every outbound request and returns a canned outcome.
#[derive(Clone)]
pub struct RecordingTransport {
    seen: Arc<Mutex<Vec<OutboundRequest>>>,
    outcome: Result<UpstreamResponse, String>,
}

#[allow(dead_code)]
impl RecordingTransport {
    pub fn responding(status: u16, content_type: Option<&'static str>, body: &str) -> Self {
        Self {
            seen: Arc::default(),
            outcome: Ok(UpstreamResponse {
                status: StatusCode::from_u16(status).unwrap(),
                content_type: content_type.map(HeaderValue::from_static),
                body: body.to_string(),
            }),
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            seen: Arc::default(),
            outcome: Err(message.to_string()),
        }
    }

    pub fn requests(&self) -> Vec<OutboundRequest> {
        self.seen.lock().unwrap().clone()
    }
}

impl Transport for RecordingTransport {
    async fn dispatch(&self, request: OutboundRequest) -> Result<UpstreamResponse, TransportError> {
        self.seen.lock().unwrap().push(request);
        self.outcome.clone().map_err(TransportError::Other)
    }
}

/// Build `/api/proxy?base=..&path=..` with both values form-encoded.
#[allow(dead_code)]
pub fn proxy_uri(base: &str, path: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair("base", base)
        .append_pair("path", path)
        .finish();
    format!("/api/proxy?{}", query)
}

/// A request as seen on the wire by a mock backend.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct CapturedRequest {
    pub head: String,
    pub body: String,
}

#[allow(dead_code)]
impl CapturedRequest {
    pub fn request_line(&self) -> &str {
        self.head.lines().next().unwrap_or_default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }
}

/// Start a mock backend on an ephemeral port that answers every connection
/// with `response` and reports each captured request.
#[allow(dead_code)]
pub async fn start_mock_backend(
    response: String,
) -> (SocketAddr, mpsc::UnboundedReceiver<CapturedRequest>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (tx, rx) = mpsc::unbounded_channel();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let tx = tx.clone();
            let response = response.clone();
            tokio::spawn(async move {
                if let Ok(captured) = read_request(&mut socket).await {
                    let _ = tx.send(captured);
                }
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, rx)
}

/// Raw HTTP/1.1 response with `Connection: close` and a content length.
#[allow(dead_code)]
pub fn http_response(status_line: &str, content_type: Option<&str>, body: &str) -> String {
    let content_type = content_type
        .map(|ct| format!("Content-Type: {}\r\n", ct))
        .unwrap_or_default();
    format!(
        "HTTP/1.1 {}\r\n{}Content-Length: {}\r\nConnection: close\r\n\r\n{}",
        status_line,
        content_type,
        body.len(),
        body
    )
}

async fn read_request(socket: &mut TcpStream) -> std::io::Result<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let head_end = loop {
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    let head = String::from_utf8_lossy(&buf[..head_end]).into_owned();
    let content_length = head
        .lines()
        .filter_map(|line| line.split_once(':'))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.trim().parse::<usize>().ok())
        .unwrap_or(0);

    while buf.len() < head_end + content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body_end = buf.len().min(head_end + content_length);
    Ok(CapturedRequest {
        head,
        body: String::from_utf8_lossy(&buf[head_end..body_end]).into_owned(),
    })
}
