//! Common test utilities and fixtures for integration tests
//!
//! A minimal HTTP/1.1 responder on a loopback port. Each accepted connection
//! gets the next canned response and is then closed; every request is
//! recorded for inspection.

#![allow(dead_code)]

use kraken_rest::{ClientConfig, Credentials, KrakenRestClient};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// Secret from Kraken's published signing example
pub const TEST_SECRET: &str =
    "kQH5HW/8p1uGOVjbgWA7FunAmGO8lsSUXNsu3eow76sz84Q18fWxnyRzBHCd3pd5nE9qa99HAZtuZuj6F1huXg==";

pub const TEST_API_KEY: &str = "test_api_key";

pub const SERVER_TIME_RESPONSE: &str =
    r#"{"error":[],"result":{"unixtime":1688669448,"rfc1123":"Thu, 06 Jul 23 18:50:48 +0000"}}"#;

pub const BALANCE_RESPONSE: &str =
    r#"{"error":[],"result":{"ZUSD":"171288.6158","XXBT":"0.0112"}}"#;

pub const INVALID_NONCE_RESPONSE: &str = r#"{"error":["EAPI:Invalid nonce"]}"#;

/// A request as seen by the responder
#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub method: String,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    /// Header value, matched case-insensitively
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// The nonce field of a form body
    pub fn nonce(&self) -> Option<String> {
        serde_urlencoded::from_str::<Vec<(String, String)>>(&self.body)
            .ok()?
            .into_iter()
            .find(|(key, _)| key == "nonce")
            .map(|(_, value)| value)
    }
}

enum Reply {
    Respond { status: u16, body: String },
    Hang,
}

/// Loopback HTTP server returning canned responses
pub struct MockServer {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl MockServer {
    /// Serve the given (status, body) pairs, one per connection
    pub async fn start(responses: Vec<(u16, &str)>) -> Self {
        let replies = responses
            .into_iter()
            .map(|(status, body)| Reply::Respond {
                status,
                body: body.to_string(),
            })
            .collect();
        Self::spawn(replies).await
    }

    /// Serve the same 200 body to `count` connections
    pub async fn repeat(body: &str, count: usize) -> Self {
        Self::start(vec![(200, body); count]).await
    }

    /// Accept connections, read the request, never answer
    pub async fn silent() -> Self {
        Self::spawn(vec![Reply::Hang]).await
    }

    async fn spawn(replies: Vec<Reply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
        let addr = listener.local_addr().expect("local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let replies = Arc::new(Mutex::new(VecDeque::from(replies)));

        let captured = requests.clone();
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let captured = captured.clone();
                let replies = replies.clone();
                tokio::spawn(async move {
                    handle(stream, captured, replies).await;
                });
            }
        });

        Self { addr, requests }
    }

    /// Base URL for `ClientConfig::with_base_url`
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.requests.lock().clone()
    }
}

async fn handle(
    mut stream: TcpStream,
    captured: Arc<Mutex<Vec<CapturedRequest>>>,
    replies: Arc<Mutex<VecDeque<Reply>>>,
) {
    let Some(request) = read_request(&mut stream).await else {
        return;
    };
    captured.lock().push(request);

    let reply = replies.lock().pop_front();
    match reply {
        Some(Reply::Respond { status, body }) => {
            let response = format!(
                "HTTP/1.1 {} Canned\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
        Some(Reply::Hang) => {
            tokio::time::sleep(Duration::from_secs(60)).await;
        }
        None => {}
    }
}

async fn read_request(stream: &mut TcpStream) -> Option<CapturedRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_string();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();

    let headers: Vec<(String, String)> = lines
        .filter_map(|line| line.split_once(':'))
        .map(|(key, value)| (key.trim().to_string(), value.trim().to_string()))
        .collect();

    let content_length: usize = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse().ok())
        .unwrap_or(0);

    while buf.len() < header_end + content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let body_end = buf.len().min(header_end + content_length);
    let body = String::from_utf8_lossy(&buf[header_end..body_end]).to_string();

    Some(CapturedRequest {
        method,
        path,
        headers,
        body,
    })
}

/// An address nothing listens on
pub async fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    drop(listener);
    format!("http://{}", addr)
}

/// Public-only client pointed at `url`
pub fn public_client(url: &str) -> KrakenRestClient {
    let config = ClientConfig::new().with_base_url(url).with_timeout(1);
    KrakenRestClient::with_config(config).expect("client")
}

/// Authenticated client pointed at `url`
pub fn private_client(url: &str) -> KrakenRestClient {
    let credentials = Credentials::new(TEST_API_KEY, TEST_SECRET).expect("credentials");
    let config = ClientConfig::new()
        .with_base_url(url)
        .with_timeout(1)
        .with_credentials(credentials);
    KrakenRestClient::with_config(config).expect("client")
}
