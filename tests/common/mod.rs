#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

use travelmate::config::Config;

/// Minimal HTTP server that answers every request with the same canned
/// response and counts how many requests it saw.
pub struct MockServer {
    pub url: String,
    hits: Arc<AtomicUsize>,
    task: JoinHandle<()>,
}

impl MockServer {
    pub async fn json(status: u16, body: &str) -> Self {
        Self::start(status, "application/json", body.to_string()).await
    }

    pub async fn start(status: u16, content_type: &str, body: String) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let hits = Arc::new(AtomicUsize::new(0));

        let response = format!(
            "HTTP/1.1 {status} {}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            reason(status),
            body.len()
        );

        let counter = hits.clone();
        let task = tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                read_request(&mut socket).await;
                counter.fetch_add(1, Ordering::SeqCst);
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        Self {
            url: format!("http://127.0.0.1:{port}"),
            hits,
            task,
        }
    }

    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Drain headers and a Content-Length body so the client never sees a reset
/// while still writing.
async fn read_request(socket: &mut TcpStream) {
    let mut buf = Vec::with_capacity(8192);
    let mut chunk = [0u8; 4096];
    loop {
        let Ok(n) = socket.read(&mut chunk).await else {
            return;
        };
        if n == 0 {
            return;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = find(&buf, b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let length = head
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + length {
                return;
            }
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        400 => "Bad Request",
        404 => "Not Found",
        429 => "Too Many Requests",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Status",
    }
}

/// URL of a port nothing listens on: connections are refused immediately.
pub async fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{port}")
}

/// Config with every provider pointed at a refused port, no API keys and no
/// chatbot delay. Tests swap in mock URLs for the providers they exercise.
pub async fn offline_config() -> Config {
    let mut config = Config::default();
    config.provider_timeout = Duration::from_secs(3);
    config.chatbot.delay = Duration::ZERO;

    let endpoints = &mut config.endpoints;
    endpoints.mymemory = closed_url().await;
    endpoints.libretranslate = closed_url().await;
    endpoints.lingva = closed_url().await;
    endpoints.gemini = closed_url().await;
    endpoints.openai = closed_url().await;
    endpoints.free_chat = format!("{}/openai", closed_url().await);
    endpoints.openweather = closed_url().await;
    endpoints.overpass = vec![
        format!("{}/api/interpreter", closed_url().await),
        format!("{}/api/interpreter", closed_url().await),
    ];
    config
}
