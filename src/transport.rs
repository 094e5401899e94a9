use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{StatusCode, Url};
use tracing::debug;

use crate::error::TransportError;

/// What came back for one delivered submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub status: StatusCode,
    pub body: String,
}

/// Sends one encoded submission and waits for the remote side to answer.
///
/// Retries, timeouts and backoff belong to the implementation, not to the
/// dispatcher that calls it.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, destination: &Url, body: Vec<u8>) -> Result<Delivery, TransportError>;
}

// POSTs JSON bodies with reqwest
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::new(client))
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, destination: &Url, body: Vec<u8>) -> Result<Delivery, TransportError> {
        let res = self
            .client
            .post(destination.clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        debug!(%destination, %status, bytes = body.len(), "response received");

        Ok(Delivery { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    // Accepts one connection, captures the raw request and answers 201.
    async fn one_shot_server() -> (Url, tokio::task::JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 4096];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw);
                if let Some(split) = text.find("\r\n\r\n") {
                    let expected = text[..split]
                        .lines()
                        .find_map(|l| {
                            let l = l.to_ascii_lowercase();
                            l.strip_prefix("content-length:").map(|v| v.trim().parse::<usize>().unwrap())
                        })
                        .unwrap_or(0);
                    if raw.len() >= split + 4 + expected {
                        break;
                    }
                }
                if n == 0 {
                    break;
                }
            }
            let reply = "HTTP/1.1 201 Created\r\ncontent-length: 2\r\nconnection: close\r\n\r\nok";
            socket.write_all(reply.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8_lossy(&raw).into_owned()
        });
        let url = Url::parse(&format!("http://{addr}/api/v3/lk/documents/create")).unwrap();
        (url, handle)
    }

    #[tokio::test]
    async fn posts_json_body() {
        let (url, server) = one_shot_server().await;
        let transport = HttpTransport::default();

        let delivery = transport.send(&url, br#"{"doc_id":"1"}"#.to_vec()).await.unwrap();
        assert_eq!(delivery.status, StatusCode::CREATED);
        assert_eq!(delivery.body, "ok");

        let request = server.await.unwrap();
        assert!(request.starts_with("POST /api/v3/lk/documents/create"));
        assert!(request.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(request.ends_with(r#"{"doc_id":"1"}"#));
    }

    #[tokio::test]
    async fn connection_refused_is_http_error() {
        // bind then drop to get a port nobody listens on
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let url = Url::parse(&format!("http://{addr}/")).unwrap();
        let err = HttpTransport::with_timeout(Duration::from_secs(2))
            .unwrap()
            .send(&url, Vec::new())
            .await
            .unwrap_err();
        assert!(matches!(err, TransportError::Http(_)));
    }
}
