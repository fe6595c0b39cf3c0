//! Thin wrapper around the reqwest client used for index pages and downloads.

use std::time::Duration;

use futures_util::StreamExt;
use log::debug;
use url::Url;

use crate::Result;

/// Upper bound on how much of a declared `Content-Length` is reserved up front
const MAX_PREALLOCATION: u64 = 16 * 1024 * 1024;

/// HTTP client shared by the repository client
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::Client,
}

impl HttpClient {
    /// Create a client whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("pydeps/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Fetch a page as text, failing on non-success status codes
    pub async fn get_text(&self, url: &Url) -> Result<String> {
        debug!("GET {}", url);
        let response = self.client.get(url.clone()).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }

    /// Download a body into memory, chunk by chunk
    pub async fn download(&self, url: &Url) -> Result<Vec<u8>> {
        debug!("Downloading {}", url);
        let response = self.client.get(url.clone()).send().await?.error_for_status()?;

        let capacity = response.content_length().unwrap_or(0).min(MAX_PREALLOCATION);
        let mut data = Vec::with_capacity(capacity as usize);
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            data.extend_from_slice(&chunk?);
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serve one connection with a canned response and return its URL
    async fn serve_once(response: &'static str) -> Url {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = [0u8; 1024];
            let _ = socket.read(&mut request).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        Url::parse(&format!("http://{}/six-1.0.tar.gz", addr)).unwrap()
    }

    #[tokio::test]
    async fn test_download() {
        let url = serve_once("HTTP/1.1 200 OK\r\nContent-Length: 3\r\nConnection: close\r\n\r\nabc").await;
        let client = HttpClient::new(Duration::from_secs(5)).unwrap();
        assert_eq!(client.download(&url).await.unwrap(), b"abc".to_vec());
    }

    #[tokio::test]
    async fn test_download_oversized_content_length() {
        let url = serve_once(
            "HTTP/1.1 200 OK\r\nContent-Length: 1000000000000000\r\nConnection: close\r\n\r\nabc",
        )
        .await;
        let client = HttpClient::new(Duration::from_secs(5)).unwrap();
        assert!(client.download(&url).await.is_err());
    }

    #[tokio::test]
    async fn test_download_error_status() {
        let url = serve_once("HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\nConnection: close\r\n\r\n").await;
        let client = HttpClient::new(Duration::from_secs(5)).unwrap();
        assert!(client.download(&url).await.is_err());
    }
}
