use std::time::Duration;

use juris_core::config::{DEFAULT_USER_AGENT, SearchConfig};
use juris_core::error::AppError;
use juris_core::traits::Fetcher;
use reqwest::Client;

/// Hard upper bound for a single request, above any per-source deadline.
const CEILING_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP fetcher using reqwest.
///
/// Downloads tribunal search pages with a descriptive User-Agent. The
/// per-source deadline is enforced by the caller; the client timeout here
/// is only a ceiling for connections nobody is waiting on anymore.
#[derive(Clone)]
pub struct ReqwestFetcher {
    client: Client,
    timeout_ms: u64,
}

impl ReqwestFetcher {
    pub fn new() -> Result<Self, AppError> {
        Self::with_user_agent(DEFAULT_USER_AGENT, CEILING_TIMEOUT)
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self, AppError> {
        let ceiling = config.timeout.map_or(CEILING_TIMEOUT, |t| t.max(CEILING_TIMEOUT));
        Self::with_user_agent(&config.user_agent, ceiling)
    }

    pub fn with_user_agent(user_agent: &str, timeout: Duration) -> Result<Self, AppError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::HttpError(e.to_string()))?;

        Ok(Self {
            client,
            timeout_ms: timeout.as_millis() as u64,
        })
    }
}

impl Fetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str) -> Result<String, AppError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(e, self.timeout_ms))?;

        let status = response.status();
        if !status.is_success() {
            // The body is parsed whatever the status.
            tracing::debug!(status = status.as_u16(), %url, "Non-success status");
        }

        response.text().await.map_err(|e| {
            if e.is_timeout() {
                AppError::Timeout(self.timeout_ms)
            } else {
                AppError::HttpError(format!("Failed to read response body: {e}"))
            }
        })
    }
}

fn classify(e: reqwest::Error, timeout_ms: u64) -> AppError {
    if e.is_timeout() {
        AppError::Timeout(timeout_ms)
    } else if e.is_connect() {
        AppError::NetworkError(format!("Connection failed: {e}"))
    } else {
        AppError::HttpError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    use super::*;

    /// Serve exactly one canned HTTP response on a local port.
    ///
    /// The receiver yields the raw request head as the server saw it.
    async fn serve_once(response: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let _ = tx.send(String::from_utf8_lossy(&request).into_owned());
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        (format!("http://{addr}/busca?q=tema"), rx)
    }

    const OK_PAGE: &str =
        "HTTP/1.1 200 OK\r\nContent-Length: 14\r\nConnection: close\r\n\r\n<p>ok page</p>";

    fn user_agent_of(request: &str) -> Option<String> {
        request.lines().find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("user-agent").then(|| value.trim().to_string())
        })
    }

    #[tokio::test]
    async fn test_returns_body_on_success() {
        let (url, _request) = serve_once(OK_PAGE).await;

        let body = ReqwestFetcher::new().unwrap().fetch(&url).await.unwrap();
        assert_eq!(body, "<p>ok page</p>");
    }

    #[tokio::test]
    async fn test_returns_body_on_error_status() {
        let (url, _request) = serve_once(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found",
        )
        .await;

        let body = ReqwestFetcher::new().unwrap().fetch(&url).await.unwrap();
        assert_eq!(body, "not found");
    }

    #[tokio::test]
    async fn test_sends_default_user_agent() {
        let (url, request) = serve_once(OK_PAGE).await;

        ReqwestFetcher::new().unwrap().fetch(&url).await.unwrap();

        let request = request.await.unwrap();
        assert!(request.starts_with("GET /busca?q=tema HTTP/1.1"), "got {request}");
        assert_eq!(user_agent_of(&request).as_deref(), Some(DEFAULT_USER_AGENT));
        assert!(DEFAULT_USER_AGENT.starts_with("Mozilla/5.0 (compatible; JurisAgentBR/1.0;"));
    }

    #[tokio::test]
    async fn test_from_config_sends_configured_user_agent() {
        let (url, request) = serve_once(OK_PAGE).await;
        let config = SearchConfig {
            user_agent: "PesquisaTribunais/2.0".to_string(),
            timeout: Some(Duration::from_millis(500)),
            max_results: None,
        };

        let body = ReqwestFetcher::from_config(&config)
            .unwrap()
            .fetch(&url)
            .await
            .unwrap();

        assert_eq!(body, "<p>ok page</p>");
        let request = request.await.unwrap();
        assert_eq!(user_agent_of(&request).as_deref(), Some("PesquisaTribunais/2.0"));
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Bind then drop to get a port nobody listens on.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = ReqwestFetcher::new()
            .unwrap()
            .fetch(&format!("http://{addr}/"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NetworkError(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_client_ceiling_maps_to_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let fetcher =
            ReqwestFetcher::with_user_agent("test", Duration::from_millis(100)).unwrap();
        let err = fetcher.fetch(&format!("http://{addr}/")).await.unwrap_err();
        assert_eq!(err.source_reason(), "timeout");
    }
}
