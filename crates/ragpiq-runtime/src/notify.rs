//! HTTP termination notification.
//!
//! One GET to the configured endpoint with the session identifier as a
//! query parameter. The response body is ignored; only the status is logged.

use std::time::Duration;

use async_trait::async_trait;
use ragpiq_core::{NotificationPayload, NotifyError, ShutdownNotifier};
use reqwest::Url;
use tracing::{debug, warn};

pub struct HttpNotifier {
    client: reqwest::Client,
    endpoint: Url,
    param: String,
    timeout: Duration,
}

impl HttpNotifier {
    pub fn new(endpoint: &str, param: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let endpoint = Url::parse(endpoint)
            .map_err(|e| NotifyError::InvalidEndpoint(format!("{endpoint}: {e}")))?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotifyError::Request(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            param: param.into(),
            timeout,
        })
    }

    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn timeout_ms(&self) -> u64 {
        u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX)
    }
}

#[async_trait]
impl ShutdownNotifier for HttpNotifier {
    async fn notify(&self, payload: &NotificationPayload) -> Result<(), NotifyError> {
        debug!(endpoint = %self.endpoint, session_id = %payload.session_id, "Sending shutdown notification");

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[(self.param.as_str(), payload.session_id.as_str())])
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    NotifyError::TimedOut(self.timeout_ms())
                } else {
                    NotifyError::Request(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            debug!(%status, "Shutdown notification accepted");
        } else {
            warn!(%status, "Shutdown notification endpoint returned an error status");
        }
        Ok(())
    }
}

impl std::fmt::Debug for HttpNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpNotifier")
            .field("endpoint", &self.endpoint.as_str())
            .field("param", &self.param)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Accept one connection, hand back its request line, reply with `status`.
    async fn one_shot_server(status: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 4096];
            let n = socket.read(&mut buf).await.unwrap();
            let request = String::from_utf8_lossy(&buf[..n]).into_owned();
            let line = request.lines().next().unwrap_or_default().to_string();
            let _ = tx.send(line);
            let reply =
                format!("HTTP/1.1 {status}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
            socket.write_all(reply.as_bytes()).await.unwrap();
        });

        (format!("http://{addr}/hook"), rx)
    }

    #[tokio::test]
    async fn sends_session_id_as_query_parameter() {
        let (url, request) = one_shot_server("200 OK").await;
        let notifier = HttpNotifier::new(&url, "camera_id", Duration::from_secs(2)).unwrap();

        notifier
            .notify(&NotificationPayload::new("cam 7"))
            .await
            .unwrap();

        let line = request.await.unwrap();
        assert!(line.starts_with("GET /hook?camera_id=cam+7 "), "{line}");
    }

    #[tokio::test]
    async fn error_status_is_not_a_failure() {
        let (url, _request) = one_shot_server("500 Internal Server Error").await;
        let notifier = HttpNotifier::new(&url, "camera_id", Duration::from_secs(2)).unwrap();

        assert!(notifier.notify(&NotificationPayload::new("x")).await.is_ok());
    }

    #[tokio::test]
    async fn unresponsive_endpoint_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/hook", listener.local_addr().unwrap());
        // Accept and hold the socket without answering.
        let _server = tokio::spawn(async move {
            let (_socket, _) = listener.accept().await.unwrap();
            tokio::time::sleep(Duration::from_secs(30)).await;
        });

        let notifier = HttpNotifier::new(&url, "camera_id", Duration::from_millis(200)).unwrap();
        let err = notifier
            .notify(&NotificationPayload::new("x"))
            .await
            .unwrap_err();
        assert!(matches!(err, NotifyError::TimedOut(200)), "{err}");
    }

    #[test]
    fn invalid_endpoint_is_rejected() {
        let err = HttpNotifier::new("not a url", "camera_id", Duration::from_secs(1)).unwrap_err();
        assert!(matches!(err, NotifyError::InvalidEndpoint(_)));
    }
}
