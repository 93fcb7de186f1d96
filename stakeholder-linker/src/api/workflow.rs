//! HTTP-triggered workflow (Power Automate flow) invocation

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::time::Duration;

/// Posts a JSON payload to a workflow trigger URL
#[async_trait]
pub trait WorkflowInvoker: Send + Sync {
    /// Returns the parsed JSON response; non-2xx statuses are errors
    async fn invoke(&self, url: &str, payload: &Value) -> Result<Value>;
}

/// Single-attempt reqwest implementation
#[derive(Debug, Clone)]
pub struct HttpWorkflowInvoker {
    http: reqwest::Client,
}

impl HttpWorkflowInvoker {
    pub fn new(timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build workflow HTTP client")?;
        Ok(Self { http })
    }
}

#[async_trait]
impl WorkflowInvoker for HttpWorkflowInvoker {
    async fn invoke(&self, url: &str, payload: &Value) -> Result<Value> {
        let body = serde_json::to_vec(payload).context("Failed to serialize workflow payload")?;

        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .context("Workflow request failed")?;

        let status = response.status();
        let text = response.text().await.context("Failed to read workflow response")?;

        if !status.is_success() {
            bail!("Workflow returned {}: {}", status, text);
        }

        parse_response_body(&text)
    }
}

/// Flows answering `202 Accepted` send no body at all; treat that as `null`
pub fn parse_response_body(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).context("Workflow response is not valid JSON")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Accept one connection, answer with `status` and `body`, and return the raw request
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}/workflows/run", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut raw = Vec::new();
            let mut buf = [0u8; 1024];
            loop {
                let n = socket.read(&mut buf).await.unwrap();
                raw.extend_from_slice(&buf[..n]);
                let text = String::from_utf8_lossy(&raw).to_string();
                if let Some(end) = text.find("\r\n\r\n") {
                    let length = text[..end]
                        .lines()
                        .find_map(|line| {
                            let (name, value) = line.split_once(':')?;
                            name.eq_ignore_ascii_case("content-length")
                                .then(|| value.trim().parse::<usize>().ok())?
                        })
                        .unwrap_or(0);
                    if raw.len() >= end + 4 + length || n == 0 {
                        break;
                    }
                } else if n == 0 {
                    break;
                }
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            String::from_utf8(raw).unwrap()
        });

        (url, handle)
    }

    fn invoker() -> HttpWorkflowInvoker {
        HttpWorkflowInvoker::new(Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_invoke_posts_json_payload() {
        let (url, server) = serve_once("200 OK", r#"{"status":"linked"}"#).await;
        let payload = json!({"opportunity": "opp-1", "stakeholder": ["a", "b"]});

        let response = invoker().invoke(&url, &payload).await.unwrap();
        assert_eq!(response, json!({"status": "linked"}));

        let request = server.await.unwrap();
        let (head, body) = request.split_once("\r\n\r\n").unwrap();
        let mut lines = head.lines();
        assert_eq!(lines.next(), Some("POST /workflows/run HTTP/1.1"));
        assert!(
            lines.any(|line| line.eq_ignore_ascii_case("content-type: application/json")),
            "missing JSON content type in:\n{}",
            head
        );
        assert_eq!(body, r#"{"opportunity":"opp-1","stakeholder":["a","b"]}"#);
    }

    #[tokio::test]
    async fn test_accepted_without_body_is_null() {
        let (url, server) = serve_once("202 Accepted", "").await;

        let response = invoker().invoke(&url, &json!({})).await.unwrap();
        assert_eq!(response, Value::Null);
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_server_error_is_an_error() {
        let (url, server) = serve_once("500 Internal Server Error", r#"{"error":"flow failed"}"#).await;

        let err = invoker().invoke(&url, &json!({"opportunity": "opp-1"})).await.unwrap_err();
        let message = err.to_string();
        assert!(message.contains("500"), "unexpected error: {}", message);
        assert!(message.contains("flow failed"));
        server.await.unwrap();
    }

    #[test]
    fn test_json_body_is_parsed() {
        let value = parse_response_body(r#"{"linked": 2}"#).unwrap();
        assert_eq!(value, json!({"linked": 2}));
    }

    #[test]
    fn test_empty_body_is_null() {
        assert_eq!(parse_response_body("  \n").unwrap(), Value::Null);
    }

    #[test]
    fn test_html_body_is_an_error() {
        assert!(parse_response_body("<html>Accepted</html>").is_err());
    }
}
