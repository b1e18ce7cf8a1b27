// Claude API streaming client using reqwest-eventsource.
//
// Sends the advisory prompt to the Anthropic Messages API with `stream: true`
// and forwards the Server-Sent Events as `LlmEvent`s over an mpsc channel.

use futures_util::StreamExt;
use reqwest_eventsource::{Event, RequestBuilderExt};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

/// Streaming events emitted while an advisory request is in flight. Exactly
/// one `Complete` or `Error` ends the stream.
#[derive(Debug, Clone, PartialEq)]
pub enum LlmEvent {
    /// A text fragment, forwarded as soon as it arrives.
    Token(String),
    /// The whole reply.
    Complete(String),
    Error(String),
}

// ---------------------------------------------------------------------------
// ClaudeClient
// ---------------------------------------------------------------------------

/// Low-level Claude API streaming client.
pub struct ClaudeClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl ClaudeClient {
    pub fn new(api_key: String, model: String) -> Self {
        Self::with_endpoint(api_key, model, ANTHROPIC_API_URL.to_string())
    }

    /// Client pointed at a non-default endpoint (a local proxy, or a stub
    /// server in tests).
    pub fn with_endpoint(api_key: String, model: String, endpoint: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
            endpoint,
        }
    }

    /// Send one message and stream the reply as `LlmEvent`s over `tx`.
    ///
    /// Returns when the reply is complete, an error occurs, or the receiver
    /// is dropped. Failures are reported as `LlmEvent::Error`, not as `Err`.
    pub async fn stream_message(
        &self,
        system: &str,
        user_content: &str,
        max_tokens: u32,
        tx: mpsc::Sender<LlmEvent>,
    ) -> anyhow::Result<()> {
        if self.api_key.is_empty() {
            let _ = tx
                .send(LlmEvent::Error("API key not configured".to_string()))
                .await;
            return Ok(());
        }

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": max_tokens,
            "stream": true,
            "system": system,
            "messages": [{ "role": "user", "content": user_content }]
        });

        let request = self
            .http
            .post(&self.endpoint)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body);

        let mut es = match request.eventsource() {
            Ok(es) => es,
            Err(e) => {
                let message = format!("Failed to create event source: {e}");
                let _ = tx.send(LlmEvent::Error(message)).await;
                return Ok(());
            }
        };

        let mut full_text = String::new();
        let terminal = loop {
            let Some(event) = es.next().await else {
                debug!("stream ended without message_stop");
                break if full_text.is_empty() {
                    let message = "Stream ended unexpectedly without any content";
                    LlmEvent::Error(message.to_string())
                } else {
                    LlmEvent::Complete(full_text)
                };
            };
            let msg = match event {
                Ok(Event::Open) => continue,
                Ok(Event::Message(msg)) => msg,
                Err(err) => {
                    warn!(?err, "SSE stream error");
                    break LlmEvent::Error(extract_error_message(&err));
                }
            };
            match msg.event.as_str() {
                "content_block_delta" => {
                    let Some(text) = parse_delta_text(&msg.data) else {
                        continue;
                    };
                    full_text.push_str(&text);
                    if tx.send(LlmEvent::Token(text)).await.is_err() {
                        es.close();
                        return Ok(());
                    }
                }
                "message_stop" => break LlmEvent::Complete(full_text),
                "error" => {
                    let message = parse_error_message(&msg.data)
                        .unwrap_or_else(|| "API reported an error".to_string());
                    warn!(%message, "API error event");
                    break LlmEvent::Error(message);
                }
                other => debug!(event_type = other, "ignoring SSE event"),
            }
        };

        es.close();
        let _ = tx.send(terminal).await;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// LlmClient wrapper
// ---------------------------------------------------------------------------

/// Either an active Claude client or disabled for lack of credentials.
pub enum LlmClient {
    Active(ClaudeClient),
    Disabled,
}

impl LlmClient {
    /// `Active` when a non-empty API key is supplied, otherwise `Disabled`.
    pub fn from_key(api_key: Option<&str>, model: &str) -> Self {
        match api_key {
            Some(key) if !key.trim().is_empty() => {
                LlmClient::Active(ClaudeClient::new(key.trim().to_string(), model.to_string()))
            }
            _ => LlmClient::Disabled,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, LlmClient::Active(_))
    }

    /// Stream a message through the inner client, or immediately report that
    /// the LLM is not configured.
    pub async fn stream_message(
        &self,
        system: &str,
        user_content: &str,
        max_tokens: u32,
        tx: mpsc::Sender<LlmEvent>,
    ) -> anyhow::Result<()> {
        match self {
            LlmClient::Active(client) => {
                client
                    .stream_message(system, user_content, max_tokens, tx)
                    .await
            }
            LlmClient::Disabled => {
                let _ = tx
                    .send(LlmEvent::Error("LLM not configured".to_string()))
                    .await;
                Ok(())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// SSE JSON parsing helpers
// ---------------------------------------------------------------------------

/// `{ "delta": { "type": "text_delta", "text": "..." } }`
pub(crate) fn parse_delta_text(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("delta")?
        .get("text")?
        .as_str()
        .map(|s| s.to_string())
}

/// `{ "type": "error", "error": { "message": "..." } }`
pub(crate) fn parse_error_message(data: &str) -> Option<String> {
    let v: Value = serde_json::from_str(data).ok()?;
    v.get("error")?
        .get("message")?
        .as_str()
        .map(|s| s.to_string())
}

fn extract_error_message(err: &reqwest_eventsource::Error) -> String {
    match err {
        reqwest_eventsource::Error::InvalidStatusCode(status, _response) => {
            format!("API returned status {status}")
        }
        reqwest_eventsource::Error::Transport(e) => format!("Network error: {e}"),
        other => format!("Stream error: {other}"),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    /// One-connection HTTP server that answers with `status` and `body`.
    async fn serve_once(
        status: &'static str,
        content_type: &'static str,
        body: &'static str,
    ) -> (String, tokio::task::JoinHandle<()>) {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = vec![0u8; 8192];
            let _ = tokio::io::AsyncReadExt::read(&mut socket, &mut buf).await;
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\n\
                 Content-Length: {}\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.flush().await.unwrap();
            tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        });
        (format!("http://{addr}"), server)
    }

    #[test]
    fn parse_content_block_delta_text() {
        let data = r#"{
            "type": "content_block_delta",
            "index": 0,
            "delta": { "type": "text_delta", "text": "Bunt" }
        }"#;
        assert_eq!(parse_delta_text(data), Some("Bunt".to_string()));
        assert_eq!(parse_delta_text(r#"{ "type": "content_block_delta" }"#), None);
        assert_eq!(parse_delta_text("not json"), None);
    }

    #[test]
    fn parse_error_event_message() {
        let data = r#"{
            "type": "error",
            "error": { "type": "overloaded_error", "message": "Overloaded" }
        }"#;
        assert_eq!(parse_error_message(data), Some("Overloaded".to_string()));
        assert_eq!(parse_error_message("{}"), None);
    }

    #[tokio::test]
    async fn disabled_client_sends_error_event() {
        let client = LlmClient::Disabled;
        let (tx, mut rx) = mpsc::channel(8);

        client
            .stream_message("system", "user", 100, tx)
            .await
            .expect("should not fail");

        let event = rx.recv().await.expect("should receive an event");
        assert_eq!(event, LlmEvent::Error("LLM not configured".to_string()));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn empty_api_key_sends_error_event() {
        let client = ClaudeClient::new(String::new(), "model".to_string());
        let (tx, mut rx) = mpsc::channel(8);

        client
            .stream_message("system", "user", 100, tx)
            .await
            .expect("should not fail");

        let event = rx.recv().await.expect("should receive an event");
        assert_eq!(event, LlmEvent::Error("API key not configured".to_string()));
    }

    #[test]
    fn from_key_selects_variant() {
        assert!(LlmClient::from_key(Some("sk-ant-test"), "m").is_active());
        assert!(!LlmClient::from_key(Some("   "), "m").is_active());
        assert!(!LlmClient::from_key(None, "m").is_active());
    }

    #[tokio::test]
    async fn streams_tokens_from_sse_server() {
        let body = concat!(
            "event: message_start\n",
            "data: {\"type\":\"message_start\",\"message\":{}}\n\n",
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",",
            "\"delta\":{\"type\":\"text_delta\",\"text\":\"Swing \"}}\n\n",
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",",
            "\"delta\":{\"type\":\"text_delta\",\"text\":\"away.\"}}\n\n",
            "event: message_stop\n",
            "data: {\"type\":\"message_stop\"}\n\n",
        );
        let (endpoint, server) = serve_once("200 OK", "text/event-stream", body).await;

        let client =
            ClaudeClient::with_endpoint("sk-ant-test".into(), "model".into(), endpoint);
        let (tx, mut rx) = mpsc::channel(16);
        client
            .stream_message("system", "user", 100, tx)
            .await
            .expect("should not fail");

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                LlmEvent::Token("Swing ".to_string()),
                LlmEvent::Token("away.".to_string()),
                LlmEvent::Complete("Swing away.".to_string()),
            ]
        );

        let _ = server.await;
    }

    #[tokio::test]
    async fn http_error_status_becomes_error_event() {
        let body = "{\"error\":{\"message\":\"Invalid API key\"}}";
        let (endpoint, server) = serve_once("401 Unauthorized", "application/json", body).await;

        let client =
            ClaudeClient::with_endpoint("sk-ant-bad".into(), "model".into(), endpoint);
        let (tx, mut rx) = mpsc::channel(8);
        client
            .stream_message("system", "user", 100, tx)
            .await
            .expect("should not fail");

        match rx.recv().await.expect("should receive an event") {
            LlmEvent::Error(message) => {
                assert!(message.contains("401"), "unexpected message: {message}");
            }
            other => panic!("expected error, got {other:?}"),
        }
        assert!(rx.recv().await.is_none());

        let _ = server.await;
    }
}
