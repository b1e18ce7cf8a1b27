// One-shot advisory call: situation + strategy table in, free text out.
//
// Text fragments are handed to the caller as they stream in. Every failure is
// folded into a readable fallback string so callers can display the result
// as-is.

use tokio::sync::mpsc;
use tracing::{info, warn};

use waves_core::{Situation, StrategyStat};

use crate::client::{LlmClient, LlmEvent};
use crate::prompt::{build_advice_prompt, system_prompt};

pub const NOT_CONFIGURED: &str = "API key not configured.";
pub const NO_ANALYSIS: &str = "Could not produce an analysis.";
pub const ANALYSIS_FAILED: &str = "An error occurred during AI analysis.";

/// Prompt and budget settings for advisory calls.
#[derive(Debug, Clone)]
pub struct AdviceSettings {
    pub team_name: String,
    pub language: String,
    pub max_tokens: u32,
}

/// Ask the model which action to take, passing each streamed fragment to
/// `on_token`. Never fails; see the fallback constants for what is returned
/// when no advice is available.
pub async fn request_advice<F>(
    client: &LlmClient,
    settings: &AdviceSettings,
    situation: &Situation,
    stats: &[StrategyStat],
    on_token: F,
) -> String
where
    F: FnMut(&str),
{
    if !client.is_active() {
        return NOT_CONFIGURED.to_string();
    }

    let system = system_prompt(&settings.team_name, &settings.language);
    let user = build_advice_prompt(situation, stats);
    let (tx, rx) = mpsc::channel(64);

    info!(
        state = %situation.fingerprint(),
        actions = stats.len(),
        "requesting strategy advice"
    );

    let (sent, text) = tokio::join!(
        client.stream_message(&system, &user, settings.max_tokens, tx),
        collect_response(rx, on_token),
    );
    if let Err(e) = sent {
        warn!("advisory request failed: {e:#}");
        return ANALYSIS_FAILED.to_string();
    }
    text
}

/// Drain the event stream into the final text or a fallback message.
pub async fn collect_response<F>(mut rx: mpsc::Receiver<LlmEvent>, mut on_token: F) -> String
where
    F: FnMut(&str),
{
    let mut partial = String::new();
    while let Some(event) = rx.recv().await {
        match event {
            LlmEvent::Token(text) => {
                on_token(&text);
                partial.push_str(&text);
            }
            LlmEvent::Complete(full_text) => {
                let trimmed = full_text.trim();
                return if trimmed.is_empty() {
                    NO_ANALYSIS.to_string()
                } else {
                    trimmed.to_string()
                };
            }
            LlmEvent::Error(message) => {
                warn!(%message, "advisory stream error");
                return format!("{ANALYSIS_FAILED} ({message})");
            }
        }
    }
    // Sender dropped without a terminal event.
    let trimmed = partial.trim();
    if trimmed.is_empty() {
        NO_ANALYSIS.to_string()
    } else {
        trimmed.to_string()
    }
}
