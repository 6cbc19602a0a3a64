//! Conversational agent adapter backed by the Azure AI Agents REST API.
//!
//! One logical round trip per invocation: open a thread (unless the
//! session pins one), post the user message, start a run for the
//! configured agent, poll until the run is terminal, then read the
//! newest assistant message back. No automatic retries: the user is
//! waiting synchronously, so latency and cost stay predictable.

use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::pipeline::ConversationalAgent;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};
use voxbridge_types::{AgentReply, AgentSession};

/// Timeout for a single HTTP request to the agent endpoint.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Interval between run status polls.
const RUN_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Overall budget for one run to reach a terminal state.
const RUN_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct AzureAgentClient {
    config: AgentConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct ThreadResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    id: String,
    status: String,
    #[serde(default)]
    last_error: Option<RunError>,
}

#[derive(Debug, Deserialize)]
struct RunError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    #[serde(default)]
    data: Vec<Message>,
}

#[derive(Debug, Deserialize)]
struct Message {
    role: String,
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    value: String,
}

impl AzureAgentClient {
    pub fn new(config: AgentConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}{}?api-version={}",
            self.config.base_url(),
            path,
            self.config.api_version
        )
    }

    async fn request_json<T: for<'de> Deserialize<'de>>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<T, AgentError> {
        let response = builder
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| AgentError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AgentError::Remote(format!(
                "agent endpoint returned {status}: {detail}"
            )));
        }

        response
            .json()
            .await
            .map_err(|e| AgentError::Remote(format!("unparseable agent response: {e}")))
    }

    async fn resolve_thread(&self, session: &AgentSession) -> Result<String, AgentError> {
        if let Some(thread_id) = &session.thread_id {
            return Ok(thread_id.clone());
        }
        let thread: ThreadResponse = self
            .request_json(self.client.post(self.url("/threads")).json(&json!({})))
            .await?;
        tracing::debug!(thread_id = %thread.id, "created agent thread");
        Ok(thread.id)
    }

    async fn await_run(&self, thread_id: &str, run: RunResponse) -> Result<(), AgentError> {
        let started = Instant::now();
        let mut run = run;

        loop {
            match run.status.as_str() {
                "completed" => return Ok(()),
                "failed" => return Err(run_failure(run.last_error)),
                "cancelled" | "expired" => {
                    return Err(AgentError::Remote(format!("run ended as {}", run.status)))
                }
                _ => {}
            }

            if started.elapsed() > RUN_TIMEOUT {
                return Err(AgentError::Remote(format!(
                    "run did not complete within {} seconds",
                    RUN_TIMEOUT.as_secs()
                )));
            }

            tokio::time::sleep(RUN_POLL_INTERVAL).await;
            run = self
                .request_json(
                    self.client
                        .get(self.url(&format!("/threads/{thread_id}/runs/{}", run.id))),
                )
                .await?;
        }
    }
}

/// Picks the reply text out of a newest-first message listing.
///
/// The first assistant message wins; its text parts are joined in order.
fn extract_reply(list: MessageList) -> Result<AgentReply, AgentError> {
    for message in list.data {
        if message.role != "assistant" {
            continue;
        }
        let text: String = message
            .content
            .iter()
            .filter(|part| part.kind == "text")
            .filter_map(|part| part.text.as_ref())
            .map(|t| t.value.as_str())
            .collect::<Vec<_>>()
            .join("");
        if !text.trim().is_empty() {
            return Ok(AgentReply::new(text));
        }
    }
    Err(AgentError::EmptyReply)
}

fn run_failure(last_error: Option<RunError>) -> AgentError {
    let detail = last_error
        .map(|e| {
            let code = e.code.unwrap_or_else(|| "unknown".to_string());
            let message = e.message.unwrap_or_default();
            format!("{code}: {message}")
        })
        .unwrap_or_else(|| "no error detail".to_string());
    AgentError::Remote(format!("run failed: {detail}"))
}

#[async_trait]
impl ConversationalAgent for AzureAgentClient {
    async fn converse(
        &self,
        text: &str,
        session: &AgentSession,
    ) -> Result<AgentReply, AgentError> {
        let thread_id = self.resolve_thread(session).await?;

        let _: serde_json::Value = self
            .request_json(
                self.client
                    .post(self.url(&format!("/threads/{thread_id}/messages")))
                    .json(&json!({ "role": "user", "content": text })),
            )
            .await?;

        let run: RunResponse = self
            .request_json(
                self.client
                    .post(self.url(&format!("/threads/{thread_id}/runs")))
                    .json(&json!({ "assistant_id": session.agent_id })),
            )
            .await?;

        self.await_run(&thread_id, run).await?;

        let messages: MessageList = self
            .request_json(
                self.client
                    .get(self.url(&format!("/threads/{thread_id}/messages")))
                    .query(&[("order", "desc"), ("limit", "20")]),
            )
            .await?;

        let reply = extract_reply(messages)?;
        tracing::debug!(thread_id = %thread_id, chars = reply.text.len(), "agent replied");
        Ok(reply)
    }
}
