//! Adapter configuration structures.
//!
//! Both configs are built once at process start from the server's
//! configuration surface and passed into the adapter constructors;
//! nothing here is looked up ambiently at call time. Secrets are
//! redacted from `Debug` output so they never leak into logs.

use serde::Deserialize;
use std::fmt;

fn default_language() -> String {
    "en-US".to_string()
}

fn default_voice() -> String {
    "en-US-JennyNeural".to_string()
}

fn default_output_format() -> String {
    "riff-24khz-16bit-mono-pcm".to_string()
}

fn default_api_version() -> String {
    "2025-05-01".to_string()
}

/// Azure Speech service settings shared by the recognizer and synthesizer.
///
/// Fields default to empty so the section can be filled from
/// environment variables after file parsing; the server validates that
/// the required values ended up non-empty before startup proceeds.
#[derive(Clone, Deserialize)]
pub struct SpeechConfig {
    /// Subscription key (`Ocp-Apim-Subscription-Key`).
    #[serde(default)]
    pub key: String,
    /// Service region, e.g. `westeurope`. Used to derive the REST hosts
    /// unless `endpoint` overrides them.
    #[serde(default)]
    pub region: String,
    /// Optional full endpoint override for the recognition host.
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Recognition language tag.
    #[serde(default = "default_language")]
    pub language: String,
    /// Synthesis voice name.
    #[serde(default = "default_voice")]
    pub voice: String,
    /// Synthesis output format (`X-Microsoft-OutputFormat`). The default
    /// is 24 kHz 16-bit mono RIFF, which the endpoint returns as-is.
    #[serde(default = "default_output_format")]
    pub output_format: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self::new("", "")
    }
}

impl SpeechConfig {
    pub fn new(key: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            region: region.into(),
            endpoint: None,
            language: default_language(),
            voice: default_voice(),
            output_format: default_output_format(),
        }
    }

    /// Host for short-audio recognition requests.
    pub fn recognition_endpoint(&self) -> String {
        match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!(
                "https://{}.stt.speech.microsoft.com/speech/recognition/conversation/cognitiveservices/v1",
                self.region
            ),
        }
    }

    /// Host for synthesis requests.
    pub fn synthesis_endpoint(&self) -> String {
        format!(
            "https://{}.tts.speech.microsoft.com/cognitiveservices/v1",
            self.region
        )
    }
}

impl fmt::Debug for SpeechConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpeechConfig")
            .field("key", &"[REDACTED]")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("language", &self.language)
            .field("voice", &self.voice)
            .field("output_format", &self.output_format)
            .finish()
    }
}

/// Remote agent project settings.
#[derive(Clone, Deserialize)]
pub struct AgentConfig {
    /// Agent project endpoint, e.g.
    /// `https://myproject.services.ai.azure.com/api/projects/voice`.
    #[serde(default)]
    pub project_endpoint: String,
    /// Identifier of the agent to run.
    #[serde(default)]
    pub agent_id: String,
    /// Bearer token presented on every agent call.
    #[serde(default)]
    pub api_key: String,
    /// REST API version query parameter.
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Optional thread id pinning the whole process to one conversation.
    /// Absent means one fresh thread per interaction.
    #[serde(default)]
    pub thread_id: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::new("", "", "")
    }
}

impl AgentConfig {
    pub fn new(
        project_endpoint: impl Into<String>,
        agent_id: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            project_endpoint: project_endpoint.into(),
            agent_id: agent_id.into(),
            api_key: api_key.into(),
            api_version: default_api_version(),
            thread_id: None,
        }
    }

    pub fn base_url(&self) -> String {
        self.project_endpoint.trim_end_matches('/').to_string()
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("project_endpoint", &self.project_endpoint)
            .field("agent_id", &self.agent_id)
            .field("api_key", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .field("thread_id", &self.thread_id)
            .finish()
    }
}
