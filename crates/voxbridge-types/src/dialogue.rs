//! Transcript, reply, session identity, and stage definitions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A recognized utterance produced by the speech recognizer.
///
/// Consumed by the orchestrator to build the agent request and
/// discarded after use; this relay does not persist transcripts.
#[derive(Debug, Clone, PartialEq)]
pub struct Transcript {
    pub text: String,
    /// Recognizer-reported confidence in `[0.0, 1.0]`, when available.
    pub confidence: Option<f64>,
}

impl Transcript {
    pub fn new(text: impl Into<String>, confidence: Option<f64>) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }

    /// A transcript with no usable text cannot drive the agent stage.
    pub fn is_usable(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// The agent's textual response, consumed by the synthesizer.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentReply {
    pub text: String,
}

impl AgentReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Opaque identity correlating agent calls to one logical conversation.
///
/// Owned by configuration and never mutated by the pipeline. When
/// `thread_id` is absent the agent adapter opens a fresh thread per
/// interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentSession {
    pub agent_id: String,
    pub thread_id: Option<String>,
}

impl AgentSession {
    pub fn new(agent_id: impl Into<String>) -> Self {
        Self {
            agent_id: agent_id.into(),
            thread_id: None,
        }
    }

    pub fn with_thread(mut self, thread_id: impl Into<String>) -> Self {
        self.thread_id = Some(thread_id.into());
        self
    }
}

/// Pipeline stage that originated a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Recognition,
    Agent,
    Synthesis,
    Transport,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recognition => "recognition",
            Self::Agent => "agent",
            Self::Synthesis => "synthesis",
            Self::Transport => "transport",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
