//! The pipeline orchestrator and the adapter seams it drives.
//!
//! Each remote capability sits behind a trait with one core operation,
//! so test doubles substitute for the Azure-backed adapters without
//! touching the orchestrator. The orchestrator itself holds no
//! cross-request state and performs no retries; retry policy, if any,
//! belongs to the adapters.

use crate::error::{AgentError, PipelineError, RecognitionError, SynthesisError};
use async_trait::async_trait;
use std::sync::Arc;
use voxbridge_types::{AgentReply, AgentSession, AudioPayload, Transcript};

/// Transcripts reporting a confidence below this are treated as
/// unusable, the same as an empty recognition result.
const MIN_CONFIDENCE: f64 = 0.30;

/// Converts spoken audio to text.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn recognize(&self, audio: &AudioPayload) -> Result<Transcript, RecognitionError>;
}

/// Produces a reply to user text under a session identity.
#[async_trait]
pub trait ConversationalAgent: Send + Sync {
    async fn converse(&self, text: &str, session: &AgentSession)
        -> Result<AgentReply, AgentError>;
}

/// Converts reply text to audio.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload, SynthesisError>;
}

/// Sequences the three remote calls for one request.
///
/// Stages run strictly in order Recognize → Converse → Synthesize; the
/// output of each stage is the sole input to the next, and a failed
/// stage short-circuits the rest. Safe to invoke concurrently for
/// independent requests; every call operates on its own local data.
#[derive(Clone)]
pub struct VoicePipeline {
    recognizer: Arc<dyn SpeechRecognizer>,
    agent: Arc<dyn ConversationalAgent>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    session: AgentSession,
}

impl VoicePipeline {
    pub fn new(
        recognizer: Arc<dyn SpeechRecognizer>,
        agent: Arc<dyn ConversationalAgent>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        session: AgentSession,
    ) -> Self {
        Self {
            recognizer,
            agent,
            synthesizer,
            session,
        }
    }

    /// Runs one inbound payload through all three stages.
    pub async fn handle(&self, audio: AudioPayload) -> Result<AudioPayload, PipelineError> {
        let transcript = self.recognizer.recognize(&audio).await?;
        if !transcript.is_usable() {
            return Err(RecognitionError::EmptyTranscript.into());
        }
        if let Some(confidence) = transcript.confidence {
            if confidence < MIN_CONFIDENCE {
                tracing::info!(confidence, "discarding low-confidence transcript");
                return Err(RecognitionError::EmptyTranscript.into());
            }
        }
        tracing::info!(chars = transcript.text.len(), "utterance recognized");

        let reply = self
            .agent
            .converse(&transcript.text, &self.session)
            .await?;
        if reply.text.trim().is_empty() {
            return Err(AgentError::EmptyReply.into());
        }
        tracing::info!(chars = reply.text.len(), "agent reply received");

        let voice = self.synthesizer.synthesize(&reply.text).await?;
        if voice.is_empty() {
            return Err(SynthesisError::EmptyAudio.into());
        }
        tracing::info!(bytes = voice.len(), "reply synthesized");

        Ok(voice)
    }

    pub fn session(&self) -> &AgentSession {
        &self.session
    }
}
