//! Error types for the three adapters and the pipeline.
//!
//! Each adapter owns an error enum distinguishing transport-level
//! failures from application-level ones, so the orchestrator can report
//! a meaningful cause. [`PipelineError`] wraps all of them and exposes
//! the originating [`Stage`]; it is the only error the endpoint sees.

use thiserror::Error;
use voxbridge_types::Stage;

#[derive(Debug, Error)]
pub enum RecognitionError {
    /// Network/connection failure reaching the speech service.
    #[error("speech service unreachable: {0}")]
    Transport(String),

    /// The speech service reported an application-level error.
    #[error("speech service error: {0}")]
    Service(String),

    /// The call succeeded but produced no recognizable speech.
    #[error("no speech could be recognized")]
    EmptyTranscript,

    /// The payload is in a format the adapter cannot decode or transcode.
    #[error("unsupported audio: {0}")]
    UnsupportedAudio(String),
}

#[derive(Debug, Error)]
pub enum AgentError {
    /// Network/connection failure reaching the agent endpoint.
    #[error("agent endpoint unreachable: {0}")]
    Transport(String),

    /// The agent endpoint reported an application-level error. A stale
    /// or invalid thread id surfaces here as well.
    #[error("agent error: {0}")]
    Remote(String),

    /// The run completed but produced no usable reply text.
    #[error("agent produced an empty reply")]
    EmptyReply,
}

#[derive(Debug, Error)]
pub enum SynthesisError {
    /// Network/connection failure reaching the speech service.
    #[error("synthesis service unreachable: {0}")]
    Transport(String),

    /// The speech service reported an application-level error.
    #[error("synthesis service error: {0}")]
    Service(String),

    /// The call succeeded but returned zero audio bytes.
    #[error("synthesis produced no audio")]
    EmptyAudio,
}

/// Tagged failure returned by the pipeline orchestrator.
///
/// Failures propagate unchanged from the adapter that raised them;
/// the endpoint is the only place user-facing status mapping occurs.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("recognition failed: {0}")]
    Recognition(#[from] RecognitionError),

    #[error("agent stage failed: {0}")]
    Agent(#[from] AgentError),

    #[error("synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),
}

impl PipelineError {
    /// The stage that originated this failure.
    pub fn stage(&self) -> Stage {
        match self {
            Self::Recognition(_) => Stage::Recognition,
            Self::Agent(_) => Stage::Agent,
            Self::Synthesis(_) => Stage::Synthesis,
        }
    }
}
