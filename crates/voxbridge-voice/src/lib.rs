//! Remote-capability adapters and the pipeline orchestrator for the
//! Voxbridge voice relay.
//!
//! Three adapters wrap one remote service each (speech recognition,
//! the conversational agent, and speech synthesis) behind narrow
//! traits defined in [`pipeline`]. [`VoicePipeline`] drives them in
//! strict sequence for each request. The only local data
//! transformation lives in [`audio`], which normalizes inbound
//! payloads to WAV before recognition dispatch.

pub mod agent;
pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod stt;
pub mod tts;

pub use agent::AzureAgentClient;
pub use config::{AgentConfig, SpeechConfig};
pub use error::{AgentError, PipelineError, RecognitionError, SynthesisError};
pub use pipeline::{ConversationalAgent, SpeechRecognizer, SpeechSynthesizer, VoicePipeline};
pub use stt::AzureRecognizer;
pub use tts::AzureSynthesizer;
