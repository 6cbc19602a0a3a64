//! Shared types for the Voxbridge voice relay.
//!
//! This crate provides the data model threaded through the pipeline:
//! audio payloads with their encoding tags, transcripts, agent replies,
//! the agent session identity, and the stage labels used to tag
//! failures. Every other crate in the workspace depends only on this
//! crate for cross-cutting definitions, which keeps the dependency
//! graph clean.
//!
//! All per-request values here are created, used, and dropped within
//! the scope of a single pipeline invocation. The one exception is
//! [`AgentSession`], which is built from configuration at startup and
//! read-only thereafter.

pub mod audio;
pub mod dialogue;

pub use audio::{AudioContainer, AudioEncoding, AudioPayload};
pub use dialogue::{AgentReply, AgentSession, Stage, Transcript};
