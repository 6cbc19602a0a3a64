//! Speech recognizer adapter backed by the Azure Speech short-audio REST API.

use crate::audio;
use crate::config::SpeechConfig;
use crate::error::RecognitionError;
use crate::pipeline::SpeechRecognizer;
use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use std::time::Duration;
use voxbridge_types::{AudioPayload, Transcript};

/// Maximum audio input size for recognition (10 MiB). Prevents OOM from
/// oversized payloads.
const MAX_INPUT_BYTES: usize = 10 * 1024 * 1024;

/// Timeout for one recognition round trip.
const RECOGNIZE_TIMEOUT: Duration = Duration::from_secs(30);

/// Recognizer that sends one short-audio request per invocation.
///
/// Holds no per-request state; the inner `reqwest::Client` pools
/// connections and is safe for concurrent use.
#[derive(Debug, Clone)]
pub struct AzureRecognizer {
    config: SpeechConfig,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct RecognitionResponse {
    #[serde(rename = "RecognitionStatus")]
    status: String,
    #[serde(rename = "DisplayText", default)]
    display_text: Option<String>,
    #[serde(rename = "NBest", default)]
    n_best: Vec<NBestEntry>,
}

#[derive(Debug, Deserialize)]
struct NBestEntry {
    #[serde(rename = "Confidence", default)]
    confidence: Option<f64>,
    #[serde(rename = "Display", default)]
    display: Option<String>,
}

impl AzureRecognizer {
    pub fn new(config: SpeechConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(RECOGNIZE_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    fn transcript_from(response: RecognitionResponse) -> Result<Transcript, RecognitionError> {
        match response.status.as_str() {
            "Success" => {
                let best = response.n_best.first();
                let text = best
                    .and_then(|b| b.display.clone())
                    .or(response.display_text)
                    .unwrap_or_default();
                let confidence = best.and_then(|b| b.confidence);

                let transcript = Transcript::new(text, confidence);
                if transcript.is_usable() {
                    Ok(transcript)
                } else {
                    Err(RecognitionError::EmptyTranscript)
                }
            }
            "NoMatch" | "InitialSilenceTimeout" => Err(RecognitionError::EmptyTranscript),
            other => Err(RecognitionError::Service(format!(
                "recognition ended with status {other}"
            ))),
        }
    }
}

#[async_trait]
impl SpeechRecognizer for AzureRecognizer {
    async fn recognize(&self, payload: &AudioPayload) -> Result<Transcript, RecognitionError> {
        if payload.len() > MAX_INPUT_BYTES {
            return Err(RecognitionError::UnsupportedAudio(format!(
                "audio exceeds maximum size: {} bytes (limit: {} bytes)",
                payload.len(),
                MAX_INPUT_BYTES
            )));
        }

        // Local transcoding step: dispatch WAV regardless of what arrived,
        // with the content type derived from the real header.
        let (wav_bytes, encoding) = audio::ensure_wav(payload)?;

        let response = self
            .client
            .post(self.config.recognition_endpoint())
            .query(&[
                ("language", self.config.language.as_str()),
                ("format", "detailed"),
            ])
            .header("Ocp-Apim-Subscription-Key", &self.config.key)
            .header(header::CONTENT_TYPE, audio::wav_content_type(encoding))
            .header(header::ACCEPT, "application/json")
            .body(wav_bytes)
            .send()
            .await
            .map_err(|e| RecognitionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(RecognitionError::Service(format!(
                "recognition request returned {status}: {detail}"
            )));
        }

        let parsed: RecognitionResponse = response
            .json()
            .await
            .map_err(|e| RecognitionError::Service(format!("unparseable response: {e}")))?;

        let transcript = Self::transcript_from(parsed)?;
        tracing::debug!(
            chars = transcript.text.len(),
            confidence = ?transcript.confidence,
            "speech recognized"
        );
        Ok(transcript)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response_json(json: &str) -> RecognitionResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn success_takes_nbest_display_and_confidence() {
        let response = response_json(
            r#"{
                "RecognitionStatus": "Success",
                "DisplayText": "plain text",
                "NBest": [{"Confidence": 0.93, "Display": "Hello there."}]
            }"#,
        );
        let transcript = AzureRecognizer::transcript_from(response).unwrap();
        assert_eq!(transcript.text, "Hello there.");
        assert_eq!(transcript.confidence, Some(0.93));
    }

    #[test]
    fn success_falls_back_to_display_text() {
        let response = response_json(
            r#"{"RecognitionStatus": "Success", "DisplayText": "fallback"}"#,
        );
        let transcript = AzureRecognizer::transcript_from(response).unwrap();
        assert_eq!(transcript.text, "fallback");
        assert_eq!(transcript.confidence, None);
    }

    #[test]
    fn empty_success_is_a_domain_error() {
        let response = response_json(r#"{"RecognitionStatus": "Success"}"#);
        assert!(matches!(
            AzureRecognizer::transcript_from(response),
            Err(RecognitionError::EmptyTranscript)
        ));
    }

    #[test]
    fn no_match_is_a_domain_error() {
        let response = response_json(r#"{"RecognitionStatus": "NoMatch"}"#);
        assert!(matches!(
            AzureRecognizer::transcript_from(response),
            Err(RecognitionError::EmptyTranscript)
        ));
    }

    #[test]
    fn cancellation_surfaces_as_service_error() {
        let response = response_json(r#"{"RecognitionStatus": "Error"}"#);
        match AzureRecognizer::transcript_from(response) {
            Err(RecognitionError::Service(msg)) => assert!(msg.contains("Error")),
            other => panic!("expected service error, got {other:?}"),
        }
    }
}
