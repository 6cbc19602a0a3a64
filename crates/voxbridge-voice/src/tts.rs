//! Speech synthesizer adapter backed by the Azure Speech TTS REST API.

use crate::config::SpeechConfig;
use crate::error::SynthesisError;
use crate::pipeline::SpeechSynthesizer;
use async_trait::async_trait;
use reqwest::header;
use std::time::Duration;
use voxbridge_types::{AudioContainer, AudioEncoding, AudioPayload};

/// Maximum text input size for synthesis (64 KiB). Prevents resource
/// exhaustion from oversized synthesis requests.
const MAX_INPUT_BYTES: usize = 64 * 1024;

/// Timeout for one synthesis round trip.
const SYNTHESIZE_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct AzureSynthesizer {
    config: SpeechConfig,
    client: reqwest::Client,
}

impl AzureSynthesizer {
    pub fn new(config: SpeechConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(SYNTHESIZE_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { config, client }
    }

    fn ssml(&self, text: &str) -> String {
        format!(
            "<speak version='1.0' xml:lang='{lang}'><voice name='{voice}'>{text}</voice></speak>",
            lang = self.config.language,
            voice = self.config.voice,
            text = escape_xml(text),
        )
    }
}

/// Escapes the characters XML treats specially inside SSML text.
fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '\'' => escaped.push_str("&apos;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Derives the payload encoding tag from an `X-Microsoft-OutputFormat`
/// name like `riff-24khz-16bit-mono-pcm`.
fn output_encoding(format: &str) -> AudioEncoding {
    let container = if format.starts_with("riff") {
        AudioContainer::Wav
    } else {
        AudioContainer::RawPcm
    };
    let sample_rate = format
        .split('-')
        .find_map(|part| part.strip_suffix("khz"))
        .and_then(|khz| khz.parse::<u32>().ok())
        .map(|khz| khz * 1000)
        .unwrap_or(24000);
    AudioEncoding {
        container,
        sample_rate,
        bits_per_sample: 16,
        channels: 1,
    }
}

#[async_trait]
impl SpeechSynthesizer for AzureSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload, SynthesisError> {
        if text.len() > MAX_INPUT_BYTES {
            return Err(SynthesisError::Service(format!(
                "text exceeds maximum size: {} bytes (limit: {} bytes)",
                text.len(),
                MAX_INPUT_BYTES
            )));
        }

        let response = self
            .client
            .post(self.config.synthesis_endpoint())
            .header("Ocp-Apim-Subscription-Key", &self.config.key)
            .header(header::CONTENT_TYPE, "application/ssml+xml")
            .header("X-Microsoft-OutputFormat", &self.config.output_format)
            .body(self.ssml(text))
            .send()
            .await
            .map_err(|e| SynthesisError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Service(format!(
                "synthesis request returned {status}: {detail}"
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SynthesisError::Transport(e.to_string()))?;
        if bytes.is_empty() {
            return Err(SynthesisError::EmptyAudio);
        }

        let encoding = output_encoding(&self.config.output_format);
        tracing::debug!(bytes = bytes.len(), sample_rate = encoding.sample_rate, "speech synthesized");
        Ok(AudioPayload::new(bytes.to_vec(), encoding))
    }
}
