//! Audio payload and encoding definitions.
//!
//! An [`AudioPayload`] is a byte sequence plus an [`AudioEncoding`] tag
//! describing how those bytes are laid out. Payloads are immutable once
//! created: the caller produces the inbound payload, the synthesizer
//! produces the outbound one, and each is consumed exactly once by the
//! next pipeline stage.

use serde::{Deserialize, Serialize};

/// Container format of an audio byte sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioContainer {
    /// RIFF/WAVE container with a header describing the PCM format.
    Wav,
    /// Headerless PCM samples; the encoding tag is the only format source.
    RawPcm,
}

/// Encoding tag carried alongside audio bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AudioEncoding {
    pub container: AudioContainer,
    /// Samples per second (e.g. 16000, 24000).
    pub sample_rate: u32,
    /// Bits per sample (16 for all formats this relay handles).
    pub bits_per_sample: u16,
    /// Channel count (1 = mono).
    pub channels: u16,
}

impl AudioEncoding {
    /// 16 kHz 16-bit mono WAV, the canonical microphone capture format.
    pub fn wav(sample_rate: u32) -> Self {
        Self {
            container: AudioContainer::Wav,
            sample_rate,
            bits_per_sample: 16,
            channels: 1,
        }
    }

    /// Headerless 16-bit mono PCM at the given rate.
    pub fn raw_pcm(sample_rate: u32) -> Self {
        Self {
            container: AudioContainer::RawPcm,
            sample_rate,
            bits_per_sample: 16,
            channels: 1,
        }
    }
}

/// An immutable audio byte sequence with its encoding tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    data: Vec<u8>,
    encoding: AudioEncoding,
}

impl AudioPayload {
    pub fn new(data: Vec<u8>, encoding: AudioEncoding) -> Self {
        Self { data, encoding }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn encoding(&self) -> AudioEncoding {
        self.encoding
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// MIME type to declare when this payload crosses an HTTP boundary.
    pub fn media_type(&self) -> &'static str {
        match self.encoding.container {
            AudioContainer::Wav => "audio/wav",
            AudioContainer::RawPcm => "audio/pcm",
        }
    }

    /// Consumes the payload, returning the raw bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }
}
