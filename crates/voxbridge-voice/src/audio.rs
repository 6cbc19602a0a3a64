//! WAV container inspection and local transcoding.
//!
//! The recognizer only dispatches WAV bytes upstream. Inbound payloads
//! that are already WAV are parsed here to recover the true sample
//! rate, width, and channel count from the header (the declared
//! encoding tag can lie); raw PCM payloads are wrapped into a WAV
//! container. This is the one piece of local data transformation in
//! the relay.

use crate::error::RecognitionError;
use std::io::Cursor;
use voxbridge_types::{AudioContainer, AudioEncoding, AudioPayload};

/// Parses a WAV header, returning the encoding it declares.
///
/// Returns `None` for anything hound cannot read as RIFF/WAVE.
pub fn probe_wav(data: &[u8]) -> Option<AudioEncoding> {
    let reader = hound::WavReader::new(Cursor::new(data)).ok()?;
    let spec = reader.spec();
    if spec.sample_format != hound::SampleFormat::Int {
        return None;
    }
    Some(AudioEncoding {
        container: AudioContainer::Wav,
        sample_rate: spec.sample_rate,
        bits_per_sample: spec.bits_per_sample,
        channels: spec.channels,
    })
}

/// Returns WAV bytes for the payload, transcoding raw PCM if needed.
///
/// WAV input is validated against its own header and passed through
/// unmodified. Raw PCM input must be 16-bit; the samples are wrapped
/// in a header built from the payload's encoding tag.
pub fn ensure_wav(payload: &AudioPayload) -> Result<(Vec<u8>, AudioEncoding), RecognitionError> {
    match payload.encoding().container {
        AudioContainer::Wav => {
            let encoding = probe_wav(payload.data()).ok_or_else(|| {
                RecognitionError::UnsupportedAudio("payload is not valid RIFF/WAVE".to_string())
            })?;
            Ok((payload.data().to_vec(), encoding))
        }
        AudioContainer::RawPcm => {
            let encoding = payload.encoding();
            if encoding.bits_per_sample != 16 {
                return Err(RecognitionError::UnsupportedAudio(format!(
                    "raw PCM must be 16-bit, got {}-bit",
                    encoding.bits_per_sample
                )));
            }
            if payload.len() % 2 != 0 {
                return Err(RecognitionError::UnsupportedAudio(
                    "raw PCM byte count is not sample-aligned".to_string(),
                ));
            }

            let spec = hound::WavSpec {
                channels: encoding.channels,
                sample_rate: encoding.sample_rate,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            };

            let mut cursor = Cursor::new(Vec::new());
            {
                let mut writer = hound::WavWriter::new(&mut cursor, spec).map_err(|e| {
                    RecognitionError::UnsupportedAudio(format!("failed to build WAV header: {e}"))
                })?;
                for sample in payload.data().chunks_exact(2) {
                    let value = i16::from_le_bytes([sample[0], sample[1]]);
                    writer.write_sample(value).map_err(|e| {
                        RecognitionError::UnsupportedAudio(format!("failed to write sample: {e}"))
                    })?;
                }
                writer.finalize().map_err(|e| {
                    RecognitionError::UnsupportedAudio(format!("failed to finalize WAV: {e}"))
                })?;
            }

            let wav_encoding = AudioEncoding {
                container: AudioContainer::Wav,
                ..encoding
            };
            Ok((cursor.into_inner(), wav_encoding))
        }
    }
}

/// Content type string the speech service expects for a WAV upload.
pub fn wav_content_type(encoding: AudioEncoding) -> String {
    format!(
        "audio/wav; codecs=audio/pcm; samplerate={}",
        encoding.sample_rate
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_wav(sample_rate: u32, samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        cursor.into_inner()
    }

    #[test]
    fn probe_reads_header() {
        let wav = sample_wav(16000, &[0, 1, -1, 32767]);
        let encoding = probe_wav(&wav).unwrap();
        assert_eq!(encoding.sample_rate, 16000);
        assert_eq!(encoding.bits_per_sample, 16);
        assert_eq!(encoding.channels, 1);
    }

    #[test]
    fn probe_rejects_garbage() {
        assert!(probe_wav(b"not a wav file at all").is_none());
        assert!(probe_wav(&[]).is_none());
    }

    #[test]
    fn wav_passes_through_unmodified() {
        let wav = sample_wav(8000, &[10, 20, 30]);
        let payload = AudioPayload::new(wav.clone(), AudioEncoding::wav(8000));
        let (bytes, encoding) = ensure_wav(&payload).unwrap();
        assert_eq!(bytes, wav);
        assert_eq!(encoding.sample_rate, 8000);
    }

    #[test]
    fn header_wins_over_declared_tag() {
        // Declared 16 kHz but the header says 44.1 kHz; trust the header.
        let wav = sample_wav(44100, &[1, 2, 3]);
        let payload = AudioPayload::new(wav, AudioEncoding::wav(16000));
        let (_, encoding) = ensure_wav(&payload).unwrap();
        assert_eq!(encoding.sample_rate, 44100);
    }

    #[test]
    fn raw_pcm_gets_wrapped() {
        let samples: Vec<i16> = vec![100, -100, 2000];
        let pcm: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();
        let payload = AudioPayload::new(pcm, AudioEncoding::raw_pcm(16000));

        let (bytes, encoding) = ensure_wav(&payload).unwrap();
        assert_eq!(encoding.container, AudioContainer::Wav);
        assert_eq!(encoding.sample_rate, 16000);

        let reread = probe_wav(&bytes).unwrap();
        assert_eq!(reread.sample_rate, 16000);

        let mut reader = hound::WavReader::new(Cursor::new(&bytes)).unwrap();
        let decoded: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(decoded, samples);
    }

    #[test]
    fn misaligned_pcm_is_rejected() {
        let payload = AudioPayload::new(vec![1, 2, 3], AudioEncoding::raw_pcm(16000));
        assert!(matches!(
            ensure_wav(&payload),
            Err(RecognitionError::UnsupportedAudio(_))
        ));
    }

    #[test]
    fn invalid_wav_is_rejected() {
        let payload = AudioPayload::new(vec![0xFF; 32], AudioEncoding::wav(16000));
        assert!(matches!(
            ensure_wav(&payload),
            Err(RecognitionError::UnsupportedAudio(_))
        ));
    }

    #[test]
    fn content_type_carries_sample_rate() {
        assert_eq!(
            wav_content_type(AudioEncoding::wav(16000)),
            "audio/wav; codecs=audio/pcm; samplerate=16000"
        );
    }
}
