use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use serde_json::Value;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt;
use voxbridge_server::{app, AppState};
use voxbridge_types::{
    AgentReply, AgentSession, AudioEncoding, AudioPayload, Transcript,
};
use voxbridge_voice::{
    AgentError, ConversationalAgent, RecognitionError, SpeechRecognizer, SpeechSynthesizer,
    SynthesisError, VoicePipeline,
};

const BOUNDARY: &str = "voxbridge-test-boundary";

/// Behavior shared by all three doubles below.
#[derive(Clone, Copy)]
enum Outcome {
    Ok,
    Fail,
}

struct StubRecognizer {
    outcome: Outcome,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl SpeechRecognizer for StubRecognizer {
    async fn recognize(&self, _audio: &AudioPayload) -> Result<Transcript, RecognitionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            Outcome::Ok => Ok(Transcript::new("hello", Some(0.9))),
            Outcome::Fail => Err(RecognitionError::Transport("connection refused".to_string())),
        }
    }
}

struct StubAgent {
    outcome: Outcome,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ConversationalAgent for StubAgent {
    async fn converse(
        &self,
        _text: &str,
        _session: &AgentSession,
    ) -> Result<AgentReply, AgentError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            Outcome::Ok => Ok(AgentReply::new("hi there")),
            Outcome::Fail => Err(AgentError::Remote("run failed".to_string())),
        }
    }
}

struct StubSynthesizer {
    outcome: Outcome,
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl SpeechSynthesizer for StubSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<AudioPayload, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.outcome {
            Outcome::Ok => Ok(AudioPayload::new(
                text.as_bytes().to_vec(),
                AudioEncoding::wav(24000),
            )),
            Outcome::Fail => Err(SynthesisError::EmptyAudio),
        }
    }
}

struct StubCalls {
    recognizer: Arc<AtomicUsize>,
    agent: Arc<AtomicUsize>,
    synthesizer: Arc<AtomicUsize>,
}

fn setup_app(recognizer: Outcome, agent: Outcome, synthesizer: Outcome) -> (axum::Router, StubCalls) {
    let calls = StubCalls {
        recognizer: Arc::new(AtomicUsize::new(0)),
        agent: Arc::new(AtomicUsize::new(0)),
        synthesizer: Arc::new(AtomicUsize::new(0)),
    };

    let pipeline = VoicePipeline::new(
        Arc::new(StubRecognizer {
            outcome: recognizer,
            calls: calls.recognizer.clone(),
        }),
        Arc::new(StubAgent {
            outcome: agent,
            calls: calls.agent.clone(),
        }),
        Arc::new(StubSynthesizer {
            outcome: synthesizer,
            calls: calls.synthesizer.clone(),
        }),
        AgentSession::new("asst_test"),
    );

    (app(Arc::new(AppState { pipeline })), calls)
}

fn sample_wav() -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 16000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..160i16 {
            writer.write_sample(i * 100).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

fn multipart_body_named(name: &str, bytes: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"{name}\"; filename=\"audio.wav\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: audio/wav\r\n\r\n");
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_body(bytes: &[u8]) -> Vec<u8> {
    multipart_body_named("file", bytes)
}

fn chat_request_with_body(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .uri("/api/chat")
        .method("POST")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn chat_request(bytes: &[u8]) -> Request<Body> {
    chat_request_with_body(multipart_body(bytes))
}

async fn json_body(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn chat_returns_synthesized_audio() {
    let (app, calls) = setup_app(Outcome::Ok, Outcome::Ok, Outcome::Ok);

    let response = app.oneshot(chat_request(&sample_wav())).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "audio/wav"
    );

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&body[..], b"hi there");

    assert_eq!(calls.recognizer.load(Ordering::SeqCst), 1);
    assert_eq!(calls.agent.load(Ordering::SeqCst), 1);
    assert_eq!(calls.synthesizer.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn missing_file_is_rejected_without_invoking_pipeline() {
    let (app, calls) = setup_app(Outcome::Ok, Outcome::Ok, Outcome::Ok);

    let body = format!("--{BOUNDARY}--\r\n").into_bytes();
    let response = app.oneshot(chat_request_with_body(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(calls.recognizer.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn wrongly_named_field_is_rejected_without_invoking_pipeline() {
    let (app, calls) = setup_app(Outcome::Ok, Outcome::Ok, Outcome::Ok);

    let body = multipart_body_named("audio", &sample_wav());
    let response = app.oneshot(chat_request_with_body(body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"], "expected a multipart field named 'file'");
    assert_eq!(calls.recognizer.load(Ordering::SeqCst), 0);
    assert_eq!(calls.agent.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn empty_upload_is_rejected_without_invoking_pipeline() {
    let (app, calls) = setup_app(Outcome::Ok, Outcome::Ok, Outcome::Ok);

    let response = app.oneshot(chat_request(&[])).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["stage"], "transport");
    assert_eq!(calls.recognizer.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn corrupt_audio_is_rejected_without_invoking_pipeline() {
    let (app, calls) = setup_app(Outcome::Ok, Outcome::Ok, Outcome::Ok);

    let response = app
        .oneshot(chat_request(b"definitely not riff/wave data"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = json_body(response).await;
    assert_eq!(json["error"], "audio is not valid WAV");
    assert_eq!(calls.recognizer.load(Ordering::SeqCst), 0);
    assert_eq!(calls.agent.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn recognition_failure_maps_to_bad_gateway_with_stage() {
    let (app, calls) = setup_app(Outcome::Fail, Outcome::Ok, Outcome::Ok);

    let response = app.oneshot(chat_request(&sample_wav())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = json_body(response).await;
    assert_eq!(json["stage"], "recognition");
    assert_eq!(calls.agent.load(Ordering::SeqCst), 0);
    assert_eq!(calls.synthesizer.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn agent_failure_maps_to_bad_gateway_with_stage() {
    let (app, calls) = setup_app(Outcome::Ok, Outcome::Fail, Outcome::Ok);

    let response = app.oneshot(chat_request(&sample_wav())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = json_body(response).await;
    assert_eq!(json["stage"], "agent");
    assert_eq!(calls.synthesizer.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn synthesis_failure_maps_to_bad_gateway_with_stage() {
    let (app, _calls) = setup_app(Outcome::Ok, Outcome::Ok, Outcome::Fail);

    let response = app.oneshot(chat_request(&sample_wav())).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let json = json_body(response).await;
    assert_eq!(json["stage"], "synthesis");
}

#[tokio::test]
async fn health_check_returns_ok() {
    let (app, _calls) = setup_app(Outcome::Ok, Outcome::Ok, Outcome::Ok);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn root_points_at_chat_endpoint() {
    let (app, _calls) = setup_app(Outcome::Ok, Outcome::Ok, Outcome::Ok);

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert!(json["message"].as_str().unwrap().contains("/api/chat"));
}
