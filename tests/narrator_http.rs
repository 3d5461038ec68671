//! NarratorSession + HttpProviderClient 端到端测试
//!
//! 用 wiremock 模拟服务商接口:
//! - `GET /list-voices`
//! - `POST /tts`
//! - `GET /tts/{task_id}`
//! - `GET /tts-result/{run_id}`

use std::sync::Arc;
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;
use wiremock::{
    matchers::{body_partial_json, header, method, path},
    Mock, MockServer, ResponseTemplate,
};

use narrator::application::{NarratorError, PollSettings, SessionSettings, SynthesisOptions};
use narrator::domain::voice::VoiceId;
use narrator::infrastructure::{HttpProviderClient, HttpProviderClientConfig, InMemoryAudioRegistry};
use narrator::NarratorSession;

const API_KEY: &str = "test-key";

fn fast_settings() -> SessionSettings {
    SessionSettings {
        validation_timeout: Duration::from_secs(5),
        poll: PollSettings {
            max_attempts: 5,
            base_backoff: Duration::from_millis(10),
            max_backoff: Duration::from_millis(30),
            error_penalty: Duration::from_millis(10),
        },
        ..SessionSettings::default()
    }
}

fn create_session(server: &MockServer) -> NarratorSession {
    let config = HttpProviderClientConfig::new(server.uri()).with_timeout(5);
    let provider = Arc::new(HttpProviderClient::new(config).expect("Failed to create client"));
    NarratorSession::new(provider, InMemoryAudioRegistry::new().arc(), fast_settings())
}

async fn mount_voices(server: &MockServer, voices: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/list-voices"))
        .and(header("x-api-key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_json(voices))
        .mount(server)
        .await;
}

async fn mount_job(server: &MockServer, task_id: &str, run_id: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/tts/{}", task_id)))
        .and(header("x-api-key", API_KEY))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "PENDING"})),
        )
        .up_to_n_times(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path(format!("/tts/{}", task_id)))
        .and(header("x-api-key", API_KEY))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "SUCCESS", "run_id": run_id})),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_binary_audio_result() {
    let server = MockServer::start().await;
    mount_voices(
        &server,
        json!({"status_code": 200, "payload": [
            {"id": 11, "voice_name": "Ana"},
            {"id": 12, "voice_name": "Ben"}
        ]}),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/tts"))
        .and(header("x-api-key", API_KEY))
        .and(body_partial_json(json!({
            "text": "Hello there",
            "voice_id": 12,
            "language": 1,
            "gender": 1
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "task-1"})))
        .expect(1)
        .mount(&server)
        .await;

    mount_job(&server, "task-1", json!(77)).await;

    Mock::given(method("GET"))
        .and(path("/tts-result/77"))
        .and(header("x-api-key", API_KEY))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"ID3AUDIO".to_vec(), "audio/mpeg"))
        .mount(&server)
        .await;

    let session = create_session(&server);
    assert!(session.initialize(API_KEY, Some(VoiceId::new(12))).await);

    let result = session
        .synthesize("Hello there", SynthesisOptions::default())
        .await
        .expect("synthesis should succeed");

    assert_eq!(result.bytes().unwrap().as_ref(), b"ID3AUDIO");
    assert_eq!(result.mime_type(), Some("audio/mpeg"));
    assert_eq!(result.extension(), "mp3");

    session.release().await;
    assert_eq!(session.outstanding_results(), 1);
    assert!(session.release_result(&result.handle()));
}

#[tokio::test]
async fn test_inline_base64_result() {
    let server = MockServer::start().await;
    mount_voices(&server, json!([{"id": 5, "voice_name": "Solo"}])).await;

    Mock::given(method("POST"))
        .and(path("/tts"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"payload": {"task_id": "t-9"}})),
        )
        .mount(&server)
        .await;

    mount_job(&server, "t-9", json!("run-9")).await;

    Mock::given(method("GET"))
        .and(path("/tts-result/run-9"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"payload": {"audio_content": STANDARD.encode(b"RIFF1234")}})),
        )
        .mount(&server)
        .await;

    let session = create_session(&server);
    assert!(session.initialize(API_KEY, None).await);

    let result = session
        .synthesize("Inline please", SynthesisOptions::default())
        .await
        .expect("synthesis should succeed");

    assert_eq!(result.bytes().unwrap().as_ref(), b"RIFF1234");
    assert_eq!(result.mime_type(), Some("audio/wav"));
}

#[tokio::test]
async fn test_voice_rejection_recovery() {
    let server = MockServer::start().await;

    // 初始化时目录只有 11，恢复时刷新得到 21
    Mock::given(method("GET"))
        .and(path("/list-voices"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 11, "voice_name": "Old"}])),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_voices(&server, json!([{"id": 21, "voice_name": "New"}])).await;

    Mock::given(method("POST"))
        .and(path("/tts"))
        .and(body_partial_json(json!({"voice_id": 11})))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": [{"loc": ["body", "voice_id"], "msg": "voice not found"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/tts"))
        .and(body_partial_json(json!({"voice_id": 21})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "task-2"})))
        .expect(1)
        .mount(&server)
        .await;

    mount_job(&server, "task-2", json!("run-2")).await;

    Mock::given(method("GET"))
        .and(path("/tts-result/run-2"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"WAVE".to_vec(), "audio/wav"))
        .mount(&server)
        .await;

    let session = create_session(&server);
    assert!(session.initialize(API_KEY, None).await);
    assert_eq!(session.selected_voice().await.unwrap().id(), VoiceId::new(11));

    let result = session
        .synthesize("Recover me", SynthesisOptions::default())
        .await
        .expect("recovered synthesis should succeed");

    assert_eq!(result.bytes().unwrap().as_ref(), b"WAVE");
    assert_eq!(session.selected_voice().await.unwrap().id(), VoiceId::new(21));
}

#[tokio::test]
async fn test_rejected_api_key() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/list-voices"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"detail": "Invalid API key"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/tts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "never"})))
        .expect(0)
        .mount(&server)
        .await;

    let session = create_session(&server);
    assert!(!session.initialize("wrong-key", None).await);

    let err = session
        .synthesize("Hello", SynthesisOptions::default())
        .await
        .unwrap_err();
    assert_eq!(err, NarratorError::NotInitialized);
}

#[tokio::test]
async fn test_failed_job_surfaces_error() {
    let server = MockServer::start().await;
    mount_voices(&server, json!([{"id": 1, "voice_name": "One"}])).await;

    Mock::given(method("POST"))
        .and(path("/tts"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_id": "bad"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/tts/bad"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ERROR"})))
        .mount(&server)
        .await;

    let session = create_session(&server);
    assert!(session.initialize(API_KEY, None).await);

    let err = session
        .synthesize("Hello", SynthesisOptions::default())
        .await
        .unwrap_err();
    assert!(matches!(err, NarratorError::Poll(_)));
}
