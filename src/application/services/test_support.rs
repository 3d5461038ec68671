//! 测试用脚本化 Provider
//!
//! 每个端点一个应答队列；队列取空后重复最后一次应答。
//! 记录各端点调用次数、提交的请求体和每次状态轮询的（虚拟）时刻

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use http::StatusCode;
use serde_json::{json, Value};
use tokio::time::Instant;

use crate::application::ports::{ProviderPort, ProviderResponse, TransportError};
use crate::domain::job::{JobId, RunId, SynthesisRequest};
use crate::domain::Credential;

pub type Reply = Result<ProviderResponse, TransportError>;

pub fn json_response(status: StatusCode, value: &Value) -> ProviderResponse {
    ProviderResponse::new(
        status,
        Some("application/json".to_string()),
        value.to_string().into_bytes(),
    )
}

pub fn json_reply(status: u16, value: Value) -> Reply {
    Ok(json_response(StatusCode::from_u16(status).unwrap(), &value))
}

pub fn voices_reply(voices: &[(i64, &str)]) -> Reply {
    let items: Vec<Value> = voices
        .iter()
        .map(|(id, name)| json!({"id": id, "voice_name": name}))
        .collect();
    json_reply(200, json!({"status_code": 200, "payload": items}))
}

pub fn task_reply(task_id: &str) -> Reply {
    json_reply(200, json!({"status_code": 200, "payload": {"task_id": task_id}}))
}

pub fn status_reply(status: &str, run_id: Option<&str>) -> Reply {
    json_reply(200, json!({"payload": {"status": status, "run_id": run_id}}))
}

pub fn audio_reply(content_type: &str, body: &[u8]) -> Reply {
    Ok(ProviderResponse::new(
        StatusCode::OK,
        Some(content_type.to_string()),
        Bytes::copy_from_slice(body),
    ))
}

#[derive(Default)]
struct Script {
    queue: VecDeque<Reply>,
    last: Option<Reply>,
}

impl Script {
    fn next(&mut self) -> Reply {
        if let Some(reply) = self.queue.pop_front() {
            self.last = Some(reply.clone());
            return reply;
        }
        self.last
            .clone()
            .unwrap_or_else(|| Err(TransportError::Network("no scripted reply".to_string())))
    }
}

#[derive(Default)]
pub struct ScriptedProvider {
    voices: Mutex<Script>,
    submits: Mutex<Script>,
    statuses: Mutex<Script>,
    results: Mutex<Script>,
    list_voices_calls: AtomicUsize,
    submit_calls: AtomicUsize,
    status_calls: AtomicUsize,
    result_calls: AtomicUsize,
    submitted: Mutex<Vec<SynthesisRequest>>,
    poll_instants: Mutex<Vec<Instant>>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// 每次应答前等待（配合暂停时钟测试超时）
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn push_voices(&self, reply: Reply) {
        self.voices.lock().unwrap().queue.push_back(reply);
    }

    pub fn push_submit(&self, reply: Reply) {
        self.submits.lock().unwrap().queue.push_back(reply);
    }

    pub fn push_status(&self, reply: Reply) {
        self.statuses.lock().unwrap().queue.push_back(reply);
    }

    pub fn push_result(&self, reply: Reply) {
        self.results.lock().unwrap().queue.push_back(reply);
    }

    pub fn list_voices_calls(&self) -> usize {
        self.list_voices_calls.load(Ordering::SeqCst)
    }

    pub fn submit_calls(&self) -> usize {
        self.submit_calls.load(Ordering::SeqCst)
    }

    pub fn tts_status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn tts_result_calls(&self) -> usize {
        self.result_calls.load(Ordering::SeqCst)
    }

    pub fn total_calls(&self) -> usize {
        self.list_voices_calls() + self.submit_calls() + self.tts_status_calls() + self.tts_result_calls()
    }

    pub fn submitted(&self) -> Vec<SynthesisRequest> {
        self.submitted.lock().unwrap().clone()
    }

    /// 相邻两次状态轮询之间的间隔
    pub fn poll_gaps(&self) -> Vec<Duration> {
        let instants = self.poll_instants.lock().unwrap();
        instants.windows(2).map(|w| w[1] - w[0]).collect()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl ProviderPort for ScriptedProvider {
    async fn list_voices(&self, _credential: &Credential) -> Reply {
        self.list_voices_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.voices.lock().unwrap().next();
        self.pause().await;
        reply
    }

    async fn submit_tts(&self, _credential: &Credential, request: &SynthesisRequest) -> Reply {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submitted.lock().unwrap().push(request.clone());
        let reply = self.submits.lock().unwrap().next();
        self.pause().await;
        reply
    }

    async fn tts_status(&self, _credential: &Credential, _job_id: &JobId) -> Reply {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        self.poll_instants.lock().unwrap().push(Instant::now());
        let reply = self.statuses.lock().unwrap().next();
        self.pause().await;
        reply
    }

    async fn tts_result(&self, _credential: &Credential, _run_id: &RunId) -> Reply {
        self.result_calls.fetch_add(1, Ordering::SeqCst);
        let reply = self.results.lock().unwrap().next();
        self.pause().await;
        reply
    }
}
