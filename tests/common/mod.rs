#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use actix_web::http::StatusCode;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::{json, Value};

use groq_chat_relay::config::UpstreamConfig;

pub const COMPLETIONS_PATH: &str = "/openai/v1/chat/completions";

/// What the fake upstream saw and what it still has to say.
pub struct FakeUpstream {
    script: Mutex<VecDeque<(u16, String)>>,
    hits: Mutex<Vec<Instant>>,
    requests: Mutex<Vec<(Option<String>, Value)>>,
    delay: Duration,
}

impl FakeUpstream {
    pub fn hit_count(&self) -> usize {
        self.hits.lock().unwrap().len()
    }

    /// Time between consecutive arrivals.
    pub fn gaps(&self) -> Vec<Duration> {
        let hits = self.hits.lock().unwrap();
        hits.windows(2).map(|w| w[1] - w[0]).collect()
    }

    /// Authorization header and JSON body of the first request.
    pub fn first_request(&self) -> (Option<String>, Value) {
        self.requests.lock().unwrap()[0].clone()
    }
}

pub fn completion(content: &str) -> (u16, String) {
    let body = json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    });
    (200, body.to_string())
}

pub fn api_error(status: u16, message: &str) -> (u16, String) {
    let body = json!({"error": {"message": message, "type": "api_error"}});
    (status, body.to_string())
}

async fn completions(
    req: HttpRequest,
    body: web::Bytes,
    upstream: web::Data<FakeUpstream>,
) -> HttpResponse {
    upstream.hits.lock().unwrap().push(Instant::now());

    let auth = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let payload = serde_json::from_slice(&body).unwrap_or(Value::Null);
    upstream.requests.lock().unwrap().push((auth, payload));

    if !upstream.delay.is_zero() {
        actix_web::rt::time::sleep(upstream.delay).await;
    }

    let next = upstream.script.lock().unwrap().pop_front();
    let (status, body) = next.unwrap_or_else(|| completion("default reply"));
    HttpResponse::build(StatusCode::from_u16(status).unwrap())
        .content_type("application/json")
        .body(body)
}

/// Start a fake chat completions server that plays `script` back in order.
pub fn spawn_upstream(script: Vec<(u16, String)>, delay: Duration) -> (String, web::Data<FakeUpstream>) {
    let upstream = web::Data::new(FakeUpstream {
        script: Mutex::new(script.into()),
        hits: Mutex::new(Vec::new()),
        requests: Mutex::new(Vec::new()),
        delay,
    });

    let app_data = upstream.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_data.clone())
            .route(COMPLETIONS_PATH, web::post().to(completions))
    })
    .workers(1)
    .disable_signals()
    .bind(("127.0.0.1", 0))
    .unwrap();

    let addr = server.addrs()[0];
    actix_web::rt::spawn(server.run());

    (format!("http://{addr}{COMPLETIONS_PATH}"), upstream)
}

pub fn upstream_config(api_url: &str, max_retries: u32, backoff_ms: u64) -> UpstreamConfig {
    let mut config = UpstreamConfig::with_api_key("test-key");
    config.api_url = api_url.to_string();
    config.max_retries = max_retries;
    config.backoff_unit = Duration::from_millis(backoff_ms);
    config.request_timeout = Duration::from_secs(5);
    config
}
