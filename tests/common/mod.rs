/*!
 * Common test utilities for the tlgate test suite
 */

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use tlgate::app_config::EngineConfig;
use tlgate::providers::mock::MockProvider;
use tlgate::TranslationService;

/// Engine configuration with no backoff pause
pub fn engine_config() -> EngineConfig {
    EngineConfig {
        retry_backoff_ms: 0,
        ..EngineConfig::default()
    }
}

/// Service over a clone of the given mock, sharing its request log
pub fn service_with(provider: &MockProvider) -> TranslationService {
    TranslationService::new(Arc::new(provider.clone()), engine_config())
}

/// Initialize logging for tests that want to see engine output
pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Minimal HTTP server answering every request with canned responses
///
/// Responses are served in order and the last one repeats. Request bodies
/// are recorded.
pub struct FakeServer {
    pub url: String,
    pub bodies: Arc<Mutex<Vec<String>>>,
    pub paths: Arc<Mutex<Vec<String>>>,
}

impl FakeServer {
    pub async fn start(responses: Vec<(u16, String)>) -> FakeServer {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let bodies = Arc::new(Mutex::new(Vec::new()));
        let paths = Arc::new(Mutex::new(Vec::new()));
        let responses = Arc::new(Mutex::new(VecDeque::from(responses)));

        let (bodies_ref, paths_ref) = (Arc::clone(&bodies), Arc::clone(&paths));
        tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let (status, body) = {
                    let mut queue = responses.lock().unwrap();
                    if queue.len() > 1 {
                        queue.pop_front().unwrap()
                    } else {
                        queue.front().cloned().unwrap_or((500, String::new()))
                    }
                };
                let bodies = Arc::clone(&bodies_ref);
                let paths = Arc::clone(&paths_ref);
                tokio::spawn(async move {
                    handle(stream, status, body, bodies, paths).await;
                });
            }
        });

        FakeServer { url, bodies, paths }
    }

    pub fn bodies(&self) -> Vec<String> {
        self.bodies.lock().unwrap().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.paths.lock().unwrap().clone()
    }
}

/// Chat completion response body carrying the given content
pub fn chat_response(content: &str) -> String {
    serde_json::json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    })
    .to_string()
}

async fn handle(
    mut stream: TcpStream,
    status: u16,
    body: String,
    bodies: Arc<Mutex<Vec<String>>>,
    paths: Arc<Mutex<Vec<String>>>,
) {
    let mut buffer = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let Ok(n) = stream.read(&mut chunk).await else { return };
        if n == 0 {
            return;
        }
        buffer.extend_from_slice(&chunk[..n]);
        if let Some(pos) = find(&buffer, b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buffer[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    while buffer.len() < header_end + content_length {
        let Ok(n) = stream.read(&mut chunk).await else { return };
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }

    if let Some(path) = head.lines().next().and_then(|l| l.split_whitespace().nth(1)) {
        paths.lock().unwrap().push(path.to_string());
    }
    let request_body = String::from_utf8_lossy(&buffer[header_end..]).to_string();
    bodies.lock().unwrap().push(request_body);

    let reason = if status == 200 { "OK" } else { "Error" };
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        status,
        reason,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes()).await;
    let _ = stream.shutdown().await;
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
