//! End-to-end exercises of the save/load exchanges against a fake backend.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use mapstash::backend::samples::{SamplesError, fetch_samples};
use mapstash::backend::save::SaveError;
use mapstash::config::{AppConfig, BackendConfig};
use mapstash::export::save_to_backend;
use mapstash::seed;
use mapstash::state::{AddDataRequest, Dataset, SharedMapState};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// A single-threaded fake backend that serves one canned response per
/// accepted connection and records each raw request.
struct FakeBackend {
    url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeBackend {
    fn serve(responses: Vec<String>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let captured = Arc::clone(&requests);
        thread::spawn(move || {
            for response in responses {
                let Ok((mut stream, _)) = listener.accept() else {
                    return;
                };
                let request = read_request(&mut stream);
                captured.lock().unwrap().push(request);
                let _ = stream.write_all(response.as_bytes());
            }
        });
        Self { url, requests }
    }

    fn backend(&self) -> BackendConfig {
        let config = AppConfig {
            base_url: Some(self.url.clone()),
            ..AppConfig::default()
        };
        config.resolve_backend().unwrap()
    }

    fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn read_request(stream: &mut TcpStream) -> String {
    stream
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let mut bytes = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        if let Some(header_end) = find_header_end(&bytes) {
            let headers = String::from_utf8_lossy(&bytes[..header_end]).to_string();
            let body_len = content_length(&headers);
            if bytes.len() >= header_end + 4 + body_len {
                break;
            }
        }
        match stream.read(&mut buf) {
            Ok(0) => break,
            Ok(read) => bytes.extend_from_slice(&buf[..read]),
            Err(_) => break,
        }
    }
    String::from_utf8_lossy(&bytes).to_string()
}

fn find_header_end(bytes: &[u8]) -> Option<usize> {
    bytes.windows(4).position(|window| window == b"\r\n\r\n")
}

fn content_length(headers: &str) -> usize {
    headers
        .lines()
        .find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse().ok())?
        })
        .unwrap_or(0)
}

fn json_response(status: &str, body: &str) -> String {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
}

fn body_of(request: &str) -> serde_json::Value {
    let (_, body) = request.split_once("\r\n\r\n").unwrap();
    serde_json::from_str(body).unwrap()
}

#[test]
fn save_sends_json_headers_and_the_full_payload() {
    let server = FakeBackend::serve(vec![json_response("200 OK", r#"{"message":"ok"}"#)]);
    let state = SharedMapState::new();
    seed::load_sample_data(&state).unwrap();

    let before = OffsetDateTime::now_utc();
    let receipt = save_to_backend(&server.backend(), &state).unwrap();
    let after = OffsetDateTime::now_utc();
    assert_eq!(receipt.message, "ok");

    let requests = server.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert!(request.starts_with("POST /api/save HTTP/1.1\r\n"));
    let lowered = request.to_lowercase();
    assert!(lowered.contains("content-type: application/json"));
    assert!(lowered.contains("accept: application/json"));

    let body = body_of(request);
    assert!(body.get("datasets").is_some());
    assert!(body.get("config").is_some());
    assert_eq!(body["info"]["app"], "kepler.gl");
    assert_eq!(body["datasets"].as_array().unwrap().len(), 4);

    let created_at =
        OffsetDateTime::parse(body["info"]["created_at"].as_str().unwrap(), &Rfc3339).unwrap();
    assert!(created_at >= before);
    assert!(created_at <= after);
}

#[test]
fn consecutive_saves_carry_independent_snapshots() {
    let server = FakeBackend::serve(vec![
        json_response("200 OK", r#"{"message":"first"}"#),
        json_response("200 OK", r#"{"message":"second"}"#),
    ]);
    let backend = server.backend();
    let state = SharedMapState::new();
    state.with(|map| {
        map.add_data_to_map(AddDataRequest {
            datasets: vec![Dataset::with_id("a", "A", serde_json::json!({"rows": []}))],
            ..AddDataRequest::default()
        })
    });

    let first = save_to_backend(&backend, &state).unwrap();
    state.with(|map| {
        map.add_data_to_map(AddDataRequest {
            datasets: vec![Dataset::with_id("b", "B", serde_json::json!({"rows": []}))],
            ..AddDataRequest::default()
        })
    });
    let second = save_to_backend(&backend, &state).unwrap();

    assert_eq!(first.message, "first");
    assert_eq!(second.message, "second");
    let requests = server.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(body_of(&requests[0])["datasets"].as_array().unwrap().len(), 1);
    assert_eq!(body_of(&requests[1])["datasets"].as_array().unwrap().len(), 2);
}

#[test]
fn failed_save_surfaces_a_tagged_status_error() {
    let server = FakeBackend::serve(vec![json_response(
        "500 Internal Server Error",
        r#"{"error":"boom"}"#,
    )]);
    let state = SharedMapState::new();

    let err = save_to_backend(&server.backend(), &state).unwrap_err();
    match err {
        SaveError::Status { code, body } => {
            assert_eq!(code, 500);
            assert!(body.contains("boom"));
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[test]
fn unreachable_backend_is_a_transport_error_not_a_crash() {
    // Bind and drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let config = AppConfig {
        base_url: Some(url),
        ..AppConfig::default()
    };
    let backend = config.resolve_backend().unwrap();

    let err = save_to_backend(&backend, &SharedMapState::new()).unwrap_err();
    assert!(matches!(err, SaveError::Transport(_)));
}

#[test]
fn malformed_save_response_is_a_json_error() {
    let server = FakeBackend::serve(vec![json_response("200 OK", "<html>not json</html>")]);
    let err = save_to_backend(&server.backend(), &SharedMapState::new()).unwrap_err();
    assert!(matches!(err, SaveError::Json(_)));
}

#[test]
fn samples_fetch_hits_the_user_path_and_parses_the_list() {
    let server = FakeBackend::serve(vec![json_response(
        "200 OK",
        r#"[{"id":"nyc","label":"NYC Trips"},{"id":"sf"}]"#,
    )]);

    let samples = fetch_samples(&server.backend(), None).unwrap();
    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].label.as_deref(), Some("NYC Trips"));

    let requests = server.requests();
    assert!(requests[0].starts_with("GET /api/demo/samples HTTP/1.1\r\n"));
}

#[test]
fn samples_fetch_appends_the_sample_map_id() {
    let server = FakeBackend::serve(vec![json_response(
        "200 OK",
        r#"{"id":"nyc","label":"NYC Trips"}"#,
    )]);

    let samples = fetch_samples(&server.backend(), Some("nyc")).unwrap();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].id.as_deref(), Some("nyc"));

    let requests = server.requests();
    assert!(requests[0].starts_with("GET /api/demo/samples/nyc HTTP/1.1\r\n"));
}

#[test]
fn samples_fetch_failure_is_tagged() {
    let server = FakeBackend::serve(vec![json_response("404 Not Found", r#"{"error":"no user"}"#)]);
    let err = fetch_samples(&server.backend(), None).unwrap_err();
    match err {
        SamplesError::Status { code, .. } => assert_eq!(code, 404),
        other => panic!("expected status error, got {other:?}"),
    }
}
