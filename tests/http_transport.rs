//! End-to-end client tests over a real TCP socket.
//!
//! Each test binds a one-shot server on an ephemeral port, captures the raw
//! request and answers with a canned response.

use cipherscope::client::Client;
use cipherscope::normalize::AttackResult;
use cipherscope::{
    build_attack, AttackForm, AttackType, ClientError, ComparisonSet, HttpRequest, HttpTransport,
    Transport, TransportError,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

// =============================================================================
// ONE-SHOT SERVER
// =============================================================================

struct Captured {
    head: String,
    body: Vec<u8>,
}

async fn serve_once(response: Vec<u8>) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        let head_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            buf.extend_from_slice(&chunk[..n]);
            if let Some(i) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                break i + 4;
            }
        };
        let head = String::from_utf8(buf[..head_end].to_vec()).unwrap();
        let length = head
            .lines()
            .find_map(|l| {
                let (k, v) = l.split_once(':')?;
                k.eq_ignore_ascii_case("content-length")
                    .then(|| v.trim().parse::<usize>().unwrap())
            })
            .unwrap_or(0);
        while buf.len() < head_end + length {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed mid-body");
            buf.extend_from_slice(&chunk[..n]);
        }
        socket.write_all(&response).await.unwrap();
        socket.shutdown().await.unwrap();
        Captured {
            head,
            body: buf[head_end..head_end + length].to_vec(),
        }
    });
    (format!("http://{addr}"), handle)
}

fn json_response(status: &str, body: &str) -> Vec<u8> {
    format!(
        "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{body}",
        body.len()
    )
    .into_bytes()
}

// =============================================================================
// FRAMING
// =============================================================================

#[tokio::test]
async fn content_length_response() {
    let (url, server) = serve_once(json_response("200 OK", r#"{"ok":true}"#)).await;
    let transport = HttpTransport::new(&url).unwrap();

    let response = transport.send(HttpRequest::get("/api/ping")).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.body, br#"{"ok":true}"#);
    assert_eq!(response.header("content-type"), Some("application/json"));

    let captured = server.await.unwrap();
    assert!(captured.head.starts_with("GET /api/ping HTTP/1.1\r\n"));
    assert!(captured.head.contains("Connection: close\r\n"));
}

#[tokio::test]
async fn chunked_response() {
    let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n\
        5\r\n{\"a\":\r\n3\r\n 1}\r\n0\r\n\r\n"
        .to_vec();
    let (url, server) = serve_once(raw).await;
    let transport = HttpTransport::new(&url).unwrap();

    let response = transport.send(HttpRequest::get("/x")).await.unwrap();
    assert_eq!(response.body, b"{\"a\": 1}");
    server.await.unwrap();
}

#[tokio::test]
async fn body_until_eof() {
    let raw = b"HTTP/1.0 200 OK\r\nContent-Type: text/plain\r\n\r\nraw bytes".to_vec();
    let (url, server) = serve_once(raw).await;
    let transport = HttpTransport::new(&url).unwrap();

    let response = transport.send(HttpRequest::get("/x")).await.unwrap();
    assert_eq!(response.body, b"raw bytes");
    server.await.unwrap();
}

#[tokio::test]
async fn truncated_body_is_malformed() {
    let raw = b"HTTP/1.1 200 OK\r\nContent-Length: 50\r\n\r\nshort".to_vec();
    let (url, server) = serve_once(raw).await;
    let transport = HttpTransport::new(&url).unwrap();

    let err = transport.send(HttpRequest::get("/x")).await.unwrap_err();
    assert!(matches!(err, TransportError::Malformed(_)), "{err:?}");
    server.await.unwrap();
}

#[tokio::test]
async fn base_url_prefix_is_prepended() {
    let (url, server) = serve_once(json_response("200 OK", "{}")).await;
    let transport = HttpTransport::new(&format!("{url}/dashboard/")).unwrap();

    transport.send(HttpRequest::get("/api/structural-analysis")).await.unwrap();
    let captured = server.await.unwrap();
    assert!(captured
        .head
        .starts_with("GET /dashboard/api/structural-analysis HTTP/1.1\r\n"));
}

#[test]
fn unsupported_scheme_is_rejected() {
    let err = HttpTransport::new("https://example.com").unwrap_err();
    assert!(matches!(err, TransportError::InvalidUrl { .. }));
}

// =============================================================================
// TYPED CLIENT
// =============================================================================

#[tokio::test]
async fn attack_posts_json_and_normalizes() {
    let body = r#"{"success":true,"results":{"TEA":[{"bit_position":1,"avalanche_percentage":12.5}],"AES":[{"bit_position":1,"avalanche_percentage":50.0}]}}"#;
    let (url, server) = serve_once(json_response("200 OK", body)).await;
    let set = ComparisonSet::default();
    let client = Client::with_transport(HttpTransport::new(&url).unwrap(), set.clone());

    let form = AttackForm::new(AttackType::Avalanche, &set).sample_bytes(b"AB");
    let result = client.attack(&build_attack(&form)).await.unwrap();
    let AttackResult::Avalanche(report) = result else {
        panic!("expected avalanche result");
    };
    assert_eq!(report.average(&"TEA".into()), Some(12.5));

    let captured = server.await.unwrap();
    assert!(captured.head.starts_with("POST /api/avalanche-test HTTP/1.1\r\n"));
    assert!(captured.head.contains("Content-Type: application/json\r\n"));
    let sent: serde_json::Value = serde_json::from_slice(&captured.body).unwrap();
    assert_eq!(sent["plaintext"], "4142");
}

#[tokio::test]
async fn error_status_carries_body_message() {
    let (url, server) =
        serve_once(json_response("400 BAD REQUEST", r#"{"error":"No key provided"}"#)).await;
    let client = Client::with_transport(HttpTransport::new(&url).unwrap(), ComparisonSet::default());

    let err = client.structural_analysis().await.unwrap_err();
    match &err {
        ClientError::Status { status, message } => {
            assert_eq!(*status, 400);
            assert_eq!(message.as_deref(), Some("No key provided"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.user_message("Failed to fetch structural analysis"), "No key provided");
    server.await.unwrap();
}

#[tokio::test]
async fn encrypt_uploads_multipart() {
    let body = r#"{"success":true,"filename":"encrypted_AES_notes.txt","original_size":3,"encrypted_size":16,"performance":{"time_ms":0.5,"throughput_mbps":6.0,"cpu_percent":1.0,"memory_mb":0.1}}"#;
    let (url, server) = serve_once(json_response("200 OK", body)).await;
    let client = Client::with_transport(HttpTransport::new(&url).unwrap(), ComparisonSet::default());

    let receipt = client
        .encrypt(&"AES".into(), "00112233445566778899aabbccddeeff", "notes.txt", b"abc".to_vec())
        .await
        .unwrap();
    assert_eq!(receipt.filename, "encrypted_AES_notes.txt");
    assert_eq!(receipt.output_size, Some(16));

    let captured = server.await.unwrap();
    assert!(captured.head.starts_with("POST /api/encrypt HTTP/1.1\r\n"));
    assert!(captured
        .head
        .contains("Content-Type: multipart/form-data; boundary=cipherscope-"));
    let form = String::from_utf8(captured.body).unwrap();
    assert!(form.contains("name=\"algorithm\"\r\n\r\nAES\r\n"));
    assert!(form.contains("filename=\"notes.txt\""));
}

#[tokio::test]
async fn download_returns_raw_bytes() {
    let raw = b"HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: 4\r\n\r\n\x00\x01\x02\xff".to_vec();
    let (url, server) = serve_once(raw).await;
    let client = Client::with_transport(HttpTransport::new(&url).unwrap(), ComparisonSet::default());

    let bytes = client.download("encrypted AES.bin").await.unwrap();
    assert_eq!(bytes, vec![0, 1, 2, 0xff]);
    let captured = server.await.unwrap();
    assert!(captured
        .head
        .starts_with("GET /api/download/encrypted%20AES.bin HTTP/1.1\r\n"));
}
