//! HTTP-level tests for `LabelaryClient` against a local stub server.
//!
//! The stub is a bare `TcpListener` that reads one request, records it, and
//! answers with a canned status and body.

mod common;

use common::{make_pdf, page_markers, zpl_labels};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use zpl2pdf::{convert_bytes, ConversionConfig, LabelRenderer, LabelaryClient, RenderRequest, Zpl2PdfError};

#[derive(Debug, Clone)]
struct SeenRequest {
    method: String,
    path: String,
    headers: Vec<(String, String)>,
    body: Vec<u8>,
}

impl SeenRequest {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

type Responder = Arc<dyn Fn(&SeenRequest) -> (u16, Vec<u8>) + Send + Sync>;

/// Start a stub server; returns its base URL and the log of requests it saw.
async fn spawn_stub(responder: Responder) -> (String, Arc<Mutex<Vec<SeenRequest>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = Arc::clone(&seen);

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            let Some(request) = read_request(&mut stream).await else {
                continue;
            };
            let (status, body) = responder(&request);
            log.lock().unwrap().push(request);
            let head = format!(
                "HTTP/1.1 {status} Stub\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                body.len()
            );
            let _ = stream.write_all(head.as_bytes()).await;
            let _ = stream.write_all(&body).await;
            let _ = stream.shutdown().await;
        }
    });

    (format!("http://{addr}/v1/printers"), seen)
}

async fn read_request(stream: &mut TcpStream) -> Option<SeenRequest> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    let header_end = loop {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            return None;
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next()?.split_whitespace();
    let method = request_line.next()?.to_string();
    let path = request_line.next()?.to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, v)| v.parse::<usize>().ok())
        .unwrap_or(0);

    let mut body = buf[header_end..].to_vec();
    while body.len() < content_length {
        let n = stream.read(&mut chunk).await.ok()?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }

    Some(SeenRequest {
        method,
        path,
        headers,
        body,
    })
}

fn geometry(dpmm: u32, width_in: f64, height_in: f64) -> RenderRequest {
    RenderRequest {
        dpmm,
        width_in,
        height_in,
    }
}

#[tokio::test]
async fn posts_zpl_with_pdf_accept_header() {
    let (base, seen) = spawn_stub(Arc::new(|req: &SeenRequest| (200, req.body.clone()))).await;
    let client = LabelaryClient::new(base, 5).unwrap();

    let pdf = client
        .render(b"^XA^FDhi^FS^XZ".to_vec(), geometry(8, 4.0, 6.0))
        .await
        .unwrap();

    assert_eq!(pdf, b"^XA^FDhi^FS^XZ");
    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].method, "POST");
    assert_eq!(seen[0].path, "/v1/printers/8dpmm/labels/4x6/");
    assert_eq!(seen[0].header("accept"), Some("application/pdf"));
    assert_eq!(seen[0].body, b"^XA^FDhi^FS^XZ");
}

#[tokio::test]
async fn fractional_dimensions_in_path() {
    let (base, seen) = spawn_stub(Arc::new(|_: &SeenRequest| (200, b"%PDF".to_vec()))).await;
    let client = LabelaryClient::new(format!("{base}/"), 5).unwrap();

    client
        .render(b"^XA^XZ".to_vec(), geometry(12, 2.5, 1.25))
        .await
        .unwrap();

    assert_eq!(
        seen.lock().unwrap()[0].path,
        "/v1/printers/12dpmm/labels/2.5x1.25/"
    );
}

#[tokio::test]
async fn non_200_status_is_render_failure_with_body() {
    let (base, _) = spawn_stub(Arc::new(|_: &SeenRequest| (400, b"ERROR: bad ^FO".to_vec()))).await;
    let client = LabelaryClient::new(base, 5).unwrap();

    let err = client
        .render(b"^XA^FO^XZ".to_vec(), geometry(8, 4.0, 6.0))
        .await
        .unwrap_err();

    match err {
        Zpl2PdfError::RenderFailed { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "ERROR: bad ^FO");
        }
        other => panic!("expected RenderFailed, got {other:?}"),
    }
}

#[tokio::test]
async fn non_ok_success_status_is_still_a_failure() {
    let (base, _) = spawn_stub(Arc::new(|_: &SeenRequest| (204, Vec::new()))).await;
    let client = LabelaryClient::new(base, 5).unwrap();

    let err = client
        .render(b"^XA^XZ".to_vec(), geometry(8, 4.0, 6.0))
        .await
        .unwrap_err();
    assert!(matches!(err, Zpl2PdfError::RenderFailed { status: 204, .. }));
}

#[tokio::test]
async fn silent_server_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        // Accept and hold the connection without ever answering.
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });

    let client = LabelaryClient::new(format!("http://{addr}"), 1).unwrap();
    let err = client
        .render(b"^XA^XZ".to_vec(), geometry(8, 4.0, 6.0))
        .await
        .unwrap_err();

    match err {
        Zpl2PdfError::Timeout { secs, .. } => assert_eq!(secs, 1),
        other => panic!("expected Timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn refused_connection_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = LabelaryClient::new(format!("http://{addr}"), 5).unwrap();
    let err = client
        .render(b"^XA^XZ".to_vec(), geometry(8, 4.0, 6.0))
        .await
        .unwrap_err();

    assert!(matches!(err, Zpl2PdfError::Transport { .. }), "got: {err}");
    assert!(err.is_service_error());
}

#[tokio::test]
async fn batched_document_over_http() {
    let (base, seen) = spawn_stub(Arc::new(|req: &SeenRequest| {
        let labels = String::from_utf8_lossy(&req.body).matches("^XA").count();
        let markers: Vec<String> = (0..labels).map(|i| format!("p{i}")).collect();
        (200, make_pdf(&markers))
    }))
    .await;

    let config = ConversionConfig::builder()
        .base_url(base)
        .timeout_secs(5)
        .build()
        .unwrap();
    let output = convert_bytes(&zpl_labels(75), &config).await.unwrap();

    assert_eq!(seen.lock().unwrap().len(), 2);
    let markers = page_markers(&output.pdf);
    assert_eq!(markers.len(), 75);
    assert_eq!(markers[49], "p49");
    assert_eq!(markers[50], "p0");
    assert_eq!(markers[74], "p24");
}
