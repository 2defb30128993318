// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;

/// Serves one canned HTTP response and returns the request head it saw
fn serve_once(response: &'static str) -> (String, std::thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let handle = std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut head = String::new();
        let mut content_length = 0usize;
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            if line == "\r\n" || line.is_empty() {
                break;
            }
            if let Some(len) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                content_length = len.trim().parse().unwrap();
            }
            head.push_str(&line);
        }
        let mut body = vec![0u8; content_length];
        reader.read_exact(&mut body).unwrap();
        stream.write_all(response.as_bytes()).unwrap();
        head
    });
    (url, handle)
}

#[tokio::test]
async fn get_returns_status_headers_and_body() {
    let (url, server) = serve_once(
        "HTTP/1.1 200 OK\r\nContent-Length: 5\r\nETag: \"v1\"\r\nConnection: close\r\n\r\nhello",
    );
    let service = UreqNetworkService::default();

    let response = service
        .connect(NetworkRequest::get(format!("{url}/config.json")).header("If-None-Match", "\"v0\""))
        .await
        .unwrap();

    assert_eq!(response.status, 200);
    assert_eq!(response.body_text(), "hello");
    assert_eq!(response.header("etag"), Some("\"v1\""));

    let head = server.join().unwrap();
    assert!(head.starts_with("GET /config.json"));
    assert!(head.to_ascii_lowercase().contains("if-none-match: \"v0\""));
}

#[tokio::test]
async fn error_status_is_a_response() {
    let (url, server) =
        serve_once("HTTP/1.1 503 Service Unavailable\r\nContent-Length: 0\r\nConnection: close\r\n\r\n");
    let response = UreqNetworkService::default()
        .connect(NetworkRequest::post(url, "payload"))
        .await
        .unwrap();
    assert_eq!(response.status, 503);
    assert!(!response.is_success());
    server.join().unwrap();
}

#[tokio::test]
async fn bad_url_is_invalid_url() {
    let err = UreqNetworkService::default()
        .connect(NetworkRequest::get("notascheme://nowhere"))
        .await
        .unwrap_err();
    assert!(matches!(err, NetworkError::InvalidUrl(_)));
}

#[tokio::test]
async fn refused_connection_is_connection_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let err = UreqNetworkService::default()
        .connect(NetworkRequest::get(format!("http://127.0.0.1:{port}/")))
        .await
        .unwrap_err();
    assert!(matches!(err, NetworkError::Connection(_)));
}
