/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
#![allow(dead_code)]

use flickr::rest::{Creds, Session};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

pub const OK_ECHO: &str = "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<rsp stat=\"ok\">\n<method>flickr.test.echo</method>\n<hello>world</hello>\n</rsp>\n";

pub const FAIL_NOT_FOUND: &str = "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<rsp stat=\"fail\">\n\t<err code=\"1\" msg=\"Not found\" />\n</rsp>\n";

/// A response the test server plays back
#[derive(Clone, Debug)]
pub struct Canned {
    pub status: u16,
    pub chunks: Vec<Vec<u8>>,
}

impl Canned {
    pub fn ok(body: &str) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status: u16, body: &str) -> Self {
        Self {
            status,
            chunks: vec![body.as_bytes().to_vec()],
        }
    }

    /// Sends the body in pieces of `size` bytes
    pub fn chunked(body: &str, size: usize) -> Self {
        Self {
            status: 200,
            chunks: body.as_bytes().chunks(size).map(|c| c.to_vec()).collect(),
        }
    }
}

/// A request as the test server received it
#[derive(Clone, Debug)]
pub struct Captured {
    pub method: String,
    pub target: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl Captured {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn body_text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }
}

/// HTTP responder on a local port answering each connection with the next canned
/// response; the last one is repeated once the list is used up.
pub struct TestServer {
    pub base: String,
    requests: Arc<Mutex<Vec<Captured>>>,
}

impl TestServer {
    pub async fn start(responses: Vec<Canned>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base = format!("http://{}", listener.local_addr()?);
        let requests = Arc::new(Mutex::new(Vec::new()));
        let seen = requests.clone();

        tokio::spawn(async move {
            let mut idx = 0;
            while let Ok((mut stream, _)) = listener.accept().await {
                let canned = responses[idx.min(responses.len() - 1)].clone();
                idx += 1;
                if let Ok(req) = read_request(&mut stream).await {
                    seen.lock().unwrap().push(req);
                }
                let _ = write_response(&mut stream, &canned).await;
            }
        });
        Ok(Self { base, requests })
    }

    pub fn rest_uri(&self) -> String {
        format!("{}/services/rest/", self.base)
    }

    pub fn upload_uri(&self) -> String {
        format!("{}/services/upload/", self.base)
    }

    pub fn requests(&self) -> Vec<Captured> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(stream: &mut TcpStream) -> anyhow::Result<Captured> {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    let head_end = loop {
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            anyhow::bail!("connection closed before request head");
        }
        data.extend_from_slice(&buf[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&data[..head_end]).into_owned();
    let mut lines = head.split("\r\n");
    let mut request_line = lines.next().unwrap_or_default().split(' ');
    let method = request_line.next().unwrap_or_default().to_string();
    let target = request_line.next().unwrap_or_default().to_string();
    let headers: Vec<(String, String)> = lines
        .filter_map(|l| l.split_once(':'))
        .map(|(n, v)| (n.trim().to_ascii_lowercase(), v.trim().to_string()))
        .collect();

    let content_length = headers
        .iter()
        .find(|(n, _)| n == "content-length")
        .and_then(|(_, v)| v.parse::<usize>().ok());
    let chunked = headers
        .iter()
        .any(|(n, v)| n == "transfer-encoding" && v.contains("chunked"));

    let mut body = data[head_end..].to_vec();
    loop {
        let done = match content_length {
            Some(len) => body.len() >= len,
            None if chunked => body.ends_with(b"0\r\n\r\n"),
            None => true,
        };
        if done {
            break;
        }
        let n = stream.read(&mut buf).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&buf[..n]);
    }

    Ok(Captured {
        method,
        target,
        headers,
        body,
    })
}

async fn write_response(stream: &mut TcpStream, canned: &Canned) -> anyhow::Result<()> {
    let len: usize = canned.chunks.iter().map(Vec::len).sum();
    let reason = if canned.status == 200 { "OK" } else { "Status" };
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: text/xml; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        canned.status, reason, len
    );
    stream.write_all(head.as_bytes()).await?;
    stream.flush().await?;
    for chunk in &canned.chunks {
        stream.write_all(chunk).await?;
        stream.flush().await?;
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    stream.shutdown().await?;
    Ok(())
}

/// Messages passed to a session's error handler
pub type Reported = Arc<Mutex<Vec<String>>>;

/// A session pointed at the test server, with no request delay
pub fn session_for(server: &TestServer, creds: Creds) -> (Session, Reported) {
    let _ = env_logger::builder().is_test(true).try_init();
    let reported: Reported = Arc::new(Mutex::new(Vec::new()));
    let sink = reported.clone();

    let mut session = Session::new(creds);
    session.set_service_uri(&server.rest_uri());
    session.set_request_delay(0);
    session.set_error_handler(move |msg| sink.lock().unwrap().push(msg.to_string()));
    (session, reported)
}

pub fn full_creds() -> Creds {
    Creds::from_tokens("KEY", Some("SECRET"), Some("TOKEN"))
}

pub fn read_only_creds() -> Creds {
    Creds::from_tokens("KEY", Some("SECRET"), None)
}
