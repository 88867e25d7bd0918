#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use chat_gateway::session::{InMemorySessionStore, SessionStore, Turn};
use chat_gateway::upstream::sse::sse_lines;
use chat_gateway::upstream::{ChatProvider, LineStream, UpstreamError, UpstreamRequest};
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// SSE record carrying one content fragment
pub fn delta_record(content: &str) -> String {
    format!(
        "data: {}\n\n",
        serde_json::json!({"choices": [{"delta": {"content": content}}]})
    )
}

/// SSE record carrying the completion sentinel
pub const DONE_RECORD: &str = "data: [DONE]\n\n";

/// How a scripted streamed reply ends
#[derive(Debug, Clone)]
pub enum StreamEnd {
    /// The byte stream simply ends
    Close,
    /// The transport fails with this message
    Error(String),
    /// No more data ever arrives
    Hang,
}

/// Provider that replays a fixed script and records every request
pub struct ScriptedProvider {
    buffered_reply: Result<String, fn() -> UpstreamError>,
    chunks: Vec<Vec<u8>>,
    end: StreamEnd,
    stream_call_error: Option<fn() -> UpstreamError>,
    pub requests: Mutex<Vec<UpstreamRequest>>,
}

impl ScriptedProvider {
    /// Streamed reply delivered in exactly these chunks
    pub fn streaming<I, C>(chunks: I, end: StreamEnd) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        Self {
            buffered_reply: Err(no_buffered_reply as fn() -> UpstreamError),
            chunks: chunks.into_iter().map(|c| c.as_ref().to_vec()).collect(),
            end,
            stream_call_error: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Streamed call that fails before any data arrives
    pub fn failing_stream_call(error: fn() -> UpstreamError) -> Self {
        let mut provider = Self::streaming(Vec::<Vec<u8>>::new(), StreamEnd::Close);
        provider.stream_call_error = Some(error);
        provider
    }

    /// Buffered reply with this text
    pub fn buffered(reply: &str) -> Self {
        let mut provider = Self::streaming(Vec::<Vec<u8>>::new(), StreamEnd::Close);
        provider.buffered_reply = Ok(reply.to_string());
        provider
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

fn no_buffered_reply() -> UpstreamError {
    UpstreamError::Unreachable("no buffered reply scripted".to_string())
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    async fn send_buffered(&self, request: UpstreamRequest) -> Result<String, UpstreamError> {
        self.requests.lock().unwrap().push(request);
        match &self.buffered_reply {
            Ok(reply) => Ok(reply.clone()),
            Err(make_error) => Err(make_error()),
        }
    }

    async fn send_streamed(&self, request: UpstreamRequest) -> Result<LineStream, UpstreamError> {
        self.requests.lock().unwrap().push(request);
        if let Some(make_error) = self.stream_call_error {
            return Err(make_error());
        }

        let chunks: Vec<Result<Bytes, String>> = self
            .chunks
            .iter()
            .map(|c| Ok(Bytes::from(c.clone())))
            .collect();
        let body = stream::iter(chunks);

        let byte_stream = match self.end.clone() {
            StreamEnd::Close => body.boxed(),
            StreamEnd::Error(message) => body.chain(stream::iter(vec![Err(message)])).boxed(),
            StreamEnd::Hang => body.chain(stream::pending()).boxed(),
        };

        Ok(sse_lines(byte_stream))
    }
}

/// Session store that counts writes
#[derive(Default)]
pub struct CountingStore {
    inner: InMemorySessionStore,
    writes: AtomicUsize,
}

impl CountingStore {
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SessionStore for CountingStore {
    async fn history(&self, session_id: &str) -> Vec<Turn> {
        self.inner.history(session_id).await
    }

    async fn append_and_save(&self, session_id: &str, history: Vec<Turn>) {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.append_and_save(session_id, history).await;
    }
}

/// Canned HTTP response served by [`FakeUpstream`]
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status_line: &'static str,
    pub content_type: &'static str,
    pub chunks: Vec<Vec<u8>>,
    /// Advertise a longer body than is sent, so the client sees a truncated stream
    pub truncate: bool,
}

impl CannedResponse {
    pub fn ok(content_type: &'static str, chunks: Vec<Vec<u8>>) -> Self {
        Self {
            status_line: "HTTP/1.1 200 OK",
            content_type,
            chunks,
            truncate: false,
        }
    }

    pub fn json(body: &str) -> Self {
        Self::ok("application/json", vec![body.as_bytes().to_vec()])
    }

    pub fn event_stream<I, C>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: AsRef<[u8]>,
    {
        Self::ok(
            "text/event-stream",
            chunks.into_iter().map(|c| c.as_ref().to_vec()).collect(),
        )
    }
}

/// Minimal HTTP/1.1 server standing in for the provider
///
/// Writes each body chunk separately with a short pause in between, so the
/// client really receives the reply in those pieces.
pub struct FakeUpstream {
    pub url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeUpstream {
    pub async fn start(response: CannedResponse) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let requests = Arc::new(Mutex::new(Vec::new()));

        let recorded = requests.clone();
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let request = read_request(&mut socket).await.unwrap_or_default();
                recorded.lock().unwrap().push(request);
                let _ = write_response(&mut socket, &response).await;
            }
        });

        Self {
            url: format!("http://{}/v1/chat/completions", addr),
            requests,
        }
    }

    /// Raw text of every request received so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn read_request(socket: &mut TcpStream) -> std::io::Result<String> {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 4096];

    loop {
        let n = socket.read(&mut tmp).await?;
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&tmp[..n]);

        if let Some(head_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let head = String::from_utf8_lossy(&buf[..head_end]).to_string();
            let content_length = head
                .lines()
                .filter_map(|line| line.split_once(':'))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
                .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= head_end + 4 + content_length {
                break;
            }
        }
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

async fn write_response(socket: &mut TcpStream, response: &CannedResponse) -> std::io::Result<()> {
    let body_len: usize = response.chunks.iter().map(Vec::len).sum();
    let mut head = format!(
        "{}\r\nContent-Type: {}\r\nConnection: close\r\n",
        response.status_line, response.content_type
    );
    if response.truncate {
        head.push_str(&format!("Content-Length: {}\r\n", body_len + 1024));
    }
    head.push_str("\r\n");

    socket.write_all(head.as_bytes()).await?;
    socket.flush().await?;

    for chunk in &response.chunks {
        tokio::time::sleep(Duration::from_millis(20)).await;
        socket.write_all(chunk).await?;
        socket.flush().await?;
    }

    socket.shutdown().await
}
