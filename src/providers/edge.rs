use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{SinkExt, StreamExt};
use log::{debug, error};
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use url::Url;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::providers::{
    ticks_to_ms, SpeechProvider, SynthesisChunk, SynthesisRequest, SynthesisStream, VoiceInfo,
};

/// Client access token the Edge browser ships with
const TRUSTED_CLIENT_TOKEN: &str = "6A5AA1D4EAFF4E9FB37E23D68491D6F4";

/// Streaming synthesis endpoint
const SYNTHESIS_ENDPOINT: &str =
    "wss://speech.platform.bing.com/consumer/speech/synthesize/readaloud/edge/v1";

/// Voice catalog endpoint
const VOICE_LIST_ENDPOINT: &str =
    "https://speech.platform.bing.com/consumer/speech/synthesize/readaloud/voices/list";

/// Audio container requested from the service
const OUTPUT_FORMAT: &str = "audio-24khz-48kbitrate-mono-mp3";

/// Origin header the service expects on websocket handshakes
const EDGE_EXTENSION_ORIGIN: &str = "chrome-extension://jdiccldimpdaibmpdkjnbmckianbfold";

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/122.0.0.0 Safari/537.36 Edg/122.0.0.0";

/// Edge read-aloud client.
///
/// Each synthesis call opens its own websocket session; the client itself
/// only carries the HTTP client used for voice catalog queries.
#[derive(Debug)]
pub struct EdgeSpeech {
    /// HTTP client for the voice list endpoint
    client: Client,
}

impl EdgeSpeech {
    /// Create a new Edge speech client
    pub fn new() -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
        }
    }
}

impl Default for EdgeSpeech {
    fn default() -> Self {
        Self::new()
    }
}

/// Escape text for embedding in SSML
pub fn escape_xml(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Build the SSML body for a synthesis request
pub fn build_ssml(request: &SynthesisRequest) -> String {
    format!(
        "<speak version='1.0' xmlns='http://www.w3.org/2001/10/synthesis' xml:lang='en-US'>\
         <voice name='{}'><prosody pitch='{}' rate='{}' volume='{}'>{}</prosody></voice></speak>",
        request.voice_config.voice,
        request.voice_config.pitch_string(),
        request.voice_config.rate_string(),
        request.voice_config.volume_string(),
        escape_xml(&request.text)
    )
}

/// Split a binary frame into its header block and payload.
///
/// The first two bytes carry the header length big-endian; the payload is
/// whatever follows the headers. Returns `None` for frames too short to
/// hold their declared headers.
pub fn parse_binary_frame(data: &[u8]) -> Option<(String, &[u8])> {
    if data.len() < 2 {
        return None;
    }
    let header_len = u16::from_be_bytes([data[0], data[1]]) as usize;
    if data.len() < 2 + header_len {
        return None;
    }
    let headers = String::from_utf8_lossy(&data[2..2 + header_len]).to_string();
    Some((headers, &data[2 + header_len..]))
}

/// Split a text frame into its header block and body
pub fn split_text_frame(text: &str) -> (&str, &str) {
    match text.split_once("\r\n\r\n") {
        Some((headers, body)) => (headers, body),
        None => (text, ""),
    }
}

/// Look up a header value by name, case-insensitively
pub fn header_value<'a>(headers: &'a str, name: &str) -> Option<&'a str> {
    headers.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if key.trim().eq_ignore_ascii_case(name) {
            Some(value.trim())
        } else {
            None
        }
    })
}

// Timestamp format the service expects on outbound messages
fn service_timestamp() -> String {
    chrono::Utc::now()
        .format("%a %b %d %Y %H:%M:%S GMT+0000 (Coordinated Universal Time)")
        .to_string()
}

fn speech_config_message(timestamp: &str) -> String {
    let config = json!({
        "context": {
            "synthesis": {
                "audio": {
                    "metadataoptions": {
                        "sentenceBoundaryEnabled": "false",
                        "wordBoundaryEnabled": "true"
                    },
                    "outputFormat": OUTPUT_FORMAT
                }
            }
        }
    });
    format!(
        "X-Timestamp:{}\r\nContent-Type:application/json; charset=utf-8\r\nPath:speech.config\r\n\r\n{}",
        timestamp, config
    )
}

fn ssml_message(request_id: &str, timestamp: &str, ssml: &str) -> String {
    format!(
        "X-RequestId:{}\r\nContent-Type:application/ssml+xml\r\nX-Timestamp:{}Z\r\nPath:ssml\r\n\r\n{}",
        request_id, timestamp, ssml
    )
}

/// Word boundary metadata envelope
#[derive(Debug, Deserialize)]
struct MetadataEnvelope {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<MetadataEntry>,
}

#[derive(Debug, Deserialize)]
struct MetadataEntry {
    /// Marker type, e.g. "WordBoundary"
    #[serde(rename = "Type")]
    entry_type: String,
    #[serde(rename = "Data")]
    data: MetadataData,
}

#[derive(Debug, Deserialize)]
struct MetadataData {
    /// Offset from audio start in 100ns ticks
    #[serde(rename = "Offset", default)]
    offset: u64,
    /// Span duration in 100ns ticks
    #[serde(rename = "Duration", default)]
    duration: u64,
    #[serde(rename = "text")]
    text: Option<MetadataText>,
}

#[derive(Debug, Deserialize)]
struct MetadataText {
    #[serde(rename = "Text", default)]
    text: String,
}

/// Live synthesis session over the service websocket.
///
/// Frames arrive interleaved: binary audio frames, JSON metadata frames and
/// turn bookkeeping. The session ends at `turn.end` or when the socket
/// closes; the stream is not restartable.
pub struct EdgeSynthesisStream {
    ws: WebSocketStream<MaybeTlsStream<TcpStream>>,
    /// Boundaries decoded from a metadata frame but not yet pulled
    pending: VecDeque<SynthesisChunk>,
    finished: bool,
}

impl EdgeSynthesisStream {
    fn decode_metadata(&mut self, body: &str) -> Result<(), ServiceError> {
        let envelope: MetadataEnvelope = serde_json::from_str(body)
            .map_err(|e| ServiceError::ParseError(format!("Bad metadata frame: {}", e)))?;

        for entry in envelope.metadata {
            if entry.entry_type != "WordBoundary" {
                continue;
            }
            let text = entry.data.text.map(|t| t.text).unwrap_or_default();
            self.pending.push_back(SynthesisChunk::WordBoundary {
                text,
                offset_ms: ticks_to_ms(entry.data.offset),
                duration_ms: ticks_to_ms(entry.data.duration),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl SynthesisStream for EdgeSynthesisStream {
    async fn next_chunk(&mut self) -> Result<Option<SynthesisChunk>, ServiceError> {
        if let Some(chunk) = self.pending.pop_front() {
            return Ok(Some(chunk));
        }
        if self.finished {
            return Ok(None);
        }

        while let Some(frame) = self.ws.next().await {
            let message = frame.map_err(|e| ServiceError::ConnectionError(e.to_string()))?;

            match message {
                Message::Binary(data) => {
                    let (headers, payload) = parse_binary_frame(&data).ok_or_else(|| {
                        ServiceError::ParseError("Binary frame shorter than its header length".to_string())
                    })?;
                    if header_value(&headers, "Path") == Some("audio") && !payload.is_empty() {
                        return Ok(Some(SynthesisChunk::Audio(Bytes::copy_from_slice(payload))));
                    }
                }
                Message::Text(text) => {
                    let (headers, body) = split_text_frame(&text);
                    match header_value(headers, "Path") {
                        Some("audio.metadata") => {
                            self.decode_metadata(body)?;
                            if let Some(chunk) = self.pending.pop_front() {
                                return Ok(Some(chunk));
                            }
                        }
                        Some("turn.end") => {
                            self.finished = true;
                            let _ = self.ws.close(None).await;
                            return Ok(None);
                        }
                        // turn.start and response frames carry no chunk data
                        _ => {}
                    }
                }
                Message::Close(_) => {
                    self.finished = true;
                    return Ok(None);
                }
                _ => {}
            }
        }

        self.finished = true;
        Ok(None)
    }
}

#[async_trait]
impl SpeechProvider for EdgeSpeech {
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<Box<dyn SynthesisStream>, ServiceError> {
        let connection_id = Uuid::new_v4().simple().to_string();
        let url = Url::parse_with_params(
            SYNTHESIS_ENDPOINT,
            &[
                ("TrustedClientToken", TRUSTED_CLIENT_TOKEN),
                ("ConnectionId", connection_id.as_str()),
            ],
        )
        .map_err(|e| ServiceError::ConnectionError(e.to_string()))?;

        let mut ws_request = url
            .as_str()
            .into_client_request()
            .map_err(|e| ServiceError::ConnectionError(e.to_string()))?;
        {
            let headers = ws_request.headers_mut();
            headers.insert("Origin", HeaderValue::from_static(EDGE_EXTENSION_ORIGIN));
            headers.insert("User-Agent", HeaderValue::from_static(USER_AGENT));
            headers.insert("Accept-Language", HeaderValue::from_static("en-US,en;q=0.9"));
        }

        let (mut ws, _) = connect_async(ws_request)
            .await
            .map_err(|e| ServiceError::ConnectionError(e.to_string()))?;

        let timestamp = service_timestamp();
        ws.send(Message::Text(speech_config_message(&timestamp)))
            .await
            .map_err(|e| ServiceError::RequestFailed(e.to_string()))?;

        let request_id = Uuid::new_v4().simple().to_string();
        let ssml = build_ssml(request);
        debug!("Sending synthesis request {} for voice {}", request_id, request.voice_config.voice);
        ws.send(Message::Text(ssml_message(&request_id, &timestamp, &ssml)))
            .await
            .map_err(|e| ServiceError::RequestFailed(e.to_string()))?;

        Ok(Box::new(EdgeSynthesisStream {
            ws,
            pending: VecDeque::new(),
            finished: false,
        }))
    }

    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, ServiceError> {
        let url = Url::parse_with_params(
            VOICE_LIST_ENDPOINT,
            &[("trustedclienttoken", TRUSTED_CLIENT_TOKEN)],
        )
        .map_err(|e| ServiceError::ConnectionError(e.to_string()))?;

        let response = self
            .client
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| ServiceError::ConnectionError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            error!("Voice list request failed ({}): {}", status, error_text);
            return Err(ServiceError::ApiError {
                status_code: status.as_u16(),
                message: error_text,
            });
        }

        let voices = response
            .json::<Vec<VoiceInfo>>()
            .await
            .map_err(|e| ServiceError::ParseError(format!("Bad voice list response: {}", e)))?;

        Ok(voices)
    }
}
