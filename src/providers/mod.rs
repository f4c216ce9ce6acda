/*!
 * Provider implementations for speech synthesis services.
 *
 * This module contains client implementations for synthesis backends:
 * - Edge: Microsoft Edge online read-aloud service
 * - Mock: scripted in-process provider for tests
 */

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use std::fmt::Debug;

use crate::app_config::VoiceConfig;
use crate::errors::ServiceError;

/// One synthesis request, built per call and discarded afterwards
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    /// UTF-8 text to vocalize
    pub text: String,
    /// Voice settings for this request
    pub voice_config: VoiceConfig,
}

impl SynthesisRequest {
    /// Create a new synthesis request
    pub fn new(text: impl Into<String>, voice_config: VoiceConfig) -> Self {
        Self {
            text: text.into(),
            voice_config,
        }
    }
}

/// Typed chunk pulled from a synthesis stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisChunk {
    /// Opaque audio payload, to be appended in arrival order
    Audio(Bytes),
    /// Timing marker for a spoken word or phrase
    WordBoundary {
        /// The word or phrase the marker covers
        text: String,
        /// Offset from the start of the audio in milliseconds
        offset_ms: u64,
        /// Duration of the span in milliseconds
        duration_ms: u64,
    },
}

/// Descriptor of a remote synthesis voice
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct VoiceInfo {
    /// Full service voice name
    #[serde(rename = "Name")]
    pub name: String,

    /// Short voice identifier used in requests (e.g. "en-US-AriaNeural")
    #[serde(rename = "ShortName")]
    pub short_name: String,

    /// Voice gender as reported by the service
    #[serde(rename = "Gender")]
    pub gender: String,

    /// Locale identifier (e.g. "en-US", "zh-CN")
    #[serde(rename = "Locale")]
    pub locale: String,

    /// Human readable display name
    #[serde(rename = "FriendlyName", default)]
    pub friendly_name: String,

    /// Service lifecycle status (e.g. "GA")
    #[serde(rename = "Status", default)]
    pub status: String,
}

/// Lazy, finite, non-restartable sequence of synthesis chunks.
///
/// The consumer drains the stream with `next_chunk` until it returns
/// `Ok(None)`; a stream cannot be rewound or reused.
#[async_trait]
pub trait SynthesisStream: Send {
    /// Pull the next chunk, or `None` when the stream has ended
    async fn next_chunk(&mut self) -> Result<Option<SynthesisChunk>, ServiceError>;
}

/// Common trait for all synthesis providers
///
/// This trait defines the interface that all provider implementations must
/// follow, allowing them to be used interchangeably by the speech generator.
#[async_trait]
pub trait SpeechProvider: Send + Sync + Debug {
    /// Start a synthesis call and return its chunk stream
    ///
    /// # Arguments
    /// * `request` - The request to synthesize
    ///
    /// # Returns
    /// * `Result<Box<dyn SynthesisStream>, ServiceError>` - The chunk stream or an error
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<Box<dyn SynthesisStream>, ServiceError>;

    /// Query the full voice catalog from the service
    ///
    /// # Returns
    /// * `Result<Vec<VoiceInfo>, ServiceError>` - All available voices or an error
    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, ServiceError>;
}

/// Convert the service's 100-nanosecond ticks to milliseconds
pub fn ticks_to_ms(ticks: u64) -> u64 {
    ticks / 10_000
}

pub mod edge;
pub mod mock;
