/*!
 * Mock provider implementations for testing.
 *
 * This module provides mock providers that simulate different behaviors:
 * - `MockProvider::working()` - Always succeeds with audio and word boundaries
 * - `MockProvider::failing()` - Always fails with an error
 * - `MockProvider::empty_audio()` - Streams complete without audio data
 * - `MockProvider::no_boundaries()` - Audio only, no word boundary events
 * - `MockProvider::fail_after(n)` - First n requests succeed, the rest fail
 */

use async_trait::async_trait;
use bytes::Bytes;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ServiceError;
use crate::providers::{
    SpeechProvider, SynthesisChunk, SynthesisRequest, SynthesisStream, VoiceInfo,
};

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Always succeeds with audio chunks and word boundaries
    Working,
    /// Always fails with an error
    Failing,
    /// Stream completes without any audio chunks
    EmptyAudio,
    /// Audio chunks only, no word boundary events
    NoBoundaries,
    /// First `succeed` requests work, later ones fail
    FailAfter {
        /// Number of requests that succeed before failures start
        succeed: usize,
    },
}

/// Mock provider for testing generator behavior without the network
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Request counter for fail-after behavior
    request_count: Arc<AtomicUsize>,
    /// Canned voice catalog returned by list_voices
    voices: Vec<VoiceInfo>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            request_count: Arc::new(AtomicUsize::new(0)),
            voices: default_catalog(),
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock whose streams carry no audio data
    pub fn empty_audio() -> Self {
        Self::new(MockBehavior::EmptyAudio)
    }

    /// Create a mock whose streams carry audio but no word boundaries
    pub fn no_boundaries() -> Self {
        Self::new(MockBehavior::NoBoundaries)
    }

    /// Create a mock that fails every request after the first `succeed`
    pub fn fail_after(succeed: usize) -> Self {
        Self::new(MockBehavior::FailAfter { succeed })
    }

    /// Replace the canned voice catalog
    pub fn with_voices(mut self, voices: Vec<VoiceInfo>) -> Self {
        self.voices = voices;
        self
    }

    /// Number of synthesis requests seen so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Deterministic audio payload for a request, so tests can assert
    /// which call produced a given file
    pub fn audio_payload(request: &SynthesisRequest) -> Vec<u8> {
        format!("MOCKAUDIO:{}:{}", request.voice_config.voice, request.text).into_bytes()
    }

    fn build_chunks(&self, request: &SynthesisRequest) -> VecDeque<SynthesisChunk> {
        let mut chunks = VecDeque::new();

        if self.behavior != MockBehavior::EmptyAudio {
            // Split the payload so consumers see more than one audio chunk
            let payload = Self::audio_payload(request);
            let mid = payload.len() / 2;
            chunks.push_back(SynthesisChunk::Audio(Bytes::copy_from_slice(&payload[..mid])));
            chunks.push_back(SynthesisChunk::Audio(Bytes::copy_from_slice(&payload[mid..])));
        }

        if self.behavior != MockBehavior::NoBoundaries {
            for (i, word) in request.text.split_whitespace().enumerate() {
                chunks.push_back(SynthesisChunk::WordBoundary {
                    text: word.to_string(),
                    offset_ms: (i as u64) * 500,
                    duration_ms: 400,
                });
            }
        }

        chunks
    }
}

/// Scripted chunk stream backing the mock provider
pub struct MockStream {
    chunks: VecDeque<SynthesisChunk>,
}

impl MockStream {
    /// Create a stream from a fixed chunk sequence
    pub fn new(chunks: VecDeque<SynthesisChunk>) -> Self {
        Self { chunks }
    }
}

#[async_trait]
impl SynthesisStream for MockStream {
    async fn next_chunk(&mut self) -> Result<Option<SynthesisChunk>, ServiceError> {
        Ok(self.chunks.pop_front())
    }
}

#[async_trait]
impl SpeechProvider for MockProvider {
    async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<Box<dyn SynthesisStream>, ServiceError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst) + 1;

        match self.behavior {
            MockBehavior::Failing => {
                return Err(ServiceError::RequestFailed(
                    "Mock provider configured to fail".to_string(),
                ));
            }
            MockBehavior::FailAfter { succeed } if count > succeed => {
                return Err(ServiceError::RequestFailed(format!(
                    "Mock provider failing request {}",
                    count
                )));
            }
            _ => {}
        }

        Ok(Box::new(MockStream::new(self.build_chunks(request))))
    }

    async fn list_voices(&self) -> Result<Vec<VoiceInfo>, ServiceError> {
        Ok(self.voices.clone())
    }
}

/// Small catalog covering the locales tests filter on
fn default_catalog() -> Vec<VoiceInfo> {
    fn voice(short_name: &str, gender: &str, locale: &str) -> VoiceInfo {
        VoiceInfo {
            name: format!(
                "Microsoft Server Speech Text to Speech Voice ({}, {})",
                locale,
                short_name.rsplit('-').next().unwrap_or(short_name)
            ),
            short_name: short_name.to_string(),
            gender: gender.to_string(),
            locale: locale.to_string(),
            friendly_name: short_name.to_string(),
            status: "GA".to_string(),
        }
    }

    vec![
        voice("en-US-AriaNeural", "Female", "en-US"),
        voice("en-GB-SoniaNeural", "Female", "en-GB"),
        voice("zh-CN-XiaoxiaoNeural", "Female", "zh-CN"),
        voice("zh-CN-YunxiNeural", "Male", "zh-CN"),
        voice("fr-FR-DeniseNeural", "Female", "fr-FR"),
    ]
}
