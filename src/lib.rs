/*!
 * # voxgen - Streaming Text-to-Speech Generation
 *
 * A Rust library and CLI for turning text into persisted speech audio using
 * the Microsoft Edge online read-aloud service.
 *
 * ## Features
 *
 * - Synthesize text to compressed audio with configurable voice, rate,
 *   pitch and volume
 * - Capture word boundary timing into synchronized SRT or WebVTT subtitles
 * - Batch generation with deterministic, sequence-numbered file naming
 * - Query and filter the remote voice catalog
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `speech_service`: Speech generation service and batch handling
 * - `subtitle_processor`: Subtitle cue accumulation and serialization
 * - `file_utils`: File system operations
 * - `app_controller`: Main application controller
 * - `providers`: Client implementations for synthesis backends:
 *   - `providers::edge`: Microsoft Edge read-aloud client
 *   - `providers::mock`: Scripted provider for tests
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod file_utils;
pub mod subtitle_processor;
pub mod speech_service;
pub mod app_controller;
pub mod providers;
pub mod errors;

// Re-export main types for easier usage
pub use app_config::{Config, SubtitleFormat, VoiceConfig};
pub use speech_service::{BatchItem, SpeechGenerator};
pub use subtitle_processor::{SubtitleCue, SubtitleDocument};
pub use providers::{SpeechProvider, SynthesisChunk, SynthesisRequest, VoiceInfo};
pub use errors::{AppError, FormatError, ServiceError, SynthesisError};
