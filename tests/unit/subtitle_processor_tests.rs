/*!
 * Tests for subtitle document handling
 */

use std::fmt::Write;
use anyhow::Result;
use voxgen::app_config::SubtitleFormat;
use voxgen::errors::FormatError;
use voxgen::subtitle_processor::{default_subtitle_path, SubtitleCue, SubtitleDocument};
use crate::common;

/// Test SRT timestamp formatting
#[test]
fn test_format_timestamp_withMixedComponents_shouldFormatSrt() {
    assert_eq!(SubtitleCue::format_timestamp(0), "00:00:00,000");
    assert_eq!(SubtitleCue::format_timestamp(5025678), "01:23:45,678");
    assert_eq!(SubtitleCue::format_timestamp(61234), "00:01:01,234");
}

/// Test WebVTT timestamp formatting uses a dot separator
#[test]
fn test_format_timestamp_vtt_withMixedComponents_shouldUseDot() {
    assert_eq!(SubtitleCue::format_timestamp_vtt(5025678), "01:23:45.678");
    assert_eq!(SubtitleCue::format_timestamp_vtt(0), "00:00:00.000");
}

/// Test subtitle cue display formatting
#[test]
fn test_subtitle_cue_display_withValidCue_shouldFormatSrtBlock() {
    let cue = SubtitleCue::new(1, 5000, 10000, "Test subtitle".to_string());
    let mut output = String::new();
    write!(output, "{}", cue).unwrap();

    assert!(output.contains("1"));
    assert!(output.contains("00:00:05,000 --> 00:00:10,000"));
    assert!(output.contains("Test subtitle"));
}

/// Test validated cue construction rejects bad input
#[test]
fn test_cue_new_validated_withInvalidInput_shouldFail() {
    assert!(SubtitleCue::new_validated(1, 5000, 5000, "text".to_string()).is_err());
    assert!(SubtitleCue::new_validated(1, 5000, 4000, "text".to_string()).is_err());
    assert!(SubtitleCue::new_validated(1, 0, 1000, "   ".to_string()).is_err());
    assert!(SubtitleCue::new_validated(1, 0, 1000, "ok".to_string()).is_ok());
}

/// Test that boundaries accumulate with sequential numbering
#[test]
fn test_push_boundary_withSequentialEvents_shouldNumberCues() {
    let mut document = SubtitleDocument::new();
    document.push_boundary("Hello", 0, 400);
    document.push_boundary("world", 500, 400);

    assert_eq!(document.len(), 2);
    let entries = document.entries();
    assert_eq!(entries[0].seq_num, 1);
    assert_eq!(entries[1].seq_num, 2);
    assert_eq!(entries[0].start_time_ms, 0);
    assert_eq!(entries[0].end_time_ms, 400);
    assert_eq!(entries[1].text, "world");
}

/// Test that an out-of-order boundary is clamped forward
#[test]
fn test_push_boundary_withEarlierOffset_shouldClampStartTime() {
    let mut document = SubtitleDocument::new();
    document.push_boundary("first", 1000, 300);
    document.push_boundary("second", 500, 300);

    let entries = document.entries();
    assert_eq!(entries[1].start_time_ms, 1000);
    assert!(entries[1].start_time_ms >= entries[0].start_time_ms);
}

/// Test that a zero-duration boundary still yields a renderable cue
#[test]
fn test_push_boundary_withZeroDuration_shouldYieldPositiveSpan() {
    let mut document = SubtitleDocument::new();
    document.push_boundary("blip", 2000, 0);

    let entries = document.entries();
    assert_eq!(entries[0].start_time_ms, 2000);
    assert_eq!(entries[0].end_time_ms, 2001);
    assert!(document.render(SubtitleFormat::Srt).is_ok());
}

/// Test SRT rendering of a document
#[test]
fn test_render_withCues_shouldProduceSrt() {
    let mut document = SubtitleDocument::new();
    document.push_boundary("Hello", 0, 400);
    document.push_boundary("world", 500, 400);

    let srt = document.render(SubtitleFormat::Srt).unwrap();
    assert!(srt.starts_with("1\n"));
    assert!(srt.contains("00:00:00,000 --> 00:00:00,400"));
    assert!(srt.contains("00:00:00,500 --> 00:00:00,900"));
    assert!(srt.contains("Hello"));
    assert!(srt.contains("world"));
}

/// Test WebVTT rendering of a document
#[test]
fn test_render_withCues_shouldProduceVtt() {
    let mut document = SubtitleDocument::new();
    document.push_boundary("Hello", 0, 400);

    let vtt = document.render(SubtitleFormat::Vtt).unwrap();
    assert!(vtt.starts_with("WEBVTT"));
    assert!(vtt.contains("00:00:00.000 --> 00:00:00.400"));
    assert!(vtt.contains("Hello"));
}

/// Test that rendering an empty document fails
#[test]
fn test_render_withEmptyDocument_shouldFail() {
    let document = SubtitleDocument::new();
    let result = document.render(SubtitleFormat::Srt);
    assert!(matches!(result, Err(FormatError::EmptyDocument)));
}

/// Test that rendering a document with an invalid cue fails
#[test]
fn test_render_withInvalidCueRange_shouldFail() {
    let mut document = SubtitleDocument::new();
    document.push_cue(SubtitleCue::new(1, 5000, 4000, "broken".to_string()));

    let result = document.render(SubtitleFormat::Srt);
    assert!(matches!(result, Err(FormatError::InvalidTimeRange { .. })));
}

/// Test writing a document creates parent directories
#[test]
fn test_write_to_file_withNestedPath_shouldCreateFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("subs").join("out.srt");

    let mut document = SubtitleDocument::new();
    document.push_boundary("Hello", 0, 400);
    document.write_to_file(&path, SubtitleFormat::Srt)?;

    assert!(path.exists());
    let content = std::fs::read_to_string(&path)?;
    assert!(content.contains("-->"));

    Ok(())
}

/// Test default subtitle path derivation
#[test]
fn test_default_subtitle_path_withAudioPath_shouldSwapExtensionOnly() {
    let path = default_subtitle_path("out/hello.mp3", SubtitleFormat::Srt);
    assert_eq!(path, std::path::Path::new("out/hello.srt"));

    let path = default_subtitle_path("out/hello.mp3", SubtitleFormat::Vtt);
    assert_eq!(path, std::path::Path::new("out/hello.vtt"));

    let path = default_subtitle_path("hello", SubtitleFormat::Srt);
    assert_eq!(path, std::path::Path::new("hello.srt"));
}
