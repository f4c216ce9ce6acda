/*!
 * Tests for the speech generation service
 */

use std::fs;
use std::sync::Arc;
use anyhow::Result;

use voxgen::app_config::{SubtitleFormat, VoiceConfig};
use voxgen::errors::{FormatError, ServiceError, SynthesisError};
use voxgen::providers::mock::MockProvider;
use voxgen::providers::SynthesisRequest;
use voxgen::speech_service::{parse_batch_script, BatchItem, SpeechGenerator};
use crate::common;

/// Test script line parsing for positional items
#[test]
fn test_batch_item_fromScriptLine_withPlainText_shouldBePlain() {
    let item = BatchItem::from_script_line("Hello there").unwrap();
    assert_eq!(item, BatchItem::plain("Hello there"));
}

/// Test script line parsing for identified items
#[test]
fn test_batch_item_fromScriptLine_withIdAndTab_shouldBeIdentified() {
    let item = BatchItem::from_script_line("5\tHello there").unwrap();
    assert_eq!(item, BatchItem::identified("Hello there", 5));
}

/// Test script line parsing skips comments and blanks
#[test]
fn test_batch_item_fromScriptLine_withCommentOrBlank_shouldSkip() {
    assert!(BatchItem::from_script_line("# a comment").is_none());
    assert!(BatchItem::from_script_line("   ").is_none());
    assert!(BatchItem::from_script_line("").is_none());
    assert!(BatchItem::from_script_line("9\t   ").is_none());
}

/// Test script line parsing treats a non-numeric id as plain text
#[test]
fn test_batch_item_fromScriptLine_withNonNumericId_shouldBePlain() {
    let item = BatchItem::from_script_line("abc\tHello").unwrap();
    assert_eq!(item, BatchItem::plain("abc\tHello"));
}

/// Test whole-script parsing preserves order
#[test]
fn test_parse_batch_script_withMixedLines_shouldPreserveOrder() {
    let script = "First\n# skip me\n3\tThird\n\nLast\n";
    let items = parse_batch_script(script);

    assert_eq!(items.len(), 3);
    assert_eq!(items[0], BatchItem::plain("First"));
    assert_eq!(items[1], BatchItem::identified("Third", 3));
    assert_eq!(items[2], BatchItem::plain("Last"));
}

/// Test sequence id resolution
#[test]
fn test_batch_item_sequenceId_shouldPreferExplicitId() {
    assert_eq!(BatchItem::plain("a").sequence_id(4), 4);
    assert_eq!(BatchItem::identified("a", 9).sequence_id(4), 9);
}

/// Test generation creates the output directory and a non-empty file
#[tokio::test]
async fn test_generate_withNestedOutputPath_shouldCreateDirAndFile() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_path = temp_dir.path().join("out").join("hello.mp3");
    let generator = common::working_generator();

    let returned = generator.generate("你好世界", &output_path).await?;

    assert!(temp_dir.path().join("out").is_dir());
    assert!(output_path.exists());
    assert!(returned.is_absolute());
    assert!(returned.ends_with("out/hello.mp3"));
    assert!(fs::metadata(&output_path)?.len() > 0);

    Ok(())
}

/// Test repeated generation overwrites rather than merges
#[tokio::test]
async fn test_generate_withSamePathTwice_shouldReflectSecondCall() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_path = temp_dir.path().join("again.mp3");
    let generator = common::working_generator();

    generator.generate("first text", &output_path).await?;
    generator.generate("second text", &output_path).await?;

    let expected = MockProvider::audio_payload(&SynthesisRequest::new(
        "second text",
        VoiceConfig::default(),
    ));
    let content = fs::read(&output_path)?;
    assert_eq!(content, expected);

    Ok(())
}

/// Test generation surfaces an empty-audio stream as a service error
#[tokio::test]
async fn test_generate_withEmptyAudioStream_shouldFailWithServiceError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let output_path = temp_dir.path().join("empty.mp3");
    let generator = common::generator_with(MockProvider::empty_audio());

    let result = generator.generate("text", &output_path).await;
    assert!(matches!(
        result,
        Err(SynthesisError::Service(ServiceError::EmptyAudio))
    ));
    assert!(!output_path.exists());

    Ok(())
}

/// Test generation surfaces provider failures
#[tokio::test]
async fn test_generate_withFailingProvider_shouldFailWithServiceError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let generator = common::generator_with(MockProvider::failing());

    let result = generator.generate("text", temp_dir.path().join("x.mp3")).await;
    assert!(matches!(result, Err(SynthesisError::Service(_))));

    Ok(())
}

/// Test subtitle generation derives the default path by extension swap
#[tokio::test]
async fn test_generate_with_subtitle_withDefaultPath_shouldSwapExtension() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let audio_path = temp_dir.path().join("hello.mp3");
    let generator = common::working_generator();

    let (audio, subtitle) = generator
        .generate_with_subtitle("Hello wonderful world", &audio_path, None)
        .await?;

    assert!(audio.ends_with("hello.mp3"));
    assert!(subtitle.ends_with("hello.srt"));
    assert!(audio.exists());
    assert!(subtitle.exists());

    let srt = fs::read_to_string(&subtitle)?;
    assert!(srt.contains("-->"));
    assert!(srt.contains("Hello"));
    assert!(srt.contains("wonderful"));

    Ok(())
}

/// Test subtitle generation honors an explicit subtitle path
#[tokio::test]
async fn test_generate_with_subtitle_withExplicitPath_shouldUseIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let audio_path = temp_dir.path().join("a.mp3");
    let subtitle_path = temp_dir.path().join("captions").join("a.srt");
    let generator = common::working_generator();

    let (_, subtitle) = generator
        .generate_with_subtitle("Hello world", &audio_path, Some(&subtitle_path))
        .await?;

    assert!(subtitle.ends_with("captions/a.srt"));
    assert!(subtitle_path.exists());

    Ok(())
}

/// Test subtitle generation uses the configured format
#[tokio::test]
async fn test_generate_with_subtitle_withVttFormat_shouldWriteVtt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let audio_path = temp_dir.path().join("v.mp3");
    let generator = common::working_generator().with_subtitle_format(SubtitleFormat::Vtt);

    let (_, subtitle) = generator
        .generate_with_subtitle("Hello world", &audio_path, None)
        .await?;

    assert!(subtitle.ends_with("v.vtt"));
    let content = fs::read_to_string(&subtitle)?;
    assert!(content.starts_with("WEBVTT"));

    Ok(())
}

/// Test subtitle generation fails when the stream has no word boundaries
#[tokio::test]
async fn test_generate_with_subtitle_withNoBoundaries_shouldFailWithFormatError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let audio_path = temp_dir.path().join("n.mp3");
    let generator = common::generator_with(MockProvider::no_boundaries());

    let result = generator
        .generate_with_subtitle("Hello world", &audio_path, None)
        .await;

    assert!(matches!(
        result,
        Err(SynthesisError::Format(FormatError::EmptyDocument))
    ));

    Ok(())
}

/// Test batch generation names positional items by 1-based position
#[tokio::test]
async fn test_generate_batch_withPositionalItems_shouldNumberInOrder() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let generator = common::working_generator();
    let items = vec![
        BatchItem::plain("A"),
        BatchItem::plain("B"),
        BatchItem::plain("C"),
    ];

    let paths = generator
        .generate_batch(&items, temp_dir.path().join("dir"), "line")
        .await?;

    assert_eq!(paths.len(), 3);
    assert!(paths[0].ends_with("dir/line_001.mp3"));
    assert!(paths[1].ends_with("dir/line_002.mp3"));
    assert!(paths[2].ends_with("dir/line_003.mp3"));
    for path in &paths {
        assert!(path.exists());
    }

    Ok(())
}

/// Test batch generation uses explicit ids verbatim
#[tokio::test]
async fn test_generate_batch_withExplicitIds_shouldUseIdsVerbatim() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let generator = common::working_generator();
    let items = vec![
        BatchItem::identified("A", 1),
        BatchItem::identified("B", 5),
    ];

    let paths = generator
        .generate_batch(&items, temp_dir.path().join("dir"), "line")
        .await?;

    assert!(paths[0].ends_with("dir/line_001.mp3"));
    assert!(paths[1].ends_with("dir/line_005.mp3"));
    assert!(!temp_dir.path().join("dir").join("line_002.mp3").exists());

    Ok(())
}

/// Test batch generation mixes positional and explicit ids
#[tokio::test]
async fn test_generate_batch_withMixedItems_shouldResolvePerItem() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let generator = common::working_generator();
    let items = vec![
        BatchItem::plain("first"),
        BatchItem::identified("seventh", 7),
    ];

    let paths = generator
        .generate_batch(&items, temp_dir.path(), "cue")
        .await?;

    assert!(paths[0].ends_with("cue_001.mp3"));
    assert!(paths[1].ends_with("cue_007.mp3"));

    Ok(())
}

/// Test batch generation aborts on the first failure, keeping earlier files
#[tokio::test]
async fn test_generate_batch_withMidBatchFailure_shouldFailFast() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let provider = Arc::new(MockProvider::fail_after(1));
    let generator = SpeechGenerator::new(provider.clone(), VoiceConfig::default());
    let items = vec![
        BatchItem::plain("one"),
        BatchItem::plain("two"),
        BatchItem::plain("three"),
    ];

    let result = generator
        .generate_batch(&items, temp_dir.path(), "line")
        .await;

    assert!(result.is_err());
    assert!(temp_dir.path().join("line_001.mp3").exists());
    assert!(!temp_dir.path().join("line_002.mp3").exists());
    assert!(!temp_dir.path().join("line_003.mp3").exists());
    // The third item was never attempted
    assert_eq!(provider.request_count(), 2);

    Ok(())
}

/// Test batch generation respects a custom audio extension
#[tokio::test]
async fn test_generate_batch_withCustomExtension_shouldNameWithIt() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let generator = common::working_generator().with_audio_extension("wav");
    let items = vec![BatchItem::plain("only")];

    let paths = generator
        .generate_batch(&items, temp_dir.path(), "clip")
        .await?;

    assert!(paths[0].ends_with("clip_001.wav"));

    Ok(())
}

/// Test voice listing with a locale filter
#[tokio::test]
async fn test_list_voices_withLocaleFilter_shouldMatchSubstringCaseInsensitively() -> Result<()> {
    let generator = common::working_generator();

    let zh = generator.list_voices(Some("zh")).await?;
    assert_eq!(zh.len(), 2);
    assert!(zh.iter().all(|v| v.locale.starts_with("zh")));

    let upper = generator.list_voices(Some("ZH")).await?;
    assert_eq!(upper.len(), 2);

    let en_us = generator.list_voices(Some("en-us")).await?;
    assert_eq!(en_us.len(), 1);

    Ok(())
}

/// Test voice listing without a filter returns the full catalog
#[tokio::test]
async fn test_list_voices_withNoFilter_shouldReturnFullCatalog() -> Result<()> {
    let generator = common::working_generator();

    let all = generator.list_voices(None).await?;
    assert_eq!(all.len(), 5);

    let empty_filter = generator.list_voices(Some("")).await?;
    assert_eq!(empty_filter.len(), 5);

    Ok(())
}
