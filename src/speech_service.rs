/*!
 * Speech generation service.
 *
 * Translates text into persisted audio artifacts (and optionally
 * synchronized subtitle documents) through a synthesis provider. The
 * generator is stateless apart from its immutable voice configuration, so
 * concurrent calls on one instance do not interfere.
 */

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

use crate::app_config::{SubtitleFormat, VoiceConfig, DEFAULT_AUDIO_EXTENSION};
use crate::errors::{ServiceError, SynthesisError};
use crate::file_utils::FileManager;
use crate::providers::{
    SpeechProvider, SynthesisChunk, SynthesisRequest, SynthesisStream, VoiceInfo,
};
use crate::subtitle_processor::{default_subtitle_path, SubtitleDocument};

/// One entry of a generation batch.
///
/// Items either carry an explicit sequence id or take their id from their
/// 1-based position in the batch; the distinction is resolved once at the
/// batch boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchItem {
    /// Bare text, numbered by position
    Plain(String),
    /// Text with an explicit sequence id, used verbatim in file names
    Identified {
        /// Text to vocalize
        text: String,
        /// Explicit sequence id
        id: usize,
    },
}

impl BatchItem {
    /// Create a positional item
    pub fn plain(text: impl Into<String>) -> Self {
        Self::Plain(text.into())
    }

    /// Create an item with an explicit sequence id
    pub fn identified(text: impl Into<String>, id: usize) -> Self {
        Self::Identified {
            text: text.into(),
            id,
        }
    }

    /// The item's text
    pub fn text(&self) -> &str {
        match self {
            Self::Plain(text) => text,
            Self::Identified { text, .. } => text,
        }
    }

    /// Resolve the item's sequence id; `position` is the 1-based batch position
    pub fn sequence_id(&self, position: usize) -> usize {
        match self {
            Self::Plain(_) => position,
            Self::Identified { id, .. } => *id,
        }
    }

    /// Parse one line of a batch script.
    ///
    /// Blank lines and `#` comments yield `None`. A line of the form
    /// `id<TAB>text` becomes an identified item when the id parses as an
    /// integer; anything else is a positional item.
    pub fn from_script_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        if let Some((id_part, text_part)) = trimmed.split_once('\t') {
            if let Ok(id) = id_part.trim().parse::<usize>() {
                let text = text_part.trim();
                if text.is_empty() {
                    return None;
                }
                return Some(Self::identified(text, id));
            }
        }

        Some(Self::plain(trimmed))
    }
}

/// Parse a whole batch script into items, preserving line order
pub fn parse_batch_script(content: &str) -> Vec<BatchItem> {
    content.lines().filter_map(BatchItem::from_script_line).collect()
}

// @struct: Speech generation service
pub struct SpeechGenerator {
    // @field: Provider implementation
    provider: Arc<dyn SpeechProvider>,

    // @field: Voice settings reused across calls
    voice_config: VoiceConfig,

    // @field: Subtitle document format
    subtitle_format: SubtitleFormat,

    // @field: Container extension for batch output naming
    audio_extension: String,
}

impl SpeechGenerator {
    /// Create a new generator over a provider with the given voice settings
    pub fn new(provider: Arc<dyn SpeechProvider>, voice_config: VoiceConfig) -> Self {
        Self {
            provider,
            voice_config,
            subtitle_format: SubtitleFormat::default(),
            audio_extension: DEFAULT_AUDIO_EXTENSION.to_string(),
        }
    }

    /// Set the subtitle document format
    pub fn with_subtitle_format(mut self, format: SubtitleFormat) -> Self {
        self.subtitle_format = format;
        self
    }

    /// Set the audio container extension used for batch file naming
    pub fn with_audio_extension(mut self, extension: impl Into<String>) -> Self {
        let extension = extension.into();
        self.audio_extension = extension.trim_start_matches('.').to_string();
        self
    }

    /// The generator's voice configuration
    pub fn voice_config(&self) -> &VoiceConfig {
        &self.voice_config
    }

    /// Synthesize `text` and persist the audio to `output_path`.
    ///
    /// Parent directories are created eagerly and idempotently. An existing
    /// file at `output_path` is overwritten. Returns the absolute form of
    /// the output path.
    pub async fn generate<P: AsRef<Path>>(
        &self,
        text: &str,
        output_path: P,
    ) -> Result<PathBuf, SynthesisError> {
        let output_path = output_path.as_ref();
        ensure_parent(output_path)?;

        let request = SynthesisRequest::new(text, self.voice_config.clone());
        let mut stream = self.provider.synthesize(&request).await?;

        let mut audio: Vec<u8> = Vec::new();
        while let Some(chunk) = stream.next_chunk().await? {
            if let SynthesisChunk::Audio(data) = chunk {
                audio.extend_from_slice(&data);
            }
        }

        if audio.is_empty() {
            return Err(ServiceError::EmptyAudio.into());
        }

        std::fs::write(output_path, &audio)?;
        let absolute = std::path::absolute(output_path)?;
        debug!("Wrote {} bytes of audio to {}", audio.len(), absolute.display());

        Ok(absolute)
    }

    /// Synthesize `text`, persisting audio and a synchronized subtitle
    /// document.
    ///
    /// Audio chunks are appended to the audio file in wire arrival order;
    /// word boundary events accumulate into the subtitle document. When
    /// `subtitle_path` is `None` it defaults to the audio path with its
    /// extension replaced by the subtitle format's extension.
    pub async fn generate_with_subtitle<P: AsRef<Path>>(
        &self,
        text: &str,
        audio_path: P,
        subtitle_path: Option<&Path>,
    ) -> Result<(PathBuf, PathBuf), SynthesisError> {
        let audio_path = audio_path.as_ref();
        let subtitle_path = match subtitle_path {
            Some(path) => path.to_path_buf(),
            None => default_subtitle_path(audio_path, self.subtitle_format),
        };

        ensure_parent(audio_path)?;
        ensure_parent(&subtitle_path)?;

        let request = SynthesisRequest::new(text, self.voice_config.clone());
        let mut stream = self.provider.synthesize(&request).await?;

        let mut document = SubtitleDocument::new();
        let mut audio_file: Option<File> = None;
        let mut audio_bytes: usize = 0;

        while let Some(chunk) = stream.next_chunk().await? {
            match chunk {
                SynthesisChunk::Audio(data) => {
                    // File is created on the first audio chunk so a stream
                    // with no audio leaves nothing behind
                    if audio_file.is_none() {
                        audio_file = Some(File::create(audio_path)?);
                    }
                    if let Some(file) = audio_file.as_mut() {
                        file.write_all(&data)?;
                        audio_bytes += data.len();
                    }
                }
                SynthesisChunk::WordBoundary {
                    text,
                    offset_ms,
                    duration_ms,
                } => {
                    document.push_boundary(text, offset_ms, duration_ms);
                }
            }
        }

        if audio_bytes == 0 {
            return Err(ServiceError::EmptyAudio.into());
        }

        document.write_to_file(&subtitle_path, self.subtitle_format)?;

        let absolute_audio = std::path::absolute(audio_path)?;
        let absolute_subtitle = std::path::absolute(&subtitle_path)?;
        debug!(
            "Wrote {} bytes of audio and {} cues to {} / {}",
            audio_bytes,
            document.len(),
            absolute_audio.display(),
            absolute_subtitle.display()
        );

        Ok((absolute_audio, absolute_subtitle))
    }

    /// Apply `generate` to each item in input order.
    ///
    /// Output files are named `{prefix}_{seq:03}.{ext}` where `seq` is the
    /// item's explicit id when present, otherwise its 1-based position.
    /// Fail fast: the first failure aborts the remaining batch; files
    /// written before the failure stay on disk.
    pub async fn generate_batch<P: AsRef<Path>>(
        &self,
        items: &[BatchItem],
        output_dir: P,
        prefix: &str,
    ) -> Result<Vec<PathBuf>, SynthesisError> {
        self.generate_batch_with_progress(items, output_dir, prefix, |_, _| {})
            .await
    }

    /// As `generate_batch`, reporting per-item completion through `progress`
    pub async fn generate_batch_with_progress<P: AsRef<Path>>(
        &self,
        items: &[BatchItem],
        output_dir: P,
        prefix: &str,
        progress: impl Fn(usize, usize),
    ) -> Result<Vec<PathBuf>, SynthesisError> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)?;

        let total = items.len();
        let mut paths = Vec::with_capacity(total);

        for (index, item) in items.iter().enumerate() {
            let sequence = item.sequence_id(index + 1);
            let output_path =
                FileManager::sequence_output_path(output_dir, prefix, sequence, &self.audio_extension);

            let path = self.generate(item.text(), &output_path).await?;
            info!(
                "Generated batch item {}/{} -> {}",
                index + 1,
                total,
                path.display()
            );
            progress(index + 1, total);
            paths.push(path);
        }

        Ok(paths)
    }

    /// Query the voice catalog, optionally filtered by locale.
    ///
    /// The filter is a case-insensitive substring match against each
    /// voice's locale identifier; `None` or an empty filter returns the
    /// full catalog.
    pub async fn list_voices(
        &self,
        locale_filter: Option<&str>,
    ) -> Result<Vec<VoiceInfo>, ServiceError> {
        let mut voices = self.provider.list_voices().await?;

        if let Some(filter) = locale_filter {
            let needle = filter.trim().to_lowercase();
            if !needle.is_empty() {
                voices.retain(|voice| voice.locale.to_lowercase().contains(&needle));
            }
        }

        Ok(voices)
    }
}

// Parent directories are created before any write begins
fn ensure_parent(path: &Path) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}
