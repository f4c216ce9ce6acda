use std::fmt;
use anyhow::{Result, anyhow};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use log::debug;

use crate::app_config::SubtitleFormat;
use crate::errors::{FormatError, SynthesisError};

// @module: Subtitle cue accumulation and serialization

// @struct: Single subtitle cue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleCue {
    // @field: Sequence number
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_time_ms: u64,

    // @field: End time in ms
    pub end_time_ms: u64,

    // @field: Spoken word or phrase
    pub text: String,
}

impl SubtitleCue {
    /// Creates a new subtitle cue - used by tests and external consumers
    #[allow(dead_code)]
    pub fn new(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Self {
        SubtitleCue {
            seq_num,
            start_time_ms,
            end_time_ms,
            text,
        }
    }

    // @creates: Validated subtitle cue
    // @validates: Time range and non-empty text
    pub fn new_validated(seq_num: usize, start_time_ms: u64, end_time_ms: u64, text: String) -> Result<Self> {
        // Validate time range
        if end_time_ms <= start_time_ms {
            return Err(anyhow!(
                "Invalid time range: end time {} <= start time {}",
                end_time_ms, start_time_ms
            ));
        }

        // Validate text is not empty (after trimming)
        let trimmed_text = text.trim();
        if trimmed_text.is_empty() {
            return Err(anyhow!("Empty cue text for entry {}", seq_num));
        }

        Ok(SubtitleCue {
            seq_num,
            start_time_ms,
            end_time_ms,
            text: trimmed_text.to_string(),
        })
    }

    /// Convert start time to formatted SRT timestamp
    pub fn format_start_time(&self) -> String {
        Self::format_timestamp(self.start_time_ms)
    }

    /// Convert end time to formatted SRT timestamp
    pub fn format_end_time(&self) -> String {
        Self::format_timestamp(self.end_time_ms)
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }

    /// Format a timestamp in milliseconds to WebVTT format (HH:MM:SS.mmm)
    pub fn format_timestamp_vtt(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SubtitleCue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", self.format_start_time(), self.format_end_time())?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Collection of subtitle cues accumulated from word boundary events.
///
/// Cue start times are kept monotonically non-decreasing: a boundary that
/// arrives with an earlier offset than the previous cue is clamped forward.
#[derive(Debug, Default)]
pub struct SubtitleDocument {
    /// Ordered list of cues
    entries: Vec<SubtitleCue>,
}

impl SubtitleDocument {
    /// Create an empty subtitle document
    pub fn new() -> Self {
        SubtitleDocument {
            entries: Vec::new(),
        }
    }

    /// Number of cues in the document
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the document contains no cues
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Cues accumulated so far
    pub fn entries(&self) -> &[SubtitleCue] {
        &self.entries
    }

    /// Append a cue from a word boundary event.
    ///
    /// Offsets and durations are in milliseconds. Start times are clamped
    /// so they never decrease; a zero duration still yields a renderable
    /// one-millisecond cue.
    pub fn push_boundary(&mut self, text: impl Into<String>, offset_ms: u64, duration_ms: u64) {
        let mut start = offset_ms;
        if let Some(last) = self.entries.last() {
            if start < last.start_time_ms {
                debug!(
                    "Clamping out-of-order cue offset {}ms to {}ms",
                    start, last.start_time_ms
                );
                start = last.start_time_ms;
            }
        }
        let end = start
            .saturating_add(duration_ms)
            .max(start.saturating_add(1));

        let seq_num = self.entries.len() + 1;
        self.entries.push(SubtitleCue {
            seq_num,
            start_time_ms: start,
            end_time_ms: end,
            text: text.into(),
        });
    }

    /// Append an already-built cue, keeping start times non-decreasing
    pub fn push_cue(&mut self, mut cue: SubtitleCue) {
        if let Some(last) = self.entries.last() {
            if cue.start_time_ms < last.start_time_ms {
                cue.start_time_ms = last.start_time_ms;
            }
        }
        cue.seq_num = self.entries.len() + 1;
        self.entries.push(cue);
    }

    /// Serialize the document to the requested format
    pub fn render(&self, format: SubtitleFormat) -> Result<String, FormatError> {
        if self.entries.is_empty() {
            return Err(FormatError::EmptyDocument);
        }

        for cue in &self.entries {
            if cue.end_time_ms <= cue.start_time_ms {
                return Err(FormatError::InvalidTimeRange {
                    seq_num: cue.seq_num,
                    start_ms: cue.start_time_ms,
                    end_ms: cue.end_time_ms,
                });
            }
        }

        let mut out = String::new();
        match format {
            SubtitleFormat::Srt => {
                for cue in &self.entries {
                    out.push_str(&cue.to_string());
                }
            }
            SubtitleFormat::Vtt => {
                out.push_str("WEBVTT\n\n");
                for cue in &self.entries {
                    out.push_str(&format!(
                        "{} --> {}\n{}\n\n",
                        SubtitleCue::format_timestamp_vtt(cue.start_time_ms),
                        SubtitleCue::format_timestamp_vtt(cue.end_time_ms),
                        cue.text
                    ));
                }
            }
        }
        Ok(out)
    }

    /// Write the document to a file, creating parent directories as needed
    pub fn write_to_file<P: AsRef<Path>>(
        &self,
        path: P,
        format: SubtitleFormat,
    ) -> Result<(), SynthesisError> {
        let path = path.as_ref();
        let content = self.render(format)?;

        // Create parent directory if needed
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let mut file = File::create(path)?;
        file.write_all(content.as_bytes())?;

        Ok(())
    }
}

/// Derive the default subtitle path from an audio path.
///
/// The extension is replaced with the subtitle format's extension; base
/// name and directory are unchanged.
pub fn default_subtitle_path<P: AsRef<Path>>(audio_path: P, format: SubtitleFormat) -> PathBuf {
    audio_path.as_ref().with_extension(format.extension())
}
