use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Voice settings applied to every synthesis call
    #[serde(default)]
    pub voice: VoiceConfig,

    /// Directory where generated audio and subtitle files are written
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Subtitle document format
    #[serde(default)]
    pub subtitle_format: SubtitleFormat,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            voice: VoiceConfig::default(),
            output_dir: default_output_dir(),
            subtitle_format: SubtitleFormat::default(),
            log_level: LogLevel::default(),
        }
    }
}

/// Named defaults for voice settings.
///
/// These are the values a generator falls back to when the config file or
/// command line does not override them.
pub const DEFAULT_VOICE: &str = "en-US-AriaNeural";
/// Default rate adjustment in percent
pub const DEFAULT_RATE_PERCENT: i32 = 0;
/// Default pitch offset in hertz
pub const DEFAULT_PITCH_HZ: i32 = 0;
/// Default volume adjustment in percent
pub const DEFAULT_VOLUME_PERCENT: i32 = 0;
/// Default container extension for generated audio
pub const DEFAULT_AUDIO_EXTENSION: &str = "mp3";

/// Voice configuration for speech synthesis.
///
/// Immutable once a generator is constructed; supplied at construction time
/// and reused across calls. Rate and volume are signed percentage
/// adjustments, pitch is a signed frequency offset in hertz.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct VoiceConfig {
    /// Synthesis voice identifier (e.g. "en-US-AriaNeural")
    #[serde(default = "default_voice")]
    pub voice: String,

    /// Speaking rate adjustment in percent
    #[serde(default = "default_rate_percent")]
    pub rate_percent: i32,

    /// Pitch offset in hertz
    #[serde(default = "default_pitch_hz")]
    pub pitch_hz: i32,

    /// Volume adjustment in percent
    #[serde(default = "default_volume_percent")]
    pub volume_percent: i32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            voice: default_voice(),
            rate_percent: default_rate_percent(),
            pitch_hz: default_pitch_hz(),
            volume_percent: default_volume_percent(),
        }
    }
}

impl VoiceConfig {
    /// Create a voice configuration with default rate, pitch and volume
    pub fn new(voice: impl Into<String>) -> Self {
        Self {
            voice: voice.into(),
            ..Default::default()
        }
    }

    /// Set the rate adjustment in percent
    pub fn rate(mut self, rate_percent: i32) -> Self {
        self.rate_percent = rate_percent;
        self
    }

    /// Set the pitch offset in hertz
    pub fn pitch(mut self, pitch_hz: i32) -> Self {
        self.pitch_hz = pitch_hz;
        self
    }

    /// Set the volume adjustment in percent
    pub fn volume(mut self, volume_percent: i32) -> Self {
        self.volume_percent = volume_percent;
        self
    }

    /// Rate as the signed percent string the service expects (e.g. "+10%")
    pub fn rate_string(&self) -> String {
        format!("{:+}%", self.rate_percent)
    }

    /// Pitch as the signed hertz string the service expects (e.g. "-5Hz")
    pub fn pitch_string(&self) -> String {
        format!("{:+}Hz", self.pitch_hz)
    }

    /// Volume as the signed percent string the service expects (e.g. "+0%")
    pub fn volume_string(&self) -> String {
        format!("{:+}%", self.volume_percent)
    }
}

/// Subtitle document format
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubtitleFormat {
    /// SubRip (.srt)
    #[default]
    Srt,
    /// WebVTT (.vtt)
    Vtt,
}

impl SubtitleFormat {
    /// File extension for this format, without the leading dot
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Srt => "srt",
            Self::Vtt => "vtt",
        }
    }
}

impl std::fmt::Display for SubtitleFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

impl std::str::FromStr for SubtitleFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "srt" => Ok(Self::Srt),
            "vtt" => Ok(Self::Vtt),
            _ => Err(anyhow!("Invalid subtitle format: {}", s)),
        }
    }
}

/// Log level configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level
    #[default]
    Info,
    /// Debug level
    Debug,
    /// Trace level
    Trace,
}

impl LogLevel {
    /// Convert to the log crate's level filter
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

// Default value functions for serde
fn default_voice() -> String {
    DEFAULT_VOICE.to_string()
}

fn default_rate_percent() -> i32 {
    DEFAULT_RATE_PERCENT
}

fn default_pitch_hz() -> i32 {
    DEFAULT_PITCH_HZ
}

fn default_volume_percent() -> i32 {
    DEFAULT_VOLUME_PERCENT
}

fn default_output_dir() -> String {
    "output".to_string()
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.voice.voice.trim().is_empty() {
            return Err(anyhow!("Voice identifier must not be empty"));
        }
        if self.output_dir.trim().is_empty() {
            return Err(anyhow!("Output directory must not be empty"));
        }
        Ok(())
    }
}
