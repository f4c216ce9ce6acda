// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, Context};
use log::{warn, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::path::{Path, PathBuf};
use std::io::Write;
use std::fs::File;
use std::io::BufReader;
use clap::{Parser, ValueEnum, CommandFactory, Subcommand};
use clap_complete::{generate, Shell};

use crate::app_config::Config;
use app_controller::Controller;

mod app_config;
mod app_controller;
mod errors;
mod file_utils;
mod providers;
mod speech_service;
mod subtitle_processor;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for SubtitleFormat to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSubtitleFormat {
    Srt,
    Vtt,
}

impl From<CliSubtitleFormat> for app_config::SubtitleFormat {
    fn from(cli_format: CliSubtitleFormat) -> Self {
        match cli_format {
            CliSubtitleFormat::Srt => app_config::SubtitleFormat::Srt,
            CliSubtitleFormat::Vtt => app_config::SubtitleFormat::Vtt,
        }
    }
}

/// Voice settings shared by the speak and batch commands
#[derive(Parser, Debug)]
struct VoiceArgs {
    /// Synthesis voice (e.g. 'en-US-AriaNeural')
    #[arg(short, long)]
    voice: Option<String>,

    /// Speaking rate adjustment in percent (e.g. 10 or -20)
    #[arg(short, long, allow_hyphen_values = true)]
    rate: Option<i32>,

    /// Pitch offset in hertz (e.g. 5 or -10)
    #[arg(short, long, allow_hyphen_values = true)]
    pitch: Option<i32>,

    /// Volume adjustment in percent
    #[arg(long, allow_hyphen_values = true)]
    volume: Option<i32>,
}

#[derive(Parser, Debug)]
struct SpeakArgs {
    /// Text to synthesize
    #[arg(value_name = "TEXT")]
    text: String,

    /// Output audio file path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write a synchronized subtitle file next to the audio
    #[arg(short, long)]
    subtitle: bool,

    /// Subtitle document format
    #[arg(long, value_enum)]
    subtitle_format: Option<CliSubtitleFormat>,

    #[command(flatten)]
    voice_args: VoiceArgs,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
struct BatchArgs {
    /// Batch script file: one item per line, optionally 'id<TAB>text'
    #[arg(value_name = "SCRIPT")]
    script: PathBuf,

    /// Output directory for generated audio files
    #[arg(short = 'd', long)]
    output_dir: Option<PathBuf>,

    /// File name prefix for generated items
    #[arg(long, default_value = "line")]
    prefix: String,

    #[command(flatten)]
    voice_args: VoiceArgs,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Parser, Debug)]
struct VoicesArgs {
    /// Locale filter, case-insensitive substring (e.g. 'zh', 'en-US')
    #[arg(value_name = "LOCALE")]
    locale: Option<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Synthesize a single piece of text to an audio file
    #[command(alias = "say")]
    Speak(SpeakArgs),

    /// Generate audio for every line of a script file
    Batch(BatchArgs),

    /// List available synthesis voices
    Voices(VoicesArgs),

    /// Generate shell completions for voxgen
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// voxgen - Streaming Text-to-Speech Generation
///
/// Turns text into speech audio (and optionally synchronized subtitles)
/// using the Microsoft Edge online read-aloud service.
#[derive(Parser, Debug)]
#[command(name = "voxgen")]
#[command(version = "1.0.0")]
#[command(about = "Text-to-speech generation tool")]
#[command(long_about = "voxgen synthesizes speech audio from text using the Microsoft Edge online voices.

EXAMPLES:
    voxgen speak \"Hello world\"                       # Synthesize with default voice
    voxgen speak -o out/hello.mp3 \"Hello world\"      # Choose the output path
    voxgen speak -s \"Hello world\"                    # Also write hello.srt subtitles
    voxgen speak -v zh-CN-XiaoxiaoNeural \"你好世界\"  # Use a specific voice
    voxgen speak -r 20 -p -5 \"Faster and lower\"      # Adjust rate and pitch
    voxgen batch lines.txt -d audio --prefix line     # One file per script line
    voxgen voices zh                                  # List Chinese voices
    voxgen completions bash > voxgen.bash             # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default
    one will be created automatically.

BATCH SCRIPTS:
    Each non-empty line becomes one audio file. Lines starting with '#' are
    skipped. A line of the form 'id<TAB>text' uses the id verbatim in the
    output file name; other lines are numbered by position.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color code for log level
    fn color_for_level(level: Level) -> &'static str {
        match level {
            Level::Error => "\x1B[1;31m",
            Level::Warn => "\x1B[1;33m",
            Level::Info => "\x1B[1;32m",
            Level::Debug => "\x1B[1;36m",
            Level::Trace => "\x1B[1;35m",
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let color = Self::color_for_level(record.level());

            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {}\x1B[0m", color, now, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger once with info level by default
    // We'll update the level after loading the config if needed
    CustomLogger::init(LevelFilter::Info)?;

    // Parse command line arguments using clap
    let cli = CommandLineOptions::parse();

    match cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "voxgen", &mut std::io::stdout());
            Ok(())
        }
        Commands::Speak(args) => run_speak(args).await,
        Commands::Batch(args) => run_batch(args).await,
        Commands::Voices(args) => run_voices(args).await,
    }
}

async fn run_speak(options: SpeakArgs) -> Result<()> {
    let mut config = load_config(&options.config_path, options.log_level.as_ref())?;
    apply_voice_overrides(&mut config, &options.voice_args);
    if let Some(format) = &options.subtitle_format {
        config.subtitle_format = format.clone().into();
    }

    let controller = Controller::with_config(config)?;
    controller
        .run_speak(&options.text, options.output, options.subtitle)
        .await
}

async fn run_batch(options: BatchArgs) -> Result<()> {
    let mut config = load_config(&options.config_path, options.log_level.as_ref())?;
    apply_voice_overrides(&mut config, &options.voice_args);

    let controller = Controller::with_config(config)?;
    controller
        .run_batch(options.script, options.output_dir, &options.prefix)
        .await
}

async fn run_voices(options: VoicesArgs) -> Result<()> {
    let config = load_config(&options.config_path, options.log_level.as_ref())?;

    let controller = Controller::with_config(config)?;
    controller.run_voices(options.locale.as_deref()).await
}

fn apply_voice_overrides(config: &mut Config, overrides: &VoiceArgs) {
    if let Some(voice) = &overrides.voice {
        config.voice.voice = voice.clone();
    }
    if let Some(rate) = overrides.rate {
        config.voice.rate_percent = rate;
    }
    if let Some(pitch) = overrides.pitch {
        config.voice.pitch_hz = pitch;
    }
    if let Some(volume) = overrides.volume {
        config.voice.volume_percent = volume;
    }
}

/// Load the configuration, creating a default file when none exists
fn load_config(config_path: &str, log_level: Option<&CliLogLevel>) -> Result<Config> {
    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = log_level {
        let config_log_level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(config_log_level.to_level_filter());
    }

    let config = if Path::new(config_path).exists() {
        // Load existing configuration
        let file = File::open(config_path)
            .context(format!("Failed to open config file: {}", config_path))?;

        let reader = BufReader::new(file);
        let mut config: Config = serde_json::from_reader(reader)
            .context(format!("Failed to parse config file: {}", config_path))?;

        // Update log level in config if specified via command line
        if let Some(cmd_log_level) = log_level {
            config.log_level = cmd_log_level.clone().into();
        }

        config
    } else {
        // Create default configuration if not exists
        warn!("Config file not found at '{}', creating default config.", config_path);

        let mut config = Config::default();

        // Apply command line log level to default config if specified
        if let Some(cmd_log_level) = log_level {
            config.log_level = cmd_log_level.clone().into();
        }

        // Save default config
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;

        std::fs::write(config_path, config_json)
            .context(format!("Failed to write default config to file: {}", config_path))?;

        config
    };

    // Apply the configured log level when the command line did not set one
    if log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    Ok(config)
}
