use anyhow::{anyhow, Result};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::app_config::{Config, DEFAULT_AUDIO_EXTENSION};
use crate::file_utils::FileManager;
use crate::providers::edge::EdgeSpeech;
use crate::providers::SpeechProvider;
use crate::speech_service::{parse_batch_script, SpeechGenerator};

// @module: Application controller for speech generation

/// Name of the run log written next to batch outputs
const RUN_LOG_FILENAME: &str = "voxgen.log";

/// Main application controller for speech generation
pub struct Controller {
    // @field: App configuration
    config: Config,

    // @field: Speech generator built from the configuration
    generator: SpeechGenerator,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        let provider: Arc<dyn SpeechProvider> = Arc::new(EdgeSpeech::new());
        Self::with_provider(config, provider)
    }

    /// Create a controller over an explicit provider (test seam)
    pub fn with_provider(config: Config, provider: Arc<dyn SpeechProvider>) -> Result<Self> {
        config.validate()?;
        let generator = SpeechGenerator::new(provider, config.voice.clone())
            .with_subtitle_format(config.subtitle_format);
        Ok(Self { config, generator })
    }

    /// The generator backing this controller
    pub fn generator(&self) -> &SpeechGenerator {
        &self.generator
    }

    /// Synthesize a single piece of text.
    ///
    /// Without an explicit output path the audio lands in the configured
    /// output directory as `speech.{ext}`.
    pub async fn run_speak(
        &self,
        text: &str,
        output: Option<PathBuf>,
        with_subtitle: bool,
    ) -> Result<()> {
        let start_time = std::time::Instant::now();
        let output_path = output.unwrap_or_else(|| {
            Path::new(&self.config.output_dir).join(format!("speech.{}", DEFAULT_AUDIO_EXTENSION))
        });

        info!(
            "Synthesizing {} characters with voice {}",
            text.chars().count(),
            self.config.voice.voice
        );

        if with_subtitle {
            let (audio_path, subtitle_path) = self
                .generator
                .generate_with_subtitle(text, &output_path, None)
                .await?;
            info!("Audio written to {}", audio_path.display());
            info!("Subtitles written to {}", subtitle_path.display());
        } else {
            let audio_path = self.generator.generate(text, &output_path).await?;
            info!("Audio written to {}", audio_path.display());
        }

        info!("Done in {:.1?}", start_time.elapsed());
        Ok(())
    }

    /// Generate audio for every line of a batch script.
    ///
    /// The batch aborts on the first failing item; files generated before
    /// the failure are left in place and noted in the run log.
    pub async fn run_batch(
        &self,
        script_path: PathBuf,
        output_dir: Option<PathBuf>,
        prefix: &str,
    ) -> Result<()> {
        if !FileManager::file_exists(&script_path) {
            return Err(anyhow!("Batch script does not exist: {:?}", script_path));
        }

        let content = FileManager::read_to_string(&script_path)?;
        let items = parse_batch_script(&content);
        if items.is_empty() {
            return Err(anyhow!("Batch script contains no items: {:?}", script_path));
        }

        let output_dir = output_dir.unwrap_or_else(|| PathBuf::from(&self.config.output_dir));
        let start_time = std::time::Instant::now();

        // Progress bar for batch tracking
        let progress_bar = ProgressBar::new(items.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} items ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(template_result.progress_chars("█▓▒░"));
        progress_bar.set_message("Generating");

        info!(
            "Generating {} items with voice {} into {:?}",
            items.len(),
            self.config.voice.voice,
            output_dir
        );

        let pb = progress_bar.clone();
        let result = self
            .generator
            .generate_batch_with_progress(&items, &output_dir, prefix, move |current, _total| {
                pb.set_position(current as u64);
            })
            .await;

        match result {
            Ok(paths) => {
                progress_bar.finish_with_message("Done");
                let elapsed = start_time.elapsed();
                FileManager::append_to_log_file(
                    output_dir.join(RUN_LOG_FILENAME),
                    &format!(
                        "Batch {:?}: generated {} files (prefix '{}') in {:.1?}",
                        script_path,
                        paths.len(),
                        prefix,
                        elapsed
                    ),
                )?;
                info!("Generated {} files in {:.1?}", paths.len(), elapsed);
                Ok(())
            }
            Err(e) => {
                progress_bar.abandon_with_message("Failed");
                error!("Batch generation failed: {}", e);
                FileManager::append_to_log_file(
                    output_dir.join(RUN_LOG_FILENAME),
                    &format!("Batch {:?} failed: {}", script_path, e),
                )?;
                Err(e.into())
            }
        }
    }

    /// Print the voice catalog, optionally filtered by locale
    pub async fn run_voices(&self, locale_filter: Option<&str>) -> Result<()> {
        let voices = self.generator.list_voices(locale_filter).await?;

        if voices.is_empty() {
            info!("No voices match the filter");
            return Ok(());
        }

        info!("{} voices available", voices.len());
        for voice in &voices {
            println!("{:<40} {:<8} {}", voice.short_name, voice.locale, voice.gender);
        }

        Ok(())
    }
}
