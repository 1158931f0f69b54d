/// CLI configuration
use crate::error::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use wavpipe_audio::PipelineOptions;
use wavpipe_core::{DecodeRequest, OutputFormat, DEFAULT_CHUNK_FRAMES, UNLIMITED_SAMPLES};

/// Configuration file read from the working directory when `--config` is absent
pub const DEFAULT_CONFIG_FILE: &str = "wavpipe.toml";

/// Largest accepted `decode.chunk_frames`
pub const MAX_CHUNK_FRAMES: usize = 65_536;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct CliConfig {
    #[serde(default = "default_decode")]
    pub decode: DecodeSettings,

    #[serde(default = "default_log")]
    pub log: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DecodeSettings {
    #[serde(default = "default_bits_per_sample")]
    pub bits_per_sample: u32,

    #[serde(default = "default_chunk_frames")]
    pub chunk_frames: usize,

    #[serde(default = "default_max_samples")]
    pub max_samples: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LogSettings {
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl CliConfig {
    /// Load configuration from file and environment
    ///
    /// An explicit `path` must exist; the default `wavpipe.toml` is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, None)
    }

    /// Load with an explicit environment map instead of the process environment
    pub fn load_with_env(path: Option<&Path>, env: Option<HashMap<String, String>>) -> Result<Self> {
        let mut settings = config::Config::builder();

        match path {
            Some(path) => {
                settings = settings.add_source(config::File::from(path.to_path_buf()));
            }
            None => {
                let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    settings = settings.add_source(config::File::from(default_path));
                }
            }
        }

        // Override with environment variables (WAVPIPE_DECODE__BITS_PER_SAMPLE=24)
        settings = settings.add_source(
            config::Environment::with_prefix("WAVPIPE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(env),
        );

        let config = settings.build()?;
        Ok(config.try_deserialize()?)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.decode.validate()
    }
}

impl DecodeSettings {
    /// Apply command-line overrides
    pub fn with_overrides(
        mut self,
        max_samples: Option<i64>,
        bits_per_sample: Option<u32>,
        chunk_frames: Option<usize>,
    ) -> Self {
        if let Some(max_samples) = max_samples {
            self.max_samples = max_samples;
        }
        if let Some(bits) = bits_per_sample {
            self.bits_per_sample = bits;
        }
        if let Some(frames) = chunk_frames {
            self.chunk_frames = frames;
        }
        self
    }

    /// Reject settings the pipeline would refuse, before any file is touched
    pub fn validate(&self) -> Result<()> {
        if OutputFormat::from_forced_bits(self.bits_per_sample).is_none() {
            return Err(CliError::InvalidSetting {
                key: "decode.bits_per_sample",
                reason: format!("{} is not one of 8, 16, 24, 32", self.bits_per_sample),
            });
        }

        if !(1..=MAX_CHUNK_FRAMES).contains(&self.chunk_frames) {
            return Err(CliError::InvalidSetting {
                key: "decode.chunk_frames",
                reason: format!("{} is outside 1..={}", self.chunk_frames, MAX_CHUNK_FRAMES),
            });
        }

        if self.max_samples < UNLIMITED_SAMPLES {
            return Err(CliError::InvalidSetting {
                key: "decode.max_samples",
                reason: format!("{} is below -1", self.max_samples),
            });
        }

        Ok(())
    }

    /// Build the conversion request for one file pair
    pub fn request(&self, input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> DecodeRequest {
        DecodeRequest::new(input, output)
            .with_max_samples(self.max_samples)
            .with_bits_per_sample(self.bits_per_sample)
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            chunk_frames: self.chunk_frames,
        }
    }
}

// Default values
fn default_decode() -> DecodeSettings {
    DecodeSettings {
        bits_per_sample: default_bits_per_sample(),
        chunk_frames: default_chunk_frames(),
        max_samples: default_max_samples(),
    }
}

fn default_bits_per_sample() -> u32 {
    16
}

fn default_chunk_frames() -> usize {
    DEFAULT_CHUNK_FRAMES
}

fn default_max_samples() -> i64 {
    UNLIMITED_SAMPLES
}

fn default_log() -> LogSettings {
    LogSettings {
        filter: default_log_filter(),
    }
}

fn default_log_filter() -> String {
    "wavpipe=info,wavpipe_cli=info,wavpipe_audio=info".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            decode: default_decode(),
            log: default_log(),
        }
    }
}
