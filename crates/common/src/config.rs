//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{ZoomiesError, ZoomiesResult};

/// Global application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Highlight detection parameters.
    pub detection: DetectionConfig,

    /// Default render settings.
    pub render: RenderDefaults,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Parameters consumed by the detection stages of the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Landmarks to include in the speed calculation.
    /// `None` uses every landmark present in the pose track.
    pub bodyparts: Option<Vec<String>>,

    /// Padding added before and after each flagged frame (seconds).
    pub buffer_duration_secs: f64,

    /// Sensitivity `k` in `threshold = mean + k * std`.
    pub std_multiplier: f64,

    /// Smoothing window `W` in samples.
    pub window_size: usize,

    /// How positions before the first full window are smoothed.
    pub warmup: WarmupPolicy,

    /// How overlapping padded intervals are merged.
    pub merge_policy: MergePolicy,
}

/// Smoothing policy for the first `W - 1` positions of the speed series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarmupPolicy {
    /// Incomplete windows average whatever samples are available.
    #[default]
    PartialWindow,
    /// Incomplete windows smooth to 0.0.
    ZeroFill,
}

/// Interval merge semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// Merge into the first overlapping interval found, in production order.
    /// Intervals connected only through a later union are left apart.
    #[default]
    FirstMatch,
    /// Sort by start and sweep, merging transitively.
    Transitive,
}

/// Default render parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderDefaults {
    /// Directory used when the caller gives a bare output file name.
    pub output_dir: PathBuf,

    /// Video codec for extracted segments.
    pub video_codec: String,

    /// Constant rate factor for the video codec.
    pub crf: u8,

    /// Encoder preset.
    pub preset: String,

    /// Whether to carry the source audio track into the highlight reel.
    pub keep_audio: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "zoomies=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            bodyparts: None,
            buffer_duration_secs: 0.2,
            std_multiplier: 2.0,
            window_size: 5,
            warmup: WarmupPolicy::default(),
            merge_policy: MergePolicy::default(),
        }
    }
}

impl DetectionConfig {
    /// Check parameter ranges before a run starts.
    pub fn validate(&self) -> ZoomiesResult<()> {
        if self.window_size == 0 {
            return Err(ZoomiesError::config("window_size must be at least 1"));
        }
        if !self.std_multiplier.is_finite() || self.std_multiplier < 0.0 {
            return Err(ZoomiesError::config(format!(
                "std_multiplier must be a non-negative number, got {}",
                self.std_multiplier
            )));
        }
        if !self.buffer_duration_secs.is_finite() || self.buffer_duration_secs < 0.0 {
            return Err(ZoomiesError::config(format!(
                "buffer_duration_secs must be a non-negative number, got {}",
                self.buffer_duration_secs
            )));
        }
        if let Some(parts) = &self.bodyparts {
            if parts.is_empty() {
                return Err(ZoomiesError::config(
                    "bodyparts must name at least one landmark when set",
                ));
            }
        }
        Ok(())
    }
}

impl Default for RenderDefaults {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("output"),
            video_codec: "libx264".to_string(),
            crf: 18,
            preset: "medium".to_string(),
            keep_audio: true,
        }
    }
}

impl RenderDefaults {
    /// Resolve an output path: bare file names land in `output_dir`.
    pub fn resolve_output(&self, requested: &Path) -> PathBuf {
        let has_dir = requested
            .parent()
            .map(|p| !p.as_os_str().is_empty())
            .unwrap_or(false);
        if requested.is_absolute() || has_dir {
            requested.to_path_buf()
        } else {
            self.output_dir.join(requested)
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> ZoomiesResult<PathBuf> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> ZoomiesResult<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, json)?;
        Ok(())
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("zoomies").join("config.json")
}
