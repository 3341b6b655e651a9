//! Configuration loading and management
//!
//! Defaults come from `$HOME`, then an optional `config.toml` in the data
//! directory, then a few environment overrides.

use std::path::{Path, PathBuf};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tunables for one stabilization engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Number of recent accepted labels kept for the majority vote
    pub window_capacity: usize,

    /// Consecutive matching cycles before a gesture may edit text
    pub stability_threshold: u32,

    /// Hand-area growth needed to commit the same symbol twice in a row
    pub repeat_factor: f64,

    /// Minimum top-class probability
    pub confidence_threshold: f64,

    /// Maximum distance to the nearest reference row
    pub distance_threshold: f64,

    /// Neighbours consulted by the k-NN model
    pub neighbors: usize,
}

impl EngineConfig {
    pub const DEFAULT_WINDOW_CAPACITY: usize = 8;
    pub const DEFAULT_STABILITY_THRESHOLD: u32 = 6;
    pub const DEFAULT_REPEAT_FACTOR: f64 = 1.30;
    pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.45;
    pub const DEFAULT_DISTANCE_THRESHOLD: f64 = 2.0;
    pub const DEFAULT_NEIGHBORS: usize = 5;

    /// Reject settings the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        ensure!(self.window_capacity > 0, "window_capacity must be at least 1");
        ensure!(self.stability_threshold > 0, "stability_threshold must be at least 1");
        ensure!(
            self.repeat_factor.is_finite() && self.repeat_factor > 0.0,
            "repeat_factor must be a positive number"
        );
        ensure!(
            self.confidence_threshold.is_finite(),
            "confidence_threshold must be a number"
        );
        ensure!(
            self.distance_threshold.is_finite() && self.distance_threshold >= 0.0,
            "distance_threshold must be a non-negative number"
        );
        ensure!(self.neighbors > 0, "neighbors must be at least 1");
        Ok(())
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            window_capacity: Self::DEFAULT_WINDOW_CAPACITY,
            stability_threshold: Self::DEFAULT_STABILITY_THRESHOLD,
            repeat_factor: Self::DEFAULT_REPEAT_FACTOR,
            confidence_threshold: Self::DEFAULT_CONFIDENCE_THRESHOLD,
            distance_threshold: Self::DEFAULT_DISTANCE_THRESHOLD,
            neighbors: Self::DEFAULT_NEIGHBORS,
        }
    }
}

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// Labelled feature corpus backing the classifier
    pub model_path: PathBuf,

    /// Newline-delimited observation stream (`-` for stdin); None disables the frame loop
    pub frame_source: Option<PathBuf>,

    /// Engine tunables
    pub engine: EngineConfig,
}

/// Shape of `config.toml`; every key is optional
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    socket_path: Option<PathBuf>,
    model_path: Option<PathBuf>,
    frame_source: Option<PathBuf>,
    engine: Option<EngineConfig>,
}

impl Config {
    /// Load configuration from defaults, config file and environment
    pub fn load() -> Result<Self> {
        let home = std::env::var("HOME").context("HOME is not set")?;
        let data_dir = PathBuf::from(&home)
            .join(".local")
            .join("share")
            .join("gesture-text");

        let mut config = Self::with_data_dir(data_dir);
        let file = config.data_dir.join("config.toml");
        config.apply_file(&file)?;
        config.apply_env();
        config.engine.validate()?;

        Ok(config)
    }

    /// Defaults rooted at the given data directory
    pub fn with_data_dir(data_dir: PathBuf) -> Self {
        Self {
            socket_path: data_dir.join("daemon.sock"),
            model_path: data_dir.join("model.json"),
            frame_source: None,
            engine: EngineConfig::default(),
            data_dir,
        }
    }

    /// Overlay values from a TOML file, if it exists
    pub fn apply_file(&mut self, path: &Path) -> Result<()> {
        if !path.exists() {
            debug!(?path, "no config file, using defaults");
            return Ok(());
        }

        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let file: FileConfig = toml::from_str(&text)
            .with_context(|| format!("failed to parse {}", path.display()))?;

        if let Some(p) = file.socket_path {
            self.socket_path = p;
        }
        if let Some(p) = file.model_path {
            self.model_path = p;
        }
        if file.frame_source.is_some() {
            self.frame_source = file.frame_source;
        }
        if let Some(engine) = file.engine {
            self.engine = engine;
        }

        debug!(?path, "config file applied");
        Ok(())
    }

    fn apply_env(&mut self) {
        if let Ok(p) = std::env::var("GESTURE_TEXT_SOCKET") {
            self.socket_path = PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("GESTURE_TEXT_MODEL") {
            self.model_path = PathBuf::from(p);
        }
        if let Ok(p) = std::env::var("GESTURE_TEXT_FRAMES") {
            self.frame_source = Some(PathBuf::from(p));
        }
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        Ok(())
    }
}
