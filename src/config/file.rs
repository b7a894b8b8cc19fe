//! TOML configuration file loading
//!
//! Supports `~/.config/omni/wakeloop/config.toml` as a persistent config
//! source. All fields are optional — the file is a partial overlay on top of
//! defaults.

use std::path::PathBuf;

use serde::Deserialize;

/// Top-level TOML configuration file schema
#[derive(Debug, Default, Deserialize)]
pub struct WakeloopConfigFile {
    /// Session timing and wake phrase configuration
    #[serde(default)]
    pub session: SessionFileConfig,

    /// Microphone capture preferences
    #[serde(default)]
    pub mic: MicFileConfig,
}

/// Session-related configuration
#[derive(Debug, Default, Deserialize)]
pub struct SessionFileConfig {
    /// Wake phrase (e.g. "hey buddy")
    pub wake_phrase: Option<String>,

    /// Command window length after a bare wake phrase, in milliseconds
    pub command_timeout_ms: Option<u64>,

    /// Reply window length before reverting to wake word mode, in milliseconds
    pub reply_window_timeout_ms: Option<u64>,

    /// Debounce after a silence signal in reply mode, in milliseconds
    pub reply_silence_debounce_ms: Option<u64>,

    /// Debounce after new final text in reply mode, in milliseconds
    pub reply_final_debounce_ms: Option<u64>,

    /// Echo suppression grace window at reply window start, in milliseconds
    pub echo_suppress_window_ms: Option<u64>,
}

/// Microphone capture preferences
#[derive(Debug, Default, Deserialize)]
pub struct MicFileConfig {
    pub echo_cancellation: Option<bool>,
    pub noise_suppression: Option<bool>,
    pub auto_gain_control: Option<bool>,
    pub sample_rate: Option<u32>,
}

/// Candidate config file locations, highest priority first
fn config_file_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();

    if let Ok(path) = std::env::var("WAKELOOP_CONFIG") {
        paths.push(PathBuf::from(path));
    }

    if let Some(dirs) = directories::BaseDirs::new() {
        paths.push(
            dirs.config_dir()
                .join("omni")
                .join("wakeloop")
                .join("config.toml"),
        );
    }

    paths
}

/// Load the config file, returning defaults when absent or unparseable
#[must_use]
pub fn load_config_file() -> WakeloopConfigFile {
    for path in config_file_paths() {
        if !path.exists() {
            continue;
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!(path = %path.display(), "loaded config file");
                    return config;
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "failed to parse config file, using defaults"
                    );
                }
            },
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to read config file"
                );
            }
        }
    }

    WakeloopConfigFile::default()
}
