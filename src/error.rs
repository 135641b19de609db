//! Error types for the workout core and its collaborators.

use std::path::PathBuf;

use thiserror::Error;

use crate::workout::ConfigField;

/// A config value outside the range a workout can start with.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{field} {value} is outside {min}..={max}")]
pub struct ConfigViolation {
    pub field: ConfigField,
    pub value: u32,
    pub min: u32,
    pub max: u32,
}

/// Why `start()` refused to run. State is untouched in every case.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("invalid settings: {}", join_violations(.0))]
    ValidationFailed(Vec<ConfigViolation>),

    #[error("audio is not ready yet")]
    AudioNotReady,

    #[error("could not resume audio output")]
    AudioResumeFailed(#[source] AudioError),
}

fn join_violations(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AudioError {
    #[error("no audio output device")]
    NoOutputDevice,

    #[error("click sounds are not loaded")]
    AssetsUnavailable,

    #[error("audio output refused to resume")]
    ResumeRejected,

    #[error("playback failed: {0}")]
    Playback(String),
}

/// Errors while reading or writing the settings file.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("no configuration directory available")]
    ConfigDirUnavailable,

    #[error("failed to access settings file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("settings file is corrupt")]
    Parse(#[source] serde_json::Error),

    #[error("failed to encode settings")]
    Serialize(#[source] serde_json::Error),
}
