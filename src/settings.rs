//! Settings persistence.
//!
//! The record is a flat JSON object with five numbers. Each entry is read
//! on its own, so one corrupt value only costs that value its setting.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::error::PersistenceError;
use crate::utilities::schedule::Debouncer;
use crate::workout::{PhaseSpec, WorkoutConfig};

pub const APP_DIR: &str = "walk-metronome";
pub const SETTINGS_FILE: &str = "settings.json";
pub const CONFIG_DIR_ENV: &str = "WALK_METRONOME_CONFIG_DIR";
pub const SAVE_DELAY: Duration = Duration::from_millis(500);
pub const DEFAULT_VOLUME: u8 = 70;

/// Everything the user can change that survives a restart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub workout: WorkoutConfig,
    pub volume: u8,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            workout: WorkoutConfig::default(),
            volume: DEFAULT_VOLUME,
        }
    }
}

#[derive(Serialize)]
struct Record {
    slow_bpm: u32,
    slow_duration_seconds: u32,
    fast_bpm: u32,
    fast_duration_seconds: u32,
    volume: u8,
}

impl From<&Settings> for Record {
    fn from(settings: &Settings) -> Self {
        Self {
            slow_bpm: settings.workout.slow.bpm,
            slow_duration_seconds: settings.workout.slow.duration_seconds,
            fast_bpm: settings.workout.fast.bpm,
            fast_duration_seconds: settings.workout.fast.duration_seconds,
            volume: settings.volume,
        }
    }
}

impl Settings {
    pub fn from_json(text: &str) -> Result<Self, PersistenceError> {
        let value: Value = serde_json::from_str(text).map_err(PersistenceError::Parse)?;
        let Value::Object(map) = value else {
            return Err(PersistenceError::Parse(serde::de::Error::custom(
                "expected a JSON object",
            )));
        };

        let defaults = Settings::default();
        let slow = defaults.workout.slow;
        let fast = defaults.workout.fast;

        Ok(Self {
            workout: WorkoutConfig {
                slow: PhaseSpec {
                    bpm: read_field(&map, "slow_bpm", slow.bpm),
                    duration_seconds: read_field(
                        &map,
                        "slow_duration_seconds",
                        slow.duration_seconds,
                    ),
                },
                fast: PhaseSpec {
                    bpm: read_field(&map, "fast_bpm", fast.bpm),
                    duration_seconds: read_field(
                        &map,
                        "fast_duration_seconds",
                        fast.duration_seconds,
                    ),
                },
            },
            volume: read_field(&map, "volume", u32::from(defaults.volume)).min(100) as u8,
        })
    }

    pub fn to_json(&self) -> Result<String, PersistenceError> {
        serde_json::to_string_pretty(&Record::from(self)).map_err(PersistenceError::Serialize)
    }
}

fn read_field(map: &Map<String, Value>, key: &str, default: u32) -> u32 {
    let Some(raw) = map.get(key) else {
        return default;
    };
    match raw.as_u64().and_then(|v| u32::try_from(v).ok()) {
        Some(value) => value,
        None => {
            warn!(key, value = %raw, default, "ignoring corrupt settings entry");
            default
        }
    }
}

pub trait SettingsStore {
    /// `Ok(None)` when nothing has been saved yet.
    fn load(&mut self) -> Result<Option<Settings>, PersistenceError>;

    fn save(&mut self, settings: &Settings) -> Result<(), PersistenceError>;
}

/// Directory holding the settings file and the log.
pub fn config_dir() -> Result<PathBuf, PersistenceError> {
    if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV) {
        return Ok(PathBuf::from(dir));
    }
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .ok_or(PersistenceError::ConfigDirUnavailable)
}

pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn default_location() -> Result<Self, PersistenceError> {
        Ok(Self::new(config_dir()?.join(SETTINGS_FILE)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: io::Error) -> PersistenceError {
        PersistenceError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

impl SettingsStore for JsonFileStore {
    fn load(&mut self) -> Result<Option<Settings>, PersistenceError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?self.path, "no saved settings");
                return Ok(None);
            }
            Err(err) => return Err(self.io_error(err)),
        };
        Settings::from_json(&text).map(Some)
    }

    fn save(&mut self, settings: &Settings) -> Result<(), PersistenceError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }

        // Write beside the target and rename, so a crash never leaves half a file.
        let staging = self.path.with_extension("json.tmp");
        fs::write(&staging, settings.to_json()?).map_err(|err| self.io_error(err))?;
        fs::rename(&staging, &self.path).map_err(|err| self.io_error(err))?;

        info!(path = ?self.path, "settings saved");
        Ok(())
    }
}

type SaveAction = Box<dyn FnMut(Settings) -> Result<(), PersistenceError>>;

/// Coalesces rapid edits into one write, [`SAVE_DELAY`] after the last one.
pub struct DebouncedStore {
    saves: Debouncer<Settings, SaveAction>,
}

impl DebouncedStore {
    pub fn new<S: SettingsStore + 'static>(store: S) -> Self {
        Self::with_delay(store, SAVE_DELAY)
    }

    pub fn with_delay<S: SettingsStore + 'static>(mut store: S, delay: Duration) -> Self {
        let save: SaveAction = Box::new(move |settings| store.save(&settings));
        Self {
            saves: Debouncer::new(delay, save),
        }
    }

    pub fn schedule(&mut self, settings: Settings, now: Instant) {
        self.saves.schedule(settings, now);
    }

    pub fn is_pending(&self) -> bool {
        self.saves.is_pending()
    }

    /// Writes the pending settings once the delay has passed.
    pub fn poll(&mut self, now: Instant) -> Option<Result<(), PersistenceError>> {
        self.saves.poll(now)
    }

    /// Writes the pending settings right away.
    pub fn flush(&mut self) -> Option<Result<(), PersistenceError>> {
        self.saves.flush()
    }
}
