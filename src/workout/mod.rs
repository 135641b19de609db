//! Interval workout core: phase state machine and metronome driver.

pub mod config;
pub mod controller;
pub mod metronome;
pub mod state;

pub use config::{BPM_RANGE, ConfigField, DURATION_RANGE, PhaseSpec, WorkoutConfig};
pub use controller::{StartOutcome, TICK_PERIOD, WorkoutController};
pub use metronome::{Metronome, beat_interval};
pub use state::{BeatParity, Phase, RunMode, WorkoutSnapshot, WorkoutState};
