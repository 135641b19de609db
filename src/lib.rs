//! Interval metronome for walking workouts: alternates a slow and a fast
//! phase, each with its own tempo and length, clicking at the active tempo.

pub mod app;
pub mod audio;
pub mod error;
pub mod logging;
pub mod settings;
pub mod utilities;
pub mod workout;
