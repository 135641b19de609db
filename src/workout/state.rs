use crate::utilities::sound_type::SoundId;

/// Which walking interval is active. Independent of play/pause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Ready,
    Slow,
    Fast,
}

impl Phase {
    /// The phase that follows this one. `Ready` always leads into `Slow`.
    pub fn next(&self) -> Self {
        match self {
            Phase::Ready | Phase::Fast => Phase::Slow,
            Phase::Slow => Phase::Fast,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Ready => "READY",
            Phase::Slow => "SLOW",
            Phase::Fast => "FAST",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Stopped,
    Running,
    Paused,
}

impl RunMode {
    pub fn name(&self) -> &'static str {
        match self {
            RunMode::Stopped => "STOPPED",
            RunMode::Running => "RUNNING",
            RunMode::Paused => "PAUSED",
        }
    }
}

/// Alternates on every click to pick between the two timbres.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BeatParity {
    #[default]
    Even,
    Odd,
}

impl BeatParity {
    pub fn flip(&self) -> Self {
        match self {
            BeatParity::Even => BeatParity::Odd,
            BeatParity::Odd => BeatParity::Even,
        }
    }

    pub fn sound(&self) -> SoundId {
        match self {
            BeatParity::Even => SoundId::Primary,
            BeatParity::Odd => SoundId::Secondary,
        }
    }

    pub fn as_u8(&self) -> u8 {
        match self {
            BeatParity::Even => 0,
            BeatParity::Odd => 1,
        }
    }
}

/// The live session. `phase` and `run_mode` are separate axes so a paused
/// session still knows which tempo to resume with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WorkoutState {
    pub phase: Phase,
    pub run_mode: RunMode,
    pub remaining_seconds: u32,
}

impl WorkoutState {
    pub fn is_active(&self) -> bool {
        matches!(self.run_mode, RunMode::Running | RunMode::Paused)
    }
}

/// Read-only projection handed to the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkoutSnapshot {
    pub phase: Phase,
    pub run_mode: RunMode,
    pub remaining_seconds: u32,
    pub phase_duration_seconds: u32,
    pub bpm: Option<u32>,
    pub beat_parity: BeatParity,
    pub beats: u64,
}
