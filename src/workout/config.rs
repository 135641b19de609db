use std::fmt;
use std::ops::RangeInclusive;

use crate::error::ConfigViolation;
use crate::workout::Phase;

pub const BPM_RANGE: RangeInclusive<u32> = 40..=240;
pub const DURATION_RANGE: RangeInclusive<u32> = 10..=300;

/// Tempo and length of one walking phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseSpec {
    pub bpm: u32,
    pub duration_seconds: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkoutConfig {
    pub slow: PhaseSpec,
    pub fast: PhaseSpec,
}

impl Default for WorkoutConfig {
    fn default() -> Self {
        Self {
            slow: PhaseSpec {
                bpm: 100,
                duration_seconds: 180,
            },
            fast: PhaseSpec {
                bpm: 130,
                duration_seconds: 120,
            },
        }
    }
}

impl WorkoutConfig {
    /// Tempo and length for `phase`, or `None` for `Ready`.
    pub fn spec(&self, phase: Phase) -> Option<PhaseSpec> {
        match phase {
            Phase::Ready => None,
            Phase::Slow => Some(self.slow),
            Phase::Fast => Some(self.fast),
        }
    }

    /// Checks every field and reports all violations at once.
    pub fn validate(&self) -> Result<(), Vec<ConfigViolation>> {
        let violations: Vec<_> = ConfigField::ALL
            .iter()
            .filter_map(|&field| field.check(self.get(field)))
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }

    pub fn get(&self, field: ConfigField) -> u32 {
        match field {
            ConfigField::SlowBpm => self.slow.bpm,
            ConfigField::SlowDuration => self.slow.duration_seconds,
            ConfigField::FastBpm => self.fast.bpm,
            ConfigField::FastDuration => self.fast.duration_seconds,
        }
    }

    /// Stores `value` as given. Out-of-range values are kept so they can
    /// be reported when a workout is started.
    pub fn set(&mut self, field: ConfigField, value: u32) {
        match field {
            ConfigField::SlowBpm => self.slow.bpm = value,
            ConfigField::SlowDuration => self.slow.duration_seconds = value,
            ConfigField::FastBpm => self.fast.bpm = value,
            ConfigField::FastDuration => self.fast.duration_seconds = value,
        }
    }

    /// Stepper adjustment: moves `field` by `steps` increments and clamps
    /// the result into the valid range.
    pub fn step(&mut self, field: ConfigField, steps: i32) {
        let range = field.range();
        let moved = self.get(field) as i64 + steps as i64 * field.increment() as i64;
        let clamped = moved.clamp(*range.start() as i64, *range.end() as i64);
        self.set(field, clamped as u32);
    }

    pub fn values(&self) -> [u32; 4] {
        ConfigField::ALL.map(|field| self.get(field))
    }
}

/// One editable number in a [`WorkoutConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigField {
    SlowBpm,
    SlowDuration,
    FastBpm,
    FastDuration,
}

impl ConfigField {
    pub const ALL: [ConfigField; 4] = [
        ConfigField::SlowBpm,
        ConfigField::SlowDuration,
        ConfigField::FastBpm,
        ConfigField::FastDuration,
    ];

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|f| f == self).unwrap_or(0)
    }

    pub fn next(&self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(&self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    pub fn range(&self) -> RangeInclusive<u32> {
        match self {
            ConfigField::SlowBpm | ConfigField::FastBpm => BPM_RANGE,
            ConfigField::SlowDuration | ConfigField::FastDuration => DURATION_RANGE,
        }
    }

    /// Stepper increment: 1 BPM or 5 seconds.
    pub fn increment(&self) -> u32 {
        match self {
            ConfigField::SlowBpm | ConfigField::FastBpm => 1,
            ConfigField::SlowDuration | ConfigField::FastDuration => 5,
        }
    }

    /// Increments per coarse step: 10 BPM or 30 seconds.
    pub fn coarse_steps(&self) -> i32 {
        match self {
            ConfigField::SlowBpm | ConfigField::FastBpm => 10,
            ConfigField::SlowDuration | ConfigField::FastDuration => 6,
        }
    }

    pub fn unit(&self) -> &'static str {
        match self {
            ConfigField::SlowBpm | ConfigField::FastBpm => "bpm",
            ConfigField::SlowDuration | ConfigField::FastDuration => "s",
        }
    }

    fn check(&self, value: u32) -> Option<ConfigViolation> {
        let range = self.range();
        if range.contains(&value) {
            return None;
        }
        Some(ConfigViolation {
            field: *self,
            value,
            min: *range.start(),
            max: *range.end(),
        })
    }
}

impl fmt::Display for ConfigField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ConfigField::SlowBpm => "slow BPM",
            ConfigField::SlowDuration => "slow duration",
            ConfigField::FastBpm => "fast BPM",
            ConfigField::FastDuration => "fast duration",
        };
        f.write_str(label)
    }
}
