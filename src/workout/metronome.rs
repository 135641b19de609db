use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::audio::AudioOutput;
use crate::utilities::schedule::Interval;
use crate::workout::BeatParity;

/// Time between two clicks at `bpm`.
pub fn beat_interval(bpm: u32) -> Duration {
    Duration::from_secs_f64(60.0 / f64::from(bpm.max(1)))
}

/// Emits clicks at a fixed tempo until restarted or stopped.
///
/// The driver never fails: missing audio or a playback error costs one
/// click, never the schedule.
#[derive(Debug, Default)]
pub struct Metronome {
    bpm: Option<u32>,
    parity: BeatParity,
    clicks: Interval,
    beats: u64,
}

impl Metronome {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops the old schedule, clicks once right away on the primary
    /// sound, then keeps clicking every `60 / bpm` seconds.
    pub fn restart<A: AudioOutput>(&mut self, bpm: u32, now: Instant, audio: &mut A, gain: f32) {
        self.clicks.cancel_if_scheduled();
        self.parity = BeatParity::Even;
        self.beats = 0;
        self.bpm = Some(bpm);
        debug!(bpm, "metronome restarted");

        self.click(audio, gain);

        let interval = beat_interval(bpm);
        self.clicks.schedule(interval, now + interval);
    }

    pub fn stop(&mut self) {
        if self.clicks.cancel_if_scheduled() {
            debug!("metronome stopped");
        }
        self.bpm = None;
        self.parity = BeatParity::Even;
    }

    /// Clicks if the next beat is due. Returns whether a click was emitted.
    pub fn poll<A: AudioOutput>(&mut self, now: Instant, audio: &mut A, gain: f32) -> bool {
        if !self.clicks.fire_if_due(now) {
            return false;
        }
        self.click(audio, gain);
        true
    }

    fn click<A: AudioOutput>(&mut self, audio: &mut A, gain: f32) {
        let sound = self.parity.sound();
        if audio.is_ready() {
            if let Err(err) = audio.play_sound(sound, gain) {
                warn!(error = %err, sound = sound.name(), "click skipped");
            }
        } else {
            trace!(sound = sound.name(), "audio not ready, click skipped");
        }

        self.parity = self.parity.flip();
        self.beats += 1;
    }

    pub fn bpm(&self) -> Option<u32> {
        self.bpm
    }

    pub fn is_running(&self) -> bool {
        self.clicks.is_scheduled()
    }

    pub fn parity(&self) -> BeatParity {
        self.parity
    }

    /// Clicks emitted since the last restart.
    pub fn beats(&self) -> u64 {
        self.beats
    }

    pub fn next_click(&self) -> Option<Instant> {
        self.clicks.next_due()
    }
}
