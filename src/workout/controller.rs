use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::audio::{AudioOutput, volume_gain};
use crate::error::StartError;
use crate::utilities::notice::NoticeBoard;
use crate::utilities::schedule::Interval;
use crate::utilities::sound_type::SoundId;
use crate::workout::{
    ConfigField, Metronome, Phase, RunMode, WorkoutConfig, WorkoutSnapshot, WorkoutState,
};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

const SETTINGS_CHANGED_NOTICE: &str = "Settings changed, workout stopped";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    /// A new session began in the slow phase.
    Started,
    /// A paused session continued where it left off.
    Resumed,
    /// The session was already running; nothing changed.
    AlreadyRunning,
}

/// Owns the workout session: config, phase state, the one-second phase
/// clock, and the metronome. Every mutation goes through here.
pub struct WorkoutController<A> {
    config: WorkoutConfig,
    state: WorkoutState,
    volume: u8,
    metronome: Metronome,
    phase_clock: Interval,
    notices: NoticeBoard,
    audio: A,
}

impl<A: AudioOutput> WorkoutController<A> {
    pub fn new(config: WorkoutConfig, volume: u8, audio: A) -> Self {
        Self {
            config,
            state: WorkoutState::default(),
            volume: volume.min(100),
            metronome: Metronome::new(),
            phase_clock: Interval::new(),
            notices: NoticeBoard::new(),
            audio,
        }
    }

    /// Starts a fresh session, or resumes a paused one with its phase and
    /// remaining time intact. On error nothing changes and a notice is
    /// posted.
    pub fn start(&mut self, now: Instant) -> Result<StartOutcome, StartError> {
        let result = self.try_start(now);
        if let Err(err) = &result {
            warn!(error = %err, "start refused");
            self.notices.push(err.to_string(), now);
        }
        result
    }

    fn try_start(&mut self, now: Instant) -> Result<StartOutcome, StartError> {
        if self.state.run_mode == RunMode::Running {
            return Ok(StartOutcome::AlreadyRunning);
        }

        self.config.validate().map_err(StartError::ValidationFailed)?;
        if !self.audio.is_ready() {
            return Err(StartError::AudioNotReady);
        }
        self.audio
            .resume_if_suspended()
            .map_err(StartError::AudioResumeFailed)?;

        let outcome = if self.state.run_mode == RunMode::Paused {
            StartOutcome::Resumed
        } else {
            self.state.phase = Phase::Slow;
            self.state.remaining_seconds = self.config.slow.duration_seconds;
            StartOutcome::Started
        };
        self.state.run_mode = RunMode::Running;

        let spec = self.config.spec(self.state.phase).unwrap_or(self.config.slow);
        let gain = self.gain();
        self.metronome.restart(spec.bpm, now, &mut self.audio, gain);
        self.phase_clock.schedule(TICK_PERIOD, now + TICK_PERIOD);

        info!(
            ?outcome,
            phase = self.state.phase.name(),
            remaining = self.state.remaining_seconds,
            bpm = spec.bpm,
            "workout running"
        );
        Ok(outcome)
    }

    /// Freezes the session. Returns false (and changes nothing) unless it
    /// was running.
    pub fn pause(&mut self) -> bool {
        if self.state.run_mode != RunMode::Running {
            return false;
        }

        self.phase_clock.cancel_if_scheduled();
        self.metronome.stop();
        self.state.run_mode = RunMode::Paused;

        info!(
            phase = self.state.phase.name(),
            remaining = self.state.remaining_seconds,
            "workout paused"
        );
        true
    }

    /// Always succeeds and always leaves `Ready`/`Stopped`/0.
    pub fn stop(&mut self) {
        self.phase_clock.cancel_if_scheduled();
        self.metronome.stop();

        if self.state.is_active() {
            info!(phase = self.state.phase.name(), "workout stopped");
        }
        self.state = WorkoutState::default();
    }

    /// One elapsed second. A phase that reaches zero hands over to the next
    /// phase in the same tick, so each phase shows its full duration.
    pub fn tick(&mut self, now: Instant) {
        if self.state.run_mode != RunMode::Running {
            return;
        }

        self.state.remaining_seconds = self.state.remaining_seconds.saturating_sub(1);
        if self.state.remaining_seconds == 0 {
            self.advance_phase(now);
        }
    }

    fn advance_phase(&mut self, now: Instant) {
        let phase = self.state.phase.next();
        let spec = self.config.spec(phase).unwrap_or(self.config.slow);

        self.state.phase = phase;
        self.state.remaining_seconds = spec.duration_seconds;

        let gain = self.gain();
        self.metronome.restart(spec.bpm, now, &mut self.audio, gain);

        info!(
            phase = phase.name(),
            bpm = spec.bpm,
            duration = spec.duration_seconds,
            "phase changed"
        );
    }

    /// Runs whatever is due at `now`: the phase tick first, so a phase
    /// change retimes the metronome before it can click at the old tempo.
    pub fn poll(&mut self, now: Instant) {
        if self.phase_clock.fire_if_due(now) {
            self.tick(now);
        }

        let gain = self.gain();
        self.metronome.poll(now, &mut self.audio, gain);
        self.notices.expire(now);
    }

    /// Applies a config edit. An active session is stopped first and one
    /// notice is posted. Returns whether a session was interrupted.
    pub fn edit_config<F>(&mut self, now: Instant, edit: F) -> bool
    where
        F: FnOnce(&mut WorkoutConfig),
    {
        let interrupted = self.state.is_active();
        if interrupted {
            self.stop();
            self.notices.push(SETTINGS_CHANGED_NOTICE, now);
        }

        edit(&mut self.config);
        interrupted
    }

    pub fn step_field(&mut self, field: ConfigField, steps: i32, now: Instant) -> bool {
        self.edit_config(now, |config| config.step(field, steps))
    }

    pub fn set_field(&mut self, field: ConfigField, value: u32, now: Instant) -> bool {
        self.edit_config(now, |config| config.set(field, value))
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
    }

    pub fn adjust_volume(&mut self, change: i32) {
        let volume = (self.volume as i32 + change).clamp(0, 100);
        self.set_volume(volume as u8);
    }

    /// Plays one primary click at the current volume.
    pub fn test_click(&mut self, now: Instant) {
        if !self.audio.is_ready() {
            self.notices.push(StartError::AudioNotReady.to_string(), now);
            return;
        }
        let gain = self.gain();
        if let Err(err) = self.audio.play_sound(SoundId::Primary, gain) {
            warn!(error = %err, "test click failed");
        }
    }

    pub fn notify(&mut self, message: impl Into<String>, now: Instant) {
        self.notices.push(message, now);
    }

    pub fn notice(&self, now: Instant) -> Option<&str> {
        self.notices.current(now)
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    pub fn gain(&self) -> f32 {
        volume_gain(self.volume)
    }

    pub fn config(&self) -> &WorkoutConfig {
        &self.config
    }

    pub fn state(&self) -> &WorkoutState {
        &self.state
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn metronome(&self) -> &Metronome {
        &self.metronome
    }

    pub fn is_ticking(&self) -> bool {
        self.phase_clock.is_scheduled()
    }

    pub fn is_audio_ready(&mut self) -> bool {
        self.audio.is_ready()
    }

    pub fn audio(&self) -> &A {
        &self.audio
    }

    pub fn audio_mut(&mut self) -> &mut A {
        &mut self.audio
    }

    pub fn snapshot(&self) -> WorkoutSnapshot {
        WorkoutSnapshot {
            phase: self.state.phase,
            run_mode: self.state.run_mode,
            remaining_seconds: self.state.remaining_seconds,
            phase_duration_seconds: self
                .config
                .spec(self.state.phase)
                .map_or(0, |spec| spec.duration_seconds),
            bpm: self.metronome.bpm(),
            beat_parity: self.metronome.parity(),
            beats: self.metronome.beats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::testing::RecordingAudio;
    use crate::workout::{BeatParity, PhaseSpec};

    fn config(slow: (u32, u32), fast: (u32, u32)) -> WorkoutConfig {
        WorkoutConfig {
            slow: PhaseSpec {
                bpm: slow.0,
                duration_seconds: slow.1,
            },
            fast: PhaseSpec {
                bpm: fast.0,
                duration_seconds: fast.1,
            },
        }
    }

    fn controller(cfg: WorkoutConfig) -> WorkoutController<RecordingAudio> {
        WorkoutController::new(cfg, 100, RecordingAudio::ready())
    }

    fn ticks(ctl: &mut WorkoutController<RecordingAudio>, n: u32, now: Instant) {
        for _ in 0..n {
            ctl.tick(now);
        }
    }

    fn is_fresh(ctl: &WorkoutController<RecordingAudio>) -> bool {
        *ctl.state() == WorkoutState::default()
            && !ctl.metronome().is_running()
            && !ctl.is_ticking()
            && ctl.metronome().parity() == BeatParity::Even
    }

    #[test]
    fn start_from_ready_enters_slow_phase() {
        let t0 = Instant::now();
        let mut ctl = controller(config((70, 45), (140, 30)));

        assert_eq!(ctl.start(t0).unwrap(), StartOutcome::Started);

        let state = ctl.state();
        assert_eq!(state.phase, Phase::Slow);
        assert_eq!(state.run_mode, RunMode::Running);
        assert_eq!(state.remaining_seconds, 45);
        assert_eq!(ctl.metronome().bpm(), Some(70));
        assert!(ctl.is_ticking());
        assert_eq!(ctl.audio().sounds(), vec![SoundId::Primary]);
    }

    #[test]
    fn transition_happens_on_the_tick_that_reaches_zero() {
        let t0 = Instant::now();
        let mut ctl = controller(config((60, 10), (120, 10)));
        ctl.start(t0).unwrap();

        ticks(&mut ctl, 9, t0);
        assert_eq!(ctl.state().phase, Phase::Slow);
        assert_eq!(ctl.state().remaining_seconds, 1);

        ctl.tick(t0);
        assert_eq!(ctl.state().phase, Phase::Fast);
        assert_eq!(ctl.state().remaining_seconds, 10);
        assert_eq!(ctl.metronome().bpm(), Some(120));
    }

    #[test]
    fn phases_keep_alternating() {
        let t0 = Instant::now();
        let mut ctl = controller(config((60, 10), (120, 15)));
        ctl.start(t0).unwrap();

        ticks(&mut ctl, 10, t0);
        assert_eq!(ctl.state().phase, Phase::Fast);
        ticks(&mut ctl, 14, t0);
        assert_eq!(ctl.state().phase, Phase::Fast);
        assert_eq!(ctl.state().remaining_seconds, 1);
        ctl.tick(t0);
        assert_eq!(ctl.state().phase, Phase::Slow);
        assert_eq!(ctl.state().remaining_seconds, 10);
        assert_eq!(ctl.metronome().bpm(), Some(60));
    }

    #[test]
    fn polling_drives_ticks_and_clicks_in_order() {
        let t0 = Instant::now();
        let mut ctl = controller(config((60, 10), (120, 10)));
        ctl.start(t0).unwrap();

        for second in 1..=9 {
            ctl.poll(t0 + Duration::from_secs(second));
        }
        assert_eq!(ctl.state().remaining_seconds, 1);
        assert_eq!(ctl.audio().played.len(), 10);

        ctl.poll(t0 + Duration::from_secs(10));
        assert_eq!(ctl.state().phase, Phase::Fast);
        // Only the immediate click of the new phase, no stale 60 bpm click.
        assert_eq!(ctl.audio().played.len(), 11);
        assert_eq!(ctl.audio().sounds().last(), Some(&SoundId::Primary));
        assert_eq!(
            ctl.metronome().next_click(),
            Some(t0 + Duration::from_millis(10_500))
        );
    }

    #[test]
    fn pause_then_resume_restores_phase_and_tempo() {
        let t0 = Instant::now();
        let mut ctl = controller(config((60, 10), (120, 20)));
        ctl.start(t0).unwrap();
        ticks(&mut ctl, 12, t0);
        assert_eq!(ctl.state().phase, Phase::Fast);
        assert_eq!(ctl.state().remaining_seconds, 18);

        assert!(ctl.pause());
        assert_eq!(ctl.state().run_mode, RunMode::Paused);
        assert_eq!(ctl.state().phase, Phase::Fast);
        assert!(!ctl.metronome().is_running());
        assert!(!ctl.is_ticking());

        let played = ctl.audio().played.len();
        ctl.poll(t0 + Duration::from_secs(120));
        assert_eq!(ctl.state().remaining_seconds, 18);
        assert_eq!(ctl.audio().played.len(), played);

        let t1 = t0 + Duration::from_secs(130);
        assert_eq!(ctl.start(t1).unwrap(), StartOutcome::Resumed);
        assert_eq!(ctl.state().run_mode, RunMode::Running);
        assert_eq!(ctl.state().phase, Phase::Fast);
        assert_eq!(ctl.state().remaining_seconds, 18);
        assert_eq!(ctl.metronome().bpm(), Some(120));
    }

    #[test]
    fn ticks_are_ignored_unless_running() {
        let t0 = Instant::now();
        let mut ctl = controller(config((60, 10), (120, 10)));
        ctl.tick(t0);
        assert!(is_fresh(&ctl));

        ctl.start(t0).unwrap();
        ctl.pause();
        ticks(&mut ctl, 30, t0);
        assert_eq!(ctl.state().phase, Phase::Slow);
        assert_eq!(ctl.state().remaining_seconds, 10);
    }

    #[test]
    fn pause_outside_running_is_a_no_op() {
        let t0 = Instant::now();
        let mut ctl = controller(config((60, 10), (120, 10)));
        assert!(!ctl.pause());
        assert!(is_fresh(&ctl));

        ctl.start(t0).unwrap();
        assert!(ctl.pause());
        let paused = *ctl.state();
        assert!(!ctl.pause());
        assert_eq!(*ctl.state(), paused);
    }

    #[test]
    fn stop_resets_from_every_state() {
        let t0 = Instant::now();
        let cfg = config((60, 10), (120, 10));

        let mut ready = controller(cfg);
        ready.stop();
        assert!(is_fresh(&ready));

        let mut running = controller(cfg);
        running.start(t0).unwrap();
        ticks(&mut running, 3, t0);
        running.stop();
        assert!(is_fresh(&running));

        let mut paused = controller(cfg);
        paused.start(t0).unwrap();
        paused.pause();
        paused.stop();
        assert!(is_fresh(&paused));

        let mut fast = controller(cfg);
        fast.start(t0).unwrap();
        ticks(&mut fast, 14, t0);
        fast.stop();
        fast.stop();
        assert!(is_fresh(&fast));
    }

    #[test]
    fn start_after_stop_matches_a_fresh_start() {
        let t0 = Instant::now();
        let cfg = config((80, 30), (150, 40));

        let mut fresh = controller(cfg);
        fresh.start(t0).unwrap();

        let mut reused = controller(cfg);
        reused.start(t0).unwrap();
        ticks(&mut reused, 35, t0);
        reused.pause();
        reused.stop();
        assert_eq!(reused.start(t0).unwrap(), StartOutcome::Started);

        assert_eq!(fresh.snapshot(), reused.snapshot());
    }

    #[test]
    fn start_while_running_changes_nothing() {
        let t0 = Instant::now();
        let mut ctl = controller(config((60, 10), (120, 10)));
        ctl.start(t0).unwrap();
        ticks(&mut ctl, 4, t0);
        let before = ctl.snapshot();

        assert_eq!(ctl.start(t0).unwrap(), StartOutcome::AlreadyRunning);
        assert_eq!(ctl.snapshot(), before);
        assert_eq!(ctl.audio().played.len(), 1);
    }

    #[test]
    fn out_of_range_config_blocks_start() {
        let t0 = Instant::now();
        for cfg in [
            config((39, 60), (120, 60)),
            config((60, 60), (241, 60)),
            config((60, 9), (120, 60)),
            config((60, 60), (120, 301)),
        ] {
            let mut ctl = controller(cfg);
            let err = ctl.start(t0).unwrap_err();

            assert!(matches!(err, StartError::ValidationFailed(ref v) if v.len() == 1));
            assert!(is_fresh(&ctl));
            assert!(ctl.audio().played.is_empty());
            assert_eq!(ctl.notices().posted(), 1);
            assert!(ctl.notice(t0).is_some());
        }
    }

    #[test]
    fn boundary_config_starts() {
        let t0 = Instant::now();
        for cfg in [config((40, 10), (240, 300)), config((240, 300), (40, 10))] {
            let mut ctl = controller(cfg);
            assert_eq!(ctl.start(t0).unwrap(), StartOutcome::Started);
        }
    }

    #[test]
    fn start_is_refused_until_audio_is_ready() {
        let t0 = Instant::now();
        let mut ctl = WorkoutController::new(
            config((60, 10), (120, 10)),
            80,
            RecordingAudio::default(),
        );

        assert!(matches!(ctl.start(t0), Err(StartError::AudioNotReady)));
        assert!(is_fresh(&ctl));
        assert_eq!(ctl.notice(t0), Some("audio is not ready yet"));

        ctl.audio_mut().ready = true;
        assert_eq!(ctl.start(t0).unwrap(), StartOutcome::Started);
    }

    #[test]
    fn suspended_audio_is_resumed_before_starting() {
        let t0 = Instant::now();
        let mut ctl = WorkoutController::new(
            config((60, 10), (120, 10)),
            80,
            RecordingAudio {
                suspended: true,
                ..RecordingAudio::ready()
            },
        );

        ctl.start(t0).unwrap();
        assert_eq!(ctl.audio().resumes, 1);
        assert!(!ctl.audio().suspended);
    }

    #[test]
    fn failed_resume_aborts_start() {
        let t0 = Instant::now();
        let mut ctl = WorkoutController::new(
            config((60, 10), (120, 10)),
            80,
            RecordingAudio {
                suspended: true,
                refuse_resume: true,
                ..RecordingAudio::ready()
            },
        );

        assert!(matches!(
            ctl.start(t0),
            Err(StartError::AudioResumeFailed(_))
        ));
        assert!(is_fresh(&ctl));
        assert!(ctl.audio().played.is_empty());
    }

    #[test]
    fn failed_resume_keeps_a_paused_session_paused() {
        let t0 = Instant::now();
        let mut ctl = controller(config((60, 10), (120, 10)));
        ctl.start(t0).unwrap();
        ticks(&mut ctl, 3, t0);
        ctl.pause();

        ctl.audio_mut().suspended = true;
        ctl.audio_mut().refuse_resume = true;
        assert!(ctl.start(t0).is_err());
        assert_eq!(ctl.state().run_mode, RunMode::Paused);
        assert_eq!(ctl.state().remaining_seconds, 7);
    }

    #[test]
    fn editing_an_active_session_stops_it_with_one_notice() {
        let t0 = Instant::now();
        let mut ctl = controller(config((60, 10), (120, 10)));
        ctl.start(t0).unwrap();
        ticks(&mut ctl, 2, t0);

        assert!(ctl.step_field(ConfigField::FastBpm, 5, t0));
        assert!(is_fresh(&ctl));
        assert_eq!(ctl.config().fast.bpm, 125);
        assert_eq!(ctl.notices().posted(), 1);
        assert_eq!(ctl.notice(t0), Some(SETTINGS_CHANGED_NOTICE));
    }

    #[test]
    fn editing_a_paused_session_stops_it() {
        let t0 = Instant::now();
        let mut ctl = controller(config((60, 10), (120, 10)));
        ctl.start(t0).unwrap();
        ctl.pause();

        assert!(ctl.set_field(ConfigField::SlowDuration, 45, t0));
        assert!(is_fresh(&ctl));
        assert_eq!(ctl.config().slow.duration_seconds, 45);
        assert_eq!(ctl.notices().posted(), 1);
    }

    #[test]
    fn editing_while_stopped_is_silent() {
        let t0 = Instant::now();
        let mut ctl = controller(config((60, 10), (120, 10)));

        assert!(!ctl.set_field(ConfigField::SlowBpm, 999, t0));
        assert_eq!(ctl.config().slow.bpm, 999);
        assert_eq!(ctl.notices().posted(), 0);
    }

    #[test]
    fn clicks_use_the_volume_curve() {
        let t0 = Instant::now();
        let mut ctl = controller(config((60, 10), (120, 10)));
        ctl.set_volume(50);
        ctl.start(t0).unwrap();

        ctl.adjust_volume(60);
        assert_eq!(ctl.volume(), 100);
        ctl.poll(t0 + Duration::from_secs(1));

        let gains: Vec<f32> = ctl.audio().played.iter().map(|(_, g)| *g).collect();
        assert_eq!(gains, vec![volume_gain(50), volume_gain(100)]);
    }

    #[test]
    fn volume_changes_do_not_interrupt_a_session() {
        let t0 = Instant::now();
        let mut ctl = controller(config((60, 10), (120, 10)));
        ctl.start(t0).unwrap();

        ctl.adjust_volume(-500);
        assert_eq!(ctl.volume(), 0);
        assert_eq!(ctl.state().run_mode, RunMode::Running);
    }

    #[test]
    fn snapshot_reports_phase_progress() {
        let t0 = Instant::now();
        let mut ctl = controller(config((60, 30), (120, 10)));
        ctl.start(t0).unwrap();
        ticks(&mut ctl, 5, t0);

        let snapshot = ctl.snapshot();
        assert_eq!(snapshot.phase, Phase::Slow);
        assert_eq!(snapshot.remaining_seconds, 25);
        assert_eq!(snapshot.phase_duration_seconds, 30);
        assert_eq!(snapshot.bpm, Some(60));
        assert_eq!(snapshot.beat_parity, BeatParity::Odd);
    }

    #[test]
    fn test_click_needs_ready_audio() {
        let t0 = Instant::now();
        let mut ctl = WorkoutController::new(WorkoutConfig::default(), 70, RecordingAudio::default());
        ctl.test_click(t0);
        assert!(ctl.audio().played.is_empty());
        assert!(ctl.notice(t0).is_some());

        ctl.audio_mut().ready = true;
        ctl.test_click(t0);
        assert_eq!(ctl.audio().sounds(), vec![SoundId::Primary]);
    }
}
