//! Audio output used by the metronome.
//!
//! The output stream is opened at startup with its sink paused, which
//! stands in for an audio context that has to be resumed by a user action.
//! Click buffers are synthesized on a loader thread and picked up by
//! [`AudioOutput::is_ready`] once they arrive.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use rodio::buffer::SamplesBuffer;
use rodio::{OutputStream, Sink, Source};
use tracing::{debug, error, info};

use crate::error::AudioError;
use crate::utilities::cache::SoundCache;
use crate::utilities::sound::SAMPLE_RATE;
use crate::utilities::sound_type::SoundId;

/// Gain applied at full volume.
pub const MAX_GAIN: f32 = 0.8;

/// Maps a 0-100 volume onto a squared gain curve, which tapers more
/// smoothly at low volume than a linear one.
pub fn volume_gain(volume: u8) -> f32 {
    let level = f32::from(volume.min(100)) / 100.0;
    level * level * MAX_GAIN
}

pub trait AudioOutput {
    /// True once an output device exists and both click sounds are loaded.
    fn is_ready(&mut self) -> bool;

    fn resume_if_suspended(&mut self) -> Result<(), AudioError>;

    fn play_sound(&mut self, id: SoundId, gain: f32) -> Result<(), AudioError>;
}

struct Output {
    _stream: OutputStream,
    sink: Sink,
}

enum Assets {
    Loading(Receiver<SoundCache>),
    Loaded(SoundCache),
    Failed,
}

pub struct RodioAudio {
    output: Option<Output>,
    assets: Assets,
}

impl RodioAudio {
    pub fn new() -> Self {
        let output = match open_output() {
            Ok(output) => Some(output),
            Err(err) => {
                error!(error = %err, "audio output unavailable, clicks disabled");
                None
            }
        };

        let (sound_tx, sound_rx) = mpsc::channel();
        let loader = thread::Builder::new()
            .name("click-loader".into())
            .spawn(move || {
                let _ = sound_tx.send(SoundCache::new());
            });

        let assets = match loader {
            Ok(_) => Assets::Loading(sound_rx),
            Err(err) => {
                error!(error = %err, "failed to start click sound loader");
                Assets::Failed
            }
        };

        Self { output, assets }
    }

    fn poll_assets(&mut self) {
        let received = match &self.assets {
            Assets::Loading(rx) => rx.try_recv(),
            _ => return,
        };

        match received {
            Ok(cache) => {
                info!("click sounds loaded");
                self.assets = Assets::Loaded(cache);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                error!("click sound loader exited without delivering sounds");
                self.assets = Assets::Failed;
            }
        }
    }
}

impl Default for RodioAudio {
    fn default() -> Self {
        Self::new()
    }
}

fn open_output() -> Result<Output, Box<dyn std::error::Error>> {
    let (stream, stream_handle) = OutputStream::try_default()?;
    let sink = Sink::try_new(&stream_handle)?;
    sink.pause();
    Ok(Output {
        _stream: stream,
        sink,
    })
}

impl AudioOutput for RodioAudio {
    fn is_ready(&mut self) -> bool {
        self.poll_assets();
        self.output.is_some() && matches!(self.assets, Assets::Loaded(_))
    }

    fn resume_if_suspended(&mut self) -> Result<(), AudioError> {
        let output = self.output.as_ref().ok_or(AudioError::NoOutputDevice)?;
        if output.sink.is_paused() {
            output.sink.play();
            if output.sink.is_paused() {
                return Err(AudioError::ResumeRejected);
            }
            info!("audio output resumed");
        }
        Ok(())
    }

    fn play_sound(&mut self, id: SoundId, gain: f32) -> Result<(), AudioError> {
        let output = self.output.as_ref().ok_or(AudioError::NoOutputDevice)?;
        let Assets::Loaded(cache) = &self.assets else {
            return Err(AudioError::AssetsUnavailable);
        };
        let samples = cache.get_sound(id).ok_or(AudioError::AssetsUnavailable)?;

        let source = SamplesBuffer::new(1, SAMPLE_RATE, samples.to_vec()).amplify(gain);
        output.sink.append(source);
        debug!(sound = id.name(), gain, "click queued");
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Records every request and can be told to misbehave.
    #[derive(Debug, Default)]
    pub struct RecordingAudio {
        pub ready: bool,
        pub suspended: bool,
        pub refuse_resume: bool,
        pub fail_playback: bool,
        pub resumes: u32,
        pub played: Vec<(SoundId, f32)>,
    }

    impl RecordingAudio {
        pub fn ready() -> Self {
            Self {
                ready: true,
                ..Default::default()
            }
        }

        pub fn sounds(&self) -> Vec<SoundId> {
            self.played.iter().map(|(id, _)| *id).collect()
        }
    }

    impl AudioOutput for RecordingAudio {
        fn is_ready(&mut self) -> bool {
            self.ready
        }

        fn resume_if_suspended(&mut self) -> Result<(), AudioError> {
            if !self.suspended {
                return Ok(());
            }
            if self.refuse_resume {
                return Err(AudioError::ResumeRejected);
            }
            self.suspended = false;
            self.resumes += 1;
            Ok(())
        }

        fn play_sound(&mut self, id: SoundId, gain: f32) -> Result<(), AudioError> {
            if self.fail_playback {
                return Err(AudioError::Playback("device glitch".into()));
            }
            self.played.push((id, gain));
            Ok(())
        }
    }
}
