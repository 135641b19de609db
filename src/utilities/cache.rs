use std::collections::HashMap;

use crate::utilities::sound_type::SoundId;
use crate::workout::{Phase, RunMode};

pub struct SoundCache {
    sounds: HashMap<SoundId, Vec<f32>>,
}

impl SoundCache {
    pub fn new() -> Self {
        let mut sounds = HashMap::new();
        for &id in &SoundId::ALL {
            sounds.insert(id, id.create_sound());
        }
        Self { sounds }
    }

    pub fn get_sound(&self, id: SoundId) -> Option<&[f32]> {
        self.sounds.get(&id).map(Vec::as_slice)
    }
}

impl Default for SoundCache {
    fn default() -> Self {
        Self::new()
    }
}

/// Last values painted on screen, so unchanged panels are not redrawn.
#[derive(Default)]
pub struct UICache {
    pub last_phase: Option<Phase>,
    pub last_run_mode: Option<RunMode>,
    pub last_remaining: Option<u32>,
    pub last_beats: u64,
    pub last_settings: Option<[u32; 4]>,
    pub last_selected: Option<usize>,
    pub last_entry: Option<String>,
    pub last_volume: Option<u8>,
    pub last_notice: Option<String>,
    pub last_audio_ready: Option<bool>,
    pub first_render: bool,
}

impl UICache {
    pub fn new() -> Self {
        Self {
            first_render: true,
            ..Default::default()
        }
    }
}
