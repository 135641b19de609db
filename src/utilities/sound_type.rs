use crate::utilities::sound::{create_tack_sound, create_tick_sound};

/// The two click timbres. Even beats play `Primary`, odd beats `Secondary`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SoundId {
    #[default]
    Primary,
    Secondary,
}

impl SoundId {
    pub const ALL: [SoundId; 2] = [SoundId::Primary, SoundId::Secondary];

    pub fn name(&self) -> &'static str {
        match self {
            SoundId::Primary => "tick",
            SoundId::Secondary => "tack",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            SoundId::Primary => "●",
            SoundId::Secondary => "○",
        }
    }

    pub fn create_sound(&self) -> Vec<f32> {
        match self {
            SoundId::Primary => create_tick_sound(),
            SoundId::Secondary => create_tack_sound(),
        }
    }
}
