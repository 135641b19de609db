pub mod cache;
pub mod display;
pub mod notice;
pub mod schedule;
pub mod sound;
pub mod sound_type;
