use std::f32::consts::PI;

use rand::Rng;

pub const SAMPLE_RATE: u32 = 44100;

fn sample_count(duration_ms: u32) -> usize {
    (SAMPLE_RATE * duration_ms / 1000) as usize
}

/// Hollow wood-block knock used on the first beat of each pair.
pub fn create_tick_sound() -> Vec<f32> {
    let samples = sample_count(70);

    let mut wave: Vec<f32> = Vec::with_capacity(samples);
    for i in 0..samples {
        let t = i as f32 / SAMPLE_RATE as f32;
        let envelope = (-t * 18.0).exp();

        let body = (t * 1000.0 * 2.0 * PI).sin() * 0.35;
        let overtone = (t * 1650.0 * 2.0 * PI).sin() * 0.15;
        wave.push((body + overtone) * envelope);
    }
    wave
}

/// Short, brighter click with a noise transient for the off beat.
pub fn create_tack_sound() -> Vec<f32> {
    let samples = sample_count(35);
    let attack = sample_count(3);

    let mut wave: Vec<f32> = Vec::with_capacity(samples);
    let mut rng = rand::thread_rng();

    for i in 0..samples {
        let t = i as f32 / SAMPLE_RATE as f32;
        let envelope = (-t * 60.0).exp();

        let tone = (t * 2400.0 * 2.0 * PI).sin() * 0.3;
        let noise: f32 = if i < attack {
            rng.gen_range(-1.0..1.0) * 0.2
        } else {
            0.0
        };
        wave.push((tone + noise) * envelope);
    }
    wave
}
