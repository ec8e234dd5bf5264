/// Sound engine: procedural chiptune effects via rodio.
///
/// Every effect is synthesized into an in-memory WAV buffer once at start-up.
/// `play_event` maps a simulation `GameEvent` to its effect and plays it
/// fire-and-forget on a detached `Sink`.
///
/// Build without the "sound" feature to get a stub engine that does nothing.

use crate::domain::entity::BossAttack;
use crate::sim::event::GameEvent;

/// Effect identifiers. The host only ever sees these through `play_event`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sfx {
    Jump,
    Swing,
    Hurt,
    Kill,
    LevelUp,
    Key,
    DoorLocked,
    DoorOpen,
    BossRoar,
    BossCast,
    BossHit,
    Win,
    Die,
}

impl Sfx {
    pub const ALL: [Sfx; 13] = [
        Sfx::Jump,
        Sfx::Swing,
        Sfx::Hurt,
        Sfx::Kill,
        Sfx::LevelUp,
        Sfx::Key,
        Sfx::DoorLocked,
        Sfx::DoorOpen,
        Sfx::BossRoar,
        Sfx::BossCast,
        Sfx::BossHit,
        Sfx::Win,
        Sfx::Die,
    ];

    /// Effect for an event, if it has one. Respawns and drops stay silent.
    pub fn for_event(event: &GameEvent) -> Option<Sfx> {
        match event {
            GameEvent::Jumped => Some(Sfx::Jump),
            GameEvent::AttackStarted => Some(Sfx::Swing),
            GameEvent::PlayerHurt { .. } => Some(Sfx::Hurt),
            GameEvent::PlayerDied => Some(Sfx::Die),
            GameEvent::LevelUp { .. } => Some(Sfx::LevelUp),
            GameEvent::MonsterKilled { .. } | GameEvent::EliteKilled => Some(Sfx::Kill),
            GameEvent::EliteHit { .. } | GameEvent::BossHit { .. } => Some(Sfx::BossHit),
            GameEvent::EliteFired => Some(Sfx::BossCast),
            GameEvent::KeyCollected => Some(Sfx::Key),
            GameEvent::DoorLocked => Some(Sfx::DoorLocked),
            GameEvent::DoorOpened | GameEvent::EnteredBossRoom => Some(Sfx::DoorOpen),
            GameEvent::BossAwoke => Some(Sfx::BossRoar),
            GameEvent::BossAttack(BossAttack::Charge) => Some(Sfx::BossRoar),
            GameEvent::BossAttack(_) => Some(Sfx::BossCast),
            GameEvent::BossDefeated => Some(Sfx::Win),
            GameEvent::MonsterRespawned { .. } | GameEvent::KeyDropped { .. } => None,
        }
    }

    #[cfg_attr(not(feature = "sound"), allow(dead_code))]
    fn index(self) -> usize {
        self as usize
    }
}

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::Sfx;

    const SAMPLE_RATE: u32 = 22050;
    const TAU: f32 = std::f32::consts::TAU;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        buffers: Vec<Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    tracing::warn!(error = %e, "no audio output, sound disabled");
                    return None;
                }
            };
            let buffers = Sfx::ALL.iter().map(|&s| Arc::new(make_wav(&synth(s)))).collect();
            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, sfx: Sfx) {
            let Some(buf) = self.buffers.get(sfx.index()) else { return };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach();
                }
            }
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators (mono f32 samples)
    // ════════════════════════════════════════════════════════════

    fn synth(sfx: Sfx) -> Vec<f32> {
        match sfx {
            Sfx::Jump => sweep(300.0, 700.0, 0.10, 0.22),
            Sfx::Swing => noise_sweep(900.0, 300.0, 0.07, 0.18, 77),
            Sfx::Hurt => sweep(500.0, 160.0, 0.14, 0.28),
            Sfx::Kill => arpeggio(&[660.0, 440.0], 0.05, 0.25),
            Sfx::LevelUp => arpeggio(&[523.0, 659.0, 784.0, 1047.0], 0.07, 0.25),
            Sfx::Key => arpeggio(&[1047.0, 1319.0, 1568.0], 0.045, 0.25),
            Sfx::DoorLocked => arpeggio(&[180.0, 150.0], 0.08, 0.3),
            Sfx::DoorOpen => sweep(200.0, 420.0, 0.25, 0.25),
            Sfx::BossRoar => noise_sweep(160.0, 60.0, 0.45, 0.35, 4242),
            Sfx::BossCast => sweep(900.0, 1400.0, 0.12, 0.18),
            Sfx::BossHit => noise_sweep(400.0, 200.0, 0.06, 0.22, 9001),
            Sfx::Win => fanfare(),
            Sfx::Die => with_tail_fade(arpeggio(&[440.0, 370.0, 311.0, 261.0], 0.12, 0.3)),
        }
    }

    /// Sine glide from `f0` to `f1` with a fading envelope.
    fn sweep(f0: f32, f1: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut phase = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = f0 + (f1 - f0) * t;
                phase += freq * TAU / SAMPLE_RATE as f32;
                phase.sin() * (1.0 - t).powf(0.6) * volume
            })
            .collect()
    }

    /// Tone glide mixed with LCG noise, for impacts and roars.
    fn noise_sweep(f0: f32, f1: f32, duration: f32, volume: f32, seed: u32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        let mut rng = seed;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let freq = f0 + (f1 - f0) * t;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let tone = (ti * freq * TAU).sin();
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                (tone * 0.45 + noise * 0.55) * (1.0 - t).powf(0.8) * volume
            })
            .collect()
    }

    /// Square-ish notes played back to back.
    fn arpeggio(notes: &[f32], note_dur: f32, volume: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in notes {
            let n = (SAMPLE_RATE as f32 * note_dur) as usize;
            for i in 0..n {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * TAU).sin() * 0.7 + (t * freq * 3.0 * TAU).sin() * 0.3;
                samples.push(wave * env * volume);
            }
        }
        samples
    }

    fn fanfare() -> Vec<f32> {
        let mut samples = arpeggio(&[523.0, 659.0, 784.0], 0.1, 0.3);
        let last = 1047.0_f32;
        let n = (SAMPLE_RATE as f32 * 0.35) as usize;
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32);
            let wave = (t * last * TAU).sin() * 0.7 + (t * last * 2.0 * TAU).sin() * 0.3;
            samples.push(wave * env * 0.3);
        }
        samples
    }

    fn with_tail_fade(mut samples: Vec<f32>) -> Vec<f32> {
        let total = samples.len();
        let fade_len = total / 4;
        for (k, s) in samples[total - fade_len..].iter_mut().enumerate() {
            *s *= (fade_len - k) as f32 / fade_len as f32;
        }
        samples
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder: 16-bit mono PCM
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let channels: u16 = 1;
        let bits: u16 = 16;
        let byte_rate = SAMPLE_RATE * channels as u32 * bits as u32 / 8;
        let block_align = channels * bits / 8;
        let data_size = samples.len() as u32 * 2;

        let mut buf = Vec::with_capacity(44 + data_size as usize);
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&(36 + data_size).to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
        buf.extend_from_slice(&channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits.to_le_bytes());

        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());
        for &s in samples {
            let v = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
            buf.extend_from_slice(&v.to_le_bytes());
        }
        buf
    }

}

// ════════════════════════════════════════════════════════════
//  Public API (no-ops when the sound feature is off)
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play(&self, _sfx: Sfx) {}
}

impl SoundEngine {
    /// Play the effect for each event that has one. A burst of identical
    /// effects in one tick (several kills at once) is played once.
    pub fn play_events(&self, events: &[GameEvent]) {
        let mut played: Vec<Sfx> = Vec::with_capacity(events.len());
        for sfx in events.iter().filter_map(Sfx::for_event) {
            if !played.contains(&sfx) {
                self.play(sfx);
                played.push(sfx);
            }
        }
    }
}
