use crate::core::{Direction, LinearScale, VesselEvent};
use rodio::{OutputStream, OutputStreamHandle, Sink, Source};
use std::time::Duration;
use tracing::warn;

const SAMPLE_RATE: u32 = 44_100;
const CHANNELS: u16 = 2;
const TONE_SECS: f32 = 0.25;
const ATTACK_SECS: f32 = 0.005;
const AMPLITUDE: f32 = 0.25;

/// Tonnage-to-pitch mapping: heavier vessels sound lower.
/// Clamped, so a 5000-ton leviathan still lands on a playable note.
const TONNAGE_DOMAIN: (f64, f64) = (2.0, 1500.0);
const FREQ_RANGE: (f32, f32) = (880.0, 110.0);

/// Frequency in Hz for a vessel's cue
pub fn cue_frequency(tonnage: f64) -> f32 {
    LinearScale::new(TONNAGE_DOMAIN, FREQ_RANGE).map(tonnage)
}

/// Pan position for a movement direction: inbound hard left, outbound
/// hard right
pub fn cue_pan(direction: Direction) -> f32 {
    match direction {
        Direction::Inbound => -1.0,
        Direction::Outbound => 1.0,
    }
}

/// Fire-and-forget cue playback.
///
/// Each cue gets its own detached sink, so overlapping cues from a dense
/// day group mix instead of cutting each other off. Construction fails
/// only when no output device exists; the caller runs silent in that case.
pub struct CuePlayer {
    _stream: OutputStream,
    handle: OutputStreamHandle,
}

impl CuePlayer {
    pub fn new() -> Option<Self> {
        match OutputStream::try_default() {
            Ok((stream, handle)) => Some(Self {
                _stream: stream,
                handle,
            }),
            Err(e) => {
                warn!("no audio output device, cues disabled: {}", e);
                None
            }
        }
    }

    /// Play the cue for one vessel event. Never blocks.
    pub fn play(&self, event: &VesselEvent) {
        let Ok(sink) = Sink::try_new(&self.handle) else {
            return;
        };
        sink.append(VesselTone::for_event(event));
        sink.detach();
    }
}

/// A short synthesized stereo tone for one vessel event.
///
/// Phase-accumulator oscillator with an attack/decay envelope. Steamers
/// get a brassier harmonic stack and a slower decay; sail gets a
/// near-pure tone.
pub struct VesselTone {
    phase: f32,
    phase_step: f32,
    left_gain: f32,
    right_gain: f32,
    steamer: bool,
    frame: u32,
    total_frames: u32,
    channel: u16,
    frame_sample: f32,
}

impl VesselTone {
    pub fn for_event(event: &VesselEvent) -> Self {
        Self::new(
            cue_frequency(event.tonnage),
            cue_pan(event.direction),
            event.kind.is_steamer(),
        )
    }

    pub fn new(freq: f32, pan: f32, steamer: bool) -> Self {
        let pan = pan.clamp(-1.0, 1.0);
        Self {
            phase: 0.0,
            phase_step: std::f32::consts::TAU * freq / SAMPLE_RATE as f32,
            left_gain: (1.0 - pan) / 2.0,
            right_gain: (1.0 + pan) / 2.0,
            steamer,
            frame: 0,
            total_frames: (TONE_SECS * SAMPLE_RATE as f32) as u32,
            channel: 0,
            frame_sample: 0.0,
        }
    }

    fn envelope(&self) -> f32 {
        let t = self.frame as f32 / SAMPLE_RATE as f32;
        let attack = (t / ATTACK_SECS).min(1.0);
        // Steamers ring longer before the release
        let decay_rate = if self.steamer { 6.0 } else { 12.0 };
        attack * (-decay_rate * t).exp()
    }

    fn compute_frame_sample(&self) -> f32 {
        let s1 = self.phase.sin();
        let mono = if self.steamer {
            s1 + (self.phase * 2.0).sin() * 0.35 + (self.phase * 3.0).sin() * 0.20
        } else {
            s1 + (self.phase * 2.0).sin() * 0.08
        };
        mono * AMPLITUDE * self.envelope()
    }

    fn advance_frame(&mut self) {
        self.phase += self.phase_step;
        if self.phase >= std::f32::consts::TAU {
            self.phase -= std::f32::consts::TAU;
        }
        self.frame += 1;
    }
}

impl Iterator for VesselTone {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        if self.frame >= self.total_frames {
            return None;
        }

        if self.channel == 0 {
            self.frame_sample = self.compute_frame_sample();
        }

        let gain = if self.channel == 0 {
            self.left_gain
        } else {
            self.right_gain
        };
        let out = self.frame_sample * gain;

        self.channel += 1;
        if self.channel >= CHANNELS {
            self.channel = 0;
            self.advance_frame();
        }

        Some(out)
    }
}

impl Source for VesselTone {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        CHANNELS
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_secs_f32(TONE_SECS))
    }
}
