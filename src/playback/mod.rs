pub mod engine;
pub mod scrub;

pub use engine::PlaybackEngine;
pub use scrub::TimelineScrubber;

/// Playback state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}
