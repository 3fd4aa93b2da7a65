pub mod cue;

pub use cue::{cue_frequency, cue_pan, CuePlayer, VesselTone};
