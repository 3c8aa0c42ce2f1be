//! CCPatch - keep BeatStep encoders in sync with stored MIDI CC patches
//!
//! A patch is a set of CC values per MIDI channel. When a channel with
//! stored values is selected, every encoder is frozen to its stored value and
//! the user turns each knob until it reports that value. Pad LEDs show which
//! encoders are still waiting.

pub mod beatstep;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod midi;
pub mod patch;
pub mod sysex;
pub mod transport;

pub use engine::Engine;
