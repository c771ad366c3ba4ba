//! Audio subsystem: the playback engines, the transport state machine and
//! the player front-end handle.
//!
//! The player thread owns one native (rodio) engine and one embedded-bridge
//! engine and routes every track to exactly one of them.

mod bridge;
mod engine;
mod native;
mod player;
mod rules;
mod thread;
mod types;

pub use player::AudioPlayer;
pub use types::{PlayState, PlaybackHandle, PlaybackInfo, PlayerCmd};

#[cfg(test)]
mod tests;
