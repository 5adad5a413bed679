//! Audio thread communication types
//!
//! - `AudioCommand` - commands sent from the player to the audio thread
//! - `AudioEvent` - events sent from the audio thread back to the player
//!
//! ## Architecture
//! ```text
//! Player --[AudioCommand]--> audio thread (rodio sink)
//! Player <--[AudioEvent]---- audio thread
//! ```
//!
//! Sends never block; results come back as events.

use std::time::Duration;

// ============ Commands (player -> audio thread) ============

#[derive(Debug, Clone)]
pub enum AudioCommand {
    /// Fetch and decode a track, leaving it paused at the start.
    Load { url: String },
    /// Start or resume the loaded track.
    Play,
    /// Pause without releasing the track.
    Pause,
    /// Jump to an absolute position in the loaded track.
    Seek { position: Duration },
    /// Set the stored volume (0.0 to 1.0).
    SetVolume { volume: f32 },
    /// Mute or unmute without touching the stored volume.
    SetMuted { muted: bool },
    /// Periodic position and end-of-track poll.
    Tick,
    /// Exit the audio thread.
    Shutdown,
}

// ============ Events (audio thread -> player) ============

#[derive(Debug, Clone)]
pub enum AudioEvent {
    /// A track finished loading and can start instantly.
    TrackLoaded { duration: Option<Duration> },
    /// Position report for the loaded track, answered per Tick.
    TimeUpdate {
        position: Duration,
        duration: Option<Duration>,
    },
    /// The loaded track played to its end.
    Finished,
    /// The track could not be fetched or decoded.
    LoadFailed { url: String, reason: String },
    /// Play was commanded but nothing could start.
    PlaybackRejected { reason: String },
    /// The audio device could not be opened.
    Error { message: String },
}

// ============ Channel Types ============

/// Sender for audio commands (held by the player and the front end)
pub type AudioCommandSender = tokio::sync::mpsc::UnboundedSender<AudioCommand>;

/// Receiver for audio commands (held by the audio thread)
pub type AudioCommandReceiver = tokio::sync::mpsc::UnboundedReceiver<AudioCommand>;

/// Sender for audio events (held by the audio thread)
pub type AudioEventSender = tokio::sync::mpsc::UnboundedSender<AudioEvent>;

/// Receiver for audio events (drained by the front-end loop)
pub type AudioEventReceiver = tokio::sync::mpsc::UnboundedReceiver<AudioEvent>;

/// Create a new audio command channel
pub fn audio_command_channel() -> (AudioCommandSender, AudioCommandReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// Create a new audio event channel
pub fn audio_event_channel() -> (AudioEventSender, AudioEventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}
