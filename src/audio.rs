//! Audio playback: engine thread plus the command/event protocol.

pub mod engine;
pub mod events;

pub use engine::{EngineHandle, spawn_engine};
pub use events::{
    AudioCommand, AudioCommandSender, AudioEvent, AudioEventReceiver, audio_command_channel,
    audio_event_channel,
};
