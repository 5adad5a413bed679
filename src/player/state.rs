//! Observable playback state.

/// Snapshot of everything the interface needs to render transport controls.
///
/// `volume` is the user's chosen level and survives muting; a muted player
/// displays zero while remembering the real value here.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    /// Index into the playlist of the active track.
    pub current_index: usize,
    /// Whether playback is (or should be) running.
    pub playing: bool,
    /// Whether output is muted.
    pub muted: bool,
    /// Stored volume in `[0.0, 1.0]`, independent of `muted`.
    pub volume: f32,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            current_index: 0,
            playing: false,
            muted: false,
            volume: 1.0,
        }
    }
}
