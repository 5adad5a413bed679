//! Player state machine
//!
//! [`Player`] owns the playlist and the observable [`PlayerState`], turns
//! user intent into [`AudioCommand`]s, and folds [`AudioEvent`]s back into
//! state. It never touches the audio device itself; everything flows through
//! the channel pair connecting it to the engine thread.
//!
//! The playlist is circular: `next` from the last track lands on the first,
//! `previous` from the first lands on the last, and a finished track rolls
//! into the next one. There is no terminal "stopped" state.

pub mod state;

use std::time::Duration;

use crate::audio::{AudioCommand, AudioCommandSender, AudioEvent};
use crate::playlist::{Playlist, Track};
use crate::utils::{clamp_fraction, format_time};

pub use state::PlayerState;

pub struct Player {
    playlist: Playlist,
    state: PlayerState,
    commands: AudioCommandSender,
    /// Last playhead position reported by the engine.
    position: Duration,
    /// Track length as decoded by the engine, once known. Takes precedence
    /// over the advisory length carried on the [`Track`] itself.
    engine_duration: Option<Duration>,
}

impl Player {
    pub fn new(playlist: Playlist, commands: AudioCommandSender) -> Self {
        Self {
            playlist,
            state: PlayerState::default(),
            commands,
            position: Duration::ZERO,
            engine_duration: None,
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn current_track(&self) -> &Track {
        self.playlist.track_at(self.state.current_index)
    }

    // ============ Transitions ============

    /// Jump to the track at `index` and start playing it.
    ///
    /// Out-of-range indices are ignored with a warning; the current track
    /// keeps playing untouched.
    pub fn select_track(&mut self, index: usize) {
        if index >= self.playlist.len() {
            tracing::warn!("Invalid track index: {}", index);
            return;
        }
        self.change_track(index);
    }

    /// Start playback of the loaded track. No-op when already playing.
    pub fn play(&mut self) {
        if self.state.playing {
            return;
        }
        self.state.playing = true;
        self.send(AudioCommand::Play);
    }

    /// Pause playback. No-op when already paused.
    pub fn pause(&mut self) {
        if !self.state.playing {
            return;
        }
        self.state.playing = false;
        self.send(AudioCommand::Pause);
    }

    pub fn toggle_playback(&mut self) {
        if self.state.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn next(&mut self) {
        self.change_track((self.state.current_index + 1) % self.playlist.len());
    }

    pub fn previous(&mut self) {
        // Adding len - 1 retreats one step without underflowing at zero.
        let len = self.playlist.len();
        self.change_track((self.state.current_index + len - 1) % len);
    }

    /// Move the playhead to `fraction` of the track length (clamped to
    /// `[0, 1]`). Ignored while the length is still unknown.
    pub fn seek(&mut self, fraction: f32) {
        let fraction = clamp_fraction(fraction);
        let Some(duration) = self.known_duration() else {
            tracing::debug!("Seek ignored: track length not known yet");
            return;
        };
        self.send(AudioCommand::Seek {
            position: duration.mul_f32(fraction),
        });
    }

    /// Set the stored volume (clamped to `[0, 1]`). Muting is a separate
    /// axis; changing the volume never unmutes.
    pub fn set_volume(&mut self, fraction: f32) {
        let volume = clamp_fraction(fraction);
        self.state.volume = volume;
        self.send(AudioCommand::SetVolume { volume });
    }

    /// Flip mute. The stored volume is untouched, so unmuting restores the
    /// exact level the user had before.
    pub fn toggle_mute(&mut self) {
        self.state.muted = !self.state.muted;
        self.send(AudioCommand::SetMuted {
            muted: self.state.muted,
        });
    }

    /// Load the active track into the engine without starting playback.
    /// Called once at startup; track changes go through [`change_track`],
    /// which follows the load with an immediate play.
    ///
    /// [`change_track`]: Player::change_track
    pub fn load_current(&mut self) {
        let track = self.current_track();
        tracing::info!("Loading: {} - {}", track.artist, track.title);
        let url = track.media_url.clone();
        self.position = Duration::ZERO;
        self.engine_duration = None;
        self.send(AudioCommand::Load { url });
    }

    /// Ask the engine for a progress report.
    pub fn tick(&self) {
        self.send(AudioCommand::Tick);
    }

    fn change_track(&mut self, index: usize) {
        self.state.current_index = index;
        self.load_current();
        // Track changes always restart playback, even from a paused player.
        self.state.playing = true;
        self.send(AudioCommand::Play);
    }

    fn send(&self, command: AudioCommand) {
        // A closed channel means the engine thread is gone; at that point
        // there is nobody left to tell.
        let _ = self.commands.send(command);
    }

    // ============ Engine events ============

    pub fn handle_event(&mut self, event: AudioEvent) {
        match event {
            AudioEvent::TrackLoaded { duration } => {
                self.engine_duration = duration;
            }
            AudioEvent::TimeUpdate { position, duration } => {
                if duration.is_some() {
                    self.engine_duration = duration;
                }
                // Progress display needs a total; reports without one are
                // dropped rather than shown as a bare counter.
                if self.known_duration().is_some() {
                    self.position = position;
                }
            }
            AudioEvent::Finished => self.next(),
            AudioEvent::LoadFailed { url, reason } => {
                tracing::error!("Could not load {}: {}", url, reason);
                self.state.playing = false;
            }
            AudioEvent::PlaybackRejected { reason } => {
                // Keep the shown state honest instead of optimistic.
                tracing::warn!("Playback rejected by engine: {}", reason);
                self.state.playing = false;
            }
            AudioEvent::Error { message } => {
                tracing::error!("Audio engine error: {}", message);
                self.state.playing = false;
            }
        }
    }

    // ============ Presentation ============

    /// Volume as displayed to the user: zero while muted, the stored value
    /// otherwise.
    pub fn display_volume(&self) -> f32 {
        if self.state.muted { 0.0 } else { self.state.volume }
    }

    /// Playback progress in `[0, 1]`, once the track length is known.
    pub fn progress(&self) -> Option<f64> {
        let duration = self.known_duration()?;
        if duration.is_zero() {
            return None;
        }
        Some((self.position.as_secs_f64() / duration.as_secs_f64()).min(1.0))
    }

    pub fn elapsed_label(&self) -> String {
        format_time(self.position.as_secs_f64())
    }

    pub fn duration_label(&self) -> String {
        match self.known_duration() {
            Some(duration) => format_time(duration.as_secs_f64()),
            None => "0:00".to_string(),
        }
    }

    fn known_duration(&self) -> Option<Duration> {
        self.engine_duration.or_else(|| {
            self.current_track()
                .duration_secs
                .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::events::{AudioCommandReceiver, audio_command_channel};

    fn track(n: usize) -> Track {
        Track {
            title: format!("Track {}", n),
            artist: format!("Artist {}", n),
            media_url: format!("https://example.com/audio/{}.mp3", n),
            cover_url: "https://example.com/cover.jpg".to_string(),
            duration_secs: None,
        }
    }

    fn timed_track(n: usize, secs: f64) -> Track {
        Track {
            duration_secs: Some(secs),
            ..track(n)
        }
    }

    fn player_with(len: usize) -> (Player, AudioCommandReceiver) {
        let playlist = Playlist::from_tracks((0..len).map(track).collect()).unwrap();
        let (tx, rx) = audio_command_channel();
        (Player::new(playlist, tx), rx)
    }

    fn timed_player(secs: f64) -> (Player, AudioCommandReceiver) {
        let playlist = Playlist::from_tracks(vec![timed_track(0, secs)]).unwrap();
        let (tx, rx) = audio_command_channel();
        (Player::new(playlist, tx), rx)
    }

    fn drain(rx: &mut AudioCommandReceiver) -> Vec<AudioCommand> {
        let mut commands = Vec::new();
        while let Ok(command) = rx.try_recv() {
            commands.push(command);
        }
        commands
    }

    mod property_track_selection {
        use super::*;

        #[test]
        fn select_updates_index_and_starts_playback() {
            let (mut player, mut rx) = player_with(3);

            player.select_track(2);

            assert_eq!(player.state().current_index, 2);
            assert!(player.state().playing, "selecting a track auto-plays it");
            let commands = drain(&mut rx);
            assert_eq!(commands.len(), 2, "selection sends load then play");
            assert!(
                matches!(&commands[0], AudioCommand::Load { url } if url.ends_with("/2.mp3")),
                "load carries the selected track's url"
            );
            assert!(matches!(commands[1], AudioCommand::Play));
        }

        #[test]
        fn every_valid_index_round_trips() {
            let (mut player, _rx) = player_with(5);
            for i in 0..5 {
                player.select_track(i);
                assert_eq!(player.state().current_index, i);
            }
        }

        #[test]
        fn out_of_range_index_is_ignored() {
            let (mut player, mut rx) = player_with(3);

            player.select_track(3);
            player.select_track(99);

            assert_eq!(player.state().current_index, 0);
            assert!(!player.state().playing);
            assert!(drain(&mut rx).is_empty(), "rejected selection sends nothing");
        }
    }

    mod property_wraparound {
        use super::*;

        #[test]
        fn next_from_last_wraps_to_first() {
            let (mut player, _rx) = player_with(3);
            player.select_track(2);

            player.next();

            assert_eq!(player.state().current_index, 0);
        }

        #[test]
        fn previous_from_first_wraps_to_last() {
            let (mut player, _rx) = player_with(3);

            player.previous();

            assert_eq!(player.state().current_index, 2);
        }

        #[test]
        fn full_cycle_returns_to_start() {
            let (mut player, _rx) = player_with(4);
            player.select_track(1);

            for _ in 0..4 {
                player.next();
            }
            assert_eq!(player.state().current_index, 1, "len nexts land back home");

            for _ in 0..4 {
                player.previous();
            }
            assert_eq!(player.state().current_index, 1, "len previouses land back home");
        }

        #[test]
        fn track_change_restarts_paused_player() {
            let (mut player, mut rx) = player_with(2);
            assert!(!player.state().playing);

            player.next();

            assert!(player.state().playing, "track changes always auto-play");
            let commands = drain(&mut rx);
            assert!(matches!(commands.last(), Some(AudioCommand::Play)));
        }
    }

    mod property_play_pause {
        use super::*;

        #[test]
        fn play_when_already_playing_is_noop() {
            let (mut player, mut rx) = player_with(2);

            player.play();
            player.play();

            let commands = drain(&mut rx);
            assert_eq!(commands.len(), 1, "repeated play sends a single command");
            assert!(matches!(commands[0], AudioCommand::Play));
        }

        #[test]
        fn pause_when_already_paused_is_noop() {
            let (mut player, mut rx) = player_with(2);

            player.pause();

            assert!(!player.state().playing);
            assert!(drain(&mut rx).is_empty());
        }

        #[test]
        fn toggle_alternates_between_states() {
            let (mut player, mut rx) = player_with(2);

            player.toggle_playback();
            assert!(player.state().playing);
            player.toggle_playback();
            assert!(!player.state().playing);

            let commands = drain(&mut rx);
            assert!(matches!(commands[0], AudioCommand::Play));
            assert!(matches!(commands[1], AudioCommand::Pause));
        }
    }

    mod property_mute_volume {
        use super::*;

        #[test]
        fn toggle_mute_twice_restores_displayed_volume() {
            let (mut player, _rx) = player_with(1);
            player.set_volume(0.7);

            player.toggle_mute();
            assert_eq!(player.display_volume(), 0.0, "muted player displays zero");

            player.toggle_mute();
            assert_eq!(player.display_volume(), 0.7, "unmuting restores the exact level");
        }

        #[test]
        fn set_volume_clamps_out_of_range_input() {
            let (mut player, _rx) = player_with(1);

            player.set_volume(1.5);
            assert_eq!(player.state().volume, 1.0);

            player.set_volume(-0.25);
            assert_eq!(player.state().volume, 0.0);
        }

        #[test]
        fn set_volume_does_not_unmute() {
            let (mut player, _rx) = player_with(1);
            player.toggle_mute();

            player.set_volume(0.5);

            assert!(player.state().muted, "volume and mute are independent axes");
            assert_eq!(player.display_volume(), 0.0);
            assert_eq!(player.state().volume, 0.5, "stored volume still updates");
        }

        #[test]
        fn mute_state_reaches_the_engine() {
            let (mut player, mut rx) = player_with(1);

            player.toggle_mute();

            let commands = drain(&mut rx);
            assert!(matches!(commands[0], AudioCommand::SetMuted { muted: true }));
        }
    }

    mod property_seek {
        use super::*;

        #[test]
        fn seek_scales_fraction_by_engine_duration() {
            let (mut player, mut rx) = player_with(1);
            player.handle_event(AudioEvent::TrackLoaded {
                duration: Some(Duration::from_secs(200)),
            });

            player.seek(0.5);

            let commands = drain(&mut rx);
            assert!(
                matches!(&commands[0], AudioCommand::Seek { position } if *position == Duration::from_secs(100))
            );
        }

        #[test]
        fn seek_clamps_fraction_to_track_end() {
            let (mut player, mut rx) = player_with(1);
            player.handle_event(AudioEvent::TrackLoaded {
                duration: Some(Duration::from_secs(90)),
            });

            player.seek(2.0);

            let commands = drain(&mut rx);
            assert!(
                matches!(&commands[0], AudioCommand::Seek { position } if *position == Duration::from_secs(90))
            );
        }

        #[test]
        fn seek_without_known_duration_is_ignored() {
            let (mut player, mut rx) = player_with(1);

            player.seek(0.5);

            assert!(drain(&mut rx).is_empty(), "no length, nowhere to seek");
        }

        #[test]
        fn seek_falls_back_to_advisory_duration() {
            let (mut player, mut rx) = timed_player(120.0);

            player.seek(0.25);

            let commands = drain(&mut rx);
            assert!(
                matches!(&commands[0], AudioCommand::Seek { position } if *position == Duration::from_secs(30))
            );
        }

        #[test]
        fn engine_duration_overrides_advisory() {
            let (mut player, mut rx) = timed_player(120.0);
            player.handle_event(AudioEvent::TrackLoaded {
                duration: Some(Duration::from_secs(200)),
            });

            player.seek(0.5);

            let commands = drain(&mut rx);
            assert!(
                matches!(&commands[0], AudioCommand::Seek { position } if *position == Duration::from_secs(100)),
                "decoded length wins over the advisory one"
            );
        }
    }

    mod property_engine_events {
        use super::*;

        #[test]
        fn finished_track_advances_to_the_next() {
            let (mut player, mut rx) = player_with(3);

            player.handle_event(AudioEvent::Finished);

            assert_eq!(player.state().current_index, 1);
            assert!(player.state().playing, "auto-advance starts the next track");
            let commands = drain(&mut rx);
            assert!(matches!(&commands[0], AudioCommand::Load { .. }));
            assert!(matches!(commands[1], AudioCommand::Play));
        }

        #[test]
        fn finished_last_track_wraps_to_first() {
            let (mut player, _rx) = player_with(3);
            player.select_track(2);

            player.handle_event(AudioEvent::Finished);

            assert_eq!(player.state().current_index, 0);
        }

        #[test]
        fn time_update_drives_progress_and_labels() {
            let (mut player, _rx) = player_with(1);
            player.handle_event(AudioEvent::TrackLoaded {
                duration: Some(Duration::from_secs(100)),
            });

            player.handle_event(AudioEvent::TimeUpdate {
                position: Duration::from_secs(40),
                duration: Some(Duration::from_secs(100)),
            });

            assert_eq!(player.progress(), Some(0.4));
            assert_eq!(player.elapsed_label(), "0:40");
            assert_eq!(player.duration_label(), "1:40");
        }

        #[test]
        fn time_update_without_duration_leaves_display_alone() {
            let (mut player, _rx) = player_with(1);

            player.handle_event(AudioEvent::TimeUpdate {
                position: Duration::from_secs(40),
                duration: None,
            });

            assert_eq!(player.progress(), None);
            assert_eq!(player.elapsed_label(), "0:00");
        }

        #[test]
        fn load_failure_reconciles_playing_state() {
            let (mut player, _rx) = player_with(1);
            player.play();

            player.handle_event(AudioEvent::LoadFailed {
                url: "https://example.com/audio/0.mp3".to_string(),
                reason: "404".to_string(),
            });

            assert!(!player.state().playing, "failed load cannot be playing");
        }

        #[test]
        fn playback_rejection_reconciles_playing_state() {
            let (mut player, _rx) = player_with(1);
            player.play();

            player.handle_event(AudioEvent::PlaybackRejected {
                reason: "no track loaded".to_string(),
            });

            assert!(!player.state().playing, "shown state follows the engine");
        }
    }

    mod property_startup {
        use super::*;

        #[test]
        fn new_player_is_paused_on_track_zero() {
            let (player, _rx) = player_with(3);

            assert_eq!(player.state().current_index, 0);
            assert!(!player.state().playing);
            assert!(!player.state().muted);
            assert_eq!(player.state().volume, 1.0);
        }

        #[test]
        fn initial_load_does_not_autoplay() {
            let (mut player, mut rx) = player_with(3);

            player.load_current();

            assert!(!player.state().playing);
            let commands = drain(&mut rx);
            assert_eq!(commands.len(), 1, "startup load sends no play command");
            assert!(matches!(&commands[0], AudioCommand::Load { .. }));
        }

        #[test]
        fn duration_label_before_any_report() {
            let (player, _rx) = player_with(1);
            assert_eq!(player.duration_label(), "0:00");

            let (timed, _rx) = timed_player(125.0);
            assert_eq!(timed.duration_label(), "2:05", "advisory length fills the label");
        }
    }
}
