//! Track and playlist types, the compiled-in playlist, and the fallback
//! policy applied when the live fetch pipeline fails.

use once_cell::sync::Lazy;

use crate::api::FetchError;

/// One playable item with display metadata and a resolvable media URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    pub title: String,
    pub artist: String,
    pub media_url: String,
    pub cover_url: String,
    /// Advisory duration, used until the engine reports the decoded one.
    pub duration_secs: Option<f64>,
}

/// Ordered, non-empty sequence of tracks.
///
/// Constructed only through [`Playlist::from_tracks`], [`Playlist::builtin`]
/// or [`Playlist::fallback`], so a loaded playlist is never empty and index
/// arithmetic modulo `len()` is always defined.
#[derive(Debug, Clone)]
pub struct Playlist {
    tracks: Vec<Track>,
}

impl Playlist {
    /// Build a playlist, rejecting an empty track list.
    pub fn from_tracks(tracks: Vec<Track>) -> Option<Self> {
        if tracks.is_empty() {
            None
        } else {
            Some(Self { tracks })
        }
    }

    /// The compiled-in offline playlist.
    pub fn builtin() -> Self {
        Self {
            tracks: BUILTIN_TRACKS.clone(),
        }
    }

    /// Single known-good track substituted when the live fetch fails.
    pub fn fallback() -> Self {
        Self {
            tracks: vec![BUILTIN_TRACKS[0].clone()],
        }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Track at `index` on the circular playlist; wraps instead of failing.
    pub fn track_at(&self, index: usize) -> &Track {
        &self.tracks[index % self.tracks.len()]
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }
}

/// Result of the playlist loading phase: a playlist that is always usable,
/// plus a user-visible notice when the live fetch was replaced by the
/// fallback. Carrying the notice in the value means it is raised exactly
/// once, by whoever consumes the load.
#[derive(Debug)]
pub struct LoadedPlaylist {
    pub playlist: Playlist,
    pub notice: Option<String>,
}

impl LoadedPlaylist {
    /// Offline variant: the compiled-in playlist, no notice.
    pub fn builtin() -> Self {
        Self {
            playlist: Playlist::builtin(),
            notice: None,
        }
    }

    /// Convert the live fetch outcome, substituting the fallback playlist
    /// and a notice when the pipeline failed irrecoverably.
    pub fn from_result(result: Result<Playlist, FetchError>) -> Self {
        match result {
            Ok(playlist) => Self {
                playlist,
                notice: None,
            },
            Err(err) => {
                tracing::error!("Playlist fetch failed: {}", err);
                let notice = format!(
                    "Could not load the archive playlist ({}). Playing the built-in \
                     fallback track instead; check your network connection and retry.",
                    err
                );
                Self {
                    playlist: Playlist::fallback(),
                    notice: Some(notice),
                }
            }
        }
    }
}

static BUILTIN_TRACKS: Lazy<Vec<Track>> = Lazy::new(|| {
    vec![
        Track {
            title: "Neon Dreams".to_string(),
            artist: "Cyber Pulse".to_string(),
            media_url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-1.mp3".to_string(),
            cover_url: "https://images.unsplash.com/photo-1557672172-298e090bd0f1?w=500"
                .to_string(),
            duration_secs: None,
        },
        Track {
            title: "Midnight Drive".to_string(),
            artist: "Lunar Waves".to_string(),
            media_url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-2.mp3".to_string(),
            cover_url: "https://images.unsplash.com/photo-1500468756762-a401b6f17b46?w=500"
                .to_string(),
            duration_secs: None,
        },
        Track {
            title: "Echoes of You".to_string(),
            artist: "Stellar Dust".to_string(),
            media_url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-3.mp3".to_string(),
            cover_url: "https://images.unsplash.com/photo-1617791160505-6f00504e3519?w=500"
                .to_string(),
            duration_secs: None,
        },
        Track {
            title: "Floating City".to_string(),
            artist: "Nova Sky".to_string(),
            media_url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-13.mp3".to_string(),
            cover_url: "https://images.unsplash.com/photo-1553356084-58ef4a67b2a7?w=500"
                .to_string(),
            duration_secs: None,
        },
        Track {
            title: "Starlight Code".to_string(),
            artist: "Digital Drift".to_string(),
            media_url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-8.mp3".to_string(),
            cover_url: "https://i.scdn.co/image/ab67616d00001e029a334672f136c625433edc57"
                .to_string(),
            duration_secs: None,
        },
        Track {
            title: "Pulse Horizon".to_string(),
            artist: "Neon Collective".to_string(),
            media_url: "https://www.soundhelix.com/examples/mp3/SoundHelix-Song-4.mp3".to_string(),
            cover_url: "https://images.unsplash.com/photo-1553356084-58ef4a67b2a7?w=300"
                .to_string(),
            duration_secs: None,
        },
    ]
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_playlist_has_six_valid_tracks() {
        let playlist = Playlist::builtin();
        assert_eq!(playlist.len(), 6);
        for track in playlist.tracks() {
            assert!(!track.title.is_empty(), "every track needs a title");
            assert!(
                track.media_url.starts_with("https://"),
                "media URL must be resolvable: {}",
                track.media_url
            );
            assert!(!track.cover_url.is_empty(), "every track needs a cover");
        }
    }

    #[test]
    fn fallback_playlist_is_a_single_known_good_track() {
        let playlist = Playlist::fallback();
        assert_eq!(playlist.len(), 1);
        assert_eq!(playlist.track_at(0).title, "Neon Dreams");
    }

    #[test]
    fn from_tracks_rejects_empty_input() {
        assert!(Playlist::from_tracks(Vec::new()).is_none());
    }

    #[test]
    fn track_at_wraps_around() {
        let playlist = Playlist::builtin();
        assert_eq!(playlist.track_at(6).title, playlist.track_at(0).title);
    }

    #[test]
    fn successful_load_carries_no_notice() {
        let loaded = LoadedPlaylist::from_result(Ok(Playlist::builtin()));
        assert_eq!(loaded.playlist.len(), 6);
        assert!(loaded.notice.is_none(), "no notice on success");
    }

    #[test]
    fn failed_load_substitutes_fallback_with_one_notice() {
        let loaded = LoadedPlaylist::from_result(Err(FetchError::NoResults));
        assert_eq!(
            loaded.playlist.len(),
            1,
            "fallback playlist has exactly one track"
        );
        let notice = loaded.notice.expect("failure must surface a notice");
        assert!(
            notice.contains("no results"),
            "notice should describe the failure: {}",
            notice
        );
    }
}
