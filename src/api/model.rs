//! Response models for the Internet Archive search and metadata APIs, and
//! the pure steps that turn one search hit plus its metadata into a track.
//!
//! Everything here is I/O free. The client in `archive.rs` feeds parsed
//! responses through [`collect_tracks`], which encodes the per-item
//! isolation policy: a bad item skips that item, never the batch.

use serde::Deserialize;

use crate::playlist::Track;

/// Download URL prefix; identifier and percent-encoded filename follow.
const DOWNLOAD_BASE: &str = "https://archive.org/download/";
/// Thumbnail service used when an item declares no `misc.image`.
const ITEM_IMAGE_BASE: &str = "https://archive.org/services/img/";

/// Format tag preferred when picking a file out of an item.
const PREFERRED_FORMAT: &str = "VBR MP3";
/// Extension accepted when no file carries the preferred tag.
const AUDIO_EXTENSION: &str = ".mp3";

/// Duration assumed when an item's files declare none.
const DEFAULT_DURATION_SECS: f64 = 300.0;

const UNKNOWN_TITLE: &str = "Unknown Title";
const UNKNOWN_ARTIST: &str = "Unknown Artist";

// ============ Search response ============

#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    pub response: SearchBody,
}

#[derive(Debug, Deserialize)]
pub struct SearchBody {
    #[serde(default)]
    pub docs: Vec<SearchDoc>,
}

/// One search hit, projected down to the fields requested via `fl[]`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchDoc {
    pub identifier: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub creator: Option<Creator>,
    /// Projected by the search but not displayed yet.
    #[allow(dead_code)]
    #[serde(default)]
    pub date: Option<String>,
}

/// Creator fields come back as a plain string or a list of names.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Creator {
    One(String),
    Many(Vec<String>),
}

impl Creator {
    /// First listed name, if any.
    pub fn first(&self) -> Option<&str> {
        match self {
            Creator::One(name) => Some(name.as_str()),
            Creator::Many(names) => names.first().map(String::as_str),
        }
    }
}

// ============ Metadata response ============

#[derive(Debug, Default, Deserialize)]
pub struct ItemMetadata {
    #[serde(default)]
    pub files: Vec<FileEntry>,
    #[serde(default)]
    pub metadata: Option<ItemFields>,
    #[serde(default)]
    pub misc: Option<MiscFields>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FileEntry {
    pub name: String,
    #[serde(default)]
    pub format: Option<String>,
    #[allow(dead_code)]
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub length: Option<TrackLength>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ItemFields {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub creator: Option<Creator>,
}

#[derive(Debug, Default, Deserialize)]
pub struct MiscFields {
    #[serde(default)]
    pub image: Option<String>,
}

/// File lengths appear as a number of seconds, a numeric string, or a
/// `HH:MM:SS`/`MM:SS` clock, depending on which derive tool wrote the item.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TrackLength {
    Seconds(f64),
    Text(String),
}

impl TrackLength {
    /// Length in seconds; `None` when the field is unusable.
    pub fn as_secs(&self) -> Option<f64> {
        match self {
            TrackLength::Seconds(secs) if secs.is_finite() && *secs >= 0.0 => Some(*secs),
            TrackLength::Seconds(_) => None,
            TrackLength::Text(text) => parse_clock(text),
        }
    }
}

/// Parse `SS(.f)`, `MM:SS` or `HH:MM:SS` into seconds.
fn parse_clock(text: &str) -> Option<f64> {
    let text = text.trim();
    if text.is_empty() || text.split(':').count() > 3 {
        return None;
    }
    let mut total = 0.0;
    for part in text.split(':') {
        let value: f64 = part.trim().parse().ok()?;
        if !value.is_finite() || value < 0.0 {
            return None;
        }
        total = total * 60.0 + value;
    }
    Some(total)
}

// ============ Track assembly ============

/// Pick the playable file from an item's file list.
///
/// Precedence: the first file tagged with the preferred encoding, else the
/// first file with the right extension regardless of tag. `None` means the
/// item contributes no track.
pub fn pick_playable_file(files: &[FileEntry]) -> Option<&FileEntry> {
    files
        .iter()
        .find(|file| file.format.as_deref() == Some(PREFERRED_FORMAT))
        .or_else(|| {
            files
                .iter()
                .find(|file| file.name.to_ascii_lowercase().ends_with(AUDIO_EXTENSION))
        })
}

/// Build a playable track from one search hit and its metadata.
///
/// Returns `None` when the item has no playable file. Display fields fall
/// back through search hit, item metadata, then a literal default; empty
/// strings count as missing.
pub fn assemble_track(doc: &SearchDoc, meta: &ItemMetadata) -> Option<Track> {
    let file = pick_playable_file(&meta.files)?;
    let fields = meta.metadata.as_ref();

    let title = non_empty(doc.title.as_deref())
        .or_else(|| non_empty(fields.and_then(|f| f.title.as_deref())))
        .unwrap_or(UNKNOWN_TITLE)
        .to_string();

    let artist = non_empty(doc.creator.as_ref().and_then(Creator::first))
        .or_else(|| non_empty(fields.and_then(|f| f.creator.as_ref()).and_then(Creator::first)))
        .unwrap_or(UNKNOWN_ARTIST)
        .to_string();

    let media_url = format!(
        "{}{}/{}",
        DOWNLOAD_BASE,
        doc.identifier,
        urlencoding::encode(&file.name)
    );

    let cover_url = meta
        .misc
        .as_ref()
        .and_then(|misc| non_empty(misc.image.as_deref()))
        .map(str::to_string)
        .unwrap_or_else(|| format!("{}{}", ITEM_IMAGE_BASE, doc.identifier));

    let duration_secs = file
        .length
        .as_ref()
        .and_then(TrackLength::as_secs)
        .unwrap_or(DEFAULT_DURATION_SECS);

    Some(Track {
        title,
        artist,
        media_url,
        cover_url,
        duration_secs: Some(duration_secs),
    })
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Fold per-item resolution outcomes into the final track list.
///
/// One failed item skips only that item; order is otherwise preserved.
pub fn collect_tracks<I, E>(items: I) -> Vec<Track>
where
    I: IntoIterator<Item = (SearchDoc, Result<ItemMetadata, E>)>,
    E: std::fmt::Display,
{
    let mut tracks = Vec::new();
    for (doc, outcome) in items {
        match outcome {
            Ok(meta) => match assemble_track(&doc, &meta) {
                Some(track) => {
                    tracing::debug!("Resolved {}: {} - {}", doc.identifier, track.artist, track.title);
                    tracks.push(track);
                }
                None => {
                    tracing::warn!("No playable file in {}, skipping", doc.identifier);
                }
            },
            Err(err) => {
                tracing::warn!("Metadata lookup failed for {}: {}, skipping", doc.identifier, err);
            }
        }
    }
    tracks
}
