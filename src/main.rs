//! Shellac - a console player for the Internet Archive's 78rpm collection
//!
//! Fetches the most-downloaded digitized 78rpm records from the archive's
//! search API, resolves each to a playable MP3, and plays them through a
//! small interactive console. Falls back to a built-in playlist when the
//! archive is unreachable.

mod api;
mod audio;
mod console;
mod player;
mod playlist;
mod utils;

use anyhow::{Context, Result};

use crate::api::ArchiveClient;
use crate::audio::spawn_engine;
use crate::player::Player;
use crate::playlist::LoadedPlaylist;

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they never tear the interactive prompt.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shellac=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let loaded = load_playlist().await?;
    if let Some(notice) = &loaded.notice {
        println!("{}", notice);
    }

    let mut engine = spawn_engine()?;
    let events = engine
        .take_events()
        .context("audio engine events already taken")?;

    let mut player = Player::new(loaded.playlist, engine.commands());
    player.load_current();

    console::run(&mut player, events).await
}

/// Fetch the archive playlist, or use the built-in one when `--offline` is
/// given. Fetch failures land in the returned notice, not in `Err`.
async fn load_playlist() -> Result<LoadedPlaylist> {
    if std::env::args().any(|arg| arg == "--offline") {
        tracing::info!("Offline mode: using the built-in playlist");
        return Ok(LoadedPlaylist::builtin());
    }

    let client = ArchiveClient::new().context("failed to set up the archive client")?;
    println!("Fetching playlist from the Internet Archive...");
    Ok(LoadedPlaylist::from_result(client.fetch_playlist().await))
}
