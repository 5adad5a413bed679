//! Interactive console front-end.
//!
//! Reads commands from stdin, maps each line to a player transition, and
//! prints state changes back. A 500ms ticker polls the engine for progress
//! so auto-advance and the status line stay current without user input.

use std::time::Duration;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::audio::{AudioEvent, AudioEventReceiver};
use crate::player::Player;

const TICK_INTERVAL: Duration = Duration::from_millis(500);
const BAR_WIDTH: usize = 24;

/// One parsed line of user input.
#[derive(Debug, Clone, PartialEq)]
enum Intent {
    Play,
    Pause,
    Toggle,
    Next,
    Previous,
    Select(usize),
    Seek(f32),
    Volume(f32),
    Mute,
    List,
    Status,
    Help,
    Quit,
}

/// Drive the player until the user quits or stdin closes.
pub async fn run(player: &mut Player, mut events: AudioEventReceiver) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut ticker = tokio::time::interval(TICK_INTERVAL);

    print_now_playing(player);
    print_help();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line.context("failed to read from stdin")? {
                    Some(line) => {
                        if !handle_line(player, line.trim()) {
                            break;
                        }
                    }
                    // stdin closed
                    None => break,
                }
            }
            event = events.recv() => {
                match event {
                    Some(event) => apply_event(player, event),
                    None => {
                        tracing::error!("Audio engine stopped unexpectedly");
                        break;
                    }
                }
            }
            _ = ticker.tick() => player.tick(),
        }
    }

    Ok(())
}

/// Returns false when the user asked to quit.
fn handle_line(player: &mut Player, line: &str) -> bool {
    if line.is_empty() {
        return true;
    }
    let Some(intent) = parse_intent(line) else {
        println!("Unknown command: {:?} (try \"help\")", line);
        return true;
    };

    match intent {
        Intent::Play => {
            player.play();
            print_transport(player);
        }
        Intent::Pause => {
            player.pause();
            print_transport(player);
        }
        Intent::Toggle => {
            player.toggle_playback();
            print_transport(player);
        }
        Intent::Next => {
            player.next();
            print_now_playing(player);
        }
        Intent::Previous => {
            player.previous();
            print_now_playing(player);
        }
        Intent::Select(index) => {
            player.select_track(index);
            print_now_playing(player);
        }
        Intent::Seek(fraction) => player.seek(fraction),
        Intent::Volume(fraction) => {
            player.set_volume(fraction);
            print_volume(player);
        }
        Intent::Mute => {
            player.toggle_mute();
            print_volume(player);
        }
        Intent::List => print_playlist(player),
        Intent::Status => print_status(player),
        Intent::Help => print_help(),
        Intent::Quit => return false,
    }
    true
}

/// Fold an engine event into the player and announce visible changes.
fn apply_event(player: &mut Player, event: AudioEvent) {
    let before = player.state().clone();
    player.handle_event(event);
    let after = player.state();

    if after.current_index != before.current_index {
        print_now_playing(player);
    } else if after.playing != before.playing {
        print_transport(player);
    }
}

fn parse_intent(line: &str) -> Option<Intent> {
    let mut words = line.split_whitespace();
    let head = words.next()?.to_ascii_lowercase();
    let arg = words.next();

    let intent = match head.as_str() {
        "play" => Intent::Play,
        "pause" => Intent::Pause,
        "p" | "toggle" => Intent::Toggle,
        "next" | "n" => Intent::Next,
        "prev" | "previous" | "b" => Intent::Previous,
        // Playlist entries are numbered from 1 in every listing we print.
        "track" | "t" => Intent::Select(arg?.parse::<usize>().ok()?.checked_sub(1)?),
        "seek" | "s" => Intent::Seek(parse_percent(arg?)?),
        "volume" | "vol" | "v" => Intent::Volume(parse_percent(arg?)?),
        "mute" | "m" => Intent::Mute,
        "list" | "ls" | "l" => Intent::List,
        "status" | "st" => Intent::Status,
        "help" | "h" | "?" => Intent::Help,
        "quit" | "exit" | "q" => Intent::Quit,
        _ => return None,
    };
    Some(intent)
}

/// Accepts "50", "50%", or "0.5", yielding a fraction. Values above 1 are
/// read as percentages.
fn parse_percent(raw: &str) -> Option<f32> {
    let value: f32 = raw.trim_end_matches('%').parse().ok()?;
    if value > 1.0 {
        Some(value / 100.0)
    } else {
        Some(value)
    }
}

// ============ Output ============

fn print_now_playing(player: &Player) {
    let track = player.current_track();
    println!(
        "Now playing [{}/{}]: {} - {}",
        player.state().current_index + 1,
        player.playlist().len(),
        track.artist,
        track.title,
    );
}

fn print_transport(player: &Player) {
    println!("{}", if player.state().playing { "Playing" } else { "Paused" });
}

fn print_volume(player: &Player) {
    let shown = (player.display_volume() * 100.0).round() as u32;
    if player.state().muted {
        println!("Volume: {}% (muted)", shown);
    } else {
        println!("Volume: {}%", shown);
    }
}

fn print_playlist(player: &Player) {
    for (i, track) in player.playlist().tracks().iter().enumerate() {
        let marker = if i == player.state().current_index { '>' } else { ' ' };
        println!("{} {:>2}. {} - {}", marker, i + 1, track.artist, track.title);
    }
}

fn print_status(player: &Player) {
    let state = player.state();
    println!(
        "{} [{}] {} / {}  vol {}%{}",
        if state.playing { "Playing" } else { "Paused " },
        progress_bar(player.progress()),
        player.elapsed_label(),
        player.duration_label(),
        (player.display_volume() * 100.0).round() as u32,
        if state.muted { " (muted)" } else { "" },
    );
}

fn print_help() {
    println!("Commands:");
    println!("  play | pause | p        start, stop, or toggle playback");
    println!("  next | prev             change track (wraps around)");
    println!("  track N                 jump to playlist entry N");
    println!("  seek PCT                move within the track, e.g. seek 50");
    println!("  vol PCT                 set volume, e.g. vol 80");
    println!("  mute                    toggle mute");
    println!("  list | status | help    show playlist, transport, this text");
    println!("  quit                    exit");
}

/// Fixed-width progress bar, hollow while the track length is unknown.
fn progress_bar(progress: Option<f64>) -> String {
    let filled = progress
        .map(|p| (p * BAR_WIDTH as f64).round() as usize)
        .unwrap_or(0)
        .min(BAR_WIDTH);
    let mut bar = String::with_capacity(BAR_WIDTH);
    for i in 0..BAR_WIDTH {
        bar.push(if i < filled { '=' } else { '-' });
    }
    bar
}
