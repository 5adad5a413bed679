//! Playback engine thread
//!
//! A dedicated thread owns the rodio output stream and the current sink,
//! processing [`AudioCommand`]s and answering with [`AudioEvent`]s. Media
//! bytes are fetched here too, so the engine owns its own transport and the
//! player never blocks on a download.

use std::io::Cursor;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use anyhow::{Context, Result};
use rodio::{Decoder, OutputStream, OutputStreamBuilder, Sink, Source, mixer::Mixer};

use super::events::{
    AudioCommand, AudioCommandReceiver, AudioCommandSender, AudioEvent, AudioEventReceiver,
    AudioEventSender, audio_command_channel, audio_event_channel,
};

static USER_AGENT: &str = concat!("shellac/", env!("CARGO_PKG_VERSION"));

/// Handle returned by [`spawn_engine`].
///
/// Cloning the command sender is how the rest of the program talks to the
/// engine; dropping the handle asks the thread to exit.
pub struct EngineHandle {
    commands: AudioCommandSender,
    events: Option<AudioEventReceiver>,
    #[allow(dead_code)]
    thread: Option<JoinHandle<()>>,
}

impl EngineHandle {
    pub fn commands(&self) -> AudioCommandSender {
        self.commands.clone()
    }

    /// Take the event receiver. Yields `None` after the first call.
    pub fn take_events(&mut self) -> Option<AudioEventReceiver> {
        self.events.take()
    }
}

impl Drop for EngineHandle {
    fn drop(&mut self) {
        let _ = self.commands.send(AudioCommand::Shutdown);
    }
}

/// Spawn the audio engine thread.
///
/// The rodio stream is opened inside the thread; an unopenable output
/// device surfaces as [`AudioEvent::Error`] rather than a spawn failure.
pub fn spawn_engine() -> Result<EngineHandle> {
    let (command_tx, command_rx) = audio_command_channel();
    let (event_tx, event_rx) = audio_event_channel();

    let thread = thread::Builder::new()
        .name("audio-engine".to_string())
        .spawn(move || match Engine::open(event_tx.clone()) {
            Ok(mut engine) => engine.run(command_rx),
            Err(err) => {
                tracing::error!("Failed to open audio output: {:#}", err);
                let _ = event_tx.send(AudioEvent::Error {
                    message: err.to_string(),
                });
            }
        })
        .context("failed to spawn audio engine thread")?;

    Ok(EngineHandle {
        commands: command_tx,
        events: Some(event_rx),
        thread: Some(thread),
    })
}

struct Engine {
    // Keeps the output device open; sinks connect through the mixer.
    _stream: OutputStream,
    mixer: Mixer,
    http: reqwest::blocking::Client,
    events: AudioEventSender,
    sink: Option<Sink>,
    duration: Option<Duration>,
    volume: f32,
    muted: bool,
    finished_sent: bool,
}

impl Engine {
    fn open(events: AudioEventSender) -> Result<Self> {
        let stream = OutputStreamBuilder::open_default_stream()
            .context("no usable audio output device")?;
        let mixer = stream.mixer().clone();
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("failed to build media download client")?;

        Ok(Self {
            _stream: stream,
            mixer,
            http,
            events,
            sink: None,
            duration: None,
            volume: 1.0,
            muted: false,
            finished_sent: false,
        })
    }

    /// Process commands until Shutdown or the channel closes.
    fn run(&mut self, mut commands: AudioCommandReceiver) {
        tracing::info!("Audio engine started");

        while let Some(cmd) = commands.blocking_recv() {
            match cmd {
                AudioCommand::Load { url } => self.handle_load(url),
                AudioCommand::Play => self.handle_play(),
                AudioCommand::Pause => {
                    if let Some(sink) = &self.sink {
                        sink.pause();
                    }
                }
                AudioCommand::Seek { position } => self.handle_seek(position),
                AudioCommand::SetVolume { volume } => {
                    self.volume = volume.clamp(0.0, 1.0);
                    self.apply_volume();
                }
                AudioCommand::SetMuted { muted } => {
                    self.muted = muted;
                    self.apply_volume();
                }
                AudioCommand::Tick => self.handle_tick(),
                AudioCommand::Shutdown => break,
            }
        }

        tracing::info!("Audio engine stopped");
    }

    fn handle_load(&mut self, url: String) {
        // Drop the old sink first so a slow download never plays over it.
        self.sink = None;
        self.duration = None;
        self.finished_sent = false;

        match self.fetch_and_decode(&url) {
            Ok((sink, duration)) => {
                tracing::debug!("Loaded {} ({:?})", url, duration);
                self.duration = duration;
                self.sink = Some(sink);
                let _ = self.events.send(AudioEvent::TrackLoaded { duration });
            }
            Err(err) => {
                tracing::warn!("Failed to load {}: {:#}", url, err);
                let _ = self.events.send(AudioEvent::LoadFailed {
                    url,
                    reason: err.to_string(),
                });
            }
        }
    }

    /// Download and decode a track into a paused sink, ready to start.
    fn fetch_and_decode(&self, url: &str) -> Result<(Sink, Option<Duration>)> {
        let bytes = self
            .http
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.bytes())
            .context("media download failed")?;
        tracing::debug!("Downloaded {} bytes from {}", bytes.len(), url);

        let source =
            Decoder::new(Cursor::new(bytes)).context("unsupported or corrupt audio data")?;
        let duration = source.total_duration();

        let sink = Sink::connect_new(&self.mixer);
        sink.pause(); // start paused, ready for an instant Play
        sink.set_volume(self.effective_volume());
        sink.append(source);
        Ok((sink, duration))
    }

    fn handle_play(&mut self) {
        match &self.sink {
            Some(sink) => sink.play(),
            None => {
                tracing::warn!("Play requested with no loaded track");
                let _ = self.events.send(AudioEvent::PlaybackRejected {
                    reason: "no track loaded".to_string(),
                });
            }
        }
    }

    fn handle_seek(&mut self, position: Duration) {
        let Some(sink) = &self.sink else { return };
        match sink.try_seek(position) {
            // Report the new position immediately, even while paused.
            Ok(()) => {
                let _ = self.events.send(AudioEvent::TimeUpdate {
                    position,
                    duration: self.duration,
                });
            }
            Err(err) => tracing::warn!("Seek to {:?} failed: {}", position, err),
        }
    }

    fn apply_volume(&self) {
        if let Some(sink) = &self.sink {
            sink.set_volume(self.effective_volume());
        }
    }

    /// Volume actually applied to the sink; muting masks the stored value.
    fn effective_volume(&self) -> f32 {
        if self.muted { 0.0 } else { self.volume }
    }

    fn handle_tick(&mut self) {
        let Some(sink) = &self.sink else { return };

        if sink.empty() {
            // The queued source drained: natural end of track.
            if !self.finished_sent {
                self.finished_sent = true;
                let _ = self.events.send(AudioEvent::Finished);
            }
            return;
        }

        if !sink.is_paused() {
            let _ = self.events.send(AudioEvent::TimeUpdate {
                position: sink.get_pos(),
                duration: self.duration,
            });
        }
    }
}
