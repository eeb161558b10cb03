use std::sync::Arc;

use ratatui::Frame;
use rodio::{OutputStream, OutputStreamBuilder};
use tracing::{error, info};

use crate::{
    audio::{
        sink::DeviceSink,
        state::{PlaybackStatus, SelectedTrack},
        system::AudioSystem,
    },
    source::SoundCloud,
    ui::{
        input::InputHandler,
        message::AppMessage,
        screen,
        search::{OverlayOutcome, SearchOverlay},
        tui::{self, TerminalEvent},
    },
};

pub struct App {
    system: AudioSystem,
    overlay: Option<SearchOverlay>,
    should_quit: bool,
    // Keeps the output device open; not Send, so it lives with the
    // control thread while sessions talk to the device through the sink.
    _stream: OutputStream,
}

impl App {
    pub fn new() -> color_eyre::Result<Self> {
        let stream = OutputStreamBuilder::from_default_device()?.open_stream_or_fallback()?;
        let sink = Arc::new(DeviceSink::new(&stream));
        let source = Arc::new(SoundCloud::new()?);
        let system = AudioSystem::new(sink, source);

        // Simple deployments pass a track url directly.
        if let Some(url) = std::env::args().nth(1) {
            info!(url, "initial track from command line");
            system.state().select_track(SelectedTrack {
                title: url.clone(),
                url,
            });
        }

        Ok(Self {
            system,
            overlay: None,
            should_quit: false,
            _stream: stream,
        })
    }

    pub async fn run(&mut self) -> color_eyre::Result<()> {
        let mut tui = tui::Tui::new()?;
        tui.enter()?;

        while !self.should_quit {
            tui.draw(|f| self.render(f))?;

            if let Some(event) = tui.next().await {
                self.handle_event(event, &mut tui).await;
            }
        }

        // Quit joins the playback session and any in-flight download.
        self.system.shutdown().await;
        tui.exit()?;
        Ok(())
    }

    fn render(&self, frame: &mut Frame) {
        screen::render(frame, &self.system.snapshot());
        if let Some(overlay) = &self.overlay {
            overlay.render(frame, frame.area());
        }
    }

    async fn handle_event(&mut self, event: TerminalEvent, tui: &mut tui::Tui) {
        match event {
            TerminalEvent::Key(key) => self.handle_key(key, tui).await,
            TerminalEvent::Closed => {
                self.system.state().request_stop();
                self.should_quit = true;
            }
            TerminalEvent::Tick | TerminalEvent::Resize(_, _) => {}
        }
    }

    async fn handle_key(&mut self, key: ratatui::crossterm::event::KeyEvent, tui: &mut tui::Tui) {
        if self.overlay.is_some() {
            self.handle_overlay_key(key, tui).await;
            return;
        }

        match InputHandler::handle_key(key) {
            Some(AppMessage::Quit) => {
                self.system.state().request_stop();
                self.should_quit = true;
            }
            Some(AppMessage::TogglePlayPause) => match self.system.state().status() {
                PlaybackStatus::Streaming => self.system.toggle_pause(),
                PlaybackStatus::Idle => {
                    self.system.start_playback();
                }
                PlaybackStatus::Starting => {}
            },
            Some(AppMessage::Stop) => self.system.stop().await,
            Some(AppMessage::Download) => {
                self.system.start_download();
            }
            Some(AppMessage::OpenSearch) => {
                // Searching while a session is up is disallowed.
                if !self.system.state().is_active() {
                    self.overlay = Some(SearchOverlay::new());
                }
            }
            None => {}
        }
    }

    async fn handle_overlay_key(
        &mut self,
        key: ratatui::crossterm::event::KeyEvent,
        tui: &mut tui::Tui,
    ) {
        let Some(overlay) = &mut self.overlay else {
            return;
        };
        match overlay.on_key(key) {
            OverlayOutcome::Continue => {}
            OverlayOutcome::Close => self.overlay = None,
            OverlayOutcome::Submit(query) => {
                // One blocking search call; the control loop deliberately
                // waits for it, which is the overlay's modal contract. Show
                // the in-flight notice before parking on the call.
                let _ = tui.draw(|f| self.render(f));
                let source = self.system.source();
                match tokio::task::spawn_blocking(move || source.search(&query)).await {
                    Ok(result) => {
                        if let Some(overlay) = &mut self.overlay {
                            overlay.finish_search(result);
                        }
                    }
                    Err(e) => {
                        error!(error = %e, "search task failed");
                        self.overlay = None;
                    }
                }
            }
            OverlayOutcome::Commit(hit) => {
                info!(track = %hit.title, "track selected");
                self.system.state().select_track(SelectedTrack {
                    title: hit.title,
                    url: hit.url,
                });
                self.overlay = None;
            }
        }
    }
}
