use std::time::{Duration, Instant};

use keywatch_core::config::Config;
use keywatch_core::midi::{classify_access_error, AccessFailure, MidiInputManager};
use keywatch_core::state::{ConnectionState, ViewState};

/// Owns the view state and the MIDI input manager, and drives all state
/// transitions from the UI loop.
pub struct App {
    pub state: ViewState,
    midi: Option<MidiInputManager>,
    poll_interval: Duration,
    last_port_scan: Instant,
}

impl App {
    pub fn new(config: &Config) -> Self {
        let mut state = ViewState::new();
        let midi = match MidiInputManager::new(config.client_name()) {
            Ok(manager) => Some(manager),
            Err(e) => {
                log::warn!("MIDI backend unavailable: {}", e);
                state.connection = ConnectionState::Unsupported;
                None
            }
        };
        Self {
            state,
            midi,
            poll_interval: Duration::from_millis(config.port_poll_interval_ms()),
            last_port_scan: Instant::now(),
        }
    }

    /// User-triggered access request. Only acts while idle; a denied or
    /// failed request is terminal and is not re-offered.
    pub fn request_access(&mut self) {
        if self.state.connection != ConnectionState::Idle {
            return;
        }
        let Some(midi) = self.midi.as_mut() else {
            return;
        };

        self.state.connection = ConnectionState::Requesting;
        match midi.scan_and_attach() {
            Ok(()) => {
                self.state.connection = ConnectionState::Ready;
                self.state.input_names =
                    midi.list_ports().iter().map(|p| p.name.clone()).collect();
                log::info!(
                    "MIDI access granted, {} input(s)",
                    self.state.input_names.len()
                );
            }
            Err(e) => {
                log::warn!("MIDI access request failed: {}", e);
                self.state.connection = match classify_access_error(&e) {
                    AccessFailure::Denied => ConnectionState::Denied,
                    AccessFailure::Other => ConnectionState::Error,
                };
            }
        }
    }

    /// Per-iteration work: apply decoded key events, and while ready,
    /// rescan ports on the configured interval so new devices get attached
    /// and the name list stays current.
    pub fn tick(&mut self) {
        let Some(midi) = self.midi.as_mut() else {
            return;
        };

        for event in midi.poll_events() {
            self.state.apply(event);
        }

        if self.state.connection == ConnectionState::Ready
            && self.last_port_scan.elapsed() >= self.poll_interval
        {
            self.last_port_scan = Instant::now();
            match midi.scan_and_attach() {
                Ok(()) => {
                    self.state.input_names =
                        midi.list_ports().iter().map(|p| p.name.clone()).collect();
                }
                Err(e) => {
                    log::warn!("port rescan failed: {}", e);
                }
            }
        }
    }
}
