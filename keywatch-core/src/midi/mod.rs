use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};

use midir::{Ignore, MidiInput, MidiInputConnection};

/// A decoded key press or release from a MIDI input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyEvent {
    Pressed { note: u8, velocity: u8 },
    Released { note: u8 },
}

/// How a failed access request is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessFailure {
    Denied,
    Other,
}

/// Classify an access-request error by its text. midir surfaces backend
/// errors as strings, so permission problems are recognized by wording.
pub fn classify_access_error(err: &str) -> AccessFailure {
    let lower = err.to_ascii_lowercase();
    if lower.contains("denied") || lower.contains("permission") {
        AccessFailure::Denied
    } else {
        AccessFailure::Other
    }
}

/// Information about an available MIDI input port
#[derive(Debug, Clone)]
pub struct MidiPortInfo {
    pub id: String,
    pub name: String,
}

/// MIDI input manager. Connects every available input port to one shared
/// event channel, so all devices feed the same handler.
pub struct MidiInputManager {
    client_name: String,
    connections: Vec<(String, MidiInputConnection<()>)>,
    attached_ids: HashSet<String>,
    event_sender: Sender<KeyEvent>,
    event_receiver: Receiver<KeyEvent>,
    available_ports: Vec<MidiPortInfo>,
}

impl MidiInputManager {
    /// Create a manager, probing the MIDI backend once. An error here means
    /// the platform has no usable MIDI support.
    pub fn new(client_name: &str) -> Result<Self, String> {
        MidiInput::new(client_name).map_err(|e| e.to_string())?;
        let (tx, rx) = mpsc::channel();
        Ok(Self {
            client_name: client_name.to_string(),
            connections: Vec::new(),
            attached_ids: HashSet::new(),
            event_sender: tx,
            event_receiver: rx,
            available_ports: Vec::new(),
        })
    }

    /// Refresh the port list and attach any input ports that are not yet
    /// connected. Ports are tracked by id, so an already-attached port is
    /// never rebound. Succeeds with zero ports.
    pub fn scan_and_attach(&mut self) -> Result<(), String> {
        self.refresh_ports()?;
        self.attach_new_ports()
    }

    /// Currently enumerated input ports, in backend order.
    pub fn list_ports(&self) -> &[MidiPortInfo] {
        &self.available_ports
    }

    /// Drain pending decoded key events (non-blocking).
    pub fn poll_events(&self) -> Vec<KeyEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.event_receiver.try_recv() {
            events.push(event);
        }
        events
    }

    /// Create a midir client with sysex disabled.
    fn client(&self) -> Result<MidiInput, String> {
        let mut midi_in = MidiInput::new(&self.client_name).map_err(|e| e.to_string())?;
        midi_in.ignore(Ignore::Sysex);
        Ok(midi_in)
    }

    fn refresh_ports(&mut self) -> Result<(), String> {
        let midi_in = self.client()?;
        self.available_ports.clear();
        for port in midi_in.ports() {
            if let Ok(name) = midi_in.port_name(&port) {
                self.available_ports.push(MidiPortInfo {
                    id: port.id(),
                    name,
                });
            }
        }
        Ok(())
    }

    fn attach_new_ports(&mut self) -> Result<(), String> {
        // midir consumes the client on connect, so each new port gets its
        // own client; they all share one event sender.
        let pending: Vec<String> = self
            .available_ports
            .iter()
            .map(|p| p.id.clone())
            .filter(|id| !self.attached_ids.contains(id))
            .collect();

        for id in pending {
            let midi_in = self.client()?;
            let Some(port) = midi_in.ports().into_iter().find(|p| p.id() == id) else {
                // Port vanished between enumeration and connect
                continue;
            };
            let port_name = midi_in
                .port_name(&port)
                .unwrap_or_else(|_| "Unknown".to_string());

            let tx = self.event_sender.clone();
            match midi_in.connect(
                &port,
                "keywatch-input",
                move |_timestamp, message, _| {
                    if let Some(event) = parse_key_event(message) {
                        let _ = tx.send(event);
                    }
                },
                (),
            ) {
                Ok(conn) => {
                    log::info!("attached MIDI input: {}", port_name);
                    self.attached_ids.insert(id.clone());
                    self.connections.push((id, conn));
                }
                Err(e) => {
                    log::warn!("could not attach {}: {}", port_name, e);
                }
            }
        }
        Ok(())
    }

    fn disconnect_all(&mut self) {
        for (_, conn) in self.connections.drain(..) {
            conn.close();
        }
        self.attached_ids.clear();
    }
}

impl Drop for MidiInputManager {
    fn drop(&mut self) {
        self.disconnect_all();
    }
}

/// Decode a raw MIDI message into a key event. Only note on/off on
/// channels 0 and 9 are recognized; note-on with velocity 0 is the
/// conventional note-off. Everything else (short messages, other statuses,
/// other channels) is dropped.
pub fn parse_key_event(data: &[u8]) -> Option<KeyEvent> {
    if data.len() < 3 {
        return None;
    }

    let status = data[0];
    let channel = status & 0x0F;
    if channel != 0 && channel != 9 {
        return None;
    }

    match status & 0xF0 {
        0x80 => Some(KeyEvent::Released { note: data[1] }),
        0x90 => {
            let velocity = data[2];
            if velocity == 0 {
                Some(KeyEvent::Released { note: data[1] })
            } else {
                Some(KeyEvent::Pressed {
                    note: data[1],
                    velocity,
                })
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_on() {
        let data = [0x90, 60, 100];
        assert_eq!(
            parse_key_event(&data),
            Some(KeyEvent::Pressed {
                note: 60,
                velocity: 100
            })
        );
    }

    #[test]
    fn test_parse_note_off() {
        let data = [0x80, 60, 64];
        assert_eq!(parse_key_event(&data), Some(KeyEvent::Released { note: 60 }));
    }

    #[test]
    fn test_parse_note_on_velocity_zero_is_release() {
        let data = [0x90, 60, 0];
        assert_eq!(parse_key_event(&data), Some(KeyEvent::Released { note: 60 }));
    }

    #[test]
    fn test_parse_channel_9_accepted() {
        let data = [0x99, 36, 90];
        assert_eq!(
            parse_key_event(&data),
            Some(KeyEvent::Pressed {
                note: 36,
                velocity: 90
            })
        );
        let data = [0x89, 36, 0];
        assert_eq!(parse_key_event(&data), Some(KeyEvent::Released { note: 36 }));
    }

    #[test]
    fn test_parse_other_channels_ignored() {
        assert!(parse_key_event(&[0x91, 60, 100]).is_none());
        assert!(parse_key_event(&[0x85, 60, 0]).is_none());
        assert!(parse_key_event(&[0x9F, 60, 100]).is_none());
    }

    #[test]
    fn test_parse_short_messages_return_none() {
        assert!(parse_key_event(&[]).is_none());
        assert!(parse_key_event(&[0x90]).is_none());
        assert!(parse_key_event(&[0x90, 60]).is_none());
    }

    #[test]
    fn test_parse_other_statuses_return_none() {
        // CC, program change, pitch bend, sysex
        assert!(parse_key_event(&[0xB0, 1, 64]).is_none());
        assert!(parse_key_event(&[0xC0, 5, 0]).is_none());
        assert!(parse_key_event(&[0xE0, 0x00, 0x40]).is_none());
        assert!(parse_key_event(&[0xF0, 0x01, 0xF7]).is_none());
    }

    #[test]
    fn test_classify_permission_errors() {
        assert_eq!(
            classify_access_error("Permission denied (EPERM)"),
            AccessFailure::Denied
        );
        assert_eq!(
            classify_access_error("access DENIED by policy"),
            AccessFailure::Denied
        );
    }

    #[test]
    fn test_classify_other_errors() {
        assert_eq!(
            classify_access_error("could not open ALSA sequencer"),
            AccessFailure::Other
        );
        assert_eq!(classify_access_error(""), AccessFailure::Other);
    }
}
