//! View model: connection status, pressed notes, input names.

use std::collections::BTreeMap;

use crate::midi::KeyEvent;

/// Connection status of the MIDI backend, driving the status banner.
///
/// `Idle` offers the connect action; `Unsupported` is set once at startup
/// when the backend cannot be initialized; `Denied` and `Error` are
/// terminal, with no retry offered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    #[default]
    Idle,
    Requesting,
    Ready,
    Unsupported,
    Denied,
    Error,
}

/// All state the view renders. Owned by the UI loop; nothing persists.
#[derive(Debug, Default)]
pub struct ViewState {
    pub connection: ConnectionState,
    /// note number -> velocity for currently held keys
    pressed: BTreeMap<u8, u8>,
    /// Names of available MIDI input ports, in enumeration order
    pub input_names: Vec<String>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sole mutation entry point for the pressed-note map. There is no
    /// "all notes off" handling: a note stuck by a device disconnect stays
    /// until the process exits.
    pub fn apply(&mut self, event: KeyEvent) {
        match event {
            KeyEvent::Pressed { note, velocity } => {
                self.pressed.insert(note, velocity);
            }
            KeyEvent::Released { note } => {
                self.pressed.remove(&note);
            }
        }
    }

    /// Held notes as (note, velocity), ascending by note number.
    pub fn pressed_notes(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        self.pressed.iter().map(|(&note, &velocity)| (note, velocity))
    }

    pub fn no_notes_held(&self) -> bool {
        self.pressed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle_and_empty() {
        let state = ViewState::new();
        assert_eq!(state.connection, ConnectionState::Idle);
        assert!(state.no_notes_held());
        assert!(state.input_names.is_empty());
    }

    #[test]
    fn test_press_inserts_note_and_velocity() {
        let mut state = ViewState::new();
        state.apply(KeyEvent::Pressed {
            note: 60,
            velocity: 101,
        });
        assert_eq!(state.pressed_notes().collect::<Vec<_>>(), vec![(60, 101)]);
    }

    #[test]
    fn test_release_removes_note() {
        let mut state = ViewState::new();
        state.apply(KeyEvent::Pressed {
            note: 60,
            velocity: 101,
        });
        state.apply(KeyEvent::Released { note: 60 });
        assert!(state.no_notes_held());
    }

    #[test]
    fn test_release_of_unpressed_note_is_noop() {
        let mut state = ViewState::new();
        state.apply(KeyEvent::Released { note: 60 });
        assert!(state.no_notes_held());
    }

    #[test]
    fn test_repress_updates_velocity() {
        let mut state = ViewState::new();
        state.apply(KeyEvent::Pressed {
            note: 60,
            velocity: 40,
        });
        state.apply(KeyEvent::Pressed {
            note: 60,
            velocity: 90,
        });
        assert_eq!(state.pressed_notes().collect::<Vec<_>>(), vec![(60, 90)]);
    }

    #[test]
    fn test_notes_iterate_ascending_regardless_of_press_order() {
        let mut state = ViewState::new();
        for note in [64, 60, 67] {
            state.apply(KeyEvent::Pressed {
                note,
                velocity: 100,
            });
        }
        let order: Vec<u8> = state.pressed_notes().map(|(n, _)| n).collect();
        assert_eq!(order, vec![60, 64, 67]);
    }
}
