//! # keywatch-core
//!
//! Backend library for keywatch, a terminal monitor for currently-held MIDI
//! keys. Provides MIDI input handling, message decoding, the view model,
//! and configuration — independent of any UI framework.
//!
//! ## Module Overview
//!
//! - [`midi`] — `MidiInputManager` (port enumeration and connection over
//!   midir) and the pure `parse_key_event` byte decoder
//! - [`state`] — `ViewState`: connection status, pressed notes, input names
//! - [`notes`] — MIDI note number to pitch name formatting
//! - [`config`] — TOML configuration loading (embedded + user override)

pub mod config;
pub mod midi;
pub mod notes;
pub mod state;

pub use midi::{parse_key_event, KeyEvent, MidiInputManager};
pub use state::{ConnectionState, ViewState};
