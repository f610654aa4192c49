//! MIDI note number to pitch name formatting.

/// Pitch-class names starting at C.
const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Format a MIDI note number as pitch class + octave, with note 60 = "C4".
/// Input is assumed to be in range 0-127.
pub fn note_name(note: u8) -> String {
    let octave = (note / 12) as i8 - 1;
    format!("{}{}", NOTE_NAMES[(note % 12) as usize], octave)
}
