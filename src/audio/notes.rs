//! Frequency ↔ pitch number mapping and note naming.

use once_cell::sync::Lazy;

use crate::util::convert::ValueConvertor;
use crate::util::range::NumberRange;

/// Lowest pitch number that gets a name (A0).
pub const LOWEST_NAMED_PITCH: i32 = 21;

const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "Eb", "E", "F", "F#", "G", "Ab", "A", "Bb", "B",
];

// Equal temperament: pitch is affine in log-frequency, 220 Hz -> 57, 440 Hz -> 69.
static FREQUENCY_TO_PITCH: Lazy<ValueConvertor> = Lazy::new(|| {
    ValueConvertor::fitting_range_to_after(
        &NumberRange::new(220.0, 440.0),
        &NumberRange::new(57.0, 69.0),
        &ValueConvertor::log(),
    )
    .expect("octave calibration range is non-degenerate")
});

pub fn frequency_to_pitch() -> &'static ValueConvertor {
    &FREQUENCY_TO_PITCH
}

/// Nearest whole pitch number for `frequency` in Hz.
pub fn nearest_pitch(frequency: f64) -> i32 {
    FREQUENCY_TO_PITCH.convert_forwards(frequency).round() as i32
}

pub fn pitch_to_frequency(pitch: f64) -> f64 {
    FREQUENCY_TO_PITCH.convert_backwards(pitch)
}

/// `"A4"`-style name, or `None` below A0.
pub fn note_name(pitch: i32) -> Option<String> {
    if pitch < LOWEST_NAMED_PITCH {
        return None;
    }
    let name = NOTE_NAMES[pitch.rem_euclid(12) as usize];
    let octave = (pitch - 12).div_euclid(12);
    Some(format!("{}{}", name, octave))
}
