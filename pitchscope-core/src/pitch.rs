//! # Pitch Mapping Module
//!
//! Converts a dominant frequency into a musical pitch relative to C4.
//!
//! ## Features
//! - Semitone offset from C4 (261.626 Hz), rounded to the nearest semitone
//! - Octave and pitch-class decomposition that stays non-negative for pitch classes
//! - Letter and fixed-do solfège note names
//! - Label formatting for the on-screen display

use serde::{Deserialize, Serialize};

/// Reference pitch for octave 0, pitch class 0.
pub const C4_FREQUENCY: f64 = 261.626;

const LETTER_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

const SOLFEGE_NAMES: [&str; 12] = [
    "Do", "Do#", "Re", "Re#", "Mi", "Fa", "Fa#", "Sol", "Sol#", "La", "La#", "Si",
];

/// Which set of twelve labels is used for pitch classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoteNaming {
    /// C, C#, D ... B
    #[default]
    Letter,
    /// Do, Do#, Re ... Si
    Solfege,
}

impl NoteNaming {
    /// Returns the label of a pitch class (0 = C). Values wrap modulo 12.
    pub fn name(self, pitch_class: u8) -> &'static str {
        let names = match self {
            NoteNaming::Letter => &LETTER_NAMES,
            NoteNaming::Solfege => &SOLFEGE_NAMES,
        };
        names[(pitch_class % 12) as usize]
    }
}

/// The pitch derived from a single analysis frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PitchEstimate {
    /// Frequency the estimate was derived from, in Hz.
    pub dominant_frequency_hz: f64,
    /// Octave relative to C4 (C4..B4 is octave 0).
    pub octave: i32,
    /// Pitch class in `0..=11`, 0 = C.
    pub pitch_class: u8,
}

impl PitchEstimate {
    /// Maps a frequency onto the nearest equal-tempered pitch.
    ///
    /// # Returns
    /// * `Some(estimate)` - for any finite, strictly positive frequency
    /// * `None` - for zero, negative or non-finite input, where `log2` has no
    ///   meaningful value
    pub fn from_frequency(dominant_frequency_hz: f64) -> Option<Self> {
        let semitones = semitones_from_c4(dominant_frequency_hz)?;
        Some(Self {
            dominant_frequency_hz,
            octave: semitones.div_euclid(12),
            pitch_class: semitones.rem_euclid(12) as u8,
        })
    }

    /// Formats the estimate as `name(octave)`, e.g. `A(0)` or `C#(-1)`.
    pub fn label(&self, naming: NoteNaming) -> String {
        format!("{}({})", naming.name(self.pitch_class), self.octave)
    }
}

/// Signed distance from C4 in whole semitones.
///
/// Uses `f64::round`, so exact half-semitone ties round away from zero.
pub fn semitones_from_c4(freq: f64) -> Option<i32> {
    if !freq.is_finite() || freq <= 0.0 {
        return None;
    }
    let semitones = (12.0 * (freq / C4_FREQUENCY).log2()).round();
    // Any positive finite f64 is within about ±13000 semitones of C4.
    Some(semitones as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_pitches_map_to_c() {
        let c4 = PitchEstimate::from_frequency(261.626).unwrap();
        assert_eq!((c4.octave, c4.pitch_class), (0, 0));

        let c5 = PitchEstimate::from_frequency(523.252).unwrap();
        assert_eq!((c5.octave, c5.pitch_class), (1, 0));

        let c3 = PitchEstimate::from_frequency(130.813).unwrap();
        assert_eq!((c3.octave, c3.pitch_class), (-1, 0));
    }

    #[test]
    fn a440_is_nine_semitones_above_c4() {
        assert_eq!(semitones_from_c4(440.0), Some(9));
        let a4 = PitchEstimate::from_frequency(440.0).unwrap();
        assert_eq!(a4.pitch_class, 9);
        assert_eq!(a4.octave, 0);
        assert_eq!(a4.label(NoteNaming::Letter), "A(0)");
        assert_eq!(a4.label(NoteNaming::Solfege), "La(0)");
    }

    #[test]
    fn notes_below_c4_wrap_into_the_previous_octave() {
        // B3 is one semitone below C4.
        let b3 = PitchEstimate::from_frequency(246.942).unwrap();
        assert_eq!(b3.octave, -1);
        assert_eq!(b3.pitch_class, 11);
        assert_eq!(b3.label(NoteNaming::Letter), "B(-1)");
    }

    #[test]
    fn pitch_class_stays_in_range_across_the_audible_band() {
        let mut freq = 10.0;
        while freq < 24_000.0 {
            let estimate = PitchEstimate::from_frequency(freq).unwrap();
            assert!(estimate.pitch_class <= 11, "{} Hz", freq);
            freq *= 1.031;
        }
    }

    #[test]
    fn non_positive_frequencies_have_no_estimate() {
        assert!(PitchEstimate::from_frequency(0.0).is_none());
        assert!(PitchEstimate::from_frequency(-12.0).is_none());
        assert!(PitchEstimate::from_frequency(f64::NAN).is_none());
        assert!(PitchEstimate::from_frequency(f64::INFINITY).is_none());
    }

    #[test]
    fn octave_zero_never_renders_with_a_sign() {
        // Slightly flat of C4 still rounds to C4.
        let estimate = PitchEstimate::from_frequency(258.0).unwrap();
        assert_eq!(estimate.label(NoteNaming::Letter), "C(0)");
        assert!(!estimate.label(NoteNaming::Letter).contains("-0"));
    }

    #[test]
    fn naming_wraps_pitch_classes() {
        assert_eq!(NoteNaming::Letter.name(13), "C#");
        assert_eq!(NoteNaming::Solfege.name(7), "Sol");
    }
}
