//! Note name to frequency conversion
//!
//! Equal temperament with a configurable A4 reference. Every function here
//! is pure; malformed input degrades to the reference pitch instead of
//! returning an error.

mod note;

pub use note::{PitchClass, PitchSpec, A4_MIDI};

/// Concert pitch
pub const DEFAULT_REFERENCE_A4: f64 = 440.0;

/// Frequency in Hz of a note such as `"A4"` or `"Db3"`
///
/// Inputs shorter than two characters and unknown pitch classes return
/// `reference_a4_hz` unchanged.
pub fn frequency_for_note(note: &str, reference_a4_hz: f64) -> f64 {
    match resolve_note(note) {
        Some(spec) => spec.frequency(reference_a4_hz),
        None => reference_a4_hz,
    }
}

/// The note [`frequency_for_note`] would play, or `None` when it falls back
/// to the reference
///
/// Inputs need at least two characters, so a bare `"E"` does not count.
pub fn resolve_note(note: &str) -> Option<PitchSpec> {
    if note.chars().count() < 2 {
        return None;
    }
    PitchSpec::parse(note)
}

/// [`frequency_for_note`] against A4 = 440 Hz
pub fn frequency_for_note_default(note: &str) -> f64 {
    frequency_for_note(note, DEFAULT_REFERENCE_A4)
}

/// [`frequency_for_note_default`] rounded to the nearest whole Hz
pub fn rounded_frequency_for_note(note: &str) -> u32 {
    frequency_for_note_default(note).round() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_note_agrees_with_frequency() {
        for note in ["A4", "c#3", "Bb", "E", "", "H2", "G-1", "A\u{e9}", "\u{266f}4"] {
            let resolved = resolve_note(note).map(|spec| spec.frequency(432.0));
            assert_eq!(resolved.unwrap_or(432.0), frequency_for_note(note, 432.0), "{:?}", note);
        }
        assert!(resolve_note("E").is_none());
        assert!(resolve_note("E2").is_some());
    }

    #[test]
    fn test_octaves_of_a() {
        assert_eq!(frequency_for_note_default("A4"), 440.0);
        assert_eq!(frequency_for_note_default("A3"), 220.0);
        assert_eq!(frequency_for_note_default("A5"), 880.0);
    }

    #[test]
    fn test_middle_c() {
        let freq = frequency_for_note_default("C4");
        assert!((freq - 261.63).abs() < 0.01, "C4 was {}", freq);
    }

    #[test]
    fn test_enharmonic_equivalence() {
        assert_eq!(frequency_for_note_default("C#4"), frequency_for_note_default("Db4"));
        assert_eq!(frequency_for_note_default("A#2"), frequency_for_note_default("Bb2"));
    }

    #[test]
    fn test_short_input_falls_back() {
        assert_eq!(frequency_for_note("", 440.0), 440.0);
        assert_eq!(frequency_for_note("A", 440.0), 440.0);
        assert_eq!(frequency_for_note("7", 432.0), 432.0);
    }

    #[test]
    fn test_unknown_pitch_class_falls_back() {
        assert_eq!(frequency_for_note("Z4", 440.0), 440.0);
        assert_eq!(frequency_for_note("-1", 440.0), 440.0);
        assert_eq!(frequency_for_note("H#4", 415.0), 415.0);
    }

    #[test]
    fn test_missing_octave_defaults_to_four() {
        assert_eq!(frequency_for_note_default("C#"), frequency_for_note_default("C#4"));
    }

    #[test]
    fn test_custom_reference() {
        assert_eq!(frequency_for_note("A4", 432.0), 432.0);
        assert_eq!(frequency_for_note("A3", 432.0), 216.0);
    }

    #[test]
    fn test_rounded() {
        assert_eq!(rounded_frequency_for_note("A4"), 440);
        assert_eq!(rounded_frequency_for_note("C4"), 262);
        assert_eq!(rounded_frequency_for_note("E2"), 82);
        assert_eq!(rounded_frequency_for_note("?"), 440);
    }
}
