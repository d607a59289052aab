//! Pitch classes and octave-qualified notes

use std::fmt;

/// MIDI note number of A4
pub const A4_MIDI: i32 = 69;

/// One of the twelve equal-tempered semitones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PitchClass {
    C,
    CSharp,
    D,
    DSharp,
    E,
    F,
    FSharp,
    G,
    GSharp,
    A,
    ASharp,
    B,
}

impl PitchClass {
    /// All pitch classes in ascending order from C
    pub const ALL: [PitchClass; 12] = [
        PitchClass::C,
        PitchClass::CSharp,
        PitchClass::D,
        PitchClass::DSharp,
        PitchClass::E,
        PitchClass::F,
        PitchClass::FSharp,
        PitchClass::G,
        PitchClass::GSharp,
        PitchClass::A,
        PitchClass::ASharp,
        PitchClass::B,
    ];

    /// Look up a pitch class by name
    ///
    /// Sharps use `#` and flats use a lowercase `b`. Enharmonic spellings
    /// resolve to the same class.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "C" => Some(Self::C),
            "C#" | "Db" => Some(Self::CSharp),
            "D" => Some(Self::D),
            "D#" | "Eb" => Some(Self::DSharp),
            "E" => Some(Self::E),
            "F" => Some(Self::F),
            "F#" | "Gb" => Some(Self::FSharp),
            "G" => Some(Self::G),
            "G#" | "Ab" => Some(Self::GSharp),
            "A" => Some(Self::A),
            "A#" | "Bb" => Some(Self::ASharp),
            "B" => Some(Self::B),
            _ => None,
        }
    }

    /// Semitone offset above C (0-11)
    pub fn semitone(self) -> i32 {
        self as i32
    }

    /// Canonical (sharp) spelling
    pub fn name(self) -> &'static str {
        match self {
            Self::C => "C",
            Self::CSharp => "C#",
            Self::D => "D",
            Self::DSharp => "D#",
            Self::E => "E",
            Self::F => "F",
            Self::FSharp => "F#",
            Self::G => "G",
            Self::GSharp => "G#",
            Self::A => "A",
            Self::ASharp => "A#",
            Self::B => "B",
        }
    }
}

/// A pitch class in a specific octave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PitchSpec {
    pub pitch_class: PitchClass,
    pub octave: i32,
}

impl PitchSpec {
    /// Octave assumed when a note carries no usable octave number
    pub const DEFAULT_OCTAVE: i32 = 4;

    pub fn new(pitch_class: PitchClass, octave: i32) -> Self {
        Self { pitch_class, octave }
    }

    /// Parse a note such as `A4`, `C#3` or `Eb`
    ///
    /// The name is everything before the first digit and the octave is the
    /// rest. A missing or malformed octave falls back to octave 4. Returns
    /// `None` when the name is not a known pitch class.
    pub fn parse(note: &str) -> Option<Self> {
        let split = note
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(note.len());
        let (name, octave) = note.split_at(split);

        let pitch_class = PitchClass::from_name(name)?;
        let octave = octave.parse::<u16>().map_or(Self::DEFAULT_OCTAVE, i32::from);

        Some(Self::new(pitch_class, octave))
    }

    /// MIDI note number (C4 = 60)
    pub fn midi_number(&self) -> i32 {
        (self.octave + 1) * 12 + self.pitch_class.semitone()
    }

    /// Equal-tempered frequency relative to the given A4 reference
    pub fn frequency(&self, reference_a4_hz: f64) -> f64 {
        let semitones = (self.midi_number() - A4_MIDI) as f64;
        reference_a4_hz * 2.0_f64.powf(semitones / 12.0)
    }
}

impl fmt::Display for PitchSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.pitch_class.name(), self.octave)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semitone_offsets_ascend_from_c() {
        for (i, class) in PitchClass::ALL.iter().enumerate() {
            assert_eq!(class.semitone(), i as i32);
            assert_eq!(PitchClass::from_name(class.name()), Some(*class));
        }
    }

    #[test]
    fn test_enharmonic_names() {
        assert_eq!(PitchClass::from_name("Db"), Some(PitchClass::CSharp));
        assert_eq!(PitchClass::from_name("Eb"), Some(PitchClass::DSharp));
        assert_eq!(PitchClass::from_name("Gb"), Some(PitchClass::FSharp));
        assert_eq!(PitchClass::from_name("Ab"), Some(PitchClass::GSharp));
        assert_eq!(PitchClass::from_name("Bb"), Some(PitchClass::ASharp));
        assert_eq!(PitchClass::from_name("H"), None);
        assert_eq!(PitchClass::from_name("c"), None);
    }

    #[test]
    fn test_parse_note() {
        assert_eq!(PitchSpec::parse("A4"), Some(PitchSpec::new(PitchClass::A, 4)));
        assert_eq!(PitchSpec::parse("C#3"), Some(PitchSpec::new(PitchClass::CSharp, 3)));
        assert_eq!(PitchSpec::parse("Bb10"), Some(PitchSpec::new(PitchClass::ASharp, 10)));
        assert_eq!(PitchSpec::parse("Z4"), None);
    }

    #[test]
    fn test_parse_default_octave() {
        assert_eq!(PitchSpec::parse("Eb"), Some(PitchSpec::new(PitchClass::DSharp, 4)));
        // Trailing junk after the digits is not a number
        assert_eq!(PitchSpec::parse("G2x"), Some(PitchSpec::new(PitchClass::G, 4)));
    }

    #[test]
    fn test_midi_number() {
        assert_eq!(PitchSpec::new(PitchClass::C, 4).midi_number(), 60);
        assert_eq!(PitchSpec::new(PitchClass::A, 4).midi_number(), 69);
        assert_eq!(PitchSpec::new(PitchClass::C, -1).midi_number(), 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(PitchSpec::new(PitchClass::FSharp, 2).to_string(), "F#2");
    }
}
