//! Pitch Converter
//!
//! Conversion between note names, equal-tempered frequencies and MIDI note
//! numbers, referenced to A4 = 440 Hz.
//!
//! Every frequency produced here is rounded to two decimal places with
//! [`f64::round`], i.e. halves round away from zero. Frequencies are always
//! positive, so this is plain round-half-up.

use std::{fmt::Display, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

const SEMITONES: i32 = 12;

const A4_FREQUENCY: f64 = 440.0;
const A4_SEMITONE: i32 = 9;
const A4_OCTAVE: i32 = 4;
const A4_MIDI: i32 = 69;

/// Lowest valid MIDI note number.
pub const MIDI_MIN: i32 = 0;

/// Highest valid MIDI note number.
pub const MIDI_MAX: i32 = 127;

/// Accepted spellings and their pitch class (C = 0)
#[rustfmt::skip]
const NOTE_TO_SEMITONE: &[(&str, u8)] = &[
    ("C", 0),
    ("C#", 1), ("Db", 1),
    ("D", 2),
    ("D#", 3), ("Eb", 3),
    ("E", 4),
    ("F", 5),
    ("F#", 6), ("Gb", 6),
    ("G", 7),
    ("G#", 8), ("Ab", 8),
    ("A", 9),
    ("A#", 10), ("Bb", 10),
    ("B", 11),
];

/// Sharp-preferring spelling of each pitch class
const SHARP_NAMES: [&str; 12] = ["C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B"];

/// Flat-preferring spelling of each pitch class
const FLAT_NAMES: [&str; 12] = ["C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B"];

lazy_static! {
    static ref NOTE_STRING: Regex =
        Regex::new(r"^([A-G][#b]?)([0-9]+)$").expect("note string pattern is valid");
}

/// Errors returned by pitch conversions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PitchError {
    /// The note is not one of the twelve recognized spellings (letter plus at most one `#`/`b`).
    #[error("invalid note `{0}`")]
    InvalidNote(String),

    /// The string does not have the `<note><octave>` shape, e.g. `C#4`.
    #[error("invalid note string `{0}`")]
    InvalidNoteString(String),

    /// A MIDI note number, given or derived from a frequency, fell outside `0..=127`.
    #[error("value {value} is outside the MIDI note range 0..=127")]
    OutOfRange {
        /// The offending MIDI value.
        value: f64,
    },
}

/// Twelve chromatic pitch classes
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NoteName {
    /// C
    C,
    /// C sharp / D flat
    Cs,
    /// D
    D,
    /// D sharp / E flat
    Ds,
    /// E
    E,
    /// F
    F,
    /// F sharp / G flat
    Fs,
    /// G
    G,
    /// G sharp / A flat
    Gs,
    /// A
    A,
    /// A sharp / B flat
    As,
    /// B
    B,
}

impl NoteName {
    /// All pitch classes in ascending order from C.
    pub const ALL: [NoteName; 12] = [
        NoteName::C,
        NoteName::Cs,
        NoteName::D,
        NoteName::Ds,
        NoteName::E,
        NoteName::F,
        NoteName::Fs,
        NoteName::G,
        NoteName::Gs,
        NoteName::A,
        NoteName::As,
        NoteName::B,
    ];

    /// Pitch class for any integer, wrapping modulo 12.
    pub const fn from_pitch_class(pc: i32) -> NoteName {
        Self::ALL[pc.rem_euclid(SEMITONES) as usize]
    }

    /// Pitch class number, C = 0 through B = 11.
    pub const fn pitch_class(self) -> u8 {
        self as u8
    }

    /// Render with the sharp- or flat-preferring spelling table.
    pub const fn spelling(self, prefer_flat: bool) -> &'static str {
        if prefer_flat {
            FLAT_NAMES[self as usize]
        } else {
            SHARP_NAMES[self as usize]
        }
    }
}

impl FromStr for NoteName {
    type Err = PitchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NOTE_TO_SEMITONE
            .iter()
            .find(|&&(name, _)| name == s)
            .map(|&(_, pc)| NoteName::from_pitch_class(i32::from(pc)))
            .ok_or_else(|| PitchError::InvalidNote(s.to_string()))
    }
}

impl Display for NoteName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.spelling(false))
    }
}

/// A pitch class placed in an octave (scientific pitch notation, middle C = C4).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Pitch {
    /// Pitch class.
    pub name: NoteName,
    /// Octave number; may be negative for sub-audio frequencies.
    pub octave: i32,
}

impl Pitch {
    /// Create a pitch from its parts.
    pub const fn new(name: NoteName, octave: i32) -> Self {
        Pitch { name, octave }
    }

    /// Nearest equal-tempered pitch to `frequency`.
    ///
    /// Representable for any positive frequency. The octave is normalized
    /// with floor division, so frequencies below C0 yield negative octaves.
    pub fn from_frequency(frequency: f64) -> Self {
        let distance = (SEMITONES as f64 * (frequency / A4_FREQUENCY).log2()).round() as i32;
        let total = (A4_OCTAVE * SEMITONES + A4_SEMITONE).saturating_add(distance);
        Pitch {
            name: NoteName::from_pitch_class(total.rem_euclid(SEMITONES)),
            octave: total.div_euclid(SEMITONES),
        }
    }

    /// Pitch for a MIDI note number (60 = C4).
    pub fn from_midi(midi: i32) -> Result<Self, PitchError> {
        check_midi(f64::from(midi))?;
        Ok(Pitch {
            name: NoteName::from_pitch_class(midi),
            octave: midi.div_euclid(SEMITONES) - 1,
        })
    }

    /// Signed semitone distance from A4. Widened to `i64` so every `i32`
    /// octave fits.
    fn semitones_from_a4(&self) -> i64 {
        (i64::from(self.octave) - i64::from(A4_OCTAVE)) * i64::from(SEMITONES)
            + (i64::from(self.name.pitch_class()) - i64::from(A4_SEMITONE))
    }

    /// Frequency in Hz, rounded to 2 decimals.
    ///
    /// Octaves far outside the audible range saturate: the result becomes
    /// `f64::INFINITY` going up and `0.0` going down.
    pub fn frequency(&self) -> f64 {
        round_hz(A4_FREQUENCY * 2f64.powf(self.semitones_from_a4() as f64 / SEMITONES as f64))
    }

    /// MIDI note number, or [`PitchError::OutOfRange`] for pitches outside
    /// C-1..=G9.
    pub fn midi(&self) -> Result<u8, PitchError> {
        let midi = i64::from(A4_MIDI) + self.semitones_from_a4();
        check_midi(midi as f64)?;
        Ok(midi as u8)
    }

    /// Render as `<note><octave>` with the chosen spelling table.
    pub fn to_note_string(&self, prefer_flat: bool) -> String {
        format!("{}{}", self.name.spelling(prefer_flat), self.octave)
    }
}

impl FromStr for Pitch {
    type Err = PitchError;

    /// Parse `<note><octave>`, e.g. `C4`, `A#5`, `Bb3`. Octaves are unsigned.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = NOTE_STRING
            .captures(s)
            .ok_or_else(|| PitchError::InvalidNoteString(s.to_string()))?;
        let name = caps[1].parse::<NoteName>()?;
        let octave = caps[2]
            .parse::<i32>()
            .map_err(|_| PitchError::InvalidNoteString(s.to_string()))?;
        Ok(Pitch { name, octave })
    }
}

impl Display for Pitch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.name, self.octave)
    }
}

/// Round a frequency to 2 decimal places.
#[inline]
pub fn round_hz(frequency: f64) -> f64 {
    (frequency * 100.0).round() / 100.0
}

fn check_midi(value: f64) -> Result<(), PitchError> {
    if (f64::from(MIDI_MIN)..=f64::from(MIDI_MAX)).contains(&value) {
        Ok(())
    } else {
        Err(PitchError::OutOfRange { value })
    }
}

/// Frequency of `note` in `octave`.
///
/// `note` must be one of the 17 spellings `C`, `C#`, `Db`, ... `Bb`, `B`,
/// otherwise [`PitchError::InvalidNote`] is returned.
/// Octaves too far from 4 for a finite `f64` give `f64::INFINITY` (or
/// `0.0` below), never a panic.
///
/// ```
/// use chord_voicer::pitch::note_to_frequency;
///
/// assert_eq!(note_to_frequency("A", 4).unwrap(), 440.0);
/// assert_eq!(note_to_frequency("C", 4).unwrap(), 261.63);
/// ```
pub fn note_to_frequency(note: &str, octave: i32) -> Result<f64, PitchError> {
    let name = note.parse::<NoteName>()?;
    Ok(Pitch::new(name, octave).frequency())
}

/// Nearest note and octave for `frequency`, spelled with sharps unless
/// `prefer_flat` is set.
pub fn frequency_to_note(frequency: f64, prefer_flat: bool) -> (&'static str, i32) {
    let pitch = Pitch::from_frequency(frequency);
    (pitch.name.spelling(prefer_flat), pitch.octave)
}

/// Frequency of a `<note><octave>` string such as `C#4`.
pub fn note_string_to_frequency(note_string: &str) -> Result<f64, PitchError> {
    Ok(note_string.parse::<Pitch>()?.frequency())
}

/// `<note><octave>` string nearest to `frequency`.
pub fn frequency_to_note_string(frequency: f64, prefer_flat: bool) -> String {
    Pitch::from_frequency(frequency).to_note_string(prefer_flat)
}

/// Frequency of a MIDI note number (69 = A4 = 440 Hz).
pub fn midi_note_to_frequency(midi: i32) -> Result<f64, PitchError> {
    check_midi(f64::from(midi))?;
    let distance = (midi - A4_MIDI) as f64;
    Ok(round_hz(A4_FREQUENCY * 2f64.powf(distance / SEMITONES as f64)))
}

/// Nearest MIDI note number to `frequency`.
///
/// Fails with [`PitchError::OutOfRange`] when the nearest note lies outside
/// `0..=127`, which includes non-positive input.
pub fn frequency_to_midi_note(frequency: f64) -> Result<u8, PitchError> {
    let distance = (SEMITONES as f64 * (frequency / A4_FREQUENCY).log2()).round();
    let midi = f64::from(A4_MIDI) + distance;
    check_midi(midi)?;
    Ok(midi as u8)
}
