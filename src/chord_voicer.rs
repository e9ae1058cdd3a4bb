//! Chord Voicer
//!
//! Expands a root and chord quality into a set of frequencies and re-voices
//! them against the previously sounded chord, keeping every tone inside an
//! audible register.
//!
//! The voicer holds configuration only. Voice-leading context lives in a
//! caller-owned [`VoicingState`] that is passed in on every call.

use std::{fmt::Display, str::FromStr};

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, trace};

use crate::pitch::{NoteName, Pitch, PitchError};

/// Number of chord qualities
const NUM_CHORD_QUALITIES: usize = 7;

/// Lower edge of the default voicing register (C3)
pub const DEFAULT_MIN_FREQUENCY: f64 = 130.81;

/// Upper edge of the default voicing register (C6)
pub const DEFAULT_MAX_FREQUENCY: f64 = 1046.50;

/// Octave chord roots are resolved in unless configured otherwise
pub const DEFAULT_ROOT_OCTAVE: i32 = 4;

/// Octave shifts tried for each tone when voicing
const OCTAVE_SHIFTS: [i32; 5] = [-2, -1, 0, 1, 2];

/// Quality tags in the same order as `ChordQuality::ALL`
const CHORD_TAGS: [&str; NUM_CHORD_QUALITIES] = ["", "m", "7", "M7", "m7", "dim", "aug"];

/// Frequency ratios relative to the root, in construction order.
///
/// Approximations of the equal-tempered intervals. Kept as-is: they define
/// the audible output.
const CHORD_RATIOS: [&[f64]; NUM_CHORD_QUALITIES] = [
    &[1.0, 1.26, 1.498],
    &[1.0, 1.189, 1.498],
    &[1.0, 1.26, 1.498, 1.782],
    &[1.0, 1.26, 1.498, 1.888],
    &[1.0, 1.189, 1.498, 1.782],
    &[1.0, 1.189, 1.414],
    &[1.0, 1.26, 1.587],
];

lazy_static! {
    static ref CHORD_SYMBOL: Regex =
        Regex::new(r"^([A-G][#b]?)(.*)$").expect("chord symbol pattern is valid");
}

/// Errors from chord parsing and voicer configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum VoicerError {
    /// The chord root could not be resolved.
    #[error(transparent)]
    Pitch(#[from] PitchError),

    /// An error occurred during the configuration of the voicer.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Supported chord qualities
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ChordQuality {
    /// Major chord (e.g., C-E-G)
    Major,
    /// Minor chord (e.g., C-Eb-G)
    Minor,
    /// Dominant seventh chord (e.g., C-E-G-Bb)
    DominantSeventh,
    /// Major seventh chord (e.g., C-E-G-B)
    MajorSeventh,
    /// Minor seventh chord (e.g., C-Eb-G-Bb)
    MinorSeventh,
    /// Diminished chord (e.g., C-Eb-Gb)
    Diminished,
    /// Augmented chord (e.g., C-E-G#)
    Augmented,
}

impl ChordQuality {
    /// Every quality, in tag table order.
    pub const ALL: [ChordQuality; NUM_CHORD_QUALITIES] = [
        ChordQuality::Major,
        ChordQuality::Minor,
        ChordQuality::DominantSeventh,
        ChordQuality::MajorSeventh,
        ChordQuality::MinorSeventh,
        ChordQuality::Diminished,
        ChordQuality::Augmented,
    ];

    /// Resolve a quality tag (`""`, `"m"`, `"7"`, `"M7"`, `"m7"`, `"dim"`, `"aug"`).
    ///
    /// Any other tag falls back to [`ChordQuality::Major`].
    pub fn from_tag(tag: &str) -> ChordQuality {
        match CHORD_TAGS.iter().position(|&t| t == tag) {
            Some(idx) => Self::ALL[idx],
            None => {
                debug!(tag, "unrecognized chord quality, falling back to major");
                ChordQuality::Major
            }
        }
    }

    /// Tag used in chord symbols.
    pub const fn tag(self) -> &'static str {
        CHORD_TAGS[self as usize]
    }

    /// Frequency ratios of the chord tones relative to the root.
    pub const fn ratios(self) -> &'static [f64] {
        CHORD_RATIOS[self as usize]
    }
}

impl Display for ChordQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

/// Marker appended to borrowed chords in progression text
const BORROWED_MARKER: &str = " (borrowed)";

/// A chord symbol: root pitch class plus quality.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Chord {
    /// The root note of the chord.
    pub root: NoteName,
    /// The quality (e.g., Major, Minor) of the chord.
    pub quality: ChordQuality,
    /// Borrowed from a parallel key (modal interchange). Only affects
    /// progression text, never the frequencies.
    pub borrowed: bool,
}

impl Chord {
    /// Create a diatonic (not borrowed) chord from its parts.
    pub const fn new(root: NoteName, quality: ChordQuality) -> Self {
        Chord {
            root,
            quality,
            borrowed: false,
        }
    }

    /// Mark the chord as borrowed.
    pub const fn borrowed(self) -> Self {
        Chord {
            borrowed: true,
            ..self
        }
    }

    /// Render the symbol, spelling the root with flats if `prefer_flat`.
    pub fn symbol(&self, prefer_flat: bool) -> String {
        format!("{}{}", self.root.spelling(prefer_flat), self.quality.tag())
    }
}

impl FromStr for Chord {
    type Err = VoicerError;

    /// Parse symbols like `C`, `Am`, `F#m7`, `Bbdim`. Whatever follows the
    /// root is read as a quality tag, with the major fallback.
    ///
    /// A bad root is reported as [`PitchError::InvalidNote`] carrying the
    /// whole symbol.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || PitchError::InvalidNote(s.to_string());
        let caps = CHORD_SYMBOL.captures(s).ok_or_else(invalid)?;
        let root = caps[1].parse::<NoteName>().map_err(|_| invalid())?;
        Ok(Chord::new(root, ChordQuality::from_tag(&caps[2])))
    }
}

impl Display for Chord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.symbol(false))
    }
}

/// Render a progression as text, e.g. `C - Am - Bb (borrowed) - G7`.
pub fn progression_text(chords: &[Chord]) -> String {
    chords
        .iter()
        .map(|chord| {
            let marker = if chord.borrowed { BORROWED_MARKER } else { "" };
            format!("{chord}{marker}")
        })
        .collect::<Vec<_>>()
        .join(" - ")
}

/// The most recently voiced chord, held by the caller between voicings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VoicingState {
    previous: Vec<f64>,
}

impl VoicingState {
    /// Empty state: the next chord is played as generated.
    pub fn new() -> Self {
        Self::default()
    }

    /// Frequencies of the last voiced chord.
    pub fn previous(&self) -> &[f64] {
        &self.previous
    }

    /// True when no chord has been recorded since creation or the last reset.
    pub fn is_empty(&self) -> bool {
        self.previous.is_empty()
    }

    /// Remember `tones` as the last voiced chord.
    pub fn record(&mut self, tones: Vec<f64>) {
        self.previous = tones;
    }

    /// Forget the last chord, e.g. when starting a new progression.
    pub fn reset(&mut self) {
        self.previous.clear();
    }
}

/// Builder for `ChordVoicer` to customize the register and root octave
pub struct ChordVoicerBuilder {
    min_frequency: f64,
    max_frequency: f64,
    root_octave: i32,
}

impl ChordVoicerBuilder {
    /// Start with default parameters:
    /// min_frequency = 130.81, max_frequency = 1046.50, root_octave = 4.
    pub fn new() -> Self {
        ChordVoicerBuilder {
            min_frequency: DEFAULT_MIN_FREQUENCY,
            max_frequency: DEFAULT_MAX_FREQUENCY,
            root_octave: DEFAULT_ROOT_OCTAVE,
        }
    }

    /// Set the lowest frequency a voiced tone may have.
    pub fn min_frequency(mut self, hz: f64) -> Self {
        self.min_frequency = hz;
        self
    }

    /// Set the highest frequency a voiced tone may have.
    pub fn max_frequency(mut self, hz: f64) -> Self {
        self.max_frequency = hz;
        self
    }

    /// Set the octave chord roots are resolved in.
    pub fn root_octave(mut self, octave: i32) -> Self {
        self.root_octave = octave;
        self
    }

    /// Finalize and create the `ChordVoicer`.
    pub fn build(self) -> Result<ChordVoicer, VoicerError> {
        let bounds = [
            ("min_frequency", self.min_frequency),
            ("max_frequency", self.max_frequency),
        ];
        for (name, hz) in bounds {
            if !hz.is_finite() || hz <= 0.0 {
                return Err(VoicerError::Configuration(format!(
                    "{name} must be a positive finite frequency, got {hz}"
                )));
            }
        }
        if self.min_frequency >= self.max_frequency {
            return Err(VoicerError::Configuration(format!(
                "min_frequency ({}) must be below max_frequency ({})",
                self.min_frequency, self.max_frequency
            )));
        }

        Ok(ChordVoicer {
            min_frequency: self.min_frequency,
            max_frequency: self.max_frequency,
            root_octave: self.root_octave,
        })
    }
}

impl Default for ChordVoicerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Turns chord symbols into voiced frequency sets.
#[derive(Debug, Clone, PartialEq)]
pub struct ChordVoicer {
    min_frequency: f64,
    max_frequency: f64,
    root_octave: i32,
}

impl ChordVoicer {
    /// Return a builder to customize the register and root octave
    pub fn builder() -> ChordVoicerBuilder {
        ChordVoicerBuilder::new()
    }

    /// Create a voicer with the default C3..=C6 register and roots in octave 4
    pub fn new() -> Self {
        ChordVoicer {
            min_frequency: DEFAULT_MIN_FREQUENCY,
            max_frequency: DEFAULT_MAX_FREQUENCY,
            root_octave: DEFAULT_ROOT_OCTAVE,
        }
    }

    /// Lowest allowed voiced frequency.
    pub fn min_frequency(&self) -> f64 {
        self.min_frequency
    }

    /// Highest allowed voiced frequency.
    pub fn max_frequency(&self) -> f64 {
        self.max_frequency
    }

    /// Octave chord roots are resolved in.
    pub fn root_octave(&self) -> i32 {
        self.root_octave
    }

    /// Chord tones in construction order, root at the configured octave.
    pub fn chord_frequencies(&self, chord: &Chord) -> Vec<f64> {
        let root = Pitch::new(chord.root, self.root_octave).frequency();
        chord_tones(root, chord.quality)
    }

    /// Voice `chord` against the state's previous chord and record the result.
    pub fn voice(&self, chord: &Chord, state: &mut VoicingState) -> Vec<f64> {
        let tones = self.chord_frequencies(chord);
        let voiced =
            voice_against(&tones, state.previous(), self.min_frequency, self.max_frequency);
        debug!(%chord, ?voiced, "voiced chord");
        state.record(voiced.clone());
        voiced
    }

    /// Voice a whole progression from an empty state.
    pub fn voice_progression(&self, chords: &[Chord]) -> Vec<Vec<f64>> {
        let mut state = VoicingState::new();
        chords.iter().map(|chord| self.voice(chord, &mut state)).collect()
    }
}

impl Default for ChordVoicer {
    fn default() -> Self {
        ChordVoicer::new()
    }
}

/// Apply the quality's ratio table to `root_frequency`.
///
/// Tones come back in construction order and are not rounded.
pub fn chord_tones(root_frequency: f64, quality: ChordQuality) -> Vec<f64> {
    quality
        .ratios()
        .iter()
        .map(|ratio| root_frequency * ratio)
        .collect()
}

/// Move each tone to the octave nearest its counterpart in `previous`.
///
/// Tone `i` targets `previous[i]`, or the middle element of `previous` when
/// the previous chord had fewer tones. Shifts of up to two octaves either
/// way are tried; a shifted tone is taken only if it lies within
/// `[min_frequency, max_frequency]` and is strictly closer to the target
/// than the unshifted tone. A result still outside the range is moved by a
/// single octave without searching again. The output is sorted ascending.
///
/// An empty `previous` returns `tones` unchanged and unsorted.
pub fn voice_against(
    tones: &[f64],
    previous: &[f64],
    min_frequency: f64,
    max_frequency: f64,
) -> Vec<f64> {
    if previous.is_empty() {
        return tones.to_vec();
    }

    let in_range = |hz: f64| (min_frequency..=max_frequency).contains(&hz);
    let fallback_target = previous[previous.len() / 2];

    let mut voiced: Vec<f64> = tones
        .iter()
        .enumerate()
        .map(|(i, &tone)| {
            let target = previous.get(i).copied().unwrap_or(fallback_target);

            let mut best = tone;
            let mut best_distance = (tone - target).abs();
            for shift in OCTAVE_SHIFTS {
                let candidate = tone * 2f64.powi(shift);
                let distance = (candidate - target).abs();
                if in_range(candidate) && distance < best_distance {
                    best = candidate;
                    best_distance = distance;
                }
            }

            if best < min_frequency {
                trace!(tone, best, "below register, raising one octave");
                best *= 2.0;
            } else if best > max_frequency {
                trace!(tone, best, "above register, lowering one octave");
                best /= 2.0;
            }

            trace!(index = i, tone, target, placed = best, "placed chord tone");
            best
        })
        .collect();

    voiced.sort_by(f64::total_cmp);
    voiced
}
