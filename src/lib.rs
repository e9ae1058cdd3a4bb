//! # chord_voicer
//!
//! Pitch and chord arithmetic for 12-tone equal temperament (A4 = 440 Hz):
//! convert between note names, frequencies and MIDI note numbers, and turn
//! chord symbols into frequency sets voiced with minimal movement from the
//! previous chord.
//!
//! ## Example
//! ```rust
//! use chord_voicer::{Chord, ChordVoicer, VoicingState};
//!
//! fn run() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1) Build a voicer for the C3..=C6 register
//!     let voicer = ChordVoicer::builder()
//!         .min_frequency(130.81)
//!         .max_frequency(1046.50)
//!         .build()?;
//!
//!     // 2) The caller owns the voice-leading state
//!     let mut state = VoicingState::new();
//!
//!     // 3) Voice a progression; hand each frequency set to your synth
//!     for symbol in ["C", "Am", "F", "G7"] {
//!         let chord: Chord = symbol.parse()?;
//!         let frequencies = voicer.voice(&chord, &mut state);
//!         println!("{chord}: {frequencies:?}");
//!     }
//!
//!     // 4) Start over for the next progression
//!     state.reset();
//!     Ok(())
//! }
//! # run().unwrap();
//! ```
//!
//! Plain conversions live in [`pitch`]:
//! ```rust
//! use chord_voicer::pitch::{frequency_to_note_string, midi_note_to_frequency};
//!
//! assert_eq!(midi_note_to_frequency(60).unwrap(), 261.63);
//! assert_eq!(frequency_to_note_string(277.18, true), "Db4");
//! ```

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rust_2018_idioms)]
#![deny(clippy::all)]

/// High‐level chord voicing API.
pub use chord_voicer::{
    chord_tones, progression_text, voice_against, Chord, ChordQuality, ChordVoicer,
    ChordVoicerBuilder, VoicerError, VoicingState,
};

/// Note, frequency and MIDI conversions.
pub use pitch::{
    frequency_to_midi_note, frequency_to_note, frequency_to_note_string, midi_note_to_frequency,
    note_string_to_frequency, note_to_frequency, NoteName, Pitch, PitchError,
};

/// Pitch conversion module.
pub mod pitch;

/// Chord voicing module.
pub mod chord_voicer;
