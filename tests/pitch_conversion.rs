//! Integration tests for note, frequency and MIDI conversion.

use chord_voicer::pitch::{
    frequency_to_midi_note, frequency_to_note, frequency_to_note_string, midi_note_to_frequency,
    note_string_to_frequency, note_to_frequency, round_hz, NoteName, Pitch, PitchError,
};
use rayon::iter::{IntoParallelIterator, ParallelIterator};

const SPELLINGS: [(&str, u8); 17] = [
    ("C", 0),
    ("C#", 1),
    ("Db", 1),
    ("D", 2),
    ("D#", 3),
    ("Eb", 3),
    ("E", 4),
    ("F", 5),
    ("F#", 6),
    ("Gb", 6),
    ("G", 7),
    ("G#", 8),
    ("Ab", 8),
    ("A", 9),
    ("A#", 10),
    ("Bb", 10),
    ("B", 11),
];

#[test]
fn reference_frequencies() {
    assert_eq!(note_to_frequency("A", 4).unwrap(), 440.0);
    assert_eq!(note_to_frequency("C", 4).unwrap(), 261.63);
    assert_eq!(note_to_frequency("C#", 4).unwrap(), 277.18);
    assert_eq!(note_to_frequency("E", 4).unwrap(), 329.63);
    assert_eq!(note_to_frequency("G", 4).unwrap(), 392.0);
    assert_eq!(note_to_frequency("A", 0).unwrap(), 27.5);
    assert_eq!(note_to_frequency("A", 8).unwrap(), 7040.0);
}

#[test]
fn spellings_map_to_pitch_classes() {
    for (spelling, pc) in SPELLINGS {
        let name: NoteName = spelling.parse().unwrap();
        assert_eq!(name.pitch_class(), pc, "{spelling}");
    }
    assert_eq!("C#".parse::<NoteName>().unwrap(), "Db".parse::<NoteName>().unwrap());
}

#[test]
fn invalid_notes_are_rejected() {
    for bad in ["H", "c", "", "C##", "Cb#", "E#x", " C", "Fb "] {
        assert_eq!(
            note_to_frequency(bad, 4),
            Err(PitchError::InvalidNote(bad.to_string())),
            "{bad:?}"
        );
    }
}

#[test]
fn enharmonic_note_strings_agree() {
    assert_eq!(
        note_string_to_frequency("C#4").unwrap(),
        note_string_to_frequency("Db4").unwrap()
    );
    assert_eq!(note_string_to_frequency("A4").unwrap(), 440.0);
    assert_eq!(note_string_to_frequency("C#5").unwrap(), 554.37);
    assert_eq!(note_string_to_frequency("Bb3").unwrap(), 233.08);
    assert_eq!(note_string_to_frequency("C10").unwrap(), note_to_frequency("C", 10).unwrap());
}

#[test]
fn malformed_note_strings_are_rejected() {
    for bad in ["A", "4", "A-1", "a4", "A#b4", "A4.0", "H4", "A 4", ""] {
        assert_eq!(
            note_string_to_frequency(bad),
            Err(PitchError::InvalidNoteString(bad.to_string())),
            "{bad:?}"
        );
    }
    // Octave too large to represent
    assert!(matches!(
        note_string_to_frequency("C99999999999"),
        Err(PitchError::InvalidNoteString(_))
    ));
}

#[test]
fn extreme_octaves_saturate_instead_of_overflowing() {
    // Fits in i32 but not once scaled to semitones
    assert_eq!(note_string_to_frequency("C999999999").unwrap(), f64::INFINITY);
    assert_eq!(note_to_frequency("A", i32::MAX).unwrap(), f64::INFINITY);
    assert_eq!(note_to_frequency("A", i32::MIN).unwrap(), 0.0);

    let pitch: Pitch = "C999999999".parse().unwrap();
    assert!(matches!(pitch.midi(), Err(PitchError::OutOfRange { .. })));
    assert!(matches!(
        Pitch::new(NoteName::C, i32::MIN).midi(),
        Err(PitchError::OutOfRange { .. })
    ));

    // Just past either end of the MIDI range
    assert!(Pitch::new(NoteName::Gs, 9).midi().is_err());
    assert!(Pitch::new(NoteName::B, -2).midi().is_err());
    assert_eq!(Pitch::new(NoteName::G, 9).midi().unwrap(), 127);
    assert_eq!(Pitch::new(NoteName::C, -1).midi().unwrap(), 0);
}

#[test]
fn frequency_to_note_prefers_requested_spelling() {
    assert_eq!(frequency_to_note(440.0, false), ("A", 4));
    assert_eq!(frequency_to_note(261.63, false), ("C", 4));
    assert_eq!(frequency_to_note(277.18, false), ("C#", 4));
    assert_eq!(frequency_to_note(277.18, true), ("Db", 4));
    assert_eq!(frequency_to_note_string(277.18, false), "C#4");
    assert_eq!(frequency_to_note_string(277.18, true), "Db4");
    // Slightly sharp or flat input snaps to the nearest semitone
    assert_eq!(frequency_to_note(445.0, false), ("A", 4));
    assert_eq!(frequency_to_note(436.0, false), ("A", 4));
}

#[test]
fn octave_boundaries_use_floor_division() {
    assert_eq!(frequency_to_note(246.94, false), ("B", 3));
    assert_eq!(frequency_to_note(261.63, false), ("C", 4));
    // Below C0 the octave goes negative
    assert_eq!(frequency_to_note(15.43, false), ("B", -1));
    assert_eq!(frequency_to_note(8.18, false), ("C", -1));
    assert_eq!(frequency_to_note(7.72, true), ("B", -2));
}

#[test]
fn note_round_trip_for_every_spelling_and_octave() {
    (0..=8).into_par_iter().for_each(|octave| {
        for (spelling, pc) in SPELLINGS {
            let hz = note_to_frequency(spelling, octave).unwrap();
            let name = NoteName::from_pitch_class(i32::from(pc));
            assert_eq!(frequency_to_note(hz, false), (name.spelling(false), octave));
            assert_eq!(frequency_to_note(hz, true), (name.spelling(true), octave));

            let note_string = format!("{spelling}{octave}");
            assert_eq!(note_string_to_frequency(&note_string).unwrap(), hz);
        }
    });
}

#[test]
fn midi_reference_points() {
    assert_eq!(midi_note_to_frequency(69).unwrap(), 440.0);
    assert_eq!(midi_note_to_frequency(60).unwrap(), 261.63);
    assert_eq!(midi_note_to_frequency(57).unwrap(), 220.0);
    assert_eq!(midi_note_to_frequency(81).unwrap(), 880.0);
    assert_eq!(midi_note_to_frequency(0).unwrap(), 8.18);
    assert_eq!(midi_note_to_frequency(127).unwrap(), 12543.85);

    assert_eq!(frequency_to_midi_note(440.0).unwrap(), 69);
    assert_eq!(frequency_to_midi_note(261.63).unwrap(), 60);
    assert_eq!(frequency_to_midi_note(220.0).unwrap(), 57);
    assert_eq!(frequency_to_midi_note(880.0).unwrap(), 81);
}

#[test]
fn midi_out_of_range() {
    assert_eq!(midi_note_to_frequency(-1), Err(PitchError::OutOfRange { value: -1.0 }));
    assert_eq!(midi_note_to_frequency(128), Err(PitchError::OutOfRange { value: 128.0 }));

    // One semitone above G9 and one below C-1
    assert!(matches!(frequency_to_midi_note(13289.75), Err(PitchError::OutOfRange { .. })));
    assert!(matches!(frequency_to_midi_note(7.72), Err(PitchError::OutOfRange { .. })));
    assert!(matches!(frequency_to_midi_note(0.0), Err(PitchError::OutOfRange { .. })));
    assert!(matches!(frequency_to_midi_note(-440.0), Err(PitchError::OutOfRange { .. })));
}

#[test]
fn midi_round_trip_full_range() {
    (0..=127).into_par_iter().for_each(|midi| {
        let hz = midi_note_to_frequency(midi).unwrap();
        assert_eq!(i32::from(frequency_to_midi_note(hz).unwrap()), midi, "{hz} Hz");

        let pitch = Pitch::from_midi(midi).unwrap();
        assert_eq!(i32::from(pitch.midi().unwrap()), midi);
        assert_eq!(pitch.frequency(), hz);
        assert_eq!(Pitch::from_frequency(hz), pitch);
    });
}

#[test]
fn pitch_parses_and_displays() {
    let pitch: Pitch = "Eb3".parse().unwrap();
    assert_eq!(pitch, Pitch::new(NoteName::Ds, 3));
    assert_eq!(pitch.to_string(), "D#3");
    assert_eq!(pitch.to_note_string(true), "Eb3");
    assert_eq!(pitch.midi().unwrap(), 51);
    assert_eq!(Pitch::from_midi(60).unwrap(), Pitch::new(NoteName::C, 4));
    assert_eq!(Pitch::from_midi(0).unwrap(), Pitch::new(NoteName::C, -1));
}

#[test]
fn rounding_is_half_up_to_cents() {
    assert_eq!(round_hz(261.625_565), 261.63);
    assert_eq!(round_hz(100.004), 100.0);
    assert_eq!(round_hz(100.0), 100.0);
}
