/// MIDI pitch to frequency conversion using equal temperament
/// A440 tuning: MIDI note 69 = 440 Hz

/// Convert a fractional MIDI pitch (note plus glide/bend offset) to Hz
/// Uses equal temperament: f = 440 * 2^((p-69)/12)
pub fn pitch_to_frequency(pitch: f32) -> f32 {
    const A4: f32 = 440.0;
    const A4_MIDI: f32 = 69.0;

    A4 * 2.0_f32.powf((pitch - A4_MIDI) / 12.0)
}

/// Note name with octave, C4 = 60 (e.g. "C#4")
pub fn note_name(note: u8) -> String {
    const NAMES: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];
    let octave = note as i32 / 12 - 1;
    format!("{}{}", NAMES[(note % 12) as usize], octave)
}
