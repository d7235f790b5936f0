/// Decoded events sent from the MIDI thread to the control loop
/// Must be simple and fast to construct/parse
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SynthEvent {
    /// Note on with channel, note number and velocity
    NoteOn { channel: u8, note: u8, velocity: u8 },
    /// Note off with channel and note number
    NoteOff { channel: u8, note: u8 },
    /// Control change, fed to the per-channel RPN parser
    ControlChange { channel: u8, controller: u8, value: u8 },
    /// Pitch bend, -1.0 to +1.0
    PitchBend { channel: u8, amount: f32 },
    /// All notes off (MIDI panic) - None for all channels
    AllNotesOff { channel: Option<u8> },
}

impl SynthEvent {
    pub fn note_on(channel: u8, note: u8, velocity: u8) -> Self {
        SynthEvent::NoteOn { channel, note, velocity }
    }

    pub fn note_off(channel: u8, note: u8) -> Self {
        SynthEvent::NoteOff { channel, note }
    }

    pub fn control_change(channel: u8, controller: u8, value: u8) -> Self {
        SynthEvent::ControlChange { channel, controller, value }
    }

    pub fn pitch_bend(channel: u8, amount: f32) -> Self {
        SynthEvent::PitchBend { channel, amount }
    }

    /// Create an all notes off event for a specific channel
    pub fn all_notes_off_channel(channel: u8) -> Self {
        SynthEvent::AllNotesOff { channel: Some(channel) }
    }

    /// Create an all notes off event for all channels
    pub fn all_notes_off_all() -> Self {
        SynthEvent::AllNotesOff { channel: None }
    }

    /// Get the channel for this event, if applicable
    pub fn channel(&self) -> Option<u8> {
        match self {
            SynthEvent::NoteOn { channel, .. } => Some(*channel),
            SynthEvent::NoteOff { channel, .. } => Some(*channel),
            SynthEvent::ControlChange { channel, .. } => Some(*channel),
            SynthEvent::PitchBend { channel, .. } => Some(*channel),
            SynthEvent::AllNotesOff { channel } => *channel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_channel() {
        assert_eq!(SynthEvent::note_on(3, 60, 100).channel(), Some(3));
        assert_eq!(SynthEvent::pitch_bend(9, 0.5).channel(), Some(9));
        assert_eq!(SynthEvent::all_notes_off_channel(2).channel(), Some(2));
        assert_eq!(SynthEvent::all_notes_off_all().channel(), None);
    }
}
