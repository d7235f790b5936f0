use crate::types::events::SynthEvent;

/// CC 120: All Sound Off
const CC_ALL_SOUND_OFF: u8 = 120;
/// CC 123: All Notes Off
const CC_ALL_NOTES_OFF: u8 = 123;
/// Pitch bend centre (no bend)
const PITCH_BEND_CENTER: u16 = 0x2000;

/// MIDI message types we care about
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MidiMessage {
    NoteOn { channel: u8, note: u8, velocity: u8 },
    NoteOff { channel: u8, note: u8, velocity: u8 },
    ControlChange { channel: u8, controller: u8, value: u8 },
    PitchBend { channel: u8, value: u16 },
    Unknown,
}

impl MidiMessage {
    /// Parse raw MIDI bytes into a message
    /// Handles standard MIDI protocol: [status, data1, data2]
    pub fn parse(bytes: &[u8]) -> Self {
        if bytes.len() < 3 {
            return MidiMessage::Unknown;
        }

        let status = bytes[0];
        let message_type = status & 0xF0;
        let channel = status & 0x0F;
        let data1 = bytes[1] & 0x7F;
        let data2 = bytes[2] & 0x7F;

        match message_type {
            // MIDI spec: Note On with velocity 0 is actually Note Off
            0x90 if data2 == 0 => MidiMessage::NoteOff {
                channel,
                note: data1,
                velocity: 0,
            },
            0x90 => MidiMessage::NoteOn {
                channel,
                note: data1,
                velocity: data2,
            },
            0x80 => MidiMessage::NoteOff {
                channel,
                note: data1,
                velocity: data2,
            },
            0xB0 => MidiMessage::ControlChange {
                channel,
                controller: data1,
                value: data2,
            },
            // Pitch bend is LSB first
            0xE0 => MidiMessage::PitchBend {
                channel,
                value: ((data2 as u16) << 7) | data1 as u16,
            },
            _ => MidiMessage::Unknown,
        }
    }

    /// Convert MIDI message to synth event
    /// Channel filtering happens per voice engine, not here
    pub fn to_synth_event(&self) -> Option<SynthEvent> {
        match *self {
            MidiMessage::NoteOn { channel, note, velocity } => {
                Some(SynthEvent::note_on(channel, note, velocity))
            }
            MidiMessage::NoteOff { channel, note, .. } => Some(SynthEvent::note_off(channel, note)),
            MidiMessage::ControlChange { channel, controller, value } => match controller {
                CC_ALL_NOTES_OFF | CC_ALL_SOUND_OFF => {
                    Some(SynthEvent::all_notes_off_channel(channel))
                }
                _ => Some(SynthEvent::control_change(channel, controller, value)),
            },
            MidiMessage::PitchBend { channel, value } => {
                let amount =
                    (value as f32 - PITCH_BEND_CENTER as f32) / PITCH_BEND_CENTER as f32;
                Some(SynthEvent::pitch_bend(channel, amount))
            }
            MidiMessage::Unknown => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_note_on() {
        let bytes = [0x90, 60, 100]; // Note On, channel 0, middle C, velocity 100
        let msg = MidiMessage::parse(&bytes);
        assert_eq!(
            msg,
            MidiMessage::NoteOn {
                channel: 0,
                note: 60,
                velocity: 100
            }
        );
    }

    #[test]
    fn test_parse_note_off() {
        let bytes = [0x83, 60, 64]; // Note Off, channel 3, middle C
        let msg = MidiMessage::parse(&bytes);
        assert_eq!(
            msg,
            MidiMessage::NoteOff {
                channel: 3,
                note: 60,
                velocity: 64
            }
        );
    }

    #[test]
    fn test_note_on_velocity_zero_is_note_off() {
        let bytes = [0x90, 60, 0];
        let msg = MidiMessage::parse(&bytes);
        assert!(matches!(msg, MidiMessage::NoteOff { .. }));
    }

    #[test]
    fn test_short_message_is_unknown() {
        assert_eq!(MidiMessage::parse(&[]), MidiMessage::Unknown);
        assert_eq!(MidiMessage::parse(&[0x90, 60]), MidiMessage::Unknown);
        assert_eq!(MidiMessage::parse(&[0xF8, 0, 0]), MidiMessage::Unknown);
    }

    #[test]
    fn test_parse_pitch_bend() {
        assert_eq!(
            MidiMessage::parse(&[0xE1, 0x00, 0x40]),
            MidiMessage::PitchBend { channel: 1, value: 0x2000 }
        );
        assert_eq!(
            MidiMessage::parse(&[0xE0, 0x7F, 0x7F]),
            MidiMessage::PitchBend { channel: 0, value: 0x3FFF }
        );
    }

    #[test]
    fn test_pitch_bend_event_range() {
        let down = MidiMessage::PitchBend { channel: 0, value: 0 };
        assert_eq!(down.to_synth_event(), Some(SynthEvent::pitch_bend(0, -1.0)));

        let center = MidiMessage::PitchBend { channel: 0, value: 0x2000 };
        assert_eq!(center.to_synth_event(), Some(SynthEvent::pitch_bend(0, 0.0)));
    }

    #[test]
    fn test_all_notes_off_controllers() {
        let msg = MidiMessage::parse(&[0xB2, 123, 0]);
        assert_eq!(msg.to_synth_event(), Some(SynthEvent::all_notes_off_channel(2)));

        let msg = MidiMessage::parse(&[0xB2, 120, 0]);
        assert_eq!(msg.to_synth_event(), Some(SynthEvent::all_notes_off_channel(2)));
    }

    #[test]
    fn test_other_controllers_pass_through() {
        let msg = MidiMessage::parse(&[0xB0, 101, 0]);
        assert_eq!(msg.to_synth_event(), Some(SynthEvent::control_change(0, 101, 0)));
    }

    #[test]
    fn test_to_synth_event() {
        let msg = MidiMessage::NoteOn {
            channel: 4,
            note: 69,
            velocity: 100,
        };
        assert_eq!(msg.to_synth_event(), Some(SynthEvent::note_on(4, 69, 100)));
    }
}
