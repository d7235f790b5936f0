use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::glide::{Clock, GlideEngine, NO_NOTE};
use crate::ledger::{NoteEntry, NoteLedger, Pitch};
use crate::midi::rpn::ChannelSetup;

const MIDI_CHANNELS: usize = 16;

/// Which held note the voice sounds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NotePriority {
    #[default]
    Highest,
    Lowest,
}

/// Voice state read once per control tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoiceSnapshot {
    pub note: Option<u8>,
    pub channel: Option<u8>,
    /// Sounding pitch in semitones (note, transpose, glide and bend)
    pub pitch: Option<f32>,
    pub glide_offset: f32,
    pub gate: bool,
    pub held: usize,
}

/// Monophonic voice with a pitch-ordered note ledger and glide
pub struct MonoVoice<C: Clock> {
    ledger: NoteLedger,
    glide: GlideEngine<C>,
    priority: NotePriority,

    glide_time_ms: u32, // 0 disables glide
    transpose: i8,

    // Per MIDI channel
    setups: [ChannelSetup; MIDI_CHANNELS],
    bends: [f32; MIDI_CHANNELS], // -1.0 to +1.0

    gate_high: bool,
}

impl<C: Clock> MonoVoice<C> {
    pub fn new(clock: C, priority: NotePriority, bend_range: u8) -> Self {
        Self {
            ledger: NoteLedger::new(),
            glide: GlideEngine::new(clock),
            priority,
            glide_time_ms: 0,
            transpose: 0,
            setups: std::array::from_fn(|_| ChannelSetup::new(bend_range)),
            bends: [0.0; MIDI_CHANNELS],
            gate_high: false,
        }
    }

    fn reference_entry(&self) -> Option<NoteEntry> {
        let entry = match self.priority {
            NotePriority::Highest => self.ledger.highest(),
            NotePriority::Lowest => self.ledger.lowest(),
        };
        entry.ok()
    }

    /// Note the voice currently follows (if any)
    pub fn current_note(&self) -> Option<u8> {
        self.reference_entry()
            .map(|entry| entry.pitch.clamp(0, u8::MAX as Pitch) as u8)
    }

    /// Channel of the note the voice currently follows
    pub fn reference_channel(&self) -> Option<u8> {
        self.reference_entry().map(|entry| entry.channel)
    }

    /// Handle note on event
    pub fn note_on(&mut self, channel: u8, note: u8) {
        let previous = self.current_note();
        self.ledger.add_note(note as Pitch, channel);
        self.follow_reference(previous);
    }

    /// Handle note off event. Returns false if the note was not held.
    pub fn note_off(&mut self, channel: u8, note: u8) -> bool {
        let previous = self.current_note();
        let removed = self.ledger.remove_note(note as Pitch, channel);
        if removed {
            self.follow_reference(previous);
        } else {
            debug!("note off {} on channel {} without matching note on", note, channel);
        }
        removed
    }

    /// Release every note on `channel`, or every note when `None`
    pub fn all_notes_off(&mut self, channel: Option<u8>) {
        let previous = self.current_note();
        match channel {
            Some(channel) => self.ledger.remove_channel(channel),
            None => self.ledger.clear(),
        }
        self.follow_reference(previous);
    }

    /// Glide or jump to the reference note after the ledger changed
    fn follow_reference(&mut self, previous: Option<u8>) {
        let Some(current) = self.current_note() else {
            self.gate_high = false;
            self.glide.stop_glide();
            return;
        };

        self.gate_high = true;
        if previous == Some(current) {
            return;
        }

        if self.glide_time_ms == 0 {
            self.glide.stop_glide();
            return;
        }

        // No glide on the first note: NO_NOTE suppresses it
        let source = previous.unwrap_or(NO_NOTE);
        if let Err(e) = self.glide.start_glide(source, current, self.glide_time_ms) {
            warn!("glide to {} not started: {}", current, e);
        }
    }

    /// Route a control change to the channel's RPN parser
    pub fn control_change(&mut self, channel: u8, controller: u8, value: u8) {
        let setup = &mut self.setups[channel as usize % MIDI_CHANNELS];
        if setup.parse_control_change(controller, value) {
            debug!(
                "channel {} pitch bend range now {} semitones",
                channel,
                setup.pitch_bend_range()
            );
        }
    }

    pub fn pitch_bend(&mut self, channel: u8, amount: f32) {
        self.bends[channel as usize % MIDI_CHANNELS] = amount.clamp(-1.0, 1.0);
    }

    pub fn set_glide_time(&mut self, glide_time_ms: u32) {
        self.glide_time_ms = glide_time_ms;
    }

    pub fn set_transpose(&mut self, transpose: i8) {
        self.transpose = transpose;
    }

    pub fn set_priority(&mut self, priority: NotePriority) {
        self.priority = priority;
    }

    pub fn gate(&self) -> bool {
        self.gate_high
    }

    pub fn ledger(&self) -> &NoteLedger {
        &self.ledger
    }

    pub fn is_gliding(&self) -> bool {
        self.glide.is_gliding()
    }

    /// Pitch bend of the reference channel in semitones
    fn bend_semitones(&self, channel: u8) -> f32 {
        let index = channel as usize % MIDI_CHANNELS;
        self.bends[index] * self.setups[index].pitch_bend_range()
    }

    /// Read the voice for this tick. Expires a finished glide.
    pub fn snapshot(&mut self) -> VoiceSnapshot {
        let glide_offset = self.glide.current_offset();
        let entry = self.reference_entry();

        let pitch = entry.map(|entry| {
            entry.pitch as f32
                + self.transpose as f32
                + glide_offset
                + self.bend_semitones(entry.channel)
        });

        VoiceSnapshot {
            note: self.current_note(),
            channel: entry.map(|entry| entry.channel),
            pitch,
            glide_offset,
            gate: self.gate_high,
            held: self.ledger.size(),
        }
    }

    /// Sounding pitch in semitones, None when no note is held
    pub fn pitch(&mut self) -> Option<f32> {
        self.snapshot().pitch
    }
}
