use log::trace;
use thiserror::Error;

/// Pitch of a held note. Usually a MIDI note number, but the ledger only
/// relies on its ordering.
pub type Pitch = i32;

/// Source channel of a held note
pub type Channel = u8;

/// Expected number of simultaneously held keys (pre-allocated)
const TYPICAL_HELD_NOTES: usize = 16;

/// Errors reported by positional and extremal ledger queries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("no notes are held")]
    EmptyLedger,
    #[error("index {index} out of range for {size} held notes")]
    IndexOutOfRange { index: usize, size: usize },
}

/// One held note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteEntry {
    pub pitch: Pitch,
    pub channel: Channel,
}

/// Held notes ordered ascending by pitch (the "chord")
///
/// Duplicate pitches are allowed, including the same pitch on the same channel.
/// A new note is placed before any already held note of equal pitch.
#[derive(Debug, Clone)]
pub struct NoteLedger {
    entries: Vec<NoteEntry>,
}

impl NoteLedger {
    pub fn new() -> Self {
        Self {
            entries: Vec::with_capacity(TYPICAL_HELD_NOTES),
        }
    }

    /// Number of held notes
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entry at `index`, counted from the lowest pitch, or from the highest
    /// pitch when `from_end` is set
    pub fn entry_at(&self, index: usize, from_end: bool) -> Result<NoteEntry, LedgerError> {
        let size = self.entries.len();
        if index >= size {
            trace!("ledger index {} out of range ({} held)", index, size);
            return Err(LedgerError::IndexOutOfRange { index, size });
        }

        let position = if from_end { size - 1 - index } else { index };
        Ok(self.entries[position])
    }

    /// Pitch at `index` (see [`NoteLedger::entry_at`])
    pub fn note_at(&self, index: usize, from_end: bool) -> Result<Pitch, LedgerError> {
        self.entry_at(index, from_end).map(|entry| entry.pitch)
    }

    /// Channel at `index` (see [`NoteLedger::entry_at`])
    pub fn channel_at(&self, index: usize, from_end: bool) -> Result<Channel, LedgerError> {
        self.entry_at(index, from_end).map(|entry| entry.channel)
    }

    pub fn highest(&self) -> Result<NoteEntry, LedgerError> {
        self.entries.last().copied().ok_or(LedgerError::EmptyLedger)
    }

    pub fn lowest(&self) -> Result<NoteEntry, LedgerError> {
        self.entries.first().copied().ok_or(LedgerError::EmptyLedger)
    }

    pub fn highest_note(&self) -> Result<Pitch, LedgerError> {
        self.highest().map(|entry| entry.pitch)
    }

    pub fn lowest_note(&self) -> Result<Pitch, LedgerError> {
        self.lowest().map(|entry| entry.pitch)
    }

    pub fn highest_note_channel(&self) -> Result<Channel, LedgerError> {
        self.highest().map(|entry| entry.channel)
    }

    pub fn lowest_note_channel(&self) -> Result<Channel, LedgerError> {
        self.lowest().map(|entry| entry.channel)
    }

    /// Insert a held note, keeping pitch order
    pub fn add_note(&mut self, pitch: Pitch, channel: Channel) {
        // First slot whose pitch is not less than the new one
        let position = self.entries.partition_point(|entry| entry.pitch < pitch);
        self.entries.insert(position, NoteEntry { pitch, channel });
    }

    /// Remove the lowest entry matching both pitch and channel.
    /// Returns false and leaves the ledger untouched when nothing matches.
    pub fn remove_note(&mut self, pitch: Pitch, channel: Channel) -> bool {
        match self
            .entries
            .iter()
            .position(|entry| entry.pitch == pitch && entry.channel == channel)
        {
            Some(position) => {
                self.entries.remove(position);
                true
            }
            None => false,
        }
    }

    /// Remove every entry held on `channel`
    pub fn remove_channel(&mut self, channel: Channel) {
        self.entries.retain(|entry| entry.channel != channel);
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Held entries, lowest pitch first
    pub fn iter(&self) -> impl Iterator<Item = &NoteEntry> {
        self.entries.iter()
    }
}

impl Default for NoteLedger {
    fn default() -> Self {
        Self::new()
    }
}
