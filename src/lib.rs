//! Note-priority and pitch-glide core for a monophonic MIDI voice.
//!
//! [`ledger::NoteLedger`] keeps held notes sorted by pitch, [`glide::GlideEngine`]
//! produces a decaying pitch offset between two notes. The [`voice`] module
//! composes both into a reference mono voice fed by decoded [`midi`] events.

pub mod config;
pub mod glide;
pub mod ledger;
pub mod midi;
pub mod types;
pub mod voice;
