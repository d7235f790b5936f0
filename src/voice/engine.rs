use crossbeam_channel::{unbounded, Receiver, Sender};
use std::sync::{atomic::Ordering, Arc};

use super::mono::{MonoVoice, NotePriority, VoiceSnapshot};
use super::parameters::VoiceParameters;
use crate::glide::{Clock, SystemClock};
use crate::types::events::SynthEvent;

/// MIDI channel filter value accepting every channel
pub const OMNI: u8 = 255;

/// Mono voice driven by MIDI events, polled from the control loop
pub struct MonoEngine<C: Clock = SystemClock> {
    voice: MonoVoice<C>,
    parameters: Arc<VoiceParameters>,
    event_rx: Receiver<SynthEvent>,
    midi_channel_filter: u8, // 0-15 for specific channel, 255 for omni
}

impl MonoEngine<SystemClock> {
    pub fn new(
        parameters: Arc<VoiceParameters>,
        event_rx: Receiver<SynthEvent>,
        midi_channel_filter: u8,
        priority: NotePriority,
        bend_range: u8,
    ) -> Self {
        Self::with_clock(
            SystemClock::new(),
            parameters,
            event_rx,
            midi_channel_filter,
            priority,
            bend_range,
        )
    }
}

impl<C: Clock> MonoEngine<C> {
    pub fn with_clock(
        clock: C,
        parameters: Arc<VoiceParameters>,
        event_rx: Receiver<SynthEvent>,
        midi_channel_filter: u8,
        priority: NotePriority,
        bend_range: u8,
    ) -> Self {
        let mut voice = MonoVoice::new(clock, priority, bend_range);
        voice.set_glide_time(parameters.glide_ms.load(Ordering::Relaxed));
        voice.set_transpose(parameters.transpose.load(Ordering::Relaxed));

        Self {
            voice,
            parameters,
            event_rx,
            midi_channel_filter,
        }
    }

    /// Check if this engine should process the given event
    fn should_process_event(&self, event: &SynthEvent) -> bool {
        if self.midi_channel_filter == OMNI {
            return true;
        }

        match event.channel() {
            Some(ch) => ch == self.midi_channel_filter,
            None => true, // AllNotesOff affects all
        }
    }

    fn handle_event(&mut self, event: SynthEvent) {
        match event {
            SynthEvent::NoteOn { channel, note, .. } => self.voice.note_on(channel, note),
            SynthEvent::NoteOff { channel, note } => {
                self.voice.note_off(channel, note);
            }
            SynthEvent::ControlChange { channel, controller, value } => {
                self.voice.control_change(channel, controller, value)
            }
            SynthEvent::PitchBend { channel, amount } => self.voice.pitch_bend(channel, amount),
            SynthEvent::AllNotesOff { channel } => self.voice.all_notes_off(channel),
        }
    }

    /// Drain pending events, apply parameter changes and read the voice
    pub fn poll(&mut self) -> VoiceSnapshot {
        // Parameters first so notes arriving now use the current glide time
        let glide = self.parameters.glide_ms.load(Ordering::Relaxed);
        self.voice.set_glide_time(glide);

        let transpose = self.parameters.transpose.load(Ordering::Relaxed);
        self.voice.set_transpose(transpose);

        while let Ok(event) = self.event_rx.try_recv() {
            if self.should_process_event(&event) {
                self.handle_event(event);
            }
        }

        self.voice.snapshot()
    }

    pub fn voice(&self) -> &MonoVoice<C> {
        &self.voice
    }
}

/// One configured voice: parameters, channel filter and note priority
pub struct VoiceSpec {
    pub parameters: Arc<VoiceParameters>,
    pub midi_channel: u8,
    pub priority: NotePriority,
    pub bend_range: u8,
}

/// Several independent mono voices sharing one MIDI input
pub struct MultiVoice<C: Clock + Clone = SystemClock> {
    engines: Vec<MonoEngine<C>>,
    main_event_rx: Receiver<SynthEvent>,
    engine_event_txs: Vec<Sender<SynthEvent>>,
}

impl<C: Clock + Clone> MultiVoice<C> {
    /// Events from `main_event_rx` are broadcast to every voice
    pub fn new(clock: C, specs: Vec<VoiceSpec>, main_event_rx: Receiver<SynthEvent>) -> Self {
        let mut engines = Vec::new();
        let mut engine_event_txs = Vec::new();

        for spec in specs {
            let (event_tx, event_rx) = unbounded();
            engines.push(MonoEngine::with_clock(
                clock.clone(),
                spec.parameters,
                event_rx,
                spec.midi_channel,
                spec.priority,
                spec.bend_range,
            ));
            engine_event_txs.push(event_tx);
        }

        Self {
            engines,
            main_event_rx,
            engine_event_txs,
        }
    }

    pub fn len(&self) -> usize {
        self.engines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.engines.is_empty()
    }

    /// Broadcast pending events and poll every voice, in configuration order
    pub fn poll(&mut self) -> Vec<VoiceSnapshot> {
        while let Ok(event) = self.main_event_rx.try_recv() {
            for event_tx in &self.engine_event_txs {
                // Unbounded, so this only fails if the engine is gone
                let _ = event_tx.try_send(event);
            }
        }

        self.engines.iter_mut().map(|engine| engine.poll()).collect()
    }
}
