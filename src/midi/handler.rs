use anyhow::{anyhow, Context, Result};
use crossbeam_channel::Sender;
use log::{info, warn};
use midir::{MidiInput, MidiInputConnection};

use super::message::MidiMessage;
use crate::types::events::SynthEvent;

/// MIDI input handler
/// Manages MIDI device connection and sends decoded events to the control loop
pub struct MidiHandler {
    _connection: MidiInputConnection<()>,
}

impl MidiHandler {
    /// Connect to the MIDI input device at `device_index`
    /// Sends decoded events through the provided channel
    pub fn new_with_device(event_tx: Sender<SynthEvent>, device_index: usize) -> Result<Self> {
        let midi_in = MidiInput::new("glide-chord-input")?;
        let ports = midi_in.ports();

        let selected_port = ports.get(device_index).ok_or_else(|| {
            anyhow!(
                "MIDI device index {} not available ({} devices)",
                device_index,
                ports.len()
            )
        })?;
        let port_name = midi_in
            .port_name(selected_port)
            .unwrap_or_else(|_| "Unknown".to_string());

        info!("Connecting to MIDI input: {}", port_name);

        let connection = midi_in
            .connect(
                selected_port,
                "glide-chord-input",
                move |_timestamp, bytes, _| {
                    let message = MidiMessage::parse(bytes);

                    if let Some(event) = message.to_synth_event() {
                        // Use try_send to avoid blocking MIDI thread
                        if event_tx.try_send(event).is_err() {
                            warn!("Dropped MIDI event {:?}", event);
                        }
                    }
                },
                (),
            )
            .map_err(|e| anyhow!("Failed to connect to MIDI port: {}", e))
            .with_context(|| format!("Opening MIDI input '{}'", port_name))?;

        Ok(Self {
            _connection: connection,
        })
    }

    /// List all available MIDI input devices
    pub fn list_devices() -> Result<Vec<String>> {
        let midi_in = MidiInput::new("glide-chord-list")?;
        let ports = midi_in.ports();

        let mut devices = Vec::new();
        for port in ports.iter() {
            if let Ok(name) = midi_in.port_name(port) {
                devices.push(name);
            }
        }

        Ok(devices)
    }
}
