use anyhow::Result;
use clap::Parser;
use log::info;
use std::{path::PathBuf, sync::Arc, time::Duration};

use glide_chord::config::VoiceManagerConfig;
use glide_chord::glide::SystemClock;
use glide_chord::midi::handler::MidiHandler;
use glide_chord::types::note::{note_name, pitch_to_frequency};
use glide_chord::voice::engine::{MultiVoice, VoiceSpec};
use glide_chord::voice::mono::VoiceSnapshot;
use glide_chord::voice::parameters::VoiceParameters;

/// Control loop period (~100 Hz)
const CONTROL_PERIOD: Duration = Duration::from_millis(10);

/// Monophonic note-priority and glide monitor for MIDI input
#[derive(Parser, Debug)]
#[command(name = "glide-chord")]
#[command(about = "Mono voice note priority and portamento monitor", long_about = None)]
struct Args {
    /// Configuration file (YAML)
    #[arg(short = 'c', long = "config", required_unless_present = "list_devices")]
    config: Option<PathBuf>,

    /// List available MIDI input devices and exit
    #[arg(short = 'l', long = "list")]
    list_devices: bool,
}

/// Find MIDI device index by name or index string
fn find_midi_device(devices: &[String], search: &str) -> Result<usize> {
    // Try to parse as index first
    if let Ok(index) = search.parse::<usize>() {
        if index < devices.len() {
            return Ok(index);
        } else {
            return Err(anyhow::anyhow!(
                "MIDI device index {} out of range ({} devices)",
                index,
                devices.len()
            ));
        }
    }

    // Search by name (case-insensitive substring match)
    let search_lower = search.to_lowercase();
    for (i, device) in devices.iter().enumerate() {
        if device.to_lowercase().contains(&search_lower) {
            return Ok(i);
        }
    }

    Err(anyhow::anyhow!("MIDI device '{}' not found", search))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let midi_devices = MidiHandler::list_devices()?;

    if args.list_devices {
        println!("Available MIDI Input Devices:");
        for (i, device) in midi_devices.iter().enumerate() {
            println!("  {}: {}", i, device);
        }
        return Ok(());
    }

    let Some(config_path) = args.config else {
        return Err(anyhow::anyhow!("--config is required"));
    };
    run(config_path, midi_devices)
}

/// Connect MIDI input and poll every configured voice until interrupted
fn run(config_path: PathBuf, midi_devices: Vec<String>) -> Result<()> {
    let config = VoiceManagerConfig::load(&config_path)?;
    let selected_midi_device = find_midi_device(&midi_devices, &config.devices.midiin)?;

    let (event_tx, event_rx) = crossbeam_channel::unbounded();

    let specs = config
        .voices
        .iter()
        .map(|voice| VoiceSpec {
            parameters: Arc::new(VoiceParameters::new_with_config(voice.transpose, voice.glide)),
            midi_channel: voice.midi_channel_filter(),
            priority: voice.priority,
            bend_range: voice.bendrange,
        })
        .collect();
    let mut voices = MultiVoice::new(SystemClock::new(), specs, event_rx);

    let _midi_handler = MidiHandler::new_with_device(event_tx, selected_midi_device)?;
    info!("Monitoring {} voice(s), Ctrl-C to quit", voices.len());

    let mut last: Vec<Option<VoiceSnapshot>> = vec![None; voices.len()];
    loop {
        for (idx, snapshot) in voices.poll().into_iter().enumerate() {
            if last[idx] != Some(snapshot) {
                report(&config.voices[idx].name, &snapshot);
                last[idx] = Some(snapshot);
            }
        }

        std::thread::sleep(CONTROL_PERIOD);
    }
}

fn report(name: &str, snapshot: &VoiceSnapshot) {
    match (snapshot.note, snapshot.pitch) {
        (Some(note), Some(pitch)) => info!(
            "[{}] {} (ch {}) pitch {:.3} ({:.2} Hz) glide {:+.3} held {}",
            name,
            note_name(note),
            snapshot.channel.map_or(0, |ch| ch + 1),
            pitch,
            pitch_to_frequency(pitch),
            snapshot.glide_offset,
            snapshot.held
        ),
        _ => info!("[{}] gate off", name),
    }
}
