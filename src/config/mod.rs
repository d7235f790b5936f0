use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::voice::engine::OMNI;
use crate::voice::mono::NotePriority;

const MAX_GLIDE_MS: u32 = 10_000;
const MAX_TRANSPOSE: i8 = 48;
const MAX_BEND_RANGE: u8 = 24;

/// Top-level configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VoiceManagerConfig {
    pub devices: DeviceConfig,

    #[serde(default)]
    pub voices: Vec<VoiceConfig>,
}

impl VoiceManagerConfig {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: VoiceManagerConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.voices.is_empty() {
            return Err(anyhow!("Configuration must have at least one voice"));
        }

        for (idx, voice) in self.voices.iter().enumerate() {
            voice
                .validate()
                .with_context(|| format!("Invalid configuration for voice {}", idx))?;
        }

        Ok(())
    }
}

/// Device configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DeviceConfig {
    /// Index or case-insensitive name fragment
    pub midiin: String,
}

/// Individual mono voice configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VoiceConfig {
    #[serde(default = "default_name", skip_serializing_if = "String::is_empty")]
    pub name: String,

    pub midich: MidiChannelSpec,

    #[serde(default)]
    pub priority: NotePriority,

    /// Glide time in milliseconds, 0 = off
    #[serde(default)]
    pub glide: u32,

    #[serde(default)]
    pub transpose: i8,

    /// Initial pitch bend sensitivity in semitones
    #[serde(default = "default_bend_range")]
    pub bendrange: u8,
}

impl VoiceConfig {
    /// Validate this voice configuration
    pub fn validate(&self) -> Result<()> {
        // Validate MIDI channel (1-16)
        match &self.midich {
            MidiChannelSpec::Channel(ch) => {
                if *ch < 1 || *ch > 16 {
                    return Err(anyhow!("MIDI channel must be between 1 and 16"));
                }
            }
            MidiChannelSpec::Omni(name) => {
                let name = name.to_lowercase();
                if name != "omni" && name != "all" {
                    return Err(anyhow!(
                        "MIDI channel must be 1-16, \"omni\" or \"all\", got \"{}\"",
                        name
                    ));
                }
            }
        }

        if self.glide > MAX_GLIDE_MS {
            return Err(anyhow!("Glide must be between 0 and {} ms", MAX_GLIDE_MS));
        }
        if self.transpose < -MAX_TRANSPOSE || self.transpose > MAX_TRANSPOSE {
            return Err(anyhow!(
                "Transpose must be between -{} and {} semitones",
                MAX_TRANSPOSE,
                MAX_TRANSPOSE
            ));
        }
        if self.bendrange > MAX_BEND_RANGE {
            return Err(anyhow!(
                "Bend range must be between 0 and {} semitones",
                MAX_BEND_RANGE
            ));
        }

        Ok(())
    }

    /// Get the MIDI channel filter value (0-15 for specific channel, 255 for omni)
    pub fn midi_channel_filter(&self) -> u8 {
        match &self.midich {
            MidiChannelSpec::Channel(ch) => ch - 1, // Convert 1-16 to 0-15
            MidiChannelSpec::Omni(_) => OMNI,
        }
    }
}

/// MIDI channel specification - either a specific channel (1-16) or omni
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(untagged)]
pub enum MidiChannelSpec {
    Channel(u8),
    Omni(String), // "omni" or "all"
}

// Default value functions for serde
fn default_name() -> String {
    "Untitled".to_string()
}

fn default_bend_range() -> u8 {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_config() {
        let yaml = r#"
devices:
  midiin: "test-midi"

voices:
  - name: "Lead"
    midich: 1
    priority: highest
    glide: 120
    transpose: 12
  - name: "Bass"
    midich: 2
    priority: lowest
    glide: 0
    bendrange: 12
"#;

        let config: VoiceManagerConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.voices.len(), 2);
        assert_eq!(config.voices[0].name, "Lead");
        assert_eq!(config.voices[0].glide, 120);
        assert_eq!(config.voices[0].transpose, 12);
        assert_eq!(config.voices[1].priority, NotePriority::Lowest);
        assert_eq!(config.voices[1].bendrange, 12);
        assert_eq!(config.voices[1].midi_channel_filter(), 1);
    }

    #[test]
    fn test_parse_omni_channel() {
        let yaml = r#"
devices:
  midiin: "test-midi"

voices:
  - midich: omni
"#;

        let config: VoiceManagerConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.voices[0].midi_channel_filter(), OMNI);
    }

    #[test]
    fn test_reject_unknown_channel_name() {
        let yaml = r#"
devices:
  midiin: "test-midi"

voices:
  - midich: everything
"#;

        let config: VoiceManagerConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_midi_channel_range() {
        let yaml = r#"
devices:
  midiin: "test-midi"

voices:
  - midich: 17
"#;

        let config: VoiceManagerConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_glide_and_transpose_ranges() {
        let yaml = r#"
devices:
  midiin: "test-midi"

voices:
  - midich: 1
    glide: 20000
"#;
        let config: VoiceManagerConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());

        let yaml = r#"
devices:
  midiin: "test-midi"

voices:
  - midich: 1
    transpose: -60
"#;
        let config: VoiceManagerConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_requires_a_voice() {
        let yaml = r#"
devices:
  midiin: "test-midi"
"#;

        let config: VoiceManagerConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_defaults() {
        let yaml = r#"
devices:
  midiin: "test-midi"

voices:
  - midich: 1
"#;

        let config: VoiceManagerConfig = serde_yaml::from_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.voices[0].name, "Untitled");
        assert_eq!(config.voices[0].priority, NotePriority::Highest);
        assert_eq!(config.voices[0].glide, 0);
        assert_eq!(config.voices[0].transpose, 0);
        assert_eq!(config.voices[0].bendrange, 2);
    }
}
