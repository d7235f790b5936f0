use std::sync::atomic::{AtomicI8, AtomicU32};

/// Runtime voice parameters - thread-safe for the control loop
pub struct VoiceParameters {
    pub transpose: AtomicI8, // Transpose in semitones
    pub glide_ms: AtomicU32, // Glide time in milliseconds, 0 = off
}

impl VoiceParameters {
    pub fn new() -> Self {
        Self {
            transpose: AtomicI8::new(0),
            glide_ms: AtomicU32::new(0),
        }
    }

    pub fn new_with_config(transpose: i8, glide_ms: u32) -> Self {
        Self {
            transpose: AtomicI8::new(transpose),
            glide_ms: AtomicU32::new(glide_ms),
        }
    }
}

impl Default for VoiceParameters {
    fn default() -> Self {
        Self::new()
    }
}
