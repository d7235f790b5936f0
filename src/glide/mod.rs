//! Linear portamento as a function of elapsed milliseconds.
//!
//! The engine does not move the pitch itself; it reports an offset in
//! semitones to add to the destination note. The offset starts at
//! `source - destination` and decays linearly to zero over the glide duration.
//! Expiry is lazy: the glide returns to idle the first time the offset is
//! queried after the duration has elapsed.

pub mod clock;

use log::{debug, trace};
use thiserror::Error;

pub use clock::{Clock, ManualClock, SystemClock};

/// "No previous note" marker. Starting a glide from it does nothing.
pub const NO_NOTE: u8 = 0xFF;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GlideError {
    #[error("glide duration must be at least 1 ms")]
    InvalidDuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlideState {
    Idle,
    Gliding,
}

/// Single retriggerable glide session driven by a millisecond clock
#[derive(Debug)]
pub struct GlideEngine<C: Clock> {
    clock: C,
    state: GlideState,
    start_time: u32,
    duration_ms: u32,
    increment: f32, // Semitones per millisecond
}

impl<C: Clock> GlideEngine<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            state: GlideState::Idle,
            start_time: 0,
            duration_ms: 1,
            increment: 0.0,
        }
    }

    pub fn state(&self) -> GlideState {
        self.state
    }

    /// Whether a glide was started and has not been stopped or observed expired
    pub fn is_gliding(&self) -> bool {
        self.state == GlideState::Gliding
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Start gliding from `source` to `destination` over `duration_ms`, now
    pub fn start_glide(
        &mut self,
        source: u8,
        destination: u8,
        duration_ms: u32,
    ) -> Result<(), GlideError> {
        let now = self.clock.now_ms();
        self.start_glide_at(now, source, destination, duration_ms)
    }

    /// Start a glide with an explicit start timestamp.
    /// A zero duration is rejected and leaves the current session untouched.
    pub fn start_glide_at(
        &mut self,
        now: u32,
        source: u8,
        destination: u8,
        duration_ms: u32,
    ) -> Result<(), GlideError> {
        if duration_ms == 0 {
            return Err(GlideError::InvalidDuration);
        }

        if source == NO_NOTE {
            trace!("glide to {} suppressed: no previous note", destination);
            return Ok(());
        }

        // Reversed so the destination note stays the reference point
        let distance = source as f32 - destination as f32;
        self.duration_ms = duration_ms;
        self.increment = distance / duration_ms as f32;
        self.start_time = now;
        self.state = GlideState::Gliding;

        debug!(
            "glide {} -> {} over {} ms started at {}",
            source, destination, duration_ms, now
        );
        Ok(())
    }

    /// Cancel any running glide
    pub fn stop_glide(&mut self) {
        self.state = GlideState::Idle;
    }

    /// Current offset in semitones. Returns to idle once the glide has run out.
    pub fn current_offset(&mut self) -> f32 {
        let now = self.clock.now_ms();
        self.offset_at(now)
    }

    /// Offset at an explicit timestamp, with the same lazy expiry as
    /// [`GlideEngine::current_offset`]
    pub fn offset_at(&mut self, now: u32) -> f32 {
        if self.state == GlideState::Idle {
            return 0.0;
        }

        let elapsed = now.wrapping_sub(self.start_time);
        if elapsed >= self.duration_ms {
            debug!("glide finished after {} ms", elapsed);
            self.state = GlideState::Idle;
            0.0
        } else {
            self.increment * (self.duration_ms - elapsed) as f32
        }
    }
}

impl Default for GlideEngine<SystemClock> {
    fn default() -> Self {
        Self::new(SystemClock::new())
    }
}
