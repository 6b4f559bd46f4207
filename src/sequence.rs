use std::fmt;

use tracing::debug;

use crate::euclid::{self, RhythmPattern};

/// A generated pattern played back circularly.
///
/// `offset` is the net rotation applied on top of the generated pattern. It is
/// reapplied on every `calculate` so that editing the pulse count keeps the phase.
#[derive(Debug, Clone)]
pub struct Sequence {
    pattern: RhythmPattern,
    length: u8,
    offset: i8,
    pos: u8,
}

impl Sequence {
    pub fn new(length: u8) -> Self {
        let length = length.clamp(1, euclid::MAX_LENGTH);

        Self {
            pattern: euclid::generate(length, 0),
            length,
            offset: 0,
            pos: 0,
        }
    }

    pub fn pattern(&self) -> RhythmPattern {
        self.pattern
    }

    pub fn len(&self) -> u8 {
        self.length
    }

    pub fn offset(&self) -> i8 {
        self.offset
    }

    pub fn position(&self) -> u8 {
        self.pos
    }

    pub fn pulses(&self) -> u8 {
        self.pattern.pulses()
    }

    /// Change the logical length. Takes effect on the pattern with the next `calculate`.
    pub fn set_length(&mut self, length: u8) {
        debug_assert!((1..=euclid::MAX_LENGTH).contains(&length));

        self.length = length.clamp(1, euclid::MAX_LENGTH);
        if self.pos >= self.length {
            self.pos %= self.length;
        }
    }

    pub fn calculate(&mut self, pulses: u8) {
        let pattern = euclid::generate(self.length, pulses.min(self.length));
        self.install(pattern);
    }

    /// Replace the pattern with one generated elsewhere, keeping the current rotation.
    pub fn install(&mut self, pattern: RhythmPattern) {
        self.length = pattern.len();
        self.pattern = Self::rotate(pattern, self.offset);
        if self.pos >= self.length {
            self.pos = 0;
        }

        debug!(
            "pattern {} (offset {}, {} of {})",
            self.pattern,
            self.offset,
            self.pattern.pulses(),
            self.length
        );
    }

    pub fn rotate_left(&mut self, steps: u8) {
        self.pattern = self.pattern.rotated_left(steps % self.length);
        self.offset = self.shifted_offset(steps as i16);
    }

    pub fn rotate_right(&mut self, steps: u8) {
        self.pattern = self.pattern.rotated_right(steps % self.length);
        self.offset = self.shifted_offset(-(steps as i16));
    }

    /// Rotate to an absolute offset, in whichever direction the target lies.
    pub fn rotate_to(&mut self, target: i8) {
        let delta = target as i16 - self.offset as i16;
        if delta > 0 {
            self.rotate_left(delta as u8);
        } else if delta < 0 {
            self.rotate_right(-delta as u8);
        }
        self.offset = target;
    }

    /// Read the current step and advance the cursor. Call once per clock edge.
    pub fn next(&mut self) -> bool {
        if self.pos >= self.length {
            self.pos = 0;
        }

        let pulse = self.pattern.is_pulse(self.pos);

        self.pos += 1;
        if self.pos >= self.length {
            self.pos = 0;
        }

        pulse
    }

    /// True when the cursor sits on the first step, i.e. a full cycle just ended.
    pub fn at_cycle_start(&self) -> bool {
        self.pos == 0
    }

    pub fn reset(&mut self) {
        self.pos = (self.offset as i16).rem_euclid(self.length as i16) as u8;
    }

    fn rotate(pattern: RhythmPattern, offset: i8) -> RhythmPattern {
        let steps = (offset as i16).rem_euclid(pattern.len() as i16) as u8;
        pattern.rotated_left(steps)
    }

    // Offsets stay as the caller gave them unless they leave the i8 range,
    // in which case they are folded back into one cycle.
    fn shifted_offset(&self, delta: i16) -> i8 {
        let offset = self.offset as i16 + delta;
        i8::try_from(offset).unwrap_or_else(|_| offset.rem_euclid(self.length as i16) as i8)
    }
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.pattern)
    }
}
