// Bjorklund's rep-rate pattern algorithm, see
// "The Theory of Rep-Rate Pattern Generation in the SNS Timing System" (E. Bjorklund).
//
// count[] and remainder[] hold the continued-fraction expansion of pulses/length.
// The expansion then walks the levels from the deepest one:
//   level -1 -> one rest
//   level -2 -> one pulse
//   level  L -> count[L] times level L-1, then level L-2 if remainder[L] != 0
use std::fmt;

use tracing::warn;

/// Patterns are stored in a single word, one bit per step.
pub const MAX_LENGTH: u8 = u32::BITS as u8;

// Remainders shrink at least as fast as a Fibonacci sequence, 32 steps never go deeper than this.
const MAX_LEVELS: usize = 10;

const REST: i8 = -1;
const PULSE: i8 = -2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RhythmPattern {
    bits: u32,
    length: u8,
}

impl RhythmPattern {
    pub fn from_bits(bits: u32, length: u8) -> Self {
        debug_assert!((1..=MAX_LENGTH).contains(&length));

        Self {
            bits: bits & Self::mask(length),
            length,
        }
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn len(&self) -> u8 {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    pub fn pulses(&self) -> u8 {
        self.bits.count_ones() as u8
    }

    pub fn is_pulse(&self, step: u8) -> bool {
        step < self.length && self.bits & (1 << step) != 0
    }

    /// Step `i` takes the value of step `i + steps`.
    pub fn rotated_left(&self, steps: u8) -> Self {
        let steps = (steps % self.length) as u32;
        if steps == 0 {
            return *self;
        }

        let length = self.length as u32;
        let bits = (self.bits >> steps) | (self.bits << (length - steps));

        Self::from_bits(bits, self.length)
    }

    /// Step `i + steps` takes the value of step `i`.
    pub fn rotated_right(&self, steps: u8) -> Self {
        let steps = steps % self.length;
        self.rotated_left((self.length - steps) % self.length)
    }

    /// Cyclic distances between consecutive pulses, starting from the first pulse.
    pub fn gaps(&self) -> Vec<u8> {
        let onsets: Vec<u8> = (0..self.length).filter(|&s| self.is_pulse(s)).collect();

        onsets
            .iter()
            .enumerate()
            .map(|(i, &onset)| match onsets.get(i + 1) {
                Some(&next) => next - onset,
                None => onsets[0] + self.length - onset,
            })
            .collect()
    }

    fn mask(length: u8) -> u32 {
        if length >= MAX_LENGTH {
            u32::MAX
        } else {
            (1u32 << length) - 1
        }
    }
}

impl fmt::Display for RhythmPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for step in 0..self.length {
            f.write_str(if self.is_pulse(step) { "x" } else { "-" })?;
        }
        Ok(())
    }
}

/// Distribute `pulses` onsets over `length` steps as evenly as possible.
///
/// Requires `1 <= length <= MAX_LENGTH` and `pulses <= length`. Callers derive both
/// from bounded controls, so out of range arguments are clamped (and assert in debug builds).
pub fn generate(length: u8, pulses: u8) -> RhythmPattern {
    debug_assert!(
        (1..=MAX_LENGTH).contains(&length) && pulses <= length,
        "invalid pattern request: {} pulses over {} steps",
        pulses,
        length
    );

    let length = if (1..=MAX_LENGTH).contains(&length) {
        length
    } else {
        warn!("pattern length {} out of range, clamping", length);
        length.clamp(1, MAX_LENGTH)
    };
    let pulses = if pulses > length {
        warn!("{} pulses exceed {} steps, clamping", pulses, length);
        length
    } else {
        pulses
    };

    if pulses == 0 {
        return RhythmPattern::from_bits(0, length);
    }
    if pulses == length {
        return RhythmPattern::from_bits(u32::MAX, length);
    }

    let mut count = [0u8; MAX_LEVELS];
    let mut remainder = [0u8; MAX_LEVELS + 1];

    let mut divisor = length - pulses;
    remainder[0] = pulses;
    let mut level = 0;
    loop {
        count[level] = divisor / remainder[level];
        remainder[level + 1] = divisor % remainder[level];
        divisor = remainder[level];
        level += 1;

        if remainder[level] <= 1 {
            break;
        }
    }
    count[level] = divisor;

    RhythmPattern::from_bits(expand(level, &count, &remainder, length), length)
}

// Every pending stack entry expands to at least one step, so the stack never
// holds more entries than there are steps left to fill.
fn expand(top: usize, count: &[u8], remainder: &[u8], length: u8) -> u32 {
    let mut stack = [0i8; MAX_LENGTH as usize + 1];
    let mut depth = 0;
    stack[depth] = top as i8;
    depth += 1;

    let mut bits = 0u32;
    // Emission order runs from the last step back to step 0.
    let mut slot = length;

    while depth > 0 {
        depth -= 1;
        match stack[depth] {
            REST => slot -= 1,
            PULSE => {
                slot -= 1;
                bits |= 1 << slot;
            }
            level => {
                let level = level as usize;
                // Pushed in reverse so that they pop in emission order.
                if remainder[level] != 0 {
                    stack[depth] = level as i8 - 2;
                    depth += 1;
                }
                for _ in 0..count[level] {
                    stack[depth] = level as i8 - 1;
                    depth += 1;
                }
            }
        }
    }

    debug_assert_eq!(slot, 0);
    bits
}

#[cfg(test)]
mod tests {
    use super::{generate, RhythmPattern, MAX_LENGTH};

    fn steps(pattern: RhythmPattern) -> Vec<u8> {
        (0..pattern.len()).map(|s| pattern.is_pulse(s) as u8).collect()
    }

    #[test]
    fn test_golden_vectors() {
        assert_eq!(steps(generate(8, 3)), vec![1, 0, 0, 1, 0, 0, 1, 0]);
        assert_eq!(
            steps(generate(16, 4)),
            vec![1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0, 1, 0, 0, 0]
        );
        assert_eq!(steps(generate(9, 4)), vec![0, 1, 0, 1, 0, 1, 0, 1, 0]);
        assert_eq!(generate(5, 2).to_string(), "-x-x-");
        assert_eq!(generate(13, 5).to_string(), "-x-x--x-x--x-");
    }

    #[test]
    fn test_degenerate_patterns() {
        for length in 1..=MAX_LENGTH {
            let empty = generate(length, 0);
            assert!(empty.is_empty());
            assert_eq!(empty.len(), length);

            let full = generate(length, length);
            assert_eq!(full.pulses(), length);
            assert!((0..length).all(|s| full.is_pulse(s)));
        }
    }

    #[test]
    fn test_pulse_count() {
        for length in 1..=MAX_LENGTH {
            for pulses in 0..=length {
                assert_eq!(
                    generate(length, pulses).pulses(),
                    pulses,
                    "{} of {}",
                    pulses,
                    length
                );
            }
        }
    }

    #[test]
    fn test_maximal_evenness() {
        for length in 1..=MAX_LENGTH {
            for pulses in 1..=length {
                let gaps = generate(length, pulses).gaps();
                let min = gaps.iter().min().unwrap();
                let max = gaps.iter().max().unwrap();

                assert!(max - min <= 1, "{} of {}: {:?}", pulses, length, gaps);
                assert_eq!(gaps.iter().map(|&g| g as u32).sum::<u32>(), length as u32);
            }
        }
    }

    #[test]
    fn test_deterministic() {
        for length in 1..=MAX_LENGTH {
            for pulses in 0..=length {
                assert_eq!(generate(length, pulses), generate(length, pulses));
            }
        }
    }

    #[test]
    fn test_full_word() {
        let p = generate(32, 32);
        assert_eq!(p.bits(), u32::MAX);

        let p = generate(32, 1);
        assert_eq!(p.pulses(), 1);
        assert!(p.is_pulse(0));
    }

    #[test]
    fn test_rotation() {
        let p = RhythmPattern::from_bits(0b0001, 4);

        assert_eq!(p.rotated_left(1).to_string(), "---x");
        assert_eq!(p.rotated_right(1).to_string(), "-x--");
        assert_eq!(p.rotated_left(5), p.rotated_left(1));
        assert_eq!(p.rotated_left(4), p);

        let p = generate(13, 5);
        for k in 0..13 {
            assert_eq!(p.rotated_left(k).rotated_right(k), p);
        }
    }

    #[test]
    fn test_from_bits_masks_unused_steps() {
        let p = RhythmPattern::from_bits(0b1111_0101, 4);
        assert_eq!(p.bits(), 0b0101);
        assert!(!p.is_pulse(6));
    }
}
