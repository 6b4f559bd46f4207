use tracing::trace;

use crate::sequence::Sequence;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Disabled,
    /// Short gate on every pulse, released on the falling clock edge.
    Triggering,
    /// The gate flips on every pulse and holds between them.
    Alternating,
}

impl Mode {
    /// The trigger switch wins when both are engaged.
    pub fn from_switches(trigger: bool, alternate: bool) -> Self {
        if trigger {
            Mode::Triggering
        } else if alternate {
            Mode::Alternating
        } else {
            Mode::Disabled
        }
    }
}

/// Mode and chain role of a channel.
///
/// `Standalone` channels run their own cycle. In a chain, the `Leading` channel
/// plays and pushes its gate to the `Following` one until its cycle ends, then
/// the roles swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateState {
    Standalone(Mode),
    Leading(Mode),
    Following(Mode),
}

impl GateState {
    pub fn mode(&self) -> Mode {
        match *self {
            GateState::Standalone(mode) | GateState::Leading(mode) | GateState::Following(mode) => {
                mode
            }
        }
    }

    /// Same role, new mode.
    pub fn with_mode(self, mode: Mode) -> Self {
        match self {
            GateState::Standalone(_) => GateState::Standalone(mode),
            GateState::Leading(_) => GateState::Leading(mode),
            GateState::Following(_) => GateState::Following(mode),
        }
    }

    pub fn is_leading(&self) -> bool {
        matches!(self, GateState::Leading(_))
    }

    pub fn is_following(&self) -> bool {
        matches!(self, GateState::Following(_))
    }

    pub fn is_standalone(&self) -> bool {
        matches!(self, GateState::Standalone(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            GateState::Standalone(Mode::Disabled) => "DISABLED",
            GateState::Standalone(Mode::Triggering) => "TRIGGERING",
            GateState::Standalone(Mode::Alternating) => "ALTERNATING",
            GateState::Leading(Mode::Disabled) => "DISABLED_LEADING",
            GateState::Leading(Mode::Triggering) => "TRIGGERING_LEADING",
            GateState::Leading(Mode::Alternating) => "ALTERNATING_LEADING",
            GateState::Following(Mode::Disabled) => "DISABLED_FOLLOWING",
            GateState::Following(Mode::Triggering) => "TRIGGERING_FOLLOWING",
            GateState::Following(Mode::Alternating) => "ALTERNATING_FOLLOWING",
        }
    }
}

/// One gate output driven by a sequence.
#[derive(Debug, Clone)]
pub struct GateChannel {
    sequence: Sequence,
    state: GateState,
    output: bool,
}

impl GateChannel {
    pub fn new(length: u8) -> Self {
        Self {
            sequence: Sequence::new(length),
            state: GateState::Standalone(Mode::Disabled),
            output: false,
        }
    }

    pub fn sequence(&self) -> &Sequence {
        &self.sequence
    }

    pub fn sequence_mut(&mut self) -> &mut Sequence {
        &mut self.sequence
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode()
    }

    pub fn is_on(&self) -> bool {
        self.output
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.state = self.state.with_mode(mode);
    }

    pub(crate) fn set_state(&mut self, state: GateState) {
        self.state = state;
    }

    /// Rising clock edge. Returns true when a leading channel just finished its
    /// cycle and should hand the lead over.
    pub fn rise(&mut self) -> bool {
        match self.state {
            GateState::Following(_) => false,
            GateState::Standalone(mode) => {
                self.play(mode);
                false
            }
            GateState::Leading(mode) => {
                self.play(mode);
                self.sequence.at_cycle_start()
            }
        }
    }

    /// Falling clock edge.
    pub fn fall(&mut self) {
        match self.state {
            GateState::Standalone(Mode::Triggering | Mode::Disabled)
            | GateState::Leading(Mode::Triggering | Mode::Disabled) => self.off(),
            GateState::Standalone(Mode::Alternating)
            | GateState::Leading(Mode::Alternating)
            | GateState::Following(_) => (),
        }
    }

    /// Gate level pushed by the leading channel.
    pub fn follow(&mut self, on: bool) {
        self.output = on;
    }

    /// Back to the rotated start, gate off. Mode and role are kept.
    pub fn reset(&mut self) {
        self.sequence.reset();
        self.off();
    }

    fn play(&mut self, mode: Mode) {
        let step = self.sequence.position();
        let pulse = self.sequence.next();

        match mode {
            Mode::Triggering => {
                if pulse {
                    self.output = true;
                }
            }
            Mode::Alternating => {
                if pulse {
                    self.output = !self.output;
                }
            }
            Mode::Disabled => self.off(),
        }

        trace!(
            "step {} {} -> {}",
            step,
            if pulse { "x" } else { "-" },
            if self.output { "on" } else { "off" }
        );
    }

    fn off(&mut self) {
        self.output = false;
    }
}
