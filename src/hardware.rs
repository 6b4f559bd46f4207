//! Seams to the board: the control loop reads the panel, edge handlers drive the jacks.
use crate::{device::Shared, switches::ChannelId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Steps,
    Fills,
    Rotation,
}

impl Control {
    pub const ALL: [Control; 3] = [Control::Steps, Control::Fills, Control::Rotation];

    pub fn index(self) -> usize {
        match self {
            Control::Steps => 0,
            Control::Fills => 1,
            Control::Rotation => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Led {
    Gate(ChannelId),
    Clock,
}

/// Inputs polled by the control loop.
pub trait Panel {
    /// Oversampled knob reading, `0..adc_range`.
    fn read_analog(&mut self, channel: ChannelId, control: Control) -> u16;

    /// Raw switch pin levels, see `Switches` for the layout.
    fn read_switch_levels(&mut self) -> u8;

    /// A byte arrived on the serial line.
    fn serial_requested(&mut self) -> bool {
        false
    }

    fn write_diagnostics(&mut self, _dump: &str) {}
}

/// Outputs driven from the clock and reset handlers.
pub trait Jacks {
    fn write_gate(&mut self, channel: ChannelId, on: bool);

    fn write_led(&mut self, led: Led, on: bool);

    fn reset_held(&mut self) -> bool;
}

fn write_gates(jacks: &mut impl Jacks, outputs: [bool; 2]) {
    for id in ChannelId::ALL {
        jacks.write_gate(id, outputs[id.index()]);
        jacks.write_led(Led::Gate(id), outputs[id.index()]);
    }
}

/// Clock line changed level.
pub fn clock_interrupt(shared: &Shared, jacks: &mut impl Jacks, high: bool) {
    let outputs = if high {
        shared.on_clock_rise()
    } else {
        shared.on_clock_fall()
    };

    write_gates(jacks, outputs);
    jacks.write_led(Led::Clock, high);
}

/// Reset line asserted. Returns once the line is released.
pub fn reset_interrupt(shared: &Shared, jacks: &mut impl Jacks) {
    // a reset always leaves both gates off
    write_gates(jacks, [false, false]);
    shared.on_reset(|| jacks.reset_held());
}
