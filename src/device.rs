use std::{hint, sync::Arc};

use parking_lot::Mutex;
use tracing::debug;

use crate::{
    chain::ChainCoordinator,
    channel::Mode,
    config::DeviceConfig,
    euclid::{self, RhythmPattern},
    filter::{Deadband, Discretizer, SwitchDebouncer},
    hardware::{Control, Panel},
    switches::{ChannelId, Switches},
    trace,
};

/// State shared between the control loop and the edge handlers.
///
/// Holding the lock is the critical section: edge handlers run entirely under it,
/// and the loop only takes it to commit finished values.
#[derive(Debug)]
pub struct Shared {
    chain: Mutex<ChainCoordinator>,
}

impl Shared {
    pub fn new(chain: ChainCoordinator) -> Self {
        Self {
            chain: Mutex::new(chain),
        }
    }

    pub fn on_clock_rise(&self) -> [bool; 2] {
        let mut chain = self.chain.lock();
        chain.rise();
        chain.outputs()
    }

    pub fn on_clock_fall(&self) -> [bool; 2] {
        let mut chain = self.chain.lock();
        chain.fall();
        chain.outputs()
    }

    /// Rewind everything, then hold until `held` reports the reset line released.
    ///
    /// Nothing else runs while the line is held. Release of the line is up to the hardware.
    pub fn on_reset(&self, mut held: impl FnMut() -> bool) {
        let mut chain = self.chain.lock();
        chain.reset();
        debug!("reset");

        while held() {
            hint::spin_loop();
        }
    }

    pub fn output(&self, id: ChannelId) -> bool {
        self.chain.lock().output(id)
    }

    pub fn outputs(&self) -> [bool; 2] {
        self.chain.lock().outputs()
    }

    /// Consistent read of the whole state.
    pub fn inspect<R>(&self, f: impl FnOnce(&ChainCoordinator) -> R) -> R {
        f(&self.chain.lock())
    }

    fn update<R>(&self, f: impl FnOnce(&mut ChainCoordinator) -> R) -> R {
        f(&mut self.chain.lock())
    }
}

#[derive(Debug)]
struct AnalogControl {
    deadband: Deadband,
    discretizer: Discretizer,
}

impl AnalogControl {
    fn new(config: &DeviceConfig, range: u8) -> Self {
        Self {
            deadband: Deadband::new(config.deadband_threshold),
            discretizer: Discretizer::new(config.adc_range, range, config.chatter_divisor),
        }
    }

    fn update(&mut self, sample: u16) -> Option<u8> {
        // An invalidated discretizer has to see the current reading even if the deadband holds it back.
        let sample = self.deadband.update(sample).or_else(|| {
            self.discretizer
                .value()
                .is_none()
                .then(|| self.deadband.value())
        })?;

        self.discretizer.update(sample)
    }
}

#[derive(Debug)]
struct ChannelControls {
    steps: AnalogControl,
    fills: AnalogControl,
    rotation: AnalogControl,
    length: u8,
    pulses: u8,
    regenerate: bool,
    rotate_to: Option<i8>,
}

impl ChannelControls {
    fn new(config: &DeviceConfig) -> Self {
        let length = config.default_length;

        Self {
            steps: AnalogControl::new(config, config.steps_range),
            fills: AnalogControl::new(config, length + 1),
            rotation: AnalogControl::new(config, config.rotation_range),
            length,
            pulses: 0,
            regenerate: true,
            rotate_to: None,
        }
    }
}

/// The module: both channels, their controls and the switches.
///
/// The loop side owns the filters and calls the `update_*` setters followed by
/// `commit`, or `run_once` with a `Panel`. Edge handlers go through `shared()`.
#[derive(Debug)]
pub struct Device {
    config: DeviceConfig,
    shared: Arc<Shared>,
    controls: [ChannelControls; 2],
    switches: SwitchDebouncer<Switches>,
    regenerations: usize,
}

impl Device {
    pub fn new(config: DeviceConfig) -> Self {
        let shared = Arc::new(Shared::new(ChainCoordinator::new(config.default_length)));
        let controls = [ChannelControls::new(&config), ChannelControls::new(&config)];
        let switches = SwitchDebouncer::new(Switches::empty(), config.switch_debounce_polls);

        Self {
            config,
            shared,
            controls,
            switches,
            regenerations: 0,
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    pub fn shared(&self) -> Arc<Shared> {
        self.shared.clone()
    }

    pub fn switches(&self) -> Switches {
        self.switches.value()
    }

    /// Number of pattern regenerations so far.
    pub fn regenerations(&self) -> usize {
        self.regenerations
    }

    pub fn on_clock_rise(&self) -> [bool; 2] {
        self.shared.on_clock_rise()
    }

    pub fn on_clock_fall(&self) -> [bool; 2] {
        self.shared.on_clock_fall()
    }

    pub fn on_reset(&self, held: impl FnMut() -> bool) {
        self.shared.on_reset(held)
    }

    pub fn output(&self, id: ChannelId) -> bool {
        self.shared.output(id)
    }

    pub fn update_steps(&mut self, id: ChannelId, sample: u16) {
        let controls = &mut self.controls[id.index()];

        if let Some(position) = controls.steps.update(sample) {
            let length = (position + self.config.steps_minimum).min(euclid::MAX_LENGTH);

            controls.length = length;
            controls.pulses = controls.pulses.min(length);
            // the fills knob now spans 0..=length
            controls.fills.discretizer.set_range(length + 1);
            controls.regenerate = true;

            debug!("channel {} steps {}", id.label(), length);
        }
    }

    pub fn update_fills(&mut self, id: ChannelId, sample: u16) {
        let controls = &mut self.controls[id.index()];

        if let Some(pulses) = controls.fills.update(sample) {
            controls.pulses = pulses.min(controls.length);
            controls.regenerate = true;

            debug!("channel {} fills {}", id.label(), controls.pulses);
        }
    }

    pub fn update_rotation(&mut self, id: ChannelId, sample: u16) {
        let controls = &mut self.controls[id.index()];

        if let Some(position) = controls.rotation.update(sample) {
            let rotation = position as i8 + self.config.rotation_minimum;
            controls.rotate_to = Some(rotation);

            debug!("channel {} rotation {}", id.label(), rotation);
        }
    }

    pub fn update_switches(&mut self, levels: u8) {
        if let Some(switches) = self.switches.update(Switches::from_pin_levels(levels)) {
            debug!("switches {:?}", switches);
        }
    }

    /// Apply everything the setters collected since the last commit.
    ///
    /// Patterns are generated before entering the critical section, and each
    /// channel is regenerated at most once however many of its knobs moved.
    pub fn commit(&mut self) {
        let mut patterns: [Option<RhythmPattern>; 2] = [None, None];
        let mut rotations: [Option<i8>; 2] = [None, None];

        for id in ChannelId::ALL {
            let controls = &mut self.controls[id.index()];

            if controls.regenerate {
                controls.regenerate = false;
                patterns[id.index()] = Some(euclid::generate(controls.length, controls.pulses));
                self.regenerations += 1;
            }
            rotations[id.index()] = controls.rotate_to.take();
        }

        let switches = self.switches.value();

        self.shared.update(|chain| {
            for id in ChannelId::ALL {
                let sequence = chain.channel_mut(id).sequence_mut();

                if let Some(pattern) = patterns[id.index()] {
                    sequence.set_length(pattern.len());
                    sequence.install(pattern);
                }
                if let Some(rotation) = rotations[id.index()] {
                    sequence.rotate_to(rotation);
                }

                let mode = Mode::from_switches(switches.triggering(id), switches.alternating(id));
                chain.set_mode(id, mode);
            }

            chain.set_chained(switches.chained());
        });
    }

    /// One pass of the control loop.
    pub fn run_once(&mut self, panel: &mut impl Panel) {
        for id in ChannelId::ALL {
            self.update_steps(id, panel.read_analog(id, Control::Steps));
            self.update_fills(id, panel.read_analog(id, Control::Fills));
            self.update_rotation(id, panel.read_analog(id, Control::Rotation));
        }
        self.update_switches(panel.read_switch_levels());

        self.commit();

        if panel.serial_requested() {
            let dump = self.diagnostics();
            panel.write_diagnostics(&dump);
        }
    }

    pub fn diagnostics(&self) -> String {
        let switches = self.switches.value();
        self.shared.inspect(|chain| trace::dump(chain, switches))
    }
}
