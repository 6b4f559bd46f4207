use std::{
    env, process,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use euclid_gates::{
    hardware::{self, Control, Jacks, Led, Panel},
    ChannelId, Device, DeviceConfig, Switches,
};
use tracing::{debug, info, trace, Level};

const USAGE: &str = "usage: euclid-gates [--a STEPS,PULSES,ROT] [--b STEPS,PULSES,ROT] \
[--chain] [--alternate-a] [--alternate-b] [--cycles N] [--reset-at N] [--wav PATH] [-v...]";

const SAMPLE_RATE: u32 = 44100;
// 10 clock periods per second
const SAMPLES_PER_EDGE: usize = SAMPLE_RATE as usize / 20;
const EDGE_TIME: Duration = Duration::from_millis(2);
const GATE_LEVEL: i16 = i16::MAX / 2;

#[derive(Debug, Clone, Copy)]
struct Knobs {
    steps: u8,
    pulses: u8,
    rotation: i8,
}

#[derive(Debug)]
struct Options {
    knobs: [Knobs; 2],
    chain: bool,
    alternate: [bool; 2],
    cycles: usize,
    reset_at: Option<usize>,
    wav: Option<String>,
    verbosity: u8,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            knobs: [
                Knobs {
                    steps: 8,
                    pulses: 3,
                    rotation: 0,
                },
                Knobs {
                    steps: 16,
                    pulses: 4,
                    rotation: 0,
                },
            ],
            chain: false,
            alternate: [false, false],
            cycles: 32,
            reset_at: None,
            wav: None,
            verbosity: 0,
        }
    }
}

fn parse_knobs(config: &DeviceConfig, arg: &str) -> Result<Knobs, String> {
    let fields: Vec<&str> = arg.split(',').map(str::trim).collect();
    if fields.len() != 3 {
        return Err(format!("expected STEPS,PULSES,ROT, got '{}'", arg));
    }

    let steps: u8 = fields[0]
        .parse()
        .map_err(|e| format!("bad steps '{}': {}", fields[0], e))?;
    let pulses: u8 = fields[1]
        .parse()
        .map_err(|e| format!("bad pulses '{}': {}", fields[1], e))?;
    let rotation: i8 = fields[2]
        .parse()
        .map_err(|e| format!("bad rotation '{}': {}", fields[2], e))?;

    if !(config.steps_minimum..=config.max_length()).contains(&steps) {
        return Err(format!(
            "steps must be within {}..={}",
            config.steps_minimum,
            config.max_length()
        ));
    }
    if pulses > steps {
        return Err(format!("{} pulses exceed {} steps", pulses, steps));
    }
    let rotation_maximum = config.rotation_minimum + config.rotation_range as i8 - 1;
    if !(config.rotation_minimum..=rotation_maximum).contains(&rotation) {
        return Err(format!(
            "rotation must be within {}..={}",
            config.rotation_minimum, rotation_maximum
        ));
    }

    Ok(Knobs {
        steps,
        pulses,
        rotation,
    })
}

fn parse_args(
    config: &DeviceConfig,
    mut args: impl Iterator<Item = String>,
) -> Result<Options, String> {
    let mut options = Options::default();

    while let Some(arg) = args.next() {
        let mut value = |name: &str| args.next().ok_or_else(|| format!("{} needs a value", name));

        match arg.as_str() {
            "--a" => options.knobs[0] = parse_knobs(config, &value("--a")?)?,
            "--b" => options.knobs[1] = parse_knobs(config, &value("--b")?)?,
            "--chain" => options.chain = true,
            "--alternate-a" => options.alternate[0] = true,
            "--alternate-b" => options.alternate[1] = true,
            "--cycles" => {
                options.cycles = value("--cycles")?
                    .parse()
                    .map_err(|e| format!("bad cycle count: {}", e))?
            }
            "--reset-at" => {
                options.reset_at = Some(
                    value("--reset-at")?
                        .parse()
                        .map_err(|e| format!("bad reset cycle: {}", e))?,
                )
            }
            "--wav" => options.wav = Some(value("--wav")?),
            "-h" | "--help" => return Err(USAGE.to_string()),
            flag if flag.starts_with("-v") && flag[1..].chars().all(|c| c == 'v') => {
                options.verbosity += (flag.len() - 1) as u8
            }
            other => return Err(format!("unknown argument '{}'\n{}", other, USAGE)),
        }
    }

    Ok(options)
}

// Raw reading in the middle of a knob position.
fn knob_reading(config: &DeviceConfig, range: u8, position: u8) -> u16 {
    let width = config.adc_range / range as u16;
    position as u16 * width + width / 2
}

/// Knobs and switches fixed from the command line.
struct SimPanel {
    readings: [[u16; 3]; 2],
    levels: u8,
    serial: bool,
}

impl SimPanel {
    fn new(config: &DeviceConfig, options: &Options) -> Self {
        let mut readings = [[0; 3]; 2];
        let mut switches = Switches::empty();

        for id in ChannelId::ALL {
            let knobs = options.knobs[id.index()];

            readings[id.index()] = [
                knob_reading(config, config.steps_range, knobs.steps - config.steps_minimum),
                knob_reading(config, knobs.steps + 1, knobs.pulses),
                knob_reading(
                    config,
                    config.rotation_range,
                    (knobs.rotation - config.rotation_minimum) as u8,
                ),
            ];

            let flag = match (id, options.alternate[id.index()]) {
                (ChannelId::A, false) => Switches::TRIGGER_A,
                (ChannelId::A, true) => Switches::ALTERNATE_A,
                (ChannelId::B, false) => Switches::TRIGGER_B,
                (ChannelId::B, true) => Switches::ALTERNATE_B,
            };
            switches |= flag;
        }
        switches.set(Switches::CHAIN, options.chain);

        Self {
            readings,
            levels: switches.to_pin_levels(),
            serial: false,
        }
    }
}

impl Panel for SimPanel {
    fn read_analog(&mut self, channel: ChannelId, control: Control) -> u16 {
        self.readings[channel.index()][control.index()]
    }

    fn read_switch_levels(&mut self) -> u8 {
        self.levels
    }

    fn serial_requested(&mut self) -> bool {
        std::mem::take(&mut self.serial)
    }

    fn write_diagnostics(&mut self, dump: &str) {
        println!("{}", dump);
    }
}

/// Gate levels after every clock edge.
#[derive(Default)]
struct SimJacks {
    gates: [bool; 2],
    reset_polls: usize,
    history: Vec<[bool; 2]>,
}

impl Jacks for SimJacks {
    fn write_gate(&mut self, channel: ChannelId, on: bool) {
        self.gates[channel.index()] = on;
    }

    fn write_led(&mut self, led: Led, on: bool) {
        trace!("{:?} led {}", led, if on { "on" } else { "off" });
    }

    fn reset_held(&mut self) -> bool {
        if self.reset_polls > 0 {
            self.reset_polls -= 1;
            true
        } else {
            false
        }
    }
}

fn write_wav(path: &str, history: &[[bool; 2]]) -> Result<(), String> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut writer = hound::WavWriter::create(path, spec).map_err(|e| e.to_string())?;
    for gates in history {
        for _ in 0..SAMPLES_PER_EDGE {
            for on in gates {
                writer
                    .write_sample(if *on { GATE_LEVEL } else { 0 })
                    .map_err(|e| e.to_string())?;
            }
        }
    }

    writer.finalize().map_err(|e| e.to_string())
}

fn print_gates(history: &[[bool; 2]]) {
    for id in ChannelId::ALL {
        // one character per clock period, sampled after the rising edge
        let row: String = history
            .iter()
            .step_by(2)
            .map(|gates| if gates[id.index()] { '|' } else { '.' })
            .collect();
        println!("{} {}", id.label(), row);
    }
}

fn run(options: Options) -> Result<(), String> {
    let config = DeviceConfig::default();
    let mut device = Device::new(config.clone());
    let mut panel = SimPanel::new(&config, &options);

    // let the switches settle before the clock starts
    for _ in 0..=config.switch_debounce_polls {
        device.run_once(&mut panel);
    }
    panel.serial = true;
    device.run_once(&mut panel);

    let shared = device.shared();
    let done = Arc::new(AtomicBool::new(false));
    let finished = done.clone();
    let cycles = options.cycles;
    let reset_at = options.reset_at;

    let clock = thread::spawn(move || {
        let mut jacks = SimJacks::default();

        for cycle in 0..cycles {
            if reset_at == Some(cycle) {
                info!("reset at cycle {}", cycle);
                jacks.reset_polls = 3;
                hardware::reset_interrupt(&shared, &mut jacks);
            }

            for high in [true, false] {
                hardware::clock_interrupt(&shared, &mut jacks, high);
                jacks.history.push(jacks.gates);
                thread::sleep(EDGE_TIME);
            }
        }

        finished.store(true, Ordering::Release);
        jacks.history
    });

    while !done.load(Ordering::Acquire) {
        device.run_once(&mut panel);
        thread::sleep(Duration::from_millis(1));
    }

    let history = clock
        .join()
        .map_err(|_| "clock thread panicked".to_string())?;
    debug!("{} edges", history.len());

    print_gates(&history);
    panel.serial = true;
    device.run_once(&mut panel);

    if let Some(path) = &options.wav {
        write_wav(path, &history)?;
        info!("wrote {}", path);
    }

    Ok(())
}

fn main() {
    let config = DeviceConfig::default();
    let options = match parse_args(&config, env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("{}", e);
            process::exit(1);
        }
    };

    let level = match options.verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .without_time()
        .with_target(false)
        .with_max_level(level)
        .init();

    if let Err(e) = run(options) {
        eprintln!("error: {}", e);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_args, parse_knobs, SimPanel};
    use euclid_gates::{euclid, hardware::Panel, ChannelId, Device, DeviceConfig};

    fn args(line: &str) -> impl Iterator<Item = String> + '_ {
        line.split_whitespace().map(String::from)
    }

    #[test]
    fn test_parse_args() {
        let config = DeviceConfig::default();
        let line = "--a 5,2,-1 --chain --alternate-b --cycles 4 -vv";
        let options = parse_args(&config, args(line)).unwrap();

        assert_eq!(options.knobs[0].steps, 5);
        assert_eq!(options.knobs[0].pulses, 2);
        assert_eq!(options.knobs[0].rotation, -1);
        assert!(options.chain);
        assert_eq!(options.alternate, [false, true]);
        assert_eq!(options.cycles, 4);
        assert_eq!(options.verbosity, 2);
    }

    #[test]
    fn test_parse_knobs_rejects_out_of_range() {
        let config = DeviceConfig::default();

        assert!(parse_knobs(&config, "33,1,0").is_err());
        assert!(parse_knobs(&config, "0,0,0").is_err());
        assert!(parse_knobs(&config, "4,5,0").is_err());
        assert!(parse_knobs(&config, "4,1,9").is_err());
        assert!(parse_knobs(&config, "4,1").is_err());
        assert!(parse_knobs(&config, "32,32,-7").is_ok());
    }

    #[test]
    fn test_sim_panel_selects_knob_positions() {
        let config = DeviceConfig::default();
        let options = parse_args(&config, args("--a 32,32,8 --b 1,0,-7")).unwrap();
        let mut panel = SimPanel::new(&config, &options);
        let mut device = Device::new(config.clone());

        for _ in 0..4 {
            device.run_once(&mut panel);
        }

        device.shared().inspect(|chain| {
            let a = chain.channel(ChannelId::A).sequence();
            assert_eq!(a.pattern(), euclid::generate(32, 32));
            assert_eq!(a.offset(), 8);

            let b = chain.channel(ChannelId::B).sequence();
            assert_eq!(b.len(), 1);
            assert_eq!(b.pulses(), 0);
            assert_eq!(b.offset(), -7);
        });
        assert!(device.switches().triggering(ChannelId::A));
        assert!(!panel.serial_requested());
    }
}
