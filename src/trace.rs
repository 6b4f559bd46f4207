use crate::{
    chain::ChainCoordinator,
    switches::{ChannelId, Switches},
};

/// Human readable state of both channels, as printed on a serial request:
///
/// ```text
/// a: [3, 8, 0, on, triggering TRIGGERING] x--x--x- b: [0, 16, -2 DISABLED] ----------------
/// ```
pub fn dump(chain: &ChainCoordinator, switches: Switches) -> String {
    let mut result = String::new();

    for id in ChannelId::ALL {
        if id != ChannelId::A {
            result.push(' ');
        }
        result.push_str(&channel(chain, switches, id));
    }

    if chain.is_chained() {
        result.push_str(" chained");
    }

    result
}

fn channel(chain: &ChainCoordinator, switches: Switches, id: ChannelId) -> String {
    let channel = chain.channel(id);
    let sequence = channel.sequence();

    let mut result = format!(
        "{}: [{}, {}, {}",
        id.label(),
        sequence.position(),
        sequence.len(),
        sequence.offset()
    );

    if channel.is_on() {
        result.push_str(", on");
    }
    if switches.triggering(id) {
        result.push_str(", triggering");
    }
    if switches.alternating(id) {
        result.push_str(", alternating");
    }

    result.push_str(&format!(" {}] {}", channel.state().name(), sequence));
    result
}

#[cfg(test)]
mod tests {
    use super::dump;
    use crate::{
        chain::ChainCoordinator,
        channel::Mode,
        switches::{ChannelId, Switches},
    };

    #[test]
    fn test_dump() {
        let mut chain = ChainCoordinator::new(16);
        let s = chain.channel_mut(ChannelId::A).sequence_mut();
        s.set_length(8);
        s.calculate(3);
        chain.channel_mut(ChannelId::B).sequence_mut().rotate_to(-2);
        chain.set_mode(ChannelId::A, Mode::Triggering);
        chain.rise();

        let line = dump(&chain, Switches::TRIGGER_A);

        assert_eq!(
            line,
            "a: [1, 8, 0, on, triggering TRIGGERING] x--x--x- b: [1, 16, -2 DISABLED] ----------------"
        );
    }

    #[test]
    fn test_dump_chained() {
        let mut chain = ChainCoordinator::new(4);
        chain.set_chained(true);

        let line = dump(&chain, Switches::CHAIN);

        assert!(line.starts_with("a: [0, 4, 0 DISABLED_LEADING] ----"));
        assert!(line.contains("b: [0, 4, 0 DISABLED_FOLLOWING]"));
        assert!(line.ends_with(" chained"));
    }
}
