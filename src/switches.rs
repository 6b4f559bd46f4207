use bitflags::bitflags;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelId {
    A,
    B,
}

impl ChannelId {
    pub const ALL: [ChannelId; 2] = [ChannelId::A, ChannelId::B];

    pub fn index(self) -> usize {
        match self {
            ChannelId::A => 0,
            ChannelId::B => 1,
        }
    }

    pub fn other(self) -> ChannelId {
        match self {
            ChannelId::A => ChannelId::B,
            ChannelId::B => ChannelId::A,
        }
    }

    pub fn label(self) -> char {
        match self {
            ChannelId::A => 'a',
            ChannelId::B => 'b',
        }
    }
}

bitflags! {
    // 7  bit  0
    // ---- ----
    // ...C aTaT
    //    | ||||
    //    | |||+- Trigger mode, channel A
    //    | ||+-- Alternate mode, channel A
    //    | |+--- Trigger mode, channel B
    //    | +---- Alternate mode, channel B
    //    +------ Chain channels
    //
    // The panel switches pull their pins low when engaged.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Switches: u8 {
        const TRIGGER_A   = 0b0000_0001;
        const ALTERNATE_A = 0b0000_0010;
        const TRIGGER_B   = 0b0000_0100;
        const ALTERNATE_B = 0b0000_1000;
        const CHAIN       = 0b0001_0000;
    }
}

impl Switches {
    /// Decode raw pin levels, laid out as the flags above.
    pub fn from_pin_levels(levels: u8) -> Self {
        Switches::from_bits_truncate(!levels)
    }

    pub fn to_pin_levels(self) -> u8 {
        !self.bits()
    }

    pub fn triggering(&self, channel: ChannelId) -> bool {
        match channel {
            ChannelId::A => self.contains(Switches::TRIGGER_A),
            ChannelId::B => self.contains(Switches::TRIGGER_B),
        }
    }

    pub fn alternating(&self, channel: ChannelId) -> bool {
        match channel {
            ChannelId::A => self.contains(Switches::ALTERNATE_A),
            ChannelId::B => self.contains(Switches::ALTERNATE_B),
        }
    }

    pub fn chained(&self) -> bool {
        self.contains(Switches::CHAIN)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChannelId, Switches};

    #[test]
    fn test_active_low() {
        let s = Switches::from_pin_levels(0b1111_1110);

        assert!(s.triggering(ChannelId::A));
        assert!(!s.alternating(ChannelId::A));
        assert!(!s.triggering(ChannelId::B));
        assert!(!s.chained());

        let s = Switches::from_pin_levels(0b1110_0011);

        assert!(s.alternating(ChannelId::B));
        assert!(s.triggering(ChannelId::B));
        assert!(s.chained());
        assert!(!s.triggering(ChannelId::A));
    }

    #[test]
    fn test_pin_levels_round_trip() {
        let s = Switches::TRIGGER_A | Switches::CHAIN;

        assert_eq!(Switches::from_pin_levels(s.to_pin_levels()), s);
        assert_eq!(Switches::from_pin_levels(0xFF), Switches::empty());
    }

    #[test]
    fn test_channel_id() {
        assert_eq!(ChannelId::A.other(), ChannelId::B);
        assert_eq!(ChannelId::B.index(), 1);
    }
}
