/// Maps a wide raw range onto `range` discrete buckets.
///
/// Moving down one bucket needs the sample to clear the boundary by a margin of
/// `width / chatter_divisor`, so a knob resting on a boundary does not flicker
/// between two values.
#[derive(Debug, Clone)]
pub struct Discretizer {
    raw_range: u32,
    range: u8,
    chatter_divisor: u32,
    value: Option<u8>,
}

impl Discretizer {
    pub fn new(raw_range: u16, range: u8, chatter_divisor: u16) -> Self {
        debug_assert!(range > 0 && raw_range >= range as u16);

        Self {
            raw_range: raw_range as u32,
            range: range.max(1),
            chatter_divisor: chatter_divisor.max(1) as u32,
            value: None,
        }
    }

    pub fn value(&self) -> Option<u8> {
        self.value
    }

    pub fn range(&self) -> u8 {
        self.range
    }

    /// Change the number of buckets. The next sample always reports.
    pub fn set_range(&mut self, range: u8) {
        debug_assert!(range > 0);

        self.range = range.max(1);
        self.invalidate();
    }

    pub fn invalidate(&mut self) {
        self.value = None;
    }

    pub fn update(&mut self, sample: u16) -> Option<u8> {
        let sample = (sample as u32).min(self.raw_range - 1);
        let width = (self.raw_range / self.range as u32).max(1);

        let mut bucket = (sample / width).min(self.range as u32 - 1) as u8;

        if let Some(current) = self.value {
            let margin = width / self.chatter_divisor;
            if bucket + 1 == current && sample + margin >= current as u32 * width {
                bucket = current;
            }
        }

        if self.value == Some(bucket) {
            None
        } else {
            self.value = Some(bucket);
            Some(bucket)
        }
    }
}
