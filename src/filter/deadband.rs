/// Ignores samples closer than `threshold` to the last accepted one.
#[derive(Debug, Clone)]
pub struct Deadband {
    accepted: i32,
    threshold: i32,
}

impl Deadband {
    pub fn new(threshold: u16) -> Self {
        Self::with_initial(threshold, 0)
    }

    pub fn with_initial(threshold: u16, initial: u16) -> Self {
        Self {
            accepted: initial as i32,
            threshold: threshold as i32,
        }
    }

    pub fn value(&self) -> u16 {
        self.accepted as u16
    }

    pub fn update(&mut self, sample: u16) -> Option<u16> {
        let sample = sample as i32;

        if (sample - self.accepted).abs() >= self.threshold {
            self.accepted = sample;
            Some(sample as u16)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Deadband;

    #[test]
    fn test_suppress_small_changes() {
        let mut d = Deadband::with_initial(32, 1000);

        for s in [1000, 1010, 990, 1031, 969] {
            assert_eq!(d.update(s), None);
        }
        assert_eq!(d.value(), 1000);
    }

    #[test]
    fn test_accept_large_change() {
        let mut d = Deadband::with_initial(32, 1000);

        assert_eq!(d.update(1032), Some(1032));
        assert_eq!(d.value(), 1032);

        // measured from the new value
        assert_eq!(d.update(1010), None);
        assert_eq!(d.update(1000), Some(1000));
    }

    #[test]
    fn test_starts_from_zero() {
        let mut d = Deadband::new(10);

        assert_eq!(d.update(9), None);
        assert_eq!(d.update(4095), Some(4095));
        assert_eq!(d.update(0), Some(0));
    }
}
