// Front panel of the two channel module:
//
//   A: steps  fills  rotate  [trig/alt]      gate A  led A
//   B: steps  fills  rotate  [trig/alt]      gate B  led B
//   [chain]                  clock in  reset in      led C (clock)
//
// Knobs are sampled with 4x oversampling on a 10 bit converter.
pub const ADC_OVERSAMPLING: u16 = 4;
pub const ADC_VALUE_RANGE: u16 = 1024 * ADC_OVERSAMPLING;

/// Device constants. `Default` matches the hardware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Exclusive upper bound of an oversampled knob reading.
    pub adc_range: u16,
    /// Number of positions of the steps knob.
    pub steps_range: u8,
    /// Length selected by the lowest steps position.
    pub steps_minimum: u8,
    /// Number of positions of the rotation knob.
    pub rotation_range: u8,
    /// Rotation selected by the lowest rotation position.
    pub rotation_minimum: i8,
    /// Raw jitter ignored on every knob.
    pub deadband_threshold: u16,
    /// A knob must fall `bucket width / chatter_divisor` below a boundary before the value drops.
    pub chatter_divisor: u16,
    /// Sequence length before the steps knob is first read.
    pub default_length: u8,
    /// Consecutive identical reads before a switch change is accepted.
    pub switch_debounce_polls: u8,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        let steps_range = 32;

        Self {
            adc_range: ADC_VALUE_RANGE,
            steps_range,
            steps_minimum: 1,
            // effective rotation range is -7 to 8
            rotation_range: 16,
            rotation_minimum: -7,
            deadband_threshold: ADC_VALUE_RANGE / steps_range as u16 / 4,
            chatter_divisor: 4,
            default_length: 16,
            switch_debounce_polls: 3,
        }
    }
}

impl DeviceConfig {
    pub fn max_length(&self) -> u8 {
        self.steps_minimum + self.steps_range - 1
    }
}

#[cfg(test)]
mod tests {
    use super::DeviceConfig;
    use crate::euclid::MAX_LENGTH;

    #[test]
    fn test_default() {
        let c = DeviceConfig::default();

        assert_eq!(c.adc_range, 4096);
        assert_eq!(c.deadband_threshold, 32);
        assert_eq!(c.max_length(), MAX_LENGTH);
        assert_eq!(c.rotation_minimum + c.rotation_range as i8 - 1, 8);
    }
}
