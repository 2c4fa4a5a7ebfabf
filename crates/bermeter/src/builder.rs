use crate::accumulator::BerAccumulator;

/// Builds a [`BerAccumulator`]
///
/// The builder starts from the conventional idle configuration:
/// counting disabled and no reset armed. Drivers that bring a
/// link up before enabling the meter can take the defaults and
/// call
/// [`set_processing(true)`](BerAccumulator::set_processing)
/// once the streams are aligned.
///
/// ```
/// use bermeter::BerAccumulatorBuilder;
///
/// let acc = BerAccumulatorBuilder::new()
///     .with_processing(true)
///     .build();
/// assert!(acc.is_processing());
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BerAccumulatorBuilder {
    processing: bool,
    restart: bool,
}

impl BerAccumulatorBuilder {
    /// New builder with the idle defaults
    ///
    /// Processing starts disabled and no reset is armed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with counting enabled or disabled
    pub fn with_processing(&mut self, enabled: bool) -> &mut Self {
        self.processing = enabled;
        self
    }

    /// Start with a reset armed for the first step
    ///
    /// Rarely useful — the counters are created at zero — but
    /// accepted for drivers that persist their control settings.
    pub fn with_restart(&mut self, requested: bool) -> &mut Self {
        self.restart = requested;
        self
    }

    /// Build an accumulator
    ///
    /// Once built, the accumulator is immediately ready to
    /// process buffers.
    pub fn build(&self) -> BerAccumulator {
        BerAccumulator::new(self.processing, self.restart)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_idle() {
        let mut acc = BerAccumulatorBuilder::new().build();
        assert!(!acc.is_processing());

        // disabled by default: nothing is counted
        acc.step(&[0xFF], &[0x00]).unwrap();
        assert_eq!(acc.total_bits(), 0);
    }

    #[test]
    fn test_enabled_build() {
        let mut acc = BerAccumulatorBuilder::new()
            .with_processing(true)
            .with_restart(true)
            .build();
        assert!(acc.is_processing());

        let out = acc.step(&[0x03], &[0x01]).unwrap();
        assert_eq!(out.errors, 1.0f32);
    }
}
