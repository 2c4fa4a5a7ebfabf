//! Shared control-plane / data-plane split
//!
//! In deployment the meter's control flags are flipped from a
//! different context than the one running the data path: a
//! command handler reacts to an operator while a scheduling
//! thread pumps buffers. [`SharedBerAccumulator::new`] splits a
//! [`BerAccumulator`] into the two halves of that arrangement:
//! one [`SharedBerAccumulator`] for the data plane and a
//! cloneable [`BerControl`] for everyone else.
//!
//! Both halves serialize on one mutex, so a step always sees a
//! consistent snapshot of the flags and a setter never lands in
//! the middle of a step.

use std::sync::{Arc, Mutex, PoisonError};

use crate::accumulator::{BerAccumulator, BerReading, LengthMismatchErr};

/// Data-plane half of a shared accumulator
///
/// Owns the stepping side. Deliberately not `Clone`: the
/// execution model is a single driver invoking
/// [`step()`](#method.step), with any number of
/// [`BerControl`] handles flipping flags around it.
#[derive(Debug)]
pub struct SharedBerAccumulator {
    inner: Arc<Mutex<BerAccumulator>>,
}

/// Control-plane handle to a shared accumulator
///
/// Cheap to clone and safe to hand to other threads. Setter
/// calls take effect on the next step.
#[derive(Clone, Debug)]
pub struct BerControl {
    inner: Arc<Mutex<BerAccumulator>>,
}

impl SharedBerAccumulator {
    /// Split an accumulator into data-plane and control-plane halves
    pub fn new(accumulator: BerAccumulator) -> (SharedBerAccumulator, BerControl) {
        let inner = Arc::new(Mutex::new(accumulator));
        (
            SharedBerAccumulator {
                inner: inner.clone(),
            },
            BerControl { inner },
        )
    }

    /// Accumulate one buffer pair
    ///
    /// Identical contract to
    /// [`BerAccumulator::step()`](BerAccumulator::step), under
    /// the shared lock.
    pub fn step(
        &mut self,
        received: &[u8],
        reference: &[u8],
    ) -> Result<BerReading, LengthMismatchErr> {
        lock(&self.inner).step(received, reference)
    }

    /// Cumulative bit errors since the last reset
    pub fn errors(&self) -> u64 {
        lock(&self.inner).errors()
    }

    /// Cumulative bits examined since the last reset
    pub fn total_bits(&self) -> u64 {
        lock(&self.inner).total_bits()
    }
}

impl BerControl {
    /// Enable or disable counting
    ///
    /// See
    /// [`BerAccumulator::set_processing()`](BerAccumulator::set_processing).
    pub fn set_processing(&self, enabled: bool) {
        lock(&self.inner).set_processing(enabled);
    }

    /// Arm or cancel a one-shot counter reset
    ///
    /// See
    /// [`BerAccumulator::set_restart()`](BerAccumulator::set_restart).
    pub fn set_restart(&self, requested: bool) {
        lock(&self.inner).set_restart(requested);
    }

    /// Reports whether counting is currently enabled
    pub fn is_processing(&self) -> bool {
        lock(&self.inner).is_processing()
    }
}

// The guarded state is plain counters and flags; a panic in
// another holder cannot leave them torn, so poisoning is
// absorbed rather than propagated.
fn lock(inner: &Mutex<BerAccumulator>) -> std::sync::MutexGuard<'_, BerAccumulator> {
    inner.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_steers_steps() {
        let (mut meter, control) = SharedBerAccumulator::new(BerAccumulator::new(false, false));

        // disabled: nothing counted
        meter.step(&[0xFF], &[0x00]).unwrap();
        assert_eq!(meter.total_bits(), 0);

        control.set_processing(true);
        assert!(control.is_processing());
        let out = meter.step(&[0xFF], &[0x00]).unwrap();
        assert_eq!(out.errors, 8.0f32);

        control.set_restart(true);
        let out = meter.step(&[0x00], &[0x00]).unwrap();
        assert_eq!(out.errors, 0.0f32);
        assert_eq!(out.total_bytes, 1.0f32);
    }

    #[test]
    fn test_control_from_other_thread() {
        let (mut meter, control) = SharedBerAccumulator::new(BerAccumulator::new(false, false));

        let handle = std::thread::spawn(move || {
            control.set_processing(true);
            control.set_restart(true);
        });
        handle.join().unwrap();

        let out = meter.step(&[0x0F], &[0x00]).unwrap();
        assert_eq!(out.errors, 4.0f32);
        assert_eq!(out.total_bytes, 1.0f32);
    }

    #[test]
    fn test_controls_are_cloneable() {
        let (mut meter, control) = SharedBerAccumulator::new(BerAccumulator::new(true, false));
        let second = control.clone();

        control.set_restart(true);
        second.set_restart(false); // cancels

        meter.step(&[0xFF], &[0x00]).unwrap();
        assert_eq!(meter.errors(), 8);
    }
}
