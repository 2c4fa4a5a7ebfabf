//! Streaming bit error accumulator
//!
//! The [`BerAccumulator`] compares two synchronized byte
//! streams bit-by-bit and keeps running totals of bit errors
//! and bits examined. It is a synchronous 1:1 transform: the
//! driver hands it two equal-length buffers on every
//! scheduling pass, and it answers with one
//! [`BerReading`] per pass.
//!
//! Counting can be paused and resumed at runtime with
//! [`set_processing()`](BerAccumulator::set_processing), and the
//! counters can be re-zeroed with a one-shot
//! [`set_restart(true)`](BerAccumulator::set_restart).

use std::fmt;

use thiserror::Error;

#[cfg(not(test))]
use log::debug;

#[cfg(test)]
use std::println as debug;

/// Number of data bits packed into each input byte
///
/// Inputs carry their bits packed LSb-first, eight to a byte.
/// The accumulator consumes bits in whole-byte groups, so
/// `total_bits` is always a multiple of this constant.
pub const BITS_PER_BYTE: u32 = 8;

/// One reading of the running statistics
///
/// Emitted once per [`step()`](BerAccumulator::step). All three
/// values are single-precision floats, matching the output
/// signature expected by the host pipeline.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BerReading {
    /// Cumulative bit errors since the last reset
    pub errors: f32,

    /// Log10 bit error ratio
    ///
    /// Computed as `log10(errors × 8 ÷ total_bits)` whenever at
    /// least one error has been counted, and exactly `0.0`
    /// otherwise. The factor of 8 rescales the error fraction
    /// as if the denominator were counted in bytes. That is the
    /// metric's historical convention, and downstream consumers
    /// depend on it; do not "correct" it to the plain
    /// `errors ÷ total_bits` ratio.
    pub ber: f32,

    /// Cumulative bits examined since the last reset, in bytes
    ///
    /// The bit total divided by [`BITS_PER_BYTE`].
    pub total_bytes: f32,
}

impl fmt::Display for BerReading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "errors={:.0} ber={:.6} bytes={:.0}",
            self.errors, self.ber, self.total_bytes
        )
    }
}

/// Mismatched input buffer lengths
///
/// The two input streams are sample-synchronous by contract;
/// handing [`step()`](BerAccumulator::step) buffers of unequal
/// length is a driver defect. The step fails without touching
/// the counters rather than truncate and silently mis-count.
#[derive(Error, Clone, Copy, Debug, PartialEq, Eq)]
#[error("input buffers must be the same length: received {received} bytes, reference {reference} bytes")]
pub struct LengthMismatchErr {
    /// Length of the received-stream buffer, in bytes
    pub received: usize,

    /// Length of the reference-stream buffer, in bytes
    pub reference: usize,
}

/// Restart flag state
///
/// The restart control is a one-shot: arming it schedules a
/// counter reset which fires at the start of the very next
/// step and then disarms itself. Clearing the flag while a
/// reset is pending cancels it without resetting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ResetState {
    /// No reset scheduled
    Idle,

    /// Counters will be zeroed at the start of the next step
    ResetPending,
}

/// Streaming bit-error-rate accumulator
///
/// Compares a *received* byte stream against a synchronized
/// *reference* stream, one buffer pair per
/// [`step()`](BerAccumulator::step), and accumulates bit error
/// statistics across calls. Every byte contributes
/// [`BITS_PER_BYTE`] comparisons; bit `b` of byte `i` is
/// addressed as `(byte[i] >> b) & 1`.
///
/// Two control flags steer the accumulator at runtime:
///
/// * *processing* gates whether a step consumes its input at
///   all. While disabled, steps still produce readings, but
///   the counters hold.
/// * *restart* is an edge-triggered reset: arming it zeroes
///   both counters at the start of the next step and clears
///   itself, so continuous operation resumes from a fresh
///   baseline without the caller polling the flag back down.
///
/// ```
/// use bermeter::BerAccumulator;
///
/// let mut acc = BerAccumulator::new(true, false);
/// let reading = acc.step(&[0b0000_0001], &[0b0000_0000]).unwrap();
/// assert_eq!(reading.errors, 1.0);
/// assert_eq!(reading.ber, 0.0); // log10(1·8 ÷ 8)
/// assert_eq!(reading.total_bytes, 1.0);
/// ```
///
/// For the split control-plane/data-plane deployment, see
/// [`SharedBerAccumulator`](crate::SharedBerAccumulator).
#[derive(Clone, Debug)]
pub struct BerAccumulator {
    // bit mismatches since last reset
    errors: u64,

    // bits examined since last reset; always ≥ errors and
    // always a multiple of BITS_PER_BYTE
    total_bits: u64,

    // if false, steps pass through without counting
    processing: bool,

    // one-shot reset machine
    reset: ResetState,
}

impl BerAccumulator {
    /// New accumulator
    ///
    /// Counters start at zero. `processing` sets whether steps
    /// begin counting immediately; `restart` arms a (harmless,
    /// since the counters are already zero) reset for the first
    /// step. Most drivers want `(false, false)` and enable
    /// processing once the link is up; see also
    /// [`BerAccumulatorBuilder`](crate::BerAccumulatorBuilder).
    pub fn new(processing: bool, restart: bool) -> Self {
        Self {
            errors: 0,
            total_bits: 0,
            processing,
            reset: if restart {
                ResetState::ResetPending
            } else {
                ResetState::Idle
            },
        }
    }

    /// Enable or disable counting
    ///
    /// While disabled, [`step()`](#method.step) leaves the
    /// counters untouched regardless of its input. Idempotent;
    /// takes effect from the next step.
    pub fn set_processing(&mut self, enabled: bool) {
        debug!("processing set to: {}", enabled);
        self.processing = enabled;
    }

    /// Arm or cancel a counter reset
    ///
    /// `set_restart(true)` schedules a one-shot reset: the next
    /// [`step()`](#method.step) zeroes both counters before
    /// consuming any input, then disarms the flag on its own.
    /// Exactly one reset fires per arming.
    ///
    /// `set_restart(false)` cancels a pending reset without
    /// resetting; if no reset is pending it is a no-op.
    pub fn set_restart(&mut self, requested: bool) {
        debug!("restart set to: {}", requested);
        self.reset = if requested {
            ResetState::ResetPending
        } else {
            ResetState::Idle
        };
    }

    /// Accumulate one buffer pair and report the running totals
    ///
    /// `received` and `reference` must be the same length, which
    /// the driver may vary from call to call (zero is fine).
    /// Performs, in order:
    ///
    /// 1. a pending reset, if one is armed;
    /// 2. the bit comparison of the full `8·N` bits, if
    ///    processing is enabled; and
    /// 3. the statistics computation.
    ///
    /// Always completes in time proportional to the buffer
    /// length and always yields a full [`BerReading`]; there
    /// are no partial results. The BER term never divides by
    /// zero: it is only computed once at least one error — and
    /// therefore at least one bit — has been counted.
    pub fn step(
        &mut self,
        received: &[u8],
        reference: &[u8],
    ) -> Result<BerReading, LengthMismatchErr> {
        if received.len() != reference.len() {
            return Err(LengthMismatchErr {
                received: received.len(),
                reference: reference.len(),
            });
        }

        if self.reset == ResetState::ResetPending {
            self.errors = 0;
            self.total_bits = 0;
            self.reset = ResetState::Idle;
        }

        if self.processing {
            for (&rx, &re) in received.iter().zip(reference.iter()) {
                self.errors += u64::from((rx ^ re).count_ones());
                self.total_bits += u64::from(BITS_PER_BYTE);
            }
        }

        let ber = if self.errors > 0 {
            (self.errors as f32 * BITS_PER_BYTE as f32 / self.total_bits as f32).log10()
        } else {
            0.0f32
        };

        Ok(BerReading {
            errors: self.errors as f32,
            ber,
            total_bytes: self.total_bits as f32 / BITS_PER_BYTE as f32,
        })
    }

    /// Cumulative bit errors since the last reset
    pub fn errors(&self) -> u64 {
        self.errors
    }

    /// Cumulative bits examined since the last reset
    pub fn total_bits(&self) -> u64 {
        self.total_bits
    }

    /// Reports whether counting is currently enabled
    pub fn is_processing(&self) -> bool {
        self.processing
    }
}
