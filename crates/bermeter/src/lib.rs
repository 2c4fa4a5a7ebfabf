//! # bermeter: streaming bit-error-rate estimation
//!
//! This crate provides a running bit-error-rate (BER) meter for
//! bit-synchronized links. Feed it matching buffers of *received*
//! and *reference* bytes — bits packed eight to a byte, LSb
//! first — and it maintains cumulative error and bit counts
//! across calls, reporting three statistics per buffer pair:
//!
//! 1. cumulative bit errors,
//! 2. the log10 bit error ratio, and
//! 3. cumulative bits examined (expressed in bytes).
//!
//! The meter is built to sit inside a continuous processing
//! pipeline: an external driver picks the buffer size, invokes
//! [`step()`](BerAccumulator::step) once per scheduling pass,
//! and may flip the runtime controls between passes. Counting
//! can be paused with
//! [`set_processing()`](BerAccumulator::set_processing), and
//! the counters can be re-zeroed with an edge-triggered
//! [`set_restart()`](BerAccumulator::set_restart) — the reset
//! fires exactly once, at the start of the next step, and then
//! disarms itself.
//!
//! ## Example
//!
//! ```
//! use bermeter::BerAccumulatorBuilder;
//!
//! let mut acc = BerAccumulatorBuilder::new()
//!     .with_processing(true)
//!     .build();
//!
//! // each step compares one driver-sized buffer pair
//! let reading = acc.step(&[0xFF, 0x00], &[0xFD, 0x00]).unwrap();
//! assert_eq!(reading.errors, 1.0);
//! assert_eq!(reading.total_bytes, 2.0);
//!
//! // totals persist to the next step
//! let reading = acc.step(&[0x00], &[0x00]).unwrap();
//! assert_eq!(reading.total_bytes, 3.0);
//! ```
//!
//! When the control flags are flipped from a different thread
//! than the one stepping — an operator command handler against
//! a scheduling thread — split the meter with
//! [`SharedBerAccumulator::new`] and hand the cloneable
//! [`BerControl`] to the control plane.
//!
//! ## The BER figure
//!
//! The reported ratio is `log10(errors × 8 ÷ total_bits)`
//! while any errors have been counted, and exactly `0.0`
//! otherwise. The factor of 8 — see
//! [`BITS_PER_BYTE`] — expresses the denominator in bytes.
//! This is the metric's historical convention and is kept
//! bit-for-bit for compatibility with existing consumers.

mod accumulator;
mod builder;
mod shared;

pub use accumulator::{BerAccumulator, BerReading, LengthMismatchErr, BITS_PER_BYTE};
pub use builder::BerAccumulatorBuilder;
pub use shared::{BerControl, SharedBerAccumulator};
