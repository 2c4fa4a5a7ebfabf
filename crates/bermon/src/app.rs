//! Scheduling loop
//!
//! `bermon` plays the driver role for a
//! [`BerAccumulator`]: it picks the per-pass buffer size,
//! reads one chunk from each stream, and invokes
//! [`step()`](BerAccumulator::step) once per pass until either
//! stream is exhausted. Reports are printed on the configured
//! cadence, and the final reading is returned to `main` for
//! the closing report.
//!
//! The two streams are synchronized by contract. If one ends a
//! few bytes before the other, the ragged tail is dropped —
//! both chunks are truncated to the shorter fill before the
//! step — so the counters never ingest bytes that have no
//! counterpart in the other stream.

use std::io::Read;

use anyhow::Context;
use log::{debug, info};

use bermeter::{BerAccumulator, BerReading};

use crate::cli::Args;

/// Run the scheduling loop
///
/// Pumps `received` and `reference` through the `accumulator`
/// in `args.chunk`-sized passes until either source reaches
/// EOF, printing a reading every `args.every` passes unless
/// quiet. Returns the last reading taken.
pub fn run<R, C>(
    args: &Args,
    accumulator: &mut BerAccumulator,
    received: &mut R,
    reference: &mut C,
) -> Result<BerReading, anyhow::Error>
where
    R: Read,
    C: Read,
{
    let chunk = args.chunk as usize;
    let mut received_buf = vec![0u8; chunk];
    let mut reference_buf = vec![0u8; chunk];

    let mut last = BerReading::default();
    let mut pass = 0u64;

    loop {
        let got_received = read_chunk(received, &mut received_buf)
            .context("error reading the received stream")?;
        let got_reference = read_chunk(reference, &mut reference_buf)
            .context("error reading the reference stream")?;

        // synchronized streams: truncate to the shorter fill
        let len = got_received.min(got_reference);
        if got_received != got_reference {
            debug!(
                "ragged tail: received {} bytes, reference {} bytes, comparing {}",
                got_received, got_reference, len
            );
        }

        // the accumulator handles len == 0; an empty step just
        // re-reports the standing totals for the final reading
        last = accumulator
            .step(&received_buf[..len], &reference_buf[..len])
            .context("scheduling pass failed")?;

        pass += 1;
        if !args.quiet && pass % u64::from(args.every) == 0 {
            println!("{}", last);
        }

        if len < chunk {
            info!("end of input after {} passes", pass);
            break;
        }
    }

    Ok(last)
}

/// Read until `buf` is full or the source hits EOF
///
/// Returns the number of bytes placed in `buf`. A short count
/// means EOF; pipes routinely return partial reads well before
/// that, so a single `read()` call is not enough.
fn read_chunk<R: Read>(source: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match source.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use clap::Parser;

    fn args(extra: &[&str]) -> Args {
        let mut argv = vec!["bermon", "rx.bin", "ref.bin", "--quiet"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_run_counts_whole_streams() {
        let args = args(&["--chunk", "4"]);
        let mut acc = BerAccumulator::new(true, false);

        // ten bytes → three passes at chunk 4; one flipped bit
        // per byte in the first two bytes
        let mut received = Cursor::new(vec![0x01u8, 0x02, 0, 0, 0, 0, 0, 0, 0, 0]);
        let mut reference = Cursor::new(vec![0u8; 10]);

        let last = run(&args, &mut acc, &mut received, &mut reference).unwrap();
        assert_eq!(last.errors, 2.0f32);
        assert_eq!(last.total_bytes, 10.0f32);
        assert_eq!(acc.total_bits(), 80);
    }

    #[test]
    fn test_run_drops_ragged_tail() {
        let args = args(&["--chunk", "8"]);
        let mut acc = BerAccumulator::new(true, false);

        // reference is three bytes short; only ten byte pairs count
        let mut received = Cursor::new(vec![0xFFu8; 13]);
        let mut reference = Cursor::new(vec![0xFFu8; 10]);

        let last = run(&args, &mut acc, &mut received, &mut reference).unwrap();
        assert_eq!(last.errors, 0.0f32);
        assert_eq!(last.total_bytes, 10.0f32);
    }

    #[test]
    fn test_run_empty_streams() {
        let args = args(&[]);
        let mut acc = BerAccumulator::new(true, false);

        let mut received = Cursor::new(Vec::<u8>::new());
        let mut reference = Cursor::new(Vec::<u8>::new());

        let last = run(&args, &mut acc, &mut received, &mut reference).unwrap();
        assert_eq!(last, BerReading::default());
    }

    #[test]
    fn test_run_disabled_holds_counters() {
        let args = args(&[]);
        let mut acc = BerAccumulator::new(false, false);

        let mut received = Cursor::new(vec![0xFFu8; 32]);
        let mut reference = Cursor::new(vec![0x00u8; 32]);

        let last = run(&args, &mut acc, &mut received, &mut reference).unwrap();
        assert_eq!(last.errors, 0.0f32);
        assert_eq!(last.total_bytes, 0.0f32);
    }

    #[test]
    fn test_read_chunk_partial_reads() {
        // Cursor chains give one source per read() call, forcing
        // read_chunk to loop
        let mut source = Cursor::new(vec![1u8, 2]).chain(Cursor::new(vec![3u8, 4, 5]));
        let mut buf = [0u8; 4];
        let got = read_chunk(&mut source, &mut buf).unwrap();
        assert_eq!(got, 4);
        assert_eq!(buf, [1, 2, 3, 4]);

        let got = read_chunk(&mut source, &mut buf).unwrap();
        assert_eq!(got, 1);
        assert_eq!(buf[0], 5);
    }
}
