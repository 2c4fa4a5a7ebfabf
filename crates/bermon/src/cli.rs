use std::fmt::Display;

use clap::{error::ErrorKind, value_parser, CommandFactory, Parser};

/// Standard input filename
const STDIN_FILE: &str = "-";

const USAGE_SHORT: &str = r#"
This program compares two synchronized streams of raw bytes bit-by-bit and continuously reports the cumulative error count, the log10 bit error ratio, and the cumulative byte count.

See --help for more details.
"#;

const USAGE_LONG: &str = r#"
This program compares two synchronized streams of raw bytes bit-by-bit and continuously reports the running error statistics. Every byte contributes eight comparisons, least-significant bit first. The streams must already be bit-aligned; bermon performs no synchronization of its own.

Compare a captured stream against the transmitted pattern:

    bermon captured.bin pattern.bin

Either input (but not both) may be "-" to read standard input, so a live capture can be piped in:

    rx_capture | bermon - pattern.bin --chunk 8192 --every 64

Each report line has the form

    errors=8 ber=-0.795880 bytes=125

where "errors" is the cumulative bit error count, "ber" is log10(errors × 8 ÷ total bits), and "bytes" is the cumulative number of bytes compared. A final report is printed when either stream ends.
"#;

/// Top-level program arguments
#[derive(Parser, Clone, Debug)]
#[command(version)]
#[command(about, long_about = None)]
#[command(after_help = USAGE_SHORT, after_long_help = USAGE_LONG)]
#[command(max_term_width = 100)]
pub struct Args {
    /// Verbosity level (-vvv for more)
    #[arg(short, long, default_value_t = 0, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Print nothing but the final report
    #[arg(short, long)]
    pub quiet: bool,

    /// Received stream (file, or "-" for stdin)
    pub received: String,

    /// Reference stream (file, or "-" for stdin)
    pub reference: String,

    /// Bytes compared per scheduling pass
    #[arg(long, default_value_t = 4096)]
    #[arg(value_parser = value_parser!(u32).range(1..))]
    pub chunk: u32,

    /// Print a report every Nth pass
    #[arg(long, default_value_t = 1)]
    #[arg(value_parser = value_parser!(u32).range(1..))]
    pub every: u32,

    /// Begin with counting disabled
    ///
    /// The meter still consumes both streams but holds its
    /// counters at zero. Mostly useful for exercising a
    /// control plane during integration testing.
    #[arg(long)]
    #[arg(hide_short_help = true)]
    pub start_disabled: bool,
}

impl Args {
    /// Return true if the given input name denotes stdin
    pub fn is_stdin(name: &str) -> bool {
        name == STDIN_FILE
    }
}

/// A program-level error with exit code
#[derive(Debug)]
pub struct CliError {
    error: anyhow::Error,
    exit_code: i32,
}

impl CliError {
    /// Create new error with a custom exit code
    pub fn new(error: anyhow::Error, code: i32) -> CliError {
        CliError {
            error,
            exit_code: code,
        }
    }

    /// Print this error to the terminal
    ///
    /// Errors from clap are printed verbatim. Other types of errors
    /// are printed indirectly via clap's fancy formatter.
    pub fn print(&self) -> std::io::Result<()> {
        if let Some(e) = self.error.downcast_ref::<clap::Error>() {
            e.print()
        } else {
            Args::command()
                .error(ErrorKind::Format, self.to_string())
                .print()
        }
    }

    /// Print this error to the terminal and exit
    pub fn exit(&self) -> ! {
        drop(self.print());
        std::process::exit(self.exit_code);
    }
}

impl Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.error)
    }
}

impl std::error::Error for CliError {}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> CliError {
        CliError::new(err, 1)
    }
}

impl From<clap::Error> for CliError {
    fn from(err: clap::Error) -> CliError {
        let code = if err.use_stderr() { 1 } else { 0 };
        CliError::new(err.into(), code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clap() {
        use clap::CommandFactory;
        Args::command().debug_assert();
    }

    #[test]
    fn test_stdin_names() {
        assert!(Args::is_stdin("-"));
        assert!(!Args::is_stdin("capture.bin"));
    }
}
