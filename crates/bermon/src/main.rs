use std::io;

use anyhow::{anyhow, Context};
use clap::Parser;
use log::{info, LevelFilter};

use bermeter::BerAccumulatorBuilder;

mod app;
mod cli;

use cli::{Args, CliError};

fn main() {
    match bermon() {
        Ok(()) => {}
        Err(cli_error) => cli_error.exit(),
    }
}

fn bermon() -> Result<(), CliError> {
    // Parse options and start logging
    let args = Args::try_parse()?;
    log_setup(&args);

    // create the meter
    let mut accumulator = BerAccumulatorBuilder::new()
        .with_processing(!args.start_disabled)
        .build();

    // file setup: locks stdin in case we need it
    let stdin = io::stdin();
    let stdin_handle = stdin.lock();
    let (mut received, mut reference) = file_setup(&args, stdin_handle)?;

    // processing: pump both streams through the meter
    let last = app::run(&args, &mut accumulator, &mut received, &mut reference)?;

    // closing report, even in quiet mode
    println!("{}", last);

    Ok(())
}

fn log_setup(args: &Args) {
    if std::env::var_os("RUST_LOG").is_none() {
        // parameter controls
        let log_filter = match args.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        };

        pretty_env_logger::formatted_builder()
            .filter_module("bermeter", log_filter)
            .filter_module("bermon", log_filter)
            .init();
    } else {
        // environment controls
        pretty_env_logger::init();
    }
}

type Input<'stdin> = Box<dyn io::Read + 'stdin>;

fn file_setup<'stdin>(
    args: &Args,
    stdin: std::io::StdinLock<'stdin>,
) -> Result<(Input<'stdin>, Input<'stdin>), anyhow::Error> {
    if Args::is_stdin(&args.received) && Args::is_stdin(&args.reference) {
        return Err(anyhow!(
            "only one of RECEIVED and REFERENCE may read standard input"
        ));
    }

    let mut stdin = Some(stdin);
    let received = input_setup(&args.received, "RECEIVED", &mut stdin)?;
    let reference = input_setup(&args.reference, "REFERENCE", &mut stdin)?;
    Ok((received, reference))
}

fn input_setup<'stdin>(
    name: &str,
    role: &str,
    stdin: &mut Option<std::io::StdinLock<'stdin>>,
) -> Result<Input<'stdin>, anyhow::Error> {
    if Args::is_stdin(name) {
        info!("{} stream reading standard input", role);
        // both-stdin case was rejected above
        let stdin = stdin
            .take()
            .ok_or_else(|| anyhow!("standard input already taken"))?;
        if !is_terminal(&std::io::stdin()) {
            Ok(Box::new(io::BufReader::new(stdin)))
        } else {
            Err(anyhow!(
                "cowardly refusing to read raw bytes from a terminal.

Pipe a source of raw bytes, such as a capture tool or a file,
into this program."
            ))
        }
    } else {
        info!("{} stream reading file: \"{}\"", role, name);
        Ok(Box::new(io::BufReader::new(
            std::fs::File::open(name)
                .with_context(|| format!("Unable to open {} \"{}\"", role, name))?,
        )))
    }
}

#[cfg(not(target_os = "windows"))]
fn is_terminal<S>(stream: &S) -> bool
where
    S: std::os::fd::AsRawFd,
{
    terminal_size::terminal_size_using_fd(stream.as_raw_fd()).is_some()
}

#[cfg(target_os = "windows")]
fn is_terminal<S>(stream: &S) -> bool
where
    S: std::os::windows::io::AsRawHandle,
{
    terminal_size::terminal_size_using_handle(stream.as_raw_handle()).is_some()
}
