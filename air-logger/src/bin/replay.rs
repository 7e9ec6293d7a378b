use air_logger::{decode_line, read_frame};
use clap::Parser;
use log::{error, info, warn};
use serial_source::{LineReader, LineSource, SourceError};
use std::{fs::File, path::PathBuf, process::ExitCode};

/// Check a captured serial log offline: every line is validated and parsed,
/// nothing is uploaded.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Capture file, one frame per line
    capture: PathBuf,

    /// Print each accepted reading as a JSON line on stdout
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let args = Args::parse();

    let file = match File::open(&args.capture) {
        Ok(file) => file,
        Err(e) => {
            error!("Cannot open {}: {}", args.capture.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut source = LineReader::new(file);
    let (mut accepted, mut rejected) = (0usize, 0usize);
    let mut number = 0usize;

    loop {
        let raw = match source.read_line() {
            Ok(Some(raw)) => raw,
            Ok(None) => continue,
            Err(SourceError::Closed) => break,
            Err(e) => {
                error!("{}", e);
                return ExitCode::FAILURE;
            }
        };
        number += 1;

        let line = decode_line(&raw);
        if line.is_empty() {
            continue;
        }

        match read_frame(&line) {
            Ok(record) => {
                accepted += 1;
                if args.json {
                    match serde_json::to_string(&record) {
                        Ok(json) => println!("{}", json),
                        Err(e) => warn!("line {}: cannot serialize: {}", number, e),
                    }
                } else {
                    info!("line {}: {}", number, record);
                }
            }
            Err(e) => {
                rejected += 1;
                warn!("line {}: {}", number, e);
            }
        }
    }

    info!("{} accepted, {} rejected", accepted, rejected);
    ExitCode::SUCCESS
}
