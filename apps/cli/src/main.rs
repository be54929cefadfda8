//! `dirql` command line entry point.
//!
//! Indexes one directory, then runs each `-e` statement (or each non-empty
//! stdin line) against it and prints the rows.

mod args;
mod output;

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::Parser;
use dirql::{IndexOptions, PathStyle, Session};

use args::Args;

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    if !args.directory.is_dir() {
        eprintln!("Not a directory: {}", args.directory.display());
        return ExitCode::FAILURE;
    }

    let options = index_options(&args);
    let session = match Session::open(&args.directory, &options) {
        Ok(session) => session,
        Err(error) => {
            eprintln!("{error}");
            return ExitCode::FAILURE;
        }
    };

    let statements: Box<dyn Iterator<Item = io::Result<String>>> = if args.execute.is_empty() {
        Box::new(io::stdin().lock().lines())
    } else {
        Box::new(args.execute.clone().into_iter().map(Ok))
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let mut failures = 0usize;
    for statement in statements {
        let statement = match statement {
            Ok(statement) => statement,
            Err(error) => {
                eprintln!("{error}");
                return ExitCode::FAILURE;
            }
        };
        if statement.trim().is_empty() {
            continue;
        }

        match session.query(&statement) {
            Ok(rows) => {
                if let Err(error) = output::write_rows(&mut out, &rows, args.format) {
                    eprintln!("{error}");
                    return ExitCode::FAILURE;
                }
            }
            Err(error) => {
                failures += 1;
                eprintln!("{error}");
            }
        }
    }
    if let Err(error) = out.flush() {
        eprintln!("{error}");
        return ExitCode::FAILURE;
    }

    if failures > 0 {
        log::info!("dirql finished failed_statements={failures}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn init_logging(verbose: u8) {
    let mut builder = env_logger::Builder::from_default_env();
    match verbose {
        0 => {}
        1 => {
            builder.filter_level(log::LevelFilter::Info);
        }
        _ => {
            builder.filter_level(log::LevelFilter::Debug);
        }
    }
    builder.init();
}

fn index_options(args: &Args) -> IndexOptions {
    let style = if args.absolute {
        PathStyle::Absolute
    } else {
        PathStyle::Relative
    };
    args.ignore
        .iter()
        .fold(IndexOptions::new().with_path_style(style), |options, path| {
            options.with_ignored(path.clone())
        })
}
