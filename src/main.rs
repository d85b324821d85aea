//! tw CLI entry point.

use clap::Parser;
use std::process::ExitCode;
use tw::cli::commands;
use tw::cli::{Cli, Commands};
use tw::error::Error;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.quiet {
        tw::QUIET.store(true, std::sync::atomic::Ordering::Relaxed);
    }
    if cli.no_color {
        colored::control::set_override(false);
    }

    init_tracing(cli.verbose, cli.quiet);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if cli.json {
                eprintln!("{}", e.to_structured_json());
            } else if let Some(hint) = e.hint() {
                eprintln!("Error: {e}\n  Hint: {hint}");
            } else {
                eprintln!("Error: {e}");
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli) -> Result<(), Error> {
    let db = cli.db.as_ref();
    let json = cli.json;

    match &cli.command {
        Commands::List => commands::todo::list(db, json),
        Commands::Add { text } => commands::todo::add(text, db, json),
        Commands::Toggle { id } => commands::todo::toggle(*id, db, json),
        Commands::Delete { id } => commands::todo::delete(*id, db, json),

        Commands::Shell => commands::shell::execute(db),
        Commands::Serve => commands::serve::execute(db),
        Commands::History { limit } => commands::history::execute(db, *limit, json),

        Commands::Version => commands::version::execute(json),
        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
