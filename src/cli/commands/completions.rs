//! Shell completions command.

use crate::cli::{Cli, Shell};
use crate::error::Result;
use clap::CommandFactory;
use clap_complete::{Generator, generate, shells};
use std::io;

const BIN_NAME: &str = "tw";

fn emit<G: Generator>(generator: G) {
    generate(generator, &mut Cli::command(), BIN_NAME, &mut io::stdout());
}

/// Write completions for `shell` to stdout.
///
/// # Errors
///
/// Does not fail; clap writes the script directly.
pub fn execute(shell: &Shell) -> Result<()> {
    match shell {
        Shell::Bash => emit(shells::Bash),
        Shell::Zsh => emit(shells::Zsh),
        Shell::Fish => emit(shells::Fish),
        Shell::PowerShell => emit(shells::PowerShell),
        Shell::Elvish => emit(shells::Elvish),
    }
    Ok(())
}
