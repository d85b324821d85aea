//! CLI definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

/// tw - a todo list kept by a background persistence worker
#[derive(Parser, Debug)]
#[command(name = "tw", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Database path (default: ~/.tw/data/todos.db)
    #[arg(long, global = true, env = "TW_DB")]
    pub db: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (no output except errors)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show all todos
    #[command(alias = "ls")]
    List,

    /// Add a todo (blank text is ignored)
    Add {
        /// Todo text
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },

    /// Mark a todo done, or not done again
    Toggle {
        /// Todo id
        id: i64,
    },

    /// Delete a todo
    #[command(alias = "rm")]
    Delete {
        /// Todo id
        id: i64,
    },

    /// Interactive shell
    Shell,

    /// Run the worker over stdin/stdout (one JSON message per line)
    Serve,

    /// Show recent changes
    History {
        /// Maximum number of events
        #[arg(short = 'n', long, default_value = "20")]
        limit: u32,
    },

    /// Print version information
    Version,

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completions.
#[derive(clap::ValueEnum, Clone, Debug)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_add_joins_words() {
        let cli = Cli::parse_from(["tw", "add", "buy", "milk"]);
        let Commands::Add { text } = cli.command else {
            panic!("expected add");
        };
        assert_eq!(text.join(" "), "buy milk");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from(["tw", "toggle", "3", "--json", "--db", "/tmp/x.db"]);
        assert!(cli.json);
        assert_eq!(cli.db, Some(PathBuf::from("/tmp/x.db")));
        assert!(matches!(cli.command, Commands::Toggle { id: 3 }));
    }
}
