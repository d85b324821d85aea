//! Interactive line shell over a [`TodoController`].
//!
//! Commands: `add <text>`, `toggle <id>`, `delete <id>`, `list`, `help`,
//! `quit`. Worker errors are printed and the loop continues.

use std::io::Write;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use super::render::render_list;
use super::{Submission, TodoController};
use crate::error::Result;

const HELP: &str = "\
Commands:
  add <text>     add a todo          (a)
  toggle <id>    flip done/not done  (t, done)
  delete <id>    remove a todo       (d, rm)
  list           show the list       (ls)
  help           this text           (?)
  quit           leave the shell     (q, exit)";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Add(String),
    Toggle(i64),
    Delete(i64),
    Help,
    Quit,
    Empty,
}

impl ShellCommand {
    /// Parse a line of input.
    ///
    /// # Errors
    ///
    /// Returns a message for unknown commands or bad ids.
    pub fn parse(line: &str) -> std::result::Result<Self, String> {
        let line = line.trim();
        let (word, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(w, r)| (w, r.trim()));

        match word.to_lowercase().as_str() {
            "" => Ok(Self::Empty),
            "list" | "ls" => Ok(Self::List),
            "add" | "a" => Ok(Self::Add(rest.to_string())),
            "toggle" | "t" | "done" => parse_id(rest).map(Self::Toggle),
            "delete" | "d" | "rm" => parse_id(rest).map(Self::Delete),
            "help" | "?" => Ok(Self::Help),
            "quit" | "q" | "exit" => Ok(Self::Quit),
            other => Err(format!("unknown command '{other}' (try 'help')")),
        }
    }
}

fn parse_id(s: &str) -> std::result::Result<i64, String> {
    s.parse()
        .map_err(|_| format!("expected a numeric todo id, got '{s}'"))
}

/// Run the shell until `quit` or end of input.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails.
pub async fn run_shell<R, W>(ui: &mut TodoController, input: R, out: &mut W) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    if let Err(e) = ui.list().await {
        writeln!(out, "error: {e}")?;
    }
    render_list(out, ui.todos())?;

    let mut lines = input.lines();
    loop {
        write!(out, "> ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            writeln!(out)?;
            break;
        };

        let command = match ShellCommand::parse(&line) {
            Ok(command) => command,
            Err(msg) => {
                writeln!(out, "{msg}")?;
                continue;
            }
        };

        let outcome = match command {
            ShellCommand::Empty => continue,
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                writeln!(out, "{HELP}")?;
                continue;
            }
            ShellCommand::List => ui.list().await.map(|_| ()),
            ShellCommand::Add(text) => match ui.add(&text).await {
                Ok(Submission::Ignored) => {
                    writeln!(out, "Nothing to add.")?;
                    continue;
                }
                Ok(Submission::Added) => Ok(()),
                Err(e) => Err(e),
            },
            ShellCommand::Toggle(id) => ui.toggle(id).await,
            ShellCommand::Delete(id) => ui.delete(id).await,
        };

        match outcome {
            Ok(()) => render_list(out, ui.todos())?,
            Err(e) => writeln!(out, "error: {e}")?,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::WorkerClient;
    use crate::worker::WorkerConfig;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ShellCommand::parse("  "), Ok(ShellCommand::Empty));
        assert_eq!(ShellCommand::parse("ls"), Ok(ShellCommand::List));
        assert_eq!(
            ShellCommand::parse("add  buy   milk "),
            Ok(ShellCommand::Add("buy   milk".to_string()))
        );
        assert_eq!(ShellCommand::parse("add"), Ok(ShellCommand::Add(String::new())));
        assert_eq!(ShellCommand::parse("TOGGLE 3"), Ok(ShellCommand::Toggle(3)));
        assert_eq!(ShellCommand::parse("rm 4"), Ok(ShellCommand::Delete(4)));
        assert_eq!(ShellCommand::parse("exit"), Ok(ShellCommand::Quit));
    }

    #[test]
    fn test_parse_errors() {
        assert!(ShellCommand::parse("toggle one").unwrap_err().contains("numeric"));
        assert!(ShellCommand::parse("delete").is_err());
        assert!(ShellCommand::parse("frobnicate").unwrap_err().contains("unknown command"));
    }

    #[tokio::test]
    async fn test_session() {
        colored::control::set_override(false);
        let (_handle, client) = WorkerClient::spawn(WorkerConfig::in_memory()).unwrap();
        let mut ui = TodoController::new(client);

        let input: &[u8] = b"add buy milk\nadd   \ntoggle 1\nbogus\nlist\nquit\nadd never\n";
        let mut out = Vec::new();
        run_shell(&mut ui, input, &mut out).await.unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("No todos yet.\n"));
        assert!(out.contains("[ ]   1  buy milk"));
        assert!(out.contains("Nothing to add."));
        assert!(out.contains("[x]   1  buy milk"));
        assert!(out.contains("unknown command 'bogus'"));
        assert!(!out.contains("never"));

        assert_eq!(ui.todos().unwrap().len(), 1);
    }
}
