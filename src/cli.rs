// todolist/src/cli.rs

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::{io::{self, Write}, path::PathBuf};

use crate::{
    config::Config,
    store::{OnCorrupt, Store},
    todo::{Todo, TodoId},
};

pub const EXIT_OK: u8 = 0;
pub const EXIT_NOT_FOUND: u8 = 1;

#[derive(Parser, Debug)]
#[command(name = "todo", version, about = "A simple TODO CLI application")]
pub struct Cli {
    #[command(flatten)]
    pub store: StoreArgs,
    #[command(subcommand)]
    pub cmd: Cmd,
}

/// Store selection flags, shared with `todo-server`.
#[derive(Args, Clone, Debug, Default)]
pub struct StoreArgs {
    /// Data file [default: ./todos.json]
    #[arg(long, global = true)]
    pub file: Option<PathBuf>,
    /// Fail on a corrupt data file instead of starting over empty
    #[arg(long, global = true)]
    pub strict: bool,
    /// Extra config file, layered over the user and workspace config
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

impl StoreArgs {
    /// The flag layer, applied last over file and env config.
    pub fn patch(&self) -> Config {
        let mut patch = Config::default();
        patch.store.path = self.file.clone();
        if self.strict { patch.store.on_corrupt = Some(OnCorrupt::Fail); }
        patch
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Cmd {
    /// Add a new todo
    Add {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// List todos (all of them unless --pending)
    #[command(visible_alias = "ls")]
    List {
        /// Show all todos including completed (default)
        #[arg(short, long)]
        all: bool,
        /// Show only pending todos
        #[arg(short, long)]
        pending: bool,
    },
    /// Mark a todo as completed
    #[command(visible_alias = "complete")]
    Done { id: TodoId },
    /// Mark a todo as not completed
    #[command(visible_alias = "uncomplete")]
    Undone { id: TodoId },
    /// Delete a todo
    #[command(visible_alias = "rm")]
    Delete { id: TodoId },
    /// Remove all completed todos
    Clear,
}

/// Runs one command against `store`. Returns the process exit code; storage errors propagate.
pub fn run(cmd: &Cmd, store: &Store, out: &mut impl Write, err: &mut impl Write) -> Result<u8> {
    match cmd {
        Cmd::Add { text } => {
            let todo = store.add(text.join(" "))?;
            stdout_ok(writeln!(out, "Added: {todo}"))?;
        }
        Cmd::List { all: _, pending } => {
            let todos = store.list(!pending)?;
            stdout_ok(write_list(out, &todos))?;
        }
        Cmd::Done { id } => return report(store.complete(*id)?, *id, "Completed", out, err),
        Cmd::Undone { id } => return report(store.uncomplete(*id)?, *id, "Uncompleted", out, err),
        Cmd::Delete { id } => return report(store.delete(*id)?, *id, "Deleted", out, err),
        Cmd::Clear => {
            let count = store.clear_completed()?;
            stdout_ok(writeln!(out, "Cleared {count} completed todo(s)."))?;
        }
    }
    Ok(EXIT_OK)
}

/// A reader that went away (`todo add x | true`) is not a failure; the change is already saved.
fn stdout_ok(res: io::Result<()>) -> io::Result<()> {
    match res {
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => Ok(()),
        other => other,
    }
}

fn write_list(out: &mut impl Write, todos: &[Todo]) -> io::Result<()> {
    if todos.is_empty() {
        return writeln!(out, "No todos found.");
    }
    writeln!(out, "\nTODO List:")?;
    writeln!(out, "----------")?;
    for todo in todos { writeln!(out, "{todo}")?; }
    writeln!(out)
}

fn report(found: Option<Todo>, id: TodoId, verb: &str, out: &mut impl Write, err: &mut impl Write) -> Result<u8> {
    match found {
        Some(todo) => {
            stdout_ok(writeln!(out, "{verb}: {todo}"))?;
            Ok(EXIT_OK)
        }
        None => {
            writeln!(err, "Todo with id {id} not found.")?;
            Ok(EXIT_NOT_FOUND)
        }
    }
}
