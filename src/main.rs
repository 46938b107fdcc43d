// todolist/src/main.rs

use anyhow::{Context, Result};
use clap::Parser;
use std::process::ExitCode;

use todolist::{cli::{self, Cli}, Config};

fn main() -> ExitCode {
    todolist::init_tracing("warn");
    let args = Cli::parse();
    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(args: &Cli) -> Result<u8> {
    let cwd = std::env::current_dir().context("resolve working directory")?;
    let mut cfg = Config::load(&cwd, args.store.config.as_deref())?;
    cfg.overlay(&args.store.patch());
    let store = cfg.open_store();
    tracing::debug!(store = %store.location(), command = ?args.cmd, "running command");
    cli::run(&args.cmd, &store, &mut std::io::stdout().lock(), &mut std::io::stderr().lock())
}
