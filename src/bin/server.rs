// todolist/src/bin/server.rs

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio::net::TcpListener;

use todolist::{cli::StoreArgs, server::{self, AppState}, Config};

#[derive(Parser)]
#[command(name = "todo-server", version, about = "REST API and web page for the todo list")]
struct Args {
    #[command(flatten)]
    store: StoreArgs,
    /// Bind address [default: 127.0.0.1:3000, port overridable with PORT]
    #[arg(long)]
    addr: Option<String>,
    /// Directory of static assets served next to the API
    #[arg(long)]
    public: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    todolist::init_tracing("info");
    let args = Args::parse();

    let cwd = std::env::current_dir().context("resolve working directory")?;
    let mut cfg = Config::load(&cwd, args.store.config.as_deref())?;
    let mut patch = args.store.patch();
    patch.server.addr = args.addr;
    patch.server.public_dir = args.public;
    cfg.overlay(&patch);

    let addr = cfg.addr();
    let listener = TcpListener::bind(&addr).await.with_context(|| format!("bind {addr}"))?;
    server::serve(listener, AppState::new(cfg.open_store(), cfg.public_dir())).await
}
