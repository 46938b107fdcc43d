pub mod backend;
pub mod cli;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod todo;

pub use backend::{Backend, FileBackend, MemoryBackend};
pub use config::Config;
pub use error::{StoreError, StoreResult};
pub use store::{OnCorrupt, Store};
pub use todo::{Todo, TodoId, TodoList};

/// `RUST_LOG` wins; otherwise `default_filter`. Always writes to stderr so stdout stays clean.
pub fn init_tracing(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(std::env::var("RUST_LOG").unwrap_or_else(|_| default_filter.into()))
        .with_writer(std::io::stderr)
        .init();
}
