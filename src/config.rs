// todolist/src/config.rs

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{fs, path::{Path, PathBuf}};

use crate::store::{OnCorrupt, Store};

pub const DEFAULT_FILE: &str = "todos.json";
pub const DEFAULT_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_PUBLIC_DIR: &str = "public";
pub const WORKSPACE_FILE: &str = ".todo.toml";

/// Merged in order: user -> workspace -> explicit file -> env -> flags. Later layers win.
#[derive(Clone, Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub server: ServerConfig,
}

#[derive(Clone, Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,         // defaults to ./todos.json
    pub on_corrupt: Option<OnCorrupt>, // defaults to reset
}

#[derive(Clone, Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: Option<String>,
    pub public_dir: Option<PathBuf>,
}

fn merge(a: &mut Config, b: &Config) {
    if b.store.path.is_some() { a.store.path = b.store.path.clone(); }
    if b.store.on_corrupt.is_some() { a.store.on_corrupt = b.store.on_corrupt; }
    if b.server.addr.is_some() { a.server.addr = b.server.addr.clone(); }
    if b.server.public_dir.is_some() { a.server.public_dir = b.server.public_dir.clone(); }
}

fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("org", "todolist", "todolist").map(|p| p.config_dir().join("config.toml"))
}

/// Missing file is `None`; a file that exists but does not parse is an error.
fn read_file(path: &Path) -> Result<Option<Config>> {
    if !path.exists() { return Ok(None); }
    let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: Config = toml::from_str(&text).with_context(|| format!("parse {}", path.display()))?;
    Ok(Some(cfg))
}

impl Config {
    /// Loads the file layers and the process environment.
    pub fn load(workspace_root: impl AsRef<Path>, explicit: Option<&Path>) -> Result<Self> {
        let mut merged = Self::load_files(user_config_path().as_deref(), workspace_root.as_ref(), explicit)?;
        merged.apply_env(|k| std::env::var(k).ok());
        Ok(merged)
    }

    fn load_files(user: Option<&Path>, workspace_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        let mut merged = Config::default();
        if let Some(usr) = user.map(read_file).transpose()?.flatten() { merge(&mut merged, &usr); }
        if let Some(ws) = read_file(&workspace_root.join(WORKSPACE_FILE))? { merge(&mut merged, &ws); }
        if let Some(path) = explicit {
            let cfg = read_file(path)?.with_context(|| format!("config file not found: {}", path.display()))?;
            merge(&mut merged, &cfg);
        }
        Ok(merged)
    }

    /// `TODO_FILE` replaces the data file; `PORT` replaces the port of the bind address.
    pub fn apply_env(&mut self, get: impl Fn(&str) -> Option<String>) {
        if let Some(file) = get("TODO_FILE").filter(|s| !s.is_empty()) {
            self.store.path = Some(file.into());
        }
        if let Some(port) = get("PORT").filter(|s| !s.is_empty()) {
            let addr = self.addr();
            let host = addr.rsplit_once(':').map(|(h, _)| h).unwrap_or(addr.as_str());
            self.server.addr = Some(format!("{host}:{port}"));
        }
    }

    pub fn overlay(&mut self, patch: &Config) { merge(self, patch); }

    pub fn store_path(&self) -> PathBuf {
        self.store.path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_FILE))
    }
    pub fn on_corrupt(&self) -> OnCorrupt { self.store.on_corrupt.unwrap_or_default() }
    pub fn addr(&self) -> String { self.server.addr.clone().unwrap_or_else(|| DEFAULT_ADDR.into()) }
    pub fn public_dir(&self) -> PathBuf {
        self.server.public_dir.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLIC_DIR))
    }

    pub fn open_store(&self) -> Store {
        Store::open(self.store_path()).with_policy(self.on_corrupt())
    }
}
