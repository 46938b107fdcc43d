// todolist/src/backend.rs

use parking_lot::RwLock;
use std::{fs, io, path::{Path, PathBuf}, sync::Arc};

use crate::error::{StoreError, StoreResult};

/// Where the serialized store lives. `read` returns `None` when nothing has been saved yet.
pub trait Backend: Send + Sync {
    fn read(&self) -> StoreResult<Option<String>>;
    fn write(&self, data: &str) -> StoreResult<()>;
    fn location(&self) -> String;
}

#[derive(Clone, Debug)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self { Self { path: path.into() } }
    pub fn path(&self) -> &Path { &self.path }
}

impl Backend for FileBackend {
    /// Invalid UTF-8 is decoded lossily so one bad byte in a todo's text cannot cost the whole file.
    fn read(&self) -> StoreResult<Option<String>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StoreError::io(&self.path, e)),
        }
    }

    /// Plain overwrite; a crash mid-write leaves a truncated file behind.
    fn write(&self, data: &str) -> StoreResult<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).map_err(|e| StoreError::io(dir, e))?;
        }
        fs::write(&self.path, data).map_err(|e| StoreError::io(&self.path, e))
    }

    fn location(&self) -> String { self.path.display().to_string() }
}

/// Shared in-memory buffer. Clones see the same data.
#[derive(Clone, Debug, Default)]
pub struct MemoryBackend {
    data: Arc<RwLock<Option<String>>>,
}

impl MemoryBackend {
    pub fn new() -> Self { Self::default() }
    pub fn with_contents(data: impl Into<String>) -> Self {
        Self { data: Arc::new(RwLock::new(Some(data.into()))) }
    }
    pub fn contents(&self) -> Option<String> { self.data.read().clone() }
}

impl Backend for MemoryBackend {
    fn read(&self) -> StoreResult<Option<String>> { Ok(self.data.read().clone()) }
    fn write(&self, data: &str) -> StoreResult<()> {
        *self.data.write() = Some(data.to_owned());
        Ok(())
    }
    fn location(&self) -> String { "<memory>".into() }
}
