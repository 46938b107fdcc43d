// todolist/src/store.rs

use serde::Deserialize;
use std::{path::PathBuf, sync::Arc};
use tracing::{debug, warn};

use crate::{
    backend::{Backend, FileBackend},
    error::{StoreError, StoreResult},
    todo::{Todo, TodoId, TodoList},
};

/// What `load` does with data that was read but does not parse.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OnCorrupt {
    /// Start over from an empty store.
    #[default]
    Reset,
    /// Return `StoreError::Corrupt` and leave the data alone.
    Fail,
}

/// Handle over a backend. Holds no todos: every operation is a fresh load, mutate, save.
#[derive(Clone)]
pub struct Store {
    backend: Arc<dyn Backend>,
    on_corrupt: OnCorrupt,
}

impl Store {
    pub fn new(backend: impl Backend + 'static) -> Self {
        Self { backend: Arc::new(backend), on_corrupt: OnCorrupt::default() }
    }

    pub fn open(path: impl Into<PathBuf>) -> Self { Self::new(FileBackend::new(path)) }

    pub fn with_policy(mut self, on_corrupt: OnCorrupt) -> Self {
        self.on_corrupt = on_corrupt;
        self
    }

    pub fn policy(&self) -> OnCorrupt { self.on_corrupt }
    pub fn location(&self) -> String { self.backend.location() }

    pub fn load(&self) -> StoreResult<TodoList> {
        // Read errors surface under every policy; only unparsable data resets.
        let Some(raw) = self.backend.read()? else { return Ok(TodoList::default()) };
        match serde_json::from_str::<TodoList>(&raw) {
            Ok(list) => Ok(list),
            Err(e) if self.on_corrupt == OnCorrupt::Reset => {
                warn!(location = %self.location(), error = %e, "corrupt todo store, starting empty");
                Ok(TodoList::default())
            }
            Err(source) => Err(StoreError::Corrupt { location: self.location(), source }),
        }
    }

    /// Overwrites the backend with the whole list, pretty-printed with a 2-space indent.
    pub fn save(&self, list: &TodoList) -> StoreResult<()> {
        let data = serde_json::to_string_pretty(list)?;
        self.backend.write(&data)
    }

    pub fn add(&self, text: impl Into<String>) -> StoreResult<Todo> {
        let mut list = self.load()?;
        let todo = list.push(text)?.clone();
        self.save(&list)?;
        debug!(id = todo.id, "added todo");
        Ok(todo)
    }

    pub fn list(&self, show_all: bool) -> StoreResult<Vec<Todo>> {
        Ok(self.load()?.filtered(show_all))
    }

    pub fn complete(&self, id: TodoId) -> StoreResult<Option<Todo>> { self.set_completed(id, true) }
    pub fn uncomplete(&self, id: TodoId) -> StoreResult<Option<Todo>> { self.set_completed(id, false) }

    fn set_completed(&self, id: TodoId, completed: bool) -> StoreResult<Option<Todo>> {
        let mut list = self.load()?;
        let Some(todo) = list.set_completed(id, completed).cloned() else {
            debug!(id, "todo not found");
            return Ok(None);
        };
        self.save(&list)?;
        debug!(id, completed, "updated todo");
        Ok(Some(todo))
    }

    pub fn delete(&self, id: TodoId) -> StoreResult<Option<Todo>> {
        let mut list = self.load()?;
        let Some(todo) = list.remove(id) else {
            debug!(id, "todo not found");
            return Ok(None);
        };
        self.save(&list)?;
        debug!(id, "deleted todo");
        Ok(Some(todo))
    }

    /// Saves even when nothing was removed.
    pub fn clear_completed(&self) -> StoreResult<usize> {
        let mut list = self.load()?;
        let count = list.retain_pending();
        self.save(&list)?;
        debug!(count, "cleared completed todos");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;

    struct UnreadableBackend;

    impl Backend for UnreadableBackend {
        fn read(&self) -> StoreResult<Option<String>> {
            Err(StoreError::io("todos.json", std::io::Error::from(std::io::ErrorKind::PermissionDenied)))
        }
        fn write(&self, _: &str) -> StoreResult<()> { panic!("must not write after a failed read") }
        fn location(&self) -> String { "todos.json".into() }
    }

    fn store() -> (Store, MemoryBackend) {
        let mem = MemoryBackend::new();
        (Store::new(mem.clone()), mem)
    }

    #[test]
    fn load_empty_backend_gives_fresh_list() {
        let (s, mem) = store();
        assert_eq!(s.load().unwrap(), TodoList::default());
        assert!(mem.contents().is_none(), "load must not write");
    }

    #[test]
    fn walkthrough() {
        let (s, _) = store();
        assert_eq!(s.add("a").unwrap().id, 1);
        assert_eq!(s.add("b").unwrap().id, 2);
        assert!(s.complete(1).unwrap().unwrap().completed);

        let pending = s.list(false).unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!((pending[0].id, pending[0].text.as_str()), (2, "b"));

        assert_eq!(s.clear_completed().unwrap(), 1);
        let all = s.list(true).unwrap();
        assert_eq!(all.iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn ids_not_reused_after_delete_or_clear() {
        let (s, _) = store();
        s.add("a").unwrap();
        s.add("b").unwrap();
        s.delete(2).unwrap();
        s.complete(1).unwrap();
        s.clear_completed().unwrap();
        assert_eq!(s.add("c").unwrap().id, 3);
        assert_eq!(s.load().unwrap().next_id, 4);
    }

    #[test]
    fn uncomplete_restores_pending() {
        let (s, _) = store();
        let t = s.add("x").unwrap();
        s.complete(t.id).unwrap();
        let back = s.uncomplete(t.id).unwrap().unwrap();
        assert!(!back.completed);
        assert_eq!(s.list(false).unwrap(), vec![back]);
    }

    #[test]
    fn unknown_id_does_not_write() {
        let (s, mem) = store();
        s.add("x").unwrap();
        let before = mem.contents();
        assert!(s.complete(999).unwrap().is_none());
        assert!(s.uncomplete(999).unwrap().is_none());
        assert!(s.delete(999).unwrap().is_none());
        assert_eq!(mem.contents(), before);
    }

    #[test]
    fn delete_removes_only_the_match() {
        let (s, _) = store();
        for t in ["a", "b", "c"] { s.add(t).unwrap(); }
        let gone = s.delete(2).unwrap().unwrap();
        assert_eq!(gone.text, "b");
        let left: Vec<_> = s.list(true).unwrap().into_iter().map(|t| t.text).collect();
        assert_eq!(left, vec!["a", "c"]);
    }

    #[test]
    fn clear_with_nothing_completed_keeps_content() {
        let (s, mem) = store();
        s.add("a").unwrap();
        let before = s.load().unwrap();
        assert_eq!(s.clear_completed().unwrap(), 0);
        assert_eq!(s.load().unwrap(), before);
        assert!(mem.contents().is_some());
    }

    #[test]
    fn clear_on_empty_store_still_saves() {
        let (s, mem) = store();
        assert_eq!(s.clear_completed().unwrap(), 0);
        let saved: TodoList = serde_json::from_str(&mem.contents().unwrap()).unwrap();
        assert_eq!(saved, TodoList::default());
    }

    #[test]
    fn saves_pretty_json_with_two_space_indent() {
        let (s, mem) = store();
        s.add("a").unwrap();
        let raw = mem.contents().unwrap();
        assert!(raw.starts_with("{\n  \"todos\": [\n    {\n      \"id\": 1,"), "{raw}");
        assert!(raw.contains("\"nextId\": 2"));
    }

    #[test]
    fn save_of_load_is_idempotent() {
        let raw = r#"{"todos":[{"id":4,"text":"keep","completed":true,"createdAt":"2020-02-02T02:02:02.000Z"}],"nextId":9}"#;
        let mem = MemoryBackend::with_contents(raw);
        let s = Store::new(mem.clone());
        let first = s.load().unwrap();
        s.save(&first).unwrap();
        let once = mem.contents().unwrap();
        s.save(&s.load().unwrap()).unwrap();
        assert_eq!(mem.contents().unwrap(), once);
        assert_eq!(s.load().unwrap(), first);
        assert_eq!(first.todos[0].created_at, "2020-02-02T02:02:02.000Z");
    }

    #[test]
    fn read_errors_surface_under_every_policy() {
        for policy in [OnCorrupt::Reset, OnCorrupt::Fail] {
            let s = Store::new(UnreadableBackend).with_policy(policy);
            assert!(matches!(s.load(), Err(StoreError::Io { .. })), "{policy:?}");
            assert!(matches!(s.add("x"), Err(StoreError::Io { .. })), "{policy:?}");
            assert!(matches!(s.clear_completed(), Err(StoreError::Io { .. })), "{policy:?}");
        }
    }

    #[test]
    fn exhausted_id_space_is_an_error_not_a_panic() {
        let raw = format!(r#"{{"todos":[],"nextId":{}}}"#, u64::MAX);
        let mem = MemoryBackend::with_contents(raw.clone());
        let s = Store::new(mem.clone());
        assert!(matches!(s.add("x"), Err(StoreError::IdsExhausted)));
        assert_eq!(mem.contents(), Some(raw));
    }

    #[test]
    fn corrupt_data_resets_by_default() {
        let mem = MemoryBackend::with_contents("{ not json");
        let s = Store::new(mem.clone());
        assert_eq!(s.load().unwrap(), TodoList::default());
        assert_eq!(s.add("fresh").unwrap().id, 1);
    }

    #[test]
    fn corrupt_data_fails_under_strict_policy() {
        let mem = MemoryBackend::with_contents("[1, 2");
        let s = Store::new(mem.clone()).with_policy(OnCorrupt::Fail);
        assert!(matches!(s.load(), Err(StoreError::Corrupt { .. })));
        assert!(matches!(s.add("x"), Err(StoreError::Corrupt { .. })));
        assert_eq!(mem.contents().as_deref(), Some("[1, 2"));
    }
}
