// todolist/src/todo.rs

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{StoreError, StoreResult};

pub type TodoId = u64;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub id: TodoId,
    pub text: String,
    pub completed: bool,
    pub created_at: String, // ISO-8601 UTC, kept verbatim across load/save
}

impl Todo {
    pub fn new(id: TodoId, text: impl Into<String>) -> Self {
        Self { id, text: text.into(), completed: false, created_at: timestamp_now() }
    }
}

/// `[x] 3: buy milk` / `[ ] 3: buy milk`
impl fmt::Display for Todo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = if self.completed { "[x]" } else { "[ ]" };
        write!(f, "{} {}: {}", status, self.id, self.text)
    }
}

/// Millisecond precision with a `Z` suffix, e.g. `2026-10-17T09:15:02.123Z`.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Whole contents of the data file: `{ "todos": [...], "nextId": N }`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TodoList {
    pub todos: Vec<Todo>,
    pub next_id: TodoId,
}

impl Default for TodoList {
    fn default() -> Self { Self { todos: Vec::new(), next_id: 1 } }
}

impl TodoList {
    /// Appends a pending todo and advances the counter. Ids are never reused, and a
    /// hand-edited `nextId` that lags behind existing ids is skipped past.
    /// Fails with `IdsExhausted` rather than wrapping when the counter or an id sits at `u64::MAX`.
    pub fn push(&mut self, text: impl Into<String>) -> StoreResult<&Todo> {
        let floor = match self.todos.iter().map(|t| t.id).max() {
            Some(max) => max.checked_add(1).ok_or(StoreError::IdsExhausted)?,
            None => 1,
        };
        let id = self.next_id.max(floor);
        let next_id = id.checked_add(1).ok_or(StoreError::IdsExhausted)?;
        self.todos.push(Todo::new(id, text));
        self.next_id = next_id;
        Ok(&self.todos[self.todos.len() - 1])
    }

    pub fn filtered(&self, show_all: bool) -> Vec<Todo> {
        self.todos.iter().filter(|t| show_all || !t.completed).cloned().collect()
    }

    /// Sets the completion flag of the first todo with `id`.
    pub fn set_completed(&mut self, id: TodoId, completed: bool) -> Option<&Todo> {
        let todo = self.todos.iter_mut().find(|t| t.id == id)?;
        todo.completed = completed;
        Some(todo)
    }

    pub fn remove(&mut self, id: TodoId) -> Option<Todo> {
        let idx = self.todos.iter().position(|t| t.id == id)?;
        Some(self.todos.remove(idx))
    }

    /// Drops every completed todo; returns how many went.
    pub fn retain_pending(&mut self) -> usize {
        let before = self.todos.len();
        self.todos.retain(|t| !t.completed);
        before - self.todos.len()
    }
}
