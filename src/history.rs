//! Linear snapshot history over the entity collection.
//!
//! Snapshots are deep clones at record time (payload ownership plus the
//! replace-never-mutate material discipline make `Clone` structurally
//! independent), so a later live edit can never corrupt a recorded state.

use crate::entity::SceneEntity;

/// One-shot suppression of the next automatic record.
///
/// Undo/redo arm the guard; the very next `record` call consumes it and
/// skips. Without this, the state change caused by navigating history would
/// itself be recorded as a new edit, truncating the redo branch. Modelled
/// as an explicit state machine so its interaction with asynchronous
/// imports (which also commit snapshots) stays deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NavigationGuard {
    Inactive,
    Armed,
}

#[derive(Debug)]
pub struct History {
    records: Vec<Vec<SceneEntity>>,
    cursor: usize,
    guard: NavigationGuard,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self { records: Vec::new(), cursor: 0, guard: NavigationGuard::Inactive }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        !self.records.is_empty() && self.cursor > 0
    }

    pub fn can_redo(&self) -> bool {
        !self.records.is_empty() && self.cursor + 1 < self.records.len()
    }

    /// Record a snapshot, discarding any redo branch past the cursor.
    ///
    /// Returns `false` when an armed navigation guard consumed the call
    /// instead of recording.
    pub fn record(&mut self, snapshot: &[SceneEntity]) -> bool {
        if self.guard == NavigationGuard::Armed {
            self.guard = NavigationGuard::Inactive;
            return false;
        }
        if !self.records.is_empty() {
            self.records.truncate(self.cursor + 1);
        }
        self.records.push(snapshot.to_vec());
        self.cursor = self.records.len() - 1;
        true
    }

    /// Step back one snapshot, arming the guard. `None` at the start of
    /// history — a benign boundary, not a failure.
    pub fn undo(&mut self) -> Option<Vec<SceneEntity>> {
        if !self.can_undo() {
            log::debug!("[history] nothing to undo");
            return None;
        }
        self.cursor -= 1;
        self.guard = NavigationGuard::Armed;
        Some(self.records[self.cursor].clone())
    }

    /// Step forward one snapshot, arming the guard. `None` at the end.
    pub fn redo(&mut self) -> Option<Vec<SceneEntity>> {
        if !self.can_redo() {
            log::debug!("[history] nothing to redo");
            return None;
        }
        self.cursor += 1;
        self.guard = NavigationGuard::Armed;
        Some(self.records[self.cursor].clone())
    }
}
