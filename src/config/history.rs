use crate::config::model::PrettifierConfig;

/// Snapshot-based undo/redo over whole configuration values.
#[derive(Clone, Debug)]
pub struct ConfigHistory {
    current: PrettifierConfig,
    undo: Vec<PrettifierConfig>,
    redo: Vec<PrettifierConfig>,
    limit: usize,
}

impl ConfigHistory {
    pub const DEFAULT_LIMIT: usize = 64;

    pub fn new(initial: PrettifierConfig) -> Self {
        Self::with_limit(initial, Self::DEFAULT_LIMIT)
    }

    pub fn with_limit(initial: PrettifierConfig, limit: usize) -> Self {
        Self {
            current: initial,
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    pub fn current(&self) -> &PrettifierConfig {
        &self.current
    }

    /// Make `next` current. Identical values are not recorded.
    ///
    /// Returns `false` when nothing changed.
    pub fn record(&mut self, next: PrettifierConfig) -> bool {
        if next == self.current {
            return false;
        }
        let prev = std::mem::replace(&mut self.current, next);
        self.undo.push(prev);
        if self.undo.len() > self.limit {
            self.undo.remove(0);
        }
        self.redo.clear();
        true
    }

    pub fn undo(&mut self) -> Option<&PrettifierConfig> {
        let prev = self.undo.pop()?;
        let cur = std::mem::replace(&mut self.current, prev);
        self.redo.push(cur);
        Some(&self.current)
    }

    pub fn redo(&mut self) -> Option<&PrettifierConfig> {
        let next = self.redo.pop()?;
        let cur = std::mem::replace(&mut self.current, next);
        self.undo.push(cur);
        Some(&self.current)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/config/history.rs"]
mod tests;
