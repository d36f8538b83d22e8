//! Item-list persistence (fail-soft JSON file).

use std::path::PathBuf;

use anyhow::Context;

use scantally_ledger::StockItem;

/// Load/save of the full ordered item list.
///
/// Saved on every ledger mutation, loaded once at startup. Reads are
/// fail-soft: a missing, unreadable or malformed file yields an empty list
/// with a log entry, never an error - losing a count beats crashing the
/// counting tool.
#[derive(Debug, Clone)]
pub struct StockFile {
    path: PathBuf,
}

impl StockFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Load the persisted list, or an empty one.
    pub fn load(&self) -> Vec<StockItem> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no saved item list; starting empty");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "failed to read saved item list; starting empty");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "saved item list is malformed; starting empty");
                Vec::new()
            }
        }
    }

    /// Serialize the full current list back to disk.
    pub fn save(&self, items: &[StockItem]) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let raw = serde_json::to_string(items).context("failed to serialize item list")?;
        std::fs::write(&self.path, raw)
            .with_context(|| format!("failed to write {}", self.path.display()))?;
        Ok(())
    }
}
