use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::PrettifierResult;

/// `<dir>/<stem>_Backup<.ext>` beside `path`.
pub fn backup_path(path: &Path) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match path.extension() {
        Some(ext) => format!("{stem}_Backup.{}", ext.to_string_lossy()),
        None => format!("{stem}_Backup"),
    };
    path.with_file_name(name)
}

pub fn has_backup(path: &Path) -> bool {
    backup_path(path).is_file()
}

/// Copy `path` over its backup, replacing any previous backup.
#[tracing::instrument(level = "debug")]
pub fn backup(path: &Path) -> PrettifierResult<PathBuf> {
    let dst = backup_path(path);
    std::fs::copy(path, &dst)
        .with_context(|| format!("back up '{}' to '{}'", path.display(), dst.display()))?;
    tracing::info!(backup = %dst.display(), "backed up");
    Ok(dst)
}

/// Copy the backup over `path`. Returns `false` when no backup exists.
#[tracing::instrument(level = "debug")]
pub fn restore(path: &Path) -> PrettifierResult<bool> {
    let src = backup_path(path);
    if !src.is_file() {
        tracing::warn!(path = %path.display(), "no backup to restore");
        return Ok(false);
    }
    std::fs::copy(&src, path)
        .with_context(|| format!("restore '{}' from '{}'", path.display(), src.display()))?;
    tracing::info!(path = %path.display(), "restored from backup");
    Ok(true)
}

/// Back up `path` only if no backup exists yet. Returns whether one was created.
pub fn ensure_backup(path: &Path) -> PrettifierResult<bool> {
    if has_backup(path) {
        return Ok(false);
    }
    backup(path)?;
    Ok(true)
}

#[cfg(test)]
#[path = "../../tests/unit/export/backup.rs"]
mod tests;
