use fs2::FileExt;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

pub mod jsonl;
pub mod settings;

pub use jsonl::{JsonlNotificationStore, NewNotification};
pub use settings::JsonSettingsStore;

const APP_DIR: &str = "tmux-intray";

/// Per-user data root: `<data_dir>/tmux-intray/`, falling back to
/// `~/.tmux-intray/` and finally a relative directory.
pub fn data_root() -> PathBuf {
    if let Some(data_dir) = dirs::data_dir() {
        data_dir.join(APP_DIR)
    } else if let Some(home) = dirs::home_dir() {
        home.join(format!(".{APP_DIR}"))
    } else {
        PathBuf::from(".tmux-intray")
    }
}

/// Per-user config root: `<config_dir>/tmux-intray/`.
pub fn config_root() -> PathBuf {
    match dirs::config_dir() {
        Some(config_dir) => config_dir.join(APP_DIR),
        None => data_root(),
    }
}

/// Default notification store file.
pub fn default_store_path() -> PathBuf {
    data_root().join("notifications.jsonl")
}

/// Default settings file.
pub fn default_settings_path() -> PathBuf {
    config_root().join("settings.json")
}

/// Lock file guarding `path`: same directory, `.lock` extension.
pub fn lock_path_for(path: &Path) -> PathBuf {
    path.with_extension("lock")
}

/// Atomic write: write to temp file in same dir, then rename.
pub fn write_atomic(path: &Path, data: &[u8]) -> anyhow::Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("no parent dir for {}", path.display()))?;
    fs::create_dir_all(parent)?;
    let mut tmp = tempfile::NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.flush()?;
    tmp.persist(path)?;
    Ok(())
}

/// File-based exclusive lock guard.
pub struct LockGuard {
    _file: fs::File,
}

/// Acquire an exclusive file lock. Creates the lock file if needed.
pub fn lock_file(path: &Path) -> anyhow::Result<LockGuard> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = fs::OpenOptions::new()
        .create(true)
        .truncate(false)
        .write(true)
        .open(path)?;
    file.lock_exclusive()?;
    Ok(LockGuard { _file: file })
}
