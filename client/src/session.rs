//! On-disk session blob.
//!
//! The signed-in identity persists across runs as a small JSON file under
//! the platform data directory. It exists for continuity only, never for
//! correctness: a missing or unreadable blob simply means "not signed in".

use std::fs;
use std::path::PathBuf;

use crate::state::LocalUser;

const SESSION_FILE: &str = "session.json";

pub fn data_dir() -> anyhow::Result<PathBuf> {
    dirs::data_dir()
        .map(|dir| dir.join("parlor"))
        .ok_or_else(|| anyhow::anyhow!("no platform data directory"))
}

pub fn load_user() -> Option<LocalUser> {
    let path = data_dir().ok()?.join(SESSION_FILE);
    let content = fs::read_to_string(path).ok()?;
    serde_json::from_str(&content).ok()
}

pub fn save_user(user: &LocalUser) -> anyhow::Result<()> {
    let dir = data_dir()?;
    fs::create_dir_all(&dir)?;
    let content = serde_json::to_string_pretty(user)?;
    fs::write(dir.join(SESSION_FILE), content)?;
    Ok(())
}

pub fn clear_user() -> anyhow::Result<()> {
    let path = data_dir()?.join(SESSION_FILE);
    if path.exists() {
        fs::remove_file(path)?;
    }
    Ok(())
}
