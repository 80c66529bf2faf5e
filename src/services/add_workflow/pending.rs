use std::path::Path;

use color_eyre::eyre::{Result, WrapErr};

use super::WorkflowState;

/// Keep a suspended run around so `resume` can pick it up later.
pub fn save_pending(path: &Path, state: &WorkflowState) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .wrap_err(format!("Failed to create {}", parent.display()))?;
    }
    let contents = serde_json::to_string_pretty(state).wrap_err("Failed to serialize run")?;
    std::fs::write(path, contents)
        .wrap_err(format!("Failed to write pending run: {}", path.display()))
}

pub fn load_pending(path: &Path) -> Result<Option<WorkflowState>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)
        .wrap_err(format!("Failed to read pending run: {}", path.display()))?;
    let state = serde_json::from_str(&contents)
        .wrap_err(format!("Failed to parse pending run: {}", path.display()))?;
    Ok(Some(state))
}

pub fn discard_pending(path: &Path) -> Result<()> {
    if path.exists() {
        std::fs::remove_file(path)
            .wrap_err(format!("Failed to remove pending run: {}", path.display()))?;
    }
    Ok(())
}
