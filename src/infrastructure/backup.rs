use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::fs;

/// Copies `input` to `<name>.bak.<unix-millis>` next to it.
pub async fn create_timestamped_backup(input: &Path) -> Result<PathBuf> {
    let file_name = input
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| anyhow!("store file name is not valid UTF-8"))?;

    let ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();

    let backup_path = input.with_file_name(format!("{file_name}.bak.{ts}"));
    fs::copy(input, &backup_path)
        .await
        .with_context(|| format!("copying {file_name} to backup"))?;
    Ok(backup_path)
}
