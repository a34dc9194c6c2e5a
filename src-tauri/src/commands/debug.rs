use crate::config::{is_plain_filename, ShellConfig};
use crate::models::debug::DebugWriteResult;
use crate::state::ShellState;
use serde_json::Value;
use tauri::State;
use tokio::fs;

#[tauri::command]
pub async fn write_debug_file(
    state: State<'_, ShellState>,
    data: Option<Value>,
    filename: Option<String>,
) -> Result<DebugWriteResult, String> {
    Ok(write_debug_file_internal(&state.config, data.as_ref(), filename.as_deref()).await)
}

pub async fn write_debug_file_internal(
    config: &ShellConfig,
    data: Option<&Value>,
    filename: Option<&str>,
) -> DebugWriteResult {
    let filename = filename.unwrap_or(&config.debug_filename);
    let Some(data) = data else {
        log::warn!("Debug write to '{filename}' skipped: no data provided");
        return DebugWriteResult::failed("No debug data provided");
    };
    match write_pretty_json(config, data, filename).await {
        Ok(path) => {
            log::debug!("Wrote debug file {path}");
            DebugWriteResult::written(path)
        }
        Err(e) => {
            log::warn!("Debug write to '{filename}' failed: {e}");
            DebugWriteResult::failed(e)
        }
    }
}

async fn write_pretty_json(config: &ShellConfig, data: &Value, filename: &str) -> Result<String, String> {
    if !is_plain_filename(filename) {
        return Err(format!("Invalid debug filename '{filename}': must be a plain file name"));
    }

    let dir = config.output_path();
    fs::create_dir_all(&dir)
        .await
        .map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;

    let path = dir.join(filename);
    let raw = serde_json::to_string_pretty(data)
        .map_err(|e| format!("Failed to serialize debug data: {e}"))?;
    fs::write(&path, raw)
        .await
        .map_err(|e| format!("Failed to write {}: {e}", path.display()))?;

    Ok(path.to_string_lossy().to_string())
}
