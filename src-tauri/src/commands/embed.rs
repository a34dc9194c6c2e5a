use crate::models::popup::{ActionResult, ViewBounds};
use crate::shell::embed::{build_context_menu, context_menu_entries, embedded_label, EmbedHost};
use tauri::{Url, Webview, Window};

#[tauri::command]
pub async fn show_context_menu(
    webview: Webview,
    selection_text: String,
    is_editable: bool,
) -> Result<ActionResult, String> {
    let entries = context_menu_entries(&selection_text, is_editable);
    if entries.is_empty() {
        return Ok(ActionResult::ok());
    }

    let window = webview.window();
    let menu = build_context_menu(&window, &entries)
        .map_err(|e| format!("Unable to build context menu: {e}"))?;
    window
        .popup_menu(&menu)
        .map_err(|e| format!("Unable to show context menu: {e}"))?;
    Ok(ActionResult::ok())
}

#[tauri::command]
pub async fn attach_embedded_view(
    window: Window,
    label: String,
    url: String,
    bounds: ViewBounds,
) -> Result<ActionResult, String> {
    attach_embedded_view_internal(&window, &label, &url, bounds)
}

pub fn attach_embedded_view_internal<H: EmbedHost + ?Sized>(
    host: &H,
    label: &str,
    url: &str,
    bounds: ViewBounds,
) -> Result<ActionResult, String> {
    let label = embedded_label(label)?;
    let url = Url::parse(url).map_err(|e| format!("Invalid embedded view URL '{url}': {e}"))?;

    if host.has_view(&label) {
        log::debug!("Embedded view {label} already attached");
        return Ok(ActionResult::ok());
    }

    host.attach_view(&label, url, bounds)?;
    log::info!("Webview created: {label}");
    Ok(ActionResult::ok())
}
