use crate::config::ShellConfig;
use crate::models::popup::{ActionResult, PopupRequest};
use crate::shell::window::WindowHost;
use crate::state::ShellState;
use tauri::{AppHandle, State, Url};
use uuid::Uuid;

#[tauri::command]
pub async fn open_popup_window(
    app: AppHandle,
    state: State<'_, ShellState>,
    url: String,
    title: Option<String>,
) -> Result<ActionResult, String> {
    open_popup_window_internal(&app, &state.config, PopupRequest { url, title })
}

#[tauri::command]
pub async fn open_external(app: AppHandle, url: String) -> Result<ActionResult, String> {
    open_external_internal(&app, &url)
}

pub fn open_popup_window_internal<H: WindowHost + ?Sized>(
    host: &H,
    config: &ShellConfig,
    request: PopupRequest,
) -> Result<ActionResult, String> {
    let title = request
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(&config.popup.default_title);
    log::info!("Opening popup window: {title} - {}", request.url);

    let url = Url::parse(&request.url)
        .map_err(|e| format!("Invalid popup URL '{}': {e}", request.url))?;
    let label = format!("popup-{}", Uuid::new_v4().simple());

    host.open_popup(&label, url, title, &config.popup_size())?;
    Ok(ActionResult::ok())
}

pub fn open_external_internal<H: WindowHost + ?Sized>(host: &H, url: &str) -> Result<ActionResult, String> {
    log::info!("Opening URL in system browser: {url}");
    host.open_external(url)?;
    Ok(ActionResult::ok())
}
