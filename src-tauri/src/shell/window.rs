use crate::config::{MainWindowConfig, WindowSize};
use crate::shell::embed::EMBEDDED_LABEL_PREFIX;
use tauri::{AppHandle, Manager, Runtime, Url, Webview, WebviewUrl, WebviewWindow, WebviewWindowBuilder};
use tauri_plugin_opener::OpenerExt;

pub const MAIN_WINDOW_LABEL: &str = "main";
pub const START_PAGE: &str = "index.html";

pub trait WindowHost {
    fn open_popup(&self, label: &str, url: Url, title: &str, size: &WindowSize) -> Result<(), String>;
    fn open_external(&self, url: &str) -> Result<(), String>;
}

impl<R: Runtime> WindowHost for AppHandle<R> {
    fn open_popup(&self, label: &str, url: Url, title: &str, size: &WindowSize) -> Result<(), String> {
        // Popups are left to the user or the page to close.
        WebviewWindowBuilder::new(self, label, WebviewUrl::External(url))
            .title(title)
            .inner_size(size.width, size.height)
            .center()
            .always_on_top(false)
            .focused(true)
            .build()
            .map(|_| ())
            .map_err(|e| format!("Unable to create popup window: {e}"))
    }

    fn open_external(&self, url: &str) -> Result<(), String> {
        self.opener()
            .open_url(url, None::<&str>)
            .map_err(|e| format!("Unable to open '{url}' externally: {e}"))
    }
}

/// Only this window's page loads the bridge script.
pub fn build_main_window<R: Runtime, M: Manager<R>>(
    manager: &M,
    config: &MainWindowConfig,
) -> tauri::Result<WebviewWindow<R>> {
    WebviewWindowBuilder::new(manager, MAIN_WINDOW_LABEL, WebviewUrl::App(START_PAGE.into()))
        .title(&config.title)
        .inner_size(config.width, config.height)
        .center()
        .build()
}

/// The webview View-menu actions apply to: inside the focused window (or
/// `main`), its embedded view if it has one, else its own page.
pub fn view_target<R: Runtime>(app: &AppHandle<R>) -> Option<Webview<R>> {
    let windows = app.windows();
    let focus: Vec<(&str, bool)> = windows
        .iter()
        .map(|(label, window)| (label.as_str(), window.is_focused().unwrap_or(false)))
        .collect();
    let window = windows.get(&focused_window_label(&focus)?)?;

    let webviews = window.webviews();
    let labels: Vec<&str> = webviews.iter().map(|webview| webview.label()).collect();
    let target = view_target_label(window.label(), &labels)?;
    webviews.into_iter().find(|webview| webview.label() == target)
}

pub fn focused_window_label(windows: &[(&str, bool)]) -> Option<String> {
    let mut focused: Vec<&str> = windows
        .iter()
        .filter(|(_, focused)| *focused)
        .map(|(label, _)| *label)
        .collect();
    focused.sort_unstable();
    focused
        .first()
        .or_else(|| windows.iter().map(|(label, _)| label).find(|l| **l == MAIN_WINDOW_LABEL))
        .map(|label| label.to_string())
}

pub fn view_target_label(window_label: &str, webview_labels: &[&str]) -> Option<String> {
    let mut embedded: Vec<&str> = webview_labels
        .iter()
        .copied()
        .filter(|label| label.starts_with(EMBEDDED_LABEL_PREFIX))
        .collect();
    embedded.sort_unstable();
    embedded
        .first()
        .copied()
        .or_else(|| webview_labels.iter().copied().find(|label| *label == window_label))
        .map(str::to_string)
}
