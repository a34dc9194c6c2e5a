use tauri::menu::{IsMenuItem, Menu, MenuItem, PredefinedMenuItem};
use crate::models::popup::ViewBounds;
use tauri::webview::{NewWindowResponse, WebviewBuilder};
use tauri::{LogicalPosition, LogicalSize, Manager, Runtime, Url, WebviewUrl, Window};

pub const EMBEDDED_LABEL_PREFIX: &str = "embedded-";

/// Reports right-clicks back to the host. Embedded pages get this and nothing
/// else: the bridge script is only ever loaded by the start page.
const CONTEXT_MENU_SCRIPT: &str = r#"
(function () {
  if (window.__shellContextMenu) return;
  window.__shellContextMenu = true;
  window.addEventListener('contextmenu', function (event) {
    var internals = window.__TAURI_INTERNALS__;
    if (!internals || typeof internals.invoke !== 'function') return;
    var target = event.target;
    var editable = !!target && (
      target.isContentEditable ||
      ((target.tagName === 'TEXTAREA' || target.tagName === 'INPUT') && !target.readOnly && !target.disabled)
    );
    event.preventDefault();
    internals.invoke('show_context_menu', {
      selectionText: String(window.getSelection() || ''),
      isEditable: editable
    });
  }, true);
})();
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextEntry {
    Copy,
    Cut { enabled: bool },
    Paste,
    SelectAll,
    Separator,
}

/// Context menu for one right-click. An empty result means no menu is shown.
pub fn context_menu_entries(selection_text: &str, is_editable: bool) -> Vec<ContextEntry> {
    let has_selection = !selection_text.is_empty();
    let mut entries = Vec::new();

    if has_selection {
        entries.push(ContextEntry::Copy);
    }

    if is_editable {
        if !entries.is_empty() {
            entries.push(ContextEntry::Separator);
        }
        entries.push(ContextEntry::Cut {
            enabled: has_selection,
        });
        entries.push(ContextEntry::Paste);
    }

    if has_selection || is_editable {
        entries.push(ContextEntry::Separator);
        entries.push(ContextEntry::SelectAll);
    }

    entries
}

pub fn build_context_menu<R: Runtime, M: Manager<R>>(
    manager: &M,
    entries: &[ContextEntry],
) -> tauri::Result<Menu<R>> {
    let menu = Menu::new(manager)?;
    for entry in entries {
        let item: Box<dyn IsMenuItem<R>> = match entry {
            ContextEntry::Copy => Box::new(PredefinedMenuItem::copy(manager, Some("Copy"))?),
            ContextEntry::Cut { enabled: true } => Box::new(PredefinedMenuItem::cut(manager, Some("Cut"))?),
            // Predefined items cannot be disabled.
            ContextEntry::Cut { enabled: false } => {
                Box::new(MenuItem::with_id(manager, "context-cut", "Cut", false, None::<&str>)?)
            }
            ContextEntry::Paste => Box::new(PredefinedMenuItem::paste(manager, Some("Paste"))?),
            ContextEntry::SelectAll => {
                Box::new(PredefinedMenuItem::select_all(manager, Some("Select All"))?)
            }
            ContextEntry::Separator => Box::new(PredefinedMenuItem::separator(manager)?),
        };
        menu.append(item.as_ref())?;
    }
    Ok(menu)
}

/// Namespaces a caller-chosen label so capability rules can target embedded
/// views. Labels may only use characters the webview registry accepts.
pub fn embedded_label(requested: &str) -> Result<String, String> {
    let name = requested
        .strip_prefix(EMBEDDED_LABEL_PREFIX)
        .unwrap_or(requested);
    if name.is_empty() {
        return Err("Embedded view label must not be empty".to_string());
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '/'))
    {
        return Err(format!("Invalid embedded view label '{requested}'"));
    }
    Ok(format!("{EMBEDDED_LABEL_PREFIX}{name}"))
}

/// Shared policy for embedded views: no bridge, new-window requests allowed
/// so OAuth flows open as top-level windows, right-clicks routed natively.
pub fn embedded_webview_builder<R: Runtime>(label: &str, url: Url) -> WebviewBuilder<R> {
    WebviewBuilder::new(label, WebviewUrl::External(url))
        .auto_resize()
        .initialization_script(CONTEXT_MENU_SCRIPT)
        .on_new_window(|url, _features| {
            log::info!("Embedded view opening: {url}");
            NewWindowResponse::Allow
        })
}

pub trait EmbedHost {
    fn has_view(&self, label: &str) -> bool;
    fn attach_view(&self, label: &str, url: Url, bounds: ViewBounds) -> Result<(), String>;
}

impl<R: Runtime> EmbedHost for Window<R> {
    fn has_view(&self, label: &str) -> bool {
        self.get_webview(label).is_some()
    }

    fn attach_view(&self, label: &str, url: Url, bounds: ViewBounds) -> Result<(), String> {
        self.add_child(
            embedded_webview_builder(label, url),
            LogicalPosition::new(bounds.x, bounds.y),
            LogicalSize::new(bounds.width, bounds.height),
        )
        .map(|_| ())
        .map_err(|e| format!("Unable to attach embedded view '{label}': {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ContextEntry::*;

    #[test]
    fn nothing_selected_and_not_editable_shows_no_menu() {
        assert!(context_menu_entries("", false).is_empty());
    }

    #[test]
    fn editable_without_selection_disables_cut() {
        assert_eq!(
            context_menu_entries("", true),
            vec![Cut { enabled: false }, Paste, Separator, SelectAll]
        );
    }

    #[test]
    fn selection_outside_editable_offers_copy_and_select_all() {
        assert_eq!(
            context_menu_entries("hello", false),
            vec![Copy, Separator, SelectAll]
        );
    }

    #[test]
    fn selection_inside_editable_offers_everything() {
        assert_eq!(
            context_menu_entries("hello", true),
            vec![
                Copy,
                Separator,
                Cut { enabled: true },
                Paste,
                Separator,
                SelectAll
            ]
        );
    }

    #[test]
    fn embedded_labels_are_namespaced_once() {
        assert_eq!(embedded_label("oauth").unwrap(), "embedded-oauth");
        assert_eq!(embedded_label("embedded-oauth").unwrap(), "embedded-oauth");
        assert!(embedded_label("").is_err());
        assert!(embedded_label("embedded-").is_err());
        assert!(embedded_label("has space").is_err());
    }
}
