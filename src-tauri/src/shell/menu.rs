use crate::shell::platform::Platform;
use crate::shell::window::view_target;
use crate::state::ShellState;
use tauri::menu::{IsMenuItem, Menu, MenuItem, PredefinedMenuItem, Submenu};
use tauri::{AppHandle, Manager, Runtime, Webview};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuRole {
    About,
    Services,
    Hide,
    HideOthers,
    Unhide,
    Quit,
    Undo,
    Redo,
    Cut,
    Copy,
    Paste,
    PasteAndMatchStyle,
    Delete,
    SelectAll,
    StartSpeaking,
    StopSpeaking,
    Reload,
    ForceReload,
    ToggleDevTools,
    ResetZoom,
    ZoomIn,
    ZoomOut,
    ToggleFullscreen,
    Minimize,
    Zoom,
    Front,
    WindowList,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleBinding {
    Predefined,
    Custom {
        id: &'static str,
        label: &'static str,
        accelerator: &'static str,
    },
    Unsupported,
}

const CUSTOM_ROLES: [MenuRole; 7] = [
    MenuRole::Reload,
    MenuRole::ForceReload,
    MenuRole::ToggleDevTools,
    MenuRole::ResetZoom,
    MenuRole::ZoomIn,
    MenuRole::ZoomOut,
    MenuRole::ToggleFullscreen,
];

impl MenuRole {
    pub fn binding(self) -> RoleBinding {
        use MenuRole::*;
        match self {
            Reload => custom("view-reload", "Reload", "CmdOrCtrl+R"),
            ForceReload => custom("view-force-reload", "Force Reload", "CmdOrCtrl+Shift+R"),
            ToggleDevTools => custom("view-toggle-devtools", "Toggle Developer Tools", "CmdOrCtrl+Alt+I"),
            ResetZoom => custom("view-reset-zoom", "Actual Size", "CmdOrCtrl+0"),
            ZoomIn => custom("view-zoom-in", "Zoom In", "CmdOrCtrl+Plus"),
            ZoomOut => custom("view-zoom-out", "Zoom Out", "CmdOrCtrl+-"),
            ToggleFullscreen => custom("view-toggle-fullscreen", "Toggle Full Screen", "F11"),
            PasteAndMatchStyle | Delete | StartSpeaking | StopSpeaking | Front | WindowList => {
                RoleBinding::Unsupported
            }
            _ => RoleBinding::Predefined,
        }
    }

    pub fn from_custom_id(id: &str) -> Option<MenuRole> {
        CUSTOM_ROLES.into_iter().find(|role| {
            matches!(role.binding(), RoleBinding::Custom { id: custom_id, .. } if custom_id == id)
        })
    }
}

fn custom(id: &'static str, label: &'static str, accelerator: &'static str) -> RoleBinding {
    RoleBinding::Custom { id, label, accelerator }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    Role(MenuRole),
    Separator,
    Submenu { label: String, entries: Vec<MenuEntry> },
}

fn submenu(label: impl Into<String>, entries: Vec<MenuEntry>) -> MenuEntry {
    MenuEntry::Submenu {
        label: label.into(),
        entries,
    }
}

/// The application menu for `platform`, before unsupported roles are removed.
pub fn application_menu(platform: Platform, app_name: &str) -> Vec<MenuEntry> {
    use MenuEntry::{Role, Separator};
    use MenuRole::*;

    let mac = platform.is_mac();
    let mut top = Vec::new();

    if mac {
        top.push(submenu(
            app_name,
            vec![
                Role(About),
                Separator,
                Role(Services),
                Separator,
                Role(Hide),
                Role(HideOthers),
                Role(Unhide),
                Separator,
                Role(Quit),
            ],
        ));
    }

    let mut edit = vec![
        Role(Undo),
        Role(Redo),
        Separator,
        Role(Cut),
        Role(Copy),
        Role(Paste),
        Role(PasteAndMatchStyle),
        Role(Delete),
        Role(SelectAll),
    ];
    if mac {
        edit.push(Separator);
        edit.push(submenu("Speech", vec![Role(StartSpeaking), Role(StopSpeaking)]));
    }
    top.push(submenu("Edit", edit));

    top.push(submenu(
        "View",
        vec![
            Role(Reload),
            Role(ForceReload),
            Role(ToggleDevTools),
            Separator,
            Role(ResetZoom),
            Role(ZoomIn),
            Role(ZoomOut),
            Separator,
            Role(ToggleFullscreen),
        ],
    ));

    let mut window = vec![Role(Minimize), Role(Zoom)];
    if mac {
        window.extend([Separator, Role(Front), Separator, Role(WindowList)]);
    } else {
        window.push(Role(Close));
    }
    top.push(submenu("Window", window));

    top
}

/// Drops unsupported roles, then empty submenus and separators left leading,
/// trailing or doubled by those removals.
pub fn supported_entries(entries: &[MenuEntry]) -> Vec<MenuEntry> {
    let mut out: Vec<MenuEntry> = Vec::new();
    for entry in entries {
        match entry {
            MenuEntry::Role(role) if role.binding() == RoleBinding::Unsupported => {}
            MenuEntry::Separator => {
                if !matches!(out.last(), None | Some(MenuEntry::Separator)) {
                    out.push(MenuEntry::Separator);
                }
            }
            MenuEntry::Submenu { label, entries } => {
                let children = supported_entries(entries);
                if !children.is_empty() {
                    out.push(submenu(label.clone(), children));
                }
            }
            other => out.push(other.clone()),
        }
    }
    while matches!(out.last(), Some(MenuEntry::Separator)) {
        out.pop();
    }
    out
}

pub fn build_application_menu<R: Runtime, M: Manager<R>>(
    manager: &M,
    platform: Platform,
) -> tauri::Result<Menu<R>> {
    let app_name = manager.package_info().name.clone();
    let entries = supported_entries(&application_menu(platform, &app_name));

    let menu = Menu::new(manager)?;
    for entry in &entries {
        if let Some(item) = realize_entry(manager, entry)? {
            menu.append(item.as_ref())?;
        }
    }
    Ok(menu)
}

fn realize_entry<R: Runtime, M: Manager<R>>(
    manager: &M,
    entry: &MenuEntry,
) -> tauri::Result<Option<Box<dyn IsMenuItem<R>>>> {
    let item: Box<dyn IsMenuItem<R>> = match entry {
        MenuEntry::Separator => Box::new(PredefinedMenuItem::separator(manager)?),
        MenuEntry::Submenu { label, entries } => {
            let sub = Submenu::new(manager, label, true)?;
            for child in entries {
                if let Some(item) = realize_entry(manager, child)? {
                    sub.append(item.as_ref())?;
                }
            }
            Box::new(sub)
        }
        MenuEntry::Role(role) => match realize_role(manager, *role)? {
            Some(item) => item,
            None => {
                log::debug!("Skipping menu role {role:?}: no native equivalent");
                return Ok(None);
            }
        },
    };
    Ok(Some(item))
}

fn realize_role<R: Runtime, M: Manager<R>>(
    manager: &M,
    role: MenuRole,
) -> tauri::Result<Option<Box<dyn IsMenuItem<R>>>> {
    if let RoleBinding::Custom { id, label, accelerator } = role.binding() {
        let item = MenuItem::with_id(manager, id, label, true, Some(accelerator))?;
        return Ok(Some(Box::new(item)));
    }

    let item = match role {
        MenuRole::About => PredefinedMenuItem::about(manager, None, None)?,
        MenuRole::Services => PredefinedMenuItem::services(manager, None)?,
        MenuRole::Hide => PredefinedMenuItem::hide(manager, None)?,
        MenuRole::HideOthers => PredefinedMenuItem::hide_others(manager, None)?,
        MenuRole::Unhide => PredefinedMenuItem::show_all(manager, None)?,
        MenuRole::Quit => PredefinedMenuItem::quit(manager, None)?,
        MenuRole::Undo => PredefinedMenuItem::undo(manager, None)?,
        MenuRole::Redo => PredefinedMenuItem::redo(manager, None)?,
        MenuRole::Cut => PredefinedMenuItem::cut(manager, None)?,
        MenuRole::Copy => PredefinedMenuItem::copy(manager, None)?,
        MenuRole::Paste => PredefinedMenuItem::paste(manager, None)?,
        MenuRole::SelectAll => PredefinedMenuItem::select_all(manager, None)?,
        MenuRole::Minimize => PredefinedMenuItem::minimize(manager, None)?,
        MenuRole::Zoom => PredefinedMenuItem::maximize(manager, None)?,
        MenuRole::Close => PredefinedMenuItem::close_window(manager, None)?,
        _ => return Ok(None),
    };
    Ok(Some(Box::new(item)))
}

/// Integer zoom step; each step scales the page by 1.2x.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ZoomLevel(i32);

impl ZoomLevel {
    pub const MIN: i32 = -8;
    pub const MAX: i32 = 9;

    pub fn step(self, delta: i32) -> ZoomLevel {
        ZoomLevel((self.0 + delta).clamp(Self::MIN, Self::MAX))
    }

    pub fn level(self) -> i32 {
        self.0
    }

    pub fn factor(self) -> f64 {
        1.2_f64.powi(self.0)
    }
}

pub fn handle_menu_event<R: Runtime>(app: &AppHandle<R>, id: &str) {
    let Some(role) = MenuRole::from_custom_id(id) else {
        return;
    };
    let Some(webview) = view_target(app) else {
        log::debug!("Menu action {role:?} ignored: no webview to act on");
        return;
    };
    if let Err(e) = apply_view_role(app, &webview, role) {
        log::warn!("Menu action {role:?} failed on '{}': {e}", webview.label());
    }
}

fn apply_view_role<R: Runtime>(app: &AppHandle<R>, webview: &Webview<R>, role: MenuRole) -> tauri::Result<()> {
    let window = webview.window();
    match role {
        MenuRole::Reload => webview.eval("window.location.reload()"),
        MenuRole::ForceReload => {
            app.state::<ShellState>().forget_window(window.label());
            webview.set_zoom(ZoomLevel::default().factor())?;
            webview.eval("window.location.reload()")
        }
        MenuRole::ToggleDevTools => {
            #[cfg(debug_assertions)]
            {
                if webview.is_devtools_open() {
                    webview.close_devtools();
                } else {
                    webview.open_devtools();
                }
            }
            Ok(())
        }
        MenuRole::ResetZoom | MenuRole::ZoomIn | MenuRole::ZoomOut => {
            let state = app.state::<ShellState>();
            let level = state.update_zoom(window.label(), |current| match role {
                MenuRole::ZoomIn => current.step(1),
                MenuRole::ZoomOut => current.step(-1),
                _ => ZoomLevel::default(),
            });
            log::debug!("Zoom level for '{}' is now {}", webview.label(), level.level());
            webview.set_zoom(level.factor())
        }
        MenuRole::ToggleFullscreen => {
            let fullscreen = window.is_fullscreen()?;
            window.set_fullscreen(!fullscreen)
        }
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(entries: &[MenuEntry]) -> Vec<&str> {
        entries
            .iter()
            .filter_map(|entry| match entry {
                MenuEntry::Submenu { label, .. } => Some(label.as_str()),
                _ => None,
            })
            .collect()
    }

    fn submenu_named<'a>(entries: &'a [MenuEntry], name: &str) -> &'a [MenuEntry] {
        entries
            .iter()
            .find_map(|entry| match entry {
                MenuEntry::Submenu { label, entries } if label == name => Some(entries.as_slice()),
                _ => None,
            })
            .unwrap_or_else(|| panic!("missing submenu {name}"))
    }

    fn contains_role(entries: &[MenuEntry], role: MenuRole) -> bool {
        entries.iter().any(|entry| match entry {
            MenuEntry::Role(r) => *r == role,
            MenuEntry::Submenu { entries, .. } => contains_role(entries, role),
            MenuEntry::Separator => false,
        })
    }

    #[test]
    fn mac_menu_has_app_and_speech_submenus() {
        let menu = application_menu(Platform::MacOs, "Grok Desktop");
        assert_eq!(labels(&menu), vec!["Grok Desktop", "Edit", "View", "Window"]);

        let edit = submenu_named(&menu, "Edit");
        assert!(labels(edit).contains(&"Speech"));

        let window = submenu_named(&menu, "Window");
        assert!(contains_role(window, MenuRole::Front));
        assert!(!contains_role(window, MenuRole::Close));
    }

    #[test]
    fn other_platforms_get_close_and_no_app_menu() {
        for platform in [Platform::Windows, Platform::Linux] {
            let menu = application_menu(platform, "Grok Desktop");
            assert_eq!(labels(&menu), vec!["Edit", "View", "Window"]);
            assert!(!contains_role(&menu, MenuRole::StartSpeaking));
            assert!(contains_role(submenu_named(&menu, "Window"), MenuRole::Close));
        }
    }

    #[test]
    fn edit_menu_keeps_clipboard_roles_in_order() {
        let menu = supported_entries(&application_menu(Platform::Linux, "Grok Desktop"));
        let edit = submenu_named(&menu, "Edit");
        assert_eq!(
            edit,
            &[
                MenuEntry::Role(MenuRole::Undo),
                MenuEntry::Role(MenuRole::Redo),
                MenuEntry::Separator,
                MenuEntry::Role(MenuRole::Cut),
                MenuEntry::Role(MenuRole::Copy),
                MenuEntry::Role(MenuRole::Paste),
                MenuEntry::Role(MenuRole::SelectAll),
            ]
        );
    }

    #[test]
    fn unsupported_roles_leave_no_dangling_separators_or_empty_submenus() {
        let menu = supported_entries(&application_menu(Platform::MacOs, "Grok Desktop"));

        let edit = submenu_named(&menu, "Edit");
        assert!(!labels(edit).contains(&"Speech"));
        assert_ne!(edit.last(), Some(&MenuEntry::Separator));

        let window = submenu_named(&menu, "Window");
        assert_eq!(
            window,
            &[MenuEntry::Role(MenuRole::Minimize), MenuEntry::Role(MenuRole::Zoom)]
        );
    }

    #[test]
    fn custom_ids_round_trip_to_roles() {
        for role in CUSTOM_ROLES {
            let RoleBinding::Custom { id, .. } = role.binding() else {
                panic!("{role:?} should be custom");
            };
            assert_eq!(MenuRole::from_custom_id(id), Some(role));
        }
        assert_eq!(MenuRole::from_custom_id("context-cut"), None);
    }

    #[test]
    fn zoom_level_clamps_and_scales() {
        let level = ZoomLevel::default();
        assert_eq!(level.factor(), 1.0);
        assert!((level.step(1).factor() - 1.2).abs() < 1e-9);
        assert_eq!(level.step(100).level(), ZoomLevel::MAX);
        assert_eq!(level.step(-100).level(), ZoomLevel::MIN);
    }
}
