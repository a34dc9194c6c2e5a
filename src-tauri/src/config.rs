use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "shell-settings.json";
pub const APP_ROOT_ENV: &str = "GROK_DESKTOP_ROOT";

pub const DEFAULT_OUTPUT_DIR: &str = "test-results";
pub const DEFAULT_DEBUG_FILENAME: &str = "grok-debug.json";
pub const DEFAULT_MEMORY_LOG_FILENAME: &str = "memory-log.jsonl";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WindowSize {
    pub width: f64,
    pub height: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MainWindowConfig {
    pub width: f64,
    pub height: f64,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PopupConfig {
    pub width: f64,
    pub height: f64,
    pub default_title: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShellConfig {
    #[serde(skip)]
    pub app_root: PathBuf,
    pub output_dir: String,
    pub debug_filename: String,
    pub memory_log_filename: String,
    pub main_window: MainWindowConfig,
    pub popup: PopupConfig,
}

impl ShellConfig {
    pub fn load(app_root: &Path) -> ShellConfig {
        let raw = match read_settings_value(app_root) {
            Ok(value) => value,
            Err(e) => {
                log::warn!("{e}; using default shell settings");
                json!({})
            }
        };
        Self::from_value(app_root, raw)
    }

    pub fn from_value(app_root: &Path, raw: Value) -> ShellConfig {
        let settings = normalize_settings(raw);
        let mut config: ShellConfig = serde_json::from_value(settings).unwrap_or_else(|e| {
            log::warn!("Shell settings did not match the expected shape ({e}); using defaults");
            Self::defaults_for(app_root)
        });
        config.app_root = app_root.to_path_buf();
        config
    }

    pub fn defaults_for(app_root: &Path) -> ShellConfig {
        ShellConfig {
            app_root: app_root.to_path_buf(),
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            debug_filename: DEFAULT_DEBUG_FILENAME.to_string(),
            memory_log_filename: DEFAULT_MEMORY_LOG_FILENAME.to_string(),
            main_window: MainWindowConfig {
                width: 2400.0,
                height: 1000.0,
                title: "Grok Desktop".to_string(),
            },
            popup: PopupConfig {
                width: 800.0,
                height: 600.0,
                default_title: "Popup".to_string(),
            },
        }
    }

    pub fn output_path(&self) -> PathBuf {
        self.app_root.join(&self.output_dir)
    }

    pub fn memory_log_path(&self) -> PathBuf {
        self.output_path().join(&self.memory_log_filename)
    }

    pub fn popup_size(&self) -> WindowSize {
        WindowSize {
            width: self.popup.width,
            height: self.popup.height,
        }
    }
}

/// `GROK_DESKTOP_ROOT` when set, then `fallback` (the app's local data
/// directory once the runtime is up), then the executable's directory.
pub fn resolve_app_root(fallback: Option<PathBuf>) -> PathBuf {
    resolve_app_root_from(std::env::var_os(APP_ROOT_ENV), fallback)
}

pub fn resolve_app_root_from(override_root: Option<OsString>, fallback: Option<PathBuf>) -> PathBuf {
    if let Some(root) = override_root.filter(|v| !v.is_empty()) {
        return PathBuf::from(root);
    }
    fallback
        .or_else(executable_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn executable_dir() -> Option<PathBuf> {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
}

pub fn is_plain_filename(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(std::path::Component::Normal(_)), None)
    ) && !name.contains(['/', '\\'])
}

fn read_settings_value(app_root: &Path) -> Result<Value, String> {
    let path = app_root.join(SETTINGS_FILE);
    if !path.exists() {
        return Ok(json!({}));
    }
    let raw = fs::read_to_string(&path)
        .map_err(|e| format!("Failed to read {SETTINGS_FILE}: {e}"))?;
    serde_json::from_str::<Value>(&raw).map_err(|e| format!("Failed to parse {SETTINGS_FILE}: {e}"))
}

fn default_settings() -> Value {
    json!({
        "outputDir": DEFAULT_OUTPUT_DIR,
        "debugFilename": DEFAULT_DEBUG_FILENAME,
        "memoryLogFilename": DEFAULT_MEMORY_LOG_FILENAME,
        "mainWindow": {
            "width": 2400.0,
            "height": 1000.0,
            "title": "Grok Desktop"
        },
        "popup": {
            "width": 800.0,
            "height": 600.0,
            "defaultTitle": "Popup"
        }
    })
}

fn normalize_settings(input: Value) -> Value {
    let mut out = match input {
        Value::Object(map) => Value::Object(map),
        _ => Value::Object(Map::new()),
    };
    deep_merge_defaults(&mut out, &default_settings());
    sanitize_settings(&mut out);
    out
}

fn deep_merge_defaults(target: &mut Value, defaults: &Value) {
    let (Some(target_obj), Some(default_obj)) = (target.as_object_mut(), defaults.as_object()) else {
        return;
    };

    for (key, default_value) in default_obj {
        match target_obj.get_mut(key) {
            Some(existing) => {
                if existing.is_object() && default_value.is_object() {
                    deep_merge_defaults(existing, default_value);
                } else if default_value.is_object() {
                    *existing = default_value.clone();
                }
            }
            None => {
                target_obj.insert(key.clone(), default_value.clone());
            }
        }
    }
}

fn sanitize_settings(settings: &mut Value) {
    let Some(obj) = settings.as_object_mut() else {
        return;
    };

    ensure_string(obj, "outputDir", DEFAULT_OUTPUT_DIR);
    ensure_filename(obj, "debugFilename", DEFAULT_DEBUG_FILENAME);
    ensure_filename(obj, "memoryLogFilename", DEFAULT_MEMORY_LOG_FILENAME);

    if let Some(window) = obj.get_mut("mainWindow").and_then(Value::as_object_mut) {
        clamp_f64(window, "width", 400.0, 7680.0, 2400.0);
        clamp_f64(window, "height", 300.0, 4320.0, 1000.0);
        ensure_string(window, "title", "Grok Desktop");
    }

    if let Some(popup) = obj.get_mut("popup").and_then(Value::as_object_mut) {
        clamp_f64(popup, "width", 200.0, 3840.0, 800.0);
        clamp_f64(popup, "height", 200.0, 2160.0, 600.0);
        ensure_string(popup, "defaultTitle", "Popup");
    }
}

fn clamp_f64(map: &mut Map<String, Value>, key: &str, min: f64, max: f64, default: f64) {
    let raw = map.get(key).and_then(Value::as_f64).unwrap_or(default);
    map.insert(key.to_string(), json!(raw.clamp(min, max)));
}

fn ensure_string(map: &mut Map<String, Value>, key: &str, default: &str) {
    let value = map
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or(default)
        .to_string();
    map.insert(key.to_string(), json!(value));
}

fn ensure_filename(map: &mut Map<String, Value>, key: &str, default: &str) {
    let value = map
        .get(key)
        .and_then(Value::as_str)
        .filter(|v| is_plain_filename(v))
        .unwrap_or(default)
        .to_string();
    map.insert(key.to_string(), json!(value));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_settings_resolve_to_defaults() {
        let root = Path::new("/tmp/app");
        let config = ShellConfig::from_value(root, json!({}));
        assert_eq!(config, ShellConfig::defaults_for(root));
        assert_eq!(config.output_path(), root.join("test-results"));
        assert_eq!(
            config.memory_log_path(),
            root.join("test-results").join("memory-log.jsonl")
        );
    }

    #[test]
    fn clamps_sizes_and_keeps_partial_overrides() {
        let config = ShellConfig::from_value(
            Path::new("/tmp/app"),
            json!({
                "mainWindow": { "width": 10, "title": "Custom" },
                "popup": { "height": 99999 }
            }),
        );

        assert_eq!(config.main_window.width, 400.0);
        assert_eq!(config.main_window.height, 1000.0);
        assert_eq!(config.main_window.title, "Custom");
        assert_eq!(config.popup.height, 2160.0);
        assert_eq!(config.popup.default_title, "Popup");
    }

    #[test]
    fn path_like_filenames_fall_back_to_defaults() {
        let config = ShellConfig::from_value(
            Path::new("/tmp/app"),
            json!({
                "debugFilename": "../escape.json",
                "memoryLogFilename": "nested/log.jsonl"
            }),
        );

        assert_eq!(config.debug_filename, DEFAULT_DEBUG_FILENAME);
        assert_eq!(config.memory_log_filename, DEFAULT_MEMORY_LOG_FILENAME);
    }

    #[test]
    fn non_object_settings_are_replaced() {
        let config = ShellConfig::from_value(Path::new("/tmp/app"), json!([1, 2, 3]));
        assert_eq!(config.debug_filename, DEFAULT_DEBUG_FILENAME);

        let config = ShellConfig::from_value(Path::new("/tmp/app"), json!({ "popup": "big" }));
        assert_eq!(config.popup.width, 800.0);
    }

    #[test]
    fn app_root_prefers_override_then_data_dir_then_executable_dir() {
        let data_dir = PathBuf::from("/var/lib/grok-desktop");

        assert_eq!(
            resolve_app_root_from(Some(OsString::from("/srv/grok")), Some(data_dir.clone())),
            PathBuf::from("/srv/grok")
        );
        assert_eq!(
            resolve_app_root_from(Some(OsString::new()), Some(data_dir.clone())),
            data_dir
        );
        assert_eq!(resolve_app_root_from(None, Some(data_dir.clone())), data_dir);

        let exe_dir = std::env::current_exe()
            .expect("current exe")
            .parent()
            .expect("exe parent")
            .to_path_buf();
        let fallback = resolve_app_root_from(None, None);
        assert_eq!(fallback, exe_dir);
        assert!(fallback.is_absolute());
    }

    #[test]
    fn plain_filename_rules() {
        assert!(is_plain_filename("grok-debug.json"));
        assert!(is_plain_filename("run 1.json"));
        assert!(!is_plain_filename(""));
        assert!(!is_plain_filename(".."));
        assert!(!is_plain_filename("."));
        assert!(!is_plain_filename("a/b.json"));
        assert!(!is_plain_filename("a\\b.json"));
        assert!(!is_plain_filename("/etc/passwd"));
    }
}
