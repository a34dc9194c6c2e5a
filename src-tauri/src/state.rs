use crate::commands::memory::MemorySampler;
use crate::config::ShellConfig;
use crate::shell::menu::ZoomLevel;
use crate::shell::platform::Platform;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct ShellState {
    pub config: ShellConfig,
    pub platform: Platform,
    pub sampler: Arc<dyn MemorySampler>,
    zoom: Mutex<HashMap<String, ZoomLevel>>,
}

impl ShellState {
    pub fn new(config: ShellConfig, platform: Platform, sampler: Arc<dyn MemorySampler>) -> Self {
        ShellState {
            config,
            platform,
            sampler,
            zoom: Mutex::new(HashMap::new()),
        }
    }

    pub fn update_zoom(&self, label: &str, change: impl FnOnce(ZoomLevel) -> ZoomLevel) -> ZoomLevel {
        let mut levels = match self.zoom.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let current = levels.get(label).copied().unwrap_or_default();
        let next = change(current);
        levels.insert(label.to_string(), next);
        next
    }

    pub fn forget_window(&self, label: &str) {
        if let Ok(mut levels) = self.zoom.lock() {
            levels.remove(label);
        }
    }
}
