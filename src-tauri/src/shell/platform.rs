use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    MacOs,
    Windows,
    Linux,
}

impl Platform {
    pub fn current() -> Platform {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    pub fn is_mac(self) -> bool {
        self == Platform::MacOs
    }

    /// macOS apps stay resident after their last window closes.
    pub fn quits_when_last_window_closes(self) -> bool {
        !self.is_mac()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_mac_stays_resident() {
        assert!(!Platform::MacOs.quits_when_last_window_closes());
        assert!(Platform::Windows.quits_when_last_window_closes());
        assert!(Platform::Linux.quits_when_last_window_closes());
    }
}
