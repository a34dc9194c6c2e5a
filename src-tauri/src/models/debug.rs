use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DebugWriteResult {
    Written { success: bool, path: String },
    Failed { success: bool, error: String },
}

impl DebugWriteResult {
    pub fn written(path: impl Into<String>) -> Self {
        DebugWriteResult::Written {
            success: true,
            path: path.into(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        DebugWriteResult::Failed {
            success: false,
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, DebugWriteResult::Written { .. })
    }
}
