use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MemoryCounters {
    pub heap_used: u64,
    pub heap_total: u64,
    pub external: u64,
    pub rss: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySnapshot {
    pub timestamp: String,
    pub heap_used: String,
    pub heap_total: String,
    pub external: String,
    pub rss: String,
}

impl MemorySnapshot {
    pub fn from_counters(counters: MemoryCounters, at: DateTime<Utc>) -> Self {
        MemorySnapshot {
            timestamp: at.to_rfc3339_opts(SecondsFormat::Millis, true),
            heap_used: format_megabytes(counters.heap_used),
            heap_total: format_megabytes(counters.heap_total),
            external: format_megabytes(counters.external),
            rss: format_megabytes(counters.rss),
        }
    }
}

const BYTES_PER_MB: u128 = 1024 * 1024;

// Exact halves round up.
pub fn format_megabytes(bytes: u64) -> String {
    let hundredths = (u128::from(bytes) * 100 + BYTES_PER_MB / 2) / BYTES_PER_MB;
    format!("{}.{:02} MB", hundredths / 100, hundredths % 100)
}
