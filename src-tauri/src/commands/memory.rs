use crate::config::ShellConfig;
use crate::models::memory::{MemoryCounters, MemorySnapshot};
use crate::state::ShellState;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use sysinfo::System;
use tauri::State;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::task;

pub trait MemorySampler: Send + Sync {
    fn sample(&self) -> Result<MemoryCounters, String>;
}

// No managed heap: heap_used/heap_total are host resident/virtual memory,
// external is helper resident memory, rss is host plus helpers.
#[derive(Debug, Default)]
pub struct SysinfoSampler;

impl MemorySampler for SysinfoSampler {
    fn sample(&self) -> Result<MemoryCounters, String> {
        let pid = sysinfo::get_current_pid()
            .map_err(|e| format!("Failed to resolve current process id: {e}"))?;

        let mut system = System::new();
        system.refresh_processes();

        let host = system
            .process(pid)
            .ok_or_else(|| format!("Process {pid} not found in process table"))?;

        let rows: Vec<ProcessRow> = system
            .processes()
            .iter()
            .map(|(p, process)| ProcessRow {
                pid: p.as_u32(),
                parent: process.parent().map(|parent| parent.as_u32()),
                resident: process.memory(),
                tasks: process
                    .tasks()
                    .map(|tasks| tasks.iter().map(|t| t.as_u32()).collect())
                    .unwrap_or_default(),
            })
            .collect();

        let external = helper_resident_bytes(&rows, pid.as_u32());

        Ok(MemoryCounters {
            heap_used: host.memory(),
            heap_total: host.virtual_memory(),
            external,
            rss: host.memory().saturating_add(external),
        })
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ProcessRow {
    pub pid: u32,
    pub parent: Option<u32>,
    pub resident: u64,
    pub tasks: Vec<u32>,
}

// Linux lists threads as child rows carrying the owner's memory; drop them.
pub(crate) fn helper_resident_bytes(rows: &[ProcessRow], host: u32) -> u64 {
    let threads: HashSet<u32> = rows
        .iter()
        .flat_map(|row| row.tasks.iter().copied().filter(move |t| *t != row.pid))
        .collect();

    let processes: HashMap<u32, &ProcessRow> = rows
        .iter()
        .filter(|row| !threads.contains(&row.pid))
        .map(|row| (row.pid, row))
        .collect();

    let parents: Vec<(u32, Option<u32>)> = processes
        .values()
        .map(|row| (row.pid, row.parent))
        .collect();

    descendant_pids(&parents, host)
        .into_iter()
        .filter_map(|pid| processes.get(&pid))
        .map(|row| row.resident)
        .fold(0u64, u64::saturating_add)
}

#[tauri::command]
pub async fn get_memory_info(state: State<'_, ShellState>) -> Result<MemorySnapshot, String> {
    get_memory_info_internal(&state.config, Arc::clone(&state.sampler)).await
}

pub async fn get_memory_info_internal(
    config: &ShellConfig,
    sampler: Arc<dyn MemorySampler>,
) -> Result<MemorySnapshot, String> {
    let counters = task::spawn_blocking(move || sampler.sample())
        .await
        .map_err(|e| format!("Memory sampling task failed: {e}"))??;

    let snapshot = MemorySnapshot::from_counters(counters, Utc::now());

    let log_path = config.memory_log_path();
    if let Err(e) = append_memory_log(&log_path, &snapshot).await {
        log::error!("Failed to write memory log: {e}");
    }

    Ok(snapshot)
}

async fn append_memory_log(path: &Path, snapshot: &MemorySnapshot) -> Result<(), String> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .await
            .map_err(|e| format!("Failed to create {}: {e}", dir.display()))?;
    }

    let mut line = serde_json::to_string(snapshot)
        .map_err(|e| format!("Failed to serialize memory snapshot: {e}"))?;
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(|e| format!("Failed to open {}: {e}", path.display()))?;
    file.write_all(line.as_bytes())
        .await
        .map_err(|e| format!("Failed to append to {}: {e}", path.display()))?;
    file.flush()
        .await
        .map_err(|e| format!("Failed to flush {}: {e}", path.display()))
}

pub(crate) fn descendant_pids(table: &[(u32, Option<u32>)], root: u32) -> Vec<u32> {
    let mut children: HashMap<u32, Vec<u32>> = HashMap::new();
    for (pid, parent) in table {
        if let Some(parent) = parent {
            if pid != parent {
                children.entry(*parent).or_default().push(*pid);
            }
        }
    }

    let mut seen = HashSet::new();
    let mut stack = vec![root];
    let mut out = Vec::new();
    while let Some(current) = stack.pop() {
        for child in children.get(&current).into_iter().flatten() {
            if *child != root && seen.insert(*child) {
                out.push(*child);
                stack.push(*child);
            }
        }
    }
    out.sort_unstable();
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collects_transitive_children_only() {
        let table = vec![
            (1, None),
            (10, Some(1)),
            (11, Some(10)),
            (12, Some(11)),
            (20, Some(10)),
            (30, Some(1)),
            (40, Some(99)),
        ];

        assert_eq!(descendant_pids(&table, 10), vec![11, 12, 20]);
        assert_eq!(descendant_pids(&table, 12), Vec::<u32>::new());
    }

    #[test]
    fn tolerates_cycles_in_parent_table() {
        let table = vec![(10, Some(11)), (11, Some(10)), (12, Some(12))];
        assert_eq!(descendant_pids(&table, 10), vec![11]);
    }

    const MB: u64 = 1024 * 1024;

    fn threads_of(owner: u32, first: u32, count: u32, resident: u64) -> Vec<ProcessRow> {
        (first..first + count)
            .map(|tid| ProcessRow {
                pid: tid,
                parent: Some(owner),
                resident,
                tasks: Vec::new(),
            })
            .collect()
    }

    #[test]
    fn multi_threaded_helper_is_counted_once() {
        let mut rows = vec![
            ProcessRow {
                pid: 100,
                parent: Some(1),
                resident: 80 * MB,
                tasks: vec![100, 101, 102],
            },
            ProcessRow {
                pid: 200,
                parent: Some(100),
                resident: 200 * MB,
                tasks: (200..221).collect(),
            },
            ProcessRow {
                pid: 300,
                parent: Some(200),
                resident: 10 * MB,
                tasks: vec![300],
            },
            ProcessRow {
                pid: 400,
                parent: Some(1),
                resident: 999 * MB,
                tasks: Vec::new(),
            },
        ];
        rows.extend(threads_of(100, 101, 2, 80 * MB));
        rows.extend(threads_of(200, 201, 20, 200 * MB));

        assert_eq!(helper_resident_bytes(&rows, 100), 210 * MB);
    }

    #[test]
    fn host_without_helpers_has_no_external_memory() {
        let mut rows = vec![ProcessRow {
            pid: 100,
            parent: Some(1),
            resident: 80 * MB,
            tasks: vec![100, 101],
        }];
        rows.extend(threads_of(100, 101, 1, 80 * MB));

        assert_eq!(helper_resident_bytes(&rows, 100), 0);
    }

    #[test]
    fn sysinfo_sampler_sees_the_current_process() {
        let counters = SysinfoSampler.sample().expect("sample current process");
        assert!(counters.heap_used > 0);
        assert!(counters.rss >= counters.heap_used);
    }
}
