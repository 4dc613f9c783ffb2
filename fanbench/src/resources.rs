use fanbench_core::constants::SNAPSHOT_SETTLE;
use fanbench_core::ResourceSnapshot;
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tracing::warn;

/// Reads process-wide memory and live-task gauges at two points in time so
/// the harness can report a delta.
///
/// Rust has no collector to force ahead of a reading, so only a fixed settle
/// pause is taken before the "before" snapshot; the numbers are best-effort
/// and noisier than on a managed runtime. A reading that cannot be taken
/// degrades to zero rather than failing the run.
pub struct ResourceSampler {
    system: System,
    pid: Option<Pid>,
}

impl ResourceSampler {
    pub fn new() -> Self {
        let pid = match sysinfo::get_current_pid() {
            Ok(pid) => Some(pid),
            Err(err) => {
                warn!("cannot resolve own pid, memory readings disabled: {err}");
                None
            }
        };
        Self {
            system: System::new(),
            pid,
        }
    }

    /// Sleeps the settle window, then takes the "before" snapshot.
    pub async fn settle_and_snapshot(&mut self) -> ResourceSnapshot {
        tokio::time::sleep(SNAPSHOT_SETTLE).await;
        self.snapshot()
    }

    /// Captures (in-use memory, live task count) at call time.
    pub fn snapshot(&mut self) -> ResourceSnapshot {
        ResourceSnapshot {
            heap_used_bytes: self.refresh_memory(),
            live_tasks: alive_tasks(),
        }
    }

    fn refresh_memory(&mut self) -> u64 {
        let Some(pid) = self.pid else { return 0 };
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            false,
            ProcessRefreshKind::nothing().with_memory(),
        );
        self.system
            .process(pid)
            .map(|process| process.memory())
            .unwrap_or_default()
    }
}

impl Default for ResourceSampler {
    fn default() -> Self {
        Self::new()
    }
}

/// Live tokio task count, or 1 when called outside a runtime.
fn alive_tasks() -> usize {
    tokio::runtime::Handle::try_current()
        .map(|handle| handle.metrics().num_alive_tasks())
        .unwrap_or(1)
}
