//! Change detection between consecutive snapshots.
//!
//! Comparison is structural: any bit-level difference counts as a change.
//! Indexed fields (CPU cores, GPUs) are aligned by position, keyed fields
//! (disks, network interfaces) by key. An index or key with no counterpart in
//! the previous snapshot is always reported as changed, so the first tick
//! highlights everything.

use std::collections::BTreeMap;

use crate::system::snapshot::{GpuStatus, NetworkIo, Snapshot};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NetworkChange {
    pub sent: bool,
    pub received: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GpuChange {
    pub utilization: bool,
    pub memory: bool,
}

/// Per-field changed flags, aligned with the current snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnapshotDiff {
    pub cpu: Vec<bool>,
    pub memory: bool,
    pub disks: BTreeMap<String, bool>,
    pub network: BTreeMap<String, NetworkChange>,
    pub uptime: bool,
    pub gpus: Vec<GpuChange>,
}

impl SnapshotDiff {
    /// Number of highlighted values.
    pub fn changed_count(&self) -> usize {
        self.cpu.iter().filter(|&&c| c).count()
            + usize::from(self.memory)
            + self.disks.values().filter(|&&c| c).count()
            + self
                .network
                .values()
                .map(|n| usize::from(n.sent) + usize::from(n.received))
                .sum::<usize>()
            + usize::from(self.uptime)
            + self
                .gpus
                .iter()
                .map(|g| usize::from(g.utilization) + usize::from(g.memory))
                .sum::<usize>()
    }

    pub fn is_unchanged(&self) -> bool {
        self.changed_count() == 0
    }
}

pub fn diff(current: &Snapshot, previous: Option<&Snapshot>) -> SnapshotDiff {
    let Some(prev) = previous else {
        return first_sample(current);
    };

    SnapshotDiff {
        cpu: current
            .cpu_usage
            .iter()
            .enumerate()
            .map(|(i, &pct)| prev.cpu_usage.get(i).is_none_or(|&old| f64_changed(pct, old)))
            .collect(),
        memory: f64_changed(current.memory.used_percent, prev.memory.used_percent),
        disks: current
            .disks
            .iter()
            .map(|(mount, usage)| {
                let changed = prev
                    .disks
                    .get(mount)
                    .is_none_or(|old| f64_changed(usage.used_percent, old.used_percent));
                (mount.clone(), changed)
            })
            .collect(),
        network: current
            .network
            .iter()
            .map(|(iface, io)| (iface.clone(), network_change(io, prev.network.get(iface))))
            .collect(),
        uptime: current.uptime_seconds != prev.uptime_seconds,
        gpus: current
            .gpus
            .iter()
            .enumerate()
            .map(|(i, gpu)| gpu_change(gpu, prev.gpus.get(i)))
            .collect(),
    }
}

fn first_sample(current: &Snapshot) -> SnapshotDiff {
    SnapshotDiff {
        cpu: vec![true; current.cpu_usage.len()],
        memory: true,
        disks: current.disks.keys().map(|k| (k.clone(), true)).collect(),
        network: current
            .network
            .keys()
            .map(|k| (k.clone(), network_change_all()))
            .collect(),
        uptime: true,
        gpus: vec![
            GpuChange {
                utilization: true,
                memory: true,
            };
            current.gpus.len()
        ],
    }
}

fn network_change(current: &NetworkIo, previous: Option<&NetworkIo>) -> NetworkChange {
    match previous {
        Some(old) => NetworkChange {
            sent: current.bytes_sent != old.bytes_sent,
            received: current.bytes_received != old.bytes_received,
        },
        None => network_change_all(),
    }
}

fn network_change_all() -> NetworkChange {
    NetworkChange {
        sent: true,
        received: true,
    }
}

fn gpu_change(current: &GpuStatus, previous: Option<&GpuStatus>) -> GpuChange {
    match previous {
        Some(old) => GpuChange {
            utilization: current.utilization_percent != old.utilization_percent,
            memory: current.memory_used_bytes != old.memory_used_bytes,
        },
        None => GpuChange {
            utilization: true,
            memory: true,
        },
    }
}

fn f64_changed(current: f64, previous: f64) -> bool {
    current.to_bits() != previous.to_bits()
}
