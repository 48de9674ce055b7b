use std::collections::BTreeMap;

/// One complete capture of every hardware metric at a point in time.
///
/// Snapshots are never mutated after construction; the monitor loop replaces
/// the previous one wholesale.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Snapshot {
    /// Utilization percent per logical core, index = core id.
    pub cpu_usage: Vec<f64>,
    pub memory: MemoryUsage,
    /// Keyed by mount point.
    pub disks: BTreeMap<String, DiskUsage>,
    /// Keyed by interface name.
    pub network: BTreeMap<String, NetworkIo>,
    pub uptime_seconds: u64,
    /// Index = device enumeration order.
    pub gpus: Vec<GpuStatus>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MemoryUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub used_percent: f64,
}

impl MemoryUsage {
    pub fn from_bytes(total_bytes: u64, used_bytes: u64) -> Self {
        Self {
            total_bytes,
            used_bytes,
            used_percent: percent_of(used_bytes, total_bytes),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DiskUsage {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub used_percent: f64,
}

impl DiskUsage {
    pub fn from_bytes(total_bytes: u64, used_bytes: u64) -> Self {
        Self {
            total_bytes,
            used_bytes,
            used_percent: percent_of(used_bytes, total_bytes),
        }
    }
}

/// Cumulative interface counters since boot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NetworkIo {
    pub bytes_sent: u64,
    pub bytes_received: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GpuStatus {
    pub name: String,
    pub utilization_percent: u32,
    pub memory_used_bytes: u64,
}

fn percent_of(part: u64, whole: u64) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}
