//! Turning a snapshot and its diff into displayable rows.
//!
//! Every output style consumes the same [`MetricRow`] model, so the choice of
//! style never changes what is highlighted.

pub mod text;

use color_eyre::Result;

use crate::diff::{SnapshotDiff, diff};
use crate::format::{format_bytes, format_percent};
use crate::system::snapshot::Snapshot;

pub use text::TextRenderer;

/// A display strategy for one tick of the monitor loop.
pub trait Renderer {
    fn render(&mut self, current: &Snapshot, previous: Option<&Snapshot>) -> Result<()>;

    /// Updates interactive state drawn on top of the metrics.
    fn set_overlay(&mut self, _overlay: &Overlay) {}

    /// Repaints the last rendered frame without new data.
    fn redraw(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Interactive state shown by styles that own the whole screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overlay {
    pub paused: bool,
    /// Theme name; empty keeps whatever the renderer already uses.
    pub theme: &'static str,
    pub help: Option<Vec<(String, &'static str)>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderStyle {
    Plain,
    #[default]
    Ansi,
    Table,
}

impl RenderStyle {
    pub fn from_config_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "plain" | "text" => RenderStyle::Plain,
            "table" | "tui" => RenderStyle::Table,
            _ => RenderStyle::Ansi,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RenderStyle::Plain => "plain",
            RenderStyle::Ansi => "ansi",
            RenderStyle::Table => "table",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    Cpu,
    Memory,
    Disk,
    Network,
    Uptime,
    Gpu,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    /// Empty when the row has a single unnamed value.
    pub name: &'static str,
    pub value: String,
    pub changed: bool,
}

impl Cell {
    fn new(name: &'static str, value: String, changed: bool) -> Self {
        Cell {
            name,
            value,
            changed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricRow {
    pub kind: MetricKind,
    pub label: String,
    pub cells: Vec<Cell>,
    /// Human-readable context shown only by the table style.
    pub detail: Option<String>,
}

impl MetricRow {
    pub fn is_changed(&self) -> bool {
        self.cells.iter().any(|c| c.changed)
    }

    /// Splits the row into text segments, each carrying its own highlight.
    ///
    /// Single-cell rows read `Label Name: value`; multi-cell rows read
    /// `Label - Name: value, Name: value`.
    pub fn segments(&self) -> Vec<(String, bool)> {
        match self.cells.as_slice() {
            [cell] => {
                let text = if cell.name.is_empty() {
                    format!("{}: {}", self.label, cell.value)
                } else {
                    format!("{} {}: {}", self.label, cell.name, cell.value)
                };
                vec![(text, cell.changed)]
            }
            cells => cells
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let text = if i == 0 {
                        format!("{} - {}: {}", self.label, cell.name, cell.value)
                    } else {
                        format!("{}: {}", cell.name, cell.value)
                    };
                    (text, cell.changed)
                })
                .collect(),
        }
    }
}

/// Everything a style needs for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetricFrame {
    pub rows: Vec<MetricRow>,
    pub changed: usize,
}

impl MetricFrame {
    pub fn build(current: &Snapshot, previous: Option<&Snapshot>) -> Self {
        let diff = diff(current, previous);
        MetricFrame {
            rows: metric_rows(current, &diff),
            changed: diff.changed_count(),
        }
    }
}

/// Rows in display order: CPU cores, memory, disks, network, uptime, GPUs.
pub fn metric_rows(current: &Snapshot, diff: &SnapshotDiff) -> Vec<MetricRow> {
    let mut rows = Vec::with_capacity(
        current.cpu_usage.len()
            + current.disks.len()
            + current.network.len()
            + current.gpus.len()
            + 2,
    );

    for (i, &pct) in current.cpu_usage.iter().enumerate() {
        rows.push(MetricRow {
            kind: MetricKind::Cpu,
            label: format!("CPU Core {i}"),
            cells: vec![Cell::new(
                "Usage",
                format_percent(pct),
                diff.cpu.get(i).copied().unwrap_or(true),
            )],
            detail: None,
        });
    }

    rows.push(MetricRow {
        kind: MetricKind::Memory,
        label: "Memory".to_string(),
        cells: vec![Cell::new(
            "Usage",
            format_percent(current.memory.used_percent),
            diff.memory,
        )],
        detail: Some(format!(
            "{} / {}",
            format_bytes(current.memory.used_bytes),
            format_bytes(current.memory.total_bytes)
        )),
    });

    for (mount, usage) in &current.disks {
        rows.push(MetricRow {
            kind: MetricKind::Disk,
            label: format!("Disk ({mount})"),
            cells: vec![Cell::new(
                "Usage",
                format_percent(usage.used_percent),
                diff.disks.get(mount).copied().unwrap_or(true),
            )],
            detail: Some(format!(
                "{} / {}",
                format_bytes(usage.used_bytes),
                format_bytes(usage.total_bytes)
            )),
        });
    }

    for (iface, io) in &current.network {
        let change = diff.network.get(iface).copied().unwrap_or_default();
        rows.push(MetricRow {
            kind: MetricKind::Network,
            label: format!("Net IO ({iface})"),
            cells: vec![
                Cell::new("Bytes Sent", io.bytes_sent.to_string(), change.sent),
                Cell::new(
                    "Bytes Received",
                    io.bytes_received.to_string(),
                    change.received,
                ),
            ],
            detail: Some(format!(
                "tx {} / rx {}",
                format_bytes(io.bytes_sent),
                format_bytes(io.bytes_received)
            )),
        });
    }

    rows.push(MetricRow {
        kind: MetricKind::Uptime,
        label: "System Uptime".to_string(),
        cells: vec![Cell::new(
            "",
            format!("{} seconds", current.uptime_seconds),
            diff.uptime,
        )],
        detail: None,
    });

    for (i, gpu) in current.gpus.iter().enumerate() {
        let change = diff.gpus.get(i).copied().unwrap_or_default();
        rows.push(MetricRow {
            kind: MetricKind::Gpu,
            label: format!("GPU {}", gpu.name),
            cells: vec![
                Cell::new(
                    "Utilization",
                    format!("{}%", gpu.utilization_percent),
                    change.utilization,
                ),
                Cell::new(
                    "Memory Usage",
                    format!("{} bytes", gpu.memory_used_bytes),
                    change.memory,
                ),
            ],
            detail: Some(format_bytes(gpu.memory_used_bytes)),
        });
    }

    rows
}
