use std::collections::BTreeMap;

use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::buffer::Buffer;
use ratatui::style::Color;

use crate::render::{MetricFrame, Overlay};
use crate::system::snapshot::{DiskUsage, GpuStatus, MemoryUsage, NetworkIo, Snapshot};
use crate::ui::statusbar::KeyHints;
use crate::ui::theme::Theme;
use crate::ui::{TableView, draw};

fn sample(core1: f64, uptime: u64) -> Snapshot {
    Snapshot {
        cpu_usage: vec![10.0, core1],
        memory: MemoryUsage::from_bytes(8 * 1024 * 1024 * 1024, 2 * 1024 * 1024 * 1024),
        disks: BTreeMap::from([("/".to_string(), DiskUsage::from_bytes(1000, 400))]),
        network: BTreeMap::from([(
            "eth0".to_string(),
            NetworkIo {
                bytes_sent: 100,
                bytes_received: 200,
            },
        )]),
        uptime_seconds: uptime,
        gpus: vec![GpuStatus {
            name: "Tesla T4".to_string(),
            utilization_percent: 7,
            memory_used_bytes: 4096,
        }],
    }
}

fn hints() -> KeyHints {
    KeyHints {
        quit: "q".to_string(),
        pause: "p".to_string(),
        refresh: "r".to_string(),
        theme: "t".to_string(),
        help: "?".to_string(),
    }
}

fn view(current: &Snapshot, previous: Option<&Snapshot>) -> TableView {
    TableView {
        frame: MetricFrame::build(current, previous),
        tick: 3,
        interval_ms: 500,
        gpu_backend: "nvidia-smi",
    }
}

fn render_buffer(view: &TableView, overlay: &Overlay, theme: &Theme) -> Buffer {
    let backend = TestBackend::new(120, 20);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| draw(frame, view, overlay, &hints(), theme))
        .unwrap();
    terminal.backend().buffer().clone()
}

fn row_symbols(buf: &Buffer, y: u16) -> Vec<String> {
    (0..buf.area.width)
        .map(|x| buf.cell((x, y)).unwrap().symbol().to_string())
        .collect()
}

fn row_text(buf: &Buffer, y: u16) -> String {
    row_symbols(buf, y).concat()
}

fn buffer_text(buf: &Buffer) -> String {
    (0..buf.area.height)
        .map(|y| row_text(buf, y))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Position of the first cell of `needle` on the first row containing `row_marker`.
fn locate(buf: &Buffer, row_marker: &str, needle: &str) -> (u16, u16) {
    for y in 0..buf.area.height {
        let symbols = row_symbols(buf, y);
        if !symbols.concat().contains(row_marker) {
            continue;
        }
        let chars: Vec<char> = needle.chars().collect();
        for x in 0..symbols.len().saturating_sub(chars.len()) {
            let matches = chars
                .iter()
                .enumerate()
                .all(|(i, c)| symbols[x + i] == c.to_string());
            if matches {
                return (x as u16, y);
            }
        }
    }
    panic!("`{needle}` not found on a row containing `{row_marker}`");
}

#[test]
fn table_lists_every_metric() {
    let prev = sample(20.0, 1000);
    let cur = sample(25.0, 1001);
    let buf = render_buffer(&view(&cur, Some(&prev)), &Overlay::default(), &Theme::dark());
    let text = buffer_text(&buf);

    for expected in [
        "CPU Core 0",
        "CPU Core 1",
        "25.00%",
        "Memory",
        "2.0 GB / 8.0 GB",
        "Disk (/)",
        "Net IO (eth0)",
        "Bytes Sent: 100",
        "System Uptime",
        "1001 seconds",
        "GPU Tesla T4",
        "Utilization: 7%",
        "Memory Usage: 4096 bytes",
    ] {
        assert!(text.contains(expected), "missing `{expected}`:\n{text}");
    }
}

#[test]
fn changed_values_use_highlight_colors() {
    let prev = sample(20.0, 1000);
    let cur = sample(25.0, 1000);
    let theme = Theme::dark();
    let buf = render_buffer(&view(&cur, Some(&prev)), &Overlay::default(), &theme);

    let (x, y) = locate(&buf, "CPU Core 1", "25.00%");
    let cell = buf.cell((x, y)).unwrap();
    assert_eq!(cell.bg, theme.changed_bg);
    assert_eq!(cell.fg, theme.changed_fg);

    let (x, y) = locate(&buf, "CPU Core 0", "10.00%");
    assert_ne!(buf.cell((x, y)).unwrap().bg, theme.changed_bg);

    let (x, y) = locate(&buf, "System Uptime", "1000 seconds");
    assert_ne!(buf.cell((x, y)).unwrap().bg, theme.changed_bg);
}

#[test]
fn mono_theme_inverts_changed_values() {
    let cur = sample(25.0, 1000);
    let theme = Theme::mono();
    let buf = render_buffer(&view(&cur, None), &Overlay::default(), &theme);

    let (x, y) = locate(&buf, "CPU Core 0", "10.00%");
    let cell = buf.cell((x, y)).unwrap();
    assert_eq!((cell.fg, cell.bg), (Color::Black, Color::White));
}

#[test]
fn header_summarises_tick() {
    let prev = sample(20.0, 1000);
    let cur = sample(25.0, 1001);
    let buf = render_buffer(&view(&cur, Some(&prev)), &Overlay::default(), &Theme::dark());
    let header = row_text(&buf, 1);

    assert!(header.contains("hwdelta"));
    assert!(header.contains("Tick 3"));
    assert!(header.contains("2 changed"));
    assert!(header.contains("every 500 ms"));
    assert!(header.contains("GPU: nvidia-smi"));
}

#[test]
fn statusbar_shows_paused_pill() {
    let cur = sample(25.0, 1000);
    let overlay = Overlay {
        paused: true,
        ..Overlay::default()
    };
    let buf = render_buffer(&view(&cur, Some(&cur)), &overlay, &Theme::dark());
    let status = row_text(&buf, 19);

    assert!(status.contains("PAUSED"));
    assert!(status.contains("Resume"));

    let buf = render_buffer(&view(&cur, Some(&cur)), &Overlay::default(), &Theme::dark());
    let status = row_text(&buf, 19);
    assert!(!status.contains("PAUSED"));
    assert!(status.contains("Pause"));
}

#[test]
fn help_overlay_lists_keys() {
    let cur = sample(25.0, 1000);
    let overlay = Overlay {
        help: Some(vec![
            ("q".to_string(), "Quit"),
            ("p".to_string(), "Pause / resume"),
        ]),
        ..Overlay::default()
    };
    let theme = Theme::dark();
    let buf = render_buffer(&view(&cur, Some(&cur)), &overlay, &theme);
    let text = buffer_text(&buf);

    assert!(text.contains(" Help "));
    assert!(text.contains("Esc closes"));

    // Sized to the longest entry: 20 columns by 4 rows, centred in 120x20.
    let (x, y) = locate(&buf, "Pause / resume", "Pause / resume");
    assert_eq!((x, y), (55, 10));
    let pill = buf.cell((52, y)).unwrap();
    assert_eq!(pill.symbol(), "p");
    assert_eq!(pill.bg, theme.pill_key_bg);
    assert_eq!(buf.cell((50, 8)).unwrap().symbol(), "┌");
    assert_eq!(buf.cell((69, 11)).unwrap().symbol(), "┘");
}
