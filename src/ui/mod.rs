pub mod header;
pub mod help;
pub mod metrics_table;
pub mod statusbar;
pub mod theme;

use color_eyre::Result;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::{DefaultTerminal, Frame};

use crate::render::{MetricFrame, Overlay, Renderer};
use crate::system::snapshot::Snapshot;
use crate::ui::statusbar::KeyHints;
use crate::ui::theme::Theme;

/// What the table style shows besides the metric rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableView {
    pub frame: MetricFrame,
    pub tick: u64,
    pub interval_ms: u64,
    pub gpu_backend: &'static str,
}

pub fn draw(
    frame: &mut Frame,
    view: &TableView,
    overlay: &Overlay,
    hints: &KeyHints,
    theme: &Theme,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(frame.area());

    header::render(frame, chunks[0], view, theme);
    metrics_table::render(frame, chunks[1], &view.frame.rows, theme);
    statusbar::render(frame, chunks[2], hints, overlay.paused, theme);

    // Drawn last so it sits on top.
    if let Some(entries) = &overlay.help {
        help::render(frame, frame.area(), entries, theme);
    }
}

/// Full-screen ratatui style. The terminal must already be in raw mode.
pub struct TableRenderer {
    terminal: DefaultTerminal,
    theme: Theme,
    view: TableView,
    overlay: Overlay,
    hints: KeyHints,
}

impl TableRenderer {
    pub fn new(
        terminal: DefaultTerminal,
        theme: Theme,
        hints: KeyHints,
        interval_ms: u64,
        gpu_backend: &'static str,
    ) -> Self {
        TableRenderer {
            terminal,
            theme,
            view: TableView {
                interval_ms,
                gpu_backend,
                ..TableView::default()
            },
            overlay: Overlay::default(),
            hints,
        }
    }

    fn draw(&mut self) -> Result<()> {
        let Self {
            terminal,
            theme,
            view,
            overlay,
            hints,
        } = self;
        terminal.draw(|frame| draw(frame, view, overlay, hints, theme))?;
        Ok(())
    }
}

impl Renderer for TableRenderer {
    fn render(&mut self, current: &Snapshot, previous: Option<&Snapshot>) -> Result<()> {
        self.view.frame = MetricFrame::build(current, previous);
        self.view.tick += 1;
        self.draw()
    }

    fn set_overlay(&mut self, overlay: &Overlay) {
        if !overlay.theme.is_empty() && overlay.theme != self.theme.name {
            self.theme = Theme::from_config(overlay.theme);
        }
        self.overlay = overlay.clone();
    }

    fn redraw(&mut self) -> Result<()> {
        self.draw()
    }
}

#[cfg(test)]
mod tests;
