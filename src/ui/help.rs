use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, Borders, Cell, Clear, Row, Table};
use unicode_width::UnicodeWidthStr;

use crate::ui::theme::Theme;

const CLOSE_HINT: &str = " Esc closes ";

/// Keybind reference drawn on top of the metrics table. The box is sized to
/// its longest entry and clipped to `area`.
pub fn render(frame: &mut Frame, area: Rect, entries: &[(String, &str)], theme: &Theme) {
    let key_width = entries.iter().map(|(key, _)| key.width()).max().unwrap_or(0) as u16 + 2;
    let desc_width = entries.iter().map(|(_, desc)| desc.width()).max().unwrap_or(0) as u16;
    // Borders plus one column of spacing between key and description.
    let width = (key_width + desc_width + 3).max(CLOSE_HINT.len() as u16 + 2);
    let height = entries.len() as u16 + 2;
    let overlay = overlay_area(area, width, height);

    let rows = entries.iter().map(|(key, desc)| {
        Row::new([
            Cell::from(format!(" {key} ")).style(
                Style::default()
                    .fg(theme.pill_key_fg)
                    .bg(theme.pill_key_bg)
                    .add_modifier(Modifier::BOLD),
            ),
            Cell::from(*desc).style(Style::default().fg(theme.pill_desc_fg)),
        ])
    });

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.accent))
        .title(Span::styled(
            " Help ",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Span::styled(
            CLOSE_HINT,
            Style::default().fg(theme.text_secondary),
        ))
        .style(Style::default().bg(theme.surface_bg));

    let table = Table::new(rows, [Constraint::Length(key_width), Constraint::Fill(1)])
        .column_spacing(1)
        .block(block);

    frame.render_widget(Clear, overlay);
    frame.render_widget(table, overlay);
}

/// A `width` x `height` box centred in `area`, shrunk to fit when `area` is
/// smaller.
fn overlay_area(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
