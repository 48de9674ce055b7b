use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::ui::theme::Theme;

/// Key hints for the bottom row; the labels come from the resolved keybinds.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyHints {
    pub quit: String,
    pub pause: String,
    pub refresh: String,
    pub theme: String,
    pub help: String,
}

pub fn render(frame: &mut Frame, area: Rect, hints: &KeyHints, paused: bool, theme: &Theme) {
    let bg_style = Style::default().bg(theme.statusbar_bg);

    let mut spans = Vec::new();
    if paused {
        spans.push(Span::styled(
            " PAUSED ",
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.status_paused)
                .add_modifier(Modifier::BOLD),
        ));
    }
    spans.extend(pill_spans(&hints.quit, "Quit", theme));
    spans.extend(pill_spans(
        &hints.pause,
        if paused { "Resume" } else { "Pause" },
        theme,
    ));
    spans.extend(pill_spans(&hints.refresh, "Refresh", theme));
    spans.extend(pill_spans(&hints.theme, "Theme", theme));
    spans.extend(pill_spans(&hints.help, "Help", theme));

    frame.render_widget(Paragraph::new(Line::from(spans)).style(bg_style), area);
}

fn pill_spans<'a>(key: &'a str, desc: &'a str, theme: &Theme) -> Vec<Span<'a>> {
    vec![
        Span::raw(" "),
        Span::styled(
            format!(" {key} "),
            Style::default()
                .fg(theme.pill_key_fg)
                .bg(theme.pill_key_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {desc}"),
            Style::default().fg(theme.pill_desc_fg).bg(theme.surface_bg),
        ),
    ]
}
