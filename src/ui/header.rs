use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::ui::TableView;
use crate::ui::theme::Theme;

pub fn render(frame: &mut Frame, area: Rect, view: &TableView, theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let secondary = Style::default().fg(theme.text_secondary);
    let changed_style = if view.frame.changed > 0 {
        Style::default()
            .fg(theme.changed_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        secondary
    };

    let line = Line::from(vec![
        Span::styled(
            " hwdelta ",
            Style::default()
                .fg(theme.header_accent_fg)
                .bg(theme.header_accent_bg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled(format!("Tick {}", view.tick), secondary),
        Span::raw("  "),
        Span::styled(format!("{} changed", view.frame.changed), changed_style),
        Span::raw("  "),
        Span::styled(format!("every {} ms", view.interval_ms), secondary),
        Span::raw("  "),
        Span::styled(format!("GPU: {}", view.gpu_backend), secondary),
        Span::raw("  "),
        Span::styled(theme.name, secondary),
    ]);

    frame.render_widget(Paragraph::new(line), inner);
}
