use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::Span;
use ratatui::widgets::{Block, BorderType, Borders, Cell as TableCell, Row, Table};

use crate::format::truncate_unicode;
use crate::render::{Cell, MetricRow};
use crate::ui::theme::Theme;

const LABEL_WIDTH: u16 = 28;
const VALUE_WIDTH: u16 = 26;

pub fn render(frame: &mut Frame, area: Rect, rows: &[MetricRow], theme: &Theme) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.overlay_border))
        .title(Span::styled(
            " Hardware Status ",
            Style::default()
                .fg(theme.text_secondary)
                .add_modifier(Modifier::BOLD),
        ));

    let header = Row::new(["Metric", "Value", "", "Detail"]).style(
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
    );

    let body = rows.iter().map(|row| table_row(row, theme));

    let table = Table::new(
        body,
        [
            Constraint::Length(LABEL_WIDTH),
            Constraint::Length(VALUE_WIDTH),
            Constraint::Length(VALUE_WIDTH),
            Constraint::Min(10),
        ],
    )
    .header(header)
    .block(block)
    .column_spacing(1);

    frame.render_widget(table, area);
}

fn table_row<'a>(row: &'a MetricRow, theme: &Theme) -> Row<'a> {
    let label = TableCell::from(truncate_unicode(&row.label, LABEL_WIDTH as usize))
        .style(Style::default().fg(theme.text_primary));

    let mut cells = vec![label];
    match row.cells.as_slice() {
        [only] => {
            cells.push(value_cell(only.value.clone(), only.changed, theme));
            cells.push(TableCell::from(""));
        }
        many => {
            for cell in many.iter().take(2) {
                cells.push(value_cell(named_value(cell), cell.changed, theme));
            }
        }
    }
    cells.push(
        TableCell::from(row.detail.as_deref().unwrap_or(""))
            .style(Style::default().fg(theme.text_secondary)),
    );

    Row::new(cells)
}

fn named_value(cell: &Cell) -> String {
    format!("{}: {}", cell.name, cell.value)
}

fn value_cell<'a>(text: String, changed: bool, theme: &Theme) -> TableCell<'a> {
    let text = truncate_unicode(&text, VALUE_WIDTH as usize);
    if changed {
        TableCell::from(text).style(
            Style::default()
                .fg(theme.changed_fg)
                .bg(theme.changed_bg)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        TableCell::from(text).style(Style::default().fg(theme.text_primary))
    }
}
