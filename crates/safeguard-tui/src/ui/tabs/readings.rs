use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Paragraph},
    Frame,
};

use safeguard_core::utils::{format_date_time, truncate};

use crate::app::App;
use crate::ui::styles::Theme;

use super::{counted_title, list_block, render_rows};

pub fn render(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(65), Constraint::Percentage(35)])
        .split(area);

    let items: Vec<ListItem> = app
        .readings
        .items
        .iter()
        .map(|reading| {
            let taken_at = reading
                .taken_at
                .as_deref()
                .map(format_date_time)
                .unwrap_or_else(|| "-".to_string());
            ListItem::new(Line::from(vec![
                Span::styled(format!(" #{:<6}", reading.id), theme.muted_style()),
                Span::styled(format!("{:>12}  ", reading.value_display()), theme.highlight_style()),
                Span::raw(taken_at),
            ]))
        })
        .collect();
    let block = list_block(theme, counted_title("Readings", &app.readings, app.readings.items.len()));
    render_rows(frame, theme, columns[0], block, &app.readings, items, "No readings recorded");

    render_sensor_reference(frame, app, theme, columns[1]);
}

/// Sensor ids to pick from when recording a reading
fn render_sensor_reference(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let width = area.width.saturating_sub(12) as usize;
    let lines: Vec<Line> = if app.reading_sensors.is_empty() {
        vec![Line::styled(" No sensors available", theme.muted_style())]
    } else {
        app.reading_sensors
            .iter()
            .map(|sensor| {
                Line::from(vec![
                    Span::styled(format!(" #{:<5} ", sensor.id), theme.help_key_style()),
                    Span::raw(truncate(
                        &format!("{} ({})", sensor.kind_display(), sensor.unit_display()),
                        width,
                    )),
                ])
            })
            .collect()
    };

    let block = Block::default()
        .title(" Sensor IDs ")
        .title_style(theme.title_style())
        .borders(Borders::ALL)
        .border_style(theme.border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
