use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::ListItem,
    Frame,
};

use safeguard_core::utils::truncate;

use crate::app::App;
use crate::ui::styles::Theme;

use super::{counted_title, list_block, render_rows};

pub fn render(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let description_width = area.width.saturating_sub(36) as usize;
    let items: Vec<ListItem> = app
        .sensors
        .items
        .iter()
        .map(|sensor| {
            ListItem::new(Line::from(vec![
                Span::styled(format!(" #{:<5}", sensor.id), theme.muted_style()),
                Span::styled(
                    format!("{:<18}", truncate(sensor.kind_display(), 17)),
                    theme.list_item_style(),
                ),
                Span::styled(
                    format!("{:<8}", truncate(sensor.unit_display(), 7)),
                    theme.highlight_style(),
                ),
                Span::raw(truncate(sensor.description_display(), description_width)),
            ]))
        })
        .collect();

    let block = list_block(theme, counted_title("Sensors", &app.sensors, app.sensors.items.len()));
    render_rows(frame, theme, area, block, &app.sensors, items, "No sensors registered");
}
