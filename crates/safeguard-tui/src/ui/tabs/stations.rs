use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::ListItem,
    Frame,
};

use safeguard_core::utils::{format_coordinates, truncate};

use crate::app::App;
use crate::ui::styles::Theme;

use super::{counted_title, list_block, render_rows};

pub fn render(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let items: Vec<ListItem> = app
        .stations
        .items
        .iter()
        .map(|station| {
            let coordinates = station
                .coordinates()
                .map(|(lat, lon)| format_coordinates(lat, lon))
                .unwrap_or_default();
            ListItem::new(Line::from(vec![
                Span::styled(format!(" #{:<5}", station.id), theme.muted_style()),
                Span::styled(
                    format!("{:<24}", truncate(station.name_display(), 23)),
                    theme.list_item_style(),
                ),
                Span::raw(format!("{:<24}", truncate(station.location_display(), 23))),
                Span::styled(
                    format!("{:<18}", truncate(station.city_display(), 17)),
                    theme.highlight_style(),
                ),
                Span::styled(coordinates, theme.muted_style()),
            ]))
        })
        .collect();

    let block = list_block(theme, counted_title("Stations", &app.stations, app.stations.items.len()));
    render_rows(frame, theme, area, block, &app.stations, items, "No stations registered");
}
