//! Station map and the per-station sensor view.
//!
//! Stations are plotted on a world outline; the canvas zooms to the bounding
//! box of the stations with usable coordinates. Stations without them are
//! listed but not drawn.

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Map, MapResolution},
        Block, Borders, ListItem, Paragraph,
    },
    Frame,
};

use safeguard_core::models::Station;
use safeguard_core::utils::{format_coordinates, truncate};

use crate::app::{App, AppState};
use crate::ui::styles::Theme;

use super::{counted_title, list_block, render_rows};

/// Degrees added around the stations' bounding box
const MAP_MARGIN_DEG: f64 = 2.0;

/// Shown when no station has coordinates (Brazil)
const DEFAULT_BOUNDS: ([f64; 2], [f64; 2]) = ([-75.0, -33.0], [-35.0, 6.0]);

pub fn render(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);

    let typing = app.state == AppState::Filtering;
    let text = &app.station_filter.text;
    let filter_line = if text.is_empty() && !typing {
        Line::from(Span::styled(" Search: (press /)", theme.muted_style()))
    } else {
        Line::from(vec![
            Span::styled(" Search: ", theme.muted_style()),
            Span::styled(
                format!("{}{}", text, if typing { "▌" } else { "" }),
                theme.highlight_style(),
            ),
        ])
    };
    frame.render_widget(Paragraph::new(filter_line), rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(rows[1]);

    let visible = app.visible_map_stations();
    let width = columns[0].width.saturating_sub(6) as usize;
    let items: Vec<ListItem> = visible
        .iter()
        .map(|station| {
            let marker = if station.coordinates().is_some() { "●" } else { "○" };
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {} ", marker), theme.highlight_style()),
                Span::raw(truncate(
                    &format!("{} - {}", station.name_display(), station.city_display()),
                    width,
                )),
            ]))
        })
        .collect();
    let block = list_block(theme, counted_title("Stations", &app.map, visible.len()));
    render_rows(frame, theme, columns[0], block, &app.map, items, "No stations found");

    let selected = visible.get(app.map.selection).map(|s| s.id);
    render_canvas(frame, theme, columns[1], &visible, selected);
}

/// Lon/lat bounds covering every plotted station
fn bounds(stations: &[&Station]) -> ([f64; 2], [f64; 2]) {
    let coords: Vec<(f64, f64)> = stations.iter().filter_map(|s| s.coordinates()).collect();
    if coords.is_empty() {
        return DEFAULT_BOUNDS;
    }
    let (mut min_lat, mut max_lat) = (f64::MAX, f64::MIN);
    let (mut min_lon, mut max_lon) = (f64::MAX, f64::MIN);
    for (lat, lon) in coords {
        min_lat = min_lat.min(lat);
        max_lat = max_lat.max(lat);
        min_lon = min_lon.min(lon);
        max_lon = max_lon.max(lon);
    }
    (
        [
            (min_lon - MAP_MARGIN_DEG).max(-180.0),
            (max_lon + MAP_MARGIN_DEG).min(180.0),
        ],
        [
            (min_lat - MAP_MARGIN_DEG).max(-90.0),
            (max_lat + MAP_MARGIN_DEG).min(90.0),
        ],
    )
}

fn render_canvas(frame: &mut Frame, theme: &Theme, area: Rect, stations: &[&Station], selected: Option<i64>) {
    let (x_bounds, y_bounds) = bounds(stations);
    let outline = theme.palette.muted;
    let marker = theme.highlight_style();
    let selected_marker = theme.error_style();

    let points: Vec<(f64, f64, bool)> = stations
        .iter()
        .filter_map(|s| s.coordinates().map(|(lat, lon)| (lon, lat, Some(s.id) == selected)))
        .collect();

    let canvas = Canvas::default()
        .block(
            Block::default()
                .title(" Map ")
                .title_style(theme.title_style())
                .borders(Borders::ALL)
                .border_style(theme.border_style(false)),
        )
        .background_color(theme.palette.background)
        .x_bounds(x_bounds)
        .y_bounds(y_bounds)
        .paint(move |ctx| {
            ctx.draw(&Map {
                color: outline,
                resolution: MapResolution::High,
            });
            ctx.layer();
            for (x, y, is_selected) in &points {
                let style: Style = if *is_selected { selected_marker } else { marker };
                ctx.print(*x, *y, Span::styled(if *is_selected { "◉" } else { "●" }, style));
            }
        });
    frame.render_widget(canvas, area);
}

pub fn render_station_detail(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let Some(detail) = app.station_detail.as_ref() else {
        return;
    };
    let station = &detail.station;

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(3)])
        .split(area);

    let coordinates = station
        .coordinates()
        .map(|(lat, lon)| format_coordinates(lat, lon))
        .unwrap_or_else(|| "no coordinates".to_string());
    let header = vec![
        Line::from(Span::styled(station.name_display().to_string(), theme.highlight_style())),
        Line::from(format!("{}  {}", station.location_display(), station.city_display())),
        Line::from(Span::styled(coordinates, theme.muted_style())),
    ];
    let block = Block::default()
        .title(format!(" Station #{} ", station.id))
        .title_style(theme.title_style())
        .borders(Borders::ALL)
        .border_style(theme.border_style(false));
    frame.render_widget(Paragraph::new(header).block(block), rows[0]);

    let items: Vec<ListItem> = detail
        .sensors
        .items
        .iter()
        .map(|sensor| {
            ListItem::new(Line::from(vec![
                Span::styled(format!(" #{:<5}", sensor.id), theme.muted_style()),
                Span::styled(format!("{:<16}", sensor.kind_display()), theme.list_item_style()),
                Span::styled(format!("{:<8}", sensor.unit_display()), theme.muted_style()),
                Span::raw(sensor.description_display().to_string()),
            ]))
        })
        .collect();
    let block = list_block(
        theme,
        counted_title("Sensors", &detail.sensors, detail.sensors.items.len()),
    );
    render_rows(
        frame,
        theme,
        rows[1],
        block,
        &detail.sensors,
        items,
        "No sensors attached to this station",
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: i64, lat: Option<f64>, lon: Option<f64>) -> Station {
        Station {
            id,
            name: Some(format!("Estação {}", id)),
            location: None,
            city: None,
            latitude: lat,
            longitude: lon,
        }
    }

    #[test]
    fn test_bounds_default_without_coordinates() {
        let s = station(1, None, Some(-46.6));
        assert_eq!(bounds(&[&s]), DEFAULT_BOUNDS);
    }

    #[test]
    fn test_bounds_wrap_stations_with_margin() {
        let a = station(1, Some(-23.5), Some(-46.6));
        let b = station(2, Some(-22.9), Some(-43.2));
        let bad = station(3, Some(120.0), Some(10.0));
        let (x, y) = bounds(&[&a, &b, &bad]);
        assert!((x[0] - (-48.6)).abs() < 1e-9);
        assert!((x[1] - (-41.2)).abs() < 1e-9);
        assert!((y[0] - (-25.5)).abs() < 1e-9);
        assert!((y[1] - (-20.9)).abs() < 1e-9);
    }
}
