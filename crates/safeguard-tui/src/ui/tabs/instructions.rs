use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::ui::styles::Theme;

use super::list_block;

const SECTIONS: [(&str, &str); 6] = [
    ("Map", "View stations and their location on the map. Enter lists a station's sensors."),
    ("Readings", "See sensor readings such as temperature, humidity and pressure."),
    ("Alerts", "Register, update or delete the risk alerts that were identified."),
    ("Risks", "Follow risk levels by region and date."),
    ("Stations", "Look up the registered stations and where they are."),
    ("Settings", "Adjust notifications and application preferences."),
];

pub fn render(frame: &mut Frame, theme: &Theme, area: Rect) {
    let mut lines = vec![Line::from("")];
    for (label, description) in SECTIONS {
        lines.push(Line::from(Span::styled(format!("  {}", label), theme.highlight_style())));
        lines.push(Line::from(Span::styled(format!("    {}", description), theme.list_item_style())));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(vec![
        Span::styled("  [o] ", theme.help_key_style()),
        Span::styled("Log out", theme.error_style()),
    ]));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "  SAFE.Guard - Predict to protect.",
        theme.muted_style(),
    )));

    frame.render_widget(
        Paragraph::new(lines)
            .block(list_block(theme, " How to use ".to_string()))
            .wrap(Wrap { trim: false }),
        area,
    );
}
