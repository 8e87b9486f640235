use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::app::App;
use crate::ui::styles::Theme;

use super::list_block;

fn switch<'a>(theme: &Theme, key: &'a str, label: &'a str, on: bool) -> Line<'a> {
    let (value, style) = if on {
        ("[on] ", theme.success_style())
    } else {
        ("[off]", theme.muted_style())
    };
    Line::from(vec![
        Span::styled(format!("  [{}] ", key), theme.help_key_style()),
        Span::styled(format!("{:<16}", label), theme.list_item_style()),
        Span::styled(value, style),
    ])
}

pub fn render(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let prefs = &app.prefs;
    let lines = vec![
        Line::from(""),
        switch(theme, "t", "Notifications", prefs.notifications_enabled),
        Line::from(""),
        switch(theme, "m", "Dark mode", prefs.dark_mode),
        Line::from(""),
        Line::from(vec![
            Span::styled("  [l] ", theme.help_key_style()),
            Span::styled(format!("{:<16}", "Language"), theme.list_item_style()),
            Span::styled(prefs.language.label(), theme.highlight_style()),
        ]),
        Line::from(""),
        Line::from(""),
        Line::from(vec![
            Span::styled("  [r] ", theme.help_key_style()),
            Span::styled("Restore default settings", theme.list_item_style()),
        ]),
        Line::from(vec![
            Span::styled("  [o] ", theme.help_key_style()),
            Span::styled("Log out", theme.error_style()),
        ]),
    ];

    frame.render_widget(
        Paragraph::new(lines).block(list_block(theme, " Settings ".to_string())),
        area,
    );
}
