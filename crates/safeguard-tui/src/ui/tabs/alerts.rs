use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, ListItem, Paragraph, Wrap},
    Frame,
};

use safeguard_core::models::Alert;
use safeguard_core::utils::{format_date_time, truncate};

use crate::app::{App, AppState};
use crate::ui::styles::Theme;

use super::{counted_title, list_block, render_rows};

pub fn render(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3)])
        .split(area);
    render_filter_bar(frame, app, theme, rows[0]);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(rows[1]);

    let visible = app.visible_alerts();
    render_alert_list(frame, app, theme, columns[0], &visible);
    render_alert_detail(frame, theme, columns[1], visible.get(app.alerts.selection).copied());
}

fn render_filter_bar(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let filter = &app.alert_filter;
    let level = filter.level.map(|l| l.as_wire()).unwrap_or("All");
    let typing = app.state == AppState::Filtering;

    let mut spans = vec![
        Span::styled(" Level: ", theme.muted_style()),
        Span::styled(format!("{:<9}", level), theme.risk_style(filter.level)),
        Span::styled("  Search: ", theme.muted_style()),
    ];
    if filter.text.is_empty() && !typing {
        spans.push(Span::styled("(press /)", theme.muted_style()));
    } else {
        let cursor = if typing { "▌" } else { "" };
        spans.push(Span::styled(format!("{}{}", filter.text, cursor), theme.highlight_style()));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

fn render_alert_list(frame: &mut Frame, app: &App, theme: &Theme, area: Rect, visible: &[&Alert]) {
    let width = area.width.saturating_sub(16) as usize;
    let items: Vec<ListItem> = visible
        .iter()
        .map(|alert| {
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {:<9}", alert.level_display()), theme.risk_style(alert.level())),
                Span::styled(truncate(alert.message_display(), width), theme.list_item_style()),
            ]))
        })
        .collect();

    let empty = if app.alert_filter.is_active() {
        "No alerts match the filter"
    } else {
        "No alerts registered"
    };
    let block = list_block(theme, counted_title("Alerts", &app.alerts, visible.len()));
    render_rows(frame, theme, area, block, &app.alerts, items, empty);
}

fn render_alert_detail(frame: &mut Frame, theme: &Theme, area: Rect, alert: Option<&Alert>) {
    let block = Block::default()
        .title(" Details ")
        .title_style(theme.title_style())
        .borders(Borders::ALL)
        .border_style(theme.border_style(false));

    let Some(alert) = alert else {
        frame.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let issued = alert
        .issued_at
        .as_deref()
        .map(format_date_time)
        .unwrap_or_else(|| "-".to_string());
    let lines = vec![
        Line::from(vec![
            Span::styled("Alert #", theme.muted_style()),
            Span::styled(alert.id.to_string(), theme.highlight_style()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled("Level:  ", theme.muted_style()),
            Span::styled(alert.level_display().to_string(), theme.risk_style(alert.level())),
        ]),
        Line::from(vec![
            Span::styled("Issued: ", theme.muted_style()),
            Span::raw(issued),
        ]),
        Line::from(""),
        Line::from(alert.message_display().to_string()),
    ];
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}
