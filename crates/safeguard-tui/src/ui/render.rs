use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use safeguard_core::{Route, Screen};

use crate::app::{App, AppState};
use crate::form::{FieldKind, LoginFocus};

use super::styles::Theme;
use super::tabs;

const LOGO: [&str; 3] = [
    "  ╔═╗╔═╗╔═╗╔═╗  ╔═╗╦ ╦╔═╗╦═╗╔╦╗",
    "  ╚═╗╠═╣╠╣ ║╣   ║ ╦║ ║╠═╣╠╦╝ ║║",
    "  ╚═╝╩ ╩╚  ╚═╝o ╚═╝╚═╝╩ ╩╩╚══╩╝",
];

pub fn render(frame: &mut Frame, app: &App) {
    let theme = app.theme();
    frame.render_widget(Block::default().style(theme.base_style()), frame.area());

    match app.route() {
        Route::Loading => render_loading(frame, &theme),
        Route::Login => render_login(frame, app, &theme),
        Route::Tab(_) | Route::StationDetail { .. } => render_shell(frame, app, &theme),
    }

    if matches!(app.state, AppState::Confirming) {
        render_confirm_overlay(frame, app, &theme);
    }
}

fn render_loading(frame: &mut Frame, theme: &Theme) {
    let area = centered_rect_fixed(40, 7, frame.area());
    let mut lines: Vec<Line> = LOGO
        .iter()
        .map(|l| Line::from(Span::styled(*l, theme.title_style())))
        .collect();
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "        Checking your session...",
        theme.muted_style(),
    )));
    frame.render_widget(Paragraph::new(lines), area);
}

fn render_shell(frame: &mut Frame, app: &App, theme: &Theme) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title bar
            Constraint::Length(2), // Tabs
            Constraint::Min(8),    // Main content
            Constraint::Length(1), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, theme, chunks[0]);
    render_tabs(frame, app, theme, chunks[1]);
    render_main_content(frame, app, theme, chunks[2]);
    render_status_bar(frame, app, theme, chunks[3]);

    if matches!(app.state, AppState::ShowingHelp) {
        render_help_overlay(frame, theme);
    }
    if matches!(app.state, AppState::Editing) {
        render_form_overlay(frame, app, theme);
    }
}

fn render_title_bar(frame: &mut Frame, theme: &Theme, area: Rect) {
    let title = "  SAFE.Guard";
    let help_hint = "[?] Help";

    let title_line = Line::from(vec![
        Span::styled(title, theme.title_style()),
        Span::raw(" ".repeat(
            area.width
                .saturating_sub(title.len() as u16 + help_hint.len() as u16 + 2)
                as usize,
        )),
        Span::styled(help_hint, theme.muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(theme.muted_style());
    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let current = app.current_screen();
    let mut spans = vec![Span::raw(" ")];
    for (i, screen) in Screen::ALL.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", theme.muted_style()));
        }
        let label = format!("[{}] {}", i + 1, screen.title());
        spans.push(Span::styled(label, theme.tab_style(current == Some(*screen))));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(theme.muted_style());
    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    match app.route() {
        Route::Tab(Screen::Alerts) => tabs::alerts::render(frame, app, theme, area),
        Route::Tab(Screen::Map) => tabs::map::render(frame, app, theme, area),
        Route::StationDetail { .. } => tabs::map::render_station_detail(frame, app, theme, area),
        Route::Tab(Screen::Sensors) => tabs::sensors::render(frame, app, theme, area),
        Route::Tab(Screen::Readings) => tabs::readings::render(frame, app, theme, area),
        Route::Tab(Screen::Risks) => tabs::risks::render(frame, app, theme, area),
        Route::Tab(Screen::Stations) => tabs::stations::render(frame, app, theme, area),
        Route::Tab(Screen::Settings) => tabs::settings::render(frame, app, theme, area),
        Route::Tab(Screen::Instructions) => tabs::instructions::render(frame, theme, area),
        Route::Loading | Route::Login => {}
    }
}

fn shortcuts_for(app: &App) -> &'static str {
    if app.state == AppState::Filtering {
        return "type to filter | [Enter] done | [Esc] clear";
    }
    match app.route() {
        Route::Tab(Screen::Alerts) => "[n]ew [e]dit [d]elete [/]filter [f]level [u]pdate [q]uit",
        Route::Tab(Screen::Map) => "[Enter] sensors [/]filter [u]pdate [q]uit",
        Route::StationDetail { .. } => "[Esc] back [u]pdate [q]uit",
        Route::Tab(Screen::Risks) => "[u]pdate [q]uit",
        Route::Tab(Screen::Settings) => "[t] [m] [l] toggle [r]estore l[o]gout [q]uit",
        Route::Tab(Screen::Instructions) => "l[o]gout [q]uit",
        _ => "[n]ew [e]dit [d]elete [u]pdate [q]uit",
    }
}

fn render_status_bar(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let left_text = match &app.status_message {
        Some(msg) => format!(" {} ", msg),
        None => String::from(" "),
    };
    let right_text = format!(" {} ", shortcuts_for(app));

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.chars().count());
    let status_line = Line::from(vec![
        Span::styled(left_text, theme.muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, theme.muted_style()),
    ]);
    frame.render_widget(
        Paragraph::new(status_line).style(theme.status_bar_style()),
        area,
    );
}

fn render_login(frame: &mut Frame, app: &App, theme: &Theme) {
    let login = &app.login;
    let extra = usize::from(login.error.is_some()) + usize::from(login.notice.is_some());
    let area = centered_rect_fixed(46, 12 + 2 * extra as u16, frame.area());
    frame.render_widget(Clear, area);

    let mut lines: Vec<Line> = LOGO
        .iter()
        .map(|l| Line::from(Span::styled(format!("  {}", l), theme.title_style())))
        .collect();
    lines.push(Line::from(""));

    if let Some(notice) = &login.notice {
        lines.push(Line::from(Span::styled(format!(" {}", notice), theme.highlight_style())));
        lines.push(Line::from(""));
    }

    let field = |label: &'static str, value: String, focused: bool| {
        let style = if focused {
            theme.selected_style()
        } else {
            theme.list_item_style()
        };
        let cursor = if focused { "▌" } else { "" };
        Line::from(vec![
            Span::raw("      "),
            Span::styled(label, theme.muted_style()),
            Span::styled(format!("{:<16}{}", value, cursor), style),
            Span::styled("]", theme.muted_style()),
        ])
    };

    lines.push(field(
        "Username: [",
        tail(&login.username, 16),
        login.focus == LoginFocus::Username,
    ));
    lines.push(field(
        "Password: [",
        "*".repeat(login.password.chars().count().min(16)),
        login.focus == LoginFocus::Password,
    ));
    lines.push(Line::from(""));

    let button_focused = login.focus == LoginFocus::Button;
    let label = match (login.submitting, button_focused) {
        (true, _) => "  Signing in ",
        (false, true) => " ▶ Login ◀  ",
        (false, false) => "   Login    ",
    };
    let button_style = if login.submitting {
        theme.muted_style()
    } else if button_focused {
        theme.selected_style()
    } else {
        theme.list_item_style()
    };
    lines.push(Line::from(vec![
        Span::raw("            ["),
        Span::styled(label, button_style),
        Span::raw("]"),
    ]));

    if let Some(error) = &login.error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(format!(" {}", error), theme.error_style())));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(true))
        .style(theme.base_style());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn help_line<'a>(theme: &Theme, key: &'a str, desc: &'a str) -> Line<'a> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), theme.help_key_style()),
        Span::styled(desc, theme.help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame, theme: &Theme) {
    let area = centered_rect_fixed(52, 24, frame.area());
    frame.render_widget(Clear, area);

    let version = env!("CARGO_PKG_VERSION");
    let help_text = vec![
        Line::from(Span::styled(
            format!("  SAFE.Guard  version {}", version),
            theme.title_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", theme.highlight_style())),
        help_line(theme, "1-8", "Switch tabs"),
        help_line(theme, "←/→", "Prev/next tab"),
        help_line(theme, "↑/↓ j/k", "Navigate list"),
        help_line(theme, "Enter", "Edit / open station sensors"),
        help_line(theme, "Esc", "Go back"),
        Line::from(""),
        Line::from(Span::styled(" Actions", theme.highlight_style())),
        help_line(theme, "n", "New record"),
        help_line(theme, "e", "Edit record"),
        help_line(theme, "d", "Delete record"),
        help_line(theme, "/", "Filter (Alerts, Map)"),
        help_line(theme, "f", "Cycle alert level filter"),
        help_line(theme, "u", "Reload from server"),
        help_line(theme, "o", "Log out (Settings, Help)"),
        help_line(theme, "q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", theme.muted_style()),
            Span::styled("?", theme.help_key_style()),
            Span::styled(" or ", theme.muted_style()),
            Span::styled("Esc", theme.help_key_style()),
            Span::styled(" to close", theme.muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(true))
        .style(theme.base_style());
    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_form_overlay(frame: &mut Frame, app: &App, theme: &Theme) {
    let Some(form) = app.form.as_ref() else {
        return;
    };
    let height = form.fields.len() as u16 * 2 + if form.error.is_some() { 7 } else { 5 };
    let area = centered_rect_fixed(60, height, frame.area());
    frame.render_widget(Clear, area);

    let mut lines = vec![Line::from("")];
    for (i, field) in form.fields.iter().enumerate() {
        let focused = i == form.focus;
        let value_style = match (focused, field.kind) {
            (true, _) => theme.selected_style(),
            (false, FieldKind::Level) => theme.risk_style(field.level),
            (false, FieldKind::Text) => theme.list_item_style(),
        };
        let cursor = if focused && field.kind == FieldKind::Text { "▌" } else { "" };
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<14}", field.label), theme.muted_style()),
            Span::styled(format!("{}{}", field.display(), cursor), value_style),
        ]));
        lines.push(Line::from(""));
    }

    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(format!("  {}", error), theme.error_style())));
        lines.push(Line::from(""));
    }
    lines.push(Line::from(vec![
        Span::styled("  [Enter]", theme.help_key_style()),
        Span::styled(" save  ", theme.muted_style()),
        Span::styled("[Tab]", theme.help_key_style()),
        Span::styled(" next field  ", theme.muted_style()),
        Span::styled("[Esc]", theme.help_key_style()),
        Span::styled(" cancel", theme.muted_style()),
    ]));

    let block = Block::default()
        .title(format!(" {} ", form.title()))
        .title_style(theme.title_style())
        .borders(Borders::ALL)
        .border_style(theme.border_style(true))
        .style(theme.base_style());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_confirm_overlay(frame: &mut Frame, app: &App, theme: &Theme) {
    let Some(pending) = app.pending.as_ref() else {
        return;
    };
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("  {}", pending.prompt()), theme.highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("  Press ", theme.muted_style()),
            Span::styled("[Y]", theme.help_key_style()),
            Span::styled(" to confirm, ", theme.muted_style()),
            Span::styled("[N]", theme.help_key_style()),
            Span::styled(" to cancel", theme.muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(true))
        .style(theme.base_style());
    frame.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: false }),
        area,
    );
}

/// Last `max` characters of `s`, so the cursor end stays visible
fn tail(s: &str, max: usize) -> String {
    let skip = s.chars().count().saturating_sub(max);
    s.chars().skip(skip).collect()
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_rect_fits_inside_small_area() {
        let outer = Rect::new(0, 0, 30, 5);
        let rect = centered_rect_fixed(46, 12, outer);
        assert_eq!(rect.width, 30);
        assert_eq!(rect.height, 5);
        assert_eq!((rect.x, rect.y), (0, 0));
    }

    #[test]
    fn test_tail_keeps_end() {
        assert_eq!(tail("operador.campinas", 8), "campinas");
        assert_eq!(tail("ana", 16), "ana");
    }

    #[test]
    fn test_centered_rect_is_centered() {
        let outer = Rect::new(0, 0, 100, 40);
        let rect = centered_rect_fixed(46, 10, outer);
        assert_eq!((rect.x, rect.y), (27, 15));
    }
}
