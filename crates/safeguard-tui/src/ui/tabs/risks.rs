use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::ListItem,
    Frame,
};

use safeguard_core::models::RiskLevel;
use safeguard_core::utils::{format_date_time, truncate};

use crate::app::App;
use crate::ui::styles::Theme;

use super::{counted_title, list_block, render_rows};

pub fn render(frame: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let description_width = area.width.saturating_sub(34) as usize;
    let items: Vec<ListItem> = app
        .risks
        .items
        .iter()
        .map(|risk| {
            let level = RiskLevel::parse(risk.level_display()).ok();
            let detected = risk
                .detected_at
                .as_deref()
                .map(format_date_time)
                .unwrap_or_else(|| "-".to_string());
            ListItem::new(Line::from(vec![
                Span::styled(format!(" {:<9}", risk.level_display()), theme.risk_style(level)),
                Span::styled(format!("{:<18}", detected), theme.muted_style()),
                Span::raw(truncate(risk.description_display(), description_width)),
            ]))
        })
        .collect();

    let block = list_block(theme, counted_title("Risks", &app.risks, app.risks.items.len()));
    render_rows(frame, theme, area, block, &app.risks, items, "No risks detected");
}
