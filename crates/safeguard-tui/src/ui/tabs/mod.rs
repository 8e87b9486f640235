//! Per-screen content rendering.

pub mod alerts;
pub mod instructions;
pub mod map;
pub mod readings;
pub mod risks;
pub mod sensors;
pub mod settings;
pub mod stations;

use ratatui::{
    layout::{Alignment, Rect},
    text::Line,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::app::ListView;
use crate::ui::styles::Theme;

pub(crate) fn list_block(theme: &Theme, title: String) -> Block<'static> {
    Block::default()
        .title(title)
        .title_style(theme.title_style())
        .borders(Borders::ALL)
        .border_style(theme.border_style(true))
}

/// Render a list, or a placeholder while loading or when there is nothing
/// to show.
pub(crate) fn render_rows<T>(
    frame: &mut Frame,
    theme: &Theme,
    area: Rect,
    block: Block<'_>,
    view: &ListView<T>,
    rows: Vec<ListItem<'_>>,
    empty_message: &str,
) {
    if rows.is_empty() {
        let message = if view.loading || !view.loaded {
            "Loading..."
        } else {
            empty_message
        };
        let paragraph = Paragraph::new(vec![Line::from(""), Line::styled(message, theme.muted_style())])
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(paragraph, area);
        return;
    }

    let list = List::new(rows)
        .block(block)
        .highlight_style(theme.selected_style());
    let mut state = ListState::default();
    state.select(Some(view.selection));
    frame.render_stateful_widget(list, area, &mut state);
}

/// Title with a count, marked while a reload is running
pub(crate) fn counted_title<T>(label: &str, view: &ListView<T>, shown: usize) -> String {
    let spinner = if view.loading && view.loaded { " ⟳" } else { "" };
    if shown == view.items.len() {
        format!(" {} ({}){} ", label, shown, spinner)
    } else {
        format!(" {} ({} of {}){} ", label, shown, view.items.len(), spinner)
    }
}
