use ratatui::style::{Color, Modifier, Style};

use safeguard_core::models::RiskLevel;

/// Colour set for one theme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub primary: Color,
    pub secondary: Color,
    pub background: Color,
    pub alert: Color,
    pub success: Color,
    pub danger: Color,
    pub warning: Color,
    pub text: Color,
    pub info: Color,
    pub card: Color,
    pub muted: Color,
}

pub const LIGHT: Palette = Palette {
    primary: Color::Rgb(29, 53, 87),
    secondary: Color::Rgb(69, 123, 157),
    background: Color::Rgb(241, 250, 238),
    alert: Color::Rgb(230, 57, 70),
    success: Color::Rgb(42, 157, 143),
    danger: Color::Rgb(198, 40, 40),
    warning: Color::Rgb(244, 162, 97),
    text: Color::Rgb(51, 51, 51),
    info: Color::Rgb(0, 180, 216),
    card: Color::Rgb(255, 255, 255),
    muted: Color::Rgb(120, 120, 120),
};

pub const DARK: Palette = Palette {
    primary: Color::Rgb(3, 169, 244),
    secondary: Color::Rgb(55, 0, 179),
    background: Color::Rgb(24, 24, 24),
    alert: Color::Rgb(244, 67, 54),
    success: Color::Rgb(3, 218, 197),
    danger: Color::Rgb(176, 0, 32),
    warning: Color::Rgb(255, 152, 0),
    text: Color::Rgb(224, 224, 224),
    info: Color::Rgb(3, 169, 244),
    card: Color::Rgb(51, 51, 51),
    muted: Color::Rgb(128, 128, 128),
};

/// Styles for the active palette
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub palette: Palette,
}

impl Theme {
    pub fn new(dark_mode: bool) -> Self {
        Self {
            palette: if dark_mode { DARK } else { LIGHT },
        }
    }

    pub fn base_style(&self) -> Style {
        Style::default()
            .bg(self.palette.background)
            .fg(self.palette.text)
    }

    pub fn title_style(&self) -> Style {
        Style::default()
            .fg(self.palette.primary)
            .add_modifier(Modifier::BOLD)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .bg(self.palette.secondary)
            .fg(self.palette.card)
            .add_modifier(Modifier::BOLD)
    }

    pub fn list_item_style(&self) -> Style {
        Style::default().fg(self.palette.text)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.palette.muted)
    }

    pub fn highlight_style(&self) -> Style {
        Style::default().fg(self.palette.warning)
    }

    pub fn success_style(&self) -> Style {
        Style::default().fg(self.palette.success)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.palette.danger)
    }

    pub fn tab_style(&self, selected: bool) -> Style {
        if selected {
            Style::default()
                .fg(self.palette.primary)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            self.muted_style()
        }
    }

    pub fn border_style(&self, focused: bool) -> Style {
        if focused {
            Style::default().fg(self.palette.primary)
        } else {
            self.muted_style()
        }
    }

    pub fn status_bar_style(&self) -> Style {
        Style::default()
            .bg(self.palette.primary)
            .fg(self.palette.card)
    }

    pub fn help_key_style(&self) -> Style {
        Style::default()
            .fg(self.palette.alert)
            .add_modifier(Modifier::BOLD)
    }

    pub fn help_desc_style(&self) -> Style {
        Style::default().fg(self.palette.text)
    }

    /// Colour for a risk level badge. Unknown levels use the muted colour.
    pub fn risk_style(&self, level: Option<RiskLevel>) -> Style {
        let color = match level {
            Some(RiskLevel::Low) => self.palette.success,
            Some(RiskLevel::Moderate) => self.palette.warning,
            Some(RiskLevel::High) => self.palette.alert,
            Some(RiskLevel::Critical) => self.palette.danger,
            None => self.palette.muted,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_follows_dark_mode() {
        assert_eq!(Theme::new(false).palette, LIGHT);
        assert_eq!(Theme::new(true).palette, DARK);
    }

    #[test]
    fn test_risk_colors_distinct() {
        let theme = Theme::new(false);
        let styles: Vec<Style> = RiskLevel::ALL
            .iter()
            .map(|l| theme.risk_style(Some(*l)))
            .collect();
        for (i, a) in styles.iter().enumerate() {
            for b in &styles[i + 1..] {
                assert_ne!(a.fg, b.fg);
            }
        }
    }
}
