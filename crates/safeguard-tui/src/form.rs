//! Create/edit forms for the editable screens.

use safeguard_core::auth::credentials::MAX_USERNAME_LENGTH;
use safeguard_core::models::{
    Alert, AlertInput, Reading, ReadingInput, RiskLevel, Sensor, SensorInput, Station,
    StationInput, ValidationError,
};
use safeguard_core::Screen;

/// Longest value accepted in any form field
const MAX_FIELD_LENGTH: usize = 120;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Picked from the risk levels, not typed
    Level,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
    pub level: Option<RiskLevel>,
}

impl FormField {
    fn text(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            kind: FieldKind::Text,
            value: value.into(),
            level: None,
        }
    }

    fn level(label: &'static str, level: Option<RiskLevel>) -> Self {
        Self {
            label,
            kind: FieldKind::Level,
            value: String::new(),
            level,
        }
    }

    pub fn display(&self) -> String {
        match self.kind {
            FieldKind::Text => self.value.clone(),
            FieldKind::Level => self
                .level
                .map(|l| l.as_wire().to_string())
                .unwrap_or_else(|| "(choose with ←/→)".to_string()),
        }
    }
}

/// Validated payload ready to send
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Alert(AlertInput),
    Sensor(SensorInput),
    Reading(ReadingInput),
    Station(StationInput),
}

#[derive(Debug, Clone)]
pub struct EntityForm {
    pub screen: Screen,
    /// `Some` when editing an existing record
    pub editing_id: Option<i64>,
    pub fields: Vec<FormField>,
    pub focus: usize,
    pub error: Option<String>,
}

impl EntityForm {
    pub fn is_editable(screen: Screen) -> bool {
        matches!(
            screen,
            Screen::Alerts | Screen::Sensors | Screen::Readings | Screen::Stations
        )
    }

    fn build(screen: Screen, editing_id: Option<i64>, fields: Vec<FormField>) -> Self {
        Self {
            screen,
            editing_id,
            fields,
            focus: 0,
            error: None,
        }
    }

    /// Empty form for `screen`, `None` for read-only screens
    pub fn blank(screen: Screen) -> Option<Self> {
        let fields = match screen {
            Screen::Alerts => vec![
                FormField::text("Message", ""),
                FormField::level("Risk level", None),
            ],
            Screen::Sensors => vec![
                FormField::text("Type", ""),
                FormField::text("Unit", ""),
                FormField::text("Description", ""),
            ],
            Screen::Readings => vec![
                FormField::text("Value", ""),
                FormField::text("Sensor ID", ""),
            ],
            Screen::Stations => vec![
                FormField::text("Name", ""),
                FormField::text("Location", ""),
                FormField::text("City", ""),
            ],
            _ => return None,
        };
        Some(Self::build(screen, None, fields))
    }

    pub fn edit_alert(alert: &Alert) -> Self {
        Self::build(
            Screen::Alerts,
            Some(alert.id),
            vec![
                FormField::text("Message", alert.message_display()),
                FormField::level("Risk level", alert.level()),
            ],
        )
    }

    pub fn edit_sensor(sensor: &Sensor) -> Self {
        Self::build(
            Screen::Sensors,
            Some(sensor.id),
            vec![
                FormField::text("Type", sensor.kind.clone().unwrap_or_default()),
                FormField::text("Unit", sensor.unit_display()),
                FormField::text("Description", sensor.description_display()),
            ],
        )
    }

    /// Readings don't echo their sensor, so the sensor ID starts blank
    pub fn edit_reading(reading: &Reading) -> Self {
        let value = reading.value.map(|v| v.to_string()).unwrap_or_default();
        Self::build(
            Screen::Readings,
            Some(reading.id),
            vec![
                FormField::text("Value", value),
                FormField::text("Sensor ID", ""),
            ],
        )
    }

    pub fn edit_station(station: &Station) -> Self {
        Self::build(
            Screen::Stations,
            Some(station.id),
            vec![
                FormField::text("Name", station.name.clone().unwrap_or_default()),
                FormField::text("Location", station.location_display()),
                FormField::text("City", station.city_display()),
            ],
        )
    }

    pub fn title(&self) -> String {
        let noun = match self.screen {
            Screen::Alerts => "alert",
            Screen::Sensors => "sensor",
            Screen::Readings => "reading",
            Screen::Stations => "station",
            _ => "record",
        };
        match self.editing_id {
            Some(id) => format!("Edit {} #{}", noun, id),
            None => format!("New {}", noun),
        }
    }

    pub fn focused(&self) -> Option<&FormField> {
        self.fields.get(self.focus)
    }

    pub fn next_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn prev_field(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn push_char(&mut self, c: char) {
        if c.is_control() {
            return;
        }
        if let Some(field) = self.fields.get_mut(self.focus) {
            if field.kind == FieldKind::Text && field.value.chars().count() < MAX_FIELD_LENGTH {
                field.value.push(c);
                self.error = None;
            }
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            match field.kind {
                FieldKind::Text => {
                    field.value.pop();
                }
                FieldKind::Level => field.level = None,
            }
        }
    }

    /// Step the focused level picker. No-op on text fields.
    pub fn cycle_level(&mut self, forward: bool) {
        if let Some(field) = self.fields.get_mut(self.focus) {
            if field.kind != FieldKind::Level {
                return;
            }
            field.level = if forward {
                RiskLevel::cycle(field.level)
            } else {
                let all = RiskLevel::ALL;
                match field.level.and_then(|l| all.iter().position(|x| *x == l)) {
                    None => all.last().copied(),
                    Some(0) => None,
                    Some(i) => Some(all[i - 1]),
                }
            };
            self.error = None;
        }
    }

    fn text(&self, index: usize) -> &str {
        self.fields.get(index).map(|f| f.value.as_str()).unwrap_or("")
    }

    fn level_at(&self, index: usize) -> Option<RiskLevel> {
        self.fields.get(index).and_then(|f| f.level)
    }

    /// Validate and build the payload. Nothing is sent on error.
    pub fn submission(&self) -> Result<Submission, ValidationError> {
        match self.screen {
            Screen::Alerts => AlertInput::from_form(self.text(0), self.level_at(1)).map(Submission::Alert),
            Screen::Sensors => SensorInput::from_form(self.text(0), self.text(1), self.text(2))
                .map(Submission::Sensor),
            Screen::Readings => {
                ReadingInput::from_form(self.text(0), self.text(1)).map(Submission::Reading)
            }
            Screen::Stations => StationInput::from_form(self.text(0), self.text(1), self.text(2))
                .map(Submission::Station),
            _ => Err(ValidationError::MissingFields),
        }
    }
}

/// Login form state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginFocus {
    Username,
    Password,
    Button,
}

#[derive(Debug, Clone)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    pub focus: LoginFocus,
    pub error: Option<String>,
    /// Shown above the fields, e.g. after the session expired
    pub notice: Option<String>,
    /// A login request is outstanding; the button is disabled
    pub submitting: bool,
}

impl LoginForm {
    pub fn new(username: Option<String>) -> Self {
        let username: String = username
            .unwrap_or_default()
            .chars()
            .take(MAX_USERNAME_LENGTH)
            .collect();
        let focus = if username.is_empty() {
            LoginFocus::Username
        } else {
            LoginFocus::Password
        };
        Self {
            username,
            password: String::new(),
            focus,
            error: None,
            notice: None,
            submitting: false,
        }
    }

    pub fn next_focus(&mut self) {
        self.focus = match self.focus {
            LoginFocus::Username => LoginFocus::Password,
            LoginFocus::Password => LoginFocus::Button,
            LoginFocus::Button => LoginFocus::Username,
        };
    }

    pub fn prev_focus(&mut self) {
        self.focus = match self.focus {
            LoginFocus::Username => LoginFocus::Button,
            LoginFocus::Password => LoginFocus::Username,
            LoginFocus::Button => LoginFocus::Password,
        };
    }

    /// Reset after leaving the login screen; the username is kept
    pub fn clear_secret(&mut self) {
        self.password.clear();
        self.error = None;
        self.submitting = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_screens_have_no_form() {
        assert!(EntityForm::blank(Screen::Risks).is_none());
        assert!(EntityForm::blank(Screen::Map).is_none());
        assert!(EntityForm::blank(Screen::Settings).is_none());
        assert!(EntityForm::blank(Screen::Alerts).is_some());
    }

    #[test]
    fn test_blank_alert_form_fails_validation() {
        let form = EntityForm::blank(Screen::Alerts).unwrap();
        assert_eq!(form.submission(), Err(ValidationError::MissingFields));
    }

    #[test]
    fn test_alert_form_typing_and_level() {
        let mut form = EntityForm::blank(Screen::Alerts).unwrap();
        for c in "Chuva".chars() {
            form.push_char(c);
        }
        form.next_field();
        form.push_char('x');
        form.cycle_level(true);
        form.cycle_level(true);
        match form.submission().unwrap() {
            Submission::Alert(input) => {
                assert_eq!(input.message, "Chuva");
                assert_eq!(input.risk_level, RiskLevel::Moderate);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_cycle_level_backwards_wraps_through_none() {
        let mut form = EntityForm::blank(Screen::Alerts).unwrap();
        form.focus = 1;
        form.cycle_level(false);
        assert_eq!(form.level_at(1), Some(RiskLevel::Critical));
        form.cycle_level(true);
        assert_eq!(form.level_at(1), None);
    }

    #[test]
    fn test_edit_station_prefills() {
        let station = Station {
            id: 4,
            name: Some("Norte".into()),
            location: Some("Morro".into()),
            city: Some("Recife".into()),
            latitude: None,
            longitude: None,
        };
        let form = EntityForm::edit_station(&station);
        assert_eq!(form.title(), "Edit station #4");
        assert_eq!(
            form.submission().unwrap(),
            Submission::Station(StationInput::from_form("Norte", "Morro", "Recife").unwrap())
        );
    }

    #[test]
    fn test_reading_form_reports_bad_number() {
        let mut form = EntityForm::blank(Screen::Readings).unwrap();
        form.push_char('a');
        form.next_field();
        form.push_char('1');
        assert_eq!(form.submission(), Err(ValidationError::NotANumber("Value")));
    }

    #[test]
    fn test_login_focus_cycle() {
        let mut login = LoginForm::new(Some("ana".into()));
        assert_eq!(login.focus, LoginFocus::Password);
        login.next_focus();
        assert_eq!(login.focus, LoginFocus::Button);
        login.next_focus();
        assert_eq!(login.focus, LoginFocus::Username);
        login.prev_focus();
        assert_eq!(login.focus, LoginFocus::Button);
    }
}
