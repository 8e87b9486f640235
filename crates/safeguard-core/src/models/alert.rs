use serde::{Deserialize, Serialize};

use super::{required, RiskLevel, ValidationError};
use crate::utils::contains_ignore_case;

/// A risk alert
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    pub id: i64,
    #[serde(rename = "mensagem", default)]
    pub message: Option<String>,
    #[serde(rename = "nivelRisco", default)]
    pub risk_level: Option<String>,
    #[serde(rename = "dataHora", default)]
    pub issued_at: Option<String>,
}

impl Alert {
    pub fn message_display(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }

    pub fn level_display(&self) -> &str {
        self.risk_level.as_deref().unwrap_or("?")
    }

    /// Parsed level, `None` for missing or unrecognised values
    pub fn level(&self) -> Option<RiskLevel> {
        self.risk_level.as_deref().and_then(|l| RiskLevel::parse(l).ok())
    }
}

/// Body for creating or updating an alert
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AlertInput {
    #[serde(rename = "mensagem")]
    pub message: String,
    #[serde(rename = "nivelRisco")]
    pub risk_level: RiskLevel,
}

impl AlertInput {
    pub fn from_form(message: &str, level: Option<RiskLevel>) -> Result<Self, ValidationError> {
        let message = required(message)?;
        let risk_level = level.ok_or(ValidationError::MissingFields)?;
        Ok(Self { message, risk_level })
    }
}

/// Level plus free text. Both must match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertFilter {
    pub level: Option<RiskLevel>,
    pub text: String,
}

impl AlertFilter {
    pub fn is_active(&self) -> bool {
        self.level.is_some() || !self.text.trim().is_empty()
    }

    pub fn matches(&self, alert: &Alert) -> bool {
        let level_ok = match self.level {
            Some(level) => alert.level() == Some(level),
            None => true,
        };
        level_ok && contains_ignore_case(alert.message_display(), self.text.trim())
    }

    pub fn apply<'a>(&self, alerts: &'a [Alert]) -> Vec<&'a Alert> {
        alerts.iter().filter(|a| self.matches(a)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alert(id: i64, message: &str, level: &str) -> Alert {
        Alert {
            id,
            message: Some(message.to_string()),
            risk_level: Some(level.to_string()),
            issued_at: None,
        }
    }

    #[test]
    fn test_parse_alert() {
        let json = r#"{"id": 1, "mensagem": "Chuva forte", "nivelRisco": "Alto", "dataHora": "2024-05-01T10:00:00"}"#;
        let a: Alert = serde_json::from_str(json).unwrap();
        assert_eq!(a.message_display(), "Chuva forte");
        assert_eq!(a.level(), Some(RiskLevel::High));
    }

    #[test]
    fn test_input_wire_format() {
        let input = AlertInput::from_form("  Enchente  ", Some(RiskLevel::Critical)).unwrap();
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["mensagem"], "Enchente");
        assert_eq!(json["nivelRisco"], "Crítico");
    }

    #[test]
    fn test_input_requires_fields() {
        assert_eq!(
            AlertInput::from_form("   ", Some(RiskLevel::Low)),
            Err(ValidationError::MissingFields)
        );
        assert_eq!(
            AlertInput::from_form("Enchente", None),
            Err(ValidationError::MissingFields)
        );
    }

    #[test]
    fn test_filter_level_and_text() {
        let alerts = vec![
            alert(1, "Chuva forte na zona sul", "Alto"),
            alert(2, "Vento moderado", "Moderado"),
            alert(3, "Chuva leve", "Baixo"),
        ];

        let all = AlertFilter::default();
        assert!(!all.is_active());
        assert_eq!(all.apply(&alerts).len(), 3);

        let text = AlertFilter { level: None, text: "CHUVA".into() };
        assert_eq!(text.apply(&alerts).len(), 2);

        let both = AlertFilter { level: Some(RiskLevel::High), text: "chuva".into() };
        let hits = both.apply(&alerts);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, 1);
    }

    #[test]
    fn test_filter_missing_message() {
        let a = Alert { id: 9, message: None, risk_level: Some("Alto".into()), issued_at: None };
        assert!(AlertFilter::default().matches(&a));
        assert!(!AlertFilter { level: None, text: "x".into() }.matches(&a));
    }
}
