use std::fmt;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Risk levels used by alerts and risks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "Baixo")]
    Low,
    #[serde(rename = "Moderado")]
    Moderate,
    #[serde(rename = "Alto")]
    High,
    #[serde(rename = "Crítico")]
    Critical,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Moderate,
        RiskLevel::High,
        RiskLevel::Critical,
    ];

    /// Value sent to and received from the server
    pub fn as_wire(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Baixo",
            RiskLevel::Moderate => "Moderado",
            RiskLevel::High => "Alto",
            RiskLevel::Critical => "Crítico",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::Critical => "Critical",
        }
    }

    /// Parse a wire value. Accepts "Critico" without the accent.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        match s.trim().to_lowercase().as_str() {
            "baixo" => Ok(RiskLevel::Low),
            "moderado" => Ok(RiskLevel::Moderate),
            "alto" => Ok(RiskLevel::High),
            "crítico" | "critico" => Ok(RiskLevel::Critical),
            _ => Err(ValidationError::UnknownRiskLevel(s.to_string())),
        }
    }

    /// Next level in picker order, `None` after the last
    pub fn cycle(current: Option<RiskLevel>) -> Option<RiskLevel> {
        match current {
            None => Some(RiskLevel::Low),
            Some(RiskLevel::Low) => Some(RiskLevel::Moderate),
            Some(RiskLevel::Moderate) => Some(RiskLevel::High),
            Some(RiskLevel::High) => Some(RiskLevel::Critical),
            Some(RiskLevel::Critical) => None,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_wire())
    }
}

/// A detected risk. Read-only on the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Risk {
    pub id: i64,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
    #[serde(rename = "nivel", default)]
    pub level: Option<String>,
    #[serde(rename = "data", default)]
    pub detected_at: Option<String>,
}

impl Risk {
    pub fn level_display(&self) -> &str {
        self.level.as_deref().unwrap_or("?")
    }

    pub fn description_display(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}
