use serde::{Deserialize, Serialize};

use super::{required, ValidationError};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Sensor {
    pub id: i64,
    #[serde(rename = "tipo", default)]
    pub kind: Option<String>,
    #[serde(rename = "unidade", default)]
    pub unit: Option<String>,
    #[serde(rename = "descricao", default)]
    pub description: Option<String>,
}

impl Sensor {
    pub fn kind_display(&self) -> &str {
        self.kind.as_deref().unwrap_or("?")
    }

    pub fn unit_display(&self) -> &str {
        self.unit.as_deref().unwrap_or("")
    }

    pub fn description_display(&self) -> &str {
        self.description.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct SensorInput {
    #[serde(rename = "tipo")]
    pub kind: String,
    #[serde(rename = "unidade")]
    pub unit: String,
    #[serde(rename = "descricao")]
    pub description: String,
}

impl SensorInput {
    pub fn from_form(kind: &str, unit: &str, description: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            kind: required(kind)?,
            unit: required(unit)?,
            description: required(description)?,
        })
    }
}
