use serde::{Deserialize, Serialize};

use super::{required, ValidationError};

/// One measurement taken by a sensor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reading {
    pub id: i64,
    #[serde(rename = "valor", default)]
    pub value: Option<f64>,
    #[serde(rename = "dataHora", default)]
    pub taken_at: Option<String>,
}

impl Reading {
    pub fn value_display(&self) -> String {
        match self.value {
            Some(v) => format!("{}", v),
            None => "?".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReadingInput {
    #[serde(rename = "valor")]
    pub value: f64,
    #[serde(rename = "sensorId")]
    pub sensor_id: i64,
}

impl ReadingInput {
    /// Accepts a comma as the decimal separator.
    pub fn from_form(value: &str, sensor_id: &str) -> Result<Self, ValidationError> {
        let value = required(value)?;
        let sensor_id = required(sensor_id)?;

        let value: f64 = value
            .replace(',', ".")
            .parse()
            .ok()
            .filter(|v: &f64| v.is_finite())
            .ok_or(ValidationError::NotANumber("Value"))?;
        let sensor_id: i64 = sensor_id
            .parse()
            .map_err(|_| ValidationError::NotAnInteger("Sensor ID"))?;

        Ok(Self { value, sensor_id })
    }
}
