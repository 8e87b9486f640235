use serde::{Deserialize, Serialize};

use super::{required, ValidationError};
use crate::utils::contains_ignore_case;

/// A monitoring station
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Station {
    pub id: i64,
    #[serde(rename = "nome", default)]
    pub name: Option<String>,
    #[serde(rename = "localizacao", default)]
    pub location: Option<String>,
    #[serde(rename = "cidade", default)]
    pub city: Option<String>,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl Station {
    pub fn name_display(&self) -> &str {
        self.name.as_deref().unwrap_or("?")
    }

    pub fn location_display(&self) -> &str {
        self.location.as_deref().unwrap_or("")
    }

    pub fn city_display(&self) -> &str {
        self.city.as_deref().unwrap_or("")
    }

    /// Coordinates, only when both are present and in range
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon))
                if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) =>
            {
                Some((lat, lon))
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct StationInput {
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "localizacao")]
    pub location: String,
    #[serde(rename = "cidade")]
    pub city: String,
}

impl StationInput {
    pub fn from_form(name: &str, location: &str, city: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required(name)?,
            location: required(location)?,
            city: required(city)?,
        })
    }
}

/// Matches name or city
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StationFilter {
    pub text: String,
}

impl StationFilter {
    pub fn matches(&self, station: &Station) -> bool {
        let needle = self.text.trim();
        contains_ignore_case(station.name_display(), needle)
            || contains_ignore_case(station.city_display(), needle)
    }

    pub fn apply<'a>(&self, stations: &'a [Station]) -> Vec<&'a Station> {
        stations.iter().filter(|s| self.matches(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn station(id: i64, name: &str, city: &str) -> Station {
        Station {
            id,
            name: Some(name.into()),
            location: None,
            city: Some(city.into()),
            latitude: None,
            longitude: None,
        }
    }

    #[test]
    fn test_parse_station() {
        let json = r#"{"id": 1, "nome": "Estação Norte", "localizacao": "Morro", "cidade": "Recife", "latitude": -8.05, "longitude": -34.9}"#;
        let s: Station = serde_json::from_str(json).unwrap();
        assert_eq!(s.coordinates(), Some((-8.05, -34.9)));

        let json = r#"{"id": 2, "nome": "Sem GPS", "latitude": -8.05}"#;
        let s: Station = serde_json::from_str(json).unwrap();
        assert_eq!(s.coordinates(), None);
    }

    #[test]
    fn test_out_of_range_coordinates() {
        let mut s = station(1, "A", "B");
        s.latitude = Some(120.0);
        s.longitude = Some(10.0);
        assert_eq!(s.coordinates(), None);
    }

    #[test]
    fn test_filter_name_or_city() {
        let stations = vec![station(1, "Norte", "Recife"), station(2, "Sul", "Olinda")];
        let f = StationFilter { text: "olin".into() };
        assert_eq!(f.apply(&stations)[0].id, 2);
        let f = StationFilter { text: "NORTE".into() };
        assert_eq!(f.apply(&stations)[0].id, 1);
        assert_eq!(StationFilter::default().apply(&stations).len(), 2);
    }

    #[test]
    fn test_input() {
        assert!(StationInput::from_form("A", "B", "").is_err());
        let input = StationInput::from_form("A", "B", "C").unwrap();
        assert_eq!(serde_json::to_value(&input).unwrap()["localizacao"], "B");
    }
}
