use chrono::{DateTime, NaiveDateTime};

/// Truncate a string to a maximum number of characters, adding ellipsis if needed
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Case-insensitive substring test. An empty needle matches everything.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Format a server timestamp as `dd/mm/yyyy HH:MM`.
/// The server sends either RFC 3339 or a naive local `yyyy-mm-ddTHH:MM:SS[.fff]`.
pub fn format_date_time(value: &str) -> String {
    const OUT: &str = "%d/%m/%Y %H:%M";

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return dt.format(OUT).to_string();
    }
    for pattern in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, pattern) {
            return dt.format(OUT).to_string();
        }
    }
    value.to_string()
}

pub fn format_coordinates(lat: f64, lon: f64) -> String {
    format!("{:.5}, {:.5}", lat, lon)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello", 10), "Hello");
        assert_eq!(truncate("Hello World", 8), "Hello...");
        assert_eq!(truncate("Hi", 2), "Hi");
        assert_eq!(truncate("Crítico demais", 7), "Crít...");
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Chuva Forte", "chuva"));
        assert!(contains_ignore_case("anything", ""));
        assert!(!contains_ignore_case("Vento", "chuva"));
    }

    #[test]
    fn test_format_date_time() {
        assert_eq!(format_date_time("2024-05-01T10:30:00"), "01/05/2024 10:30");
        assert_eq!(format_date_time("2024-05-01T10:30:00.123"), "01/05/2024 10:30");
        assert_eq!(format_date_time("2024-05-01T10:30:00-03:00"), "01/05/2024 10:30");
        assert_eq!(format_date_time("ontem"), "ontem");
    }

    #[test]
    fn test_format_coordinates() {
        assert_eq!(format_coordinates(-8.05, -34.9), "-8.05000, -34.90000");
    }
}
