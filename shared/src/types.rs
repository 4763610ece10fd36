//! Common types used across the platform

use serde::{Deserialize, Serialize};

/// GPS coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Whether both components fall inside the WGS84 ranges
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Place names resolved from coordinates
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlaceName {
    pub city: String,
    pub state: String,
}

impl PlaceName {
    pub fn unknown() -> Self {
        Self {
            city: "Unknown".to_string(),
            state: "Unknown".to_string(),
        }
    }
}

/// Truncate text to at most `max` characters, appending an ellipsis when cut
pub fn clamp_text(input: &str, max: usize) -> String {
    if input.chars().count() <= max {
        return input.to_string();
    }
    let mut out: String = input.chars().take(max).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_bounds() {
        assert!(Coordinates::new(30.901, 75.8573).is_valid());
        assert!(!Coordinates::new(91.0, 10.0).is_valid());
        assert!(!Coordinates::new(10.0, -181.0).is_valid());
    }

    #[test]
    fn test_clamp_text() {
        assert_eq!(clamp_text("short", 10), "short");
        assert_eq!(clamp_text("abcdef", 3), "abc…");
    }
}
