//! Request template and wire types for the direct geocoding endpoint.

use serde::Deserialize;

pub const GEOCODING_PATH: &str = "/geo/1.0/direct";

const RESULT_LIMIT: u32 = 5;

pub fn geocoding_query(city_name: &str) -> Vec<(&'static str, String)> {
    vec![
        ("q", city_name.to_string()),
        ("limit", RESULT_LIMIT.to_string()),
    ]
}

/// One geocoding match. Every field is optional on the wire; records missing
/// name or coordinates are dropped during domain mapping.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LocationDto {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub lat: Option<f64>,
    #[serde(default)]
    pub lon: Option<f64>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}
