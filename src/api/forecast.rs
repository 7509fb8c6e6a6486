//! Request template and wire types for the one-call forecast endpoint.

use serde::Deserialize;

pub const FORECAST_PATH: &str = "/data/2.5/onecall";

/// Query parameters for a forecast request. Minutely/hourly blocks and alerts
/// are excluded; only the current conditions and the daily outlook are used.
pub fn forecast_query(lat: f64, lon: f64, units: &str) -> Vec<(&'static str, String)> {
    vec![
        ("lat", lat.to_string()),
        ("lon", lon.to_string()),
        ("units", units.to_string()),
        ("exclude", "minutely,hourly,alerts".to_string()),
    ]
}

// Wire-shape mirrors of the one-call response. Fields the domain model drops
// (moon phases, dew point, precipitation volumes) are still deserialized so a
// schema change upstream surfaces here and not somewhere deeper.

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[allow(dead_code)]
pub struct ForecastDto {
    pub lat: f64,
    pub lon: f64,
    pub timezone: String,
    pub timezone_offset: i64,
    pub current: CurrentDto,
    pub daily: Vec<DailyDto>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[allow(dead_code)]
pub struct CurrentDto {
    pub dt: i64,
    pub sunrise: i64,
    pub sunset: i64,
    pub temp: f64,
    pub feels_like: f64,
    pub pressure: u32,
    pub humidity: u32,
    pub dew_point: f64,
    pub uvi: f64,
    pub clouds: u32,
    #[serde(default)]
    pub visibility: u32,
    pub wind_speed: f64,
    pub wind_deg: u32,
    #[serde(default)]
    pub wind_gust: Option<f64>,
    pub weather: Vec<ConditionDto>,
    #[serde(default)]
    pub rain: Option<PrecipitationDto>,
    #[serde(default)]
    pub snow: Option<PrecipitationDto>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[allow(dead_code)]
pub struct DailyDto {
    pub dt: i64,
    pub sunrise: i64,
    pub sunset: i64,
    pub moonrise: i64,
    pub moonset: i64,
    pub moon_phase: f64,
    pub temp: DailyTempDto,
    pub feels_like: DailyFeelsLikeDto,
    pub pressure: u32,
    pub humidity: u32,
    pub dew_point: f64,
    pub wind_speed: f64,
    pub wind_deg: u32,
    #[serde(default)]
    pub wind_gust: Option<f64>,
    pub weather: Vec<ConditionDto>,
    pub clouds: u32,
    pub pop: f64,
    #[serde(default)]
    pub rain: Option<f64>,
    #[serde(default)]
    pub snow: Option<f64>,
    pub uvi: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[allow(dead_code)]
pub struct DailyTempDto {
    pub day: f64,
    pub min: f64,
    pub max: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[allow(dead_code)]
pub struct DailyFeelsLikeDto {
    pub day: f64,
    pub night: f64,
    pub eve: f64,
    pub morn: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[allow(dead_code)]
pub struct ConditionDto {
    pub id: i64,
    pub main: String,
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[allow(dead_code)]
pub struct PrecipitationDto {
    #[serde(rename = "1h", default)]
    pub last_hour: Option<f64>,
    #[serde(rename = "3h", default)]
    pub last_three_hours: Option<f64>,
}


#[cfg(test)]
mod tests {
    use super::fixtures::FORECAST_FIXTURE;
    use super::*;

    #[test]
    fn deserializes_one_call_response() {
        let dto: ForecastDto = serde_json::from_str(FORECAST_FIXTURE).unwrap();
        assert_eq!(dto.timezone, "Europe/London");
        assert_eq!(dto.current.dt, 1_638_125_904);
        assert_eq!(dto.current.pressure, 1007);
        assert_eq!(dto.current.weather[0].icon, "04n");
        assert_eq!(dto.current.wind_gust, None);
        assert_eq!(dto.daily.len(), 1);
        assert_eq!(dto.daily[0].temp.min, 0.81);
        assert_eq!(dto.daily[0].wind_gust, Some(15.7));
        assert_eq!(dto.daily[0].rain, None);
    }

    #[test]
    fn missing_visibility_defaults_to_zero() {
        // The API omits visibility in some conditions.
        let fixture = FORECAST_FIXTURE.replacen(r#""visibility": 10000,"#, "", 1);
        let dto: ForecastDto = serde_json::from_str(&fixture).unwrap();
        assert_eq!(dto.current.visibility, 0);
    }

    #[test]
    fn forecast_query_carries_coordinates_and_units() {
        let query = forecast_query(37.39, -122.08, "metric");
        assert!(query.contains(&("lat", "37.39".to_string())));
        assert!(query.contains(&("lon", "-122.08".to_string())));
        assert!(query.contains(&("units", "metric".to_string())));
        assert!(query.contains(&("exclude", "minutely,hourly,alerts".to_string())));
    }
}
