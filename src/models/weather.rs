use chrono::{DateTime, Utc};

/// Current conditions plus the multi-day outlook for one location.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherForecast {
    pub current: CurrentWeather,
    pub daily: Vec<WeatherPrediction>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeather {
    pub description: String,
    pub icon_small: String,
    pub icon_large: String,
    pub temperature: f64,
    pub perceived_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub pressure: u32,
    pub humidity: u32,
    pub visibility: u32,
    pub wind_speed: f64,
    pub wind_angle: u32,
    pub timestamp: DateTime<Utc>,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
}

/// One forecast day.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherPrediction {
    pub description: String,
    pub icon_small: String,
    pub icon_large: String,
    pub min_temp: f64,
    pub max_temp: f64,
    pub date: DateTime<Utc>,
}
