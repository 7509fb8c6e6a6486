pub mod forecast;
pub mod geocoding;
pub mod transport;

pub use forecast::ForecastDto;
pub use geocoding::LocationDto;
pub use transport::{ApiTransport, TransportConfig};

use crate::error::Result;

/// REST facade composing the forecast and geocoding clients behind one
/// interface. Transport and deserialization failures propagate unchanged.
pub struct WeatherApi {
    transport: ApiTransport,
    units: String,
}

impl WeatherApi {
    pub fn new(transport: ApiTransport, units: impl Into<String>) -> Self {
        Self {
            transport,
            units: units.into(),
        }
    }

    /// One-call forecast for a coordinate pair.
    pub async fn get_weather_forecast(&self, lat: f64, lon: f64) -> Result<ForecastDto> {
        let body = self
            .transport
            .get(
                forecast::FORECAST_PATH,
                &forecast::forecast_query(lat, lon, &self.units),
            )
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }

    /// Direct geocoding lookup. An empty list means the API found no match;
    /// that is not an error.
    pub async fn get_city_lat_lon(&self, city_name: &str) -> Result<Vec<LocationDto>> {
        let body = self
            .transport
            .get(
                geocoding::GEOCODING_PATH,
                &geocoding::geocoding_query(city_name),
            )
            .await?;
        Ok(serde_json::from_slice(&body)?)
    }
}
