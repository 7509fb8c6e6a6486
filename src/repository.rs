use crate::api::forecast::{DailyDto, ForecastDto};
use crate::api::{LocationDto, WeatherApi};
use crate::db::{Database, FavouriteCity};
use crate::error::{Result, SkycastError};
use crate::models::{City, CurrentWeather, WeatherForecast, WeatherPrediction};
use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::warn;

const ICON_BASE_URL: &str = "https://openweathermap.org/img/wn/";
const ICON_SMALL_SUFFIX: &str = "@2x.png";
const ICON_LARGE_SUFFIX: &str = "@4x.png";

/// Point of contact between the data layer and the presentation layer.
///
/// Merges the remote weather API and the local favourites store and maps
/// wire-level DTOs into domain entities, so nothing above this module sees a
/// wire shape. Failures from either side propagate unchanged; translating
/// them into something displayable is the view models' job.
pub struct Repository {
    api: WeatherApi,
    db: Database,
    favourites: watch::Sender<Vec<City>>,
}

impl Repository {
    pub fn new(api: WeatherApi, db: Database) -> Result<Self> {
        let initial = db
            .get_favourite_cities()?
            .into_iter()
            .map(record_to_city)
            .collect();
        let (favourites, _) = watch::channel(initial);
        Ok(Self {
            api,
            db,
            favourites,
        })
    }

    /// Geocode a city name. Results missing a name or coordinates are
    /// dropped rather than mapped into malformed cities.
    pub async fn get_cities_by_name(&self, city_name: &str) -> Result<Vec<City>> {
        let locations = self.api.get_city_lat_lon(city_name).await?;
        Ok(locations.into_iter().filter_map(city_from_dto).collect())
    }

    pub async fn get_weather_by_coordinates(&self, lat: f64, lon: f64) -> Result<WeatherForecast> {
        let dto = self.api.get_weather_forecast(lat, lon).await?;
        forecast_from_dto(dto)
    }

    pub fn save_favourite_city(&self, city: &City) -> Result<()> {
        self.db.insert_favourite_city(&city_to_record(city))?;
        self.publish_favourites()
    }

    pub fn delete_favourite_city(&self, city: &City) -> Result<()> {
        self.db
            .delete_favourite_city(city.latitude, city.longitude)?;
        self.publish_favourites()
    }

    /// Live view of the favourites list. The receiver replays the latest
    /// value on subscription and is notified after every mutation; identical
    /// consecutive values are not re-emitted.
    pub fn favourite_cities(&self) -> watch::Receiver<Vec<City>> {
        self.favourites.subscribe()
    }

    pub fn is_favourite_city(&self, lat: f64, lon: f64) -> Result<bool> {
        Ok(self
            .db
            .get_favourite_city_by_coordinates(lat, lon)?
            .is_some())
    }

    fn publish_favourites(&self) -> Result<()> {
        let cities: Vec<City> = self
            .db
            .get_favourite_cities()?
            .into_iter()
            .map(record_to_city)
            .collect();
        self.favourites.send_if_modified(move |current| {
            if *current == cities {
                false
            } else {
                *current = cities;
                true
            }
        });
        Ok(())
    }
}

fn city_from_dto(dto: LocationDto) -> Option<City> {
    let name = dto.name?;
    let latitude = dto.lat?;
    let longitude = dto.lon?;
    Some(City {
        name,
        state: dto.state,
        country: dto.country.unwrap_or_default(),
        latitude,
        longitude,
    })
}

fn city_to_record(city: &City) -> FavouriteCity {
    FavouriteCity {
        name: city.name.clone(),
        state: city.state.clone(),
        country: city.country.clone(),
        latitude: city.latitude,
        longitude: city.longitude,
    }
}

fn record_to_city(record: FavouriteCity) -> City {
    City {
        name: record.name,
        state: record.state,
        country: record.country,
        latitude: record.latitude,
        longitude: record.longitude,
    }
}

fn forecast_from_dto(dto: ForecastDto) -> Result<WeatherForecast> {
    let conditions = dto.current.weather.first().ok_or_else(|| {
        SkycastError::InvalidData("forecast response has no current weather conditions".into())
    })?;
    let today = dto.daily.first().ok_or_else(|| {
        SkycastError::InvalidData("forecast response has no daily entries".into())
    })?;

    let current = CurrentWeather {
        description: conditions.description.clone(),
        icon_small: icon_url(&conditions.icon, ICON_SMALL_SUFFIX),
        icon_large: icon_url(&conditions.icon, ICON_LARGE_SUFFIX),
        temperature: dto.current.temp,
        perceived_temp: dto.current.feels_like,
        min_temp: today.temp.min,
        max_temp: today.temp.max,
        pressure: dto.current.pressure,
        humidity: dto.current.humidity,
        visibility: dto.current.visibility,
        wind_speed: dto.current.wind_speed,
        wind_angle: dto.current.wind_deg,
        timestamp: datetime_from_epoch(dto.current.dt),
        sunrise: datetime_from_epoch(dto.current.sunrise),
        sunset: datetime_from_epoch(dto.current.sunset),
    };

    let daily = dto.daily.iter().filter_map(prediction_from_dto).collect();

    Ok(WeatherForecast { current, daily })
}

fn prediction_from_dto(dto: &DailyDto) -> Option<WeatherPrediction> {
    let Some(conditions) = dto.weather.first() else {
        warn!(dt = dto.dt, "daily entry without weather conditions, skipping");
        return None;
    };
    Some(WeatherPrediction {
        description: conditions.description.clone(),
        icon_small: icon_url(&conditions.icon, ICON_SMALL_SUFFIX),
        icon_large: icon_url(&conditions.icon, ICON_LARGE_SUFFIX),
        min_temp: dto.temp.min,
        max_temp: dto.temp.max,
        date: datetime_from_epoch(dto.dt),
    })
}

fn icon_url(code: &str, suffix: &str) -> String {
    format!("{}{}{}", ICON_BASE_URL, code, suffix)
}

fn datetime_from_epoch(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap_or_default()
}
