use super::ErrorNotice;
use crate::error::SkycastError;
use crate::models::{City, CurrentWeather, WeatherForecast, WeatherPrediction};
use crate::repository::Repository;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::warn;

const TIME_FORMAT: &str = "%H:%M";
const DATE_TIME_FORMAT: &str = "%a, %-d %b %Y, %H:%M";
const DATE_FORMAT: &str = "%a, %-d %b";

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardViewState {
    pub location_name: String,
    pub location_favourite: bool,
    pub weather: Vec<WeatherInfo>,
}

/// One row of the dashboard: the current conditions block first, then one
/// entry per forecast day. All fields are display-ready strings; nothing
/// below the view model formats units.
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherInfo {
    Current(CurrentWeatherInfo),
    Daily(DailyWeatherInfo),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CurrentWeatherInfo {
    pub description: String,
    pub weather_icon_url: String,
    pub current_temperature: String,
    pub perceived_temperature: String,
    pub max_temp: String,
    pub min_temp: String,
    pub wind_speed: String,
    pub wind_angle: String,
    pub humidity_percent: String,
    pub visibility: String,
    pub pressure: String,
    pub sunrise: String,
    pub sunset: String,
    pub date_and_time: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyWeatherInfo {
    pub date: String,
    pub description: String,
    pub min_temp: String,
    pub max_temp: String,
    pub icon_url: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DashboardCommand {
    ShowError(ErrorNotice),
    Navigate(Destination),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    LocationSearch,
}

pub struct DashboardViewModel {
    repository: Arc<Repository>,
    state: watch::Sender<DashboardViewState>,
    commands: mpsc::UnboundedSender<DashboardCommand>,
    current_location: Mutex<City>,
    tasks: Mutex<JoinSet<()>>,
}

impl DashboardViewModel {
    /// Build the view model and immediately load weather for the default
    /// location. Returns the state and command receivers for the view.
    pub fn new(
        repository: Arc<Repository>,
        default_location: City,
    ) -> (
        Self,
        watch::Receiver<DashboardViewState>,
        mpsc::UnboundedReceiver<DashboardCommand>,
    ) {
        let (state, state_rx) = watch::channel(DashboardViewState::default());
        let (commands, commands_rx) = mpsc::unbounded_channel();
        let vm = Self {
            repository,
            state,
            commands,
            current_location: Mutex::new(default_location.clone()),
            tasks: Mutex::new(JoinSet::new()),
        };
        vm.location_set(
            &default_location.display_name(),
            default_location.latitude,
            default_location.longitude,
        );
        (vm, state_rx, commands_rx)
    }

    /// Invoked every time the user sets their location. Fetches weather and
    /// favourite status for the coordinates and replaces the view state; on
    /// failure the previous weather stays up under the new location name and
    /// a generic error dialog command is emitted.
    pub fn location_set(&self, location_name: &str, lat: f64, lon: f64) {
        *self.current_location.lock().unwrap() = parse_location(location_name, lat, lon);

        let repository = Arc::clone(&self.repository);
        let state = self.state.clone();
        let commands = self.commands.clone();
        let location_name = location_name.to_string();
        self.tasks.lock().unwrap().spawn(async move {
            let result = async {
                let forecast = repository.get_weather_by_coordinates(lat, lon).await?;
                let favourite = repository.is_favourite_city(lat, lon)?;
                Ok::<_, SkycastError>((forecast, favourite))
            }
            .await;

            match result {
                Ok((forecast, favourite)) => {
                    let _ = state.send(DashboardViewState {
                        location_name,
                        location_favourite: favourite,
                        weather: weather_info(&forecast),
                    });
                }
                Err(err) => {
                    warn!(error = %err, "failed to load weather");
                    state.send_modify(|s| s.location_name = location_name);
                    let _ = commands.send(DashboardCommand::ShowError(ErrorNotice::generic()));
                }
            }
        });
    }

    /// The user clicked the search action.
    pub fn search_clicked(&self) {
        let _ = self
            .commands
            .send(DashboardCommand::Navigate(Destination::LocationSearch));
    }

    /// Save or delete the current location depending on the displayed flag,
    /// then flip the flag on success.
    pub fn favourite_toggle_clicked(&self) {
        let was_favourite = self.state.borrow().location_favourite;
        let city = self.current_location.lock().unwrap().clone();

        let repository = Arc::clone(&self.repository);
        let state = self.state.clone();
        let commands = self.commands.clone();
        self.tasks.lock().unwrap().spawn(async move {
            let result = if was_favourite {
                repository.delete_favourite_city(&city)
            } else {
                repository.save_favourite_city(&city)
            };

            match result {
                Ok(()) => state.send_modify(|s| s.location_favourite = !was_favourite),
                Err(err) => {
                    warn!(error = %err, "failed to toggle favourite");
                    let _ = commands.send(DashboardCommand::ShowError(ErrorNotice::generic()));
                }
            }
        });
    }

    /// Re-fetch weather for the current location.
    pub fn refresh(&self) {
        let city = self.current_location.lock().unwrap().clone();
        self.location_set(&city.display_name(), city.latitude, city.longitude);
    }
}

/// Split a comma-separated location label back into its parts. Three parts
/// mean "name, state, country"; two mean "name, country".
fn parse_location(location_name: &str, lat: f64, lon: f64) -> City {
    let parts: Vec<&str> = location_name.split(',').map(str::trim).collect();
    let name = parts.first().copied().unwrap_or(location_name).to_string();
    let state = (parts.len() == 3).then(|| parts[1].to_string());
    let country = if parts.len() >= 2 {
        parts[parts.len() - 1].to_string()
    } else {
        String::new()
    };
    City {
        name,
        state,
        country,
        latitude: lat,
        longitude: lon,
    }
}

fn weather_info(forecast: &WeatherForecast) -> Vec<WeatherInfo> {
    let mut info = Vec::with_capacity(forecast.daily.len() + 1);
    info.push(WeatherInfo::Current(current_info(&forecast.current)));
    info.extend(
        forecast
            .daily
            .iter()
            .map(|prediction| WeatherInfo::Daily(daily_info(prediction))),
    );
    info
}

fn current_info(weather: &CurrentWeather) -> CurrentWeatherInfo {
    CurrentWeatherInfo {
        description: weather.description.clone(),
        weather_icon_url: weather.icon_large.clone(),
        current_temperature: format!("{}° C", weather.temperature.round() as i64),
        perceived_temperature: format!("{}°", weather.perceived_temp.round() as i64),
        max_temp: format!("{}° C", weather.max_temp.round() as i64),
        min_temp: format!("{}° C", weather.min_temp.round() as i64),
        wind_speed: format!("{} m/s", weather.wind_speed.round() as i64),
        wind_angle: format!("{}°", weather.wind_angle),
        humidity_percent: format!("{}%", weather.humidity),
        visibility: format!("{} m", weather.visibility),
        pressure: format!("{} hPa", weather.pressure),
        sunrise: weather.sunrise.format(TIME_FORMAT).to_string(),
        sunset: weather.sunset.format(TIME_FORMAT).to_string(),
        date_and_time: weather.timestamp.format(DATE_TIME_FORMAT).to_string(),
    }
}

fn daily_info(prediction: &WeatherPrediction) -> DailyWeatherInfo {
    DailyWeatherInfo {
        date: prediction.date.format(DATE_FORMAT).to_string(),
        description: prediction.description.clone(),
        min_temp: format!("{}°", prediction.min_temp.round() as i64),
        max_temp: format!("{}°", prediction.max_temp.round() as i64),
        icon_url: prediction.icon_small.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiTransport, TransportConfig, WeatherApi};
    use crate::db::Database;
    use chrono::DateTime;
    use std::time::Duration;
    use tokio::time::timeout;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RECV_TIMEOUT: Duration = Duration::from_secs(5);

    fn test_repository(base_url: &str) -> Arc<Repository> {
        let transport = ApiTransport::new(TransportConfig {
            base_url: base_url.to_string(),
            api_key: "test-key".to_string(),
            timeout: Duration::from_secs(1),
            cache_max_bytes: 10 * 1024 * 1024,
            online_max_age: Duration::from_secs(60),
            offline_max_stale: Duration::from_secs(86_400),
        })
        .unwrap();
        let api = WeatherApi::new(transport, "metric");
        Arc::new(Repository::new(api, Database::open_in_memory().unwrap()).unwrap())
    }

    fn london() -> City {
        City {
            name: "London".into(),
            state: None,
            country: "GB".into(),
            latitude: 51.5085,
            longitude: -0.1257,
        }
    }

    fn sample_current() -> CurrentWeather {
        CurrentWeather {
            description: "clear sky".into(),
            icon_small: "https://openweathermap.org/img/wn/01d@2x.png".into(),
            icon_large: "https://openweathermap.org/img/wn/01d@4x.png".into(),
            temperature: 282.55,
            perceived_temp: 281.86,
            min_temp: 279.43,
            max_temp: 284.93,
            pressure: 1023,
            humidity: 100,
            visibility: 16_093,
            wind_speed: 1.5,
            wind_angle: 350,
            timestamp: DateTime::from_timestamp(1_638_125_904, 0).unwrap(),
            sunrise: DateTime::from_timestamp(1_638_085_190, 0).unwrap(),
            sunset: DateTime::from_timestamp(1_638_115_049, 0).unwrap(),
        }
    }

    #[test]
    fn formats_current_weather_for_display() {
        let info = current_info(&sample_current());
        assert_eq!(info.current_temperature, "283° C");
        assert_eq!(info.perceived_temperature, "282°");
        assert_eq!(info.min_temp, "279° C");
        assert_eq!(info.max_temp, "285° C");
        assert_eq!(info.wind_speed, "2 m/s");
        assert_eq!(info.wind_angle, "350°");
        assert_eq!(info.humidity_percent, "100%");
        assert_eq!(info.visibility, "16093 m");
        assert_eq!(info.pressure, "1023 hPa");
        assert!(info.weather_icon_url.ends_with("01d@4x.png"));
        // 1638085190 is 07:39:50 UTC
        assert_eq!(info.sunrise, "07:39");
    }

    #[test]
    fn formats_daily_prediction_for_display() {
        let prediction = WeatherPrediction {
            description: "broken clouds".into(),
            icon_small: "https://openweathermap.org/img/wn/04d@2x.png".into(),
            icon_large: "https://openweathermap.org/img/wn/04d@4x.png".into(),
            min_temp: 0.81,
            max_temp: 4.32,
            date: DateTime::from_timestamp(1_638_097_200, 0).unwrap(),
        };
        let info = daily_info(&prediction);
        assert_eq!(info.min_temp, "1°");
        assert_eq!(info.max_temp, "4°");
        // 2021-11-28
        assert_eq!(info.date, "Sun, 28 Nov");
        assert!(info.icon_url.ends_with("04d@2x.png"));
    }

    #[test]
    fn parses_two_and_three_part_location_names() {
        let city = parse_location("London, GB", 51.5085, -0.1257);
        assert_eq!(city.name, "London");
        assert_eq!(city.state, None);
        assert_eq!(city.country, "GB");

        let city = parse_location("London, OH, US", 39.8865, -83.4483);
        assert_eq!(city.state.as_deref(), Some("OH"));
        assert_eq!(city.country, "US");
    }

    fn forecast_body() -> &'static str {
        r#"{
            "lat": 51.5085, "lon": -0.1257, "timezone": "Europe/London", "timezone_offset": 0,
            "current": {
                "dt": 1638125904, "sunrise": 1638085190, "sunset": 1638115049,
                "temp": 2.6, "feels_like": -0.82, "pressure": 1007, "humidity": 65,
                "dew_point": -2.93, "uvi": 0, "clouds": 100, "visibility": 10000,
                "wind_speed": 3.6, "wind_deg": 300,
                "weather": [{"id": 804, "main": "Clouds", "description": "overcast clouds", "icon": "04n"}]
            },
            "daily": [{
                "dt": 1638097200, "sunrise": 1638085190, "sunset": 1638115049,
                "moonrise": 0, "moonset": 1638106980, "moon_phase": 0.78,
                "temp": {"day": 2.92, "min": 0.81, "max": 4.32, "night": 1.61, "eve": 2.89, "morn": 1.41},
                "feels_like": {"day": -1.33, "night": -1.84, "eve": -0.13, "morn": -3.89},
                "pressure": 1006, "humidity": 56, "dew_point": -5.14,
                "wind_speed": 7.64, "wind_deg": 334,
                "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds", "icon": "04d"}],
                "clouds": 65, "pop": 0.13, "uvi": 0.58
            }]
        }"#
    }

    #[tokio::test]
    async fn loads_default_location_on_construction() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/onecall"))
            .respond_with(ResponseTemplate::new(200).set_body_string(forecast_body()))
            .mount(&server)
            .await;

        let repository = test_repository(&server.uri());
        let (_vm, mut state_rx, _commands_rx) = DashboardViewModel::new(repository, london());

        timeout(RECV_TIMEOUT, state_rx.changed())
            .await
            .unwrap()
            .unwrap();
        let state = state_rx.borrow_and_update().clone();
        assert_eq!(state.location_name, "London, GB");
        assert!(!state.location_favourite);
        // Current conditions plus one forecast day
        assert_eq!(state.weather.len(), 2);
        assert!(matches!(state.weather[0], WeatherInfo::Current(_)));
        assert!(matches!(state.weather[1], WeatherInfo::Daily(_)));
    }

    #[tokio::test]
    async fn favourite_toggle_saves_then_deletes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/onecall"))
            .respond_with(ResponseTemplate::new(200).set_body_string(forecast_body()))
            .mount(&server)
            .await;

        let repository = test_repository(&server.uri());
        let (vm, mut state_rx, _commands_rx) =
            DashboardViewModel::new(Arc::clone(&repository), london());
        timeout(RECV_TIMEOUT, state_rx.changed())
            .await
            .unwrap()
            .unwrap();

        vm.favourite_toggle_clicked();
        timeout(RECV_TIMEOUT, state_rx.changed())
            .await
            .unwrap()
            .unwrap();
        assert!(state_rx.borrow_and_update().location_favourite);
        assert!(repository.is_favourite_city(51.5085, -0.1257).unwrap());

        vm.favourite_toggle_clicked();
        timeout(RECV_TIMEOUT, state_rx.changed())
            .await
            .unwrap()
            .unwrap();
        assert!(!state_rx.borrow_and_update().location_favourite);
        assert!(!repository.is_favourite_city(51.5085, -0.1257).unwrap());
    }

    #[tokio::test]
    async fn failed_load_keeps_name_and_emits_error_dialog() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/onecall"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let repository = test_repository(&server.uri());
        let (_vm, mut state_rx, mut commands_rx) = DashboardViewModel::new(repository, london());

        let command = timeout(RECV_TIMEOUT, commands_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            command,
            DashboardCommand::ShowError(ErrorNotice::generic())
        );

        let state = state_rx.borrow_and_update().clone();
        assert_eq!(state.location_name, "London, GB");
        assert!(state.weather.is_empty());
    }

    #[tokio::test]
    async fn search_click_emits_navigation_command() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/onecall"))
            .respond_with(ResponseTemplate::new(200).set_body_string(forecast_body()))
            .mount(&server)
            .await;

        let repository = test_repository(&server.uri());
        let (vm, _state_rx, mut commands_rx) = DashboardViewModel::new(repository, london());

        vm.search_clicked();
        let command = timeout(RECV_TIMEOUT, commands_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            command,
            DashboardCommand::Navigate(Destination::LocationSearch)
        );
    }
}
