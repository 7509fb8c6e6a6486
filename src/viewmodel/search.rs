use super::ErrorNotice;
use crate::models::City;
use crate::repository::Repository;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinSet;
use tracing::warn;

/// Queries at or below this length never hit the remote geocoder.
const MIN_SEARCH_QUERY_LENGTH: usize = 2;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchViewState {
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    pub location_name: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchCommand {
    SelectLocation {
        location_name: String,
        latitude: f64,
        longitude: f64,
    },
    ShowError(ErrorNotice),
}

pub struct SearchViewModel {
    repository: Arc<Repository>,
    state: watch::Sender<SearchViewState>,
    commands: mpsc::UnboundedSender<SearchCommand>,
    tasks: Mutex<JoinSet<()>>,
}

impl SearchViewModel {
    /// Build the view model; the initial result list is the saved
    /// favourites. Returns the state and command receivers for the view.
    pub fn new(
        repository: Arc<Repository>,
    ) -> (
        Self,
        watch::Receiver<SearchViewState>,
        mpsc::UnboundedReceiver<SearchCommand>,
    ) {
        let favourites = favourite_results(&repository);
        let (state, state_rx) = watch::channel(SearchViewState {
            results: favourites,
        });
        let (commands, commands_rx) = mpsc::unbounded_channel();
        (
            Self {
                repository,
                state,
                commands,
                tasks: Mutex::new(JoinSet::new()),
            },
            state_rx,
            commands_rx,
        )
    }

    /// Invoked on every search submission. Long enough queries go to the
    /// remote geocoder; an empty query falls back to the favourites; anything
    /// in between clears the list.
    pub fn location_search_submitted(&self, search_string: &str) {
        if search_string.chars().count() > MIN_SEARCH_QUERY_LENGTH {
            let repository = Arc::clone(&self.repository);
            let state = self.state.clone();
            let commands = self.commands.clone();
            let query = search_string.to_string();
            self.tasks.lock().unwrap().spawn(async move {
                match repository.get_cities_by_name(&query).await {
                    Ok(cities) => {
                        let results = cities.iter().map(search_result).collect();
                        let _ = state.send(SearchViewState { results });
                    }
                    Err(err) => {
                        warn!(error = %err, "city search failed");
                        let _ = commands.send(SearchCommand::ShowError(ErrorNotice::generic()));
                    }
                }
            });
        } else if search_string.is_empty() {
            let _ = self.state.send(SearchViewState {
                results: favourite_results(&self.repository),
            });
        } else {
            let _ = self.state.send(SearchViewState::default());
        }
    }

    /// The user picked one of the results: clear the list and hand the
    /// chosen coordinates to whoever is listening.
    pub fn location_selected(&self, result: &SearchResult) {
        let _ = self.state.send(SearchViewState::default());
        let _ = self.commands.send(SearchCommand::SelectLocation {
            location_name: result.location_name.clone(),
            latitude: result.latitude,
            longitude: result.longitude,
        });
    }
}

fn favourite_results(repository: &Repository) -> Vec<SearchResult> {
    repository
        .favourite_cities()
        .borrow()
        .iter()
        .map(search_result)
        .collect()
}

fn search_result(city: &City) -> SearchResult {
    SearchResult {
        location_name: city.display_name(),
        latitude: city.latitude,
        longitude: city.longitude,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiTransport, TransportConfig, WeatherApi};
    use crate::db::Database;
    use std::time::Duration;
    use tokio::time::timeout;
    use wiremock::matchers::{method, path, query_param};
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

    #[tokio::test]
    async fn short_queries_never_contact_the_geocoder() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
            .expect(0)
            .mount(&server)
            .await;

        let repository = test_repository(&server.uri());
        let (vm, state_rx, _commands_rx) = SearchViewModel::new(repository);

        vm.location_search_submitted("Lo");
        assert!(state_rx.borrow().results.is_empty());
        vm.location_search_submitted("L");
        assert!(state_rx.borrow().results.is_empty());
    }

    #[tokio::test]
    async fn long_queries_issue_exactly_one_remote_call() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .and(query_param("q", "Lon"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"name": "London", "lat": 51.5085, "lon": -0.1257, "country": "GB"}]"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let repository = test_repository(&server.uri());
        let (vm, mut state_rx, _commands_rx) = SearchViewModel::new(repository);

        vm.location_search_submitted("Lon");
        timeout(RECV_TIMEOUT, state_rx.changed())
            .await
            .unwrap()
            .unwrap();

        let state = state_rx.borrow_and_update().clone();
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].location_name, "London, GB");
        assert_eq!(state.results[0].latitude, 51.5085);
    }

    #[tokio::test]
    async fn empty_query_falls_back_to_favourites() {
        let repository = test_repository("http://127.0.0.1:1");
        repository.save_favourite_city(&london()).unwrap();

        let (vm, state_rx, _commands_rx) = SearchViewModel::new(Arc::clone(&repository));
        assert_eq!(state_rx.borrow().results.len(), 1);

        vm.location_search_submitted("Lo");
        assert!(state_rx.borrow().results.is_empty());

        vm.location_search_submitted("");
        let state = state_rx.borrow().clone();
        assert_eq!(state.results.len(), 1);
        assert_eq!(state.results[0].location_name, "London, GB");
    }

    #[tokio::test]
    async fn selecting_a_result_clears_the_list_and_emits_command() {
        let repository = test_repository("http://127.0.0.1:1");
        repository.save_favourite_city(&london()).unwrap();

        let (vm, state_rx, mut commands_rx) = SearchViewModel::new(repository);
        let result = state_rx.borrow().results[0].clone();

        vm.location_selected(&result);
        assert!(state_rx.borrow().results.is_empty());
        let command = commands_rx.try_recv().unwrap();
        assert_eq!(
            command,
            SearchCommand::SelectLocation {
                location_name: "London, GB".into(),
                latitude: 51.5085,
                longitude: -0.1257,
            }
        );
    }

    #[tokio::test]
    async fn failed_search_emits_error_dialog() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let repository = test_repository(&server.uri());
        let (vm, _state_rx, mut commands_rx) = SearchViewModel::new(repository);

        vm.location_search_submitted("London");
        let command = timeout(RECV_TIMEOUT, commands_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(command, SearchCommand::ShowError(ErrorNotice::generic()));
    }
}
