use crate::config::Config;
use crate::models::City;
use crate::repository::Repository;
use crate::viewmodel::{
    DashboardCommand, DashboardViewModel, DashboardViewState, Destination, ErrorNotice,
    SearchCommand, SearchViewModel, SearchViewState,
};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Dashboard,
    Search,
}

/// Holds both view models, snapshots their state streams for rendering and
/// drains their one-shot command streams every tick. Contains no business
/// logic of its own; every user intent is forwarded to a view model.
pub struct App {
    pub screen: Screen,
    pub should_quit: bool,

    dashboard: DashboardViewModel,
    search: SearchViewModel,

    dashboard_state_rx: watch::Receiver<DashboardViewState>,
    dashboard_commands_rx: mpsc::UnboundedReceiver<DashboardCommand>,
    search_state_rx: watch::Receiver<SearchViewState>,
    search_commands_rx: mpsc::UnboundedReceiver<SearchCommand>,

    // Render snapshots, refreshed by `tick`
    pub dashboard_state: DashboardViewState,
    pub search_state: SearchViewState,

    // Search screen UI state
    pub search_input: String,
    pub search_selection: Option<usize>,

    pub error_notice: Option<ErrorNotice>,
}

impl App {
    pub fn new(config: &Config, repository: Arc<Repository>) -> Self {
        let default_location = City {
            name: config.location.name.clone(),
            state: config.location.state.clone(),
            country: config.location.country.clone(),
            latitude: config.location.latitude,
            longitude: config.location.longitude,
        };

        let (dashboard, dashboard_state_rx, dashboard_commands_rx) =
            DashboardViewModel::new(Arc::clone(&repository), default_location);
        let (search, search_state_rx, search_commands_rx) = SearchViewModel::new(repository);

        let dashboard_state = dashboard_state_rx.borrow().clone();
        let search_state = search_state_rx.borrow().clone();

        Self {
            screen: Screen::Dashboard,
            should_quit: false,
            dashboard,
            search,
            dashboard_state_rx,
            dashboard_commands_rx,
            search_state_rx,
            search_commands_rx,
            dashboard_state,
            search_state,
            search_input: String::new(),
            search_selection: None,
            error_notice: None,
        }
    }

    /// Pull pending state updates and commands from the view models.
    pub fn tick(&mut self) {
        if self.dashboard_state_rx.has_changed().unwrap_or(false) {
            self.dashboard_state = self.dashboard_state_rx.borrow_and_update().clone();
        }
        if self.search_state_rx.has_changed().unwrap_or(false) {
            self.search_state = self.search_state_rx.borrow_and_update().clone();
            // Keep the selection inside the new result list
            self.search_selection = match self.search_state.results.len() {
                0 => None,
                len => self.search_selection.map(|s| s.min(len - 1)),
            };
        }

        while let Ok(command) = self.dashboard_commands_rx.try_recv() {
            match command {
                DashboardCommand::Navigate(Destination::LocationSearch) => self.open_search(),
                DashboardCommand::ShowError(notice) => self.error_notice = Some(notice),
            }
        }
        while let Ok(command) = self.search_commands_rx.try_recv() {
            match command {
                SearchCommand::SelectLocation {
                    location_name,
                    latitude,
                    longitude,
                } => {
                    self.dashboard
                        .location_set(&location_name, latitude, longitude);
                    self.screen = Screen::Dashboard;
                }
                SearchCommand::ShowError(notice) => self.error_notice = Some(notice),
            }
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Dismiss a visible error notice. Returns false if none was showing.
    pub fn dismiss_error(&mut self) -> bool {
        self.error_notice.take().is_some()
    }

    fn open_search(&mut self) {
        self.screen = Screen::Search;
        self.search_input.clear();
        self.search_selection = None;
        // Show favourites until a query is submitted
        self.search.location_search_submitted("");
    }

    pub fn back_to_dashboard(&mut self) {
        self.screen = Screen::Dashboard;
    }

    // Dashboard intents

    pub fn search_clicked(&self) {
        self.dashboard.search_clicked();
    }

    pub fn favourite_toggle_clicked(&self) {
        self.dashboard.favourite_toggle_clicked();
    }

    pub fn refresh(&self) {
        self.dashboard.refresh();
    }

    // Search intents

    pub fn search_input_push(&mut self, c: char) {
        self.search_input.push(c);
        self.search_selection = None;
    }

    pub fn search_input_pop(&mut self) {
        self.search_input.pop();
        self.search_selection = None;
    }

    /// Enter on the search screen: with a highlighted result, pick it;
    /// otherwise submit whatever is in the input field.
    pub fn search_submitted(&mut self) {
        match self.search_selection {
            Some(index) => {
                if let Some(result) = self.search_state.results.get(index) {
                    self.search.location_selected(result);
                }
            }
            None => self.search.location_search_submitted(&self.search_input),
        }
    }

    pub fn search_selection_down(&mut self) {
        let len = self.search_state.results.len();
        if len == 0 {
            return;
        }
        self.search_selection = Some(match self.search_selection {
            None => 0,
            Some(current) => (current + 1).min(len - 1),
        });
    }

    pub fn search_selection_up(&mut self) {
        self.search_selection = match self.search_selection {
            None | Some(0) => None,
            Some(current) => Some(current - 1),
        };
    }
}
