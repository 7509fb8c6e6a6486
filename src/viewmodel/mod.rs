//! Per-screen state holders.
//!
//! Each view model exposes two channels: a `watch` state stream that replays
//! the latest view state to whoever subscribes, and an `mpsc` command stream
//! for one-shot effects (navigation, dialogs). Keeping them separate means a
//! view re-reading the state after a redraw can never re-trigger a dialog.
//! In-flight work is spawned into a `JoinSet` owned by the view model, so
//! dropping the view model cancels whatever it still had running.

pub mod dashboard;
pub mod search;

pub use dashboard::{
    DashboardCommand, DashboardViewModel, DashboardViewState, Destination, WeatherInfo,
};
pub use search::{SearchCommand, SearchResult, SearchViewModel, SearchViewState};

/// Payload of a one-shot error dialog command. Transport, deserialization
/// and persistence failures all surface as this one generic notice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub title: String,
    pub message: String,
}

impl ErrorNotice {
    pub fn generic() -> Self {
        Self {
            title: "Something went wrong".into(),
            message: "Could not load data. Check your connection and try again.".into(),
        }
    }
}
