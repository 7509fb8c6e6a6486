pub mod dashboard;
pub mod search;

pub use dashboard::DashboardScreen;
pub use search::SearchScreen;
