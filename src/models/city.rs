/// A geocoded place, either returned by a search or saved as a favourite.
///
/// Identity is the coordinate pair; two cities at the same latitude and
/// longitude are the same location regardless of how they are labelled.
#[derive(Debug, Clone, PartialEq)]
pub struct City {
    pub name: String,
    pub state: Option<String>,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl City {
    /// Comma-separated display name, e.g. "London, GB" or "London, OH, US".
    pub fn display_name(&self) -> String {
        let mut parts = vec![self.name.as_str()];
        if let Some(ref state) = self.state {
            if !state.is_empty() {
                parts.push(state.as_str());
            }
        }
        if !self.country.is_empty() {
            parts.push(self.country.as_str());
        }
        parts.join(", ")
    }
}
