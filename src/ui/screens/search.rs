use crate::ui::Theme;
use crate::viewmodel::{ErrorNotice, SearchViewState};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget},
};

/// Renders the location search screen: the query being typed, the result
/// list (favourites until a search is submitted) and the key hints.
pub struct SearchScreen<'a> {
    pub state: &'a SearchViewState,
    pub input: &'a str,
    pub selected: Option<usize>,
    pub error: Option<&'a ErrorNotice>,
}

impl<'a> SearchScreen<'a> {
    pub fn new(state: &'a SearchViewState, input: &'a str) -> Self {
        Self {
            state,
            input,
            selected: None,
            error: None,
        }
    }

    pub fn with_selection(mut self, selected: Option<usize>) -> Self {
        self.selected = selected;
        self
    }

    pub fn with_error(mut self, error: Option<&'a ErrorNotice>) -> Self {
        self.error = error;
        self
    }
}

impl Widget for SearchScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Query input
                Constraint::Min(3),    // Results
                Constraint::Length(1), // Error line
                Constraint::Length(1), // Nav bar
            ])
            .split(area);

        self.render_input(chunks[0], buf);
        self.render_results(chunks[1], buf);
        self.render_error(chunks[2], buf);
        self.render_nav(chunks[3], buf);
    }
}

impl SearchScreen<'_> {
    fn render_input(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Search location", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border_focused());

        let line = Line::from(vec![
            Span::styled(self.input.to_string(), Theme::normal()),
            Span::styled("_", Theme::dim()),
        ]);
        Paragraph::new(line).block(block).render(area, buf);
    }

    fn render_results(&self, area: Rect, buf: &mut Buffer) {
        let title = if self.input.is_empty() {
            "Favourites"
        } else {
            "Results"
        };
        let block = Block::default()
            .title(Span::styled(title, Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let items: Vec<ListItem> = self
            .state
            .results
            .iter()
            .enumerate()
            .map(|(i, result)| {
                let style = if self.selected == Some(i) {
                    Theme::selected()
                } else {
                    Theme::normal()
                };
                ListItem::new(Line::from(Span::styled(
                    format!(
                        "{}  ({:.4}, {:.4})",
                        result.location_name, result.latitude, result.longitude
                    ),
                    style,
                )))
            })
            .collect();

        List::new(items).block(block).render(area, buf);
    }

    fn render_error(&self, area: Rect, buf: &mut Buffer) {
        if let Some(error) = self.error {
            let line = Line::from(vec![
                Span::styled(format!("{}: ", error.title), Theme::error()),
                Span::styled(error.message.clone(), Theme::normal()),
                Span::styled(" (press any key)", Theme::dim()),
            ]);
            Paragraph::new(line).render(area, buf);
        }
    }

    fn render_nav(&self, area: Rect, buf: &mut Buffer) {
        let nav = Line::from(vec![
            Span::styled("[enter]", Theme::nav_key()),
            Span::styled(" search/select  ", Theme::nav_label()),
            Span::styled("[↑/↓]", Theme::nav_key()),
            Span::styled(" choose  ", Theme::nav_label()),
            Span::styled("[esc]", Theme::nav_key()),
            Span::styled(" back", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(area, buf);
    }
}
