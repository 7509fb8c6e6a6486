use crate::ui::Theme;
use crate::viewmodel::{DashboardViewState, ErrorNotice, WeatherInfo};
use crate::viewmodel::dashboard::{CurrentWeatherInfo, DailyWeatherInfo};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Widget},
};

/// Renders the dashboard view state. All strings arrive pre-formatted from
/// the view model; this widget only lays them out.
pub struct DashboardScreen<'a> {
    pub state: &'a DashboardViewState,
    pub error: Option<&'a ErrorNotice>,
}

impl<'a> DashboardScreen<'a> {
    pub fn new(state: &'a DashboardViewState) -> Self {
        Self { state, error: None }
    }

    pub fn with_error(mut self, error: Option<&'a ErrorNotice>) -> Self {
        self.error = error;
        self
    }

    fn current(&self) -> Option<&CurrentWeatherInfo> {
        self.state.weather.iter().find_map(|info| match info {
            WeatherInfo::Current(current) => Some(current),
            WeatherInfo::Daily(_) => None,
        })
    }

    fn daily(&self) -> Vec<&DailyWeatherInfo> {
        self.state
            .weather
            .iter()
            .filter_map(|info| match info {
                WeatherInfo::Daily(daily) => Some(daily),
                WeatherInfo::Current(_) => None,
            })
            .collect()
    }
}

impl Widget for DashboardScreen<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),  // Header
                Constraint::Length(10), // Current conditions
                Constraint::Min(5),     // Daily forecast
                Constraint::Length(1),  // Error line
                Constraint::Length(1),  // Nav bar
            ])
            .split(area);

        self.render_header(chunks[0], buf);
        self.render_current(chunks[1], buf);
        self.render_forecast(chunks[2], buf);
        self.render_error(chunks[3], buf);
        self.render_nav(chunks[4], buf);
    }
}

impl DashboardScreen<'_> {
    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let marker = if self.state.location_favourite {
            Span::styled("★ ", Theme::favourite())
        } else {
            Span::styled("☆ ", Theme::dim())
        };
        let title = Line::from(vec![
            marker,
            Span::styled(self.state.location_name.clone(), Theme::title()),
        ]);

        let block = Block::default()
            .title(title)
            .borders(Borders::BOTTOM)
            .border_style(Theme::border());

        let updated = self
            .current()
            .map(|current| current.date_and_time.clone())
            .unwrap_or_else(|| "No data yet".to_string());
        Paragraph::new(Span::styled(updated, Theme::dim()))
            .block(block)
            .render(area, buf);
    }

    fn render_current(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Current conditions", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());
        let inner = block.inner(area);
        block.render(area, buf);

        let Some(current) = self.current() else {
            Paragraph::new(Span::styled("-", Theme::dim())).render(inner, buf);
            return;
        };

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
            .split(inner);

        let summary = vec![
            Line::from(Span::styled(
                current.current_temperature.clone(),
                Theme::highlight(),
            )),
            Line::from(Span::styled(
                format!("feels like {}", current.perceived_temperature),
                Theme::dim(),
            )),
            Line::from(Span::styled(current.description.clone(), Theme::normal())),
        ];
        Paragraph::new(summary).render(columns[0], buf);

        let details = vec![
            detail_line("Min / Max", format!("{} / {}", current.min_temp, current.max_temp)),
            detail_line("Wind", format!("{} {}", current.wind_speed, current.wind_angle)),
            detail_line("Humidity", current.humidity_percent.clone()),
            detail_line("Pressure", current.pressure.clone()),
            detail_line("Visibility", current.visibility.clone()),
            detail_line("Sunrise", current.sunrise.clone()),
            detail_line("Sunset", current.sunset.clone()),
        ];
        Paragraph::new(details).render(columns[1], buf);
    }

    fn render_forecast(&self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .title(Span::styled("Daily forecast", Theme::header()))
            .borders(Borders::ALL)
            .border_style(Theme::border());

        let items: Vec<ListItem> = self
            .daily()
            .into_iter()
            .map(|day| {
                ListItem::new(Line::from(vec![
                    Span::styled(format!("{:<14}", day.date), Theme::normal()),
                    Span::styled(
                        format!("{:>5} / {:<5}", day.min_temp, day.max_temp),
                        Theme::highlight(),
                    ),
                    Span::raw("  "),
                    Span::styled(day.description.clone(), Theme::dim()),
                ]))
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
            Span::styled("[s]", Theme::nav_key()),
            Span::styled(" search  ", Theme::nav_label()),
            Span::styled("[f]", Theme::nav_key()),
            Span::styled(" favourite  ", Theme::nav_label()),
            Span::styled("[r]", Theme::nav_key()),
            Span::styled(" refresh  ", Theme::nav_label()),
            Span::styled("[q]", Theme::nav_key()),
            Span::styled(" quit", Theme::nav_label()),
        ]);
        Paragraph::new(nav).render(area, buf);
    }
}

fn detail_line(label: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<12}", label), Theme::dim()),
        Span::styled(value, Theme::normal()),
    ])
}
