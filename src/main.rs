mod api;
mod app;
mod cli;
mod config;
mod db;
mod error;
mod models;
mod repository;
mod ui;
mod viewmodel;

use api::{ApiTransport, TransportConfig, WeatherApi};
use app::{App, Screen};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use db::Database;
use error::{Result, SkycastError};
use ratatui::{backend::CrosstermBackend, Terminal};
use repository::Repository;
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use ui::screens::{DashboardScreen, SearchScreen};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("skycast=debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Some(Commands::Init) = cli.command {
        Config::setup_interactive()?;
        return Ok(());
    }

    // Load configuration
    let config = match Config::load(cli.config.clone()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Run `skycast init` to set up.");
            std::process::exit(1);
        }
    };

    if let Some(Commands::Check) = cli.command {
        return check(&config).await;
    }

    // Wire the data layer: one transport, one database, one repository,
    // assembled here and passed down by reference.
    let db = Database::open(&Config::db_path(cli.data_dir.as_ref())?)?;
    let transport = ApiTransport::new(TransportConfig::from_config(&config))?;
    let api = WeatherApi::new(transport, config.api.units.clone());
    let repository = Arc::new(Repository::new(api, db)?);

    let mut app = App::new(&config, repository);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Validate the config and probe both API endpoints.
async fn check(config: &Config) -> Result<()> {
    let transport = ApiTransport::new(TransportConfig::from_config(config))?;
    let api = WeatherApi::new(transport, config.api.units.clone());

    match api.get_city_lat_lon(&config.location.name).await {
        Ok(matches) => println!("Geocoding: OK ({} match(es))", matches.len()),
        Err(e) => println!("Geocoding: FAILED ({})", e),
    }

    match api
        .get_weather_forecast(config.location.latitude, config.location.longitude)
        .await
    {
        Ok(forecast) => println!("Forecast:  OK ({} day(s))", forecast.daily.len()),
        Err(e) => println!("Forecast:  FAILED ({})", e),
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()>
where
    SkycastError: From<<B as ratatui::backend::Backend>::Error>,
{
    loop {
        // Deliver pending view-model updates before drawing
        app.tick();

        terminal.draw(|f| {
            let area = f.area();
            match app.screen {
                Screen::Dashboard => {
                    let screen = DashboardScreen::new(&app.dashboard_state)
                        .with_error(app.error_notice.as_ref());
                    f.render_widget(screen, area);
                }
                Screen::Search => {
                    let screen = SearchScreen::new(&app.search_state, &app.search_input)
                        .with_selection(app.search_selection)
                        .with_error(app.error_notice.as_ref());
                    f.render_widget(screen, area);
                }
            }
        })?;

        // Handle input with a timeout so async results keep flowing in
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                // An error notice swallows the next key press
                if app.dismiss_error() {
                    continue;
                }

                match key.code {
                    KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        app.quit();
                    }
                    _ => match app.screen {
                        Screen::Dashboard => handle_dashboard_input(app, key.code),
                        Screen::Search => handle_search_input(app, key.code),
                    },
                }
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_dashboard_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('s') => app.search_clicked(),
        KeyCode::Char('f') => app.favourite_toggle_clicked(),
        KeyCode::Char('r') => app.refresh(),
        _ => {}
    }
}

fn handle_search_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => app.back_to_dashboard(),
        KeyCode::Enter => app.search_submitted(),
        KeyCode::Backspace => app.search_input_pop(),
        KeyCode::Up => app.search_selection_up(),
        KeyCode::Down => app.search_selection_down(),
        KeyCode::Char(c) => app.search_input_push(c),
        _ => {}
    }
}
