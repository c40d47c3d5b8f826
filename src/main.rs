mod app;
mod cli;
mod config;
mod datasources;
mod error;
mod logic;
mod models;
mod ui;

use app::{App, Completion, FormState};
use clap::Parser;
use cli::{Cli, Commands};
use config::{Config, WeatherSourceKind};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use datasources::{AdvisoryClient, IpApiClient, OpenMeteoClient};
use error::{Result, YoncaError};
use logic::wizard::RESOLUTION_FAILED_NOTICE;
use logic::{ConfiguredWeatherSource, Effect, LocationWeatherResolver, Resolution, WizardStep};
use models::ChatRequest;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    text::Span,
    widgets::Paragraph,
    Frame, Terminal,
};
use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};
use tracing_subscriber::EnvFilter;
use ui::components::StepProgress;
use ui::screens::{DetailsScreen, FarmTypeScreen, ResultsScreen, WeatherScreen};
use ui::Theme;

type Resolver = LocationWeatherResolver<ConfiguredWeatherSource>;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose, cli.command.is_none());

    match cli.command {
        Some(Commands::Init) => {
            let (_, path) = Config::setup_interactive()?;
            println!("Config written to {}", path.display());
            return Ok(());
        }
        Some(Commands::Check) => return run_check(cli.config.as_ref()).await,
        Some(Commands::Weather) => return run_weather(cli.config.as_ref()).await,
        Some(Commands::Chat { message, session }) => {
            return run_chat(cli.config.as_ref(), message, session).await
        }
        None => {}
    }

    // Load configuration
    let config = match Config::load(cli.config.as_ref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            eprintln!("Run `yonca init` to create a config file");
            std::process::exit(1);
        }
    };

    let advisory = AdvisoryClient::new(&config.api)?;
    let source = ConfiguredWeatherSource::from_config(&config, &advisory)?;
    let resolver = Arc::new(LocationWeatherResolver::new(source, config.api.timeout()));
    tracing::info!(base_url = %config.api.base_url, source = ?config.weather.source, "Starting wizard");

    let mut app = App::new(&config);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, &advisory, &resolver).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// The TUI owns stderr's terminal, so its logs go to a file instead.
fn init_logging(verbose: u8, tui: bool) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if !tui {
        builder.with_writer(io::stderr).init();
        return;
    }

    let log_file = Config::log_path().and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(YoncaError::from)
    });
    match log_file {
        Ok(file) => builder
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init(),
        Err(_) => builder.with_writer(io::sink).init(),
    }
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    advisory: &AdvisoryClient,
    resolver: &Arc<Resolver>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Completion>();

    loop {
        terminal.draw(|f| draw(f, app))?;

        // Apply finished network work before reading input
        while let Ok(completion) = rx.try_recv() {
            app.complete(completion);
        }

        // Handle input with timeout so completions keep flowing
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, key.code, key.modifiers);
                }
            }
        }

        for effect in app.take_effects() {
            spawn_effect(effect, advisory, resolver, &tx);
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn spawn_effect(
    effect: Effect,
    advisory: &AdvisoryClient,
    resolver: &Arc<Resolver>,
    tx: &UnboundedSender<Completion>,
) {
    match effect {
        Effect::None => {}
        Effect::ResolveWeather(ticket) => {
            let resolver = Arc::clone(resolver);
            let tx = tx.clone();
            tokio::spawn(async move {
                let resolution = resolver.resolve().await;
                let _ = tx.send(Completion::Weather(ticket, resolution));
            });
        }
        Effect::Submit(ticket, request) => {
            let client = advisory.clone();
            let tx = tx.clone();
            tokio::spawn(async move {
                let outcome = client.recommend(&request).await;
                let _ = tx.send(Completion::Recommendation(ticket, outcome));
            });
        }
    }
}

fn draw(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Progress
            Constraint::Min(10),   // Step screen
            Constraint::Length(1), // Status
        ])
        .split(f.area());

    let state = app.state();
    f.render_widget(
        StepProgress::new(state.step).busy(state.is_busy()),
        chunks[0],
    );

    match state.step {
        WizardStep::FarmType => {
            let screen = FarmTypeScreen::new(app.farm_state.selected_index)
                .with_choice(state.farm_type, state.details_entered);
            f.render_widget(screen, chunks[1]);
        }
        WizardStep::Weather => {
            let form = &app.weather_state;
            let screen = WeatherScreen::new(state)
                .with_focus(form.focused_field)
                .editing(form.editing, &form.edit_buffer);
            f.render_widget(screen, chunks[1]);
        }
        WizardStep::Details => {
            let form = &app.details_state;
            let screen = DetailsScreen::new(state)
                .with_focus(form.focused_field)
                .editing(form.editing, &form.edit_buffer);
            f.render_widget(screen, chunks[1]);
        }
        WizardStep::Results => {
            if let Some(ref response) = state.result {
                let screen = ResultsScreen::new(response).with_scroll(app.results_state.scroll);
                f.render_widget(screen, chunks[1]);
            }
        }
    }

    if let Some(ref status) = app.status_message {
        f.render_widget(
            Paragraph::new(Span::styled(status.as_str(), Theme::dim())),
            chunks[2],
        );
    }
}

fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if code == KeyCode::Char('c') && modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    if app.is_editing() {
        handle_edit_input(app, code);
        return;
    }

    match code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Char('x') => app.reset(),
        _ => match app.state().step {
            WizardStep::FarmType => handle_farm_type_input(app, code),
            WizardStep::Weather => handle_weather_input(app, code),
            WizardStep::Details => handle_details_input(app, code),
            WizardStep::Results => handle_results_input(app, code),
        },
    }
}

fn handle_edit_input(app: &mut App, code: KeyCode) {
    match app.state().step {
        WizardStep::Weather => match code {
            KeyCode::Enter => app.commit_weather_edit(),
            other => edit_buffer(&mut app.weather_state, other),
        },
        WizardStep::Details => match code {
            KeyCode::Enter => app.commit_details_edit(),
            other => edit_buffer(&mut app.details_state, other),
        },
        _ => {}
    }
}

fn edit_buffer<F: Copy + PartialEq>(form: &mut FormState<F>, code: KeyCode) {
    match code {
        KeyCode::Esc => form.cancel_editing(),
        KeyCode::Backspace => {
            form.edit_buffer.pop();
        }
        KeyCode::Char(c) if c.is_ascii_digit() || matches!(c, '-' | '.' | ',') => {
            form.edit_buffer.push(c);
        }
        _ => {}
    }
}

fn handle_farm_type_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Up => app.farm_state.prev(),
        KeyCode::Down => app.farm_state.next(),
        KeyCode::Enter | KeyCode::Char('n') => app.choose_farm_type(),
        _ => {}
    }
}

fn handle_weather_input(app: &mut App, code: KeyCode) {
    let fields = app.weather_fields();
    match code {
        KeyCode::Up | KeyCode::BackTab => app.weather_state.prev_field(fields),
        KeyCode::Down | KeyCode::Tab => app.weather_state.next_field(fields),
        KeyCode::Left => app.adjust_weather(false),
        KeyCode::Right => app.adjust_weather(true),
        KeyCode::Enter => app.activate_weather_field(),
        KeyCode::Char('m') => app.toggle_weather_mode(),
        KeyCode::Char('r') => app.refresh_weather(),
        KeyCode::Char('d') => app.dismiss_notice(),
        KeyCode::Char('n') => app.next_step(),
        KeyCode::Esc | KeyCode::Char('b') => app.back_step(),
        _ => {}
    }
}

fn handle_details_input(app: &mut App, code: KeyCode) {
    let fields = app.details_fields();
    match code {
        KeyCode::Up | KeyCode::BackTab => app.details_state.prev_field(fields),
        KeyCode::Down | KeyCode::Tab => app.details_state.next_field(fields),
        KeyCode::Left if !fields.is_empty() => app.adjust_details(false),
        KeyCode::Right if !fields.is_empty() => app.adjust_details(true),
        KeyCode::Enter if !fields.is_empty() => app.activate_details_field(),
        KeyCode::Char('d') => app.dismiss_notice(),
        KeyCode::Char('n') => app.next_step(),
        KeyCode::Esc | KeyCode::Char('b') => app.back_step(),
        _ => {}
    }
}

fn handle_results_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Up => app.scroll_results(false),
        KeyCode::Down => app.scroll_results(true),
        KeyCode::Esc | KeyCode::Char('b') => app.back_step(),
        _ => {}
    }
}

async fn run_check(config_path: Option<&PathBuf>) -> Result<()> {
    println!("Checking configuration...");
    let config = Config::load(config_path)?;
    println!("  Config: OK");
    println!("  Advisory service: {}", config.api.base_url);
    println!("  Weather source: {:?}", config.weather.source);
    println!();

    println!("Testing connections...");
    let advisory = AdvisoryClient::new(&config.api)?;
    report("Advisory service", advisory.test_connection().await);

    if config.weather.source == WeatherSourceKind::Direct {
        let timeout = config.api.timeout();
        let ipapi = IpApiClient::new(config.weather.ipapi_url.clone(), timeout)?;
        report("IP geolocation", ipapi.test_connection().await);
        let open_meteo = OpenMeteoClient::new(config.weather.open_meteo_url.clone(), timeout)?;
        report("Open-Meteo", open_meteo.test_connection().await);
    }

    Ok(())
}

fn report(name: &str, result: Result<bool>) {
    match result {
        Ok(true) => println!("  {}: OK", name),
        Ok(false) => println!("  {}: FAILED (unexpected status)", name),
        Err(e) => println!("  {}: FAILED ({})", name, e),
    }
}

async fn run_weather(config_path: Option<&PathBuf>) -> Result<()> {
    let config = Config::load(config_path)?;
    let advisory = AdvisoryClient::new(&config.api)?;
    let source = ConfiguredWeatherSource::from_config(&config, &advisory)?;
    let resolver = LocationWeatherResolver::new(source, config.api.timeout());

    match resolver.resolve().await {
        Resolution::Resolved(resolved) => {
            let w = &resolved.weather;
            println!("Location:     {}", resolved.location_display());
            println!("Region:       {} ({})", resolved.region.name_az(), resolved.region);
            println!("Temperature:  {:.0} °C", w.temperature);
            println!("Humidity:     {:.0} %", w.humidity);
            println!("Rain (24h):   {:.1} mm", w.rainfall_last_24h);
            println!("Wind:         {:.0} km/h", w.wind_speed);
            println!("Frost:        {}", if w.frost_warning { "yes" } else { "no" });
        }
        Resolution::Degraded(reason) => {
            println!("{}", RESOLUTION_FAILED_NOTICE);
            println!("Reason: {}", reason);
        }
    }

    Ok(())
}

async fn run_chat(
    config_path: Option<&PathBuf>,
    message: String,
    session: Option<String>,
) -> Result<()> {
    let config = Config::load(config_path)?;
    let advisory = AdvisoryClient::new(&config.api)?;

    let reply = advisory
        .send_chat(&ChatRequest {
            message,
            session_id: session,
        })
        .await?;

    println!("{}", reply.response);
    let details = reply.detail_lines();
    if !details.is_empty() {
        println!();
        for line in details {
            println!("{}", line);
        }
    }
    if let Some(quick_replies) = reply.quick_replies.filter(|q| !q.is_empty()) {
        println!();
        for quick_reply in quick_replies {
            println!("  • {}", quick_reply);
        }
    }
    tracing::debug!(intent = %reply.intent, confidence = reply.confidence, "Chat reply");

    Ok(())
}
