mod app;
mod catalog;
mod config;
mod logging;
mod prefs;
mod theme;
mod ui;
mod view;

use app::{App, InputMode, LoadEvent, View};
use catalog::{CatalogLoader, FixedDelay, LoadReport, OmdbClient};
use clap::{Parser, Subcommand};
use config::AppConfig;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use indicatif::{ProgressBar, ProgressStyle};
use logging::LogTarget;
use prefs::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

/// Terminal movie catalog backed by the OMDb API
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// OMDb API key (or OMDB_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Full lookup endpoint including the key (or OMDB_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// File with one title per line, replacing the built-in list
    #[arg(long, global = true)]
    titles: Option<PathBuf>,

    /// Number of lookups run concurrently per batch
    #[arg(long, global = true)]
    batch_size: Option<usize>,

    /// Pause between batches in milliseconds
    #[arg(long, global = true)]
    delay_ms: Option<u64>,

    /// Per-request timeout in seconds
    #[arg(long, global = true)]
    timeout_secs: Option<u64>,

    /// Combine genre filter and search instead of letting the last one win
    #[arg(long, global = true)]
    compose_filters: bool,

    /// Path to config.json (defaults to the platform config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the TUI explorer (default)
    Run,
    /// Load the catalog without the TUI and print it
    Fetch {
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
}

type Loader = CatalogLoader<OmdbClient, FixedDelay>;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let command = cli.command.as_ref().unwrap_or(&Commands::Run);

    let (log_target, log_level) = log_setup(command);
    logging::setup_logging(log_target, log_level);

    let config = match build_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            std::process::exit(1);
        }
    };

    let titles = match &cli.titles {
        Some(path) => catalog::load_titles(path).map_err(|e| {
            format!("could not read titles from {}: {}", path.display(), e)
        })?,
        None => catalog::default_titles(),
    };

    let endpoint = config.endpoint()?;
    let client = match OmdbClient::new(endpoint, config.request_timeout()) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            eprintln!("Error: {}", e.user_message());
            std::process::exit(1);
        }
    };
    let loader = CatalogLoader::new(client, FixedDelay(config.batch_delay()), config.batch_size);

    match command {
        Commands::Fetch { json } => {
            let report = run_fetch(&loader, &titles, *json).await?;
            if !report.is_complete() {
                std::process::exit(1);
            }
        }
        Commands::Run => {
            let mut app = App::new(open_preferences(), config.compose_filters);

            // Init terminal
            let mut terminal = ratatui::init();
            let size = terminal.size()?;
            app.update_columns(grid_width(size.width));

            app.start_loading(loader.batch_count(titles.len()));
            let (tx, rx) = unbounded_channel();
            let loader_task = tokio::spawn(async move {
                let progress_tx = tx.clone();
                let report = loader
                    .load_catalog(&titles, |catalog| {
                        let _ = progress_tx.send(LoadEvent::Progress(catalog.to_vec()));
                    })
                    .await;
                let _ = tx.send(LoadEvent::Finished {
                    failures: report.failures,
                    error: report.error,
                });
            });

            // Main loop
            let result = run_app(&mut terminal, &mut app, rx).await;

            // Nothing may update the UI after quit.
            loader_task.abort();

            // Restore terminal
            ratatui::restore();

            if let Err(e) = result {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        }
    }

    Ok(())
}

/// Where each command logs, and at which default level.
fn log_setup(command: &Commands) -> (LogTarget, log::LevelFilter) {
    match command {
        Commands::Run => (
            LogTarget::File(logging::default_log_path()),
            log::LevelFilter::Info,
        ),
        // Per-title warnings would tear the progress bar; they are summarized after it.
        Commands::Fetch { .. } => (LogTarget::Stderr, log::LevelFilter::Error),
    }
}

/// Layer config file, environment and CLI flags, in that order.
fn build_config(cli: &Cli) -> Result<AppConfig, config::ConfigError> {
    build_config_with_env(cli, |name| std::env::var(name).ok())
}

fn build_config_with_env<F>(cli: &Cli, env: F) -> Result<AppConfig, config::ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = AppConfig::load(cli.config.as_deref())?;
    config.apply_env_from(env);

    if let Some(key) = &cli.api_key {
        config.api_key = Some(key.clone());
    }
    if let Some(url) = &cli.api_url {
        config.api_url = Some(url.clone());
    }
    if let Some(size) = cli.batch_size {
        config.batch_size = size;
    }
    if let Some(delay) = cli.delay_ms {
        config.batch_delay_ms = delay;
    }
    if let Some(timeout) = cli.timeout_secs {
        config.request_timeout_secs = timeout;
    }
    if cli.compose_filters {
        config.compose_filters = true;
    }

    config.validate()?;
    Ok(config)
}

fn open_preferences() -> Box<dyn PreferenceStore> {
    match FilePreferenceStore::default_path() {
        Some(path) => {
            let store = FilePreferenceStore::open(path);
            log::info!("Preferences stored in {}", store.path().display());
            Box::new(store)
        }
        None => {
            log::warn!("No home directory; theme preference will not be saved");
            Box::new(MemoryPreferenceStore::default())
        }
    }
}

/// Width available to cards inside the grid border.
fn grid_width(terminal_width: u16) -> u16 {
    terminal_width.saturating_sub(2)
}

async fn run_fetch(
    loader: &Loader,
    titles: &[String],
    json: bool,
) -> Result<LoadReport, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(loader.batch_count(titles.len()) as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} batches {msg}")?
            .progress_chars("#>-"),
    );

    let report = loader
        .load_catalog(titles, |catalog| {
            pb.inc(1);
            pb.set_message(format!("({} movies)", catalog.len()));
        })
        .await;

    if report.is_complete() {
        pb.finish_and_clear();
    } else {
        pb.abandon();
    }

    if let Some(error) = &report.error {
        eprintln!("Error: {}", error.user_message());
        log::error!("{}", error);
        return Ok(report);
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&report.catalog)?);
    } else {
        println!("{:<40} {:<6} {:<12} {:>6}  Director", "Title", "Year", "Genre", "Rating");
        for movie in &report.catalog {
            println!(
                "{:<40} {:<6} {:<12} {:>6}  {}",
                ui::truncate_str(&movie.title, 40),
                movie.year,
                movie.genre,
                movie.rating,
                movie.director
            );
        }
    }

    for failure in &report.failures {
        eprintln!("Skipped {}: {}", failure.title, failure.error.user_message());
    }
    eprintln!(
        "{} of {} movies loaded",
        report.catalog.len(),
        titles.len()
    );

    Ok(report)
}

async fn run_app(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    mut events: UnboundedReceiver<LoadEvent>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| ui::render(app, frame))?;

        if app.should_quit {
            return Ok(());
        }

        while let Ok(load_event) = events.try_recv() {
            app.handle_load_event(load_event);
        }

        // Poll for events with a 250ms timeout
        if crossterm::event::poll(std::time::Duration::from_millis(250))? {
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    handle_key(app, key);
                }
                Event::Resize(width, _) => {
                    app.update_columns(grid_width(width));
                }
                _ => {}
            }
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Help toggle (global)
    if key.code == KeyCode::Char('?') && app.input_mode == InputMode::Normal {
        app.show_help = !app.show_help;
        return;
    }

    // If help is showing, any key closes it
    if app.show_help {
        app.show_help = false;
        return;
    }

    // Ctrl+C always quits
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.input_mode == InputMode::Editing {
        handle_search_input(app, key);
        return;
    }
    match app.view {
        View::Grid => handle_grid_key(app, key),
        View::Detail => handle_detail_key(app, key),
    }
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Enter | KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            app.pop_search_char();
        }
        KeyCode::Char(c) => {
            app.push_search_char(c);
        }
        _ => {}
    }
}

fn handle_grid_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => {
            app.should_quit = true;
        }
        KeyCode::Char('/') => {
            app.start_search();
        }
        KeyCode::Char('t') => {
            app.toggle_theme();
        }
        KeyCode::Tab => {
            app.cycle_genre(true);
        }
        KeyCode::BackTab => {
            app.cycle_genre(false);
        }
        KeyCode::Char(c @ '0'..='4') => {
            app.select_genre_button(c as usize - '0' as usize);
        }
        KeyCode::Right | KeyCode::Char('l') => {
            app.select_next();
        }
        KeyCode::Left | KeyCode::Char('h') => {
            app.select_prev();
        }
        KeyCode::Down | KeyCode::Char('j') => {
            app.select_down();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.select_up();
        }
        KeyCode::Char('g') | KeyCode::Home => {
            app.select_first();
        }
        KeyCode::Char('G') | KeyCode::End => {
            app.select_last();
        }
        KeyCode::Enter => {
            app.open_selected();
        }
        KeyCode::Esc => {
            // Clear search
            if !app.filter.search.is_empty() {
                app.set_search(String::new());
            }
        }
        _ => {}
    }
}

fn handle_detail_key(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') | KeyCode::Enter => {
            app.dismiss_detail();
        }
        KeyCode::Char('t') => {
            app.toggle_theme();
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::movie;
    use crate::view::GenreFilter;

    fn press(app: &mut App, code: KeyCode) {
        handle_key(app, KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn loaded_app() -> App {
        let mut app = App::new(Box::new(MemoryPreferenceStore::default()), false);
        app.start_loading(1);
        app.apply_progress(vec![
            movie("Inception", "Action", "Dreams within dreams."),
            movie("Up", "Animation", "Balloons."),
        ]);
        app.finish_load(Vec::new(), None);
        app
    }

    #[test]
    fn test_cli_parses_fetch_with_global_flags() {
        let cli = Cli::try_parse_from([
            "movie-explorer",
            "fetch",
            "--json",
            "--batch-size",
            "3",
            "--api-url",
            "http://localhost/?apikey=x",
        ])
        .unwrap();
        assert!(matches!(cli.command, Some(Commands::Fetch { json: true })));
        assert_eq!(cli.batch_size, Some(3));
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_cli_flags_override_config() {
        let cli = Cli::try_parse_from([
            "movie-explorer",
            "--api-key",
            "k",
            "--delay-ms",
            "0",
            "--config",
            "/nonexistent/config.json",
        ])
        .unwrap();
        let config = build_config_with_env(&cli, no_env).unwrap();
        assert_eq!(config.batch_delay_ms, 0);
        assert_eq!(config.batch_size, 5);
        assert!(config.endpoint().unwrap().ends_with("apikey=k"));
    }

    #[test]
    fn test_cli_key_beats_env_key_but_env_url_still_wins() {
        let cli = Cli::try_parse_from([
            "movie-explorer",
            "--api-key",
            "cli",
            "--config",
            "/nonexistent/config.json",
        ])
        .unwrap();

        let config = build_config_with_env(&cli, |name| match name {
            "OMDB_API_KEY" => Some("env".to_string()),
            _ => None,
        })
        .unwrap();
        assert!(config.endpoint().unwrap().ends_with("apikey=cli"));

        let config = build_config_with_env(&cli, |name| match name {
            "OMDB_API_URL" => Some("http://localhost:9/?apikey=env".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.endpoint().unwrap(), "http://localhost:9/?apikey=env");
    }

    #[test]
    fn test_cli_rejects_zero_batch_size() {
        let cli = Cli::try_parse_from([
            "movie-explorer",
            "--api-key",
            "k",
            "--batch-size",
            "0",
            "--config",
            "/nonexistent/config.json",
        ])
        .unwrap();
        assert!(build_config_with_env(&cli, no_env).is_err());
    }

    #[test]
    fn test_fetch_keeps_warnings_off_the_progress_bar() {
        let (target, level) = log_setup(&Commands::Fetch { json: false });
        assert!(matches!(target, LogTarget::Stderr));
        assert_eq!(level, log::LevelFilter::Error);

        let (target, level) = log_setup(&Commands::Run);
        assert!(matches!(target, LogTarget::File(_)));
        assert_eq!(level, log::LevelFilter::Info);
    }

    #[test]
    fn test_search_keys_edit_filter() {
        let mut app = loaded_app();
        press(&mut app, KeyCode::Char('/'));
        assert_eq!(app.input_mode, InputMode::Editing);

        // 'q' is text while editing, not quit.
        press(&mut app, KeyCode::Char('u'));
        press(&mut app, KeyCode::Char('q'));
        press(&mut app, KeyCode::Backspace);
        assert!(!app.should_quit);
        assert_eq!(app.filter.search, "u");

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.input_mode, InputMode::Normal);
        press(&mut app, KeyCode::Esc);
        assert!(app.filter.search.is_empty());
    }

    #[test]
    fn test_genre_keys_and_detail_popup() {
        let mut app = loaded_app();
        press(&mut app, KeyCode::Char('4'));
        assert_eq!(app.filter.genre, GenreFilter::from_button("Animation"));
        press(&mut app, KeyCode::Tab);
        assert_eq!(app.filter.genre, GenreFilter::All);

        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.view, View::Detail);
        assert_eq!(app.detail.as_ref().map(|d| d.title.as_str()), Some("Up"));

        // 'q' closes the popup before it quits.
        press(&mut app, KeyCode::Char('q'));
        assert_eq!(app.view, View::Grid);
        assert!(!app.should_quit);
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }

    #[test]
    fn test_help_swallows_next_key() {
        let mut app = loaded_app();
        press(&mut app, KeyCode::Char('?'));
        assert!(app.show_help);
        press(&mut app, KeyCode::Char('q'));
        assert!(!app.show_help);
        assert!(!app.should_quit);
    }

    #[test]
    fn test_ctrl_c_quits_while_editing() {
        let mut app = loaded_app();
        press(&mut app, KeyCode::Char('/'));
        handle_key(&mut app, KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(app.should_quit);
    }
}
