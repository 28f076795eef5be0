mod app;
mod card;
mod client;
mod config;
mod labels;
mod query;
mod theme;
mod ui;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use app::App;
use client::{HttpTransport, QueryRequest, Transport};
use config::AppConfig;
use query::RevealTiming;

#[derive(Parser, Debug)]
#[command(name = "khabar")]
#[command(version = "0.1.0")]
#[command(about = "A terminal news reader with sentiment badges and translation display")]
struct Args {
    /// News category to query (e.g. politics, sports, technology)
    #[arg(short, long)]
    category: Option<String>,

    /// Query date as YYYY-MM-DD (defaults to today)
    #[arg(long)]
    date: Option<NaiveDate>,

    /// Request translated summaries
    #[arg(short, long)]
    translate: bool,

    /// Translation target language code (e.g. hi, mr, es, fr)
    #[arg(short, long)]
    language: Option<String>,

    /// Fetch once and print the news as JSON instead of running the TUI
    #[arg(long)]
    json: bool,

    /// Override the configured news server URL
    #[arg(long)]
    server: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let config = AppConfig::load().unwrap_or_default();

    let server_url = args
        .server
        .clone()
        .unwrap_or_else(|| config.server_url.clone());
    let transport = Arc::new(HttpTransport::new(&server_url));

    // One-shot mode for scripting
    if args.json {
        return print_news(transport, &args, &config).await;
    }

    run_tui(config, transport, args).await
}

/// Fetch once and dump the raw news array to stdout.
async fn print_news(
    transport: Arc<HttpTransport>,
    args: &Args,
    config: &AppConfig,
) -> Result<()> {
    let category = args
        .category
        .clone()
        .or_else(|| config.default_category.clone())
        .or_else(|| config.categories.first().cloned())
        .unwrap_or_else(|| "general".to_string());

    let language = args
        .language
        .clone()
        .or_else(|| config.default_language.clone())
        .or_else(|| config.languages.first().cloned())
        .unwrap_or_default();

    let request = QueryRequest {
        category,
        date: args.date.unwrap_or_else(|| Local::now().date_naive()),
        translation: args.translate,
        translation_language: if args.translate { language } else { String::new() },
    };

    let response = transport.fetch_news(&request).await?;
    println!("{}", serde_json::to_string_pretty(&response.news)?);
    Ok(())
}

async fn run_tui(config: AppConfig, transport: Arc<HttpTransport>, args: Args) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app state, with CLI flags overriding the configured defaults
    let mut app = App::new(&config, transport, RevealTiming::default());
    if let Some(ref category) = args.category {
        app.select_category(category);
    }
    if let Some(date) = args.date {
        app.date = date;
    }
    if args.translate {
        app.translate = true;
    }
    if let Some(ref language) = args.language {
        app.select_language(language);
    }

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        // Poll at the fade tick rate so card reveals stay smooth
        if event::poll(Duration::from_millis(20))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') if !app.show_help => return Ok(()),
                        KeyCode::Char('c')
                            if key.modifiers.contains(event::KeyModifiers::CONTROL) =>
                        {
                            return Ok(())
                        }
                        _ => app.handle_key(key),
                    }
                }
            }
        }

        app.tick();
    }
}
