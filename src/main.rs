use std::io;
use std::sync::Arc;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use crossterm::event::KeyEventKind;
use ratatui::prelude::*;
use tokio::sync::mpsc;

mod api;
mod app;
mod config;
mod error;
mod models;
mod pipeline;
mod tui;

use api::{GenerationApi, HttpGenerationApi};
use app::App;
use config::Config;
use error::{AppError, Result};
use models::{parse_duration, DetailLevel, GenerationRequest};
use pipeline::{Pipeline, PipelineEvent};
use tui::{draw, handle_key_event};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging (only show warnings and errors by default)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();

    // Load configuration
    let config = Config::load()?;

    // Check for --health flag (probe the backend and exit)
    if args.len() >= 2 && args[1] == "--health" {
        let api = HttpGenerationApi::new(&config)?;
        let body = api.check_health().await?;
        println!("API is healthy: {}", body);
        return Ok(());
    }

    // Check for --generate flag (headless generation)
    if args.len() >= 2 && args[1] == "--generate" {
        if args.len() < 5 {
            return Err(AppError::InvalidInput(
                "usage: videogen --generate <topic> <duration> <basic|intermediate|detailed>".to_string(),
            ));
        }
        let request = GenerationRequest {
            topic: args[2].clone(),
            duration: parse_duration(&args[3])?,
            detail_level: args[4].parse::<DetailLevel>()?,
        };
        return generate_headless(&config, request).await;
    }

    // Initialize app
    let mut app = App::new(&config)?;
    if config.health_check {
        app.start_health_check();
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = run_app(&mut terminal, &mut app).await;

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
    }

    Ok(())
}

async fn generate_headless(config: &Config, request: GenerationRequest) -> Result<()> {
    let api: Arc<dyn GenerationApi> = Arc::new(HttpGenerationApi::new(config)?);
    let pipeline = Pipeline::new(api, config.flow, Duration::ZERO);

    let (tx, mut rx) = mpsc::channel(16);
    pipeline.run(request, &tx).await;
    drop(tx);

    while let Some(event) = rx.recv().await {
        match event {
            PipelineEvent::Progress(progress) => eprintln!("Progress: {}%", progress),
            PipelineEvent::Completed(outcome) => {
                if let Some(message) = outcome.message {
                    eprintln!("{}", message);
                }
                println!("{}", outcome.video_url);
            }
            PipelineEvent::Failed(message) => return Err(AppError::Api(message)),
        }
    }

    Ok(())
}

async fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        // Advance spinner animation
        app.tick_spinner();

        // Poll for pipeline progress and results
        app.poll_pipeline_events();

        // Poll for the startup health check
        app.poll_health_result();

        // Poll for completed downloads
        app.poll_download_result();

        // Poll for events with timeout to allow async operations
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = handle_key_event(key, app.input_mode()) {
                        let should_quit = app.handle_action(action)?;
                        if should_quit {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}
