mod audio;
mod auth;
mod controller;
mod logging;
mod model;
mod view;

use std::io;
use std::sync::Arc;
use anyhow::{Context, Result};
use std::time::Duration;
use tokio::sync::Mutex;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use view::AppView;
use audio::AudioBackend;
use controller::AppController;
use model::{AppModel, CatalogClient};

#[tokio::main]
async fn main() -> Result<()> {
    if let Err(e) = logging::init_logging() {
        eprintln!("Warning: Failed to initialize logging: {}", e);
    }

    tracing::info!("=== Music Nerd Starting ===");

    // Step 1: Read app credentials from the environment / .env
    let credentials = auth::load_credentials()?;

    // Step 2: Client-credentials token for catalog access
    let catalog = CatalogClient::new(credentials);
    if let Err(e) = catalog.authenticate().await {
        tracing::error!(error = %e, "Catalog authentication failed");
        return Err(e).context("Could not authenticate with the Spotify catalog");
    }

    let mut app_model = AppModel::new();
    app_model.set_catalog_client(catalog);

    tracing::info!("Starting TUI...");

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let model = Arc::new(Mutex::new(app_model));

    let audio_backend: Arc<Mutex<Option<AudioBackend>>> = Arc::new(Mutex::new(None));

    let audio_backend_init = audio_backend.clone();
    let model_for_init = model.clone();

    // Initialize audio backend in background; opening the device blocks
    tokio::spawn(async move {
        let result = tokio::task::spawn_blocking(AudioBackend::new)
            .await
            .context("Audio init task panicked")
            .and_then(|backend| backend);
        match result {
            Ok(backend) => {
                *audio_backend_init.lock().await = Some(backend);
            }
            Err(e) => {
                tracing::error!(error = %e, "Audio backend unavailable");
                let model = model_for_init.lock().await;
                model.set_error(format!("Audio init failed: {}", e)).await;
            }
        }
    });

    let controller = AppController::new(model.clone(), audio_backend.clone());

    let res = run_app(&mut terminal, model.clone(), controller).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = ?err, "Application error");
    }

    tracing::info!("Music Nerd shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    model: Arc<Mutex<AppModel>>,
    controller: AppController,
) -> io::Result<()> {
    // Track when we last checked the token
    let mut last_token_check = std::time::Instant::now();
    const TOKEN_CHECK_INTERVAL: Duration = Duration::from_secs(60); // Check every minute

    loop {
        // Periodically check and refresh token if needed
        if last_token_check.elapsed() >= TOKEN_CHECK_INTERVAL {
            last_token_check = std::time::Instant::now();

            let model_guard = model.lock().await;
            if let Some(catalog) = model_guard.get_catalog_client().await {
                drop(model_guard);
                tokio::spawn(async move {
                    if let Err(e) = catalog.refresh_token_if_needed().await {
                        tracing::warn!("Token refresh check failed: {}", e);
                    }
                });
            } else {
                drop(model_guard);
            }
        }

        // Get current state
        let (ui_state, search_state, game_state, should_quit) = {
            let model_guard = model.lock().await;

            model_guard.finish_splash_if_elapsed().await;

            // Auto-clear old errors (after 5 seconds)
            model_guard.auto_clear_old_errors().await;

            (
                model_guard.get_ui_state().await,
                model_guard.get_search_state().await,
                model_guard.get_game_state().await,
                model_guard.should_quit().await,
            )
        };

        // Draw UI
        terminal.draw(|f| {
            AppView::render(f, &ui_state, &search_state, &game_state);
        })?;

        // Handle input with shorter poll time for smoother UI updates
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if let Err(e) = controller.handle_key_event(key).await {
                    tracing::warn!(error = %e, "Key handling failed");
                }
            }
        }

        if should_quit {
            break;
        }
    }

    Ok(())
}
