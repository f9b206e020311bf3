// ============================================================================
// DreamBoard - Point d'entrée
// ============================================================================
// Programme TUI : catalogue de produits de luxe dont les prix sont affichés
// en dollars et en SOL, avec une liste de rêve et ses totaux.
//
// Deux composants :
// 1. RateFeed : tâche tokio qui rafraîchit le cours SOL/USD toutes les
//    15 minutes (avec cache et repli en cas d'échec)
// 2. App / CatalogView : état de l'interface, mis à jour uniquement depuis
//    la boucle d'événements (thread principal)
//
// Les notifications du flux passent par un channel mpsc : la boucle les
// applique avant chaque rendu.
// ============================================================================

use std::io;
use std::sync::mpsc;
use std::time::Instant;

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info, warn};

use dreamboard::api::CoinGeckoSource;
use dreamboard::app::{App, Focus};
use dreamboard::catalog::CatalogView;
use dreamboard::config::Config;
use dreamboard::feed::{RandomJitter, RateFeed};
use dreamboard::models::{default_catalog, RateUpdate};
use dreamboard::storage::{FileStore, KeyValueStore, MemoryStore, RateCache};
use dreamboard::ui::{events::EventHandler, render};

// ============================================================================
// Initialisation du logging
// ============================================================================
// Les println! ne fonctionnent pas une fois le TUI lancé : on log vers un
// fichier avec rotation quotidienne.
// ============================================================================

/// Initialise le système de logging vers ./logs/dreamboard.log
///
/// # Utilisation
/// ```bash
/// tail -f ./logs/dreamboard.log
/// RUST_LOG=dreamboard=trace cargo run
/// ```
fn init_logging(config: &Config) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = std::path::PathBuf::from("./logs");
    std::fs::create_dir_all(&log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "dreamboard.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true) // La tâche du flux tourne sur un worker tokio
                .with_line_number(true),
        )
        .with(tracing_subscriber::EnvFilter::new(&config.log_filter))
        .init();

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let config = Config::from_env().context("Configuration invalide")?;

    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(?config, "DreamBoard starting up");

    // Runtime tokio pour la tâche du flux de prix
    // CONCEPT : enter() rend le runtime courant pour tokio::spawn
    // depuis ce thread synchrone, sans bloquer la boucle TUI
    let runtime = tokio::runtime::Runtime::new().context("Échec de la création du runtime tokio")?;
    let _runtime_guard = runtime.enter();

    // Le subscriber ne fait que transférer vers la boucle d'événements
    let (rate_tx, rate_rx) = mpsc::channel::<RateUpdate>();
    let mut feed = build_feed(&config)?;
    feed.subscribe(move |update| {
        if rate_tx.send(update).is_err() {
            debug!("Rate update dropped, UI loop is gone");
        }
    });

    let feed_handle = feed.initialize();

    // Premier rendu synchrone avec le dernier cours connu (cache ou défaut)
    let view = CatalogView::new(default_catalog(), feed_handle.current_rate());
    let mut app = App::new(view);

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let events = EventHandler::default();

    info!("Starting event loop");
    let result = run(&mut terminal, &mut app, &events, &rate_rx);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    feed_handle.shutdown();

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

/// Construit le flux de prix : CoinGecko + cache fichier + jitter aléatoire
///
/// Si le répertoire de données est inutilisable, le cours n'est gardé qu'en
/// mémoire pour cette session.
fn build_feed(config: &Config) -> Result<RateFeed> {
    let store: Box<dyn KeyValueStore> = match FileStore::open(&config.data_dir) {
        Ok(store) => {
            info!(dir = %store.dir().display(), "Using file store for cached rate");
            Box::new(store)
        }
        Err(e) => {
            warn!(error = ?e, "Falling back to in-memory rate cache");
            Box::new(MemoryStore::new())
        }
    };

    let source = CoinGeckoSource::new(config.quote_url.as_str(), config.http_timeout)
        .context("Échec de la création du client HTTP")?;

    Ok(RateFeed::new(
        Box::new(source),
        RateCache::new(store),
        Box::new(RandomJitter::new()),
        config.feed_config(),
    ))
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// À chaque itération :
//   0. Applique les cours reçus du flux
//   1. Dessine l'interface
//   2. Traite les événements clavier
//   3. Met à jour l'état (tick)
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &EventHandler,
    rate_rx: &mpsc::Receiver<RateUpdate>,
) -> Result<()> {
    let mut feed_connected = true;

    while app.is_running() {
        // 0. Cours : on applique toutes les notifications en attente
        while feed_connected {
            match rate_rx.try_recv() {
                Ok(update) => {
                    info!(rate = update.rate.value(), origin = ?update.origin, "Rate update received");
                    app.apply_rate_update(update);
                }
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    // Le dernier cours reste affiché
                    error!("Rate feed disconnected!");
                    feed_connected = false;
                }
            }
        }

        // 1. Rendu
        terminal.draw(|frame| render(frame, &*app))?;

        // 2. Entrées
        match events.next() {
            Ok(event) => handle_event(app, event),
            Err(e) => warn!(error = ?e, "Failed to read terminal event"),
        }

        // 3. Mise à jour
        app.tick(Instant::now());
    }

    Ok(())
}

// ============================================================================
// Gestion des événements
// ============================================================================

/// Traite un événement et met à jour l'état de l'application
fn handle_event(app: &mut App, event: dreamboard::ui::events::Event) {
    use dreamboard::ui::events::{
        get_char_from_event, get_filter_digit, is_add_event, is_amount_char_event,
        is_backspace_event, is_delete_event, is_down_event, is_enter_event, is_escape_event,
        is_focus_event, is_income_event, is_next_filter_event, is_previous_filter_event,
        is_quit_event, is_up_event, Event,
    };

    // ========================================
    // Input Mode : saisie du revenu
    // ========================================
    if app.is_in_input_mode() {
        match event {
            Event::Key(_) if is_escape_event(&event) => {
                info!("User cancelled income input");
                app.cancel_input();
            }
            Event::Key(_) if is_enter_event(&event) => app.submit_income_input(),
            Event::Key(_) if is_backspace_event(&event) => app.backspace(),
            Event::Key(_) if is_amount_char_event(&event) => {
                if let Some(c) = get_char_from_event(&event) {
                    app.append_char(c);
                }
            }
            _ => {}
        }
        return;
    }

    match event {
        Event::Key(_) if is_quit_event(&event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
            return;
        }
        Event::Tick => return,
        Event::Key(_) => app.cancel_quit(),
    }

    if is_up_event(&event) {
        app.navigate_up();
    } else if is_down_event(&event) {
        app.navigate_down();
    } else if is_focus_event(&event) {
        app.toggle_focus();
        debug!(focus = ?app.focus, "User switched pane");
    } else if (is_add_event(&event) || is_enter_event(&event)) && app.focus == Focus::Catalog {
        app.add_selected(Instant::now());
    } else if is_delete_event(&event) && app.focus == Focus::DreamList {
        app.remove_selected();
    } else if is_next_filter_event(&event) {
        app.next_filter();
    } else if is_previous_filter_event(&event) {
        app.previous_filter();
    } else if is_income_event(&event) {
        info!("User opened income input");
        app.start_income_input();
    } else if let Some(index) = get_filter_digit(&event) {
        app.select_filter(index);
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================

/// Configure le terminal en mode TUI (raw mode + alternate screen)
fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

/// Restaure le terminal à son état normal
///
/// Appelé dans main() même si la boucle a échoué.
fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    Ok(())
}
