// ============================================================================
// lazycoin - Cours des cryptomonnaies dans le terminal
// ============================================================================
// Charge les tickers depuis CoinMarketCap, les filtre selon la recherche,
// écrit le rendu HTML dans un fichier et l'affiche dans le terminal
//
// Deux threads :
// 1. Thread principal : boucle TUI (rendu ratatui + clavier crossterm)
// 2. Thread worker : runtime tokio mono-thread qui fait tourner la boucle
//    d'affichage, les deux timers et les appels HTTP
//
// Communication :
// - TUI → worker : DisplayCommand (recherche, arrêt) via un channel tokio
// - TUI → worker : devise sélectionnée via une cellule tokio::sync::watch
// - worker → TUI : App partagée (Arc<Mutex<App>>) mise à jour par le renderer
// ============================================================================

use std::io;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use anyhow::{Context, Result};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info};

use lazycoin::api::{Connector, Provider};
use lazycoin::app::App;
use lazycoin::config::AppConfig;
use lazycoin::display::{spawn_currency_watch, spawn_refresh_timer, DisplayCommand, DisplayLoop};
use lazycoin::models::{Currency, RequestOptions};
use lazycoin::ui::{events::EventHandler, render, TerminalHost};

/// Canaux du thread principal vers le worker
struct WorkerChannels {
    commands: mpsc::UnboundedSender<DisplayCommand>,
    currency: watch::Sender<Currency>,
}

// ============================================================================
// Initialisation du logging
// ============================================================================
// CONCEPT : Logging dans une app TUI
// - Les println! ne fonctionnent pas une fois le TUI lancé
// - On log vers un fichier à la place, avec rotation quotidienne
// ============================================================================

/// Initialise le système de logging vers fichier
///
/// # Utilisation
/// ```bash
/// # Voir les logs en temps réel
/// tail -f ~/.local/share/lazycoin/logs/lazycoin.log.*
///
/// # Contrôler le niveau de log
/// RUST_LOG=debug cargo run
/// RUST_LOG=lazycoin=trace cargo run
/// ```
fn init_logging(config: &AppConfig) -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = &config.log_dir;
    std::fs::create_dir_all(log_dir).context("Échec de la création du répertoire de logs")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir, "lazycoin.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_thread_ids(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lazycoin=debug,info".into()),
        )
        .try_init()
        .context("Échec de l'initialisation du logging")?;

    info!(?log_dir, "Logging initialisé");
    Ok(())
}

// ============================================================================
// Point d'entrée du programme
// ============================================================================

fn main() -> Result<()> {
    let config = AppConfig::from_env().context("Configuration invalide")?;

    init_logging(&config).unwrap_or_else(|e| {
        eprintln!("⚠️  Warning: Failed to initialize logging: {}", e);
        eprintln!("   Continuing without logging...");
    });

    info!(?config, "lazycoin starting up");

    let connector = build_connector(&config)?;
    let app = Arc::new(Mutex::new(App::new(config.initial_currency)));

    let (command_tx, command_rx) = mpsc::unbounded_channel::<DisplayCommand>();
    let (currency_tx, currency_rx) = watch::channel(config.initial_currency);

    info!("Spawning display worker thread");
    let worker = spawn_display_worker(
        &config,
        connector,
        app.clone(),
        command_tx.clone(),
        command_rx,
        currency_rx,
    )?;

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let channels = WorkerChannels {
        commands: command_tx,
        currency: currency_tx,
    };
    let result = run(&mut terminal, app, &EventHandler::default(), &channels);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    // Arrête la boucle d'affichage puis attend le worker
    let _ = channels.commands.send(DisplayCommand::Shutdown);
    drop(channels);
    if worker.join().is_err() {
        error!("Display worker panicked");
    }

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

fn build_connector(config: &AppConfig) -> Result<Connector> {
    let connector = match config.request_timeout {
        Some(timeout) => Connector::with_timeout(RequestOptions::default(), timeout),
        None => Connector::new(),
    }
    .context("Échec de la création du client HTTP")?;

    Ok(connector.with_base_url(&config.api_base_url))
}

// ============================================================================
// Worker : boucle d'affichage
// ============================================================================
// CONCEPT RUST : Thread + runtime async
// - std::thread::spawn() : crée un thread OS
// - Runtime current_thread : la boucle, les timers et les requêtes HTTP
//   s'exécutent tous sur ce seul thread, de manière coopérative
// ============================================================================

fn spawn_display_worker(
    config: &AppConfig,
    connector: Connector,
    app: Arc<Mutex<App>>,
    command_tx: mpsc::UnboundedSender<DisplayCommand>,
    command_rx: mpsc::UnboundedReceiver<DisplayCommand>,
    currency_rx: watch::Receiver<Currency>,
) -> Result<JoinHandle<()>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Échec de la création du runtime tokio")?;

    let host = TerminalHost::new(app, Some(config.output_path.clone()));
    let currency = config.initial_currency;
    let display_limit = config.display_limit;
    let refresh_interval = config.refresh_interval;
    let poll_interval = config.currency_poll_interval;

    let handle = std::thread::Builder::new()
        .name("display-worker".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                // Premier remplissage passé par la queue : un Shutdown reste
                // traité même si cette requête ne répond jamais. Un échec n'est
                // pas fatal, le prochain Refresh réessaie.
                let _ = command_tx.send(DisplayCommand::Refresh);

                let refresh = spawn_refresh_timer(command_tx.clone(), refresh_interval);
                let currency_watch = spawn_currency_watch(command_tx, currency_rx, poll_interval);

                let display =
                    DisplayLoop::new(Provider::new(connector), host, currency, display_limit);
                display.run(command_rx).await;

                refresh.abort();
                currency_watch.abort();
                info!("Display worker exiting");
            });
        })
        .context("Échec du lancement du thread worker")?;

    Ok(handle)
}

// ============================================================================
// Event Loop Principal
// ============================================================================
// CONCEPT : Render → Input, tant que app.running
// ============================================================================

fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    channels: &WorkerChannels,
) -> Result<()> {
    loop {
        {
            let app_lock = lock(&app);
            if !app_lock.is_running() {
                break;
            }
        }

        // 1. RENDER
        terminal.draw(|frame| {
            let app_lock = lock(&app);
            render(frame, &app_lock);
        })?;

        // 2. INPUT
        match events.next() {
            Ok(event) => {
                let mut app_lock = lock(&app);
                handle_event(&mut app_lock, event, channels);
            }
            Err(e) => {
                error!(error = ?e, "Failed to read terminal event");
            }
        }
    }

    Ok(())
}

fn lock(app: &Arc<Mutex<App>>) -> std::sync::MutexGuard<'_, App> {
    app.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Traite un événement et met à jour l'état de l'application
fn handle_event(app: &mut App, event: lazycoin::ui::Event, channels: &WorkerChannels) {
    use lazycoin::ui::events::{
        is_backspace_event, is_clear_search_event, is_down_event, is_escape_event,
        is_interrupt_event, is_next_currency_event, is_previous_currency_event, is_up_event,
        search_char, Event,
    };

    if matches!(event, Event::Tick) {
        return;
    }

    if is_interrupt_event(&event) {
        info!("User interrupted");
        app.quit();
        return;
    }

    if is_escape_event(&event) {
        if app.is_awaiting_quit_confirmation() {
            info!("User confirmed quit");
            app.quit();
        } else {
            info!("User requested quit (awaiting confirmation)");
            app.request_quit();
        }
        return;
    }

    // Toute autre touche annule la demande de sortie
    app.cancel_quit();

    if is_up_event(&event) {
        app.navigate_up();
    } else if is_down_event(&event) {
        app.navigate_down();
    } else if is_next_currency_event(&event) || is_previous_currency_event(&event) {
        let currency = if is_next_currency_event(&event) {
            app.next_currency()
        } else {
            app.previous_currency()
        };
        info!(%currency, "User selected currency");
        // Écrit la cellule ; la surveillance de devise enverra le changement
        let _ = channels.currency.send(currency);
    } else if is_clear_search_event(&event) {
        send_search(channels, app.clear_search());
    } else if is_backspace_event(&event) {
        send_search(channels, app.backspace());
    } else if let Some(c) = search_char(&event) {
        send_search(channels, app.append_char(c));
    }
}

fn send_search(channels: &WorkerChannels, query: String) {
    debug!(query = %query, "Search input changed");
    if channels.commands.send(DisplayCommand::Search(query)).is_err() {
        error!("Display worker is gone, search ignored");
    }
}

// ============================================================================
// Setup et restauration du terminal
// ============================================================================
// IMPORTANT : Toujours restaurer le terminal avant de quitter !
// ============================================================================

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}
