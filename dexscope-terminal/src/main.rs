use anyhow::{Context, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{
    fs::File,
    io,
    sync::Mutex,
    time::{Duration, Instant},
};
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use dexscope_core::wallets::WalletStore;
use dexscope_core::DexApiClient;
use dexscope_terminal::app::App;
use dexscope_terminal::config::load_config;
use dexscope_terminal::event::AppEvent;
use dexscope_terminal::tasks::Dispatcher;
use dexscope_terminal::ui::ui;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = load_config()?;

    // The terminal owns stdout, so logs go to a file.
    let log_file = File::create(&settings.log_file)
        .with_context(|| format!("failed to create log file {}", settings.log_file))?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let config = settings.config;
    info!("Starting dexscope against {}", config.api.base_url);

    let wallets = WalletStore::load(&config.storage.wallets_path).with_context(|| {
        format!("failed to load wallets from {}", config.storage.wallets_path)
    })?;
    let client = DexApiClient::new(&config.api).context("failed to build API client")?;
    let has_key = client.has_api_key();

    // Channel for async events
    let (tx, mut rx) = mpsc::unbounded_channel();
    let dispatcher = Dispatcher::new(client, tx, config.polling.clone());

    let mut app = App::new(wallets, config.polling);
    if !has_key {
        app.add_log("No API key configured. Set DEXSCOPE_API_KEY or pass --api-key.");
    }
    let commands = app.navigate(settings.start);
    dispatcher.dispatch_all(&mut app, commands);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app, &dispatcher, &mut rx);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{:?}", err)
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    dispatcher: &Dispatcher,
    rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        // Drain results from background tasks
        while let Ok(event) = rx.try_recv() {
            let commands = app.handle_event(event, Instant::now());
            dispatcher.dispatch_all(app, commands);
        }

        if event::poll(Duration::from_millis(100))? {
            let commands = match event::read()? {
                Event::Key(key) => app.handle_key(key, Instant::now()),
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => Vec::new(),
            };
            dispatcher.dispatch_all(app, commands);
        }

        let commands = app.on_tick(Instant::now());
        dispatcher.dispatch_all(app, commands);

        if app.should_quit {
            return Ok(());
        }
    }
}
