/// Hyperliquid Funding Heatmap
///
/// Live grid of perpetual-futures funding opportunities:
/// - cells colored by annualized return (green pays longs, red pays shorts)
/// - minimum-liquidity filter
/// - detail popup with a link to the trade page
use std::{
    error::Error,
    fs::OpenOptions,
    io,
    sync::Mutex,
    time::Duration,
};

use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use funding_heatmap::{
    open_in_browser, render_heatmap, shared::threshold::PAGE_STEPS, trade_url, AssetSource,
    HeatmapConfig, HeatmapUi, HttpAssetSource, RefreshScheduler, ViewEvent, ViewState,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use rustls::crypto::ring::default_provider;
use tracing::info;

const INPUT_POLL: Duration = Duration::from_millis(100);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let _ = default_provider().install_default();

    let config = match HeatmapConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("funding-heatmap: {e}");
            std::process::exit(2);
        }
    };
    init_logging(&config)?;
    let source = HttpAssetSource::new(&config)?;
    info!(url = %source.url(), "Funding heatmap starting");

    // Setup panic hook to restore terminal on crash
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |info| {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen, DisableMouseCapture);
        original_hook(info);
    }));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let (mut scheduler, mut events) = RefreshScheduler::new(source, config.refresh_period);
    scheduler.start();

    let mut state = ViewState::new();
    let mut ui = HeatmapUi::new();

    let result = loop {
        while let Some(event) = events.try_recv() {
            state.apply(event);
        }

        if let Err(e) = terminal.draw(|f| render_heatmap(f, &state, &mut ui)) {
            break Err(e.into());
        }
        ui.tick = ui.tick.wrapping_add(1);

        match event::poll(INPUT_POLL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(e) => break Err(e.into()),
        }
        let control = match event::read() {
            Ok(Event::Key(key)) => handle_key(key, &mut state, &mut ui, &scheduler),
            Ok(Event::Mouse(mouse)) => {
                handle_mouse(mouse, &mut state, &ui);
                Control::Continue
            }
            Ok(_) => Control::Continue,
            Err(e) => break Err(e.into()),
        };
        if control == Control::Quit {
            break Ok(());
        }
    };

    scheduler.stop();
    state.apply(ViewEvent::Unmount);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;
    info!("Funding heatmap stopped");
    result
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Control {
    Continue,
    Quit,
}

fn handle_key<S: AssetSource>(
    key: KeyEvent,
    state: &mut ViewState,
    ui: &mut HeatmapUi,
    scheduler: &RefreshScheduler<S>,
) -> Control {
    if key.kind != KeyEventKind::Press {
        return Control::Continue;
    }

    let len = state.visible().len();
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => return Control::Quit,
        KeyCode::Esc if state.selection.is_open() => state.apply(ViewEvent::Dismiss),
        KeyCode::Esc => return Control::Quit,
        KeyCode::Char('r') | KeyCode::Char('R') => scheduler.refresh_now(),
        KeyCode::Left | KeyCode::Char('h') => ui.move_cursor(-1, 0, len),
        KeyCode::Right | KeyCode::Char('l') => ui.move_cursor(1, 0, len),
        KeyCode::Up | KeyCode::Char('k') => ui.move_cursor(0, -1, len),
        KeyCode::Down | KeyCode::Char('j') => ui.move_cursor(0, 1, len),
        KeyCode::Char('+') | KeyCode::Char('=') => state.apply(ViewEvent::StepThreshold(1)),
        KeyCode::Char('-') | KeyCode::Char('_') => state.apply(ViewEvent::StepThreshold(-1)),
        KeyCode::PageUp => state.apply(ViewEvent::StepThreshold(PAGE_STEPS)),
        KeyCode::PageDown => state.apply(ViewEvent::StepThreshold(-PAGE_STEPS)),
        KeyCode::Enter => {
            let name = state.visible().get(ui.cursor).map(|a| a.name.clone());
            if let Some(name) = name {
                state.apply(ViewEvent::Select(name));
            }
        }
        KeyCode::Char('o') | KeyCode::Char('O') => {
            if let Some(asset) = state.selected_asset() {
                open_in_browser(&trade_url(&asset.name));
            }
        }
        _ => {}
    }
    Control::Continue
}

fn handle_mouse(mouse: MouseEvent, state: &mut ViewState, ui: &HeatmapUi) {
    if mouse.kind != MouseEventKind::Down(MouseButton::Left) {
        return;
    }
    if let Some(name) = ui.hit(mouse.column, mouse.row) {
        state.apply(ViewEvent::Select(name.to_string()));
    }
}

/// Initialize logging into `HEATMAP_LOG_FILE`; nothing is installed without it
fn init_logging(config: &HeatmapConfig) -> Result<(), Box<dyn Error>> {
    let Some(path) = &config.log_file else {
        return Ok(());
    };
    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
