use std::io::Stdout;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossterm::style::ResetColor;
use crossterm::{
    event::{self, Event as CEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{info, warn};

use common::MonitorConfig;

use crate::broker::BrokerConnector;
use crate::management::ManagementApi;
use crate::session::SessionEvent;
use crate::tui::draw::draw_app;
use crate::tui::events::handle_event;
use crate::tui::state::{AppEvent, AppState};

/// Upper bound for tearing down the broker session on exit.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(1);
/// Redraw cadence between events, so overlays expire on time.
const FRAME_INTERVAL: Duration = Duration::from_millis(250);
const KEY_POLL: Duration = Duration::from_millis(50);

type Term = Terminal<CrosstermBackend<Stdout>>;

pub async fn run_tui(
    cfg: MonitorConfig,
    api: Arc<dyn ManagementApi>,
    connector: Arc<dyn BrokerConnector>,
) -> anyhow::Result<()> {
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, ResetColor)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let (tx, mut rx) = mpsc::unbounded_channel::<AppEvent>();
    let (session_tx, mut session_rx) = mpsc::unbounded_channel::<SessionEvent>();

    // Session events (deliveries, subscription loss) join the main queue in arrival order.
    let tx_session = tx.clone();
    tokio::spawn(async move {
        while let Some(evt) = session_rx.recv().await {
            if tx_session.send(AppEvent::Session(evt)).is_err() {
                break;
            }
        }
    });

    // Keyboard task
    let stop_keys = Arc::new(AtomicBool::new(false));
    let keys = {
        let tx_key = tx.clone();
        let stop = stop_keys.clone();
        tokio::task::spawn_blocking(move || {
            while !stop.load(Ordering::Relaxed) {
                if event::poll(KEY_POLL).unwrap_or(false) {
                    if let Ok(CEvent::Key(key)) = event::read() {
                        if key.kind == KeyEventKind::Release {
                            continue;
                        }
                        if tx_key.send(AppEvent::Key(key)).is_err() {
                            break;
                        }
                    }
                }
            }
        })
    };

    spawn_signal_listener(tx.clone());

    let mut app = AppState::new(&cfg, api, connector, tx.clone(), session_tx);
    app.scheduler.resume();
    info!(host = %cfg.broker.host, "dashboard started");

    let outcome = event_loop(&mut terminal, &mut app, &mut rx).await;

    app.scheduler.pause();
    if tokio::time::timeout(SHUTDOWN_GRACE, app.session.stop(&mut app.buffer))
        .await
        .is_err()
    {
        warn!("broker session did not close within the grace period");
    }
    stop_keys.store(true, Ordering::Relaxed);
    let _ = keys.await;

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    info!("dashboard stopped");
    outcome
}

async fn event_loop(
    terminal: &mut Term,
    app: &mut AppState,
    rx: &mut mpsc::UnboundedReceiver<AppEvent>,
) -> anyhow::Result<()> {
    let mut frame = tokio::time::interval(FRAME_INTERVAL);
    loop {
        terminal.draw(|f| draw_app(f, app))?;

        tokio::select! {
            evt = rx.recv() => {
                let Some(evt) = evt else { return Ok(()) };
                if handle_event(app, evt).await? {
                    return Ok(());
                }
                // Drain whatever piled up so a burst of deliveries costs one frame.
                while let Ok(evt) = rx.try_recv() {
                    if handle_event(app, evt).await? {
                        return Ok(());
                    }
                }
            }
            _ = frame.tick() => {}
        }
    }
}

fn spawn_signal_listener(tx: mpsc::UnboundedSender<AppEvent>) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let mut term = match signal(SignalKind::terminate()) {
                Ok(s) => s,
                Err(e) => {
                    warn!(error = %e, "SIGTERM handler unavailable");
                    let _ = tokio::signal::ctrl_c().await;
                    let _ = tx.send(AppEvent::Interrupt);
                    return;
                }
            };
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = term.recv() => {}
            }
        }
        #[cfg(not(unix))]
        {
            let _ = tokio::signal::ctrl_c().await;
        }
        info!("interrupt received");
        let _ = tx.send(AppEvent::Interrupt);
    });
}
