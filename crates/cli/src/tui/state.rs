use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use crossterm::event::KeyEvent;
use tokio::sync::mpsc;

use common::{DisplayConfig, MessageBuffer, MonitorConfig, TopologySnapshot};

use crate::broker::BrokerConnector;
use crate::management::ManagementApi;
use crate::poller::TopologyFetch;
use crate::session::{SessionController, SessionEvent};
use crate::tui::input::InputRouter;
use crate::tui::scheduler::RefreshScheduler;

/// How long an overlay notice stays on screen.
pub const OVERLAY_TTL: Duration = Duration::from_secs(4);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum View {
    Dashboard,
    VhostMenu,
}

#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Topology(TopologyFetch),
    Session(SessionEvent),
    /// SIGINT / SIGTERM from the OS.
    Interrupt,
}

pub struct AppState {
    pub view: View,
    pub display: DisplayConfig,
    pub broker_host: String,
    pub topology: TopologySnapshot,
    pub buffer: MessageBuffer,
    pub session: SessionController,
    pub input: InputRouter,
    pub scheduler: RefreshScheduler,
    pub overlay_msg: Option<(Instant, String)>,
    pub last_refresh: Option<DateTime<Local>>,
}

impl AppState {
    pub fn new(
        cfg: &MonitorConfig,
        api: Arc<dyn ManagementApi>,
        connector: Arc<dyn BrokerConnector>,
        tx: mpsc::UnboundedSender<AppEvent>,
        session_tx: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            view: View::Dashboard,
            display: cfg.display.clone(),
            broker_host: cfg.broker.host.clone(),
            topology: TopologySnapshot::default(),
            buffer: MessageBuffer::new(cfg.display.max_messages),
            session: SessionController::new(connector, session_tx, cfg.broker.connect_timeout()),
            input: InputRouter::default(),
            scheduler: RefreshScheduler::new(cfg.display.refresh_interval(), api, tx),
            overlay_msg: None,
            last_refresh: None,
        }
    }

    pub fn notify(&mut self, msg: impl Into<String>) {
        self.overlay_msg = Some((Instant::now(), msg.into()));
    }

    /// Current overlay text, if it has not expired yet.
    pub fn overlay(&self) -> Option<&str> {
        self.overlay_msg
            .as_ref()
            .filter(|(at, _)| at.elapsed() < OVERLAY_TTL)
            .map(|(_, msg)| msg.as_str())
    }
}
