use chrono::Local;
use tracing::{info, warn};

use common::TopologySnapshot;

use crate::session::SessionEvent;
use crate::tui::input::InputAction;
use crate::tui::state::{AppEvent, AppState, View};

/// Apply one event to the app. Returns true when the app should shut down.
pub async fn handle_event(app: &mut AppState, evt: AppEvent) -> anyhow::Result<bool> {
    match evt {
        AppEvent::Interrupt => return Ok(true),
        AppEvent::Key(key) => match app.input.dispatch(key, app.session.is_active()) {
            InputAction::Shutdown => return Ok(true),
            InputAction::SelectVhost => open_vhost_menu(app),
            InputAction::StopMonitoring => {
                app.session.stop(&mut app.buffer).await;
                app.notify("Monitoring stopped");
            }
            InputAction::Submit(line) => finish_vhost_menu(app, &line).await,
            InputAction::Echo(_) | InputAction::Erase | InputAction::Ignored => {}
        },
        AppEvent::Topology(fetch) => {
            let failures = fetch.apply_to(&mut app.topology);
            if failures == 3 {
                app.notify("Management API unreachable; showing last known topology");
            }
            app.last_refresh = Some(Local::now());
        }
        AppEvent::Session(SessionEvent::Delivery { session_id, record }) => {
            if app.session.accepts(session_id) {
                app.buffer.append(record);
            }
        }
        AppEvent::Session(SessionEvent::Lost { session_id, vhost, reason }) => {
            if app.session.handle_lost(session_id, &reason, &mut app.buffer).await {
                app.notify(format!("Lost subscription to vHost {vhost}: {reason}"));
            }
        }
    }
    Ok(false)
}

fn open_vhost_menu(app: &mut AppState) {
    app.scheduler.pause();
    app.input.begin_capture();
    app.view = View::VhostMenu;
}

async fn finish_vhost_menu(app: &mut AppState, line: &str) {
    app.view = View::Dashboard;
    if let Some(vhost) = selected_vhost(&app.topology, line) {
        info!(%vhost, "vhost selected for monitoring");
        match app.session.start(&vhost, &mut app.buffer).await {
            Ok(()) => app.notify(format!("Monitoring vHost {vhost}")),
            Err(e) => {
                warn!(%vhost, error = %e, "monitoring did not start");
                app.notify(format!("Could not monitor vHost \"{vhost}\": {e}"));
            }
        }
        tokio::time::sleep(app.display.settle_delay()).await;
    }
    app.scheduler.resume();
}

/// Menu entries are numbered from 1; anything else cancels.
pub fn selected_vhost(topology: &TopologySnapshot, line: &str) -> Option<String> {
    let n: usize = line.parse().ok()?;
    let idx = n.checked_sub(1)?;
    topology.vhosts.get(idx).map(|v| v.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use common::{MessageRecord, MonitorConfig, VHostInfo};
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use tokio::sync::mpsc;

    use crate::session::SessionEvent;
    use crate::testing::{FakeBroker, FakeManagement};

    struct Harness {
        app: AppState,
        broker: FakeBroker,
        _rx: mpsc::UnboundedReceiver<AppEvent>,
        _session_rx: mpsc::UnboundedReceiver<SessionEvent>,
    }

    fn harness(vhosts: &[&str]) -> Harness {
        let mut cfg = MonitorConfig::default();
        cfg.display.settle_ms = 0;
        let broker = FakeBroker::default();
        let api = Arc::new(FakeManagement::with_vhosts(vhosts));
        let (tx, rx) = mpsc::unbounded_channel();
        let (session_tx, session_rx) = mpsc::unbounded_channel();
        let mut app = AppState::new(&cfg, api, Arc::new(broker.clone()), tx, session_tx);
        app.topology.vhosts = vhosts
            .iter()
            .map(|n| VHostInfo { name: n.to_string() })
            .collect();
        Harness { app, broker, _rx: rx, _session_rx: session_rx }
    }

    fn key(code: KeyCode) -> AppEvent {
        AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    async fn type_keys(app: &mut AppState, keys: &str) {
        for c in keys.chars() {
            assert!(!handle_event(app, key(KeyCode::Char(c))).await.unwrap());
        }
    }

    #[tokio::test]
    async fn menu_selection_starts_monitoring_and_resumes_refresh() {
        let mut h = harness(&["/", "/shop", "/billing"]);
        h.app.buffer.append(MessageRecord::from_delivery("/", "", "old", b"x"));

        type_keys(&mut h.app, "m").await;
        assert_eq!(h.app.view, View::VhostMenu);
        assert!(h.app.input.is_capturing());
        assert!(!h.app.scheduler.is_running());

        type_keys(&mut h.app, "2").await;
        handle_event(&mut h.app, key(KeyCode::Enter)).await.unwrap();

        assert_eq!(h.app.session.monitored_vhost(), Some("/shop"));
        assert_eq!(h.app.view, View::Dashboard);
        assert!(!h.app.input.is_capturing());
        assert!(h.app.scheduler.is_running());
        assert!(h.app.buffer.is_empty());
    }

    #[tokio::test]
    async fn stop_key_is_inert_while_capturing() {
        let mut h = harness(&["/shop"]);
        h.app.session.start("/shop", &mut h.app.buffer).await.unwrap();
        h.broker.clear_calls();

        h.app.input.begin_capture();
        type_keys(&mut h.app, "s").await;

        assert_eq!(h.app.session.monitored_vhost(), Some("/shop"));
        assert_eq!(h.app.input.pending_line(), Some("s"));
        assert!(h.broker.calls().is_empty());
    }

    #[tokio::test]
    async fn cancelled_menu_leaves_session_idle() {
        let mut h = harness(&["/", "/shop"]);
        type_keys(&mut h.app, "m0").await;
        handle_event(&mut h.app, key(KeyCode::Enter)).await.unwrap();

        assert!(!h.app.session.is_active());
        assert!(h.broker.calls().is_empty());
        assert!(h.app.scheduler.is_running());
    }

    #[tokio::test]
    async fn failed_start_is_reported_not_fatal() {
        let mut h = harness(&["/shop"]);
        h.broker.fail_on("connect");
        type_keys(&mut h.app, "m1").await;
        let quit = handle_event(&mut h.app, key(KeyCode::Enter)).await.unwrap();

        assert!(!quit);
        assert!(!h.app.session.is_active());
        assert!(h.app.overlay().unwrap().contains("/shop"));
    }

    #[tokio::test(start_paused = true)]
    async fn silent_broker_cannot_hold_off_ctrl_c() {
        let mut h = harness(&["/shop"]);
        h.broker.hang_on("connect");
        type_keys(&mut h.app, "m1").await;

        let began = tokio::time::Instant::now();
        let submitted = tokio::time::timeout(
            Duration::from_secs(600),
            handle_event(&mut h.app, key(KeyCode::Enter)),
        )
        .await
        .expect("menu submit returned while the broker was silent");

        assert!(!submitted.unwrap());
        assert!(began.elapsed() < Duration::from_secs(6));
        assert!(!h.app.session.is_active());
        assert!(h.app.scheduler.is_running());
        assert!(h.app.overlay().unwrap().contains("/shop"));

        let ctrl_c = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(handle_event(&mut h.app, ctrl_c).await.unwrap());
    }

    #[tokio::test]
    async fn deliveries_from_stale_sessions_are_dropped() {
        let mut h = harness(&["/shop"]);
        h.app.session.start("/shop", &mut h.app.buffer).await.unwrap();
        let record = MessageRecord::from_delivery("/shop", "amq.topic", "a.b", b"1");

        let stale = AppEvent::Session(SessionEvent::Delivery { session_id: 99, record: record.clone() });
        handle_event(&mut h.app, stale).await.unwrap();
        assert!(h.app.buffer.is_empty());

        let live = AppEvent::Session(SessionEvent::Delivery { session_id: 1, record });
        handle_event(&mut h.app, live).await.unwrap();
        assert_eq!(h.app.buffer.len(), 1);
        assert_eq!(h.app.buffer.statistics().total_messages, 1);
    }

    #[tokio::test]
    async fn lost_subscription_returns_dashboard_to_idle() {
        let mut h = harness(&["/shop"]);
        h.app.session.start("/shop", &mut h.app.buffer).await.unwrap();
        let lost = AppEvent::Session(SessionEvent::Lost {
            session_id: 1,
            vhost: "/shop".into(),
            reason: "CONNECTION_FORCED".into(),
        });
        handle_event(&mut h.app, lost).await.unwrap();

        assert!(!h.app.session.is_active());
        assert!(h.app.overlay().unwrap().contains("CONNECTION_FORCED"));
    }

    #[tokio::test]
    async fn interrupt_quits_from_any_mode() {
        let mut h = harness(&[]);
        h.app.input.begin_capture();
        let ctrl_c = AppEvent::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(handle_event(&mut h.app, ctrl_c).await.unwrap());
        assert!(handle_event(&mut h.app, AppEvent::Interrupt).await.unwrap());
    }

    #[test]
    fn selection_parsing() {
        let topo = TopologySnapshot {
            vhosts: vec![VHostInfo { name: "/".into() }, VHostInfo { name: "/shop".into() }],
            ..Default::default()
        };
        assert_eq!(selected_vhost(&topo, "2").as_deref(), Some("/shop"));
        assert_eq!(selected_vhost(&topo, "0"), None);
        assert_eq!(selected_vhost(&topo, "3"), None);
        assert_eq!(selected_vhost(&topo, "two"), None);
        assert_eq!(selected_vhost(&topo, ""), None);
    }
}
