use super::*;
use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use deck_integration::{DeckDevice, Notification, Notifier, PresenceService};
use shared::{
    domain::ButtonIndex,
    error::{AlertError, PresenceError, RenderError},
};
use tokio::sync::Mutex;

const CALL_TIMEOUT: Duration = Duration::from_millis(200);
const BUTTON: ButtonIndex = ButtonIndex(0);

#[derive(Default)]
struct TestPresence {
    calls: Mutex<Vec<PresenceState>>,
    failures_remaining: Mutex<usize>,
    hang: bool,
}

impl TestPresence {
    fn failing(times: usize) -> Self {
        Self {
            failures_remaining: Mutex::new(times),
            ..Self::default()
        }
    }

    fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl PresenceService for TestPresence {
    async fn set_presence(&self, state: PresenceState) -> Result<(), PresenceError> {
        self.calls.lock().await.push(state);
        if self.hang {
            std::future::pending::<()>().await;
        }

        let mut failures = self.failures_remaining.lock().await;
        if *failures > 0 {
            *failures -= 1;
            return Err(PresenceError::Transport("connection reset".into()));
        }
        Ok(())
    }
}

#[derive(Default)]
struct TestDeck {
    renders: Mutex<Vec<(ButtonIndex, Vec<u8>)>>,
    fail: bool,
    hang: bool,
}

#[async_trait]
impl DeckDevice for TestDeck {
    async fn set_button_image(
        &self,
        button: ButtonIndex,
        image: &[u8],
    ) -> Result<(), RenderError> {
        self.renders.lock().await.push((button, image.to_vec()));
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.fail {
            return Err(RenderError::Disconnected);
        }
        Ok(())
    }

    fn take_press_events(&self) -> Option<PressStream> {
        None
    }
}

#[derive(Default)]
struct TestNotifier {
    shown: Mutex<Vec<Notification>>,
    fail: bool,
    hang: bool,
}

#[async_trait]
impl Notifier for TestNotifier {
    async fn notify(&self, notification: Notification) -> Result<(), AlertError> {
        self.shown.lock().await.push(notification);
        if self.hang {
            std::future::pending::<()>().await;
        }
        if self.fail {
            return Err(AlertError::Display("no notification daemon".into()));
        }
        Ok(())
    }
}

struct Harness {
    controller: ToggleController,
    presence: Arc<TestPresence>,
    deck: Arc<TestDeck>,
    notifier: Arc<TestNotifier>,
    dir: tempfile::TempDir,
}

impl Harness {
    async fn rendered_bytes(&self) -> Vec<Vec<u8>> {
        self.deck
            .renders
            .lock()
            .await
            .iter()
            .map(|(_, bytes)| bytes.clone())
            .collect()
    }

    async fn presence_calls(&self) -> Vec<PresenceState> {
        self.presence.calls.lock().await.clone()
    }

    async fn alert_messages(&mut self) -> Vec<String> {
        self.controller.flush_alert().await;
        self.notifier
            .shown
            .lock()
            .await
            .iter()
            .map(|n| n.message.clone())
            .collect()
    }
}

async fn harness_with(presence: TestPresence, deck: TestDeck, notifier: TestNotifier) -> Harness {
    let dir = tempfile::tempdir().expect("tempdir");
    let online = dir.path().join("online.png");
    let invisible = dir.path().join("invisible.png");
    std::fs::write(&online, b"online-icon").expect("online icon");
    std::fs::write(&invisible, b"invisible-icon").expect("invisible icon");
    let icons = IconStore::load(&online, &invisible).await.expect("icons");

    let presence = Arc::new(presence);
    let deck = Arc::new(deck);
    let notifier = Arc::new(notifier);

    let controller = ToggleController::new(
        icons,
        PresenceClient::new(presence.clone(), CALL_TIMEOUT),
        DeviceSurface::new(deck.clone(), BUTTON, CALL_TIMEOUT),
        AlertSink::new(notifier.clone(), CALL_TIMEOUT),
        AlertPolicy::enabled(),
    );

    Harness {
        controller,
        presence,
        deck,
        notifier,
        dir,
    }
}

async fn harness() -> Harness {
    harness_with(
        TestPresence::default(),
        TestDeck::default(),
        TestNotifier::default(),
    )
    .await
}

#[tokio::test]
async fn starts_online() {
    let h = harness().await;
    assert_eq!(h.controller.current(), PresenceState::Online);
    assert!(h.presence_calls().await.is_empty());
}

#[tokio::test]
async fn parity_of_press_count_decides_state() {
    let mut h = harness().await;
    for presses in 1..=7 {
        h.controller.on_press().await;
        let expected = if presses % 2 == 0 {
            PresenceState::Online
        } else {
            PresenceState::Invisible
        };
        assert_eq!(h.controller.current(), expected, "after {presses} presses");
    }
}

#[tokio::test]
async fn two_presses_issue_alternating_presence_and_render_calls() {
    let mut h = harness().await;
    h.controller.on_press().await;
    h.controller.on_press().await;

    assert_eq!(
        h.presence_calls().await,
        vec![PresenceState::Invisible, PresenceState::Online]
    );
    assert_eq!(
        h.rendered_bytes().await,
        vec![b"invisible-icon".to_vec(), b"online-icon".to_vec()]
    );
    assert!(h
        .deck
        .renders
        .lock()
        .await
        .iter()
        .all(|(button, _)| *button == BUTTON));
}

#[tokio::test]
async fn rejected_icon_update_keeps_old_icons_for_rendering() {
    let mut h = harness().await;
    let replacement = h.dir.path().join("new-invisible.png");
    std::fs::write(&replacement, b"new-invisible-icon").expect("replacement");
    let missing = h.dir.path().join("does-not-exist.png");

    let err = h
        .controller
        .set_icons(&missing, &replacement)
        .await
        .expect_err("missing online icon");
    assert!(matches!(
        err,
        ValidationError::MissingIcon {
            state: PresenceState::Online,
            ..
        }
    ));

    h.controller.on_press().await;
    assert_eq!(h.rendered_bytes().await, vec![b"invisible-icon".to_vec()]);
    assert_eq!(h.controller.current(), PresenceState::Invisible);
}

#[tokio::test]
async fn accepted_icon_update_applies_to_next_render() {
    let mut h = harness().await;
    let online = h.dir.path().join("online-2.png");
    let invisible = h.dir.path().join("invisible-2.png");
    std::fs::write(&online, b"online-2").expect("online");
    std::fs::write(&invisible, b"invisible-2").expect("invisible");

    h.controller
        .set_icons(&online, &invisible)
        .await
        .expect("accepted");
    h.controller.on_press().await;
    h.controller.on_press().await;

    assert_eq!(
        h.rendered_bytes().await,
        vec![b"invisible-2".to_vec(), b"online-2".to_vec()]
    );
}

#[tokio::test]
async fn disabling_alerts_silences_the_next_toggle() {
    let mut h = harness().await;
    h.controller.on_press().await;
    h.controller.on_press().await;
    assert_eq!(h.alert_messages().await.len(), 2);

    h.controller.set_alerts_enabled(false);
    h.controller.on_press().await;

    assert_eq!(h.alert_messages().await.len(), 2);
    assert_eq!(h.presence_calls().await.len(), 3);
}

#[tokio::test]
async fn toggle_alerts_flips_policy() {
    let mut h = harness().await;
    assert!(!h.controller.toggle_alerts());
    assert!(!h.controller.alert_policy().alerts_enabled);
    assert!(h.controller.toggle_alerts());

    h.controller.on_press().await;
    assert_eq!(h.alert_messages().await.len(), 1);
}

#[tokio::test]
async fn presence_failure_still_renders_and_commits() {
    let mut h = harness_with(
        TestPresence::failing(1),
        TestDeck::default(),
        TestNotifier::default(),
    )
    .await;

    h.controller.on_press().await;
    assert_eq!(h.controller.current(), PresenceState::Invisible);
    assert_eq!(h.rendered_bytes().await, vec![b"invisible-icon".to_vec()]);

    h.controller.on_press().await;
    assert_eq!(h.controller.current(), PresenceState::Online);
    assert_eq!(
        h.presence_calls().await,
        vec![PresenceState::Invisible, PresenceState::Online]
    );
}

#[tokio::test]
async fn hung_presence_call_times_out_without_blocking_render() {
    let mut h = harness_with(
        TestPresence::hanging(),
        TestDeck::default(),
        TestNotifier::default(),
    )
    .await;

    tokio::time::timeout(Duration::from_secs(5), h.controller.on_press())
        .await
        .expect("press completes despite hung presence call");
    assert_eq!(h.controller.current(), PresenceState::Invisible);
    assert_eq!(h.rendered_bytes().await, vec![b"invisible-icon".to_vec()]);

    tokio::time::timeout(Duration::from_secs(5), h.controller.on_press())
        .await
        .expect("second press completes");
    assert_eq!(h.controller.current(), PresenceState::Online);
}

#[tokio::test]
async fn hung_render_times_out_and_state_still_advances() {
    let mut h = harness_with(
        TestPresence::default(),
        TestDeck {
            hang: true,
            ..TestDeck::default()
        },
        TestNotifier::default(),
    )
    .await;

    tokio::time::timeout(Duration::from_secs(5), h.controller.on_press())
        .await
        .expect("press completes despite hung render");
    assert_eq!(h.controller.current(), PresenceState::Invisible);
    assert_eq!(h.presence_calls().await, vec![PresenceState::Invisible]);

    tokio::time::timeout(Duration::from_secs(5), h.controller.on_press())
        .await
        .expect("second press completes");
    assert_eq!(h.controller.current(), PresenceState::Online);
    assert_eq!(
        h.presence_calls().await,
        vec![PresenceState::Invisible, PresenceState::Online]
    );
}

#[tokio::test]
async fn surface_render_reports_timeout_for_hung_device() {
    let h = harness_with(
        TestPresence::default(),
        TestDeck {
            hang: true,
            ..TestDeck::default()
        },
        TestNotifier::default(),
    )
    .await;
    let surface = DeviceSurface::new(h.deck.clone(), BUTTON, CALL_TIMEOUT);

    let err = surface
        .render(h.controller.icons(), PresenceState::Invisible)
        .await
        .expect_err("hung device");
    assert!(matches!(err, RenderError::TimedOut(after) if after == CALL_TIMEOUT));
}

#[tokio::test]
async fn hung_notifier_does_not_hold_up_presses() {
    let mut h = harness_with(
        TestPresence::default(),
        TestDeck::default(),
        TestNotifier {
            hang: true,
            ..TestNotifier::default()
        },
    )
    .await;

    tokio::time::timeout(CALL_TIMEOUT / 2, h.controller.on_press())
        .await
        .expect("press returns before the alert times out");
    tokio::time::timeout(CALL_TIMEOUT / 2, h.controller.on_press())
        .await
        .expect("next press is not queued behind the alert");
    assert_eq!(h.controller.current(), PresenceState::Online);

    tokio::time::timeout(Duration::from_secs(5), h.controller.flush_alert())
        .await
        .expect("alert is bounded by its timeout");
    assert_eq!(h.alert_messages().await.len(), 2);
}

#[tokio::test]
async fn render_failure_does_not_block_presence_or_alert() {
    let mut h = harness_with(
        TestPresence::default(),
        TestDeck {
            fail: true,
            ..TestDeck::default()
        },
        TestNotifier::default(),
    )
    .await;

    h.controller.on_press().await;

    assert_eq!(h.controller.current(), PresenceState::Invisible);
    assert_eq!(h.presence_calls().await, vec![PresenceState::Invisible]);
    assert_eq!(
        h.alert_messages().await,
        vec!["Steam status changed to: invisible".to_string()]
    );
}

#[tokio::test]
async fn notifier_failure_is_swallowed() {
    let mut h = harness_with(
        TestPresence::default(),
        TestDeck::default(),
        TestNotifier {
            fail: true,
            ..TestNotifier::default()
        },
    )
    .await;

    h.controller.on_press().await;
    h.controller.on_press().await;

    assert_eq!(h.controller.current(), PresenceState::Online);
    assert_eq!(h.alert_messages().await.len(), 2);
}

#[tokio::test]
async fn press_then_press_again_end_to_end() {
    let mut h = harness().await;

    h.controller.on_press().await;
    assert_eq!(h.presence_calls().await, vec![PresenceState::Invisible]);
    assert_eq!(h.rendered_bytes().await, vec![b"invisible-icon".to_vec()]);
    h.controller.flush_alert().await;
    {
        let shown = h.notifier.shown.lock().await;
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].title, DEFAULT_ALERT_TITLE);
        assert_eq!(shown[0].message, "Steam status changed to: invisible");
        assert_eq!(shown[0].timeout, Duration::from_secs(1));
    }

    h.controller.on_press().await;
    assert_eq!(
        h.presence_calls().await,
        vec![PresenceState::Invisible, PresenceState::Online]
    );
    assert_eq!(
        h.rendered_bytes().await,
        vec![b"invisible-icon".to_vec(), b"online-icon".to_vec()]
    );
    assert_eq!(
        h.alert_messages().await.last().map(String::as_str),
        Some("Steam status changed to: online")
    );
}

#[tokio::test]
async fn run_applies_commands_in_order_and_returns_when_closed() {
    let Harness {
        controller,
        presence,
        notifier,
        dir,
        ..
    } = harness().await;
    let (tx, rx) = command_channel();
    let (reply_tx, reply_rx) = oneshot::channel();

    tx.send(ControllerCommand::Press(PressEvent::new(BUTTON)))
        .await
        .expect("send");
    tx.send(ControllerCommand::Press(PressEvent::new(ButtonIndex(7))))
        .await
        .expect("send");
    tx.send(ControllerCommand::SetIcons {
        online: dir.path().join("missing.png"),
        invisible: dir.path().join("invisible.png"),
        reply: Some(reply_tx),
    })
    .await
    .expect("send");
    tx.send(ControllerCommand::ToggleAlerts).await.expect("send");
    tx.send(ControllerCommand::Press(PressEvent::new(BUTTON)))
        .await
        .expect("send");
    drop(tx);

    let controller = controller.run(rx).await;

    assert_eq!(controller.current(), PresenceState::Online);
    assert!(!controller.alert_policy().alerts_enabled);
    assert_eq!(
        *presence.calls.lock().await,
        vec![PresenceState::Invisible, PresenceState::Online]
    );
    assert_eq!(notifier.shown.lock().await.len(), 1);
    assert!(reply_rx.await.expect("reply").is_err());
}

#[tokio::test]
async fn forward_presses_preserves_order_without_coalescing() {
    let (press_tx, press_rx) = mpsc::unbounded_channel();
    let (tx, mut rx) = command_channel();
    for button in [0, 0, 3] {
        press_tx
            .send(PressEvent::new(ButtonIndex(button)))
            .expect("press");
    }
    drop(press_tx);

    forward_presses(press_rx, tx).await;

    let mut forwarded = Vec::new();
    while let Some(command) = rx.recv().await {
        match command {
            ControllerCommand::Press(event) => forwarded.push(event.button.0),
            other => panic!("unexpected command: {other:?}"),
        }
    }
    assert_eq!(forwarded, vec![0, 0, 3]);
}
