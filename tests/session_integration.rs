use photo_flow::catalog::{Photo, PhotoId};
use photo_flow::events::{Key, KeyEvent, SlideshowEvent, SlideshowInput};
use photo_flow::slideshow::input::KeyboardBus;
use photo_flow::slideshow::{Command, LoadState, SlideshowController, SlideshowSnapshot};
use photo_flow::tasks::session;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

const AUTOPLAY: Duration = Duration::from_millis(4000);

fn photos(n: u64) -> Vec<Photo> {
    (0..n)
        .map(|i| Photo {
            id: PhotoId(100 + i),
            url: format!("https://example.com/{i}.jpg"),
            title: format!("photo {i}"),
            description: None,
            album: "Trip".to_string(),
        })
        .collect()
}

struct Harness {
    bus: KeyboardBus,
    input: mpsc::UnboundedSender<SlideshowInput>,
    events: mpsc::Receiver<SlideshowEvent>,
    cancel: CancellationToken,
    handle: JoinHandle<anyhow::Result<SlideshowSnapshot>>,
}

impl Harness {
    fn start(n: u64, start: usize) -> Self {
        let bus = KeyboardBus::new(16);
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel(64);
        let cancel = CancellationToken::new();
        let controller = SlideshowController::new(photos(n), start).unwrap();
        let handle = tokio::spawn(session::run(
            controller,
            bus.subscribe(),
            input_rx,
            event_tx,
            cancel.clone(),
            AUTOPLAY,
        ));
        Self {
            bus,
            input: input_tx,
            events: event_rx,
            cancel,
            handle,
        }
    }

    async fn next_event(&mut self) -> SlideshowEvent {
        tokio::time::timeout(Duration::from_secs(60), self.events.recv())
            .await
            .expect("timeout waiting for session event")
            .expect("session event channel closed")
    }

    async fn next_snapshot(&mut self) -> SlideshowSnapshot {
        match self.next_event().await {
            SlideshowEvent::Changed(snapshot) => snapshot,
            other => panic!("expected a snapshot, got {other:?}"),
        }
    }

    async fn press(&mut self, key: Key) -> SlideshowSnapshot {
        assert_eq!(self.bus.publish(key.into()), 1, "session must be subscribed");
        self.next_snapshot().await
    }

    /// Drains remaining events and returns how many `Closed` were seen.
    async fn closed_count(mut self) -> (usize, SlideshowSnapshot, KeyboardBus) {
        let mut closed = 0;
        while let Some(event) = self.events.recv().await {
            if matches!(event, SlideshowEvent::Closed) {
                closed += 1;
            }
        }
        let last = self.handle.await.unwrap().unwrap();
        (closed, last, self.bus)
    }
}

#[tokio::test(start_paused = true)]
async fn arrow_keys_follow_cyclic_order() {
    let mut h = Harness::start(4, 2);
    assert_eq!(h.next_snapshot().await.position, 2);

    assert_eq!(h.press(Key::ArrowRight).await.position, 3);
    assert_eq!(h.press(Key::ArrowRight).await.position, 0);
    assert_eq!(h.press(Key::ArrowLeft).await.position, 3);
    assert_eq!(h.press(Key::Space).await.position, 0);

    h.cancel.cancel();
    let (closed, last, _) = h.closed_count().await;
    assert_eq!(closed, 1);
    assert_eq!(last.position, 0);
}

#[tokio::test(start_paused = true)]
async fn enter_starts_autoplay_every_four_seconds() {
    let mut h = Harness::start(4, 1);
    h.next_snapshot().await;

    let started = Instant::now();
    let toggled = h.press(Key::Enter).await;
    assert!(toggled.playing);
    assert_eq!(toggled.position, 1);

    let mut last = toggled;
    for _ in 0..3 {
        last = h.next_snapshot().await;
    }
    let elapsed = started.elapsed();
    assert_eq!(last.position, (1 + 3) % 4);
    assert!(last.playing);
    assert!(elapsed >= Duration::from_millis(12_000), "{elapsed:?}");
    assert!(elapsed < Duration::from_millis(12_100), "{elapsed:?}");

    // Pausing stops the ticks.
    let paused = h.press(Key::Enter).await;
    assert!(!paused.playing);
    let quiet = tokio::time::timeout(Duration::from_secs(20), h.events.recv()).await;
    assert!(quiet.is_err(), "no autoplay tick expected while paused");

    h.cancel.cancel();
    let (closed, _, _) = h.closed_count().await;
    assert_eq!(closed, 1);
}

#[tokio::test(start_paused = true)]
async fn rapid_toggling_does_not_stack_timers() {
    let mut h = Harness::start(5, 0);
    h.next_snapshot().await;

    for _ in 0..7 {
        h.press(Key::Enter).await;
    }
    // Seven toggles leave playback on with exactly one timer.
    let started = Instant::now();
    let first = h.next_snapshot().await;
    assert_eq!(first.position, 1);
    let second = h.next_snapshot().await;
    assert_eq!(second.position, 2);
    assert!(started.elapsed() >= Duration::from_millis(8_000));

    h.cancel.cancel();
    h.closed_count().await;
}

#[tokio::test(start_paused = true)]
async fn escape_closes_once_and_releases_keyboard() {
    let mut h = Harness::start(3, 0);
    h.next_snapshot().await;
    assert_eq!(h.bus.subscriber_count(), 1);

    h.press(Key::Enter).await;
    assert!(h.bus.publish(Key::Escape.into()) == 1);
    assert!(matches!(h.next_event().await, SlideshowEvent::Closed));

    let (closed, last, bus) = h.closed_count().await;
    assert_eq!(closed, 0, "Closed must not repeat");
    assert!(last.playing);
    assert_eq!(bus.subscriber_count(), 0);
    assert_eq!(bus.publish(Key::ArrowRight.into()), 0);
}

#[tokio::test(start_paused = true)]
async fn close_button_behaves_like_escape() {
    let mut h = Harness::start(2, 1);
    h.next_snapshot().await;
    h.input.send(SlideshowInput::Command(Command::Close)).unwrap();
    assert!(matches!(h.next_event().await, SlideshowEvent::Closed));
    let (closed, last, bus) = h.closed_count().await;
    assert_eq!(closed, 0);
    assert_eq!(last.position, 1);
    assert_eq!(bus.subscriber_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn late_load_signal_is_ignored() {
    let mut h = Harness::start(3, 0);
    let first = h.next_snapshot().await;
    assert_eq!(first.load, LoadState::Pending);

    let moved = h.press(Key::ArrowRight).await;
    h.input.send(SlideshowInput::ImageLoaded(first.ticket)).unwrap();
    h.input.send(SlideshowInput::ImageLoaded(moved.ticket)).unwrap();

    let ready = h.next_snapshot().await;
    assert_eq!(ready.position, 1);
    assert_eq!(ready.load, LoadState::Ready);

    let after = h.press(Key::ArrowLeft).await;
    assert_eq!(after.load, LoadState::Pending);

    h.cancel.cancel();
    h.closed_count().await;
}

#[tokio::test(start_paused = true)]
async fn reset_button_stops_playback_at_first_photo() {
    let mut h = Harness::start(4, 2);
    h.next_snapshot().await;
    assert!(h.press(Key::Enter).await.playing);

    h.input.send(SlideshowInput::Command(Command::Reset)).unwrap();
    let reset = h.next_snapshot().await;
    assert_eq!(reset.position, 0);
    assert!(!reset.playing);

    let quiet = tokio::time::timeout(Duration::from_secs(10), h.events.recv()).await;
    assert!(quiet.is_err(), "reset must disarm autoplay");

    h.cancel.cancel();
    h.closed_count().await;
}

#[tokio::test(start_paused = true)]
async fn session_closes_when_all_inputs_are_gone() {
    let Harness {
        bus,
        input,
        mut events,
        handle,
        ..
    } = Harness::start(2, 0);
    assert!(matches!(events.recv().await, Some(SlideshowEvent::Changed(_))));
    drop(input);
    drop(bus);
    assert!(matches!(events.recv().await, Some(SlideshowEvent::Closed)));
    assert!(events.recv().await.is_none());
    handle.await.unwrap().unwrap();
}

#[tokio::test(start_paused = true)]
async fn queued_key_and_button_apply_in_send_order() {
    let mut h = Harness::start(3, 0);
    h.next_snapshot().await;

    let right = SlideshowInput::Key(KeyEvent::from(Key::ArrowRight));
    h.input.send(right).unwrap();
    h.input.send(SlideshowInput::Command(Command::Reset)).unwrap();
    h.input.send(right).unwrap();
    h.input.send(SlideshowInput::Key(KeyEvent::from(Key::Escape))).unwrap();

    let positions = [
        h.next_snapshot().await.position,
        h.next_snapshot().await.position,
        h.next_snapshot().await.position,
    ];
    assert_eq!(positions, [1, 0, 1]);
    assert!(matches!(h.next_event().await, SlideshowEvent::Closed));
    let (closed, last, _) = h.closed_count().await;
    assert_eq!(closed, 0);
    assert_eq!(last.position, 1);
}
