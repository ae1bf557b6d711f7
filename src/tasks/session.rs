use std::time::Duration;

use anyhow::Result;
use tokio::select;
use tokio::sync::mpsc::{Sender, UnboundedReceiver};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::events::{KeyEvent, SlideshowEvent, SlideshowInput};
use crate::slideshow::autoplay::RepeatingTask;
use crate::slideshow::input::KeySubscription;
use crate::slideshow::{
    Command, LoadOutcome, SlideshowController, SlideshowSnapshot, command_for_key,
};

/// Drives one slideshow session until it is closed.
///
/// Rules:
/// - Every transition happens synchronously inside one `select!` arm and is
///   followed by a `Changed` snapshot.
/// - Inputs from `input_rx` (keys, buttons, load signals) apply in the order
///   they were sent. The shared keyboard subscription is a separate source.
/// - The autoplay timer is disarmed and re-armed on every playback change and
///   fires `advance()` once per period while playing.
/// - Load signals for a superseded ticket are dropped.
/// - The key subscription lives exactly as long as this task.
/// - On exit (Escape, a `Close` command, cancellation, or all inputs gone)
///   the timer is disarmed and `Closed` is sent once.
#[instrument(skip_all, fields(len = controller.len(), start = controller.position()))]
pub async fn run(
    mut controller: SlideshowController,
    mut keys: KeySubscription,
    mut input_rx: UnboundedReceiver<SlideshowInput>,
    events: Sender<SlideshowEvent>,
    cancel: CancellationToken,
    autoplay_interval: Duration,
) -> Result<SlideshowSnapshot> {
    let mut autoplay = RepeatingTask::new(autoplay_interval);
    autoplay.sync(controller.is_playing());
    let mut keys_open = true;
    let mut inputs_open = true;

    info!("slideshow session started");
    let mut owner_open = publish(&events, controller.snapshot(), &cancel).await;

    while owner_open {
        if !keys_open && !inputs_open {
            debug!("all session inputs closed");
            break;
        }

        let changed = select! {
            _ = cancel.cancelled() => break,

            maybe_key = keys.recv(), if keys_open => match maybe_key {
                Some(event) => match key_command(event) {
                    Some(command) => {
                        if !step(&mut controller, &mut autoplay, command) {
                            break;
                        }
                        true
                    }
                    None => false,
                },
                None => {
                    keys_open = false;
                    false
                }
            },

            maybe_input = input_rx.recv(), if inputs_open => match maybe_input {
                Some(SlideshowInput::Key(event)) => match key_command(event) {
                    Some(command) => {
                        if !step(&mut controller, &mut autoplay, command) {
                            break;
                        }
                        true
                    }
                    None => false,
                },
                Some(SlideshowInput::Command(command)) => {
                    if !step(&mut controller, &mut autoplay, command) {
                        break;
                    }
                    true
                }
                Some(SlideshowInput::ImageLoaded(ticket)) => {
                    controller.mark_loaded(ticket) == LoadOutcome::Applied
                }
                Some(SlideshowInput::ImageFailed(ticket)) => {
                    let applied = controller.mark_failed(ticket) == LoadOutcome::Applied;
                    if applied {
                        warn!(url = %controller.current().url, "image failed to load");
                    }
                    applied
                }
                None => {
                    inputs_open = false;
                    false
                }
            },

            _ = autoplay.tick() => {
                controller.advance();
                true
            }
        };

        if changed {
            owner_open = publish(&events, controller.snapshot(), &cancel).await;
        }
    }

    autoplay.disarm();
    drop(keys);
    let last = controller.close();
    info!(position = last.position, "slideshow session closed");
    if events.send(SlideshowEvent::Closed).await.is_err() {
        debug!("session owner gone before close notification");
    }
    Ok(last)
}

/// Sends a snapshot unless the session is cancelled first. Returns `false`
/// when the session must stop.
async fn publish(
    events: &Sender<SlideshowEvent>,
    snapshot: SlideshowSnapshot,
    cancel: &CancellationToken,
) -> bool {
    select! {
        _ = cancel.cancelled() => false,
        res = events.send(SlideshowEvent::Changed(snapshot)) => {
            if res.is_err() {
                warn!("session owner channel closed");
            }
            res.is_ok()
        }
    }
}

fn key_command(event: KeyEvent) -> Option<Command> {
    let command = command_for_key(event.key).command;
    if let Some(command) = command {
        debug!(key = ?event.key, ?command, "key press");
    }
    command
}

/// Applies one command and keeps the timer in step with `playing`.
/// Returns `false` when the session must close.
fn step(
    controller: &mut SlideshowController,
    autoplay: &mut RepeatingTask,
    command: Command,
) -> bool {
    let was_playing = controller.is_playing();
    if !controller.apply(command) {
        return false;
    }
    if controller.is_playing() != was_playing {
        autoplay.sync(controller.is_playing());
    }
    true
}
