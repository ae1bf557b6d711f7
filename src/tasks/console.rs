use std::io::Write;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::select;
use tokio::sync::mpsc::{Receiver, UnboundedSender};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::events::{Key, KeyEvent, SlideshowEvent, SlideshowInput};
use crate::slideshow::{Command, LoadState, LoadTicket, SlideshowSnapshot};

/// One line typed on the console.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleLine {
    /// A key press, ordered with the other console lines.
    Key(Key),
    /// A control button.
    Button(Command),
    /// The current image finished loading.
    Loaded,
    /// The current image could not be displayed.
    Failed,
}

pub fn parse_line(line: &str) -> Option<ConsoleLine> {
    if let Some(key) = Key::from_name(line) {
        return Some(ConsoleLine::Key(key));
    }
    let parsed = match line.trim().to_ascii_lowercase().as_str() {
        "next" => ConsoleLine::Button(Command::Advance),
        "prev" | "previous" => ConsoleLine::Button(Command::Retreat),
        "play" | "pause" => ConsoleLine::Button(Command::TogglePlay),
        "reset" => ConsoleLine::Button(Command::Reset),
        "close" | "quit" | "q" => ConsoleLine::Button(Command::Close),
        "loaded" => ConsoleLine::Loaded,
        "failed" => ConsoleLine::Failed,
        _ => return None,
    };
    Some(parsed)
}

/// Renders one slide as text.
pub fn render(snapshot: &SlideshowSnapshot) -> String {
    let state = if snapshot.playing { "playing" } else { "paused" };
    let image = match snapshot.load {
        LoadState::Pending => "loading",
        LoadState::Ready => "shown",
        LoadState::Failed => "unavailable",
    };
    let dots: String = (0..snapshot.len)
        .map(|i| if i == snapshot.position { '●' } else { '○' })
        .collect();
    let mut out = format!(
        "[{}] {} {} ({image})\n  {}\n  {}",
        snapshot.counter(),
        state,
        dots,
        snapshot.photo.title,
        snapshot.photo.url
    );
    if let Some(description) = &snapshot.photo.description {
        out.push_str("\n  ");
        out.push_str(description);
    }
    out
}

/// Terminal front end for one slideshow session.
///
/// Reads commands line by line from `reader` and forwards keys, buttons and
/// load signals to the session over one ordered channel, so lines apply in
/// the order they were typed. End of input is forwarded as a `Close` after
/// everything read before it. Every snapshot is printed to `out`. Returns
/// once the session reports `Closed`.
///
/// Forwarding never waits, so the console keeps draining `events` however
/// fast lines arrive.
pub async fn run<R, W>(
    reader: R,
    out: &mut W,
    to_session: UnboundedSender<SlideshowInput>,
    mut events: Receiver<SlideshowEvent>,
    cancel: CancellationToken,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = reader.lines();
    let mut latest: Option<LoadTicket> = None;
    let mut reading = true;

    loop {
        select! {
            _ = cancel.cancelled() => break,

            maybe_event = events.recv() => match maybe_event {
                Some(SlideshowEvent::Changed(snapshot)) => {
                    latest = Some(snapshot.ticket);
                    writeln!(out, "{}", render(&snapshot)).context("writing slide")?;
                }
                Some(SlideshowEvent::Closed) | None => {
                    writeln!(out, "slideshow closed").context("writing slide")?;
                    break;
                }
            },

            line = lines.next_line(), if reading => match line.context("reading console")? {
                Some(line) => match parse_line(&line) {
                    Some(parsed) => {
                        if let Some(input) = to_input(parsed, latest) {
                            forward(&to_session, input);
                        }
                    }
                    None if line.trim().is_empty() => {}
                    None => {
                        writeln!(out, "unknown command: {}", line.trim())
                            .context("writing prompt")?;
                    }
                },
                None => {
                    debug!("console input closed; closing slideshow");
                    reading = false;
                    forward(&to_session, SlideshowInput::Command(Command::Close));
                }
            },
        }
    }
    Ok(())
}

/// Load signals refer to the last slide shown; they are dropped before the
/// first one.
fn to_input(line: ConsoleLine, latest: Option<LoadTicket>) -> Option<SlideshowInput> {
    match line {
        ConsoleLine::Key(key) => Some(SlideshowInput::Key(KeyEvent::from(key))),
        ConsoleLine::Button(command) => Some(SlideshowInput::Command(command)),
        ConsoleLine::Loaded => latest.map(SlideshowInput::ImageLoaded),
        ConsoleLine::Failed => latest.map(SlideshowInput::ImageFailed),
    }
}

fn forward(to_session: &UnboundedSender<SlideshowInput>, input: SlideshowInput) {
    if to_session.send(input).is_err() {
        warn!("session input channel closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_keys_and_buttons() {
        assert_eq!(parse_line("left"), Some(ConsoleLine::Key(Key::ArrowLeft)));
        assert_eq!(parse_line(" Space "), Some(ConsoleLine::Key(Key::Space)));
        assert_eq!(parse_line("ESC"), Some(ConsoleLine::Key(Key::Escape)));
        assert_eq!(parse_line("reset"), Some(ConsoleLine::Button(Command::Reset)));
        assert_eq!(parse_line("loaded"), Some(ConsoleLine::Loaded));
        assert_eq!(parse_line("jump"), None);
    }

    #[test]
    fn load_signals_need_a_shown_slide() {
        assert!(to_input(ConsoleLine::Loaded, None).is_none());
        let ticket = LoadTicket { generation: 3, position: 1 };
        assert!(matches!(
            to_input(ConsoleLine::Failed, Some(ticket)),
            Some(SlideshowInput::ImageFailed(t)) if t == ticket
        ));
        assert!(matches!(
            to_input(ConsoleLine::Key(Key::Escape), None),
            Some(SlideshowInput::Key(KeyEvent { key: Key::Escape }))
        ));
    }
}
