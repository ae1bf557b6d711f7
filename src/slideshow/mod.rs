//! Slideshow navigation and playback state.
//!
//! The controller is a small synchronous state machine over a fixed snapshot
//! of photos. Two orthogonal flags make up its visible state:
//!
//! - `playing` (initially off), toggled by Enter or the play button;
//! - the load state of the current image (initially pending), which returns
//!   to pending on every position change.
//!
//! Image-load completions race with navigation, so each position change opens
//! a new generation and completions carry the [`LoadTicket`] they were issued
//! for. A ticket from an older generation is rejected.
//!
//! Timers and keyboard subscriptions live in [`autoplay`] and [`input`]; the
//! async session in `tasks::session` wires them to a controller.

pub mod autoplay;
pub mod input;

use std::sync::Arc;

use tracing::debug;

use crate::catalog::Photo;
use crate::error::{Error, Result};
use crate::events::{Key, KeyEvent};

/// Something the user asked the slideshow to do, by key or by button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Advance,
    Retreat,
    TogglePlay,
    Reset,
    Close,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    Pending,
    Ready,
    /// The image source resolved to nothing displayable.
    Failed,
}

/// Identifies the image request for one position change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LoadTicket {
    pub generation: u64,
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied,
    /// The ticket belongs to a superseded position; nothing changed.
    Stale,
}

/// Result of routing a key press through the slideshow key map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyOutcome {
    pub command: Option<Command>,
    /// The host should suppress the key's default action (page scroll for Space).
    pub prevent_default: bool,
}

/// Maps a key to its slideshow command.
pub fn command_for_key(key: Key) -> KeyOutcome {
    let (command, prevent_default) = match key {
        Key::ArrowLeft => (Some(Command::Retreat), false),
        Key::ArrowRight => (Some(Command::Advance), true),
        Key::Space => (Some(Command::Advance), true),
        Key::Escape => (Some(Command::Close), false),
        Key::Enter => (Some(Command::TogglePlay), false),
        Key::Other => (None, false),
    };
    KeyOutcome {
        command,
        prevent_default,
    }
}

/// Everything a view needs to draw the current slide.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideshowSnapshot {
    pub position: usize,
    pub len: usize,
    pub playing: bool,
    pub load: LoadState,
    pub ticket: LoadTicket,
    pub photo: Photo,
}

impl SlideshowSnapshot {
    /// One-based counter text, e.g. `"3 / 4"`.
    pub fn counter(&self) -> String {
        format!("{} / {}", self.position + 1, self.len)
    }
}

#[derive(Debug, Clone)]
pub struct SlideshowController {
    sequence: Arc<[Photo]>,
    position: usize,
    playing: bool,
    load: LoadState,
    generation: u64,
}

impl SlideshowController {
    /// Starts a session over `sequence`. An out-of-range `start` wraps
    /// modulo the sequence length.
    pub fn new(sequence: impl Into<Arc<[Photo]>>, start: usize) -> Result<Self> {
        let sequence = sequence.into();
        if sequence.is_empty() {
            return Err(Error::EmptySlideshow);
        }
        let position = start % sequence.len();
        debug!(position, len = sequence.len(), "slideshow: created");
        Ok(Self {
            sequence,
            position,
            playing: false,
            load: LoadState::Pending,
            generation: 0,
        })
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    /// Never true for a constructed controller.
    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn load_state(&self) -> LoadState {
        self.load
    }

    pub fn is_loaded(&self) -> bool {
        self.load == LoadState::Ready
    }

    pub fn sequence(&self) -> &[Photo] {
        &self.sequence
    }

    pub fn current(&self) -> &Photo {
        &self.sequence[self.position]
    }

    pub fn current_ticket(&self) -> LoadTicket {
        LoadTicket {
            generation: self.generation,
            position: self.position,
        }
    }

    pub fn advance(&mut self) {
        let next = (self.position + 1) % self.len();
        self.move_to(next);
    }

    pub fn retreat(&mut self) {
        let len = self.len();
        let prev = (self.position + len - 1) % len;
        self.move_to(prev);
    }

    /// Flips `playing` and returns the new value.
    pub fn toggle_play(&mut self) -> bool {
        self.set_playing(!self.playing);
        self.playing
    }

    pub fn set_playing(&mut self, playing: bool) {
        if self.playing != playing {
            debug!(playing, "slideshow: playback toggled");
        }
        self.playing = playing;
    }

    /// Returns to the first photo and stops playback.
    ///
    /// Only an actual move to index 0 re-gates the image; resetting while
    /// already on the first photo keeps its load state and ticket.
    pub fn reset(&mut self) {
        self.set_playing(false);
        if self.position != 0 {
            self.move_to(0);
        }
    }

    pub fn mark_loaded(&mut self, ticket: LoadTicket) -> LoadOutcome {
        self.settle(ticket, LoadState::Ready)
    }

    pub fn mark_failed(&mut self, ticket: LoadTicket) -> LoadOutcome {
        self.settle(ticket, LoadState::Failed)
    }

    /// Applies a command. Returns `false` for `Close`, which the owner must
    /// follow with [`close`](Self::close).
    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Advance => self.advance(),
            Command::Retreat => self.retreat(),
            Command::TogglePlay => {
                self.toggle_play();
            }
            Command::Reset => self.reset(),
            Command::Close => return false,
        }
        true
    }

    pub fn handle_key(&mut self, event: KeyEvent) -> KeyOutcome {
        let outcome = command_for_key(event.key);
        if let Some(command) = outcome.command {
            self.apply(command);
        }
        outcome
    }

    pub fn snapshot(&self) -> SlideshowSnapshot {
        SlideshowSnapshot {
            position: self.position,
            len: self.len(),
            playing: self.playing,
            load: self.load,
            ticket: self.current_ticket(),
            photo: self.current().clone(),
        }
    }

    /// Ends the session and hands back the final state.
    pub fn close(self) -> SlideshowSnapshot {
        debug!(position = self.position, "slideshow: closed");
        self.snapshot()
    }

    fn move_to(&mut self, position: usize) {
        self.position = position;
        self.generation += 1;
        self.load = LoadState::Pending;
        debug!(
            position,
            len = self.len(),
            generation = self.generation,
            "slideshow: moved"
        );
    }

    fn settle(&mut self, ticket: LoadTicket, state: LoadState) -> LoadOutcome {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "slideshow: ignoring stale load signal"
            );
            return LoadOutcome::Stale;
        }
        self.load = state;
        LoadOutcome::Applied
    }
}
