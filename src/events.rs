use crate::slideshow::{Command, LoadTicket, SlideshowSnapshot};

/// Keys the slideshow reacts to; everything else arrives as `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    ArrowLeft,
    ArrowRight,
    Space,
    Escape,
    Enter,
    Other,
}

impl Key {
    /// Parses the names used on the console (`left`, `space`, `esc`, ...).
    pub fn from_name(name: &str) -> Option<Self> {
        let key = match name.trim().to_ascii_lowercase().as_str() {
            "left" | "arrowleft" => Self::ArrowLeft,
            "right" | "arrowright" => Self::ArrowRight,
            "space" => Self::Space,
            "esc" | "escape" => Self::Escape,
            "enter" | "return" => Self::Enter,
            _ => return None,
        };
        Some(key)
    }
}

/// A key press as published on the process-wide keyboard bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        Self { key }
    }
}

/// Session-scoped input, applied in the order it was sent.
#[derive(Debug, Clone, Copy)]
pub enum SlideshowInput {
    /// A key press from the session's own front end.
    Key(KeyEvent),
    Command(Command),
    ImageLoaded(LoadTicket),
    ImageFailed(LoadTicket),
}

/// Emitted by the session task to its owner.
#[derive(Debug, Clone)]
pub enum SlideshowEvent {
    /// State changed; carries what the view needs to redraw.
    Changed(SlideshowSnapshot),
    /// The session ended. Sent exactly once.
    Closed,
}
