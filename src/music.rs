//! Background music widget shown next to the gallery.
//!
//! Purely decorative: it keeps its own play/pause and track state and never
//! talks to the slideshow.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Track {
    pub id: u32,
    pub title: String,
    pub artist: String,
    pub duration: Duration,
}

impl Track {
    fn new(id: u32, title: &str, artist: &str, secs: u64) -> Self {
        Self {
            id,
            title: title.to_string(),
            artist: artist.to_string(),
            duration: Duration::from_secs(secs),
        }
    }

    /// `m:ss`, as printed under the progress bar.
    pub fn duration_label(&self) -> String {
        let secs = self.duration.as_secs();
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

fn sample_tracks() -> Vec<Track> {
    vec![
        Track::new(1, "Ambient Slideshow", "Nature Sounds", 204),
        Track::new(2, "Peaceful Moments", "Instrumental", 252),
        Track::new(3, "Memory Lane", "Acoustic", 178),
        Track::new(4, "Gentle Breeze", "Piano Solo", 225),
    ]
}

#[derive(Debug, Clone)]
pub struct MusicPlayer {
    tracks: Vec<Track>,
    current: usize,
    playing: bool,
    /// Percent, 0..=100.
    progress: u8,
    /// Percent, 0..=100.
    volume: u8,
    show_playlist: bool,
}

impl MusicPlayer {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks,
            current: 0,
            playing: false,
            progress: 0,
            volume: 75,
            show_playlist: false,
        }
    }

    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.tracks.get(self.current)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn progress(&self) -> u8 {
        self.progress
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    pub fn is_playlist_shown(&self) -> bool {
        self.show_playlist
    }

    pub fn toggle_play(&mut self) {
        self.playing = !self.playing;
    }

    pub fn next_track(&mut self) {
        if !self.tracks.is_empty() {
            self.current = (self.current + 1) % self.tracks.len();
        }
    }

    pub fn previous_track(&mut self) {
        let len = self.tracks.len();
        if len > 0 {
            self.current = (self.current + len - 1) % len;
        }
    }

    /// Jumps to a playlist entry; unknown indices are ignored.
    pub fn select_track(&mut self, index: usize) {
        if index < self.tracks.len() {
            self.current = index;
        }
    }

    pub fn set_volume(&mut self, volume: u8) {
        self.volume = volume.min(100);
    }

    pub fn set_progress(&mut self, progress: u8) {
        self.progress = progress.min(100);
    }

    pub fn toggle_playlist(&mut self) {
        self.show_playlist = !self.show_playlist;
    }

    /// Label of the playlist button, e.g. `"Show Playlist (4)"`.
    pub fn playlist_label(&self) -> String {
        let verb = if self.show_playlist { "Hide" } else { "Show" };
        format!("{verb} Playlist ({})", self.tracks.len())
    }
}

impl Default for MusicPlayer {
    fn default() -> Self {
        Self::new(sample_tracks())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_cycle_both_ways() {
        let mut player = MusicPlayer::default();
        player.previous_track();
        assert_eq!(player.current_track().unwrap().title, "Gentle Breeze");
        player.next_track();
        player.next_track();
        assert_eq!(player.current_index(), 1);
    }

    #[test]
    fn sliders_clamp_to_percent() {
        let mut player = MusicPlayer::default();
        assert_eq!(player.volume(), 75);
        player.set_volume(180);
        player.set_progress(101);
        assert_eq!(player.volume(), 100);
        assert_eq!(player.progress(), 100);
    }

    #[test]
    fn labels() {
        let mut player = MusicPlayer::default();
        assert_eq!(player.current_track().unwrap().duration_label(), "3:24");
        assert_eq!(player.playlist_label(), "Show Playlist (4)");
        player.toggle_playlist();
        assert_eq!(player.playlist_label(), "Hide Playlist (4)");
        player.select_track(9);
        assert_eq!(player.current_index(), 0);
    }

    #[test]
    fn empty_playlist_is_inert() {
        let mut player = MusicPlayer::new(Vec::new());
        player.next_track();
        player.previous_track();
        assert!(player.current_track().is_none());
    }
}
