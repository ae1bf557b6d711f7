use std::collections::HashSet;
use std::fmt;
use std::path::Path;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

/// Title used when a photo is added without one.
pub const UNTITLED_PHOTO: &str = "Untitled Photo";

/// Reserved album label meaning "no filter".
pub const ALL_ALBUMS: &str = "All";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoId(pub u64);

impl PhotoId {
    /// Id derived from the current wall clock, in Unix milliseconds.
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis().max(0) as u64)
    }
}

impl fmt::Display for PhotoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Photo {
    pub id: PhotoId,
    /// Remote URI or `data:` URI. Never inspected.
    pub url: String,
    #[serde(default = "Photo::default_title")]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub album: String,
}

impl Photo {
    fn default_title() -> String {
        UNTITLED_PHOTO.to_string()
    }
}

/// Which slice of the catalog the gallery shows.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AlbumFilter {
    #[default]
    All,
    Named(String),
}

impl AlbumFilter {
    /// Maps a label from the album bar; `"All"` is the reserved pseudo-album.
    pub fn from_label(label: &str) -> Self {
        if label == ALL_ALBUMS {
            Self::All
        } else {
            Self::Named(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::All => ALL_ALBUMS,
            Self::Named(name) => name,
        }
    }

    pub fn matches(&self, photo: &Photo) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => photo.album == *name,
        }
    }
}

/// In-memory collection of photos for one gallery session.
///
/// Ids are unique for the lifetime of the catalog: an incoming photo whose id
/// is already taken is moved to the next free id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Photo>", into = "Vec<Photo>")]
pub struct Catalog {
    photos: Vec<Photo>,
    ids: HashSet<PhotoId>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The demo catalog shown on first launch.
    pub fn sample() -> Self {
        const SAMPLES: &[(u64, &str, &str, &str, &str)] = &[
            (
                1,
                "https://images.unsplash.com/photo-1649972904349-6e44c42644a7?w=800&h=600&fit=crop",
                "Mountain Sunset",
                "Beautiful sunset over the mountains",
                "Nature",
            ),
            (
                2,
                "https://images.unsplash.com/photo-1581091226825-a6a2a5aee158?w=800&h=600&fit=crop",
                "Portrait Session",
                "Natural light portrait photography",
                "Portraits",
            ),
            (
                3,
                "https://images.unsplash.com/photo-1721322800607-8c38375eef04?w=800&h=600&fit=crop",
                "Modern Living",
                "Contemporary interior design",
                "Home",
            ),
            (
                4,
                "https://images.unsplash.com/photo-1472396961693-142e6e269027?w=800&h=600&fit=crop",
                "Wildlife",
                "Deer in their natural habitat",
                "Nature",
            ),
            (
                5,
                "https://images.unsplash.com/photo-1582562124811-c09040d0a901?w=800&h=600&fit=crop",
                "Feline Friend",
                "Peaceful cat moment",
                "Pets",
            ),
        ];

        let mut catalog = Self::new();
        for &(id, url, title, description, album) in SAMPLES {
            catalog.add(Photo {
                id: PhotoId(id),
                url: url.to_string(),
                title: title.to_string(),
                description: Some(description.to_string()),
                album: album.to_string(),
            });
        }
        catalog
    }

    /// Reads a YAML list of photos. IO failures surface as [`Error::Io`],
    /// malformed or invalid entries as [`Error::Config`].
    ///
    /// [`Error::Io`]: crate::Error::Io
    /// [`Error::Config`]: crate::Error::Config
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        let catalog: Self = serde_yaml::from_str(&s)?;
        debug!(photos = catalog.len(), "catalog: loaded");
        Ok(catalog)
    }

    /// Appends a photo and returns the id it was stored under.
    pub fn add(&mut self, mut photo: Photo) -> PhotoId {
        while self.ids.contains(&photo.id) {
            photo.id = PhotoId(photo.id.0.wrapping_add(1));
        }
        debug!(id = %photo.id, album = %photo.album, title = %photo.title, "catalog: add");
        let id = photo.id;
        self.ids.insert(id);
        self.photos.push(photo);
        id
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Photo> {
        self.photos.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Photo> {
        self.photos.iter()
    }

    pub fn photos(&self) -> &[Photo] {
        &self.photos
    }

    /// Distinct album labels in the order they first appear.
    pub fn albums(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.photos
            .iter()
            .filter(|p| seen.insert(p.album.as_str()))
            .map(|p| p.album.clone())
            .collect()
    }

    /// Labels for the album bar: `"All"` followed by every album.
    pub fn album_choices(&self) -> Vec<String> {
        std::iter::once(ALL_ALBUMS.to_string())
            .chain(self.albums())
            .collect()
    }

    pub fn filtered(&self, filter: &AlbumFilter) -> Vec<Photo> {
        self.photos
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect()
    }
}

impl TryFrom<Vec<Photo>> for Catalog {
    type Error = String;

    fn try_from(photos: Vec<Photo>) -> Result<Self, Self::Error> {
        let mut catalog = Self::new();
        for photo in photos {
            if photo.album.trim().is_empty() {
                return Err(format!("photo {} has an empty album", photo.id));
            }
            catalog.add(photo);
        }
        Ok(catalog)
    }
}

impl From<Catalog> for Vec<Photo> {
    fn from(catalog: Catalog) -> Self {
        catalog.photos
    }
}
