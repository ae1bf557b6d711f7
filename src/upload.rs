use std::ffi::OsStr;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, info};

use crate::catalog::{Catalog, Photo, PhotoId, UNTITLED_PHOTO};
use crate::error::{Error, Result};

/// Album used when the catalog has no albums yet.
pub const DEFAULT_ALBUM: &str = "Personal";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Typed or pasted URL.
    Url(String),
    /// File contents embedded as a `data:` URI.
    Embedded(String),
}

impl ImageSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Url(url) | Self::Embedded(url) => url,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlbumChoice {
    Existing(String),
    /// "+ Create New Album" with the name typed so far.
    New(String),
}

/// The "Add New Photo" form. One submission yields one [`Photo`].
#[derive(Debug, Clone)]
pub struct UploadForm {
    albums: Vec<String>,
    title: String,
    description: String,
    source: Option<ImageSource>,
    album: AlbumChoice,
}

impl UploadForm {
    /// `albums` are the existing album labels; the first one is preselected,
    /// or `fallback_album` when there are none.
    pub fn new(albums: Vec<String>, fallback_album: &str) -> Self {
        let initial = albums
            .first()
            .cloned()
            .unwrap_or_else(|| fallback_album.to_string());
        Self {
            albums,
            title: String::new(),
            description: String::new(),
            source: None,
            album: AlbumChoice::Existing(initial),
        }
    }

    pub fn albums(&self) -> &[String] {
        &self.albums
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn album(&self) -> &AlbumChoice {
        &self.album
    }

    pub fn source(&self) -> Option<&ImageSource> {
        self.source.as_ref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_album(&mut self, album: AlbumChoice) {
        self.album = album;
    }

    pub fn set_url(&mut self, url: impl Into<String>) {
        self.source = Some(ImageSource::Url(url.into()));
    }

    /// Text shown in the URL field; embedded data is not echoed back.
    pub fn url_field(&self) -> &str {
        match &self.source {
            Some(ImageSource::Url(url)) => url,
            _ => "",
        }
    }

    /// Reads a picked file and embeds it.
    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(OsStr::to_str)
            .unwrap_or_default()
            .to_string();
        self.load_bytes(&name, &bytes);
        Ok(())
    }

    /// Drag-and-drop: like [`load_file`](Self::load_file) but only images are accepted.
    pub fn drop_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if !mime_for(path).starts_with("image/") {
            return Err(Error::UnsupportedDrop(path.display().to_string()));
        }
        self.load_file(path)
    }

    /// Embeds `bytes` as a data URI. A blank title is filled from `name`
    /// with its last extension removed.
    pub fn load_bytes(&mut self, name: &str, bytes: &[u8]) {
        let mime = mime_for(Path::new(name));
        let encoded = STANDARD.encode(bytes);
        debug!(name, mime, bytes = bytes.len(), "upload: embedded file");
        self.source = Some(ImageSource::Embedded(format!(
            "data:{mime};base64,{encoded}"
        )));
        if self.title.is_empty() {
            self.title = strip_extension(name).to_string();
        }
    }

    pub fn can_submit(&self) -> bool {
        self.source
            .as_ref()
            .is_some_and(|s| !s.as_str().trim().is_empty())
    }

    /// Builds the photo and adds it to `catalog`. Returns the stored photo.
    pub fn submit(self, catalog: &mut Catalog) -> Result<Photo> {
        let url = match self.source {
            Some(source) if !source.as_str().trim().is_empty() => match source {
                ImageSource::Url(url) | ImageSource::Embedded(url) => url,
            },
            _ => return Err(Error::MissingImageSource),
        };
        let album = match self.album {
            AlbumChoice::Existing(name) => name,
            AlbumChoice::New(name) => {
                let name = name.trim();
                if name.is_empty() {
                    return Err(Error::EmptyAlbumName);
                }
                name.to_string()
            }
        };
        let title = if self.title.is_empty() {
            UNTITLED_PHOTO.to_string()
        } else {
            self.title
        };
        let description = Some(self.description).filter(|d| !d.is_empty());

        let mut photo = Photo {
            id: PhotoId::now(),
            url,
            title,
            description,
            album,
        };
        photo.id = catalog.add(photo.clone());
        info!(id = %photo.id, album = %photo.album, "photo added");
        Ok(photo)
    }
}

fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

fn mime_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(OsStr::to_str)
        .map(|s| s.to_ascii_lowercase());
    match ext.as_deref() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
