use thiserror::Error;

/// Library error type for gallery and slideshow operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A slideshow was launched over an empty photo sequence.
    #[error("cannot start a slideshow without photos")]
    EmptySlideshow,

    /// The upload form was submitted without a URL or file.
    #[error("no image source provided")]
    MissingImageSource,

    /// "Create new album" was chosen but no name was entered.
    #[error("new album name must not be empty")]
    EmptyAlbumName,

    /// A dropped file was not an image.
    #[error("dropped file is not an image: {0}")]
    UnsupportedDrop(String),

    /// Underlying IO error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// YAML/serde configuration or catalog error.
    #[error(transparent)]
    Config(#[from] serde_yaml::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
