use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, ensure};
use serde::Deserialize;

use crate::slideshow::autoplay::DEFAULT_AUTOPLAY_INTERVAL;
use crate::upload::DEFAULT_ALBUM;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct SlideshowSettings {
    /// Time each photo stays up while autoplay is on.
    #[serde(with = "humantime_serde")]
    pub autoplay_interval: Duration,
    /// Capacity of the process-wide keyboard bus.
    pub key_buffer: usize,
}

impl Default for SlideshowSettings {
    fn default() -> Self {
        Self {
            autoplay_interval: DEFAULT_AUTOPLAY_INTERVAL,
            key_buffer: 32,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct UploadSettings {
    /// Album preselected in the upload form when the catalog has none.
    pub default_album: String,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            default_album: DEFAULT_ALBUM.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Configuration {
    pub slideshow: SlideshowSettings,
    pub upload: UploadSettings,
    /// YAML list of photos; the built-in sample catalog is used when absent.
    pub catalog_path: Option<PathBuf>,
}

impl Configuration {
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&s)?)
    }

    /// Validate runtime invariants that cannot be expressed via serde defaults alone.
    pub fn validated(self) -> Result<Self> {
        ensure!(
            !self.slideshow.autoplay_interval.is_zero(),
            "slideshow.autoplay-interval must be greater than zero"
        );
        ensure!(
            self.slideshow.key_buffer > 0,
            "slideshow.key-buffer must be greater than zero"
        );
        ensure!(
            !self.upload.default_album.trim().is_empty(),
            "upload.default-album must not be empty"
        );
        if let Some(path) = &self.catalog_path {
            ensure!(
                !path.as_os_str().is_empty(),
                "catalog-path must not be empty"
            );
        }
        Ok(self)
    }

    /// Loads `path` when given, otherwise returns the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        let cfg = match path {
            Some(path) => Self::from_yaml_file(path)
                .with_context(|| format!("failed to load configuration from {}", path.display()))?,
            None => Self::default(),
        };
        cfg.validated().context("invalid configuration values")
    }
}
