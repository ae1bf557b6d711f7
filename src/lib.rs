pub mod catalog;
pub mod config;
pub mod error;
pub mod events;
pub mod gallery;
pub mod music;
pub mod slideshow;
pub mod upload;
pub mod tasks {
    pub mod console;
    pub mod session;
}

pub use error::{Error, Result};
