//! Error types for the ambient parts of the generator.
//!
//! City generation itself never fails; only loading configuration and
//! writing preview images can.

use std::path::PathBuf;

/// Errors from configuration loading and image export.
#[derive(Debug, thiserror::Error)]
pub enum CityError {
    /// The configuration file could not be read.
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for [`crate::config::CityConfig`].
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A configuration value is out of its allowed range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Writing a preview image failed.
    #[error("image export failed: {0}")]
    Image(#[from] image::ImageError),
}
