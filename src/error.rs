use exif::Error as ExifError;
use serde_json::Error as SerdeJsonError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Walkdir error: {0}")]
    Walkdir(#[from] walkdir::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("EXIF error: {0}")]
    Exif(#[from] ExifError),

    #[error("JSON error: {0}")]
    Json(#[from] SerdeJsonError),

    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Route(#[from] RouteError),

    #[error("Could not open browser: {0}")]
    Opener(#[from] opener::OpenError),
}

/// Conditions under which no route can be produced. Kept apart from
/// [`AppError`] so callers can tell "not enough data" from a real failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("at least 2 geotagged images are needed to build a route, found {found}")]
    InsufficientData { found: usize },
}
