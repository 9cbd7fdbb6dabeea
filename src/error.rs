use std::path::PathBuf;
use thiserror::Error;

/// Failure to obtain a joke from the upstream source. Always recovered by the
/// screen with a fallback sentence.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error(transparent)]
    /// The HTTP request failed or returned a non-success status
    Http(#[from] reqwest::Error),

    #[error("joke payload could not be parsed: {0}")]
    /// The response body was not a recognised joke object
    Payload(#[from] serde_json::Error),
}

/// Failure to turn the vector canvas into an encoded raster
#[derive(Error, Debug)]
pub enum RenderError {
    #[error(transparent)]
    /// [usvg] failed to parse the canvas document
    Svg(#[from] usvg::Error),

    #[error("cannot allocate a {width}x{height} pixmap")]
    Pixmap { width: u32, height: u32 },

    #[error("png encoding failed: {0}")]
    Encode(String),

    #[error("unsupported quality {0}, expected a value in 0.0..=1.0")]
    Quality(f32),

    #[error("rendering task was aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Failure to write the encoded raster to the cache
#[derive(Error, Debug)]
pub enum PersistError {
    #[error("encoded image is not a data URI")]
    NotADataUri,

    #[error(transparent)]
    /// The payload was not valid base64
    Decode(#[from] base64::DecodeError),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure to read back the pixel dimensions of a persisted image
#[derive(Error, Debug)]
pub enum MeasureError {
    #[error(transparent)]
    /// [image] could not read the image header
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("measuring task was aborted: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// Failure reported by a share collaborator that claimed to be available
#[derive(Error, Debug)]
pub enum ShareError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Everything that can stop an export before an image is published
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("an export is already in progress")]
    Busy,

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Persist(#[from] PersistError),

    #[error(transparent)]
    Measure(#[from] MeasureError),
}

/// Errors loading the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("no cache directory could be determined for this platform")]
    NoCacheDir,
}
