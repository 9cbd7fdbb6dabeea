use std::path::{Path, PathBuf};

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, Local};
use thiserror::Error;

use crate::error::{MeasureError, PersistError};
use crate::units::Px;

/// The logo that ships with the crate, used when no logo is configured
pub const BUNDLED_LOGO: &[u8] = include_bytes!("../assets/logo.svg");

#[derive(Error, Debug)]
pub enum LogoError {
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("unsupported logo format {0:?}, expected PNG, JPEG or SVG")]
    Unsupported(image::ImageFormat),
}

/// Raster encodings the canvas can be snapshotted to. Exports are always PNG;
/// the enum exists so the rendering surface contract names its format.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Default)]
pub enum RasterFormat {
    #[default]
    Png,
}

impl RasterFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            RasterFormat::Png => "image/png",
        }
    }

    /// Apple uniform type identifier, for share sheets that want one
    pub fn type_identifier(self) -> &'static str {
        match self {
            RasterFormat::Png => "public.png",
        }
    }
}

/// Wrap encoded bytes as a `data:<mime>;base64,<payload>` URI
pub fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{mime_type};base64,{}", STANDARD.encode(bytes))
}

/// The base64 payload of a data URI: everything after the first comma
pub fn data_uri_payload(uri: &str) -> Result<&str, PersistError> {
    if !uri.starts_with("data:") {
        return Err(PersistError::NotADataUri);
    }
    uri.split_once(',')
        .map(|(_, payload)| payload)
        .ok_or(PersistError::NotADataUri)
}

/// Decode a base64 payload back into raw bytes
pub fn decode_base64(payload: &str) -> Result<Vec<u8>, PersistError> {
    STANDARD.decode(payload.trim()).map_err(Into::into)
}

/// Pixel dimensions of an image file, read from its header. The format is
/// sniffed from the file contents, so the extension does not matter.
pub fn image_dimensions<P: AsRef<Path>>(path: P) -> Result<(u32, u32), MeasureError> {
    let reader = image::io::Reader::open(path)?.with_guessed_format()?;
    Ok(reader.into_dimensions()?)
}

/// A logo ready to be embedded into the canvas
#[derive(Clone, Debug, PartialEq)]
pub struct Logo {
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

impl Logo {
    pub fn bundled() -> Logo {
        Logo {
            mime_type: "image/svg+xml",
            data: BUNDLED_LOGO.to_vec(),
        }
    }

    /// Load a logo from disk. Files with an `.svg` extension are embedded as
    /// vector images; anything else must be a PNG or JPEG.
    pub fn new_from_disk<P: AsRef<Path>>(path: P) -> Result<Logo, LogoError> {
        let path = path.as_ref();
        let is_svg = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("svg"));

        let data = std::fs::read(path)?;
        if is_svg {
            return Ok(Logo {
                mime_type: "image/svg+xml",
                data,
            });
        }

        let mime_type = match image::guess_format(&data)? {
            image::ImageFormat::Png => "image/png",
            image::ImageFormat::Jpeg => "image/jpeg",
            other => return Err(LogoError::Unsupported(other)),
        };
        Ok(Logo { mime_type, data })
    }

    pub fn to_data_uri(&self) -> String {
        to_data_uri(self.mime_type, &self.data)
    }
}

/// A raster image that has been written to disk and measured
#[derive(Clone, Debug, PartialEq)]
pub struct RenderedImageHandle {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub created_at: DateTime<Local>,
}

impl RenderedImageHandle {
    pub fn new(path: PathBuf, width: u32, height: u32) -> RenderedImageHandle {
        RenderedImageHandle {
            path,
            width,
            height,
            created_at: Local::now(),
        }
    }

    /// The box the image is shown in: its own size, but never wider than the
    /// viewport minus a 50px gutter
    pub fn display_size(&self, viewport_width: Px) -> (Px, Px) {
        let max_width = (viewport_width - Px(50.0)).0.max(0.0);
        (Px((self.width as f32).min(max_width)), Px::from(self.height))
    }
}
