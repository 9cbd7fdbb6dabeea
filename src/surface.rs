use async_trait::async_trait;
use resvg::tiny_skia::{Pixmap, Transform};

use crate::canvas::Canvas;
use crate::error::RenderError;
use crate::font::FontBook;
use crate::image::{to_data_uri, RasterFormat};

/// Something that can snapshot a vector canvas into an encoded raster
#[async_trait]
pub trait RenderSurface: Send + Sync {
    /// Render `canvas` and return it as a `data:<mime>;base64,...` URI.
    /// `quality` ranges from 0.0 to 1.0; lossless formats ignore it.
    async fn render_and_encode(
        &self,
        canvas: &Canvas,
        format: RasterFormat,
        quality: f32,
    ) -> Result<String, RenderError>;
}

/// CPU renderer: parses the canvas SVG with `usvg` and rasterises it with `resvg`
#[derive(Clone, Debug, Default)]
pub struct ResvgSurface {
    fonts: FontBook,
}

impl ResvgSurface {
    pub fn new(fonts: FontBook) -> ResvgSurface {
        ResvgSurface { fonts }
    }
}

fn render_png(fonts: &FontBook, canvas: &Canvas) -> Result<Vec<u8>, RenderError> {
    let mut options = usvg::Options::default();
    options.fontdb = fonts.database();

    let svg = canvas.to_svg();
    let tree = usvg::Tree::from_str(&svg, &options)?;

    let (width, height) = canvas.pixel_size();
    let mut pixmap = Pixmap::new(width, height).ok_or(RenderError::Pixmap { width, height })?;

    // the tree's size already matches the pixmap, so no scaling is needed
    resvg::render(&tree, Transform::identity(), &mut pixmap.as_mut());

    pixmap
        .encode_png()
        .map_err(|e| RenderError::Encode(e.to_string()))
}

#[async_trait]
impl RenderSurface for ResvgSurface {
    async fn render_and_encode(
        &self,
        canvas: &Canvas,
        format: RasterFormat,
        quality: f32,
    ) -> Result<String, RenderError> {
        if !(0.0..=1.0).contains(&quality) {
            return Err(RenderError::Quality(quality));
        }

        let fonts = self.fonts.clone();
        let canvas = canvas.clone();
        let bytes = tokio::task::spawn_blocking(move || render_png(&fonts, &canvas)).await??;
        tracing::debug!(bytes = bytes.len(), "canvas rasterised");

        Ok(to_data_uri(format.mime_type(), &bytes))
    }
}
