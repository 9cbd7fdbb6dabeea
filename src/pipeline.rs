//! The image export pipeline.
//!
//! An export walks the canvas through a fixed sequence of host calls, each
//! awaited before the next begins:
//!
//! 1. snapshot the vector canvas to a PNG data URI ([`RenderSurface`])
//! 2. strip the data URI prefix and persist the payload to the cache file ([`ImageStore`])
//! 3. read back the pixel dimensions of the written file ([`ImageStore`])
//! 4. publish a [`RenderedImageHandle`] so the caller can display it
//! 5. hand the file to the share sheet ([`ShareSheet`]), best effort
//!
//! All exports write to the same cache path, so only one may run at a time.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::canvas::Canvas;
use crate::error::ExportError;
use crate::image::{data_uri_payload, RasterFormat, RenderedImageHandle};
use crate::share::{ShareOutcome, ShareRequest, ShareSettings, ShareSheet};
use crate::store::ImageStore;
use crate::surface::RenderSurface;

/// Default name of the cached export
pub const EXPORT_FILE_NAME: &str = "jokeXP.png";

const EXPORT_FORMAT: RasterFormat = RasterFormat::Png;
const EXPORT_QUALITY: f32 = 1.0;

/// Runs exports of the joke canvas through the rendering surface, the image
/// store and the share sheet, one export at a time. Every export overwrites
/// the same output file.
pub struct ExportPipeline {
    surface: Arc<dyn RenderSurface>,
    store: Arc<dyn ImageStore>,
    share: Arc<dyn ShareSheet>,
    output: PathBuf,
    share_settings: ShareSettings,
    in_flight: AtomicBool,
}

/// An exclusive claim on the pipeline. Holding one keeps every other export
/// out until it is dropped, however the export ends.
pub struct ExportSession<'a> {
    pipeline: &'a ExportPipeline,
}

impl Drop for ExportSession<'_> {
    fn drop(&mut self) {
        self.pipeline.in_flight.store(false, Ordering::Release);
    }
}

impl ExportPipeline {
    /// A pipeline writing its exports to `output`
    pub fn new(
        surface: Arc<dyn RenderSurface>,
        store: Arc<dyn ImageStore>,
        share: Arc<dyn ShareSheet>,
        output: PathBuf,
    ) -> ExportPipeline {
        ExportPipeline {
            surface,
            store,
            share,
            output,
            share_settings: ShareSettings::default(),
            in_flight: AtomicBool::new(false),
        }
    }

    /// Use `settings` when offering images to the share sheet
    pub fn with_share_settings(mut self, settings: ShareSettings) -> ExportPipeline {
        self.share_settings = settings;
        self
    }

    /// Whether an export is currently running
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Claim the pipeline for one export, failing with [ExportError::Busy] if
    /// another export is still running
    pub fn begin(&self) -> Result<ExportSession<'_>, ExportError> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| ExportSession { pipeline: self })
            .map_err(|_| ExportError::Busy)
    }

    /// Claim the pipeline and render `canvas`; see [ExportSession::render]
    pub async fn render(&self, canvas: &Canvas) -> Result<RenderedImageHandle, ExportError> {
        self.begin()?.render(canvas).await
    }

    async fn snapshot_persist_measure(
        &self,
        canvas: &Canvas,
    ) -> Result<RenderedImageHandle, ExportError> {
        tracing::debug!(lines = canvas.lines.len(), "snapshotting canvas");
        let uri = self
            .surface
            .render_and_encode(canvas, EXPORT_FORMAT, EXPORT_QUALITY)
            .await?;

        let payload = data_uri_payload(&uri)?;
        self.store.write_base64(&self.output, payload).await?;

        let (width, height) = self.store.image_dimensions(&self.output).await?;
        tracing::info!(width, height, path = %self.output.display(), "joke image exported");

        Ok(RenderedImageHandle::new(self.output.clone(), width, height))
    }

    async fn offer(&self, image: &RenderedImageHandle) -> ShareOutcome {
        if !self.share.is_available().await {
            tracing::warn!("sharing is not available on this device");
            return ShareOutcome::Unavailable;
        }

        let request = ShareRequest {
            path: image.path.clone(),
            mime_type: EXPORT_FORMAT.mime_type(),
            dialog_title: self.share_settings.dialog_title.clone(),
            type_identifier: EXPORT_FORMAT.type_identifier(),
        };
        match self.share.share(&request).await {
            Ok(()) => ShareOutcome::Shared,
            Err(e) => {
                tracing::error!("failed to share the joke image: {e}");
                ShareOutcome::Failed
            }
        }
    }

    /// Render then share in one go
    pub async fn export(
        &self,
        canvas: &Canvas,
    ) -> Result<(RenderedImageHandle, ShareOutcome), ExportError> {
        let session = self.begin()?;
        let image = session.render(canvas).await?;
        let outcome = session.share(&image).await;
        Ok((image, outcome))
    }
}

impl ExportSession<'_> {
    /// Snapshot, persist and measure `canvas`. Nothing is published unless every
    /// step succeeds.
    #[tracing::instrument(level = "debug", skip_all, fields(output = %self.pipeline.output.display()))]
    pub async fn render(&self, canvas: &Canvas) -> Result<RenderedImageHandle, ExportError> {
        self.pipeline.snapshot_persist_measure(canvas).await
    }

    /// Offer `image` to the share sheet. Unavailability and failures are logged
    /// and reported in the outcome, never raised.
    pub async fn share(&self, image: &RenderedImageHandle) -> ShareOutcome {
        self.pipeline.offer(image).await
    }
}
