use std::sync::Arc;

use crate::canvas::{Canvas, CanvasStyle};
use crate::image::{Logo, RenderedImageHandle};
use crate::joke::{JokeSource, JokeText, FALLBACK_JOKE};
use crate::pipeline::ExportPipeline;
use crate::share::ShareOutcome;

/// What the joke window is showing. The live canvas and an exported image are
/// never shown together.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum DisplayState {
    #[default]
    ShowingCanvas,
    ShowingImage(RenderedImageHandle),
}

/// How a press of the share button played out
#[derive(Clone, Debug, PartialEq)]
pub enum ExportAttempt {
    /// The image was exported and is now displayed
    Completed(ShareOutcome),
    /// The export stopped early; the screen is unchanged
    Failed,
    /// The trigger was not enabled (loading, already exporting, or an image is
    /// already displayed)
    Ignored,
}

/// Controller for the joke screen: owns the current joke, the loading flag and
/// the display state, and drives fetching and exporting.
pub struct JokeScreen {
    source: Arc<dyn JokeSource>,
    pipeline: Arc<ExportPipeline>,
    style: CanvasStyle,
    logo: Option<Logo>,
    fallback: JokeText,
    joke: JokeText,
    loading: bool,
    display: DisplayState,
}

/// Keeps the loading flag raised while a fetch is pending, lowering it again
/// when the fetch finishes or its future is dropped
struct Loading<'a>(&'a mut bool);

impl<'a> Loading<'a> {
    fn start(flag: &'a mut bool) -> Loading<'a> {
        *flag = true;
        Loading(flag)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        *self.0 = false;
    }
}

impl JokeScreen {
    /// A screen with no joke yet, showing the empty canvas
    pub fn new(
        source: Arc<dyn JokeSource>,
        pipeline: Arc<ExportPipeline>,
        style: CanvasStyle,
        logo: Option<Logo>,
    ) -> JokeScreen {
        JokeScreen {
            source,
            pipeline,
            style,
            logo,
            fallback: FALLBACK_JOKE.to_string(),
            joke: JokeText::new(),
            loading: false,
            display: DisplayState::ShowingCanvas,
        }
    }

    /// Replace the sentence shown when a joke can't be fetched
    pub fn with_fallback(mut self, fallback: impl Into<JokeText>) -> JokeScreen {
        self.fallback = fallback.into();
        self
    }

    /// The joke currently on the canvas
    pub fn joke(&self) -> &str {
        &self.joke
    }

    /// Whether a joke is being fetched
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// What the window is showing right now
    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    /// Show `joke` directly, without asking the source
    pub fn set_joke(&mut self, joke: impl Into<JokeText>) {
        self.joke = joke.into();
        self.display = DisplayState::ShowingCanvas;
    }

    /// The canvas for the current joke, laid out afresh
    pub fn canvas(&self) -> Canvas {
        Canvas::for_joke(&self.joke, &self.style, self.logo.clone())
    }

    /// Whether the share button should be enabled
    pub fn can_export(&self) -> bool {
        !self.loading
            && !self.pipeline.is_busy()
            && matches!(self.display, DisplayState::ShowingCanvas)
    }

    /// Fetch another joke. Failures are replaced by the fallback sentence. Any
    /// exported image belongs to the previous joke, so the canvas comes back.
    pub async fn next_joke(&mut self) {
        let fetched = {
            let _loading = Loading::start(&mut self.loading);
            self.source.fetch().await
        };
        let joke = match fetched {
            Ok(joke) => joke,
            Err(e) => {
                tracing::warn!("failed to fetch a joke: {e}");
                self.fallback.clone()
            }
        };
        self.set_joke(joke);
    }

    /// Export the current canvas and offer it to the share sheet.
    ///
    /// The image is displayed as soon as it has been measured, whether or not
    /// sharing then succeeds. Render, persist and measure failures are logged
    /// and otherwise leave the screen as it was.
    pub async fn share_image(&mut self) -> ExportAttempt {
        if self.loading || !matches!(self.display, DisplayState::ShowingCanvas) {
            return ExportAttempt::Ignored;
        }

        let canvas = self.canvas();
        let pipeline = Arc::clone(&self.pipeline);
        let Ok(session) = pipeline.begin() else {
            tracing::debug!("an export is already running");
            return ExportAttempt::Ignored;
        };

        let image = match session.render(&canvas).await {
            Ok(image) => image,
            Err(e) => {
                tracing::error!("failed to generate the joke image: {e}");
                return ExportAttempt::Failed;
            }
        };

        self.display = DisplayState::ShowingImage(image.clone());
        ExportAttempt::Completed(session.share(&image).await)
    }

    /// Go back to the live canvas, discarding the exported image
    pub fn edit(&mut self) {
        self.display = DisplayState::ShowingCanvas;
    }
}
