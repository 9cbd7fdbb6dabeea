use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use jokexp::{
    to_data_uri, Canvas, CanvasStyle, DisplayState, ExportAttempt, ExportPipeline, FetchError,
    ImageStore, JokePayload, JokeScreen, JokeSource, JokeText, MeasureError, NullShare,
    PersistError, RasterFormat, RenderError, RenderSurface, ShareError, ShareOutcome,
    ShareRequest, ShareSheet, FALLBACK_JOKE,
};

struct FixedSource(Option<&'static str>);

/// A source whose request never comes back
struct HangingSource;

#[async_trait]
impl JokeSource for HangingSource {
    async fn fetch(&self) -> Result<JokeText, FetchError> {
        std::future::pending().await
    }
}

#[async_trait]
impl JokeSource for FixedSource {
    async fn fetch(&self) -> Result<JokeText, FetchError> {
        match self.0 {
            Some(joke) => Ok(joke.to_string()),
            None => Err(serde_json::from_str::<JokePayload>("{}").unwrap_err().into()),
        }
    }
}

/// Hands back a fixed payload and remembers what it was asked to draw
#[derive(Default)]
struct FakeSurface {
    fail: bool,
    drawn: Mutex<Vec<Vec<String>>>,
}

impl FakeSurface {
    fn failing() -> FakeSurface {
        FakeSurface {
            fail: true,
            ..FakeSurface::default()
        }
    }
}

#[async_trait]
impl RenderSurface for FakeSurface {
    async fn render_and_encode(
        &self,
        canvas: &Canvas,
        format: RasterFormat,
        quality: f32,
    ) -> Result<String, RenderError> {
        assert_eq!(format, RasterFormat::Png);
        assert_eq!(quality, 1.0);
        let lines = canvas.lines.iter().map(|l| l.text.clone()).collect();
        self.drawn.lock().unwrap().push(lines);
        if self.fail {
            return Err(RenderError::Pixmap {
                width: 0,
                height: 0,
            });
        }
        Ok(to_data_uri("image/png", b"fake png bytes"))
    }
}

/// In-memory filesystem with canned measurements
struct FakeStore {
    fail_writes: bool,
    fail_measure: bool,
    size: (u32, u32),
    writes: Mutex<Vec<(PathBuf, String)>>,
    measured: AtomicUsize,
}

impl FakeStore {
    fn new(size: (u32, u32)) -> FakeStore {
        FakeStore {
            fail_writes: false,
            fail_measure: false,
            size,
            writes: Mutex::new(Vec::new()),
            measured: AtomicUsize::new(0),
        }
    }

    fn failing() -> FakeStore {
        FakeStore {
            fail_writes: true,
            ..FakeStore::new((0, 0))
        }
    }

    fn unmeasurable() -> FakeStore {
        FakeStore {
            fail_measure: true,
            ..FakeStore::new((0, 0))
        }
    }
}

#[async_trait]
impl ImageStore for FakeStore {
    async fn write_base64(&self, path: &Path, data: &str) -> Result<(), PersistError> {
        if self.fail_writes {
            return Err(PersistError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::StorageFull, "disk full"),
            });
        }
        self.writes
            .lock()
            .unwrap()
            .push((path.to_path_buf(), data.to_string()));
        Ok(())
    }

    async fn image_dimensions(&self, _path: &Path) -> Result<(u32, u32), MeasureError> {
        self.measured.fetch_add(1, Ordering::SeqCst);
        if self.fail_measure {
            return Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into());
        }
        Ok(self.size)
    }
}

#[derive(Default)]
struct CountingShare {
    shared: AtomicUsize,
}

#[async_trait]
impl ShareSheet for CountingShare {
    async fn is_available(&self) -> bool {
        true
    }

    async fn share(&self, request: &ShareRequest) -> Result<(), ShareError> {
        assert_eq!(request.mime_type, "image/png");
        self.shared.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

const OUTPUT: &str = "/cache/jokeXP.png";

fn screen_with(
    source: impl JokeSource + 'static,
    surface: Arc<FakeSurface>,
    store: Arc<FakeStore>,
    share: Arc<dyn ShareSheet>,
) -> (JokeScreen, Arc<ExportPipeline>) {
    let pipeline = Arc::new(ExportPipeline::new(surface, store, share, OUTPUT.into()));
    let screen = JokeScreen::new(
        Arc::new(source),
        Arc::clone(&pipeline),
        CanvasStyle::default(),
        None,
    );
    (screen, pipeline)
}

#[tokio::test]
async fn successful_export_shows_the_measured_image() {
    let surface = Arc::new(FakeSurface::default());
    let store = Arc::new(FakeStore::new((640, 480)));
    let share = Arc::new(CountingShare::default());
    let (mut screen, _) = screen_with(
        FixedSource(Some("Pourquoi les plongeurs plongent-ils toujours en arrière ?")),
        surface.clone(),
        store.clone(),
        share.clone(),
    );

    screen.next_joke().await;
    assert_eq!(screen.display(), &DisplayState::ShowingCanvas);
    assert!(screen.can_export());

    let attempt = screen.share_image().await;
    assert_eq!(attempt, ExportAttempt::Completed(ShareOutcome::Shared));

    match screen.display() {
        DisplayState::ShowingImage(image) => {
            assert_eq!((image.width, image.height), (640, 480));
            assert_eq!(image.path, PathBuf::from(OUTPUT));
        }
        other => panic!("expected an image, got {other:?}"),
    }

    // prefix stripped before persisting
    let writes = store.writes.lock().unwrap();
    assert_eq!(writes.len(), 1);
    assert!(!writes[0].1.starts_with("data:"));
    assert_eq!(store.measured.load(Ordering::SeqCst), 1);
    assert_eq!(share.shared.load(Ordering::SeqCst), 1);

    let drawn = surface.drawn.lock().unwrap();
    assert_eq!(drawn.len(), 1);
    assert_eq!(drawn[0][0], "Pourquoi les");

    // the trigger is gone while the image is displayed
    assert!(!screen.can_export());
}

#[tokio::test]
async fn unavailable_share_still_displays_the_image() {
    let (mut screen, _) = screen_with(
        FixedSource(Some("Toc toc")),
        Arc::new(FakeSurface::default()),
        Arc::new(FakeStore::new((350, 350))),
        Arc::new(NullShare),
    );
    screen.next_joke().await;

    let attempt = screen.share_image().await;
    assert_eq!(attempt, ExportAttempt::Completed(ShareOutcome::Unavailable));
    assert!(matches!(screen.display(), DisplayState::ShowingImage(_)));
}

#[tokio::test]
async fn failed_write_leaves_the_canvas_up() {
    let share = Arc::new(CountingShare::default());
    let store = Arc::new(FakeStore::failing());
    let (mut screen, pipeline) = screen_with(
        FixedSource(Some("Toc toc")),
        Arc::new(FakeSurface::default()),
        store.clone(),
        share.clone(),
    );
    screen.next_joke().await;

    assert_eq!(screen.share_image().await, ExportAttempt::Failed);
    assert_eq!(screen.display(), &DisplayState::ShowingCanvas);
    assert_eq!(store.measured.load(Ordering::SeqCst), 0);
    assert_eq!(share.shared.load(Ordering::SeqCst), 0);
    assert!(!pipeline.is_busy());
    assert!(screen.can_export());
}

#[tokio::test]
async fn fetch_failure_falls_back() {
    let (mut screen, _) = screen_with(
        FixedSource(None),
        Arc::new(FakeSurface::default()),
        Arc::new(FakeStore::new((1, 1))),
        Arc::new(NullShare),
    );

    screen.next_joke().await;
    assert_eq!(screen.joke(), FALLBACK_JOKE);
    assert!(!screen.is_loading());
}

#[tokio::test]
async fn edit_returns_to_the_canvas() {
    let (mut screen, _) = screen_with(
        FixedSource(Some("Toc toc")),
        Arc::new(FakeSurface::default()),
        Arc::new(FakeStore::new((350, 350))),
        Arc::new(NullShare),
    );
    screen.next_joke().await;
    screen.share_image().await;

    // sharing again from the image view does nothing
    assert_eq!(screen.share_image().await, ExportAttempt::Ignored);

    screen.edit();
    assert_eq!(screen.display(), &DisplayState::ShowingCanvas);
    assert!(screen.can_export());
}

#[tokio::test]
async fn new_joke_discards_the_exported_image() {
    let (mut screen, _) = screen_with(
        FixedSource(Some("Toc toc")),
        Arc::new(FakeSurface::default()),
        Arc::new(FakeStore::new((350, 350))),
        Arc::new(NullShare),
    );
    screen.next_joke().await;
    screen.share_image().await;
    assert!(matches!(screen.display(), DisplayState::ShowingImage(_)));

    screen.next_joke().await;
    assert_eq!(screen.display(), &DisplayState::ShowingCanvas);
}

#[tokio::test]
async fn export_in_flight_disables_the_trigger() {
    let store = Arc::new(FakeStore::new((350, 350)));
    let (mut screen, pipeline) = screen_with(
        FixedSource(Some("Toc toc")),
        Arc::new(FakeSurface::default()),
        store.clone(),
        Arc::new(NullShare),
    );
    screen.next_joke().await;

    let session = pipeline.begin().unwrap();
    assert!(!screen.can_export());
    assert_eq!(screen.share_image().await, ExportAttempt::Ignored);
    assert!(store.writes.lock().unwrap().is_empty());

    drop(session);
    assert!(screen.can_export());
    assert_eq!(
        screen.share_image().await,
        ExportAttempt::Completed(ShareOutcome::Unavailable)
    );
}

#[tokio::test]
async fn failed_measurement_leaves_the_canvas_up() {
    let share = Arc::new(CountingShare::default());
    let store = Arc::new(FakeStore::unmeasurable());
    let (mut screen, pipeline) = screen_with(
        FixedSource(Some("Toc toc")),
        Arc::new(FakeSurface::default()),
        store.clone(),
        share.clone(),
    );
    screen.next_joke().await;

    assert_eq!(screen.share_image().await, ExportAttempt::Failed);
    assert_eq!(screen.display(), &DisplayState::ShowingCanvas);
    assert_eq!(store.writes.lock().unwrap().len(), 1);
    assert_eq!(store.measured.load(Ordering::SeqCst), 1);
    assert_eq!(share.shared.load(Ordering::SeqCst), 0);
    assert!(!pipeline.is_busy());
    assert!(screen.can_export());
}

#[tokio::test]
async fn failed_render_leaves_the_canvas_up() {
    let share = Arc::new(CountingShare::default());
    let store = Arc::new(FakeStore::new((350, 350)));
    let (mut screen, pipeline) = screen_with(
        FixedSource(Some("Toc toc")),
        Arc::new(FakeSurface::failing()),
        store.clone(),
        share.clone(),
    );
    screen.next_joke().await;

    assert_eq!(screen.share_image().await, ExportAttempt::Failed);
    assert_eq!(screen.display(), &DisplayState::ShowingCanvas);
    assert!(store.writes.lock().unwrap().is_empty());
    assert_eq!(store.measured.load(Ordering::SeqCst), 0);
    assert_eq!(share.shared.load(Ordering::SeqCst), 0);
    assert!(!pipeline.is_busy());
    assert!(screen.can_export());
}

#[tokio::test]
async fn abandoned_fetch_clears_the_loading_flag() {
    let (mut screen, _) = screen_with(
        HangingSource,
        Arc::new(FakeSurface::default()),
        Arc::new(FakeStore::new((350, 350))),
        Arc::new(NullShare),
    );
    screen.set_joke("Toc toc");

    let timed_out = tokio::time::timeout(Duration::from_millis(20), screen.next_joke()).await;
    assert!(timed_out.is_err());

    assert!(!screen.is_loading());
    assert!(screen.can_export());
    assert_eq!(screen.joke(), "Toc toc");
}
