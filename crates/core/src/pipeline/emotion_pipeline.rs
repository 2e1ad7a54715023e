use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::capture::domain::frame_source::{CaptureError, FrameSource};
use crate::classify::domain::emotion_classifier::EmotionClassifier;
use crate::detect::domain::face_locator::FaceLocator;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::stats::{PipelineStats, StatsSnapshot};
use crate::pipeline::view_slot::ViewSlot;
use crate::render::domain::annotation_renderer::AnnotationRenderer;
use crate::shared::classification::Classification;
use crate::shared::frame::Frame;
use crate::shared::region::Region;
use crate::shared::settings::Settings;

/// Lifecycle of one pipeline instance.
///
/// `Idle --start--> Running --stop--> Stopping --worker exits--> Idle`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum PipelineState {
    Idle = 0,
    Running = 1,
    Stopping = 2,
}

impl PipelineState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => PipelineState::Running,
            2 => PipelineState::Stopping,
            _ => PipelineState::Idle,
        }
    }
}

#[derive(Debug, Error)]
pub enum PipelineError {
    /// The frame source could not be opened. State remains Idle; the
    /// caller decides whether to retry by calling `start` again.
    #[error("capture device unavailable: {0}")]
    DeviceUnavailable(String),
    /// `start` was called while the pipeline was not Idle.
    #[error("pipeline is already running")]
    AlreadyRunning,
    /// The worker thread panicked; the pipeline cannot be restarted.
    #[error("pipeline worker panicked")]
    WorkerPanicked,
}

/// The capability bundle the worker thread drives each cycle.
///
/// Moved into the worker on `start` and handed back on `stop`, so a
/// stopped pipeline can restart with the same capabilities. The thread
/// owns its resources and returns them on join.
struct WorkerParts {
    source: Box<dyn FrameSource>,
    locator: Box<dyn FaceLocator>,
    classifier: Box<dyn EmotionClassifier>,
    renderer: Box<dyn AnnotationRenderer>,
    logger: Box<dyn PipelineLogger>,
}

/// Orchestrates capture → locate → classify → annotate → publish on a
/// fixed cadence, from a dedicated worker thread.
///
/// The display side never talks to the worker: it polls the shared
/// [`ViewSlot`] on its own schedule. The slot and the state word are
/// the only data both threads can see.
pub struct EmotionPipeline {
    state: Arc<AtomicU8>,
    slot: Arc<ViewSlot>,
    stats: Arc<PipelineStats>,
    cadence: Duration,
    min_face_px: u32,
    parts: Option<WorkerParts>,
    worker: Option<std::thread::JoinHandle<WorkerParts>>,
}

impl EmotionPipeline {
    pub fn new(
        source: Box<dyn FrameSource>,
        locator: Box<dyn FaceLocator>,
        classifier: Box<dyn EmotionClassifier>,
        renderer: Box<dyn AnnotationRenderer>,
        logger: Box<dyn PipelineLogger>,
        settings: &Settings,
    ) -> Self {
        Self {
            state: Arc::new(AtomicU8::new(PipelineState::Idle as u8)),
            slot: Arc::new(ViewSlot::new()),
            stats: Arc::new(PipelineStats::new()),
            cadence: settings.cadence(),
            min_face_px: settings.min_face_px,
            parts: Some(WorkerParts {
                source,
                locator,
                classifier,
                renderer,
                logger,
            }),
            worker: None,
        }
    }

    /// Opens the frame source and launches the worker loop.
    ///
    /// Fails with [`PipelineError::DeviceUnavailable`] when the device
    /// cannot be opened (state stays Idle, no retry is attempted) and
    /// with [`PipelineError::AlreadyRunning`] when not Idle.
    pub fn start(&mut self) -> Result<(), PipelineError> {
        if self.current_state() != PipelineState::Idle {
            return Err(PipelineError::AlreadyRunning);
        }
        let mut parts = self.parts.take().ok_or(PipelineError::WorkerPanicked)?;

        if let Err(e) = parts.source.open() {
            self.parts = Some(parts);
            return Err(PipelineError::DeviceUnavailable(e.to_string()));
        }

        self.slot.clear();
        self.state
            .store(PipelineState::Running as u8, Ordering::SeqCst);

        let state = Arc::clone(&self.state);
        let slot = Arc::clone(&self.slot);
        let stats = Arc::clone(&self.stats);
        let cadence = self.cadence;
        let min_face_px = self.min_face_px;

        self.worker = Some(std::thread::spawn(move || {
            run_worker(parts, state, slot, stats, cadence, min_face_px)
        }));

        Ok(())
    }

    /// Signals the worker to exit and blocks until the device is
    /// released and the state is back to Idle. No-op when already Idle.
    pub fn stop(&mut self) -> Result<(), PipelineError> {
        let Some(worker) = self.worker.take() else {
            return Ok(());
        };

        self.state
            .store(PipelineState::Stopping as u8, Ordering::SeqCst);

        match worker.join() {
            Ok(parts) => {
                self.parts = Some(parts);
                Ok(())
            }
            Err(_) => {
                self.state.store(PipelineState::Idle as u8, Ordering::SeqCst);
                log::error!("pipeline worker panicked");
                Err(PipelineError::WorkerPanicked)
            }
        }
    }

    pub fn current_state(&self) -> PipelineState {
        PipelineState::from_u8(self.state.load(Ordering::SeqCst))
    }

    /// Handoff slot for display frontends; poll [`ViewSlot::snapshot`]
    /// on your own redraw cadence.
    pub fn view_slot(&self) -> Arc<ViewSlot> {
        Arc::clone(&self.slot)
    }

    /// The most recently published view, if any.
    pub fn snapshot(&self) -> Option<crate::pipeline::view_slot::PublishedView> {
        self.slot.snapshot()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }
}

impl Drop for EmotionPipeline {
    fn drop(&mut self) {
        let _ = self.stop();
    }
}

fn run_worker(
    mut parts: WorkerParts,
    state: Arc<AtomicU8>,
    slot: Arc<ViewSlot>,
    stats: Arc<PipelineStats>,
    cadence: Duration,
    min_face_px: u32,
) -> WorkerParts {
    parts.logger.info("pipeline worker started");

    while PipelineState::from_u8(state.load(Ordering::SeqCst)) == PipelineState::Running {
        let capture_start = Instant::now();
        match parts.source.read_frame() {
            Ok(frame) => {
                parts
                    .logger
                    .timing("capture", capture_start.elapsed().as_secs_f64() * 1000.0);
                run_cycle(&mut parts, frame, &slot, &stats, min_face_px);
            }
            Err(CaptureError::Transient) => {
                stats.record_skipped_read();
            }
            Err(e) => {
                // Per-cycle failures never end the loop; only stop() does.
                log::warn!("frame read failed, skipping cycle: {e}");
                stats.record_skipped_read();
            }
        }

        // Cadence floor: cooperative yield, not a hard real-time bound.
        std::thread::sleep(cadence);
    }

    parts.source.close();
    state.store(PipelineState::Idle as u8, Ordering::SeqCst);
    parts.logger.info("pipeline worker stopped");
    parts.logger.summary();
    parts
}

/// One full cycle over an acquired frame: locate, select, classify,
/// annotate, publish.
fn run_cycle(
    parts: &mut WorkerParts,
    frame: Frame,
    slot: &ViewSlot,
    stats: &PipelineStats,
    min_face_px: u32,
) {
    let locate_start = Instant::now();
    let regions = parts.locator.locate(&frame);
    parts
        .logger
        .timing("locate", locate_start.elapsed().as_secs_f64() * 1000.0);

    let selected = Region::select_largest(&regions, frame.width(), frame.height()).cloned();

    let classification = match &selected {
        None => {
            stats.record_no_face();
            Classification::no_face()
        }
        Some(region) => classify_region(parts, &frame, region, stats, min_face_px),
    };

    let annotate_start = Instant::now();
    let annotated = parts
        .renderer
        .annotate(&frame, selected.as_ref(), &classification);
    parts
        .logger
        .timing("annotate", annotate_start.elapsed().as_secs_f64() * 1000.0);

    slot.publish(annotated, classification);
    stats.record_publish();
    if let Some(view) = slot.snapshot() {
        parts.logger.tick(view.sequence);
    }
}

fn classify_region(
    parts: &mut WorkerParts,
    frame: &Frame,
    region: &Region,
    stats: &PipelineStats,
    min_face_px: u32,
) -> Classification {
    if region.width < min_face_px as i32 || region.height < min_face_px as i32 {
        stats.record_classify_failure();
        return Classification::detection_failed();
    }

    let crop = frame.crop(region);
    let classify_start = Instant::now();
    let result = parts.classifier.classify(&crop);
    parts
        .logger
        .timing("classify", classify_start.elapsed().as_secs_f64() * 1000.0);

    match result {
        Ok((label, confidence)) => Classification::new(label, confidence),
        Err(e) => {
            log::debug!("classification failed: {e}");
            stats.record_classify_failure();
            Classification::detection_failed()
        }
    }
}
