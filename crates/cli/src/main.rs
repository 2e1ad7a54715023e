use std::path::{Path, PathBuf};
use std::process;
use std::time::{Duration, Instant};

use clap::Parser;

use moodlens_core::capture::domain::frame_source::FrameSource;
use moodlens_core::capture::infrastructure::image_sequence_source::ImageSequenceSource;
use moodlens_core::capture::infrastructure::synthetic_source::SyntheticSource;
use moodlens_core::classify::domain::emotion_classifier::EmotionClassifier;
use moodlens_core::classify::infrastructure::luminance_classifier::LuminanceClassifier;
use moodlens_core::classify::infrastructure::onnx_emotion_classifier::OnnxEmotionClassifier;
use moodlens_core::classify::infrastructure::timeout_classifier::TimeoutClassifier;
use moodlens_core::detect::domain::face_locator::FaceLocator;
use moodlens_core::detect::infrastructure::onnx_face_locator::OnnxFaceLocator;
use moodlens_core::detect::infrastructure::skin_tone_locator::SkinToneLocator;
use moodlens_core::pipeline::emotion_pipeline::EmotionPipeline;
use moodlens_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use moodlens_core::render::infrastructure::box_renderer::BoxAnnotationRenderer;
use moodlens_core::shared::settings::Settings;

/// Live emotion recognition from a camera or image stream.
#[derive(Parser)]
#[command(name = "moodlens")]
struct Cli {
    /// Capture source: synthetic, images, or webcam.
    #[arg(long, default_value = "synthetic")]
    source: String,

    /// Directory of image frames (required with --source images).
    #[arg(long)]
    frames: Option<PathBuf>,

    /// Camera device index (with --source webcam).
    #[arg(long, default_value = "0")]
    device: u32,

    /// Face locator backend: skin or onnx.
    #[arg(long, default_value = "skin")]
    locator: String,

    /// ONNX face detection model (required with --locator onnx).
    #[arg(long)]
    face_model: Option<PathBuf>,

    /// Emotion classifier backend: heuristic or onnx.
    #[arg(long, default_value = "heuristic")]
    classifier: String,

    /// ONNX emotion model (required with --classifier onnx).
    #[arg(long)]
    emotion_model: Option<PathBuf>,

    /// JSON settings file; unset fields keep their defaults.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// How long to run before stopping, in seconds.
    #[arg(long, default_value = "10")]
    duration: u64,

    /// Display poll interval in milliseconds.
    #[arg(long, default_value = "200")]
    poll_ms: u64,

    /// Save each newly published annotated frame into this directory.
    #[arg(long)]
    save_frames: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let settings = match &cli.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };

    let source = build_source(&cli)?;
    let locator = build_locator(&cli, &settings)?;
    let classifier = build_classifier(&cli, &settings)?;

    let mut pipeline = EmotionPipeline::new(
        source,
        locator,
        classifier,
        Box::new(BoxAnnotationRenderer),
        Box::new(StdoutPipelineLogger::default()),
        &settings,
    );

    if let Some(dir) = &cli.save_frames {
        std::fs::create_dir_all(dir)?;
    }

    pipeline.start()?;
    poll_display(&pipeline, &cli)?;
    pipeline.stop()?;

    let stats = pipeline.stats();
    log::info!(
        "published {} frames ({} reads skipped, {} classify failures, {} no-face ticks)",
        stats.frames_published,
        stats.reads_skipped,
        stats.classify_failures,
        stats.no_face_ticks
    );

    Ok(())
}

/// Terminal stand-in for a display frontend: polls the handoff slot on
/// its own schedule and reports each newly published view.
fn poll_display(pipeline: &EmotionPipeline, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let slot = pipeline.view_slot();
    let deadline = Instant::now() + Duration::from_secs(cli.duration);
    let mut last_sequence = None;

    while Instant::now() < deadline {
        if let Some(view) = slot.snapshot() {
            if last_sequence != Some(view.sequence) {
                last_sequence = Some(view.sequence);
                println!(
                    "[{:5}] {} ({:.2})",
                    view.sequence, view.classification.label, view.classification.confidence
                );
                if let Some(dir) = &cli.save_frames {
                    save_frame(dir, &view)?;
                }
            }
        }
        std::thread::sleep(Duration::from_millis(cli.poll_ms));
    }

    Ok(())
}

fn save_frame(
    dir: &Path,
    view: &moodlens_core::pipeline::view_slot::PublishedView,
) -> Result<(), Box<dyn std::error::Error>> {
    let image = image::RgbImage::from_raw(
        view.frame.width(),
        view.frame.height(),
        view.frame.data().to_vec(),
    )
    .ok_or("frame buffer does not match its dimensions")?;
    image.save(dir.join(format!("frame_{:06}.png", view.sequence)))?;
    Ok(())
}

fn build_source(cli: &Cli) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    match cli.source.as_str() {
        "synthetic" => Ok(Box::new(
            SyntheticSource::new(640, 480).with_patch(160, 160, 40),
        )),
        "images" => {
            let dir = cli
                .frames
                .as_ref()
                .ok_or("--source images requires --frames <DIR>")?;
            Ok(Box::new(ImageSequenceSource::new(dir)))
        }
        "webcam" => build_webcam_source(cli),
        other => Err(format!("unknown source '{other}' (expected synthetic, images, webcam)").into()),
    }
}

#[cfg(feature = "webcam")]
fn build_webcam_source(cli: &Cli) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    use moodlens_core::capture::infrastructure::webcam_source::WebcamSource;
    Ok(Box::new(WebcamSource::new(cli.device)))
}

#[cfg(not(feature = "webcam"))]
fn build_webcam_source(_cli: &Cli) -> Result<Box<dyn FrameSource>, Box<dyn std::error::Error>> {
    Err("this build has no webcam support (rebuild with --features webcam)".into())
}

fn build_locator(
    cli: &Cli,
    settings: &Settings,
) -> Result<Box<dyn FaceLocator>, Box<dyn std::error::Error>> {
    match cli.locator.as_str() {
        "skin" => Ok(Box::new(SkinToneLocator::new(
            settings.skin_block_px,
            settings.skin_coverage_min,
        ))),
        "onnx" => {
            let model = cli
                .face_model
                .as_ref()
                .ok_or("--locator onnx requires --face-model <FILE>")?;
            Ok(Box::new(OnnxFaceLocator::new(
                model,
                settings.locator_confidence,
            )?))
        }
        other => Err(format!("unknown locator '{other}' (expected skin, onnx)").into()),
    }
}

fn build_classifier(
    cli: &Cli,
    settings: &Settings,
) -> Result<Box<dyn EmotionClassifier>, Box<dyn std::error::Error>> {
    let inner: Box<dyn EmotionClassifier> = match cli.classifier.as_str() {
        "heuristic" => Box::new(LuminanceClassifier::from_settings(settings)),
        "onnx" => {
            let model = cli
                .emotion_model
                .as_ref()
                .ok_or("--classifier onnx requires --emotion-model <FILE>")?;
            Box::new(OnnxEmotionClassifier::new(model)?)
        }
        other => return Err(format!("unknown classifier '{other}' (expected heuristic, onnx)").into()),
    };

    // A stalled model inference must never wedge the pipeline loop.
    Ok(Box::new(TimeoutClassifier::new(
        inner,
        settings.classify_timeout(),
    )))
}
