use std::time::{Duration, Instant};

use crate::classify::domain::emotion_classifier::{ClassifyError, EmotionClassifier};
use crate::shared::classification::Emotion;
use crate::shared::frame::Frame;

struct Request {
    id: u64,
    face: Frame,
}

struct Response {
    id: u64,
    result: Result<(Emotion, f32), ClassifyError>,
}

/// Decorator that bounds the latency of an inner classifier.
///
/// The inner classifier runs on a dedicated thread; `classify` waits at
/// most `timeout` for its answer and abandons the cycle with
/// [`ClassifyError::Timeout`] otherwise. A late answer from an
/// abandoned call is discarded by request id on the next call, so one
/// slow inference can never leak into a later cycle.
pub struct TimeoutClassifier {
    request_tx: Option<crossbeam_channel::Sender<Request>>,
    response_rx: crossbeam_channel::Receiver<Response>,
    timeout: Duration,
    next_id: u64,
    worker: Option<std::thread::JoinHandle<()>>,
}

impl TimeoutClassifier {
    pub fn new(mut inner: Box<dyn EmotionClassifier>, timeout: Duration) -> Self {
        let (request_tx, request_rx) = crossbeam_channel::unbounded::<Request>();
        let (response_tx, response_rx) = crossbeam_channel::unbounded::<Response>();

        let worker = std::thread::spawn(move || {
            for request in request_rx {
                let result = inner.classify(&request.face);
                if response_tx
                    .send(Response {
                        id: request.id,
                        result,
                    })
                    .is_err()
                {
                    break;
                }
            }
        });

        Self {
            request_tx: Some(request_tx),
            response_rx,
            timeout,
            next_id: 0,
            worker: Some(worker),
        }
    }
}

impl EmotionClassifier for TimeoutClassifier {
    fn classify(&mut self, face: &Frame) -> Result<(Emotion, f32), ClassifyError> {
        let id = self.next_id;
        self.next_id += 1;

        self.request_tx
            .as_ref()
            .ok_or_else(|| ClassifyError::Failed("classifier worker stopped".into()))?
            .send(Request {
                id,
                face: face.clone(),
            })
            .map_err(|_| ClassifyError::Failed("classifier worker exited".into()))?;

        let deadline = Instant::now() + self.timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.response_rx.recv_timeout(remaining) {
                Ok(response) if response.id == id => return response.result,
                // Stale answer from an abandoned call; drop and keep waiting.
                Ok(_) => continue,
                Err(crossbeam_channel::RecvTimeoutError::Timeout) => {
                    log::warn!("classification exceeded {:?}, abandoning cycle", self.timeout);
                    return Err(ClassifyError::Timeout);
                }
                Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                    return Err(ClassifyError::Failed("classifier worker exited".into()));
                }
            }
        }
    }
}

impl Drop for TimeoutClassifier {
    fn drop(&mut self) {
        // Closing the request channel lets the worker drain and exit.
        drop(self.request_tx.take());
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
