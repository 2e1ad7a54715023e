use std::sync::{Arc, Mutex};

use crate::shared::classification::Classification;
use crate::shared::frame::Frame;

/// The latest published result: one display frame and its classification.
///
/// Frames are shared via `Arc` so a snapshot is a pointer clone, not a
/// pixel copy; the display side can hold its snapshot for as long as it
/// likes without blocking the worker.
#[derive(Clone, Debug)]
pub struct PublishedView {
    pub frame: Arc<Frame>,
    pub classification: Classification,
    /// Monotonic publish counter; lets a poller detect missed or
    /// repeated views.
    pub sequence: u64,
}

/// Single-item, overwrite-on-write handoff slot between the pipeline
/// worker and the display loop.
///
/// Last-write-wins and lossy: a new publish replaces the previous view
/// atomically, stale views are never delivered late, and readers always
/// observe a complete (never torn) view. This and the pipeline state
/// are the only data shared between the two threads.
#[derive(Default)]
pub struct ViewSlot {
    inner: Mutex<Option<PublishedView>>,
    // Sequence lives under the same lock so publish order and sequence
    // order can never disagree.
}

impl ViewSlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically replaces the slot content.
    pub fn publish(&self, frame: Frame, classification: Classification) {
        let mut guard = self.inner.lock().expect("view slot lock poisoned");
        let sequence = guard.as_ref().map_or(0, |v| v.sequence + 1);
        *guard = Some(PublishedView {
            frame: Arc::new(frame),
            classification,
            sequence,
        });
    }

    /// Returns the most recent view, or `None` before the first publish.
    pub fn snapshot(&self) -> Option<PublishedView> {
        self.inner.lock().expect("view slot lock poisoned").clone()
    }

    /// Clears the slot. Called when a pipeline starts so a display
    /// never shows a frame from a previous run.
    pub fn clear(&self) {
        *self.inner.lock().expect("view slot lock poisoned") = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::classification::Emotion;

    fn frame(value: u8) -> Frame {
        Frame::new(vec![value; 4 * 4 * 3], 4, 4, 0)
    }

    #[test]
    fn test_empty_slot_snapshot_is_none() {
        assert!(ViewSlot::new().snapshot().is_none());
    }

    #[test]
    fn test_publish_then_snapshot() {
        let slot = ViewSlot::new();
        slot.publish(frame(7), Classification::new(Emotion::Happy, 0.8));

        let view = slot.snapshot().unwrap();
        assert_eq!(view.frame.data()[0], 7);
        assert_eq!(view.classification.label, Emotion::Happy);
        assert_eq!(view.sequence, 0);
    }

    #[test]
    fn test_publish_overwrites_no_backlog() {
        let slot = ViewSlot::new();
        slot.publish(frame(1), Classification::no_face());
        slot.publish(frame(2), Classification::no_face());
        slot.publish(frame(3), Classification::no_face());

        let view = slot.snapshot().unwrap();
        assert_eq!(view.frame.data()[0], 3);
        assert_eq!(view.sequence, 2);
    }

    #[test]
    fn test_snapshot_survives_later_publish() {
        let slot = ViewSlot::new();
        slot.publish(frame(1), Classification::no_face());
        let old = slot.snapshot().unwrap();
        slot.publish(frame(2), Classification::no_face());

        // The reader's snapshot is immutable, last-write only affects
        // future snapshots.
        assert_eq!(old.frame.data()[0], 1);
        assert_eq!(slot.snapshot().unwrap().frame.data()[0], 2);
    }

    #[test]
    fn test_clear_resets() {
        let slot = ViewSlot::new();
        slot.publish(frame(1), Classification::no_face());
        slot.clear();
        assert!(slot.snapshot().is_none());
    }

    #[test]
    fn test_concurrent_publish_and_snapshot() {
        let slot = Arc::new(ViewSlot::new());
        let writer_slot = Arc::clone(&slot);

        let writer = std::thread::spawn(move || {
            for i in 0..200u8 {
                writer_slot.publish(frame(i), Classification::new(Emotion::Neutral, 0.5));
            }
        });

        // Every observed view must be internally consistent.
        for _ in 0..200 {
            if let Some(view) = slot.snapshot() {
                let first = view.frame.data()[0];
                assert!(view.frame.data().iter().all(|&b| b == first));
            }
        }
        writer.join().unwrap();

        assert_eq!(slot.snapshot().unwrap().sequence, 199);
    }
}
