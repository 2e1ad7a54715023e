use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for face localization.
///
/// Returns zero or more unordered candidate regions; empty means no
/// face. Locating is best-effort: implementations that fail internally
/// log the cause and degrade to an empty result rather than surfacing
/// an error into the pipeline loop. Implementations may be stateful
/// (e.g. caching across frames), hence `&mut self`.
pub trait FaceLocator: Send {
    fn locate(&mut self, frame: &Frame) -> Vec<Region>;
}
