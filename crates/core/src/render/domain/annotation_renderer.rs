use crate::shared::classification::Classification;
use crate::shared::frame::Frame;
use crate::shared::region::Region;

/// Domain interface for drawing detection annotations.
///
/// Pure transform: the input frame is never mutated; the annotated
/// result is a fresh copy. Text overlay stays with the display side,
/// which knows its own fonts and theme; renderers only draw geometry.
pub trait AnnotationRenderer: Send {
    fn annotate(
        &self,
        frame: &Frame,
        region: Option<&Region>,
        classification: &Classification,
    ) -> Frame;
}
