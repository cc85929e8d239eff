use crate::canvas::Canvas;
use crate::error::RenderSinkError;

/// Something that can put a finished frame on screen.
///
/// The frame is only borrowed for the duration of the call.
pub trait DisplaySink {
    fn present(&mut self, frame: &Canvas) -> Result<(), RenderSinkError>;
}

impl<S: DisplaySink + ?Sized> DisplaySink for Box<S> {
    fn present(&mut self, frame: &Canvas) -> Result<(), RenderSinkError> {
        (**self).present(frame)
    }
}
