use std::path::PathBuf;
use std::time::Duration;

/// Commands the shell or input layer sends to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Next,
    Prev,
    TogglePause,
    Return,
    Quit,
}

/// Settings handed back when the user asks to go back to the launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnRequest {
    pub directory: PathBuf,
    pub display_duration: Duration,
    pub transition_duration: Duration,
}

/// Emitted by the engine after a state change completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineSignal {
    SlideChanged(usize),
    /// Only without looping, once the last slide is done.
    EndOfSlideshow,
    UserExit,
    ReturnRequested(ReturnRequest),
}
