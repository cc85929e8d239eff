mod surface;

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use winit::{
    application::ApplicationHandler,
    event::{ElementState, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    window::{Fullscreen, Window, WindowAttributes, WindowId},
};

pub use surface::GpuSink;

use crate::canvas::ScreenSize;
use crate::config::SlideshowConfig;
use crate::engine::Engine;
use crate::events::{Control, EngineSignal, ReturnRequest};
use crate::tasks::loader::PrefetchLoader;

const DISPLAY_STEP: Duration = Duration::from_secs(1);
const MIN_DISPLAY: Duration = Duration::from_secs(1);

#[derive(Debug)]
enum ViewerEvent {
    Cancelled,
}

/// Why the window closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewerOutcome {
    /// Escape/Q, window close, or Ctrl-C.
    Quit,
    /// The last slide finished without looping.
    Finished,
    /// The user asked to go back to the launcher.
    Return(ReturnRequest),
}

/// What a key press asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyAction {
    Engine(Control),
    ToggleLoop,
    LongerDisplay,
    ShorterDisplay,
}

pub fn key_action(key: &Key) -> Option<KeyAction> {
    match key {
        Key::Named(NamedKey::ArrowRight) => Some(KeyAction::Engine(Control::Next)),
        Key::Named(NamedKey::ArrowLeft) => Some(KeyAction::Engine(Control::Prev)),
        Key::Named(NamedKey::Space) => Some(KeyAction::Engine(Control::TogglePause)),
        Key::Named(NamedKey::Escape) => Some(KeyAction::Engine(Control::Quit)),
        Key::Named(NamedKey::Backspace) => Some(KeyAction::Engine(Control::Return)),
        Key::Named(NamedKey::ArrowUp) => Some(KeyAction::LongerDisplay),
        Key::Named(NamedKey::ArrowDown) => Some(KeyAction::ShorterDisplay),
        Key::Character(c) => match c.to_lowercase().as_str() {
            "q" => Some(KeyAction::Engine(Control::Quit)),
            "b" => Some(KeyAction::Engine(Control::Return)),
            "l" => Some(KeyAction::ToggleLoop),
            " " => Some(KeyAction::Engine(Control::TogglePause)),
            _ => None,
        },
        _ => None,
    }
}

/// `"{file name} ({i+1}/{n})"`.
pub fn slide_title(path: &Path, index: usize, count: usize) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    format!("{name} ({}/{count})", index + 1)
}

/// Display duration after one Up/Down press, never below one second.
pub fn adjust_display(current: Duration, action: KeyAction) -> Duration {
    match action {
        KeyAction::LongerDisplay => current.saturating_add(DISPLAY_STEP),
        KeyAction::ShorterDisplay => current.saturating_sub(DISPLAY_STEP).max(MIN_DISPLAY),
        _ => current,
    }
}

struct Running {
    window: Arc<Window>,
    engine: Engine<PrefetchLoader, GpuSink>,
}

struct ViewerApp {
    cfg: Option<SlideshowConfig>,
    cancel: CancellationToken,
    running: Option<Running>,
    outcome: ViewerOutcome,
    failure: Option<anyhow::Error>,
}

impl ViewerApp {
    fn new(cfg: SlideshowConfig, cancel: CancellationToken) -> Self {
        Self {
            cfg: Some(cfg),
            cancel,
            running: None,
            outcome: ViewerOutcome::Quit,
            failure: None,
        }
    }

    fn launch(&mut self, event_loop: &ActiveEventLoop, cfg: SlideshowConfig) -> Result<()> {
        let attrs = WindowAttributes::default()
            .with_title("Slideshow")
            .with_fullscreen(Some(Fullscreen::Borderless(None)));
        let window = Arc::new(
            event_loop
                .create_window(attrs)
                .context("failed to create slideshow window")?,
        );
        window.set_cursor_visible(false);

        let physical = window
            .current_monitor()
            .map_or_else(|| window.inner_size(), |monitor| monitor.size());
        let screen = ScreenSize::new(physical.width, physical.height);
        info!(width = screen.width, height = screen.height, "screen size");

        let sink = GpuSink::new(window.clone()).context("failed to initialize GPU state")?;
        let loader = PrefetchLoader::spawn(cfg.images().to_vec(), screen);
        let mut engine = Engine::new(cfg, loader, sink).with_clock(Instant::now);
        let signals = engine.start(Instant::now());
        self.running = Some(Running { window, engine });
        self.dispatch(event_loop, signals);
        Ok(())
    }

    fn dispatch(&mut self, event_loop: &ActiveEventLoop, signals: Vec<EngineSignal>) {
        for signal in signals {
            match signal {
                EngineSignal::SlideChanged(index) => {
                    if let Some(running) = self.running.as_ref() {
                        let cfg = running.engine.config();
                        if let Some(path) = cfg.images().get(index) {
                            let title = slide_title(path, index, cfg.len());
                            debug!(index, %title, "slide changed");
                            running.window.set_title(&title);
                        }
                    }
                }
                EngineSignal::EndOfSlideshow => {
                    info!("slideshow finished");
                    self.outcome = ViewerOutcome::Finished;
                    event_loop.exit();
                }
                EngineSignal::UserExit => {
                    self.outcome = ViewerOutcome::Quit;
                    event_loop.exit();
                }
                EngineSignal::ReturnRequested(req) => {
                    info!(dir = %req.directory.display(), "return to launcher requested");
                    self.outcome = ViewerOutcome::Return(req);
                    event_loop.exit();
                }
            }
        }
    }

    fn on_key(&mut self, event_loop: &ActiveEventLoop, action: KeyAction) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        let engine = &mut running.engine;
        let now = Instant::now();
        let signals = match action {
            KeyAction::Engine(control) => engine.handle(control, now),
            KeyAction::ToggleLoop => {
                let looping = !engine.config().loop_slides();
                engine.set_loop(looping);
                info!(looping, "loop toggled");
                Vec::new()
            }
            KeyAction::LongerDisplay | KeyAction::ShorterDisplay => {
                let duration = adjust_display(engine.config().display_duration(), action);
                match engine.set_display_duration(duration) {
                    Ok(()) => info!(?duration, "display duration changed"),
                    Err(err) => warn!(error = %err, "display duration rejected"),
                }
                Vec::new()
            }
        };
        self.dispatch(event_loop, signals);
    }
}

impl ApplicationHandler<ViewerEvent> for ViewerApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.cancel.is_cancelled() {
            event_loop.exit();
            return;
        }
        let Some(cfg) = self.cfg.take() else {
            return;
        };
        if let Err(err) = self.launch(event_loop, cfg) {
            error!(error = ?err, "failed to start slideshow window");
            self.failure = Some(err);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, window_id: WindowId, event: WindowEvent) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        if running.window.id() != window_id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => {
                info!("slideshow window close requested");
                self.outcome = ViewerOutcome::Quit;
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                running.engine.sink_mut().resize(new_size);
                running.window.request_redraw();
            }
            WindowEvent::RedrawRequested => {
                running.engine.refresh();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if event.state != ElementState::Pressed || event.repeat {
                    return;
                }
                if let Some(action) = key_action(&event.logical_key) {
                    debug!(?action, "key");
                    self.on_key(event_loop, action);
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        let Some(running) = self.running.as_mut() else {
            return;
        };
        let signals = running.engine.poll(Instant::now());
        let deadline = running.engine.next_deadline();
        self.dispatch(event_loop, signals);
        match deadline {
            Some(at) => event_loop.set_control_flow(ControlFlow::WaitUntil(at)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }

    fn user_event(&mut self, event_loop: &ActiveEventLoop, event: ViewerEvent) {
        match event {
            ViewerEvent::Cancelled => {
                info!("viewer received cancellation event");
                self.outcome = ViewerOutcome::Quit;
                event_loop.exit();
            }
        }
    }
}

/// Run the slideshow fullscreen on the calling thread until it ends.
///
/// Must be called from inside a tokio runtime; cancellation of `cancel`
/// closes the window.
pub fn run_windowed(cfg: SlideshowConfig, cancel: CancellationToken) -> Result<ViewerOutcome> {
    let event_loop = EventLoop::<ViewerEvent>::with_user_event()
        .build()
        .context("failed to build viewer event loop")?;
    let proxy = event_loop.create_proxy();

    let cancel_task = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            cancel.cancelled().await;
            let _ = proxy.send_event(ViewerEvent::Cancelled);
        })
    };

    let mut app = ViewerApp::new(cfg, cancel);
    let run_result = event_loop.run_app(&mut app);
    cancel_task.abort();
    run_result.context("viewer event loop failed")?;

    if let Some(err) = app.failure.take() {
        return Err(err);
    }
    // Stop the prefetch worker before handing control back.
    app.running = None;
    Ok(app.outcome)
}
