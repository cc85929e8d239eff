//! The presentation engine: slide sequencing, auto-advance and crossfades.
//!
//! [`Engine`] is a plain state machine. It owns the configuration, a
//! [`CanvasSource`] and a [`DisplaySink`], and is driven entirely from one
//! thread through `&mut self` calls that carry the current time. Callers
//! sleep until [`Engine::next_deadline`] and then call [`Engine::poll`].

pub mod sink;
pub mod timers;
pub mod transition;

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::canvas::Canvas;
use crate::config::SlideshowConfig;
use crate::error::Error;
use crate::events::{Control, EngineSignal, ReturnRequest};
use crate::tasks::loader::CanvasSource;

pub use sink::DisplaySink;
pub use timers::{TimerHandle, TimerKind, Timers};
pub use transition::{TickOutcome, Transition, TransitionPlan};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Constructed but not started.
    Idle,
    Displaying,
    Transitioning,
    /// Terminal; only return and quit still do anything.
    Stopped,
}

/// Everything the sequencer mutates.
#[derive(Debug)]
pub struct EngineState {
    current_index: usize,
    /// The frame currently on screen (the outgoing one during a fade).
    previous_canvas: Option<Canvas>,
    /// The incoming frame while transitioning.
    pending_canvas: Option<Canvas>,
    mode: Mode,
    paused: bool,
    transition: Option<Transition>,
    timers: Timers,
    end_signalled: bool,
}

impl EngineState {
    fn new(start_index: usize) -> Self {
        Self {
            current_index: start_index,
            previous_canvas: None,
            pending_canvas: None,
            mode: Mode::Idle,
            paused: false,
            transition: None,
            timers: Timers::default(),
            end_signalled: false,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn previous_canvas(&self) -> Option<&Canvas> {
        self.previous_canvas.as_ref()
    }

    pub fn pending_canvas(&self) -> Option<&Canvas> {
        self.pending_canvas.as_ref()
    }

    /// Completed ticks of the running transition.
    pub fn transition_progress(&self) -> Option<u32> {
        self.transition.as_ref().map(Transition::progress)
    }

    pub fn timers(&self) -> &Timers {
        &self.timers
    }
}

pub struct Engine<L, S> {
    config: SlideshowConfig,
    source: L,
    sink: S,
    state: EngineState,
    clock: Option<fn() -> Instant>,
}

impl<L: CanvasSource, S: DisplaySink> Engine<L, S> {
    pub fn new(config: SlideshowConfig, source: L, sink: S) -> Self {
        let state = EngineState::new(config.start_index());
        Self {
            config,
            source,
            sink,
            state,
            clock: None,
        }
    }

    /// Re-read the time after each canvas is fetched, so a slow decode
    /// delays the schedule instead of eating into it.
    pub fn with_clock(mut self, clock: fn() -> Instant) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Show the start slide without a transition and arm auto-advance.
    pub fn start(&mut self, now: Instant) -> Vec<EngineSignal> {
        if self.state.mode != Mode::Idle {
            return Vec::new();
        }
        let index = self.config.start_index();
        info!(
            index,
            count = self.config.len(),
            display_duration = ?self.config.display_duration(),
            transition = ?self.config.transition_duration(),
            "slideshow started"
        );
        self.state.current_index = index;
        let canvas = self.source.canvas(index);
        let now = self.after_fetch(now);
        self.present(&canvas);
        self.state.previous_canvas = Some(canvas);
        self.settle(now);
        vec![EngineSignal::SlideChanged(index)]
    }

    pub fn handle(&mut self, control: Control, now: Instant) -> Vec<EngineSignal> {
        match control {
            Control::Next => self.next_slide(now),
            Control::Prev => self.prev_slide(now),
            Control::TogglePause => self.toggle_pause(now),
            Control::Return => self.request_return(),
            Control::Quit => self.request_quit(),
        }
    }

    /// Manual advance. Ignored unless a slide is being displayed.
    pub fn next_slide(&mut self, now: Instant) -> Vec<EngineSignal> {
        if self.state.mode != Mode::Displaying {
            debug!(mode = ?self.state.mode, "next ignored");
            return Vec::new();
        }
        self.state.timers.cancel(TimerKind::Advance);
        self.advance(now)
    }

    pub fn prev_slide(&mut self, now: Instant) -> Vec<EngineSignal> {
        if self.state.mode != Mode::Displaying {
            debug!(mode = ?self.state.mode, "prev ignored");
            return Vec::new();
        }
        let Some(target) = self.prev_index() else {
            return Vec::new();
        };
        self.state.timers.cancel(TimerKind::Advance);
        self.begin_transition(target, now)
    }

    /// Pausing cancels auto-advance; resuming advances right away.
    pub fn toggle_pause(&mut self, now: Instant) -> Vec<EngineSignal> {
        if self.state.mode != Mode::Displaying {
            return Vec::new();
        }
        if self.state.paused {
            self.state.paused = false;
            info!(index = self.state.current_index, "resumed");
            self.advance(now)
        } else {
            self.state.paused = true;
            self.state.timers.cancel(TimerKind::Advance);
            info!(index = self.state.current_index, "paused");
            Vec::new()
        }
    }

    pub fn request_return(&mut self) -> Vec<EngineSignal> {
        self.shutdown();
        vec![EngineSignal::ReturnRequested(ReturnRequest {
            directory: self.config.source_dir().to_path_buf(),
            display_duration: self.config.display_duration(),
            transition_duration: self.config.transition_duration(),
        })]
    }

    pub fn request_quit(&mut self) -> Vec<EngineSignal> {
        self.shutdown();
        vec![EngineSignal::UserExit]
    }

    /// Fire every timer due at `now`, in deadline order.
    pub fn poll(&mut self, now: Instant) -> Vec<EngineSignal> {
        let mut signals = Vec::new();
        while let Some(timer) = self.state.timers.take_due(now) {
            let fired = match timer.kind {
                TimerKind::Advance => self.on_advance_timer(now),
                TimerKind::Tick => self.on_tick(now),
            };
            signals.extend(fired);
        }
        signals
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.state.timers.next_deadline()
    }

    /// Present the frame on screen again, e.g. after the window was
    /// exposed. Mid-fade this is the blend of the last completed tick.
    pub fn refresh(&mut self) {
        let state = &self.state;
        let frame = match (state.mode, &state.transition) {
            (Mode::Transitioning, Some(tr)) => match (&state.previous_canvas, &state.pending_canvas) {
                (Some(from), Some(to)) => Some(tr.current_frame(from, to)),
                _ => None,
            },
            _ => state.previous_canvas.clone(),
        };
        if let Some(frame) = frame
            && let Err(err) = self.sink.present(&frame)
        {
            warn!(error = %err, "refresh failed");
        }
    }

    pub fn set_loop(&mut self, loop_slides: bool) {
        self.config.set_loop(loop_slides);
        debug!(loop_slides, "loop updated");
    }

    /// Takes effect the next time auto-advance is armed.
    pub fn set_display_duration(&mut self, duration: Duration) -> Result<(), Error> {
        self.config.set_display_duration(duration)?;
        debug!(?duration, "display duration updated");
        Ok(())
    }

    /// Takes effect from the next transition.
    pub fn set_transition_duration(&mut self, duration: Duration) {
        self.config.set_transition_duration(duration);
        debug!(?duration, "transition duration updated");
    }

    pub fn set_transition_steps(&mut self, steps: u32) -> Result<(), Error> {
        self.config.set_transition_steps(steps)?;
        debug!(steps, "transition steps updated");
        Ok(())
    }

    pub fn config(&self) -> &SlideshowConfig {
        &self.config
    }

    pub fn state(&self) -> &EngineState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    pub fn current_index(&self) -> usize {
        self.state.current_index
    }

    pub fn is_paused(&self) -> bool {
        self.state.paused
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    fn next_index(&self) -> Option<usize> {
        let n = self.config.len();
        let i = self.state.current_index;
        if i + 1 < n {
            Some(i + 1)
        } else if self.config.loop_slides() {
            Some(0)
        } else {
            None
        }
    }

    fn prev_index(&self) -> Option<usize> {
        let i = self.state.current_index;
        if i > 0 {
            Some(i - 1)
        } else if self.config.loop_slides() {
            Some(self.config.len() - 1)
        } else {
            None
        }
    }

    fn on_advance_timer(&mut self, now: Instant) -> Vec<EngineSignal> {
        if self.state.mode != Mode::Displaying || self.state.paused {
            return Vec::new();
        }
        self.advance(now)
    }

    fn advance(&mut self, now: Instant) -> Vec<EngineSignal> {
        match self.next_index() {
            Some(target) => self.begin_transition(target, now),
            None => self.finish(),
        }
    }

    fn finish(&mut self) -> Vec<EngineSignal> {
        self.shutdown();
        if self.state.end_signalled {
            return Vec::new();
        }
        self.state.end_signalled = true;
        info!(index = self.state.current_index, "end of slideshow");
        vec![EngineSignal::EndOfSlideshow]
    }

    fn begin_transition(&mut self, target: usize, now: Instant) -> Vec<EngineSignal> {
        let plan = TransitionPlan::new(self.config.transition_duration(), self.config.transition_steps());
        debug!(
            from = self.state.current_index,
            to = target,
            steps = plan.steps(),
            duration = ?plan.duration(),
            "slide change"
        );
        self.state.current_index = target;
        let incoming = self.source.canvas(target);
        let now = self.after_fetch(now);

        if plan.is_instant() || self.state.previous_canvas.is_none() {
            self.present(&incoming);
            self.state.previous_canvas = Some(incoming);
            self.settle(now);
        } else {
            let transition = Transition::start(plan, now);
            self.state.timers.arm(TimerKind::Tick, transition.next_deadline());
            self.state.transition = Some(transition);
            self.state.pending_canvas = Some(incoming);
            self.state.mode = Mode::Transitioning;
        }
        vec![EngineSignal::SlideChanged(target)]
    }

    fn on_tick(&mut self, now: Instant) -> Vec<EngineSignal> {
        if self.state.mode != Mode::Transitioning {
            return Vec::new();
        }
        let EngineState {
            previous_canvas,
            pending_canvas,
            transition,
            timers,
            ..
        } = &mut self.state;
        let (Some(from), Some(to), Some(tr)) = (previous_canvas.as_ref(), pending_canvas.as_ref(), transition.as_mut())
        else {
            warn!("transition state incomplete; settling");
            return self.complete_transition(now);
        };
        match tr.tick(from, to, &mut self.sink) {
            TickOutcome::Continue => {
                timers.arm(TimerKind::Tick, tr.next_deadline());
                Vec::new()
            }
            TickOutcome::Finished => self.complete_transition(now),
        }
    }

    fn complete_transition(&mut self, now: Instant) -> Vec<EngineSignal> {
        self.state.transition = None;
        if let Some(incoming) = self.state.pending_canvas.take() {
            self.state.previous_canvas = Some(incoming);
        }
        self.settle(now);
        Vec::new()
    }

    // Enter Displaying, arm auto-advance unless paused, warm the next slide.
    fn settle(&mut self, now: Instant) {
        self.state.mode = Mode::Displaying;
        self.state.timers.cancel(TimerKind::Tick);
        if !self.state.paused {
            self.state
                .timers
                .arm(TimerKind::Advance, now + self.config.display_duration());
        }
        if let Some(next) = self.next_index()
            && next != self.state.current_index
        {
            self.source.prefetch(next);
        }
    }

    fn shutdown(&mut self) {
        self.state.timers.cancel_all();
        self.state.transition = None;
        self.state.pending_canvas = None;
        self.state.mode = Mode::Stopped;
    }

    fn after_fetch(&self, now: Instant) -> Instant {
        self.clock.map_or(now, |clock| clock().max(now))
    }

    fn present(&mut self, frame: &Canvas) {
        if let Err(err) = self.sink.present(frame) {
            warn!(index = self.state.current_index, error = %err, "frame dropped");
        }
    }
}
