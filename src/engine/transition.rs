//! Crossfade scheduling: split a transition into evenly spaced ticks and
//! push one blended frame per tick.

use std::time::{Duration, Instant};

use tracing::{trace, warn};

use super::sink::DisplaySink;
use crate::canvas::Canvas;
use crate::processing::blend::blend;

/// Shape of one crossfade, captured when it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionPlan {
    steps: u32,
    duration: Duration,
}

impl TransitionPlan {
    /// A zero duration always collapses to a single step.
    pub fn new(duration: Duration, steps: u32) -> Self {
        let steps = if duration.is_zero() { 1 } else { steps.max(1) };
        Self { steps, duration }
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// No intermediate frames; switch straight to the incoming slide.
    pub fn is_instant(&self) -> bool {
        self.duration.is_zero()
    }

    /// Offset of tick `step` from the transition start, rounded to whole
    /// milliseconds. Computed from the start rather than summed, so
    /// rounding never accumulates.
    #[allow(clippy::cast_possible_truncation)]
    pub fn offset(&self, step: u32) -> Duration {
        let step = u128::from(step.min(self.steps));
        let nanos = self.duration.as_nanos() * step / u128::from(self.steps);
        let millis = (nanos + 500_000) / 1_000_000;
        Duration::from_millis(millis as u64)
    }

    /// Blend factor shown at tick `step`.
    #[allow(clippy::cast_precision_loss)]
    pub fn progress(&self, step: u32) -> f32 {
        step.min(self.steps) as f32 / self.steps as f32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Continue,
    Finished,
}

/// An in-flight crossfade.
#[derive(Debug, Clone)]
pub struct Transition {
    plan: TransitionPlan,
    started: Instant,
    progress: u32,
}

impl Transition {
    pub fn start(plan: TransitionPlan, now: Instant) -> Self {
        Self {
            plan,
            started: now,
            progress: 0,
        }
    }

    /// Ticks completed so far.
    pub fn progress(&self) -> u32 {
        self.progress
    }

    pub fn is_finished(&self) -> bool {
        self.progress >= self.plan.steps
    }

    /// When the next tick is due.
    pub fn next_deadline(&self) -> Instant {
        self.started + self.plan.offset(self.progress + 1)
    }

    /// The frame the last completed tick showed.
    pub fn current_frame(&self, from: &Canvas, to: &Canvas) -> Canvas {
        match self.progress {
            0 => from.clone(),
            step if step >= self.plan.steps => to.clone(),
            step => blend(from, to, self.plan.progress(step)),
        }
    }

    /// Render and present the next step. A sink failure drops the frame
    /// but progress still moves, so the fade always ends.
    pub fn tick<S: DisplaySink + ?Sized>(&mut self, from: &Canvas, to: &Canvas, sink: &mut S) -> TickOutcome {
        if self.is_finished() {
            return TickOutcome::Finished;
        }
        let step = self.progress + 1;
        let result = if step >= self.plan.steps {
            sink.present(to)
        } else {
            let frame = blend(from, to, self.plan.progress(step));
            sink.present(&frame)
        };
        if let Err(err) = result {
            warn!(step, steps = self.plan.steps, error = %err, "frame dropped");
        } else {
            trace!(step, steps = self.plan.steps, "frame presented");
        }
        self.progress = step;
        if self.is_finished() {
            TickOutcome::Finished
        } else {
            TickOutcome::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::ScreenSize;
    use crate::error::RenderSinkError;
    use image::{Rgba, RgbaImage};

    #[derive(Default)]
    struct Frames {
        shown: Vec<[u8; 4]>,
        fail_every_other: bool,
        calls: usize,
    }

    impl DisplaySink for Frames {
        fn present(&mut self, frame: &Canvas) -> Result<(), RenderSinkError> {
            self.calls += 1;
            if self.fail_every_other && self.calls % 2 == 1 {
                return Err(RenderSinkError::Timeout);
            }
            self.shown.push(frame.pixel(0, 0));
            Ok(())
        }
    }

    fn solid(v: u8) -> Canvas {
        Canvas::from_image(RgbaImage::from_pixel(2, 2, Rgba([v, v, v, 255])))
    }

    #[test]
    fn zero_duration_collapses_to_one_step() {
        let plan = TransitionPlan::new(Duration::ZERO, 30);
        assert_eq!(plan.steps(), 1);
        assert!(plan.is_instant());
    }

    #[test]
    fn offsets_never_drift_more_than_a_millisecond() {
        // 1000ms / 30 steps does not divide evenly
        let plan = TransitionPlan::new(Duration::from_millis(1000), 30);
        for step in 1..=30u32 {
            let exact = 1000.0 * f64::from(step) / 30.0;
            let got = plan.offset(step).as_millis() as f64;
            assert!((got - exact).abs() <= 0.5, "step {step}: {got} vs {exact}");
        }
        assert_eq!(plan.offset(30), Duration::from_millis(1000));
    }

    #[test]
    fn ticks_walk_from_blend_to_target() {
        let plan = TransitionPlan::new(Duration::from_millis(40), 4);
        let t0 = Instant::now();
        let mut tr = Transition::start(plan, t0);
        let mut sink = Frames::default();
        let from = solid(0);
        let to = solid(200);

        assert_eq!(tr.next_deadline(), t0 + Duration::from_millis(10));
        let mut outcomes = Vec::new();
        for _ in 0..4 {
            outcomes.push(tr.tick(&from, &to, &mut sink));
        }
        assert_eq!(
            outcomes,
            vec![
                TickOutcome::Continue,
                TickOutcome::Continue,
                TickOutcome::Continue,
                TickOutcome::Finished
            ]
        );
        let values: Vec<u8> = sink.shown.iter().map(|p| p[0]).collect();
        assert_eq!(values, vec![50, 100, 150, 200]);
    }

    #[test]
    fn current_frame_follows_ticks() {
        let plan = TransitionPlan::new(Duration::from_millis(40), 4);
        let mut tr = Transition::start(plan, Instant::now());
        let mut sink = Frames::default();
        let from = solid(0);
        let to = solid(200);
        assert_eq!(tr.current_frame(&from, &to).pixel(0, 0), [0, 0, 0, 255]);
        tr.tick(&from, &to, &mut sink);
        tr.tick(&from, &to, &mut sink);
        assert_eq!(tr.current_frame(&from, &to).pixel(0, 0), [100, 100, 100, 255]);
        tr.tick(&from, &to, &mut sink);
        tr.tick(&from, &to, &mut sink);
        assert_eq!(tr.current_frame(&from, &to), to);
    }

    #[test]
    fn failed_frames_still_advance() {
        let plan = TransitionPlan::new(Duration::from_millis(30), 3);
        let mut tr = Transition::start(plan, Instant::now());
        let mut sink = Frames {
            fail_every_other: true,
            ..Frames::default()
        };
        let a = solid(0);
        let b = solid(90);
        tr.tick(&a, &b, &mut sink);
        tr.tick(&a, &b, &mut sink);
        assert_eq!(tr.tick(&a, &b, &mut sink), TickOutcome::Finished);
        assert_eq!(sink.calls, 3);
        assert_eq!(sink.shown.len(), 1);
        assert!(tr.is_finished());
        assert_eq!(tr.tick(&a, &b, &mut sink), TickOutcome::Finished);
        assert_eq!(sink.calls, 3);
    }

    #[test]
    fn black_canvas_helper_is_usable_as_source() {
        let size = ScreenSize::new(2, 2);
        let mut sink = Frames::default();
        let mut tr = Transition::start(TransitionPlan::new(Duration::from_millis(10), 1), Instant::now());
        assert_eq!(
            tr.tick(&Canvas::black(size), &solid(9), &mut sink),
            TickOutcome::Finished
        );
        assert_eq!(sink.shown, vec![[9, 9, 9, 255]]);
    }
}
