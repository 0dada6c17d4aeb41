//! Elapsed-time tracking for a capture session.
//!
//! The clock is driven by periodic [`Clock::tick`] calls from whatever event
//! loop owns it. Each tick pushes the formatted time and the frame count into
//! a [`DisplaySink`]; the clock itself never talks to a UI.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;
use std::time::Instant;

use log::{debug, info};

use super::frame::{self, MAX_ELAPSED_MS};
use crate::error::TimingError;

/// Monotonic millisecond source.
pub trait TimeSource {
    fn now_ms(&self) -> u64;
}

pub struct MonotonicTimeSource {
    origin: Instant,
}

impl Default for MonotonicTimeSource {
    fn default() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl TimeSource for MonotonicTimeSource {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// Time source advanced by hand. Clones share the same time.
#[derive(Clone, Default, Debug)]
pub struct ManualTimeSource {
    now: Rc<Cell<u64>>,
}

impl ManualTimeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl TimeSource for ManualTimeSource {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

/// Receives display updates on every tick.
pub trait DisplaySink {
    fn update_timer_display(&mut self, text: &str);
    fn update_frame_display(&mut self, frame: u64);
}

impl DisplaySink for () {
    fn update_timer_display(&mut self, _text: &str) {}
    fn update_frame_display(&mut self, _frame: u64) {}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoStop {
    #[default]
    Disabled,
    /// Stop once the elapsed time reaches this many milliseconds.
    AtTime(u64),
    /// Stop once the frame counter reaches this frame.
    AtFrame(u64),
}

impl AutoStop {
    fn reached(&self, elapsed_ms: u64, frame: u64) -> bool {
        match *self {
            AutoStop::Disabled => false,
            AutoStop::AtTime(target) => elapsed_ms >= target,
            AutoStop::AtFrame(target) => frame >= target,
        }
    }
}

impl fmt::Display for AutoStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            AutoStop::Disabled => write!(f, "No Auto Stop"),
            AutoStop::AtTime(ms) => match frame::format_time(ms as i64) {
                Ok(text) => write!(f, "Auto Stop at {}", text),
                Err(_) => write!(f, "Auto Stop at {} ms", ms),
            },
            AutoStop::AtFrame(1) => write!(f, "Auto Stop at 1 frame"),
            AutoStop::AtFrame(n) => write!(f, "Auto Stop at {} frames", n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Idle,
    Running,
}

/// Outcome of a single [`Clock::tick`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    /// The clock was not running; nothing happened.
    Idle,
    Running { elapsed_ms: u64, frame: u64 },
    /// The clock stopped during this tick.
    Stopped { elapsed_ms: u64, frame: u64 },
}

pub struct Clock {
    source: Box<dyn TimeSource>,
    state: ClockState,
    start_reference_ms: u64,
    /// Baseline set through the options; every fresh start counts from it.
    offset_ms: u64,
    /// What the running clock adds to the time since `start_reference_ms`.
    accumulated_ms: u64,
    last_elapsed_ms: u64,
    auto_stop: AutoStop,
    stop_pending: bool,
}

impl fmt::Debug for Clock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Clock")
            .field("state", &self.state)
            .field("offset_ms", &self.offset_ms)
            .field("last_elapsed_ms", &self.last_elapsed_ms)
            .field("auto_stop", &self.auto_stop)
            .field("stop_pending", &self.stop_pending)
            .finish()
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock {
    pub fn new() -> Self {
        Self::with_source(Box::new(MonotonicTimeSource::default()))
    }

    pub fn with_source(source: Box<dyn TimeSource>) -> Self {
        Self {
            source,
            state: ClockState::Idle,
            start_reference_ms: 0,
            offset_ms: 0,
            accumulated_ms: 0,
            last_elapsed_ms: 0,
            auto_stop: AutoStop::Disabled,
            stop_pending: false,
        }
    }

    pub fn state(&self) -> ClockState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == ClockState::Running
    }

    /// Starts counting from the offset.
    ///
    /// Starting a running clock restarts it from the offset.
    pub fn start(&mut self) {
        if self.is_running() {
            debug!("Clock restarted while running");
        }
        self.begin(self.offset_ms);
    }

    /// Continues counting from the frozen value.
    pub fn resume(&mut self) {
        if self.is_running() {
            return;
        }
        self.begin(self.last_elapsed_ms);
    }

    fn begin(&mut self, from_ms: u64) {
        self.start_reference_ms = self.source.now_ms();
        self.accumulated_ms = from_ms;
        self.last_elapsed_ms = from_ms;
        self.stop_pending = false;
        self.state = ClockState::Running;
        debug!("Clock started at {} ms", from_ms);
    }

    /// Freezes the clock at its current value.
    pub fn stop(&mut self) {
        if !self.is_running() {
            return;
        }
        self.last_elapsed_ms = self.raw_elapsed().min(MAX_ELAPSED_MS);
        self.halt();
    }

    fn halt(&mut self) {
        self.state = ClockState::Idle;
        self.stop_pending = false;
        debug!("Clock stopped at {} ms", self.last_elapsed_ms);
    }

    /// Back to idle, showing the offset.
    pub fn reset(&mut self) {
        self.state = ClockState::Idle;
        self.stop_pending = false;
        self.last_elapsed_ms = self.offset_ms;
    }

    fn raw_elapsed(&self) -> u64 {
        self.source
            .now_ms()
            .saturating_sub(self.start_reference_ms)
            .saturating_add(self.accumulated_ms)
    }

    /// Elapsed milliseconds: live while running, frozen while idle.
    pub fn elapsed(&self) -> u64 {
        match self.state {
            ClockState::Running => self.raw_elapsed().min(MAX_ELAPSED_MS),
            ClockState::Idle => self.last_elapsed_ms,
        }
    }

    pub fn frame(&self, fps: u32) -> Result<u64, TimingError> {
        frame::frames_for(self.elapsed() as i64, fps)
    }

    pub fn offset_ms(&self) -> u64 {
        self.offset_ms
    }

    /// Sets the baseline the next start counts up from.
    pub fn set_offset(&mut self, ms: i64) -> Result<(), TimingError> {
        let ms = u64::try_from(ms)
            .map_err(|_| TimingError::InvalidArgument(format!("offset cannot be negative ({})", ms)))?;
        if ms > MAX_ELAPSED_MS {
            return Err(TimingError::InvalidArgument(format!(
                "offset of {} ms does not fit in mm:ss:zzz",
                ms
            )));
        }
        self.offset_ms = ms;
        if !self.is_running() {
            self.last_elapsed_ms = ms;
        }
        Ok(())
    }

    pub fn auto_stop(&self) -> AutoStop {
        self.auto_stop
    }

    pub fn set_auto_stop(&mut self, auto_stop: AutoStop) {
        self.auto_stop = auto_stop;
        self.stop_pending = false;
    }

    pub fn is_stop_pending(&self) -> bool {
        self.stop_pending
    }

    /// One refresh of the running clock.
    ///
    /// A pending auto stop is honoured before anything is displayed. The
    /// clock also stops on its own once it reaches 59:59:999.
    pub fn tick(&mut self, fps: u32, sink: &mut dyn DisplaySink) -> Result<Tick, TimingError> {
        frame::tick_interval_ms(fps)?;

        if !self.is_running() {
            return Ok(Tick::Idle);
        }

        if self.stop_pending {
            self.halt();
            info!("Auto stop reached ({})", self.auto_stop);
            let elapsed_ms = self.last_elapsed_ms;
            return Ok(Tick::Stopped {
                elapsed_ms,
                frame: frame::frames_for(elapsed_ms as i64, fps)?,
            });
        }

        let raw = self.raw_elapsed();
        let ceiling_hit = raw >= MAX_ELAPSED_MS;
        let elapsed_ms = raw.min(MAX_ELAPSED_MS);
        let frame = frame::frames_for(elapsed_ms as i64, fps)?;
        self.last_elapsed_ms = elapsed_ms;

        if ceiling_hit {
            self.halt();
            info!("Clock reached the 59:59:999 limit and stopped");
        } else if self.auto_stop.reached(elapsed_ms, frame) {
            self.stop_pending = true;
        }

        sink.update_timer_display(&frame::format_time(elapsed_ms as i64)?);
        sink.update_frame_display(frame);

        if ceiling_hit {
            Ok(Tick::Stopped { elapsed_ms, frame })
        } else {
            Ok(Tick::Running { elapsed_ms, frame })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Labels {
        timer: String,
        frame: u64,
        updates: usize,
    }

    impl DisplaySink for Labels {
        fn update_timer_display(&mut self, text: &str) {
            self.timer = text.to_string();
            self.updates += 1;
        }

        fn update_frame_display(&mut self, frame: u64) {
            self.frame = frame;
        }
    }

    fn manual_clock() -> (Clock, ManualTimeSource) {
        let source = ManualTimeSource::new();
        (Clock::with_source(Box::new(source.clone())), source)
    }

    #[test]
    fn idle_clock_reads_zero() {
        let (clock, _) = manual_clock();
        assert_eq!(clock.state(), ClockState::Idle);
        assert_eq!(clock.elapsed(), 0);
    }

    #[test]
    fn running_clock_follows_source() {
        let (mut clock, source) = manual_clock();
        source.set(5_000);
        clock.start();
        source.advance(1_042);
        assert_eq!(clock.elapsed(), 1_042);
        assert_eq!(clock.frame(24).unwrap(), 25);
    }

    #[test]
    fn stop_freezes_value() {
        let (mut clock, source) = manual_clock();
        clock.start();
        source.advance(700);
        clock.stop();
        source.advance(10_000);
        assert_eq!(clock.elapsed(), 700);
        assert!(!clock.is_running());
    }

    #[test]
    fn resume_continues_from_frozen_value() {
        let (mut clock, source) = manual_clock();
        clock.start();
        source.advance(700);
        clock.stop();
        source.advance(3_000);
        clock.resume();
        source.advance(300);
        assert_eq!(clock.elapsed(), 1_000);
    }

    #[test]
    fn offset_is_added() {
        let (mut clock, source) = manual_clock();
        clock.set_offset(2_000).unwrap();
        assert_eq!(clock.elapsed(), 2_000);
        clock.start();
        source.advance(500);
        assert_eq!(clock.elapsed(), 2_500);
        assert!(clock.set_offset(-1).is_err());
    }

    #[test]
    fn tick_updates_display() {
        let (mut clock, source) = manual_clock();
        let mut labels = Labels::default();
        clock.start();
        source.advance(61_042);
        let tick = clock.tick(24, &mut labels).unwrap();
        assert_eq!(
            tick,
            Tick::Running {
                elapsed_ms: 61_042,
                frame: 1_465
            }
        );
        assert_eq!(labels.timer, "01:01:042");
        assert_eq!(labels.frame, 1_465);
    }

    #[test]
    fn tick_after_stop_is_noop() {
        let (mut clock, source) = manual_clock();
        let mut labels = Labels::default();
        clock.start();
        source.advance(100);
        clock.stop();
        assert_eq!(clock.tick(24, &mut labels).unwrap(), Tick::Idle);
        assert_eq!(labels.updates, 0);
    }

    #[test]
    fn ceiling_stops_clock() {
        let (mut clock, source) = manual_clock();
        let mut labels = Labels::default();
        clock.start();
        source.advance(MAX_ELAPSED_MS);
        let tick = clock.tick(24, &mut labels).unwrap();
        assert!(matches!(tick, Tick::Stopped { elapsed_ms, .. } if elapsed_ms == MAX_ELAPSED_MS));
        assert_eq!(clock.state(), ClockState::Idle);
        assert_eq!(labels.timer, "59:59:999");

        source.advance(5_000);
        assert_eq!(clock.elapsed(), MAX_ELAPSED_MS);
    }

    #[test]
    fn auto_stop_at_frame_stops_on_next_tick() {
        let (mut clock, source) = manual_clock();
        let mut labels = Labels::default();
        clock.set_auto_stop(AutoStop::AtFrame(24));
        clock.start();

        source.advance(1_000);
        assert!(matches!(clock.tick(24, &mut labels).unwrap(), Tick::Running { frame: 24, .. }));
        assert!(clock.is_stop_pending());
        let shown = labels.updates;

        source.advance(200);
        let tick = clock.tick(24, &mut labels).unwrap();
        assert_eq!(
            tick,
            Tick::Stopped {
                elapsed_ms: 1_000,
                frame: 24
            }
        );
        assert_eq!(labels.updates, shown);
        assert_eq!(clock.elapsed(), 1_000);
    }

    #[test]
    fn auto_stop_at_time() {
        let (mut clock, source) = manual_clock();
        clock.set_auto_stop(AutoStop::AtTime(500));
        clock.start();
        source.advance(499);
        clock.tick(30, &mut ()).unwrap();
        assert!(!clock.is_stop_pending());
        source.advance(1);
        clock.tick(30, &mut ()).unwrap();
        assert!(clock.is_stop_pending());
        assert!(matches!(clock.tick(30, &mut ()).unwrap(), Tick::Stopped { .. }));
    }

    #[test]
    fn tick_rejects_zero_fps() {
        let (mut clock, _) = manual_clock();
        clock.start();
        assert!(matches!(clock.tick(0, &mut ()), Err(TimingError::InvalidFps(0))));
    }

    #[test]
    fn auto_stop_labels() {
        assert_eq!(AutoStop::Disabled.to_string(), "No Auto Stop");
        assert_eq!(AutoStop::AtTime(10_000).to_string(), "Auto Stop at 00:10:000");
        assert_eq!(AutoStop::AtFrame(48).to_string(), "Auto Stop at 48 frames");
    }
}
