pub mod clock;
pub mod frame;

pub use clock::{AutoStop, Clock, ClockState, DisplaySink, ManualTimeSource, MonotonicTimeSource, Tick, TimeSource};
