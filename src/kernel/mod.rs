// Cooperative timer queue, wake flags and time sources
// Single core, no preemption. Every animation step runs from
// TimerQueue dispatch on the main loop; WFI idles the CPU between ticks.

pub mod clock;
pub mod timer;
pub mod wake;

pub use clock::{ScriptedClock, TimeOfDay, TimeSource, WallClock};
pub use timer::{Job, TimerError, TimerHandle, TimerQueue};
