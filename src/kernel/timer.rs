// One-shot timer queue for cooperative animation
// NOTE: No dynamic allocation; fixed slot table, one entry per pending job.
// Handles carry a generation id so a fired or cancelled handle can't
// cancel whatever later reuses its slot.
use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    // reveal tick for one digit slot
    DigitSpot { slot: u8 },
    // wiper rotation step
    WiperStep,
    // time layer phase advance
    TimeStep,
}

impl fmt::Display for Job {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Job::DigitSpot { slot } => write!(f, "DigitSpot({})", slot),
            Job::WiperStep => write!(f, "WiperStep"),
            Job::TimeStep => write!(f, "TimeStep"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerError {
    /// Every slot is taken, contains the rejected job
    Full(Job),
}

impl fmt::Display for TimerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimerError::Full(job) => write!(f, "timer queue full, rejected {}", job),
        }
    }
}

/// Cancellable reference to a scheduled job. Invalid once fired or cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle {
    slot: u8,
    generation: u16,
}

#[derive(Debug, Clone, Copy)]
struct Entry {
    due: u64,
    // FIFO order among equal deadlines
    seq: u32,
    generation: u16,
    job: Job,
}

pub struct TimerQueue<const N: usize> {
    slots: [Option<Entry>; N],
    generation: u16,
    seq: u32,
    now: u64,
}

impl<const N: usize> TimerQueue<N> {
    pub const fn new() -> Self {
        Self {
            slots: [None; N],
            generation: 0,
            seq: 0,
            now: 0,
        }
    }

    // register `job` to fire `delay_ms` after the current time
    pub fn schedule(&mut self, delay_ms: u32, job: Job) -> Result<TimerHandle, TimerError> {
        let Some(slot) = self.slots.iter().position(Option::is_none) else {
            return Err(TimerError::Full(job));
        };

        self.generation = self.generation.wrapping_add(1);
        self.seq = self.seq.wrapping_add(1);
        self.slots[slot] = Some(Entry {
            due: self.now + delay_ms as u64,
            seq: self.seq,
            generation: self.generation,
            job,
        });

        Ok(TimerHandle {
            slot: slot as u8,
            generation: self.generation,
        })
    }

    // returns false (and does nothing) if the handle already fired or was cancelled
    pub fn cancel(&mut self, handle: TimerHandle) -> bool {
        let Some(slot) = self.slots.get_mut(handle.slot as usize) else {
            return false;
        };
        if matches!(slot, Some(e) if e.generation == handle.generation) {
            *slot = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        matches!(
            self.slots.get(handle.slot as usize),
            Some(Some(e)) if e.generation == handle.generation
        )
    }

    // the clock never runs backwards
    pub fn advance_to(&mut self, now: u64) {
        if now > self.now {
            self.now = now;
        }
    }

    // advance the clock to `now` and take the earliest job due at or before it
    pub fn pop_due(&mut self, now: u64) -> Option<Job> {
        self.advance_to(now);

        let idx = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| s.map(|e| (i, e)))
            .filter(|(_, e)| e.due <= self.now)
            .min_by_key(|(_, e)| (e.due, e.seq))
            .map(|(i, _)| i)?;

        self.slots[idx].take().map(|e| e.job)
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.slots.iter().flatten().map(|e| e.due).min()
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    pub fn is_empty(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    pub fn pending(&self) -> usize {
        self.slots.iter().flatten().count()
    }
}

impl<const N: usize> Default for TimerQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
