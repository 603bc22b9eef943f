// Time-of-day sources
//
// WallClock: fixed base time plus uptime (no RTC battery on the board).
// ScriptedClock: demo mode; walks a table of scripted times, one reading
// per elapsed second, so minute changes can be exercised on the bench.

const SECS_PER_DAY: u32 = 24 * 60 * 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeOfDay {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
}

impl TimeOfDay {
    pub const fn new(hour: u8, minute: u8, second: u8) -> Self {
        Self {
            hour,
            minute,
            second,
        }
    }

    pub const fn from_secs(secs: u32) -> Self {
        let secs = secs % SECS_PER_DAY;
        Self {
            hour: (secs / 3600) as u8,
            minute: ((secs / 60) % 60) as u8,
            second: (secs % 60) as u8,
        }
    }

    pub const fn as_secs(self) -> u32 {
        self.hour as u32 * 3600 + self.minute as u32 * 60 + self.second as u32
    }
}

pub trait TimeSource {
    fn read(&mut self, uptime_ms: u64) -> TimeOfDay;
}

pub struct WallClock {
    base_secs: u32,
}

impl WallClock {
    pub const fn new(base: TimeOfDay) -> Self {
        Self {
            base_secs: base.as_secs(),
        }
    }
}

impl TimeSource for WallClock {
    fn read(&mut self, uptime_ms: u64) -> TimeOfDay {
        let elapsed = (uptime_ms / 1000 % SECS_PER_DAY as u64) as u32;
        TimeOfDay::from_secs(self.base_secs + elapsed)
    }
}

/// One scripted run: start at `start`, advance `step_secs` per reading for
/// `steps` readings, then hold the last time for `end_pause` readings.
#[derive(Debug, Clone, Copy)]
pub struct Script {
    pub start: TimeOfDay,
    pub step_secs: u32,
    pub steps: u16,
    pub end_pause: u16,
}

// 10:09 briefly, then 10:10 for ten minutes: exercises a single minute change
pub const DEMO_SCRIPT: [Script; 2] = [
    Script {
        start: TimeOfDay::new(10, 9, 0),
        step_secs: 0,
        steps: 0,
        end_pause: 5,
    },
    Script {
        start: TimeOfDay::new(10, 10, 0),
        step_secs: 0,
        steps: 0,
        end_pause: 600,
    },
];

pub struct ScriptedClock {
    scripts: &'static [Script],
    index: usize,
    step: u16,
    pause_left: u16,
    secs: u32,
    last_reading: Option<u64>,
}

impl ScriptedClock {
    pub const fn new(scripts: &'static [Script]) -> Self {
        Self {
            scripts,
            index: 0,
            step: 0,
            pause_left: 0,
            secs: 0,
            last_reading: None,
        }
    }

    pub const fn demo() -> Self {
        Self::new(&DEMO_SCRIPT)
    }

    // one scripted reading
    pub fn next_time(&mut self) -> TimeOfDay {
        let Some(&script) = self.scripts.get(self.index) else {
            return TimeOfDay::from_secs(self.secs);
        };

        if self.step > script.steps {
            if self.pause_left > 0 {
                self.pause_left -= 1;
                return TimeOfDay::from_secs(self.secs);
            }
            self.step = 0;
            self.index = (self.index + 1) % self.scripts.len();
        }

        let script = self.scripts[self.index];
        if self.step == 0 {
            self.secs = script.start.as_secs();
            self.pause_left = script.end_pause;
        } else {
            self.secs = (self.secs + script.step_secs) % SECS_PER_DAY;
        }
        self.step += 1;

        TimeOfDay::from_secs(self.secs)
    }
}

impl TimeSource for ScriptedClock {
    // advances once per elapsed second of uptime
    fn read(&mut self, uptime_ms: u64) -> TimeOfDay {
        let second = uptime_ms / 1000;
        if self.last_reading != Some(second) {
            self.last_reading = Some(second);
            return self.next_time();
        }
        TimeOfDay::from_secs(self.secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_clock_wraps_at_midnight() {
        let mut clock = WallClock::new(TimeOfDay::new(23, 59, 30));
        assert_eq!(clock.read(0), TimeOfDay::new(23, 59, 30));
        assert_eq!(clock.read(45_000), TimeOfDay::new(0, 0, 15));
    }

    #[test]
    fn test_demo_script_holds_then_moves_to_next_minute() {
        let mut clock = ScriptedClock::demo();

        // first reading plus five paused readings at 10:09
        for _ in 0..6 {
            assert_eq!(clock.next_time(), TimeOfDay::new(10, 9, 0));
        }
        assert_eq!(clock.next_time(), TimeOfDay::new(10, 10, 0));
    }

    #[test]
    fn test_stepping_script_advances_each_reading() {
        static STEPS: [Script; 1] = [Script {
            start: TimeOfDay::new(0, 0, 0),
            step_secs: 3660,
            steps: 2,
            end_pause: 0,
        }];
        let mut clock = ScriptedClock::new(&STEPS);

        assert_eq!(clock.next_time(), TimeOfDay::new(0, 0, 0));
        assert_eq!(clock.next_time(), TimeOfDay::new(1, 1, 0));
        assert_eq!(clock.next_time(), TimeOfDay::new(2, 2, 0));
        // wraps back to the start of the table
        assert_eq!(clock.next_time(), TimeOfDay::new(0, 0, 0));
    }

    #[test]
    fn test_scripted_read_advances_once_per_second() {
        let mut clock = ScriptedClock::demo();
        assert_eq!(clock.read(0), TimeOfDay::new(10, 9, 0));
        assert_eq!(clock.read(500), TimeOfDay::new(10, 9, 0));
        for s in 1..=5u64 {
            clock.read(s * 1000);
        }
        assert_eq!(clock.read(6_000), TimeOfDay::new(10, 10, 0));
    }
}
