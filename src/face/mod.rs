// Watch face root: context, job dispatch and rendering.
//
// FaceContext is what every sequencer touches on a step: the timer
// queue, the dirty-region accumulator and the RNG. WatchFace owns it
// together with the time layer and is the only thing the main loop
// talks to.

pub mod digit;
pub mod settings;
pub mod time;
pub mod wiper;

use embedded_graphics::{pixelcolor::BinaryColor, prelude::*, primitives::Rectangle};
use log::{error, info};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use crate::kernel::{TimeOfDay, TimerQueue};
use crate::ui::{DirtyTracker, Redraw, Region, SCREEN_W};

pub use settings::{FaceSettings, SettingsError, parse_settings_txt, write_settings_txt};
pub use time::{TimeLayer, TimeState};

// 4 digit ticks + wiper step + time step, with headroom
pub const TIMER_SLOTS: usize = 8;

// rows 43..107, from the AM/PM icon down past the digits
pub const WIPE_RECT: Rectangle = Rectangle::new(Point::new(0, 43), Size::new(SCREEN_W as u32, 64));

/// Completion handed back by a sequencer step; the owner acts on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notify {
    WiperDone,
    DigitsDone,
}

pub struct FaceContext {
    pub timers: TimerQueue<TIMER_SLOTS>,
    pub dirty: DirtyTracker,
    pub rng: SmallRng,
}

impl FaceContext {
    pub fn new(seed: u32) -> Self {
        Self {
            timers: TimerQueue::new(),
            dirty: DirtyTracker::new(),
            rng: SmallRng::seed_from_u64(seed as u64),
        }
    }
}

pub struct WatchFace {
    ctx: FaceContext,
    time: TimeLayer,
}

impl WatchFace {
    pub fn new(settings: &FaceSettings) -> Self {
        let mut ctx = FaceContext::new(settings.seed);
        ctx.dirty.request_full_redraw();
        info!(
            "[FACE] {} clock, seed {}",
            if settings.clock_24h { "24h" } else { "12h" },
            settings.seed
        );
        Self {
            ctx,
            time: TimeLayer::new(settings.clock_24h),
        }
    }

    pub fn time_layer(&self) -> &TimeLayer {
        &self.time
    }

    /// Feed the current time. Only a new minute starts anything.
    pub fn update_time(&mut self, now_ms: u64, time: TimeOfDay) {
        self.ctx.timers.advance_to(now_ms);
        if let Err(e) = self.time.draw_time(time.hour, time.minute, &mut self.ctx) {
            error!("[FACE] draw_time: {}", e);
        }
    }

    /// Dispatch every job due at `now_ms`. Returns how many ran.
    pub fn run_due(&mut self, now_ms: u64) -> usize {
        let mut ran = 0;
        while let Some(job) = self.ctx.timers.pop_due(now_ms) {
            ran += 1;
            if let Err(e) = self.time.dispatch(job, &mut self.ctx) {
                error!("[FACE] {} failed: {}", job, e);
            }
        }
        ran
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.ctx.timers.next_deadline()
    }

    pub fn is_animating(&self) -> bool {
        !self.ctx.timers.is_empty()
    }

    pub fn has_redraw(&self) -> bool {
        self.ctx.dirty.has_redraw()
    }

    pub fn take_redraw(&mut self) -> Redraw {
        self.ctx.dirty.take_redraw()
    }

    /// Paint the whole face over a black background.
    pub fn render<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        target.clear(BinaryColor::Off)?;
        self.time.draw(target)
    }

    /// Repaint only what changed since the last call. Returns the painted
    /// region, or None if nothing was dirty.
    pub fn render_dirty<D>(&mut self, target: &mut D) -> Result<Option<Region>, D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let region = match self.take_redraw() {
            Redraw::None => return Ok(None),
            Redraw::Full => Region::screen(),
            Redraw::Partial(r) => r,
        };
        let mut clipped = target.clipped(&region.to_rect());
        self.render(&mut clipped)?;
        Ok(Some(region))
    }
}
