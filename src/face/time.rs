// Time display sequencer
//
// Each new minute plays: wiper sweep -> digits -> colon top -> colon
// bottom -> AM/PM (12h only). A minute change during the sequence
// cancels it: a pending phase delay restarts after 10ms, a running sweep
// or reveal starts a fresh sweep.

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{PrimitiveStyle, Rectangle},
};
use log::{debug, info, warn};

use super::digit::DigitLayer;
use super::wiper::WiperLayer;
use super::{FaceContext, Notify, WIPE_RECT};
use crate::kernel::{Job, TimerError, TimerHandle};
use crate::ui::{ImageId, Layer, bitmap_rect_from_rot_rect, draw_image, rot_rect_from_bitmap_rect};

pub const COLON_MS: u32 = 350;
pub const FIRST_DISPLAY_MS: u32 = 500;
pub const RESTART_MS: u32 = 10;

pub const DIGIT_ORIGINS: [Point; 4] = [
    Point::new(5, 62),
    Point::new(37, 62),
    Point::new(80, 62),
    Point::new(112, 62),
];

const COLON_TOP: Rectangle = Rectangle::new(Point::new(69, 73), Size::new(6, 6));
const COLON_BOTTOM: Rectangle = Rectangle::new(Point::new(69, 89), Size::new(6, 6));
const AM_PM_RECT: Rectangle = Rectangle::new(Point::new(18, 43), Size::new(14, 9));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeState {
    Wiper,
    Digits,
    ColonTop,
    ColonBottom,
    AmPm,
}

// 12h clocks show 12 for midnight and noon
const fn display_hour(hour: u8, clock_24h: bool) -> u8 {
    if clock_24h {
        return hour;
    }
    match hour % 12 {
        0 => 12,
        h => h,
    }
}

/// The four digit values for `hour:minute`; a 12h tens digit below 10 is absent.
pub fn time_digits(hour: u8, minute: u8, clock_24h: bool) -> [Option<u8>; 4] {
    let h = display_hour(hour, clock_24h);
    let tens = if clock_24h || h >= 10 { Some(h / 10) } else { None };
    [tens, Some(h % 10), Some(minute / 10), Some(minute % 10)]
}

pub struct TimeLayer {
    clock_24h: bool,
    state: TimeState,
    last_minute: Option<u8>,
    digits: [Option<u8>; 4],
    digit_layers: [DigitLayer; 4],
    wiper: Option<WiperLayer>,
    colon_top: Layer,
    colon_bottom: Layer,
    am_pm: Layer,
    am_pm_image: ImageId,
    timer: Option<TimerHandle>,
}

impl TimeLayer {
    pub fn new(clock_24h: bool) -> Self {
        let wiper = WiperLayer::new(WIPE_RECT);
        if wiper.is_none() {
            warn!("[TIME] no heap for wiper, sweeping disabled");
        }

        let mut colon_top = Layer::new();
        colon_top.set_frame(COLON_TOP);
        let mut colon_bottom = Layer::new();
        colon_bottom.set_frame(COLON_BOTTOM);
        let mut am_pm = Layer::new();
        am_pm.set_frame(rot_rect_from_bitmap_rect(ImageId::Am, AM_PM_RECT));

        Self {
            clock_24h,
            state: TimeState::Wiper,
            last_minute: None,
            digits: [None; 4],
            digit_layers: core::array::from_fn(|i| DigitLayer::new(i as u8, DIGIT_ORIGINS[i])),
            wiper,
            colon_top,
            colon_bottom,
            am_pm,
            am_pm_image: ImageId::Am,
            timer: None,
        }
    }

    // as if the shading buffer could not be allocated
    #[cfg(test)]
    fn without_wiper(clock_24h: bool) -> Self {
        Self {
            wiper: None,
            ..Self::new(clock_24h)
        }
    }

    pub fn state(&self) -> TimeState {
        self.state
    }

    pub fn digits(&self) -> [Option<u8>; 4] {
        self.digits
    }

    pub fn am_pm_image(&self) -> ImageId {
        self.am_pm_image
    }

    pub fn digit_layer(&self, slot: usize) -> Option<&DigitLayer> {
        self.digit_layers.get(slot)
    }

    pub fn wiper(&self) -> Option<&WiperLayer> {
        self.wiper.as_ref()
    }

    pub fn colon_visible(&self) -> (bool, bool) {
        (!self.colon_top.is_hidden(), !self.colon_bottom.is_hidden())
    }

    pub fn am_pm_visible(&self) -> bool {
        !self.am_pm.is_hidden()
    }

    pub fn is_animating(&self) -> bool {
        self.timer.is_some()
            || self.wiper.as_ref().is_some_and(WiperLayer::is_running)
            || self.digit_layers.iter().any(DigitLayer::is_revealing)
    }

    pub fn draw_time(&mut self, hour: u8, minute: u8, ctx: &mut FaceContext) -> Result<(), TimerError> {
        if self.last_minute == Some(minute) {
            return Ok(());
        }
        let first_display = self.last_minute.is_none();
        self.last_minute = Some(minute);

        // a pending phase delay restarts through the timer; a running sweep
        // or reveal is torn down and the new minute sweeps from scratch
        let interrupted = match self.timer.take() {
            Some(handle) => {
                ctx.timers.cancel(handle);
                true
            }
            None => false,
        };
        if interrupted || self.is_animating() {
            debug!("[TIME] sequence interrupted in {:?}", self.state);
            self.clear_time(ctx);
        }

        self.digits = time_digits(hour, minute, self.clock_24h);
        if !self.clock_24h {
            let image = if hour < 12 { ImageId::Am } else { ImageId::Pm };
            if image != self.am_pm_image {
                self.am_pm_image = image;
                if !self.am_pm.is_hidden() {
                    ctx.dirty.mark_rect(self.am_pm.frame());
                }
            }
        }
        info!("[TIME] {:02}:{:02} -> {:?}", hour, minute, self.digits);

        self.state = TimeState::Wiper;
        if first_display || interrupted {
            let delay = if first_display { FIRST_DISPLAY_MS } else { RESTART_MS };
            return self.schedule(delay, ctx);
        }

        match self.wiper.as_mut() {
            Some(wiper) => wiper.run(Some(Notify::WiperDone), ctx),
            // nothing to sweep with; go straight to the digits
            None => self.next_state(ctx),
        }
    }

    pub fn dispatch(&mut self, job: Job, ctx: &mut FaceContext) -> Result<(), TimerError> {
        let notify = match job {
            Job::DigitSpot { slot } => match self.digit_layers.get_mut(slot as usize) {
                Some(layer) => layer.on_spot(ctx)?,
                None => None,
            },
            Job::WiperStep => match self.wiper.as_mut() {
                Some(wiper) => wiper.on_step(ctx)?,
                None => None,
            },
            Job::TimeStep => {
                self.timer = None;
                return self.next_state(ctx);
            }
        };

        match notify {
            Some(Notify::WiperDone) => self.next_state(ctx),
            Some(Notify::DigitsDone) => self.schedule(COLON_MS, ctx),
            None => Ok(()),
        }
    }

    fn next_state(&mut self, ctx: &mut FaceContext) -> Result<(), TimerError> {
        match self.state {
            TimeState::Wiper => {
                self.state = TimeState::Digits;
                self.clear_time(ctx);

                // only the first present digit reports back
                let mut on_done = Some(Notify::DigitsDone);
                for (layer, digit) in self.digit_layers.iter_mut().zip(self.digits) {
                    if let Some(d) = digit {
                        layer.construct(d, on_done.take(), ctx)?;
                    }
                }
            }
            TimeState::Digits => {
                self.state = TimeState::ColonTop;
                self.colon_top.set_hidden(false);
                ctx.dirty.mark_rect(COLON_TOP);
                self.schedule(COLON_MS, ctx)?;
            }
            TimeState::ColonTop => {
                self.state = TimeState::ColonBottom;
                self.colon_bottom.set_hidden(false);
                ctx.dirty.mark_rect(COLON_BOTTOM);
                if !self.clock_24h {
                    self.schedule(COLON_MS, ctx)?;
                }
            }
            TimeState::ColonBottom => {
                self.state = TimeState::AmPm;
                self.am_pm.set_hidden(false);
                ctx.dirty.mark_rect(self.am_pm.frame());
            }
            TimeState::AmPm => {}
        }
        debug!("[TIME] -> {:?}", self.state);
        Ok(())
    }

    fn clear_time(&mut self, ctx: &mut FaceContext) {
        for layer in self.digit_layers.iter_mut() {
            let _ = layer.deconstruct(None, ctx);
        }
        for layer in [&mut self.colon_top, &mut self.colon_bottom, &mut self.am_pm] {
            if !layer.is_hidden() {
                layer.set_hidden(true);
                ctx.dirty.mark_rect(layer.frame());
            }
        }
        if let Some(wiper) = self.wiper.as_mut() {
            wiper.clear(ctx);
        }
    }

    fn schedule(&mut self, delay_ms: u32, ctx: &mut FaceContext) -> Result<(), TimerError> {
        debug_assert!(self.timer.is_none(), "time step already pending");
        self.timer = Some(ctx.timers.schedule(delay_ms, Job::TimeStep)?);
        Ok(())
    }

    // colon, digits, AM/PM, then the wiper on top
    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let fill = PrimitiveStyle::with_fill(BinaryColor::On);
        // the bottom dot only ever shows under the top one
        if !self.colon_top.is_hidden() {
            self.colon_top.frame().into_styled(fill).draw(target)?;
            if !self.colon_bottom.is_hidden() {
                self.colon_bottom.frame().into_styled(fill).draw(target)?;
            }
        }

        for layer in &self.digit_layers {
            layer.draw(target)?;
        }

        if !self.am_pm.is_hidden() {
            let bitmap = bitmap_rect_from_rot_rect(self.am_pm_image, self.am_pm.frame());
            draw_image(target, self.am_pm_image, bitmap.top_left)?;
        }

        if let Some(wiper) = &self.wiper {
            wiper.draw(target)?;
        }
        Ok(())
    }
}
