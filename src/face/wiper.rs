// Wiper arm sweep
//
// The arm hangs from a bolt at the top of the screen and sweeps 180
// degrees between its two parked angles (270 left, 90 right; 0 is
// straight up). Three sweeps run back to back, each leaving a darker
// dithered shade behind the arm on the wipe rectangle: 50, 75, 100%.
// Shading is kept per scan line as a divider column plus a shade for
// each side of it.

use alloc::vec::Vec;

use embedded_graphics::{
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
};
use log::{debug, info};

use super::{FaceContext, Notify};
use crate::kernel::{Job, TimerError, TimerHandle};
use crate::ui::{SCREEN_W, Side, shade_span};

pub const LEFT_DEGREE: i32 = 270;
pub const RIGHT_DEGREE: i32 = 90;
pub const SWEEP_DEGREES: i32 = 180;
pub const STEP_DEGREES: i32 = 20;

pub const STEP_MS: u32 = 60;
pub const PASS_DONE_MS: u32 = STEP_MS * 3;

pub const SHADES: [u16; 3] = [50, 75, 100];

pub const BOLT_CENTER: Point = Point::new(71, 6);
const BOLT_DIAMETER: u32 = 12;
const BOLT_HOLE_DIAMETER: u32 = 3;
const ARM_LENGTH: f32 = 122.0;
const ARM_WIDTH: u32 = 3;

const WIDTH: i32 = SCREEN_W as i32;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineShade {
    pub divider: i16,
    pub left: u16,
    pub right: u16,
}

const fn opposite(angle: i32) -> i32 {
    if angle == LEFT_DEGREE {
        RIGHT_DEGREE
    } else {
        LEFT_DEGREE
    }
}

/// Column where the arm crosses screen row `y`. Parked angles and
/// off-screen crossings give -1 (left of the screen) or the screen width.
pub fn wiper_x(y: i32, angle: i32) -> i16 {
    if angle == LEFT_DEGREE {
        return -1;
    }
    if angle == RIGHT_DEGREE {
        return WIDTH as i16;
    }

    let rad = (angle as f32).to_radians();
    let length = ((y - BOLT_CENTER.y) as f32 / -libm::cosf(rad)) as i32;
    let x = (libm::sinf(rad) * length as f32) as i32 + BOLT_CENTER.x;

    if x < 0 {
        -1
    } else if x >= WIDTH {
        WIDTH as i16
    } else {
        x as i16
    }
}

fn arm_tip(angle: i32) -> Point {
    let rad = (angle as f32).to_radians();
    let dx = libm::roundf(libm::sinf(rad) * ARM_LENGTH) as i32;
    let dy = libm::roundf(-libm::cosf(rad) * ARM_LENGTH) as i32;
    BOLT_CENTER + Point::new(dx, dy)
}

fn arm_bounds(angle: i32) -> Rectangle {
    Rectangle::with_corners(BOLT_CENTER, arm_tip(angle)).offset(ARM_WIDTH as i32)
}

pub struct WiperLayer {
    wipe: Rectangle,
    angle: i32,
    pass: usize,
    remaining: i32,
    increment: i32,
    end_angle: i32,
    shades: Vec<LineShade>,
    on_done: Option<Notify>,
    timer: Option<TimerHandle>,
}

impl WiperLayer {
    /// Allocates one shade record per line of `wipe` (plus one). Returns
    /// None if the heap cannot hold them.
    pub fn new(wipe: Rectangle) -> Option<Self> {
        let lines = wipe.size.height as usize + 1;
        let mut shades = Vec::new();
        shades.try_reserve_exact(lines).ok()?;
        shades.resize(lines, LineShade::default());

        Some(Self {
            wipe,
            angle: LEFT_DEGREE,
            pass: 0,
            remaining: 0,
            increment: 0,
            end_angle: RIGHT_DEGREE,
            shades,
            on_done: None,
            timer: None,
        })
    }

    pub fn angle(&self) -> i32 {
        self.angle
    }

    pub fn pass(&self) -> usize {
        self.pass
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn shades(&self) -> &[LineShade] {
        &self.shades
    }

    pub fn run(&mut self, on_done: Option<Notify>, ctx: &mut FaceContext) -> Result<(), TimerError> {
        self.clear(ctx);

        self.on_done = on_done;
        self.increment = if self.angle == LEFT_DEGREE {
            -STEP_DEGREES
        } else {
            STEP_DEGREES
        };
        self.remaining = SWEEP_DEGREES;
        self.end_angle = opposite(self.angle);
        self.pass = 0;
        info!("[WIPER] sweep {} -> {}", self.angle, self.end_angle);

        self.schedule(STEP_MS, ctx)
    }

    /// Stop any sweep (parking the arm where it was headed) and wipe the
    /// shading. Safe to call at any time.
    pub fn clear(&mut self, ctx: &mut FaceContext) {
        if let Some(handle) = self.timer.take() {
            ctx.timers.cancel(handle);
            ctx.dirty.mark_rect(arm_bounds(self.angle));
            self.angle = self.end_angle;
            ctx.dirty.mark_rect(arm_bounds(self.angle));
            debug!("[WIPER] interrupted, parked at {}", self.angle);
        }

        self.shades.fill(LineShade::default());
        self.on_done = None;
        ctx.dirty.mark_rect(self.wipe);
    }

    // rotation tick
    pub fn on_step(&mut self, ctx: &mut FaceContext) -> Result<Option<Notify>, TimerError> {
        self.timer = None;
        let Some(&shade) = SHADES.get(self.pass) else {
            return Ok(None);
        };
        let moving_right = self.increment < 0;
        let old_arm = arm_bounds(self.angle);

        let mut pass_done = false;
        self.remaining -= self.increment.abs();
        if self.remaining > 0 {
            self.angle = (self.angle + self.increment).rem_euclid(360);
        } else {
            pass_done = true;
            self.angle = self.end_angle;
            self.pass += 1;
            if self.pass < SHADES.len() {
                self.increment = if self.angle == LEFT_DEGREE {
                    -STEP_DEGREES
                } else {
                    STEP_DEGREES
                };
                self.remaining = SWEEP_DEGREES;
                self.end_angle = opposite(self.angle);
            }
        }

        let top = self.wipe.top_left.y;
        for (line, rec) in self.shades.iter_mut().enumerate() {
            let x = wiper_x(top + line as i32, self.angle);
            rec.divider = x;
            if x < 0 {
                // arm moving right has not reached this line yet
                if !moving_right {
                    rec.right = shade;
                }
            } else if x as i32 >= WIDTH {
                if moving_right {
                    rec.left = shade;
                }
            } else if moving_right {
                rec.left = shade;
            } else {
                rec.right = shade;
            }
        }

        ctx.dirty.mark_rect(self.wipe);
        ctx.dirty.mark_rect(old_arm);
        ctx.dirty.mark_rect(arm_bounds(self.angle));

        if self.remaining > 0 {
            let delay = if pass_done { PASS_DONE_MS } else { STEP_MS };
            self.schedule(delay, ctx)?;
            return Ok(None);
        }

        info!("[WIPER] done, parked at {}", self.angle);
        Ok(self.on_done.take())
    }

    fn schedule(&mut self, delay_ms: u32, ctx: &mut FaceContext) -> Result<(), TimerError> {
        debug_assert!(self.timer.is_none(), "wiper step already pending");
        self.timer = Some(ctx.timers.schedule(delay_ms, Job::WiperStep)?);
        Ok(())
    }

    // shading only; drawn black over whatever is below
    pub fn draw_shading<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        let mut clipped = target.clipped(&self.wipe);
        let top = self.wipe.top_left.y;
        for (line, rec) in self.shades.iter().enumerate() {
            let y = top + line as i32;
            let divider = rec.divider as i32;
            if divider > 0 && rec.left != 0 {
                shade_span(
                    &mut clipped,
                    y,
                    line as u16,
                    0,
                    divider - 1,
                    Side::Left,
                    rec.left,
                    BinaryColor::Off,
                )?;
            }
            if divider < WIDTH - 1 && rec.right != 0 {
                shade_span(
                    &mut clipped,
                    y,
                    line as u16,
                    divider + 1,
                    WIDTH - 1,
                    Side::Right,
                    rec.right,
                    BinaryColor::Off,
                )?;
            }
        }
        Ok(())
    }

    // arm, then the bolt over its root
    pub fn draw_arm<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        Line::new(BOLT_CENTER, arm_tip(self.angle))
            .into_styled(PrimitiveStyle::with_stroke(BinaryColor::On, ARM_WIDTH))
            .draw(target)?;

        Circle::with_center(BOLT_CENTER, BOLT_DIAMETER)
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(target)?;
        Circle::with_center(BOLT_CENTER, BOLT_HOLE_DIAMETER)
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::Off))
            .draw(target)
    }

    pub fn draw<D>(&self, target: &mut D) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor>,
    {
        self.draw_shading(target)?;
        self.draw_arm(target)
    }
}
