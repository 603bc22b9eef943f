// Drives the whole face through its timer queue the way the main loop
// does, rendering into a real frame buffer after every wake.

use blockface::drivers::FrameBuffer;
use blockface::drivers::framebuffer::HEIGHT;
use blockface::face::{FaceSettings, TimeState, WatchFace};
use blockface::kernel::TimeOfDay;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::Rectangle;

fn settings(clock_24h: bool) -> FaceSettings {
    FaceSettings {
        clock_24h,
        seed: 7,
        ..FaceSettings::default()
    }
}

// run every deadline in order, repainting after each one; returns the
// time of the last job
fn settle(face: &mut WatchFace, fb: &mut FrameBuffer) -> u64 {
    let mut last = 0;
    while let Some(due) = face.next_deadline() {
        assert!(face.run_due(due) > 0);
        face.render_dirty(fb).unwrap();
        last = due;
    }
    last
}

fn lit_in(fb: &FrameBuffer, rect: Rectangle) -> usize {
    rect.points()
        .filter(|p| fb.pixel(p.x as u16, p.y as u16))
        .count()
}

fn assert_same_frame(a: &FrameBuffer, b: &FrameBuffer) {
    for y in 0..HEIGHT {
        assert_eq!(a.row(y), b.row(y), "row {} differs", y);
    }
}

#[test]
fn test_first_display_timeline_24h() {
    let mut face = WatchFace::new(&settings(true));
    let mut fb = FrameBuffer::new();

    face.update_time(0, TimeOfDay::new(20, 58, 0));
    assert_eq!(face.next_deadline(), Some(500));

    // 500 delay, 15 reveal ticks, two colon delays
    let end = settle(&mut face, &mut fb);
    assert_eq!(end, 500 + 15 * 75 + 350 + 350);
    assert!(!face.is_animating());
    assert_eq!(face.time_layer().state(), TimeState::ColonBottom);
    assert_eq!(face.time_layer().colon_visible(), (true, true));
    assert!(!face.time_layer().am_pm_visible());
}

#[test]
fn test_first_display_timeline_12h() {
    let mut face = WatchFace::new(&settings(false));
    let mut fb = FrameBuffer::new();

    face.update_time(0, TimeOfDay::new(21, 5, 0));
    let end = settle(&mut face, &mut fb);
    assert_eq!(end, 500 + 15 * 75 + 3 * 350);
    assert_eq!(face.time_layer().state(), TimeState::AmPm);
    assert!(face.time_layer().am_pm_visible());
    assert_eq!(face.time_layer().digits(), [None, Some(9), Some(0), Some(5)]);
}

#[test]
fn test_rendered_blocks_and_colon() {
    let mut face = WatchFace::new(&settings(true));
    let mut fb = FrameBuffer::new();
    face.update_time(0, TimeOfDay::new(20, 58, 0));
    settle(&mut face, &mut fb);

    // top-left block of every digit: 2, 0, 5 and 8 all light it
    for x in [5, 37, 80, 112] {
        assert_eq!(lit_in(&fb, Rectangle::new(Point::new(x, 62), Size::new(9, 9))), 81);
    }
    // centre block of 0 stays dark
    assert_eq!(lit_in(&fb, Rectangle::new(Point::new(46, 80), Size::new(9, 9))), 0);

    let dot = Size::new(6, 6);
    assert_eq!(lit_in(&fb, Rectangle::new(Point::new(69, 73), dot)), 36);
    assert_eq!(lit_in(&fb, Rectangle::new(Point::new(69, 89), dot)), 36);
}

#[test]
fn test_incremental_render_matches_full_render() {
    let mut face = WatchFace::new(&settings(false));
    let mut fb = FrameBuffer::new();

    face.update_time(0, TimeOfDay::new(11, 59, 0));
    let end = settle(&mut face, &mut fb);

    // crossing into PM sweeps, then rebuilds every digit
    face.update_time(end + 1000, TimeOfDay::new(12, 0, 0));
    assert_eq!(face.time_layer().state(), TimeState::Wiper);
    settle(&mut face, &mut fb);
    assert_eq!(face.time_layer().digits(), [Some(1), Some(2), Some(0), Some(0)]);

    let mut full = FrameBuffer::new();
    face.render(&mut full).unwrap();
    assert_same_frame(&fb, &full);
}

#[test]
fn test_minute_change_timeline() {
    let mut face = WatchFace::new(&settings(true));
    let mut fb = FrameBuffer::new();
    face.update_time(0, TimeOfDay::new(8, 15, 0));
    let first = settle(&mut face, &mut fb);

    let start = first + 10_000;
    // a new second in the same minute starts nothing
    face.update_time(start - 500, TimeOfDay::new(8, 15, 59));
    assert!(!face.is_animating());

    face.update_time(start, TimeOfDay::new(8, 16, 0));
    assert!(face.is_animating());

    // the old digits stay up for the whole sweep
    let mut steps = 0;
    while face.time_layer().state() == TimeState::Wiper {
        let due = face.next_deadline().unwrap();
        face.run_due(due);
        face.render_dirty(&mut fb).unwrap();
        steps += 1;
        if face.time_layer().state() == TimeState::Wiper {
            assert!(face.time_layer().digit_layer(3).unwrap().visible_cells() > 0);
        }
    }
    assert_eq!(steps, 27);

    let end = settle(&mut face, &mut fb);
    // 27 steps with two longer pass breaks, then reveal and colon
    let sweep = 60 + 24 * 60 + 2 * 180;
    assert_eq!(end, start + sweep + 15 * 75 + 350 + 350);
    assert!(!face.is_animating());
}

#[test]
fn test_nothing_to_repaint_when_idle() {
    let mut face = WatchFace::new(&settings(true));
    let mut fb = FrameBuffer::new();
    face.update_time(0, TimeOfDay::new(1, 2, 0));
    settle(&mut face, &mut fb);

    assert!(!face.has_redraw());
    assert_eq!(face.render_dirty(&mut fb).unwrap(), None);
}

#[test]
fn test_minute_change_mid_sweep_sweeps_in_full() {
    let mut face = WatchFace::new(&settings(true));
    let mut fb = FrameBuffer::new();
    face.update_time(0, TimeOfDay::new(6, 40, 0));
    let first = settle(&mut face, &mut fb);

    face.update_time(first + 1000, TimeOfDay::new(6, 41, 0));
    for _ in 0..10 {
        let due = face.next_deadline().unwrap();
        face.run_due(due);
    }
    assert!(face.time_layer().wiper().unwrap().is_running());

    let restart = first + 60_000;
    face.update_time(restart, TimeOfDay::new(6, 42, 0));
    let mut steps = 0;
    while face.time_layer().state() == TimeState::Wiper {
        let due = face.next_deadline().unwrap();
        face.run_due(due);
        face.render_dirty(&mut fb).unwrap();
        steps += 1;
    }
    assert_eq!(steps, 27);

    settle(&mut face, &mut fb);
    assert_eq!(face.time_layer().digits(), [Some(0), Some(6), Some(4), Some(2)]);

    let mut full = FrameBuffer::new();
    face.render(&mut full).unwrap();
    assert_same_frame(&fb, &full);
}
