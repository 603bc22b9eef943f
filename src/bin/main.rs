// blockface entry point and main loop
//
// Boot sequence: timer -> hardware -> settings -> face
// Main loop: WFI -> read time -> dispatch due face jobs -> render dirty
// region -> flush dirty lines -> repeat
//
// Timer runs at 10ms while the face has jobs queued and drops to 100ms
// once it is idle; a new minute (or any queued job) snaps it back.

#![no_std]
#![no_main]

use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::time::Duration;
use esp_hal::timer::PeriodicTimer;
use esp_hal::timer::timg::TimerGroup;
use log::{info, warn};

use core::cell::RefCell;
use critical_section::Mutex;

use blockface::board::Board;
use blockface::drivers::FrameBuffer;
use blockface::face::{WatchFace, parse_settings_txt};
use blockface::kernel::wake::{self, signal_timer, try_wake};
use blockface::kernel::{ScriptedClock, TimeSource, WallClock};

extern crate alloc;

esp_bootloader_esp_idf::esp_app_desc!();

const ACTIVE_TIMER_MS: u64 = 10;
const IDLE_TIMER_MS: u64 = 100;

const VCOM_INTERVAL_MS: u64 = 1000;

// baked in at build time: BLOCKFACE_SETTINGS="clock_24h=0\nstart_time=09:30"
const SETTINGS_TXT: &str = match option_env!("BLOCKFACE_SETTINGS") {
    Some(s) => s,
    None => "",
};

static TIMER0: Mutex<RefCell<Option<PeriodicTimer<'static, esp_hal::Blocking>>>> =
    Mutex::new(RefCell::new(None));

#[esp_hal::handler(priority = esp_hal::interrupt::Priority::Priority1)]
fn timer0_handler() {
    critical_section::with(|cs| {
        if let Some(timer) = TIMER0.borrow_ref_mut(cs).as_mut() {
            timer.clear_interrupt();
        }
    });
    signal_timer();
}

fn set_timer_period(ms: u64) {
    wake::set_tick_weight((ms / wake::BASE_TICK_MS as u64) as u32);
    critical_section::with(|cs| {
        if let Some(timer) = TIMER0.borrow_ref_mut(cs).as_mut() {
            let _ = timer.start(Duration::from_millis(ms));
        }
    });
}

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);
    // wiper shading buffer is the only heap user
    esp_alloc::heap_allocator!(size: 16 * 1024);

    info!("booting...");

    let timg0 = TimerGroup::new(unsafe { peripherals.TIMG0.clone_unchecked() });
    let mut timer0 = PeriodicTimer::new(timg0.timer0);
    critical_section::with(|cs| {
        timer0.set_interrupt_handler(timer0_handler);
        timer0.start(Duration::from_millis(ACTIVE_TIMER_MS)).unwrap();
        timer0.listen();
        TIMER0.borrow_ref_mut(cs).replace(timer0);
    });
    info!("timer initialized.");

    let mut board = Board::init(peripherals);
    let mut delay = Delay::new();
    if let Err(e) = board.display.lcd.clear(&mut delay) {
        warn!("lcd clear: {}", e);
    }
    board.display.enable();
    info!("hardware initialized.");

    let settings = parse_settings_txt(SETTINGS_TXT.as_bytes());
    let mut wall = WallClock::new(settings.start_time);
    let mut scripted = ScriptedClock::demo();
    let clock: &mut dyn TimeSource = if settings.demo {
        info!("time: scripted demo");
        &mut scripted
    } else {
        &mut wall
    };

    let mut fb = FrameBuffer::new();
    let mut face = WatchFace::new(&settings);
    let mut timer_is_slow = false;
    let mut last_vcom_ms: u64 = 0;
    info!("face ready.");

    loop {
        if try_wake().is_none() {
            wake::wait_for_interrupt();
            continue;
        }

        let now = wake::uptime_ms();
        face.update_time(now, clock.read(now));
        face.run_due(now);

        if face.has_redraw() {
            let _ = face.render_dirty(&mut fb);
            match board.display.lcd.flush(&mut fb, &mut delay) {
                Ok(lines) if lines > 0 => log::debug!("lcd: {} lines", lines),
                Ok(_) => {}
                Err(e) => warn!("lcd flush: {}", e),
            }
        }

        if now.wrapping_sub(last_vcom_ms) >= VCOM_INTERVAL_MS {
            last_vcom_ms = now;
            if let Err(e) = board.display.lcd.toggle_vcom(&mut delay) {
                warn!("lcd vcom: {}", e);
            }
        }

        let idle = !face.is_animating();
        if idle != timer_is_slow {
            timer_is_slow = idle;
            let ms = if idle { IDLE_TIMER_MS } else { ACTIVE_TIMER_MS };
            set_timer_period(ms);
            info!("timer: {}ms ({})", ms, if idle { "idle" } else { "active" });
        }
    }
}
