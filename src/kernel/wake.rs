// Wake signaling between the tick ISR and the main loop
//
// The periodic timer ISR sets a flag and advances uptime; the main
// loop consumes the flag via try_wake() and dispatches due jobs.
// Uptime is kept in 10ms base ticks; TICK_WEIGHT compensates when
// the timer slows to 100ms while nothing is animating.
// Critical section guards riscv32imc (no atomic RMW).

use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};

pub const BASE_TICK_MS: u32 = 10;

static WAKE_TICK: AtomicBool = AtomicBool::new(false);

// 10ms base ticks per timer interrupt (1 or 10)
static TICK_WEIGHT: AtomicU32 = AtomicU32::new(1);

static UPTIME_TICKS: critical_section::Mutex<core::cell::Cell<u32>> =
    critical_section::Mutex::new(core::cell::Cell::new(0));

#[derive(Debug, Clone, Copy)]
pub struct WakeFlags {
    pub tick: bool,
}

#[inline]
pub fn signal_timer() {
    WAKE_TICK.store(true, Ordering::Release);
    let weight = TICK_WEIGHT.load(Ordering::Relaxed);
    critical_section::with(|cs| {
        let ticks = UPTIME_TICKS.borrow(cs);
        ticks.set(ticks.get().wrapping_add(weight));
    });
}

pub fn set_tick_weight(weight: u32) {
    TICK_WEIGHT.store(weight.max(1), Ordering::Release);
}

pub fn uptime_ticks() -> u32 {
    critical_section::with(|cs| UPTIME_TICKS.borrow(cs).get())
}

pub fn uptime_ms() -> u64 {
    uptime_ticks() as u64 * BASE_TICK_MS as u64
}

#[inline]
pub fn wait_for_interrupt() {
    #[cfg(target_arch = "riscv32")]
    unsafe {
        core::arch::asm!("wfi", options(nomem, nostack));
    }

    #[cfg(not(target_arch = "riscv32"))]
    core::hint::spin_loop();
}

pub fn try_wake() -> Option<WakeFlags> {
    critical_section::with(|_| {
        // no swap on riscv32imc
        if !WAKE_TICK.load(Ordering::Relaxed) {
            return None;
        }
        WAKE_TICK.store(false, Ordering::Relaxed);
        Some(WakeFlags { tick: true })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    // single test: the statics are process-wide
    #[test]
    fn test_tick_weight_scales_uptime() {
        let start = uptime_ticks();

        signal_timer();
        assert!(try_wake().is_some_and(|w| w.tick));
        assert!(try_wake().is_none());

        set_tick_weight(10);
        signal_timer();
        set_tick_weight(1);

        assert_eq!(uptime_ticks().wrapping_sub(start), 11);
        assert!(uptime_ms() >= 110);
    }
}
