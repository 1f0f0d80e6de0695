// Copyright (c) 2026 rezky_nightky

use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::Result;
use crate::snowfall::Snowfall;
use crate::surface::{Host, HostEvent};

/// Period of the timer used when the host has no refresh pacing.
pub const FALLBACK_INTERVAL: Duration = Duration::from_millis(100);
/// Resize updates are applied at most this often.
pub const RESIZE_THROTTLE: Duration = Duration::from_millis(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scheduler {
    /// Paced to the display refresh.
    Refresh { period: Duration },
    /// Plain fixed timer.
    Interval,
}

impl Scheduler {
    pub fn refresh(fps: f64) -> Self {
        Scheduler::Refresh {
            period: Duration::from_secs_f64(1.0 / fps),
        }
    }

    pub fn period(&self) -> Duration {
        match *self {
            Scheduler::Refresh { period } => period,
            Scheduler::Interval => FALLBACK_INTERVAL,
        }
    }
}

/// Terminals too slow to keep up with refresh pacing.
const TIMER_ONLY_TERMS: &[&str] = &["linux", "vt52", "vt100", "vt102", "vt220", "cons25"];

/// Refresh pacing unless it is switched off or the terminal cannot keep up.
pub fn preferred_scheduler(fps: f64, force_fallback: bool, term: &str) -> Scheduler {
    let term = term.to_ascii_lowercase();
    if force_fallback || TIMER_ONLY_TERMS.contains(&term.as_str()) {
        warn!("snowfall is falling back to 100ms animation intervals");
        return Scheduler::Interval;
    }
    Scheduler::refresh(fps)
}

/// Milliseconds between consecutive frames; zero for the first one.
#[derive(Clone, Debug, Default)]
pub struct FrameClock {
    last_run: Option<Instant>,
}

impl FrameClock {
    pub fn lap(&mut self, now: Instant) -> f64 {
        let last = self.last_run.replace(now).unwrap_or(now);
        now.saturating_duration_since(last).as_secs_f64() * 1000.0
    }
}

/// A running animation. Dropping it is the cancellation.
#[derive(Clone, Debug)]
pub struct Animation {
    scheduler: Scheduler,
    clock: FrameClock,
    next_frame: Instant,
}

impl Animation {
    pub fn start(scheduler: Scheduler, now: Instant) -> Self {
        Self {
            scheduler,
            clock: FrameClock::default(),
            next_frame: now,
        }
    }

    pub fn next_frame(&self) -> Instant {
        self.next_frame
    }

    /// Measures the frame at `now` and books the next one.
    pub fn begin_frame(&mut self, now: Instant) -> f64 {
        let elapsed = self.clock.lap(now);
        self.next_frame += self.scheduler.period();
        if self.next_frame < now {
            self.next_frame = now;
        }
        elapsed
    }
}

/// The first resize arms a timer; anything arriving before it fires is absorbed.
#[derive(Clone, Debug)]
pub struct ResizeThrottle {
    window: Duration,
    armed_at: Option<Instant>,
}

impl ResizeThrottle {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            armed_at: None,
        }
    }

    pub fn notify(&mut self, now: Instant) {
        if self.armed_at.is_none() {
            self.armed_at = Some(now);
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.armed_at.map(|t| t + self.window)
    }

    /// True once per armed timer, when its window has passed.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline() {
            Some(due) if now >= due => {
                self.armed_at = None;
                true
            }
            _ => false,
        }
    }
}

/// Drives `snow` until it is stopped or `until` passes.
pub fn run<H: Host>(
    host: &mut H,
    snow: &mut Snowfall<H::Surface>,
    until: Option<Instant>,
) -> Result<()> {
    let mut throttle = ResizeThrottle::new(RESIZE_THROTTLE);

    while snow.is_animating() {
        loop {
            let now = Instant::now();
            if until.is_some_and(|end| now >= end) {
                debug!("duration elapsed");
                snow.stop();
                break;
            }

            if throttle.fire(now) {
                let viewport = host.viewport()?;
                debug!(cols = viewport.cols, rows = viewport.rows, "applying resize");
                snow.resize(viewport);
            }

            let Some(due) = snow.next_frame() else {
                break;
            };
            if now >= due {
                break;
            }

            let mut timeout = due - now;
            if let Some(t) = throttle.deadline() {
                timeout = timeout.min(t.saturating_duration_since(now));
            }
            if let Some(end) = until {
                timeout = timeout.min(end.saturating_duration_since(now));
            }

            match host.poll_event(timeout)? {
                Some(HostEvent::Resize) => throttle.notify(Instant::now()),
                Some(HostEvent::Stop) => {
                    debug!("stop requested");
                    snow.stop();
                    break;
                }
                None => {}
            }
        }

        if !snow.is_animating() {
            break;
        }
        snow.frame(Instant::now())?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_lap_is_zero_then_measures_gaps() {
        let t0 = Instant::now();
        let mut clock = FrameClock::default();
        assert_eq!(clock.lap(t0), 0.0);
        let t1 = t0 + Duration::from_millis(16);
        assert!((clock.lap(t1) - 16.0).abs() < 1e-6);
        let t2 = t1 + Duration::from_millis(100);
        assert!((clock.lap(t2) - 100.0).abs() < 1e-6);
    }

    #[test]
    fn throttle_fires_once_per_window() {
        let t0 = Instant::now();
        let mut th = ResizeThrottle::new(RESIZE_THROTTLE);
        assert!(!th.fire(t0));

        th.notify(t0);
        th.notify(t0 + Duration::from_millis(40));
        th.notify(t0 + Duration::from_millis(90));
        assert_eq!(th.deadline(), Some(t0 + RESIZE_THROTTLE));
        assert!(!th.fire(t0 + Duration::from_millis(99)));
        assert!(th.fire(t0 + Duration::from_millis(100)));
        assert!(!th.fire(t0 + Duration::from_millis(250)));

        th.notify(t0 + Duration::from_millis(300));
        assert!(th.fire(t0 + Duration::from_millis(400)));
    }

    #[test]
    fn scheduler_periods() {
        assert_eq!(Scheduler::Interval.period(), Duration::from_millis(100));
        let p = Scheduler::refresh(50.0).period();
        assert!((p.as_secs_f64() - 0.02).abs() < 1e-9);
    }

    #[test]
    fn scheduler_falls_back_on_request_or_slow_terminals() {
        assert_eq!(preferred_scheduler(60.0, true, "xterm"), Scheduler::Interval);
        assert_eq!(preferred_scheduler(60.0, false, "VT100"), Scheduler::Interval);
        assert_eq!(
            preferred_scheduler(30.0, false, "xterm-256color"),
            Scheduler::refresh(30.0)
        );
    }

    #[test]
    fn animation_books_next_frame_and_catches_up() {
        let t0 = Instant::now();
        let mut anim = Animation::start(Scheduler::Interval, t0);
        assert_eq!(anim.next_frame(), t0);
        assert_eq!(anim.begin_frame(t0), 0.0);
        assert_eq!(anim.next_frame(), t0 + FALLBACK_INTERVAL);

        let late = t0 + Duration::from_millis(350);
        let elapsed = anim.begin_frame(late);
        assert!((elapsed - 350.0).abs() < 1e-6);
        assert_eq!(anim.next_frame(), late);
    }
}
