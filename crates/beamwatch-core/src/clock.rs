//! Display-refresh scheduling.
//!
//! A [`FrameClock`] stands in for the host's "run this on the next display
//! refresh" primitive. Interested parties register once and are then
//! handed a due tick per refresh period until they cancel. Missed
//! refreshes are not replayed: a late consumer gets one tick and the next
//! one is scheduled a full period later.

use std::time::{Duration, Instant};

/// Identifies one tick registration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

pub trait FrameClock {
    /// Start delivering ticks for a new registration.
    fn register(&mut self) -> TickHandle;

    /// Stop delivering ticks for `handle`. Pending ticks are dropped.
    fn cancel(&mut self, handle: TickHandle);

    /// A registration whose tick is due at or before `now`, if any.
    ///
    /// Each registration is returned at most once per distinct `now`.
    fn next_due(&mut self, now: Duration) -> Option<TickHandle>;

    /// Monotonic time since the clock was created.
    fn now(&self) -> Duration;

    /// Number of live registrations.
    fn registrations(&self) -> usize;
}

#[derive(Clone, Debug)]
struct Registration {
    handle: TickHandle,
    due: Duration,
}

/// Registration bookkeeping shared by both clocks.
#[derive(Clone, Debug)]
struct Schedule {
    period: Duration,
    next_id: u64,
    entries: Vec<Registration>,
}

impl Schedule {
    fn new(period: Duration) -> Self {
        Self {
            period: period.max(Duration::from_nanos(1)),
            next_id: 0,
            entries: Vec::new(),
        }
    }

    fn register(&mut self, now: Duration) -> TickHandle {
        let handle = TickHandle(self.next_id);
        self.next_id += 1;
        self.entries.push(Registration {
            handle,
            due: now + self.period,
        });
        handle
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.entries.retain(|r| r.handle != handle);
    }

    fn next_due(&mut self, now: Duration) -> Option<TickHandle> {
        let period = self.period;
        let entry = self
            .entries
            .iter_mut()
            .filter(|r| r.due <= now)
            .min_by_key(|r| r.due)?;
        entry.due += period;
        if entry.due <= now {
            entry.due = now + period;
        }
        Some(entry.handle)
    }

    fn earliest_due(&self) -> Option<Duration> {
        self.entries.iter().map(|r| r.due).min()
    }
}

/// Clock whose time only moves when told to. Used for tests and for
/// replaying recordings as fast as possible.
#[derive(Clone, Debug)]
pub struct ManualClock {
    now: Duration,
    schedule: Schedule,
}

impl ManualClock {
    pub fn new(period: Duration) -> Self {
        Self {
            now: Duration::ZERO,
            schedule: Schedule::new(period),
        }
    }

    pub fn from_hz(hz: f64) -> Self {
        Self::new(period_from_hz(hz))
    }

    pub fn period(&self) -> Duration {
        self.schedule.period
    }

    pub fn advance(&mut self, dt: Duration) {
        self.now += dt;
    }

    /// Advance by exactly one refresh period.
    pub fn step(&mut self) {
        self.now += self.schedule.period;
    }
}

impl FrameClock for ManualClock {
    fn register(&mut self) -> TickHandle {
        self.schedule.register(self.now)
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.schedule.cancel(handle);
    }

    fn next_due(&mut self, now: Duration) -> Option<TickHandle> {
        self.schedule.next_due(now)
    }

    fn now(&self) -> Duration {
        self.now
    }

    fn registrations(&self) -> usize {
        self.schedule.entries.len()
    }
}

/// Wall-clock refresh at a fixed rate.
#[derive(Clone, Debug)]
pub struct IntervalClock {
    origin: Instant,
    schedule: Schedule,
}

impl IntervalClock {
    pub fn new(period: Duration) -> Self {
        Self {
            origin: Instant::now(),
            schedule: Schedule::new(period),
        }
    }

    pub fn from_hz(hz: f64) -> Self {
        Self::new(period_from_hz(hz))
    }

    /// Sleep until the earliest registration is due (or one period if none).
    pub fn wait(&self) {
        let now = self.now();
        let due = self
            .schedule
            .earliest_due()
            .unwrap_or(now + self.schedule.period);
        if let Some(remaining) = due.checked_sub(now) {
            std::thread::sleep(remaining);
        }
    }
}

impl FrameClock for IntervalClock {
    fn register(&mut self) -> TickHandle {
        let now = self.now();
        self.schedule.register(now)
    }

    fn cancel(&mut self, handle: TickHandle) {
        self.schedule.cancel(handle);
    }

    fn next_due(&mut self, now: Duration) -> Option<TickHandle> {
        self.schedule.next_due(now)
    }

    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn registrations(&self) -> usize {
        self.schedule.entries.len()
    }
}

fn period_from_hz(hz: f64) -> Duration {
    if hz.is_finite() && hz > 0.0 {
        Duration::from_secs_f64(1.0 / hz)
    } else {
        Duration::from_secs_f64(1.0 / crate::consts::DEFAULT_REFRESH_HZ)
    }
}
