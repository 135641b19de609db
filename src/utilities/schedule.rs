use std::time::{Duration, Instant};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// A periodic schedule held as a plain field by whoever drives it.
///
/// Nothing fires on its own: the event loop calls [`Interval::fire_if_due`]
/// with the current time and acts on `true`. Re-arming always drops the
/// previous deadline first, so a stale schedule can never fire.
#[derive(Debug, Clone, Default)]
pub struct Interval {
    period: Duration,
    next_due: Option<Instant>,
}

impl Interval {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, period: Duration, first_due: Instant) {
        self.cancel_if_scheduled();
        self.period = period.max(MIN_PERIOD);
        self.next_due = Some(first_due);
    }

    /// Returns whether a schedule was actually cancelled.
    pub fn cancel_if_scheduled(&mut self) -> bool {
        self.next_due.take().is_some()
    }

    pub fn is_scheduled(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn period(&self) -> Option<Duration> {
        self.next_due.map(|_| self.period)
    }

    pub fn next_due(&self) -> Option<Instant> {
        self.next_due
    }

    /// Fires at most once per call. When the caller polled late, the next
    /// deadline snaps to the first period boundary after `now` instead of
    /// replaying every missed period.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        let Some(due) = self.next_due else {
            return false;
        };
        if now < due {
            return false;
        }

        let behind = now.duration_since(due).as_nanos();
        let period = self.period.as_nanos();
        let into_period = (behind % period) as u64;
        self.next_due = Some(now + self.period - Duration::from_nanos(into_period));
        true
    }
}

/// Coalesces bursts of values into a single commit once `delay` has
/// passed without a newer value.
pub struct Debouncer<T, F> {
    delay: Duration,
    pending: Option<(T, Instant)>,
    commit: F,
}

impl<T, R, F> Debouncer<T, F>
where
    F: FnMut(T) -> R,
{
    pub fn new(delay: Duration, commit: F) -> Self {
        Self {
            delay,
            pending: None,
            commit,
        }
    }

    /// Replaces any pending value and restarts the delay.
    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((value, now + self.delay));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn poll(&mut self, now: Instant) -> Option<R> {
        let due = self.pending.as_ref().is_some_and(|(_, due)| now >= *due);
        if due { self.flush() } else { None }
    }

    pub fn flush(&mut self) -> Option<R> {
        let (value, _) = self.pending.take()?;
        Some((self.commit)(value))
    }
}
