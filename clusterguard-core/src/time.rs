//! Simulation time and periodic timers
//!
//! The engine never reads a clock. Whoever drives it (a discrete-event
//! runtime, a test) passes the current time into each handler, and the
//! engine answers with the next instant a timer wants to fire.

/// Simulation time in seconds
pub type SimTime = f64;

/// Fixed-interval timer, rescheduled on every firing
///
/// No drift compensation: the next deadline is `fired_at + interval`, so a
/// late delivery shifts every later deadline by the same amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicTimer {
    interval: SimTime,
    next_fire: Option<SimTime>,
    fired: u64,
}

impl PeriodicTimer {
    /// Create an unarmed timer
    pub const fn new(interval: SimTime) -> Self {
        Self {
            interval,
            next_fire: None,
            fired: 0,
        }
    }

    /// Arm the timer so its first firing is one interval after `now`
    pub fn start(&mut self, now: SimTime) -> SimTime {
        let next = now + self.interval;
        self.next_fire = Some(next);
        next
    }

    /// Record a firing at `now` and reschedule
    ///
    /// Returns the next deadline, or `None` if the timer was cancelled.
    pub fn fire(&mut self, now: SimTime) -> Option<SimTime> {
        self.next_fire?;
        self.fired += 1;
        let next = now + self.interval;
        self.next_fire = Some(next);
        Some(next)
    }

    /// Whether the timer is armed and its deadline has passed
    pub fn is_due(&self, now: SimTime) -> bool {
        matches!(self.next_fire, Some(deadline) if now >= deadline)
    }

    /// Disarm the timer; later `fire` calls do nothing
    pub fn cancel(&mut self) {
        self.next_fire = None;
    }

    /// Next deadline, if armed
    pub fn next_fire(&self) -> Option<SimTime> {
        self.next_fire
    }

    /// Whether the timer is armed
    pub fn is_armed(&self) -> bool {
        self.next_fire.is_some()
    }

    /// Number of firings so far
    pub fn fired(&self) -> u64 {
        self.fired
    }

    /// Configured interval
    pub fn interval(&self) -> SimTime {
        self.interval
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timer_reschedules_from_firing_time() {
        let mut timer = PeriodicTimer::new(100.0);
        assert!(!timer.is_armed());

        assert_eq!(timer.start(0.0), 100.0);
        assert!(!timer.is_due(99.9));
        assert!(timer.is_due(100.0));

        // Delivered late: no catch-up, the schedule shifts
        assert_eq!(timer.fire(103.0), Some(203.0));
        assert_eq!(timer.fired(), 1);
    }

    #[test]
    fn cancelled_timer_stays_quiet() {
        let mut timer = PeriodicTimer::new(5.0);
        timer.start(0.0);
        timer.cancel();

        assert_eq!(timer.fire(5.0), None);
        assert!(!timer.is_due(1_000.0));
        assert_eq!(timer.fired(), 0);
    }
}
