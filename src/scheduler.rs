use std::time::{Duration, Instant};

/// The two periodic schedules a session runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Once-per-second countdown.
    Countdown,
    /// Target relocation at the current kind's interval.
    Movement,
}

/// Opaque handle to a scheduled timer, used to cancel or re-arm it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerHandle(u64);

/// Periodic timer source for the session controller.
///
/// The controller arms at most two timers (countdown + movement) and
/// cancels both on every mode exit, so no timer event can outlive the
/// session it was armed for.
pub trait Scheduler {
    fn schedule_periodic(&mut self, interval: Duration, event: TimerEvent) -> TimerHandle;
    /// Change the interval of a live timer, restarting its period.
    fn reschedule(&mut self, handle: TimerHandle, interval: Duration);
    fn cancel(&mut self, handle: TimerHandle);
    /// Timer events that have come due at `now`, oldest first. Due timers
    /// re-arm themselves for their next period.
    fn poll_due(&mut self, now: Instant) -> Vec<TimerEvent>;
}

#[derive(Debug)]
struct Timer {
    handle: TimerHandle,
    event: TimerEvent,
    interval: Duration,
    due: Instant,
}

/// Production scheduler: deadline-based, polled from the event loop.
#[derive(Debug, Default)]
pub struct DeadlineScheduler {
    timers: Vec<Timer>,
    next_id: u64,
}

impl DeadlineScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Earliest pending deadline, used by the run loop to size its wait.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|t| t.due).min()
    }
}

impl Scheduler for DeadlineScheduler {
    fn schedule_periodic(&mut self, interval: Duration, event: TimerEvent) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.timers.push(Timer {
            handle,
            event,
            interval,
            due: Instant::now() + interval,
        });
        handle
    }

    fn reschedule(&mut self, handle: TimerHandle, interval: Duration) {
        if let Some(timer) = self.timers.iter_mut().find(|t| t.handle == handle) {
            timer.interval = interval;
            timer.due = Instant::now() + interval;
        }
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.timers.retain(|t| t.handle != handle);
    }

    fn poll_due(&mut self, now: Instant) -> Vec<TimerEvent> {
        let mut due = Vec::new();
        for timer in &mut self.timers {
            if timer.due <= now {
                due.push((timer.due, timer.event));
                timer.due += timer.interval;
            }
        }
        due.sort_by_key(|&(at, _)| at);
        due.into_iter().map(|(_, ev)| ev).collect()
    }
}

/// Test scheduler: records what is armed and fires only when told to.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    armed: Vec<(TimerHandle, Duration, TimerEvent)>,
    pending: Vec<TimerEvent>,
    next_id: u64,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Interval currently armed for `event`, if any.
    pub fn interval_of(&self, event: TimerEvent) -> Option<Duration> {
        self.armed
            .iter()
            .find(|(_, _, ev)| *ev == event)
            .map(|(_, interval, _)| *interval)
    }

    pub fn armed_count(&self) -> usize {
        self.armed.len()
    }

    /// Queue `event` to be returned from the next `poll_due`.
    pub fn fire(&mut self, event: TimerEvent) {
        self.pending.push(event);
    }
}

impl Scheduler for ManualScheduler {
    fn schedule_periodic(&mut self, interval: Duration, event: TimerEvent) -> TimerHandle {
        let handle = TimerHandle(self.next_id);
        self.next_id += 1;
        self.armed.push((handle, interval, event));
        handle
    }

    fn reschedule(&mut self, handle: TimerHandle, interval: Duration) {
        if let Some(slot) = self.armed.iter_mut().find(|(h, _, _)| *h == handle) {
            slot.1 = interval;
        }
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.armed.retain(|(h, _, _)| *h != handle);
    }

    fn poll_due(&mut self, _now: Instant) -> Vec<TimerEvent> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deadline_scheduler_fires_after_interval() {
        let mut sched = DeadlineScheduler::new();
        let start = Instant::now();
        sched.schedule_periodic(Duration::from_millis(10), TimerEvent::Countdown);

        assert!(sched.poll_due(start).is_empty());
        let due = sched.poll_due(start + Duration::from_millis(20));
        assert_eq!(due, vec![TimerEvent::Countdown]);
    }

    #[test]
    fn due_timer_rearms_for_next_period() {
        let mut sched = DeadlineScheduler::new();
        let start = Instant::now();
        sched.schedule_periodic(Duration::from_millis(10), TimerEvent::Movement);

        assert_eq!(
            sched.poll_due(start + Duration::from_millis(11)),
            vec![TimerEvent::Movement]
        );
        assert!(sched.poll_due(start + Duration::from_millis(12)).is_empty());
        assert_eq!(
            sched.poll_due(start + Duration::from_millis(22)),
            vec![TimerEvent::Movement]
        );
    }

    #[test]
    fn cancel_removes_timer() {
        let mut sched = DeadlineScheduler::new();
        let start = Instant::now();
        let handle = sched.schedule_periodic(Duration::from_millis(1), TimerEvent::Countdown);
        sched.cancel(handle);
        assert!(sched.poll_due(start + Duration::from_secs(1)).is_empty());
        assert_eq!(sched.next_deadline(), None);
    }

    #[test]
    fn reschedule_changes_interval() {
        let mut sched = DeadlineScheduler::new();
        let handle = sched.schedule_periodic(Duration::from_millis(10), TimerEvent::Movement);
        let before = sched.next_deadline().unwrap();
        sched.reschedule(handle, Duration::from_millis(500));
        assert!(sched.next_deadline().unwrap() > before);
    }

    #[test]
    fn manual_scheduler_tracks_armed_intervals() {
        let mut sched = ManualScheduler::new();
        let handle = sched.schedule_periodic(Duration::from_millis(800), TimerEvent::Movement);
        assert_eq!(
            sched.interval_of(TimerEvent::Movement),
            Some(Duration::from_millis(800))
        );
        sched.reschedule(handle, Duration::from_millis(600));
        assert_eq!(
            sched.interval_of(TimerEvent::Movement),
            Some(Duration::from_millis(600))
        );
        sched.cancel(handle);
        assert_eq!(sched.interval_of(TimerEvent::Movement), None);
    }
}
