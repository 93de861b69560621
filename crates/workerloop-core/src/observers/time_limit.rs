use std::time::{Duration, Instant};
use tracing::info;

use crate::events::{EventKind, LifecycleEvent, Subscriber};

type Clock = Box<dyn Fn() -> Instant + Send>;

/// Stops the worker once it has been running longer than the limit.
pub struct TimeLimit {
    limit: Duration,
    clock: Clock,
    deadline: Option<Instant>,
}

impl TimeLimit {
    pub fn new(limit: Duration) -> Self {
        Self::with_clock(limit, Instant::now)
    }

    pub fn with_clock(limit: Duration, clock: impl Fn() -> Instant + Send + 'static) -> Self {
        Self {
            limit,
            clock: Box::new(clock),
            deadline: None,
        }
    }

    pub fn limit(&self) -> Duration {
        self.limit
    }
}

impl Subscriber for TimeLimit {
    fn subscribed_events(&self) -> Vec<(EventKind, i32)> {
        vec![(EventKind::Started, 0), (EventKind::Running, 0)]
    }

    fn on_event(&mut self, event: &LifecycleEvent<'_>) -> anyhow::Result<()> {
        match event.kind() {
            EventKind::Started => {
                // a deadline past the end of the clock never expires
                self.deadline = (self.clock)().checked_add(self.limit);
            }
            EventKind::Running => {
                let expired = self.deadline.is_some_and(|deadline| (self.clock)() > deadline);
                if expired {
                    event.stop_worker();
                    let time_limit = self.limit.as_secs_f64();
                    info!(
                        time_limit,
                        "Worker stopped due to time limit of {}s exceeded", time_limit
                    );
                }
            }
            EventKind::Stopped => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::RunOptions;
    use crate::output::NullOutput;
    use crate::stop::StopHandle;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    fn notify(observer: &mut TimeLimit, kind: EventKind, stop: &StopHandle) {
        let options = RunOptions::new();
        let event = LifecycleEvent::new(kind, "test", stop, &NullOutput, &options);
        observer.on_event(&event).unwrap();
    }

    #[test]
    fn test_stops_only_after_deadline_passed() {
        let base = Instant::now();
        let elapsed = Arc::new(AtomicU64::new(0));
        let clock_elapsed = elapsed.clone();
        let mut observer = TimeLimit::with_clock(Duration::from_secs(5), move || {
            base + Duration::from_secs(clock_elapsed.load(Ordering::SeqCst))
        });
        let stop = StopHandle::new();

        notify(&mut observer, EventKind::Started, &stop);

        elapsed.store(5, Ordering::SeqCst);
        notify(&mut observer, EventKind::Running, &stop);
        assert!(!stop.is_stopped());

        elapsed.store(6, Ordering::SeqCst);
        notify(&mut observer, EventKind::Running, &stop);
        assert!(stop.is_stopped());
    }

    #[test]
    fn test_unrepresentable_deadline_never_expires() {
        let mut observer = TimeLimit::new(Duration::from_secs(u64::MAX));
        let stop = StopHandle::new();

        notify(&mut observer, EventKind::Started, &stop);
        notify(&mut observer, EventKind::Running, &stop);

        assert!(!stop.is_stopped());
    }

    #[test]
    fn test_running_before_started_does_nothing() {
        let mut observer = TimeLimit::new(Duration::ZERO);
        let stop = StopHandle::new();

        notify(&mut observer, EventKind::Running, &stop);

        assert!(!stop.is_stopped());
    }
}
