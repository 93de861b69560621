//! Synchronous lifecycle notifications.
//!
//! The run loop publishes [`EventKind::Started`] once, [`EventKind::Running`]
//! before every iteration and [`EventKind::Stopped`] after a normal stop.
//! Handlers of one kind run by priority (higher first), then in registration
//! order.

use std::cmp::Reverse;

use crate::options::RunOptions;
use crate::output::Output;
use crate::stop::StopHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Started,
    Running,
    Stopped,
}

/// A lifecycle notification. Read-only for subscribers, except that any of
/// them may stop the worker.
pub struct LifecycleEvent<'a> {
    kind: EventKind,
    worker: &'a str,
    stop: &'a StopHandle,
    output: &'a dyn Output,
    options: &'a RunOptions,
}

impl<'a> LifecycleEvent<'a> {
    pub fn new(
        kind: EventKind,
        worker: &'a str,
        stop: &'a StopHandle,
        output: &'a dyn Output,
        options: &'a RunOptions,
    ) -> Self {
        Self {
            kind,
            worker,
            stop,
            output,
            options,
        }
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn worker_name(&self) -> &'a str {
        self.worker
    }

    pub fn stop_handle(&self) -> &'a StopHandle {
        self.stop
    }

    pub fn stop_worker(&self) {
        self.stop.stop();
    }

    pub fn output(&self) -> &'a dyn Output {
        self.output
    }

    pub fn options(&self) -> &'a RunOptions {
        self.options
    }
}

/// A handler that declares the events it wants.
pub trait Subscriber: Send {
    /// `(kind, priority)` pairs. An empty list registers nothing.
    fn subscribed_events(&self) -> Vec<(EventKind, i32)>;

    fn on_event(&mut self, event: &LifecycleEvent<'_>) -> anyhow::Result<()>;
}

struct FnSubscriber<F> {
    kind: EventKind,
    priority: i32,
    handler: F,
}

impl<F> Subscriber for FnSubscriber<F>
where
    F: FnMut(&LifecycleEvent<'_>) -> anyhow::Result<()> + Send,
{
    fn subscribed_events(&self) -> Vec<(EventKind, i32)> {
        vec![(self.kind, self.priority)]
    }

    fn on_event(&mut self, event: &LifecycleEvent<'_>) -> anyhow::Result<()> {
        (self.handler)(event)
    }
}

struct Registration {
    kind: EventKind,
    priority: i32,
    subscriber: usize,
}

/// Ordered, in-process publish/subscribe for lifecycle events.
#[derive(Default)]
pub struct Dispatcher {
    subscribers: Vec<Box<dyn Subscriber>>,
    registrations: Vec<Registration>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a closure for a single event kind.
    pub fn subscribe<F>(&mut self, kind: EventKind, priority: i32, handler: F)
    where
        F: FnMut(&LifecycleEvent<'_>) -> anyhow::Result<()> + Send + 'static,
    {
        self.add_subscriber(FnSubscriber {
            kind,
            priority,
            handler,
        });
    }

    /// Register every `(kind, priority)` pair the subscriber declares.
    pub fn add_subscriber(&mut self, subscriber: impl Subscriber + 'static) {
        let index = self.subscribers.len();
        for (kind, priority) in subscriber.subscribed_events() {
            self.registrations.push(Registration {
                kind,
                priority,
                subscriber: index,
            });
        }
        self.subscribers.push(Box::new(subscriber));
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.registrations.iter().filter(|r| r.kind == kind).count()
    }

    pub fn has_listeners(&self, kind: EventKind) -> bool {
        self.listener_count(kind) > 0
    }

    /// Deliver the event to every handler of its kind. The first handler
    /// error aborts the dispatch and is returned.
    pub fn publish(&mut self, event: &LifecycleEvent<'_>) -> anyhow::Result<()> {
        let mut matching: Vec<&Registration> = self
            .registrations
            .iter()
            .filter(|r| r.kind == event.kind())
            .collect();
        // stable: equal priorities keep registration order
        matching.sort_by_key(|r| Reverse(r.priority));
        let targets: Vec<usize> = matching.into_iter().map(|r| r.subscriber).collect();

        for index in targets {
            self.subscribers[index].on_event(event)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::NullOutput;
    use std::sync::{Arc, Mutex};

    type Log = Arc<Mutex<Vec<&'static str>>>;

    fn recorder(
        log: &Log,
        label: &'static str,
    ) -> impl FnMut(&LifecycleEvent<'_>) -> anyhow::Result<()> + Send + 'static {
        let log = Arc::clone(log);
        move |_event: &LifecycleEvent<'_>| {
            log.lock().unwrap().push(label);
            Ok(())
        }
    }

    fn publish(dispatcher: &mut Dispatcher, kind: EventKind) -> anyhow::Result<()> {
        let stop = StopHandle::new();
        let options = RunOptions::new();
        let event = LifecycleEvent::new(kind, "test", &stop, &NullOutput, &options);
        dispatcher.publish(&event)
    }

    #[test]
    fn test_priority_then_registration_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new();
        dispatcher.subscribe(EventKind::Running, 0, recorder(&log, "first"));
        dispatcher.subscribe(EventKind::Running, 100, recorder(&log, "urgent"));
        dispatcher.subscribe(EventKind::Running, 0, recorder(&log, "second"));
        dispatcher.subscribe(EventKind::Running, -5, recorder(&log, "last"));
        dispatcher.subscribe(EventKind::Started, 0, recorder(&log, "started"));

        publish(&mut dispatcher, EventKind::Running).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["urgent", "first", "second", "last"]
        );
    }

    #[test]
    fn test_only_matching_kind_is_delivered() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new();
        dispatcher.subscribe(EventKind::Stopped, 0, recorder(&log, "stopped"));

        publish(&mut dispatcher, EventKind::Started).unwrap();
        assert!(log.lock().unwrap().is_empty());

        publish(&mut dispatcher, EventKind::Stopped).unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["stopped"]);
    }

    #[test]
    fn test_handler_error_aborts_dispatch() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new();
        dispatcher.subscribe(EventKind::Running, 10, |_event: &LifecycleEvent<'_>| {
            anyhow::bail!("sampler unavailable")
        });
        dispatcher.subscribe(EventKind::Running, 0, recorder(&log, "never"));

        let err = publish(&mut dispatcher, EventKind::Running).unwrap_err();

        assert_eq!(err.to_string(), "sampler unavailable");
        assert!(log.lock().unwrap().is_empty());
    }

    struct Both {
        seen: Arc<Mutex<Vec<EventKind>>>,
    }

    impl Subscriber for Both {
        fn subscribed_events(&self) -> Vec<(EventKind, i32)> {
            vec![(EventKind::Started, 0), (EventKind::Stopped, 0)]
        }

        fn on_event(&mut self, event: &LifecycleEvent<'_>) -> anyhow::Result<()> {
            self.seen.lock().unwrap().push(event.kind());
            Ok(())
        }
    }

    #[test]
    fn test_subscriber_registers_all_declared_kinds() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut dispatcher = Dispatcher::new();
        dispatcher.add_subscriber(Both { seen: seen.clone() });

        assert!(dispatcher.has_listeners(EventKind::Started));
        assert!(!dispatcher.has_listeners(EventKind::Running));

        for kind in [EventKind::Started, EventKind::Running, EventKind::Stopped] {
            publish(&mut dispatcher, kind).unwrap();
        }

        assert_eq!(
            *seen.lock().unwrap(),
            vec![EventKind::Started, EventKind::Stopped]
        );
    }

    #[test]
    fn test_subscriber_can_stop_worker() {
        let mut dispatcher = Dispatcher::new();
        dispatcher.subscribe(EventKind::Running, 0, |event: &LifecycleEvent<'_>| {
            event.stop_worker();
            Ok(())
        });

        let stop = StopHandle::new();
        let options = RunOptions::new();
        let event =
            LifecycleEvent::new(EventKind::Running, "test", &stop, &NullOutput, &options);
        dispatcher.publish(&event).unwrap();

        assert!(stop.is_stopped());
    }
}
