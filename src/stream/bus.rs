//! Per-channel callback registry.

use std::collections::HashMap;
use std::fmt;

use trace_types::{Channel, StreamEvent};

type Callback = Box<dyn FnMut(&StreamEvent)>;

/// Synchronous fan-out of events to subscribers.
///
/// Callbacks for a channel are invoked in the order they were registered.
#[derive(Default)]
pub struct EventBus {
    subscribers: HashMap<Channel, Vec<Callback>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe<F>(&mut self, channel: Channel, callback: F)
    where
        F: FnMut(&StreamEvent) + 'static,
    {
        self.subscribers.entry(channel).or_default().push(Box::new(callback));
    }

    /// Deliver `event` to every subscriber of its channel.
    ///
    /// Returns the number of callbacks invoked.
    pub fn emit(&mut self, event: &StreamEvent) -> usize {
        match self.subscribers.get_mut(&event.channel()) {
            Some(callbacks) => {
                for callback in callbacks.iter_mut() {
                    callback(event);
                }
                callbacks.len()
            }
            None => 0,
        }
    }

    pub fn subscriber_count(&self, channel: Channel) -> usize {
        self.subscribers.get(&channel).map_or(0, Vec::len)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<&str, usize> = self
            .subscribers
            .iter()
            .map(|(channel, callbacks)| (channel.name(), callbacks.len()))
            .collect();
        f.debug_struct("EventBus").field("subscribers", &counts).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;
    use trace_types::{ConnectionMode, HealthSnapshot, HealthStatus};

    #[test]
    fn test_fan_out_in_registration_order() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut bus = EventBus::new();

        for tag in ["first", "second", "third"] {
            let calls = calls.clone();
            bus.subscribe(Channel::Health, move |_| calls.borrow_mut().push(tag));
        }

        let event = StreamEvent::Health(HealthSnapshot::new(96.0, HealthStatus::Healthy));
        assert_eq!(bus.emit(&event), 3);
        assert_eq!(*calls.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_only_matching_channel_fires() {
        let hits = Rc::new(RefCell::new(0));
        let mut bus = EventBus::new();
        {
            let hits = hits.clone();
            bus.subscribe(Channel::Telemetry, move |_| *hits.borrow_mut() += 1);
        }

        assert_eq!(bus.emit(&StreamEvent::Connection(ConnectionMode::Live)), 0);
        assert_eq!(*hits.borrow(), 0);
        assert_eq!(bus.subscriber_count(Channel::Telemetry), 1);
        assert_eq!(bus.subscriber_count(Channel::Issue), 0);
    }
}
