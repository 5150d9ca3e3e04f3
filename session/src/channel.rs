//! Publish/subscribe fan-out of applied session events.

use std::{
    cell::RefCell,
    collections::VecDeque,
    fmt,
    rc::{Rc, Weak},
};

use heist_dda_core::Event;

type Inbox = RefCell<VecDeque<Event>>;

struct Subscriber {
    inbox: Weak<Inbox>,
    filter: fn(&Event) -> bool,
}

/// Delivers every published event to live subscriptions.
///
/// The channel only holds weak references; a subscription stops receiving
/// events the moment its owner drops it.
#[derive(Default)]
pub struct EventChannel {
    subscribers: Vec<Subscriber>,
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("subscribers", &self.subscribers.len())
            .finish()
    }
}

impl EventChannel {
    /// Creates a channel without subscribers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to every event.
    #[must_use]
    pub fn subscribe(&mut self) -> Subscription {
        self.subscribe_filtered(|_| true)
    }

    /// Subscribes to the events accepted by `filter`.
    #[must_use]
    pub fn subscribe_filtered(&mut self, filter: fn(&Event) -> bool) -> Subscription {
        let inbox = Rc::new(RefCell::new(VecDeque::new()));
        self.subscribers.push(Subscriber {
            inbox: Rc::downgrade(&inbox),
            filter,
        });
        Subscription { inbox }
    }

    /// Appends `events` to every live subscription, pruning dropped ones.
    pub fn publish(&mut self, events: &[Event]) {
        self.subscribers.retain(|subscriber| {
            let Some(inbox) = subscriber.inbox.upgrade() else {
                return false;
            };
            inbox.borrow_mut().extend(
                events
                    .iter()
                    .filter(|event| (subscriber.filter)(event))
                    .cloned(),
            );
            true
        });
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers
            .iter()
            .filter(|subscriber| subscriber.inbox.strong_count() > 0)
            .count()
    }
}

/// Receiving end of an [`EventChannel`] subscription.
#[derive(Debug)]
pub struct Subscription {
    inbox: Rc<Inbox>,
}

impl Subscription {
    /// Removes and returns pending events in publish order.
    pub fn drain(&self) -> Vec<Event> {
        self.inbox.borrow_mut().drain(..).collect()
    }

    /// Number of pending events.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inbox.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use heist_dda_core::PaintingId;

    use super::*;

    fn delivered(id: u32) -> Event {
        Event::PaintingDelivered {
            painting: PaintingId::new(id),
        }
    }

    #[test]
    fn dropped_subscription_is_removed() {
        let mut channel = EventChannel::new();
        let kept = channel.subscribe();
        let dropped = channel.subscribe();
        assert_eq!(channel.subscriber_count(), 2);

        drop(dropped);
        assert_eq!(channel.subscriber_count(), 1);

        channel.publish(&[delivered(1)]);
        assert_eq!(channel.subscribers.len(), 1, "publish prunes dead entries");
        assert_eq!(kept.drain(), vec![delivered(1)]);
        assert_eq!(kept.pending(), 0);
    }

    #[test]
    fn filtered_subscription_only_sees_matching_events() {
        let mut channel = EventChannel::new();
        let deliveries =
            channel.subscribe_filtered(|event| matches!(event, Event::PaintingDelivered { .. }));

        channel.publish(&[
            Event::PaintingStolen {
                painting: PaintingId::new(4),
            },
            delivered(4),
        ]);

        assert_eq!(deliveries.drain(), vec![delivered(4)]);
    }
}
