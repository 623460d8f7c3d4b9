//! # tiller_event - Priority-aware event bus
//!
//! In-process publish/subscribe for decoupled inter-component
//! communication. Subscribers carry a priority (lower fires earlier, ties
//! break by registration order) and may subscribe to an event's declared
//! ancestor/capability types. Dispatch is strictly synchronous: no
//! backpressure, no retries, no unsubscription of a failing subscriber —
//! asynchronous or resilient behavior belongs inside the callback itself.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::error::Error;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

/// Error raised by a subscriber, routed to the publisher's error handler
pub type SubscriberError = Box<dyn Error + Send + Sync + 'static>;

/// Trait for events published on the bus
///
/// `lineage` declares the ancestor/capability types of the event as plain
/// `TypeId`s; subscribers registered under any of them receive the event.
/// The hierarchy is flattened with an explicit lookup at publish time, not
/// with any language dispatch feature.
pub trait Event: Any + Send + Sync {
    /// Declared ancestor/capability types of this event
    fn lineage(&self) -> Vec<TypeId> {
        Vec::new()
    }

    /// Type erasure for downcasting
    fn as_any(&self) -> &dyn Any;
}

type Handler = Arc<dyn Fn(&dyn Event) -> Result<(), SubscriberError> + Send + Sync>;

struct Subscription {
    priority: i32,
    seq: u64,
    handler: Handler,
}

/// Event bus with priority-ordered synchronous dispatch
pub struct EventBus {
    /// Subscriptions keyed by subscribed type
    subscribers: RwLock<HashMap<TypeId, Vec<Subscription>>>,
    /// Registration sequence, breaks priority ties
    next_seq: AtomicU64,
}

impl EventBus {
    /// Create a new event bus
    pub fn new() -> Self {
        Self {
            subscribers: RwLock::new(HashMap::new()),
            next_seq: AtomicU64::new(0),
        }
    }

    /// Subscribe a typed callback for events of type `E`
    ///
    /// Lower `priority` values fire earlier.
    pub fn subscribe<E, F>(&self, priority: i32, callback: F)
    where
        E: Event,
        F: Fn(&E) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        let handler: Handler = Arc::new(move |event: &dyn Event| {
            match event.as_any().downcast_ref::<E>() {
                Some(event) => callback(event),
                None => Ok(()),
            }
        });
        self.register(TypeId::of::<E>(), priority, handler);
    }

    /// Subscribe an untyped callback under an arbitrary type
    ///
    /// Used for ancestor/capability subscriptions, where the concrete
    /// payload type varies per publish.
    pub fn subscribe_dyn<F>(&self, type_id: TypeId, priority: i32, callback: F)
    where
        F: Fn(&dyn Event) -> Result<(), SubscriberError> + Send + Sync + 'static,
    {
        self.register(type_id, priority, Arc::new(callback));
    }

    fn register(&self, type_id: TypeId, priority: i32, handler: Handler) {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .write()
            .entry(type_id)
            .or_default()
            .push(Subscription {
                priority,
                seq,
                handler,
            });
    }

    /// Publish an event; a subscriber error terminates the call
    ///
    /// Subscribers for the event's own type and every type in its lineage
    /// fire in ascending priority order. The first error stops dispatch and
    /// is returned to the publisher.
    pub fn publish(&self, event: &dyn Event) -> Result<(), SubscriberError> {
        let mut result = Ok(());
        self.publish_with(event, |err| result = Err(err));
        result
    }

    /// Publish an event, routing a subscriber error to `on_error`
    pub fn publish_with<F>(&self, event: &dyn Event, on_error: F)
    where
        F: FnOnce(SubscriberError),
    {
        for handler in self.handlers_for(event) {
            if let Err(err) = handler(event) {
                log::debug!("subscriber failed, stopping dispatch: {}", err);
                on_error(err);
                return;
            }
        }
    }

    /// Number of subscriptions registered under `type_id`
    pub fn subscriber_count(&self, type_id: TypeId) -> usize {
        self.subscribers
            .read()
            .get(&type_id)
            .map_or(0, |subs| subs.len())
    }

    // Handlers are cloned out of the lock so a subscriber may register
    // further subscriptions while dispatch is running.
    fn handlers_for(&self, event: &dyn Event) -> Vec<Handler> {
        let mut types = vec![event.as_any().type_id()];
        for ancestor in event.lineage() {
            if !types.contains(&ancestor) {
                types.push(ancestor);
            }
        }

        let subscribers = self.subscribers.read();
        let mut matched: Vec<(i32, u64, Handler)> = Vec::new();
        for type_id in types {
            if let Some(subs) = subscribers.get(&type_id) {
                for sub in subs {
                    matched.push((sub.priority, sub.seq, Arc::clone(&sub.handler)));
                }
            }
        }
        drop(subscribers);

        matched.sort_by_key(|(priority, seq, _)| (*priority, *seq));
        matched.into_iter().map(|(_, _, handler)| handler).collect()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    struct SelectionChanged(&'static str);

    impl Event for SelectionChanged {
        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// Capability marker: anything that mutates a document
    struct DocumentMutation;

    struct TextInserted {
        offset: usize,
    }

    impl Event for TextInserted {
        fn lineage(&self) -> Vec<TypeId> {
            vec![TypeId::of::<DocumentMutation>()]
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_priority_order_beats_subscription_order() {
        let bus = EventBus::new();
        let order: Arc<Mutex<Vec<i32>>> = Arc::new(Mutex::new(Vec::new()));

        for priority in [2, 1] {
            let order = Arc::clone(&order);
            bus.subscribe::<SelectionChanged, _>(priority, move |_| {
                order.lock().push(priority);
                Ok(())
            });
        }

        bus.publish(&SelectionChanged("row-4")).unwrap();
        assert_eq!(*order.lock(), vec![1, 2]);
    }

    #[test]
    fn test_equal_priority_ties_break_by_registration() {
        let bus = EventBus::new();
        let order: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        for tag in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            bus.subscribe::<SelectionChanged, _>(5, move |_| {
                order.lock().push(tag);
                Ok(())
            });
        }

        bus.publish(&SelectionChanged("row-4")).unwrap();
        assert_eq!(*order.lock(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_lineage_reaches_capability_subscribers() {
        let bus = EventBus::new();
        let hits: Arc<Mutex<Vec<&'static str>>> = Arc::new(Mutex::new(Vec::new()));

        {
            let hits = Arc::clone(&hits);
            bus.subscribe_dyn(TypeId::of::<DocumentMutation>(), 0, move |event| {
                let inserted = event
                    .as_any()
                    .downcast_ref::<TextInserted>()
                    .ok_or("unexpected payload")?;
                assert_eq!(inserted.offset, 12);
                hits.lock().push("capability");
                Ok(())
            });
        }
        {
            let hits = Arc::clone(&hits);
            bus.subscribe::<TextInserted, _>(1, move |_| {
                hits.lock().push("typed");
                Ok(())
            });
        }

        bus.publish(&TextInserted { offset: 12 }).unwrap();
        assert_eq!(*hits.lock(), vec!["capability", "typed"]);
    }

    #[test]
    fn test_error_stops_dispatch_and_reaches_publisher() {
        let bus = EventBus::new();
        let hits = Arc::new(Mutex::new(Vec::new()));

        {
            let hits = Arc::clone(&hits);
            bus.subscribe::<SelectionChanged, _>(0, move |_| {
                hits.lock().push("ran");
                Err("subscriber broke".into())
            });
        }
        {
            let hits = Arc::clone(&hits);
            bus.subscribe::<SelectionChanged, _>(1, move |_| {
                hits.lock().push("never");
                Ok(())
            });
        }

        let err = bus.publish(&SelectionChanged("row-4")).unwrap_err();
        assert_eq!(err.to_string(), "subscriber broke");
        assert_eq!(*hits.lock(), vec!["ran"]);

        // the failing subscriber is not unsubscribed
        assert!(bus.publish(&SelectionChanged("row-5")).is_err());
    }

    #[test]
    fn test_error_routed_to_supplied_handler() {
        let bus = EventBus::new();
        bus.subscribe::<SelectionChanged, _>(0, |_| Err("broke".into()));

        let routed = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&routed);
        bus.publish_with(&SelectionChanged("row-4"), move |err| {
            *sink.lock() = Some(err.to_string());
        });
        assert_eq!(routed.lock().as_deref(), Some("broke"));
    }

    #[test]
    fn test_subscribe_during_dispatch_does_not_deadlock() {
        let bus = Arc::new(EventBus::new());
        let reentrant = Arc::clone(&bus);
        bus.subscribe::<SelectionChanged, _>(0, move |_| {
            reentrant.subscribe::<SelectionChanged, _>(1, |_| Ok(()));
            Ok(())
        });

        bus.publish(&SelectionChanged("row-4")).unwrap();
        assert_eq!(bus.subscriber_count(TypeId::of::<SelectionChanged>()), 2);
    }

    #[test]
    fn test_publish_without_subscribers_is_a_no_op() {
        let bus = EventBus::new();
        assert!(bus.publish(&SelectionChanged("row-4")).is_ok());
    }
}
