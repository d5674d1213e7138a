//! Typed notifications emitted by a collection.

use std::fmt;

use super::NodeId;

/// Something observable happened in a collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionEvent {
    /// A node was renamed.
    NameChanged {
        /// The renamed node.
        node: NodeId,
        /// Name before the change.
        old_name: String,
        /// Name after the change.
        new_name: String,
    },
    /// A node is about to be unlinked from its parent.
    AboutToBeDeleted {
        /// The node being removed (emitted for every node of the subtree).
        node: NodeId,
    },
    /// A variable's value changed.
    VariableChanged {
        /// Variable name.
        name: String,
        /// Public value: the real value, or the sensitive sentinel.
        public_value: String,
    },
    /// The collection switched between clean and dirty.
    DirtyChanged {
        /// New state.
        dirty: bool,
    },
}

/// Handle returned by [`EventHub::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler = Box<dyn Fn(&CollectionEvent) + Send + Sync>;

/// Subscriber list for collection events.
#[derive(Default)]
pub struct EventHub {
    next_id: u64,
    handlers: Vec<(SubscriptionId, Handler)>,
}

impl EventHub {
    /// Registers a handler called synchronously for every event.
    pub fn subscribe(
        &mut self,
        handler: impl Fn(&CollectionEvent) + Send + Sync + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.handlers.push((id, Box::new(handler)));
        id
    }

    /// Removes a handler. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.handlers.len();
        self.handlers.retain(|(sid, _)| *sid != id);
        before != self.handlers.len()
    }

    /// Delivers `event` to every handler in subscription order.
    pub fn emit(&self, event: &CollectionEvent) {
        for (_, handler) in &self.handlers {
            handler(event);
        }
    }

    /// Number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Returns true if nobody is listening.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for EventHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventHub")
            .field("subscribers", &self.handlers.len())
            .finish()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_subscribe_and_unsubscribe() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut hub = EventHub::default();
        let sink = Arc::clone(&seen);
        let id = hub.subscribe(move |event| sink.lock().unwrap().push(event.clone()));

        hub.emit(&CollectionEvent::DirtyChanged { dirty: true });
        assert!(hub.unsubscribe(id));
        assert!(!hub.unsubscribe(id));
        hub.emit(&CollectionEvent::DirtyChanged { dirty: false });

        assert_eq!(
            *seen.lock().unwrap(),
            vec![CollectionEvent::DirtyChanged { dirty: true }]
        );
        assert!(hub.is_empty());
    }
}
