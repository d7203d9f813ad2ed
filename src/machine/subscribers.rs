//! Per-event subscriber lists with one-shot semantics.

use std::collections::HashMap;
use std::sync::Arc;

use crate::core::SubscriberFn;

/// A registered subscriber callback and its consume-once flag.
pub struct SubscriberEntry<E, C> {
    pub callback: SubscriberFn<E, C>,
    pub once: bool,
}

impl<E, C> Clone for SubscriberEntry<E, C> {
    fn clone(&self) -> Self {
        Self {
            callback: Arc::clone(&self.callback),
            once: self.once,
        }
    }
}

/// Ordered lists of subscriber callbacks, keyed by event name.
///
/// Fan-out during dispatch visits a key's entries in registration order.
/// `once` entries are removed after their first invocation; `off` removes
/// the first entry whose callback is the same allocation as the handle
/// passed in.
pub struct SubscriberRegistry<E, C> {
    entries: HashMap<String, Vec<SubscriberEntry<E, C>>>,
}

impl<E, C> SubscriberRegistry<E, C> {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Append a subscriber for an event.
    pub fn on(&mut self, event: impl Into<String>, callback: SubscriberFn<E, C>) {
        self.entries.entry(event.into()).or_default().push(SubscriberEntry {
            callback,
            once: false,
        });
    }

    /// Append a one-shot subscriber for an event.
    pub fn once(&mut self, event: impl Into<String>, callback: SubscriberFn<E, C>) {
        self.entries.entry(event.into()).or_default().push(SubscriberEntry {
            callback,
            once: true,
        });
    }

    /// Remove the first entry for `event` holding the same callback
    /// allocation. Returns whether an entry was removed.
    pub fn off(&mut self, event: &str, callback: &SubscriberFn<E, C>) -> bool {
        let Some(list) = self.entries.get_mut(event) else {
            return false;
        };
        match list
            .iter()
            .position(|entry| Arc::ptr_eq(&entry.callback, callback))
        {
            Some(index) => {
                list.remove(index);
                true
            }
            None => false,
        }
    }

    /// Snapshot of the current entries for an event, in registration
    /// order. The engine fans out over a snapshot so that registry
    /// mutations during dispatch cannot skew the visit order.
    pub fn snapshot(&self, event: &str) -> Vec<SubscriberEntry<E, C>> {
        self.entries.get(event).cloned().unwrap_or_default()
    }

    /// Remove a fired one-shot entry by callback identity.
    pub(crate) fn consume(&mut self, event: &str, callback: &SubscriberFn<E, C>) {
        if let Some(list) = self.entries.get_mut(event) {
            if let Some(index) = list
                .iter()
                .position(|entry| entry.once && Arc::ptr_eq(&entry.callback, callback))
            {
                list.remove(index);
            }
        }
    }

    /// Number of live subscribers for an event.
    pub fn count(&self, event: &str) -> usize {
        self.entries.get(event).map_or(0, Vec::len)
    }
}

impl<E, C> Default for SubscriberRegistry<E, C> {
    fn default() -> Self {
        Self::new()
    }
}
