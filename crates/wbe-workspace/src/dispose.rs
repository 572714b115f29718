//! Notifications and the subscriptions that keep them alive.
//!
//! Every editor input owns a one-shot [`DisposeEmitter`]. Caches and groups
//! register a listener on it and keep the returned [`Subscription`]; dropping
//! the subscription unregisters the listener again. [`ChangeEmitter`] is the
//! repeating variant, used for changes to the set of visible editors.

use std::cell::Cell;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

type Listener = Box<dyn FnOnce()>;

/// An owned registration. Dropping it runs its cleanup exactly once.
#[must_use = "dropping a subscription unregisters it immediately"]
pub struct Subscription(Option<Box<dyn FnOnce()>>);

impl Subscription {
    pub fn new(cleanup: impl FnOnce() + 'static) -> Self {
        Self(Some(Box::new(cleanup)))
    }

    /// A subscription with nothing to clean up.
    pub fn empty() -> Self {
        Self(None)
    }

    pub fn dispose(mut self) {
        self.run();
    }

    fn run(&mut self) {
        if let Some(cleanup) = self.0.take() {
            cleanup();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.run();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Subscription")
            .field(&self.0.is_some())
            .finish()
    }
}

#[derive(Default)]
struct EmitterState {
    listeners: RefCell<Vec<(u64, Listener)>>,
    next_id: Cell<u64>,
    fired: Cell<bool>,
}

/// Fires its listeners once, then stays fired.
#[derive(Default)]
pub struct DisposeEmitter {
    state: Rc<EmitterState>,
}

impl DisposeEmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `listener`. Listeners added after [`fire`](Self::fire) never run.
    pub fn subscribe(&self, listener: impl FnOnce() + 'static) -> Subscription {
        if self.state.fired.get() {
            return Subscription::empty();
        }

        let id = self.state.next_id.get();
        self.state.next_id.set(id + 1);
        self.state
            .listeners
            .borrow_mut()
            .push((id, Box::new(listener)));

        let state = Rc::downgrade(&self.state);
        Subscription::new(move || {
            if let Some(state) = state.upgrade() {
                state
                    .listeners
                    .borrow_mut()
                    .retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }

    /// Run every listener in registration order. Returns `false` when the
    /// emitter had already fired.
    pub fn fire(&self) -> bool {
        if self.state.fired.replace(true) {
            return false;
        }
        let listeners = std::mem::take(&mut *self.state.listeners.borrow_mut());
        for (_, listener) in listeners {
            listener();
        }
        true
    }

    pub fn has_fired(&self) -> bool {
        self.state.fired.get()
    }

    pub fn listener_count(&self) -> usize {
        self.state.listeners.borrow().len()
    }
}

impl fmt::Debug for DisposeEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DisposeEmitter")
            .field("fired", &self.state.fired.get())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

type ChangeListener = Rc<dyn Fn()>;

/// Fires its listeners every time something changed.
#[derive(Default)]
pub struct ChangeEmitter {
    listeners: Rc<RefCell<Vec<(u64, ChangeListener)>>>,
    next_id: Cell<u64>,
}

impl ChangeEmitter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: impl Fn() + 'static) -> Subscription {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.listeners.borrow_mut().push((id, Rc::new(listener)));

        let listeners = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            if let Some(listeners) = listeners.upgrade() {
                listeners
                    .borrow_mut()
                    .retain(|(listener_id, _)| *listener_id != id);
            }
        })
    }

    /// Run the listeners registered right now. Listeners may subscribe or
    /// unsubscribe while this runs.
    pub fn fire(&self) {
        let listeners: Vec<ChangeListener> = self
            .listeners
            .borrow()
            .iter()
            .map(|(_, listener)| listener.clone())
            .collect();
        for listener in listeners {
            listener();
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }
}

impl fmt::Debug for ChangeEmitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeEmitter")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_once_in_order() {
        let emitter = DisposeEmitter::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        let first = {
            let log = log.clone();
            emitter.subscribe(move || log.borrow_mut().push(1))
        };
        let second = {
            let log = log.clone();
            emitter.subscribe(move || log.borrow_mut().push(2))
        };

        assert!(emitter.fire());
        assert!(!emitter.fire());
        assert_eq!(*log.borrow(), vec![1, 2]);
        drop((first, second));
    }

    #[test]
    fn test_dropped_subscription_does_not_fire() {
        let emitter = DisposeEmitter::new();
        let fired = Rc::new(Cell::new(false));
        let subscription = {
            let fired = fired.clone();
            emitter.subscribe(move || fired.set(true))
        };
        assert_eq!(emitter.listener_count(), 1);

        drop(subscription);
        assert_eq!(emitter.listener_count(), 0);
        emitter.fire();
        assert!(!fired.get());
    }

    #[test]
    fn test_subscribe_after_fire_is_inert() {
        let emitter = DisposeEmitter::new();
        emitter.fire();
        let fired = Rc::new(Cell::new(false));
        let _subscription = {
            let fired = fired.clone();
            emitter.subscribe(move || fired.set(true))
        };
        assert!(!fired.get());
        assert_eq!(emitter.listener_count(), 0);
    }

    #[test]
    fn test_change_emitter_fires_until_unsubscribed() {
        let emitter = ChangeEmitter::new();
        let count = Rc::new(Cell::new(0));
        let subscription = {
            let count = count.clone();
            emitter.subscribe(move || count.set(count.get() + 1))
        };

        emitter.fire();
        emitter.fire();
        assert_eq!(count.get(), 2);

        drop(subscription);
        emitter.fire();
        assert_eq!(count.get(), 2);
        assert_eq!(emitter.listener_count(), 0);
    }
}
