//! Listener bookkeeping shared by every observable object in the app.
//!
//! Rust closures cannot be compared, so unlike a dynamic-language observer
//! list a registration is identified by the `ListenerId` returned from
//! `add`, not by the callback value itself.
//!
//! Notification sites must iterate over `snapshot()` and must release any
//! interior borrow on the emitting object before invoking callbacks. That
//! gives two guarantees: listeners registered or removed during a
//! notification do not affect the in-flight fan-out, and callbacks may read
//! the object that is notifying them. Mutating that object from inside a
//! callback is a contract violation and will panic on the interior borrow.

use std::cell::RefCell;
use std::rc::Rc;

/// Opaque token identifying one listener registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenerId(u64);

/// An ordered list of callbacks, invoked in registration order.
pub struct Listeners<F: ?Sized> {
    next_id: u64,
    entries: Vec<(ListenerId, Rc<RefCell<F>>)>,
}

impl<F: ?Sized> Listeners<F> {
    pub fn new() -> Self {
        Self {
            next_id: 0,
            entries: Vec::new(),
        }
    }

    /// Registers a callback and returns its removal token.
    pub fn add(&mut self, listener: Rc<RefCell<F>>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    /// Unregisters a callback. Returns false (and does nothing) if the id
    /// is not registered, so double removal is harmless.
    pub fn remove(&mut self, id: ListenerId) -> bool {
        match self.entries.iter().position(|(entry_id, _)| *entry_id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// A clone of the current callback list, in registration order.
    pub fn snapshot(&self) -> Vec<Rc<RefCell<F>>> {
        self.entries
            .iter()
            .map(|(_, listener)| Rc::clone(listener))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<F: ?Sized> Default for Listeners<F> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Callback = dyn FnMut(u32);

    fn notify(listeners: &Listeners<Callback>, value: u32) {
        for listener in listeners.snapshot() {
            (listener.borrow_mut())(value);
        }
    }

    #[test]
    fn add_and_notify_in_registration_order() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut listeners: Listeners<Callback> = Listeners::new();

        for tag in 0..3u32 {
            let seen = Rc::clone(&seen);
            listeners.add(Rc::new(RefCell::new(move |value: u32| {
                seen.borrow_mut().push((tag, value));
            })));
        }

        notify(&listeners, 7);
        assert_eq!(*seen.borrow(), vec![(0, 7), (1, 7), (2, 7)]);
    }

    #[test]
    fn remove_is_noop_when_absent() {
        let mut listeners: Listeners<Callback> = Listeners::new();
        let id = listeners.add(Rc::new(RefCell::new(|_value: u32| {})));

        assert!(listeners.remove(id));
        assert!(!listeners.remove(id));
        assert!(listeners.is_empty());
    }

    #[test]
    fn removed_listener_is_not_notified() {
        let calls = Rc::new(RefCell::new(0u32));
        let mut listeners: Listeners<Callback> = Listeners::new();

        let id = {
            let calls = Rc::clone(&calls);
            listeners.add(Rc::new(RefCell::new(move |_value: u32| {
                *calls.borrow_mut() += 1;
            })))
        };

        notify(&listeners, 1);
        listeners.remove(id);
        notify(&listeners, 2);

        assert_eq!(*calls.borrow(), 1);
    }
}
