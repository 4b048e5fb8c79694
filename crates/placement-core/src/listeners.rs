//! Document-scope pointer listeners.
//!
//! Pointer-move and pointer-release are observed at the global scope rather
//! than on the overlay, so a gesture that ends outside the container still
//! terminates. Registration hands back a [`ListenerGuard`]; dropping the guard
//! deregisters the listener, which makes teardown in the middle of a gesture
//! release everything it acquired.
//!
//! Everything here runs on the UI thread, so shared state is `Rc<RefCell<_>>`.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use placement_model::Point;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GlobalPointerEvent {
    /// Pointer moved, in client coordinates
    Move(Point),
    /// Primary button released anywhere
    Release,
}

impl GlobalPointerEvent {
    pub fn kind(&self) -> ListenerKind {
        match self {
            Self::Move(_) => ListenerKind::PointerMove,
            Self::Release => ListenerKind::PointerRelease,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenerKind {
    PointerMove,
    PointerRelease,
}

type Callback = Rc<RefCell<dyn FnMut(GlobalPointerEvent)>>;

struct Registration {
    id: u64,
    kind: ListenerKind,
    callback: Callback,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    entries: Vec<Registration>,
}

impl Registry {
    fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }
}

/// The global event scope that listeners attach to.
#[derive(Clone, Default)]
pub struct PointerHub {
    registry: Rc<RefCell<Registry>>,
}

impl PointerHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback` for events of `kind`. The listener lives as long as the guard.
    pub fn add_listener<F>(&self, kind: ListenerKind, callback: F) -> ListenerGuard
    where
        F: FnMut(GlobalPointerEvent) + 'static,
    {
        let mut registry = self.registry.borrow_mut();
        registry.next_id += 1;
        let id = registry.next_id;

        let callback: Callback = Rc::new(RefCell::new(callback));
        registry.entries.push(Registration { id, kind, callback });

        ListenerGuard { id, kind, registry: Rc::downgrade(&self.registry) }
    }

    /// Delivers `event` to every listener of its kind. Returns how many received it.
    ///
    /// Listeners may drop guards (their own or others') while being called; a
    /// listener removed earlier in the same dispatch is skipped.
    pub fn dispatch(&self, event: GlobalPointerEvent) -> usize {
        let kind = event.kind();
        let snapshot: Vec<(u64, Callback)> = self
            .registry
            .borrow()
            .entries
            .iter()
            .filter(|entry| entry.kind == kind)
            .map(|entry| (entry.id, Rc::clone(&entry.callback)))
            .collect();

        let mut delivered = 0;
        for (id, callback) in snapshot {
            if !self.registry.borrow().contains(id) {
                continue;
            }

            // A listener that re-enters dispatch does not receive the nested event.
            let Ok(mut callback) = callback.try_borrow_mut() else {
                continue;
            };
            (&mut *callback)(event);
            delivered += 1;
        }

        delivered
    }

    pub fn listener_count(&self, kind: ListenerKind) -> usize {
        self.registry.borrow().entries.iter().filter(|entry| entry.kind == kind).count()
    }
}

impl fmt::Debug for PointerHub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PointerHub")
            .field("move_listeners", &self.listener_count(ListenerKind::PointerMove))
            .field("release_listeners", &self.listener_count(ListenerKind::PointerRelease))
            .finish()
    }
}

/// Keeps one listener registered. Dropping it removes the listener.
#[must_use = "the listener is removed as soon as the guard is dropped"]
pub struct ListenerGuard {
    id: u64,
    kind: ListenerKind,
    registry: Weak<RefCell<Registry>>,
}

impl ListenerGuard {
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard").field("id", &self.id).field("kind", &self.kind).finish()
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        // Hub already gone.
        let Some(registry) = self.registry.upgrade() else {
            return;
        };

        let removed = {
            let mut registry = registry.borrow_mut();
            let index = registry.entries.iter().position(|entry| entry.id == self.id);
            index.map(|index| registry.entries.remove(index))
        };

        if removed.is_some() {
            log::debug!("{:?} listener {} removed", self.kind, self.id);
        }
    }
}
