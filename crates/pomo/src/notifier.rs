//! Typed multicast notifications
//!
//! A `Notifier<A>` keeps an ordered list of callbacks and calls each of them,
//! in subscription order, whenever the owner invokes it with an `A`.
//!
//! Subscribers are identified by reference: the `Rc` of the callback and, for
//! bound subscriptions, the `Rc` of the context. Two closures with the same
//! body are different subscribers; the same `Rc` subscribed twice is one.
//! Keep hold of the `Rc` you subscribed if you ever want to unsubscribe.
//! A bound subscriber goes away on its own once its context is dropped.

use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

/// Callback invoked with the notification arguments
pub type Handler<A> = Rc<dyn Fn(&A)>;

/// Callback invoked with a context receiver and the notification arguments
pub type BoundHandler<C, A> = Rc<dyn Fn(&C, &A)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Identity {
    callback: *const (),
    context: Option<*const ()>,
}

impl Identity {
    fn free<A>(handler: &Handler<A>) -> Self {
        Self {
            callback: Rc::as_ptr(handler) as *const (),
            context: None,
        }
    }

    fn bound<C, A>(handler: &BoundHandler<C, A>, context: &Rc<C>) -> Self {
        Self {
            callback: Rc::as_ptr(handler) as *const (),
            context: Some(Rc::as_ptr(context) as *const ()),
        }
    }
}

struct Subscriber<A> {
    identity: Identity,
    call: Handler<A>,
    context: Option<Weak<dyn Any>>,
}

impl<A> Subscriber<A> {
    /// Free subscribers are always live; bound ones die with their context
    fn is_live(&self) -> bool {
        self.context.as_ref().map_or(true, |c| c.strong_count() > 0)
    }
}

/// Ordered, duplicate-free multicast callback registry
pub struct Notifier<A> {
    subscribers: RefCell<Vec<Subscriber<A>>>,
}

impl<A> Default for Notifier<A> {
    fn default() -> Self {
        Self {
            subscribers: RefCell::new(Vec::new()),
        }
    }
}

impl<A> fmt::Debug for Notifier<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("subscribers", &self.subscribers.borrow().len())
            .finish()
    }
}

impl<A: 'static> Notifier<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback. Subscribing the same callback twice is a no-op.
    pub fn subscribe(&self, handler: &Handler<A>) {
        self.insert(Subscriber {
            identity: Identity::free(handler),
            call: Rc::clone(handler),
            context: None,
        });
    }

    /// Register a callback bound to a context.
    ///
    /// The callback receives the context as its first argument. The context
    /// is held weakly: once every other `Rc` to it is gone the subscriber
    /// stops being called, so an owner can subscribe itself to notifiers it
    /// owns without creating a cycle.
    pub fn subscribe_with<C: 'static>(&self, handler: &BoundHandler<C, A>, context: &Rc<C>) {
        let identity = Identity::bound(handler, context);
        let handler = Rc::clone(handler);
        let context: Weak<C> = Rc::downgrade(context);
        let liveness: Weak<dyn Any> = context.clone();

        self.insert(Subscriber {
            identity,
            call: Rc::new(move |args: &A| {
                if let Some(context) = context.upgrade() {
                    handler(&context, args);
                }
            }),
            context: Some(liveness),
        });
    }

    /// Remove a callback registered with `subscribe`. No-op if absent.
    pub fn unsubscribe(&self, handler: &Handler<A>) {
        self.remove(Identity::free(handler));
    }

    /// Remove a callback registered with `subscribe_with`. No-op if absent.
    pub fn unsubscribe_with<C>(&self, handler: &BoundHandler<C, A>, context: &Rc<C>) {
        self.remove(Identity::bound(handler, context));
    }

    /// Call every subscriber in subscription order.
    ///
    /// Bound subscribers whose context is gone are dropped first. The list
    /// is then snapshotted: callbacks may subscribe or unsubscribe on this
    /// notifier, and the change applies from the next invocation.
    pub fn invoke(&self, args: &A) {
        self.prune();
        let snapshot: Vec<Handler<A>> = self
            .subscribers
            .borrow()
            .iter()
            .map(|s| Rc::clone(&s.call))
            .collect();

        for call in snapshot {
            call(args);
        }
    }

    /// Drop every subscriber
    pub fn reset(&self) {
        self.subscribers.borrow_mut().clear();
    }

    /// Number of live subscribers
    pub fn len(&self) -> usize {
        self.subscribers.borrow().iter().filter(|s| s.is_live()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop subscribers whose context is gone, outside the borrow
    fn prune(&self) {
        let dead: Vec<Subscriber<A>> = {
            let mut subscribers = self.subscribers.borrow_mut();
            let (live, dead) = std::mem::take(&mut *subscribers)
                .into_iter()
                .partition(Subscriber::is_live);
            *subscribers = live;
            dead
        };
        drop(dead);
    }

    fn insert(&self, subscriber: Subscriber<A>) {
        // A dead context's address may be reused by a new one
        self.prune();
        let mut subscribers = self.subscribers.borrow_mut();
        if !subscribers.iter().any(|s| s.identity == subscriber.identity) {
            subscribers.push(subscriber);
        }
    }

    fn remove(&self, identity: Identity) {
        let mut subscribers = self.subscribers.borrow_mut();
        if let Some(index) = subscribers.iter().position(|s| s.identity == identity) {
            subscribers.remove(index);
        }
    }
}
