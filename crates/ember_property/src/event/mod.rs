//! Multi-handler change notifications.
//!
//! A [`GenericEvent<A>`] keeps an ordered list of handlers, each called
//! with a `&A` when the event is invoked. Handlers are identified by a
//! [`Token`]; registering the same token twice counts references instead of
//! adding a second entry, so it must be removed twice to detach.
//!
//! Invocation calls out without holding the event's mutex. Handlers may
//! add, remove, enable or disable handlers (themselves included) and may
//! invoke the event again from the same thread. A different thread trying
//! to invoke while a pass is running is turned away.
//!
//! # Examples
//!
//! ```
//! use core::sync::atomic::{AtomicU32, Ordering};
//! use ember_os::sync::Arc;
//! use ember_property::event::{GenericEvent, Handler};
//!
//! let event = Arc::new(GenericEvent::<u32>::new());
//! let total = Arc::new(AtomicU32::new(0));
//!
//! let sum = total.clone();
//! let handler: Handler<u32> = Arc::new(move |v: &u32| {
//!     sum.fetch_add(*v, Ordering::Relaxed);
//! });
//!
//! let token = event.add_handler(handler.clone(), None);
//! event.add_handler(handler, None);
//!
//! assert!(event.invoke(&2));
//! assert_eq!(total.load(Ordering::Relaxed), 2);
//!
//! assert!(event.remove_handler(token, false));
//! assert!(event.has_handlers());
//! assert!(event.remove_handler(token, false));
//! assert!(!event.has_handlers());
//! ```

// -----------------------------------------------------------------------------
// Modules

mod generic;

// -----------------------------------------------------------------------------
// Exports

pub use generic::GenericEvent;

use core::fmt;

use ember_os::sync::Arc;

// -----------------------------------------------------------------------------
// Handler & Token

/// A callable registered on a [`GenericEvent<A>`].
pub type Handler<A> = Arc<dyn Fn(&A) + Send + Sync>;

/// Identifies a registered handler.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Token(u64);

impl Token {
    /// A caller-chosen token.
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The token derived from a handler's identity, used when
    /// none is supplied.
    #[inline]
    pub fn of<A>(handler: &Handler<A>) -> Self {
        Self(Arc::as_ptr(handler).cast::<()>().addr() as u64)
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token({:#x})", self.0)
    }
}

// -----------------------------------------------------------------------------
// Event

/// Handler management that does not depend on the argument type.
pub trait Event: Send + Sync {
    /// Increments (`enabled == false`) or decrements the disable count of
    /// the handler. Returns `false` for unknown tokens.
    fn enable_handler(&self, token: Token, enabled: bool) -> bool;

    /// Drops one reference to the handler, detaching it at zero.
    ///
    /// With `reenable`, a handler that stays attached has its disable
    /// count cleared. Unknown tokens are logged and return `false`.
    fn remove_handler(&self, token: Token, reenable: bool) -> bool;

    /// Detaches every handler and stops a pass in progress.
    fn reset_event(&self);

    /// `true` when at least one handler is attached.
    fn has_handlers(&self) -> bool;
}
