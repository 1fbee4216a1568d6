use alloc::vec::Vec;
use core::fmt;

use ember_os::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use ember_os::thread::{ThreadId, current_id};
use ember_utils::vec::FastVec;

use crate::event::{Event, Handler, Token};

// -----------------------------------------------------------------------------
// State

struct Entry<A> {
    token: Token,
    handler: Handler<A>,
    refcount: usize,
    disabled: usize,
}

struct State<A> {
    entries: Vec<Entry<A>>,
    /// Bumped by every reset; a pass stops when it changes under it.
    reset_count: u64,
    /// The thread running a pass, if any.
    invoker: Option<ThreadId>,
    /// Nesting depth of same-thread passes.
    depth: usize,
}

impl<A> State<A> {
    fn position(&self, token: Token) -> Option<usize> {
        self.entries.iter().position(|e| e.token == token)
    }

    fn is_enabled(&self, token: Token) -> bool {
        self.entries
            .iter()
            .any(|e| e.token == token && e.disabled == 0)
    }
}

// -----------------------------------------------------------------------------
// GenericEvent

/// An event whose handlers take a `&A`.
///
/// Handlers run in registration order. [`invoke`](Self::invoke) takes a
/// snapshot of the enabled handlers, then for each of them re-checks under
/// the mutex that it is still attached and enabled before calling it:
///
/// - handlers removed or disabled during a pass are skipped for the rest of it;
/// - handlers added during a pass first run on the next invocation;
/// - [`reset_event`](Self::reset_event) during a pass stops it.
///
/// A handler that invokes the event again runs a nested pass to completion,
/// after which the outer pass continues.
pub struct GenericEvent<A> {
    state: Mutex<State<A>>,
}

impl<A> Default for GenericEvent<A> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<A> GenericEvent<A> {
    /// An event without handlers.
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(State {
                entries: Vec::new(),
                reset_count: 0,
                invoker: None,
                depth: 0,
            }),
        }
    }

    // A panicking handler never runs with the mutex held,
    // so the state stays consistent through poisoning.
    #[inline]
    fn lock(&self) -> MutexGuard<'_, State<A>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers `handler` under `token`, or under [`Token::of`] the handler
    /// when `token` is `None` or zero.
    ///
    /// An already registered token gains a reference instead of a second entry.
    pub fn add_handler(&self, handler: Handler<A>, token: Option<Token>) -> Token {
        let token = token
            .filter(|token| token.raw() != 0)
            .unwrap_or_else(|| Token::of(&handler));
        let mut state = self.lock();
        match state.position(token) {
            Some(index) => state.entries[index].refcount += 1,
            None => state.entries.push(Entry {
                token,
                handler,
                refcount: 1,
                disabled: 0,
            }),
        }
        token
    }

    /// See [`Event::enable_handler`].
    pub fn enable_handler(&self, token: Token, enabled: bool) -> bool {
        let mut state = self.lock();
        let Some(index) = state.position(token) else {
            return false;
        };
        let entry = &mut state.entries[index];
        if enabled {
            entry.disabled = entry.disabled.saturating_sub(1);
        } else {
            entry.disabled += 1;
        }
        true
    }

    /// See [`Event::remove_handler`].
    pub fn remove_handler(&self, token: Token, reenable: bool) -> bool {
        let mut state = self.lock();
        let Some(index) = state.position(token) else {
            log::error!("remove_handler: no handler registered for {token:?}");
            return false;
        };
        let entry = &mut state.entries[index];
        entry.refcount -= 1;
        if entry.refcount == 0 {
            // Dropped outside the lock: a handler may own the last
            // reference to something that touches this event.
            let removed = state.entries.remove(index);
            drop(state);
            drop(removed);
        } else if reenable {
            entry.disabled = 0;
        }
        true
    }

    /// See [`Event::reset_event`].
    pub fn reset_event(&self) {
        let mut state = self.lock();
        state.reset_count = state.reset_count.wrapping_add(1);
        let removed = core::mem::take(&mut state.entries);
        drop(state);
        drop(removed);
    }

    /// Number of attached handlers, counting each token once.
    pub fn handler_count(&self) -> usize {
        self.lock().entries.len()
    }

    #[inline]
    pub fn has_handlers(&self) -> bool {
        self.handler_count() != 0
    }

    /// `true` while some thread is running a pass.
    pub fn is_invoking(&self) -> bool {
        self.lock().invoker.is_some()
    }
}

impl<A: 'static> GenericEvent<A> {
    /// Calls every enabled handler with `args`.
    ///
    /// Returns `false`, without calling anything, when another thread is
    /// running a pass.
    pub fn invoke(self: &Arc<Self>, args: &A) -> bool {
        // Handlers may drop the caller's last reference to the event.
        let this = Arc::clone(self);
        let me = current_id();

        let (snapshot, reset_count) = {
            let mut state = this.lock();
            if state.invoker.is_some_and(|id| id != me) {
                log::trace!("invoke rejected: another thread is invoking");
                return false;
            }
            state.invoker = Some(me);
            state.depth += 1;

            let snapshot = state
                .entries
                .iter()
                .filter(|e| e.disabled == 0)
                .map(|e| (e.token, Arc::downgrade(&e.handler)))
                .collect::<FastVec<(Token, Weak<dyn Fn(&A) + Send + Sync>), 8>>();
            (snapshot, state.reset_count)
        };

        let _pass = Pass(&*this);
        for (token, handler) in snapshot.as_slice() {
            let handler = {
                let state = this.lock();
                if state.reset_count != reset_count {
                    break;
                }
                if !state.is_enabled(*token) {
                    continue;
                }
                match handler.upgrade() {
                    Some(handler) => handler,
                    None => continue,
                }
            };
            handler(args);
        }
        true
    }
}

/// Ends a pass on drop, also when a handler panics.
struct Pass<'a, A>(&'a GenericEvent<A>);

impl<A> Drop for Pass<'_, A> {
    fn drop(&mut self) {
        let mut state = self.0.lock();
        state.depth -= 1;
        if state.depth == 0 {
            state.invoker = None;
        }
    }
}

impl<A> Event for GenericEvent<A> {
    #[inline]
    fn enable_handler(&self, token: Token, enabled: bool) -> bool {
        GenericEvent::enable_handler(self, token, enabled)
    }

    #[inline]
    fn remove_handler(&self, token: Token, reenable: bool) -> bool {
        GenericEvent::remove_handler(self, token, reenable)
    }

    #[inline]
    fn reset_event(&self) {
        GenericEvent::reset_event(self);
    }

    #[inline]
    fn has_handlers(&self) -> bool {
        GenericEvent::has_handlers(self)
    }
}

impl<A> fmt::Debug for GenericEvent<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("GenericEvent")
            .field("handlers", &state.entries.len())
            .field("invoking", &state.invoker.is_some())
            .finish()
    }
}
