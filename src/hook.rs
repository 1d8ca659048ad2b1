//! Event delivery (§4.6): each installed event request owns a [`Hook`], a
//! mailbox the transport's reader thread feeds and callers drain with
//! `get`, bounded or unbounded as the consumer chooses. [`EventMap`] routes
//! a decoded composite event to the hook registered for its request id.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

use crate::error::ClientError;
use crate::protocol::commands::event::Event;
use crate::protocol::RequestID;

struct State {
    queue: VecDeque<Result<Event, ClientError>>,
    closed: bool,
    capacity: Option<usize>,
}

/// The mailbox for one installed event request. Events arrive in VM
/// emission order; `get` returns them in that same order. A request error
/// that isn't specific to any one event (an unrecognised event kind, say)
/// is delivered as an `Err` item rather than dropped.
pub struct Hook {
    state: Mutex<State>,
    ready: Condvar,
}

impl Default for Hook {
    fn default() -> Self {
        Hook::unbounded()
    }
}

impl Hook {
    pub fn unbounded() -> Self {
        Hook::with_capacity(None)
    }

    /// A mailbox that blocks `put` once `capacity` items are queued,
    /// matching the original's `Queue(maxsize=N)`.
    pub fn bounded(capacity: usize) -> Self {
        Hook::with_capacity(Some(capacity))
    }

    fn with_capacity(capacity: Option<usize>) -> Self {
        Hook {
            state: Mutex::new(State {
                queue: VecDeque::new(),
                closed: false,
                capacity,
            }),
            ready: Condvar::new(),
        }
    }

    pub fn put(&self, item: Result<Event, ClientError>) {
        let mut state = self.state.lock().expect("hook lock poisoned");
        if let Some(capacity) = state.capacity {
            while state.queue.len() >= capacity && !state.closed {
                state = self.ready.wait(state).expect("hook lock poisoned");
            }
            if state.closed {
                return;
            }
        }
        state.queue.push_back(item);
        self.ready.notify_all();
    }

    /// Blocks until an event is available, the hook is cleared, or
    /// `timeout` elapses. Returns `None` in the latter two cases.
    pub fn get(&self, timeout: Option<Duration>) -> Option<Result<Event, ClientError>> {
        let mut state = self.state.lock().expect("hook lock poisoned");
        let deadline = timeout.map(|d| Instant::now() + d);
        loop {
            if let Some(item) = state.queue.pop_front() {
                // A bounded hook's producer may be waiting on this slot.
                self.ready.notify_all();
                return Some(item);
            }
            if state.closed {
                return None;
            }
            state = match deadline {
                None => self.ready.wait(state).expect("hook lock poisoned"),
                Some(deadline) => {
                    let remaining = deadline.saturating_duration_since(Instant::now());
                    if remaining.is_zero() {
                        return None;
                    }
                    let (guard, result) = self
                        .ready
                        .wait_timeout(state, remaining)
                        .expect("hook lock poisoned");
                    if result.timed_out() {
                        return None;
                    }
                    guard
                }
            };
        }
    }

    /// Unblocks every waiter with `None` and marks the hook as cleared.
    /// Idempotent.
    pub fn close(&self) {
        let mut state = self.state.lock().expect("hook lock poisoned");
        state.closed = true;
        self.ready.notify_all();
    }
}

/// Routes decoded composite events to the hook registered for their
/// request id, and backs `EventRequest.Clear`.
#[derive(Default)]
pub struct EventMap {
    hooks: Mutex<HashMap<RequestID, Arc<Hook>>>,
}

impl EventMap {
    /// `capacity`: `None` for an unbounded mailbox, `Some(n)` to block the
    /// reader thread's delivery once `n` undelivered events are queued.
    pub fn register(&self, request_id: RequestID, capacity: Option<usize>) -> Arc<Hook> {
        let hook = Arc::new(match capacity {
            Some(n) => Hook::bounded(n),
            None => Hook::unbounded(),
        });
        self.hooks
            .lock()
            .expect("event map lock poisoned")
            .insert(request_id, hook.clone());
        hook
    }

    /// Delivers `event` to its request's hook, if still registered. A
    /// request id with no registered hook (already cleared, or never ours)
    /// is silently dropped rather than treated as an error.
    pub fn dispatch(&self, event: Event) {
        let hooks = self.hooks.lock().expect("event map lock poisoned");
        if let Some(hook) = hooks.get(&event.request_id()) {
            hook.put(Ok(event));
        }
    }

    /// Delivers an error built by `make_err` to every currently registered
    /// hook. Used for faults that aren't scoped to a single request id,
    /// such as an unrecognised event kind found partway through a
    /// composite-event packet. Takes a factory rather than a value since
    /// [`ClientError`] isn't `Clone`.
    pub fn dispatch_error(&self, make_err: impl Fn() -> ClientError) {
        let hooks = self.hooks.lock().expect("event map lock poisoned");
        for hook in hooks.values() {
            hook.put(Err(make_err()));
        }
    }

    /// Removes and closes the hook for `request_id`, waking any blocked
    /// `get` with `None`. Used by `EventRequest.Clear`.
    pub fn clear(&self, request_id: RequestID) {
        if let Some(hook) = self.hooks.lock().expect("event map lock poisoned").remove(&request_id) {
            hook.close();
        }
    }

    /// Closes every still-registered hook; called when the owning session
    /// is torn down so blocked `get` callers don't hang forever.
    pub fn close_all(&self) {
        for hook in self.hooks.lock().expect("event map lock poisoned").values() {
            hook.close();
        }
    }
}
