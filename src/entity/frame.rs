use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::error::ClientError;
use crate::protocol::{FrameID, ThreadID, Value};
use crate::session::Session;

use super::location::Location;

/// A frame on a suspended thread's call stack. `loc`/`thread` are
/// refreshed on every `Thread::frames` call rather than set once — unlike
/// every other entity, a frame id can be reused by the VM across
/// suspend/resume cycles, so the pool's usual "construct once" identity
/// guarantee only covers the `FrameID` key, not these two attributes.
pub struct Frame {
    pub id: FrameID,
    loc: Mutex<Location>,
    thread: Mutex<ThreadID>,
}

impl Frame {
    pub(crate) fn new(id: FrameID, thread: ThreadID, loc: Location) -> Self {
        Frame {
            id,
            loc: Mutex::new(loc),
            thread: Mutex::new(thread),
        }
    }

    pub(crate) fn refresh(&self, thread: ThreadID, loc: Location) {
        *self.loc.lock().expect("frame lock poisoned") = loc;
        *self.thread.lock().expect("frame lock poisoned") = thread;
    }

    pub fn location(&self) -> Location {
        *self.loc.lock().expect("frame lock poisoned")
    }

    pub fn thread(&self) -> ThreadID {
        *self.thread.lock().expect("frame lock poisoned")
    }

    /// Local variable values keyed by slot name, resolved against the
    /// slots valid at this frame's current location. A native frame has no
    /// slots and returns an empty map without issuing a request. Not
    /// cached: a reused `FrameID` across suspend/resume cycles would
    /// otherwise serve stale locals, and the VM is the only source of
    /// truth for a live frame's current values.
    pub fn values(&self, session: &Session) -> Result<Arc<HashMap<String, Value>>, ClientError> {
        let loc = self.location();
        if loc.is_native() {
            return Ok(Arc::new(HashMap::new()));
        }
        session.load_frame_values(self.thread(), self.id, &loc)
    }
}
