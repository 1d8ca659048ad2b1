use std::sync::Arc;

use crate::error::ClientError;
use crate::lazy::Lazy;
use crate::protocol::commands::thread_reference;
use crate::protocol::ThreadID;
use crate::session::Session;

use super::frame::Frame;

pub struct Thread {
    pub id: ThreadID,
    name: Lazy<Arc<String>>,
}

impl Thread {
    pub(crate) fn new(id: ThreadID) -> Self {
        Thread {
            id,
            name: Lazy::default(),
        }
    }

    pub fn name(&self, session: &Session) -> Result<Arc<String>, ClientError> {
        self.name.get_or_load(|| {
            let name = session.dispatch(thread_reference::Name::new(self.id))?;
            Ok(Arc::new(name))
        })
    }

    pub fn suspend(&self, session: &Session) -> Result<(), ClientError> {
        session.dispatch(thread_reference::Suspend::new(self.id))
    }

    pub fn resume(&self, session: &Session) -> Result<(), ClientError> {
        session.dispatch(thread_reference::Resume::new(self.id))
    }

    pub fn frame_count(&self, session: &Session) -> Result<i32, ClientError> {
        session.dispatch(thread_reference::FrameCount::new(self.id))
    }

    /// Issues `ThreadReference.Frames` with `(tid, 0, -1)` — "all remaining
    /// frames" — and returns the interned, innermost-first snapshot.
    pub fn frames(&self, session: &Session) -> Result<Vec<Arc<Frame>>, ClientError> {
        session.load_frames(self.id)
    }
}
