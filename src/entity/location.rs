use std::sync::Arc;

use crate::error::ClientError;
use crate::protocol::{MethodID, ReferenceTypeID};
use crate::session::Session;

use super::class::Class;
use super::method::Method;
use super::slot::Slot;

/// A bytecode location: owning class, method, and code index. `code_index
/// == -1` denotes a native frame. Copy because it carries nothing but its
/// own key — identity for callers who need it comes from
/// [`Session::location`], which interns through a [`crate::pool::Pool`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Location {
    pub class_id: ReferenceTypeID,
    pub method_id: MethodID,
    pub code_index: i64,
}

impl Location {
    pub fn is_native(&self) -> bool {
        self.code_index < 0
    }

    pub fn method(&self, session: &Session) -> Result<Arc<Method>, ClientError> {
        session.method(self.class_id, self.method_id)
    }

    pub fn klass(&self, session: &Session) -> Result<Arc<Class>, ClientError> {
        session.class(self.class_id)
    }

    /// The method's slots whose range contains this location's code index;
    /// empty for a native location, without issuing any request.
    pub fn slots(&self, session: &Session) -> Result<Vec<Arc<Slot>>, ClientError> {
        if self.is_native() {
            return Ok(Vec::new());
        }
        let method = self.method(session)?;
        let slots = method.slots(session)?;
        Ok(slots.iter().filter(|slot| slot.contains(self.code_index)).cloned().collect())
    }
}
