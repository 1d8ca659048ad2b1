use std::sync::Arc;

use crate::error::ClientError;
use crate::lazy::Lazy;
use crate::protocol::{JdwpId, ObjectID};
use crate::session::Session;

use super::reftype::RefType;

/// §4.4 Object | reftype | 0x0901.
///
/// `id == 0` never names a live object. Direct construction rejects it
/// (scenario 6); decoding a reference-flavoured [`crate::protocol::Value`]
/// of 0 instead yields `None` through [`Session::resolve_object`].
pub struct Object {
    pub id: ObjectID,
    reftype: Lazy<Arc<RefType>>,
}

impl Object {
    pub(crate) fn new(id: ObjectID) -> Result<Self, ClientError> {
        if id.raw() == 0 {
            return Err(ClientError::Void);
        }
        Ok(Object {
            id,
            reftype: Lazy::default(),
        })
    }

    pub fn reference_type(&self, session: &Session) -> Result<Arc<RefType>, ClientError> {
        self.reftype.get_or_load(|| session.load_reference_type(self.id))
    }
}
