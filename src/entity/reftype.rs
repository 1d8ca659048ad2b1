use std::sync::Arc;

use crate::error::ClientError;
use crate::lazy::Lazy;
use crate::protocol::commands::reference_type;
use crate::protocol::{ReferenceTypeID, TypeTag};
use crate::session::Session;

pub struct Signature {
    pub jni: String,
    pub generic: String,
}

/// §4.4 RefType | jni, gen | 0x020d.
pub struct RefType {
    pub type_id: ReferenceTypeID,
    pub tag: TypeTag,
    signature: Lazy<Arc<Signature>>,
}

impl RefType {
    pub(crate) fn new(type_id: ReferenceTypeID, tag: TypeTag) -> Self {
        RefType {
            type_id,
            tag,
            signature: Lazy::default(),
        }
    }

    pub fn signature(&self, session: &Session) -> Result<Arc<Signature>, ClientError> {
        self.signature.get_or_load(|| {
            let reply: reference_type::SignatureWithGenericReply =
                session.dispatch(reference_type::SignatureWithGeneric::new(self.type_id))?;
            Ok(Arc::new(Signature {
                jni: reply.signature,
                generic: reply.generic_signature,
            }))
        })
    }
}
