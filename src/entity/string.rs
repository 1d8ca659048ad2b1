use std::sync::Arc;

use crate::error::ClientError;
use crate::lazy::Lazy;
use crate::protocol::commands::string_reference;
use crate::session::Session;

use super::object::Object;

/// A `String`-tagged object; `data` is the one attribute beyond what
/// `Object` already provides.
pub struct JavaString {
    pub object: Arc<Object>,
    data: Lazy<Arc<String>>,
}

impl JavaString {
    pub(crate) fn new(object: Arc<Object>) -> Self {
        JavaString {
            object,
            data: Lazy::default(),
        }
    }

    pub fn data(&self, session: &Session) -> Result<Arc<String>, ClientError> {
        self.data.get_or_load(|| {
            let value = session.dispatch(string_reference::Value::new(self.object.id))?;
            Ok(Arc::new(value))
        })
    }
}
