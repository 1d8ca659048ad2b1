use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ClientError;
use crate::lazy::Lazy;
use crate::protocol::{ReferenceTypeID, TypeTag};
use crate::session::Session;

use super::method::Method;

/// The method-list loader group shared by every `Class::methods` call
/// (§4.4: Class | methodList, methodByJni, methodByName | 0x020F).
pub struct MethodIndex {
    pub list: Vec<Arc<Method>>,
    pub by_name: HashMap<String, Arc<Method>>,
    pub by_jni: HashMap<String, Arc<Method>>,
}

/// A loaded reference type. `tag`/`jni`/`gen`/`flags` arrive with the class
/// itself from `VM.AllClassesWithGeneric`, so unlike the method list they
/// need no separate loader — they're set once at construction.
pub struct Class {
    pub type_id: ReferenceTypeID,
    pub tag: TypeTag,
    pub jni: String,
    pub gen: String,
    pub flags: i32,
    methods: Lazy<Arc<MethodIndex>>,
}

impl Class {
    pub(crate) fn new(type_id: ReferenceTypeID, tag: TypeTag, jni: String, gen: String, flags: i32) -> Self {
        Class {
            type_id,
            tag,
            jni,
            gen,
            flags,
            methods: Lazy::default(),
        }
    }

    /// `jni="Ljava/lang/String;"` -> `"java.lang.String"`. Non-object
    /// descriptors (arrays, primitives) are returned unchanged.
    pub fn name(&self) -> String {
        derive_name(&self.jni)
    }

    pub fn methods(&self, session: &Session) -> Result<Arc<MethodIndex>, ClientError> {
        self.methods.get_or_load(|| session.load_methods(self.type_id))
    }
}

pub(crate) fn derive_name(jni: &str) -> String {
    match jni.strip_prefix('L').and_then(|rest| rest.strip_suffix(';')) {
        Some(inner) => inner.replace('/', "."),
        None => jni.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_derivation_strips_object_descriptor() {
        assert_eq!(derive_name("Ljava/lang/String;"), "java.lang.String");
    }

    #[test]
    fn name_derivation_leaves_array_descriptor_alone() {
        assert_eq!(derive_name("[I"), "[I");
    }
}
