use crate::protocol::{MethodID, ReferenceTypeID, Tag};

/// A local-variable binding valid over `[first_loc, first_loc + loc_length)`
/// inside one method. All fields arrive together from the parent method's
/// slot-table load (§9: `Slot.load_slot` resolves through the parent
/// `Method`'s loader, not a standalone per-slot request).
pub struct Slot {
    pub class_id: ReferenceTypeID,
    pub method_id: MethodID,
    pub index: i32,
    pub first_loc: i64,
    pub loc_length: i32,
    pub name: String,
    pub jni: String,
    pub gen: String,
}

impl Slot {
    /// The value tag this slot holds, derived from the first byte of its
    /// JNI signature.
    pub fn tag(&self) -> Option<Tag> {
        self.jni.as_bytes().first().copied().and_then(|b| Tag::try_from(b).ok())
    }

    pub fn contains(&self, code_index: i64) -> bool {
        self.first_loc <= code_index && code_index < self.first_loc + self.loc_length as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::JdwpId;

    fn slot(first_loc: i64, loc_length: i32) -> Slot {
        Slot {
            class_id: ReferenceTypeID::from_raw(1),
            method_id: MethodID::from_raw(1),
            index: 0,
            first_loc,
            loc_length,
            name: "x".into(),
            jni: "I".into(),
            gen: String::new(),
        }
    }

    #[test]
    fn contains_is_half_open() {
        let s = slot(10, 5);
        assert!(!s.contains(9));
        assert!(s.contains(10));
        assert!(s.contains(14));
        assert!(!s.contains(15));
    }
}
