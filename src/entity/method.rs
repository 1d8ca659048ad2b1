use std::collections::HashMap;
use std::sync::Arc;

use crate::error::ClientError;
use crate::lazy::Lazy;
use crate::protocol::{MethodID, ReferenceTypeID};
use crate::session::Session;

use super::location::Location;
use super::slot::Slot;

/// §4.4 Method | firstLoc, lastLoc, lineTable, lineLocs | 0x0601.
///
/// `line_locs` maps each line number back to the location of its first
/// instruction, the inverse lookup of `lines`.
pub struct LineTable {
    pub first_loc: i64,
    pub last_loc: i64,
    pub lines: Vec<(i64, i32)>,
    pub line_locs: HashMap<i32, Location>,
}

impl LineTable {
    /// Native methods report `firstLoc == lastLoc == -1` and an empty table.
    pub fn is_native(&self) -> bool {
        self.first_loc == -1 && self.last_loc == -1
    }
}

/// A method on a loaded class. `name`/`jni`/`gen`/`flags` arrive with the
/// class's method list (`Class::methods`), so only the line-table and
/// slot-table groups need their own loader here.
pub struct Method {
    pub class_id: ReferenceTypeID,
    pub method_id: MethodID,
    pub name: String,
    pub jni: String,
    pub gen: String,
    pub flags: i32,
    line_table: Lazy<Arc<LineTable>>,
    slots: Lazy<Arc<Vec<Arc<Slot>>>>,
}

impl Method {
    pub(crate) fn new(
        class_id: ReferenceTypeID,
        method_id: MethodID,
        name: String,
        jni: String,
        gen: String,
        flags: i32,
    ) -> Self {
        Method {
            class_id,
            method_id,
            name,
            jni,
            gen,
            flags,
            line_table: Lazy::default(),
            slots: Lazy::default(),
        }
    }

    pub fn line_table(&self, session: &Session) -> Result<Arc<LineTable>, ClientError> {
        self.line_table
            .get_or_load(|| session.load_line_table(self.class_id, self.method_id))
    }

    pub fn slots(&self, session: &Session) -> Result<Arc<Vec<Arc<Slot>>>, ClientError> {
        self.slots.get_or_load(|| session.load_slots(self.class_id, self.method_id))
    }
}
