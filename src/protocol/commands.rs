//! Command structs the core dispatches, one module per JDWP command set,
//! plus the composite-event wire decoder.

use std::io::{self, Read};

use jdwp_macros::jdwp_command;

use crate::codec::{JdwpReadable, JdwpReader, JdwpWritable};

use super::{
    FrameID, Location, MethodID, ModifierKind, ObjectID, ReferenceTypeID, RequestID,
    SuspendPolicy, Tag, ThreadID, TypeTag, Value,
};

/// VirtualMachine Command Set (1)
pub mod virtual_machine {
    use super::*;

    /// Returns reference types for all classes currently loaded by the
    /// target VM, including their generic signatures.
    #[jdwp_command(1, 20)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct AllClassesWithGeneric;

    #[derive(Debug, Clone, JdwpReadable)]
    pub struct GenericClass {
        pub tag: TypeTag,
        pub type_id: ReferenceTypeID,
        pub signature: String,
        pub generic_signature: String,
        pub status: i32,
    }

    pub type AllClassesWithGenericReply = Vec<GenericClass>;

    /// Suspends the entire target VM.
    #[jdwp_command((), 1, 8)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct Suspend;

    /// Resumes the target VM.
    #[jdwp_command((), 1, 9)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct Resume;

    /// Terminates the target VM with the given exit code.
    #[jdwp_command((), 1, 10)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct Exit {
        pub exit_code: i32,
    }

    /// Returns all running thread ids.
    #[jdwp_command(Vec<ThreadID>, 1, 4)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct AllThreads;

    /// Negotiates the identifier widths used for the rest of the session.
    #[jdwp_command(1, 7)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct IDSizes;

    #[derive(Debug, Copy, Clone, JdwpReadable)]
    pub struct IDSizesReply {
        pub field_id_size: u32,
        pub method_id_size: u32,
        pub object_id_size: u32,
        pub reference_type_id_size: u32,
        pub frame_id_size: u32,
    }
}

/// ReferenceType Command Set (2)
pub mod reference_type {
    use super::*;

    /// Returns information, including the generic signature, for each
    /// method in a reference type.
    #[jdwp_command(2, 15)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct MethodsWithGeneric {
        pub ref_type: ReferenceTypeID,
    }

    #[derive(Debug, Clone, JdwpReadable)]
    pub struct MethodWithGeneric {
        pub method_id: MethodID,
        pub name: String,
        pub signature: String,
        pub generic_signature: String,
        pub mod_bits: i32,
    }

    pub type MethodsWithGenericReply = Vec<MethodWithGeneric>;

    /// Returns the JNI signature and generic signature of a reference type.
    #[jdwp_command(2, 13)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct SignatureWithGeneric {
        pub ref_type: ReferenceTypeID,
    }

    #[derive(Debug, Clone, JdwpReadable)]
    pub struct SignatureWithGenericReply {
        pub signature: String,
        pub generic_signature: String,
    }
}

/// Method Command Set (6)
pub mod method {
    use super::*;

    /// Returns line number information, if present, for a method.
    #[jdwp_command(6, 1)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct LineTable {
        pub ref_type: ReferenceTypeID,
        pub method_id: MethodID,
    }

    #[derive(Debug, Clone, JdwpReadable)]
    pub struct Line {
        pub line_code_index: i64,
        pub line_number: i32,
    }

    #[derive(Debug, Clone, JdwpReadable)]
    pub struct LineTableReply {
        pub start: i64,
        pub end: i64,
        pub lines: Vec<Line>,
    }

    /// Returns variable information, with generic signatures, for a method.
    #[jdwp_command(6, 5)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct VariableTableWithGeneric {
        pub ref_type: ReferenceTypeID,
        pub method_id: MethodID,
    }

    #[derive(Debug, Clone, JdwpReadable)]
    pub struct VariableWithGeneric {
        pub code_index: i64,
        pub name: String,
        pub signature: String,
        pub generic_signature: String,
        pub length: i32,
        pub slot: i32,
    }

    #[derive(Debug, Clone, JdwpReadable)]
    pub struct VariableTableWithGenericReply {
        pub arg_cnt: i32,
        pub slots: Vec<VariableWithGeneric>,
    }
}

/// ObjectReference Command Set (9)
pub mod object_reference {
    use super::*;

    /// Returns the runtime reference type of an object.
    #[jdwp_command(9, 1)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct ReferenceType {
        pub object: ObjectID,
    }

    #[derive(Debug, Copy, Clone, JdwpReadable)]
    pub struct ReferenceTypeReply {
        pub tag: TypeTag,
        pub type_id: ReferenceTypeID,
    }
}

/// StringReference Command Set (10)
pub mod string_reference {
    use super::*;

    /// Returns the characters contained in the string.
    #[jdwp_command(String, 10, 1)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct Value {
        pub string_object: ObjectID,
    }
}

/// ThreadReference Command Set (11)
pub mod thread_reference {
    use super::*;

    /// Returns the thread name.
    #[jdwp_command(String, 11, 1)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct Name {
        pub thread: ThreadID,
    }

    /// Suspends a single thread; suspend counts nest.
    #[jdwp_command((), 11, 2)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct Suspend {
        pub thread: ThreadID,
    }

    /// Resumes a single thread, decrementing its suspend count.
    #[jdwp_command((), 11, 3)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct Resume {
        pub thread: ThreadID,
    }

    /// Returns the current call stack of a suspended thread, innermost
    /// frame first.
    #[jdwp_command(11, 6)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct Frames {
        pub thread: ThreadID,
        pub start_frame: i32,
        /// `-1` means "all remaining frames".
        pub length: i32,
    }

    #[derive(Debug, Clone, JdwpReadable)]
    pub struct FrameInfo {
        pub frame_id: FrameID,
        pub location: Location,
    }

    pub type FramesReply = Vec<FrameInfo>;

    /// Returns the number of frames on a suspended thread's stack.
    #[jdwp_command(i32, 11, 7)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct FrameCount {
        pub thread: ThreadID,
    }
}

/// StackFrame Command Set (16)
pub mod stack_frame {
    use super::*;

    #[derive(Debug, Copy, Clone, JdwpWritable)]
    pub struct SlotRequest {
        pub slot: i32,
        pub sig_byte: Tag,
    }

    /// Returns the value of one or more local variables in a frame.
    #[jdwp_command(16, 1)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct GetValues {
        pub thread: ThreadID,
        pub frame: FrameID,
        pub slots: Vec<SlotRequest>,
    }

    pub type GetValuesReply = Vec<Value>;
}

/// EventRequest Command Set (15)
pub mod event_request {
    use super::*;

    /// A filter attached to an event request. Only the two modifiers the
    /// core installs are represented.
    #[derive(Debug, Clone, Copy, JdwpWritable)]
    #[repr(u8)]
    pub enum Modifier {
        ClassOnly(ReferenceTypeID) = ModifierKind::ClassOnly as u8,
        LocationOnly(Location) = ModifierKind::LocationOnly as u8,
    }

    /// The event kinds the core can install a request for.
    #[derive(Debug, Copy, Clone)]
    #[repr(u8)]
    pub enum EventKind {
        MethodEntry = 40,
    }

    impl JdwpWritable for EventKind {
        fn write<W: std::io::Write>(
            &self,
            write: &mut crate::codec::JdwpWriter<W>,
        ) -> io::Result<()> {
            (*self as u8).write(write)
        }
    }

    /// Installs an event request and returns the id the VM assigned it.
    #[jdwp_command(RequestID, 15, 1)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct Set<'a> {
        pub event_kind: EventKind,
        pub suspend_policy: SuspendPolicy,
        pub modifiers: &'a [Modifier],
    }

    /// Removes a previously installed event request.
    #[jdwp_command((), 15, 2)]
    #[derive(Debug, Clone, JdwpWritable)]
    pub struct Clear {
        pub event_kind: EventKind,
        pub request_id: RequestID,
    }
}

/// Event decoding for the composite-event packet (command set 64, command
/// 100), delivered out of band of the request/reply correlation.
pub mod event {
    use super::*;

    /// A single decoded event. Only `MethodEntry` is registered; any other
    /// event-kind byte is a protocol error surfaced by
    /// [`decode_composite`]'s `unrecognized` field.
    #[derive(Debug, Clone)]
    pub enum Event {
        MethodEntry {
            request_id: RequestID,
            thread: ThreadID,
            location: Location,
        },
    }

    impl Event {
        pub fn request_id(&self) -> RequestID {
            match self {
                Event::MethodEntry { request_id, .. } => *request_id,
            }
        }
    }

    fn decode_one<R: Read>(kind: u8, read: &mut JdwpReader<R>) -> io::Result<Option<Event>> {
        Ok(match kind {
            40 => Some(Event::MethodEntry {
                request_id: RequestID::read(read)?,
                thread: ThreadID::read(read)?,
                location: Location::read(read)?,
            }),
            _ => None,
        })
    }

    #[derive(Debug, Clone)]
    pub struct CompositeEvents {
        pub suspend_policy: SuspendPolicy,
        pub events: Vec<Event>,
        /// Set when an unregistered event-kind byte was seen; decoding of
        /// the remainder of the packet stops at that point since its
        /// layout is unknown, but the events already collected above are
        /// valid and were decoded in VM emission order.
        pub unrecognized: Option<u8>,
    }

    /// Decodes a composite-event packet body (everything after the 11-byte
    /// packet header has already been stripped by the transport).
    pub fn decode_composite<R: Read>(read: &mut JdwpReader<R>) -> io::Result<CompositeEvents> {
        let suspend_policy = SuspendPolicy::read(read)?;
        let count = i32::read(read)?;
        let mut events = Vec::with_capacity(count.max(0) as usize);
        let mut unrecognized = None;
        for _ in 0..count {
            let kind = u8::read(read)?;
            match decode_one(kind, read)? {
                Some(event) => events.push(event),
                None => {
                    unrecognized = Some(kind);
                    break;
                }
            }
        }
        Ok(CompositeEvents {
            suspend_policy,
            events,
            unrecognized,
        })
    }
}
