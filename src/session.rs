//! The top-level coordinator (§4.7): owns the transport, the negotiated id
//! widths, every entity pool, and the event map. Constructing a `Session`
//! performs the JDWP handshake and negotiates id widths before any other
//! command may be issued.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, error, warn};

use crate::codec::{IdSizes, JdwpReader};
use crate::config::ConnectConfig;
use crate::entity::{self, Class, Frame, JavaString, LineTable, Method, MethodIndex, Object, RefType, Slot, Thread};
use crate::error::ClientError;
use crate::hook::{EventMap, Hook};
use crate::lazy::Lazy;
use crate::pool::Pool;
use crate::protocol::commands::{event, event_request, method, object_reference, reference_type, stack_frame, string_reference, thread_reference, virtual_machine};
use crate::protocol::{Command, ErrorCode, FrameID, JdwpId, MethodID, ObjectID, ReferenceTypeID, RequestID, SuspendPolicy, ThreadID, Value, COMPOSITE_EVENT};
use crate::transport::{self, TcpTransport, Transport};

/// The Session-wide loader group behind `Session::classes` (§4.4: Session |
/// classList, classByJni | 0x0114).
pub struct ClassIndex {
    pub list: Vec<Arc<Class>>,
    pub by_jni: HashMap<String, Arc<Class>>,
}

pub struct Session {
    transport: Arc<dyn Transport>,
    id_sizes: IdSizes,
    events: Arc<EventMap>,
    classes: Pool<ReferenceTypeID, Class>,
    methods: Pool<(ReferenceTypeID, MethodID), Method>,
    reftypes: Pool<ReferenceTypeID, RefType>,
    objects: Pool<ObjectID, Object>,
    strings: Pool<ObjectID, JavaString>,
    threads: Pool<ThreadID, Thread>,
    frames: Pool<FrameID, Frame>,
    locations: Pool<(ReferenceTypeID, MethodID, i64), entity::Location>,
    slots: Pool<(ReferenceTypeID, MethodID, i32), Slot>,
    class_index: Lazy<Arc<ClassIndex>>,
}

impl Session {
    /// Dials `config`, negotiates id widths via `VM.IDSizes`, and installs
    /// the composite-event hook. No other command is issued until the
    /// widths are known.
    pub fn connect(config: &ConnectConfig) -> Result<Arc<Session>, ClientError> {
        let transport = TcpTransport::connect(config)?;
        Session::from_transport(transport as Arc<dyn Transport>)
    }

    /// Builds a session over an already-established [`Transport`],
    /// negotiating id widths and installing the event hook exactly as
    /// [`Session::connect`] does. Exposed so tests can drive the core
    /// against an in-process fake transport instead of a live socket.
    pub fn from_transport(transport: Arc<dyn Transport>) -> Result<Arc<Session>, ClientError> {
        let bootstrap = Session {
            transport,
            id_sizes: IdSizes::default(),
            events: Arc::new(EventMap::default()),
            classes: Pool::default(),
            methods: Pool::default(),
            reftypes: Pool::default(),
            objects: Pool::default(),
            strings: Pool::default(),
            threads: Pool::default(),
            frames: Pool::default(),
            locations: Pool::default(),
            slots: Pool::default(),
            class_index: Lazy::default(),
        };

        debug!("negotiating id sizes");
        let sizes: virtual_machine::IDSizesReply = bootstrap.dispatch(virtual_machine::IDSizes)?;
        let id_sizes = IdSizes {
            field_id_size: sizes.field_id_size,
            method_id_size: sizes.method_id_size,
            object_id_size: sizes.object_id_size,
            reference_type_id_size: sizes.reference_type_id_size,
            frame_id_size: sizes.frame_id_size,
        };

        let session = Arc::new(Session { id_sizes, ..bootstrap });
        session.install_event_hook();
        Ok(session)
    }

    fn install_event_hook(self: &Arc<Self>) {
        let events = self.events.clone();
        let id_sizes = self.id_sizes;
        self.transport.hook(
            COMPOSITE_EVENT,
            Box::new(move |body: &[u8]| {
                let mut reader = JdwpReader::new(body, id_sizes);
                match event::decode_composite(&mut reader) {
                    Ok(composite) => {
                        let delivered = composite.events.len();
                        for evt in composite.events {
                            events.dispatch(evt);
                        }
                        if let Some(kind) = composite.unrecognized {
                            warn!(
                                "composite event carried unrecognised event kind {kind:#x}; \
                                 {delivered} event(s) earlier in the same packet were still delivered"
                            );
                            events.dispatch_error(|| ClientError::Request(kind as u16));
                        }
                    }
                    Err(e) => error!("failed to decode composite event packet: {e}"),
                }
            }),
        );
    }

    /// Encodes, sends and decodes a single command/reply round trip.
    pub fn dispatch<C: Command>(&self, command: C) -> Result<C::Output, ClientError> {
        let payload = transport::encode_payload(&command, self.id_sizes)?;
        let (code, body) = self.transport.request(C::ID, payload)?;
        if code != ErrorCode::None {
            warn!("{} replied with {code}", C::ID);
            return Err(ClientError::Request(code as u16));
        }
        transport::decode_reply(&body, self.id_sizes).map_err(ClientError::from)
    }

    pub fn suspend(&self) -> Result<(), ClientError> {
        self.dispatch(virtual_machine::Suspend)
    }

    pub fn resume(&self) -> Result<(), ClientError> {
        self.dispatch(virtual_machine::Resume)
    }

    pub fn exit(&self, exit_code: i32) -> Result<(), ClientError> {
        self.dispatch(virtual_machine::Exit::new(exit_code))
    }

    pub fn all_threads(&self) -> Result<Vec<Arc<Thread>>, ClientError> {
        let ids: Vec<ThreadID> = self.dispatch(virtual_machine::AllThreads)?;
        Ok(ids.into_iter().map(|id| self.threads.get_or_insert(id, Thread::new)).collect())
    }

    /// `classes(None)` returns the full class list; `classes(Some(jni))`
    /// returns the entries whose signature matches exactly, using the
    /// cached `classByJni` index.
    pub fn classes(&self, jni_filter: Option<&str>) -> Result<Vec<Arc<Class>>, ClientError> {
        let index = self.class_index.get_or_load(|| self.load_class_index())?;
        Ok(match jni_filter {
            Some(jni) => index.by_jni.get(jni).cloned().into_iter().collect(),
            None => index.list.clone(),
        })
    }

    fn load_class_index(&self) -> Result<Arc<ClassIndex>, ClientError> {
        debug!("loading class list");
        let reply: virtual_machine::AllClassesWithGenericReply = self.dispatch(virtual_machine::AllClassesWithGeneric)?;
        let mut list = Vec::with_capacity(reply.len());
        let mut by_jni = HashMap::with_capacity(reply.len());
        for entry in reply {
            let virtual_machine::GenericClass { tag, type_id, signature, generic_signature, status } = entry;
            let jni_key = signature.clone();
            let class = self
                .classes
                .get_or_insert(type_id, |_| Class::new(type_id, tag, signature, generic_signature, status));
            by_jni.insert(jni_key, class.clone());
            list.push(class);
        }
        Ok(Arc::new(ClassIndex { list, by_jni }))
    }

    pub fn class(&self, type_id: ReferenceTypeID) -> Result<Arc<Class>, ClientError> {
        if let Some(class) = self.classes.get(&type_id) {
            return Ok(class);
        }
        self.load_class_index()?;
        self.classes
            .get(&type_id)
            .ok_or(ClientError::Request(ErrorCode::InvalidClass as u16))
    }

    pub fn method(&self, class_id: ReferenceTypeID, method_id: MethodID) -> Result<Arc<Method>, ClientError> {
        let key = (class_id, method_id);
        if let Some(method) = self.methods.get(&key) {
            return Ok(method);
        }
        let class = self.class(class_id)?;
        class.methods(self)?;
        self.methods
            .get(&key)
            .ok_or(ClientError::Request(ErrorCode::InvalidMethodid as u16))
    }

    pub(crate) fn load_methods(&self, type_id: ReferenceTypeID) -> Result<Arc<MethodIndex>, ClientError> {
        debug!("loading methods for class {type_id:?}");
        let reply: reference_type::MethodsWithGenericReply =
            self.dispatch(reference_type::MethodsWithGeneric::new(type_id))?;
        let mut list = Vec::with_capacity(reply.len());
        let mut by_name = HashMap::with_capacity(reply.len());
        let mut by_jni = HashMap::with_capacity(reply.len());
        for entry in reply {
            let reference_type::MethodWithGeneric { method_id, name, signature, generic_signature, mod_bits } = entry;
            let name_key = name.clone();
            let jni_key = signature.clone();
            let method = self.methods.get_or_insert((type_id, method_id), |_| {
                Method::new(type_id, method_id, name, signature, generic_signature, mod_bits)
            });
            by_name.insert(name_key, method.clone());
            by_jni.insert(jni_key, method.clone());
            list.push(method);
        }
        Ok(Arc::new(MethodIndex { list, by_name, by_jni }))
    }

    pub(crate) fn load_line_table(&self, class_id: ReferenceTypeID, method_id: MethodID) -> Result<Arc<LineTable>, ClientError> {
        let reply: method::LineTableReply = self.dispatch(method::LineTable::new(class_id, method_id))?;
        let mut lines = Vec::with_capacity(reply.lines.len());
        let mut line_locs = HashMap::with_capacity(reply.lines.len());
        for line in reply.lines {
            lines.push((line.line_code_index, line.line_number));
            line_locs.insert(
                line.line_number,
                entity::Location { class_id, method_id, code_index: line.line_code_index },
            );
        }
        Ok(Arc::new(LineTable { first_loc: reply.start, last_loc: reply.end, lines, line_locs }))
    }

    pub(crate) fn load_slots(&self, class_id: ReferenceTypeID, method_id: MethodID) -> Result<Arc<Vec<Arc<Slot>>>, ClientError> {
        let reply: method::VariableTableWithGenericReply =
            self.dispatch(method::VariableTableWithGeneric::new(class_id, method_id))?;
        let slots = reply
            .slots
            .into_iter()
            .map(|v| {
                self.slots.get_or_insert((class_id, method_id, v.slot), |_| Slot {
                    class_id,
                    method_id,
                    index: v.slot,
                    first_loc: v.code_index,
                    loc_length: v.length,
                    name: v.name,
                    jni: v.signature,
                    gen: v.generic_signature,
                })
            })
            .collect();
        Ok(Arc::new(slots))
    }

    pub(crate) fn load_reference_type(&self, object_id: ObjectID) -> Result<Arc<RefType>, ClientError> {
        let reply: object_reference::ReferenceTypeReply = self.dispatch(object_reference::ReferenceType::new(object_id))?;
        Ok(self.reftypes.get_or_insert(reply.type_id, |id| RefType::new(id, reply.tag)))
    }

    pub(crate) fn load_frames(&self, thread: ThreadID) -> Result<Vec<Arc<Frame>>, ClientError> {
        debug!("loading frames for thread {thread:?}");
        let reply: thread_reference::FramesReply = self.dispatch(thread_reference::Frames::new(thread, 0, -1))?;
        Ok(reply
            .into_iter()
            .map(|info| {
                let loc = *self.location(info.location.reference_id, info.location.method_id, info.location.index);
                let frame = self.frames.get_or_insert(info.frame_id, |id| Frame::new(id, thread, loc));
                frame.refresh(thread, loc);
                frame
            })
            .collect())
    }

    pub(crate) fn load_frame_values(
        &self,
        thread: ThreadID,
        frame: FrameID,
        loc: &entity::Location,
    ) -> Result<Arc<HashMap<String, Value>>, ClientError> {
        let slots = loc.slots(self)?;
        let requests: Vec<stack_frame::SlotRequest> = slots
            .iter()
            .filter_map(|slot| slot.tag().map(|tag| stack_frame::SlotRequest { slot: slot.index, sig_byte: tag }))
            .collect();
        let reply: stack_frame::GetValuesReply = self.dispatch(stack_frame::GetValues::new(thread, frame, requests))?;
        let mut map = HashMap::with_capacity(slots.len());
        for (slot, value) in slots.iter().zip(reply) {
            map.insert(slot.name.clone(), value);
        }
        Ok(Arc::new(map))
    }

    /// Interns a location by key, giving every caller the same instance
    /// for the same `(class, method, code_index)` triple.
    pub fn location(&self, class_id: ReferenceTypeID, method_id: MethodID, code_index: i64) -> Arc<entity::Location> {
        self.locations
            .get_or_insert((class_id, method_id, code_index), |_| entity::Location { class_id, method_id, code_index })
    }

    /// Direct construction: `id == 0` is a usage error (scenario 6).
    pub fn object(&self, id: ObjectID) -> Result<Arc<Object>, ClientError> {
        if id.raw() == 0 {
            return Err(ClientError::Void);
        }
        Ok(self.objects.get_or_insert(id, |id| Object::new(id).expect("id checked non-zero")))
    }

    /// Value-decode path: `id == 0` is the null sentinel, not an error.
    pub fn resolve_object(&self, id: ObjectID) -> Option<Arc<Object>> {
        if id.raw() == 0 {
            return None;
        }
        Some(self.objects.get_or_insert(id, |id| Object::new(id).expect("id checked non-zero")))
    }

    pub fn string(&self, id: ObjectID) -> Result<Arc<JavaString>, ClientError> {
        let object = self.object(id)?;
        Ok(self.strings.get_or_insert(id, |_| JavaString::new(object)))
    }

    /// Installs a MethodEntry event on `location` (§4.6: kind 40, a single
    /// `LocationOnly` modifier). Always installed with `EventThread` suspend
    /// policy, matching the original's hardcoded `SP_THREAD`: only the
    /// thread that hit the event stops, so other threads keep running while
    /// the hook is drained.
    pub fn watch_location(&self, location: &entity::Location) -> Result<Arc<Hook>, ClientError> {
        let klass = location.klass(self)?;
        let wire_location = crate::protocol::Location {
            tag: klass.tag,
            reference_id: location.class_id,
            method_id: location.method_id,
            index: location.code_index,
        };
        let modifiers = [event_request::Modifier::LocationOnly(wire_location)];
        debug!("installing location hook on {wire_location:?}");
        let request_id: RequestID = self.dispatch(event_request::Set::new(
            event_request::EventKind::MethodEntry,
            SuspendPolicy::EventThread,
            &modifiers,
        ))?;
        Ok(self.events.register(request_id, None))
    }

    /// Installs a MethodEntry event on every method of `class` (§4.6: kind
    /// 40, a single `ClassOnly` modifier). See [`Session::watch_location`]
    /// for why the suspend policy is fixed rather than caller-supplied.
    pub fn watch_class(&self, class: &Class) -> Result<Arc<Hook>, ClientError> {
        let modifiers = [event_request::Modifier::ClassOnly(class.type_id)];
        debug!("installing class hook on {:?}", class.type_id);
        let request_id: RequestID = self.dispatch(event_request::Set::new(
            event_request::EventKind::MethodEntry,
            SuspendPolicy::EventThread,
            &modifiers,
        ))?;
        Ok(self.events.register(request_id, None))
    }

    /// Issues `EventRequest.Clear` and removes the hook from the event map
    /// under its lock, per §9 (the historical source's broken `Hook.clear`
    /// is not replicated).
    pub fn clear_hook(&self, request_id: RequestID) -> Result<(), ClientError> {
        self.dispatch(event_request::Clear::new(event_request::EventKind::MethodEntry, request_id))?;
        self.events.clear(request_id);
        Ok(())
    }

    /// Unblocks every outstanding `Hook::get` with a cancellation error.
    /// Dropping the `Session` already drops the transport, which tears
    /// down the reader thread; this additionally releases hook waiters
    /// that aren't themselves blocked on a `request`.
    pub fn close(&self) {
        self.events.close_all();
    }
}
