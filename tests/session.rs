mod common;

use std::sync::Arc;

use jdwp::error::ClientError;
use jdwp::protocol::commands::thread_reference::{FrameCount, Frames};
use jdwp::protocol::commands::virtual_machine::{AllClassesWithGeneric, AllThreads, IDSizes};
use jdwp::protocol::{Command, CommandId, JdwpId, ObjectID, SuspendPolicy};
use jdwp::session::Session;
use jdwp::transport::Transport;

use common::{init_logger, wire, FakeTransport, ID_SIZES};

fn id_sizes_body() -> Vec<u8> {
    let mut body = Vec::new();
    wire::u32(&mut body, ID_SIZES.field_id_size);
    wire::u32(&mut body, ID_SIZES.method_id_size);
    wire::u32(&mut body, ID_SIZES.object_id_size);
    wire::u32(&mut body, ID_SIZES.reference_type_id_size);
    wire::u32(&mut body, ID_SIZES.frame_id_size);
    body
}

fn connect() -> (Arc<FakeTransport>, Arc<Session>) {
    init_logger();
    let transport = Arc::new(FakeTransport::default());
    transport.stub_ok(IDSizes::ID, id_sizes_body());
    let session = Session::from_transport(transport.clone() as Arc<dyn Transport>).expect("handshake");
    (transport, session)
}

fn class_entry(buf: &mut Vec<u8>, type_id: u64, jni: &str) {
    wire::u8(buf, 1); // TypeTag::Class
    wire::id(buf, type_id);
    wire::string(buf, jni);
    wire::string(buf, "");
    wire::i32(buf, 0); // status
}

/// Scenario 1: the class list is cached after the first load, and filtering
/// by JNI signature uses the same cached index rather than reissuing the
/// command.
#[test]
fn classes_loads_once_and_filters_by_jni() {
    let (transport, session) = connect();

    let mut body = Vec::new();
    wire::u32(&mut body, 2);
    class_entry(&mut body, 1, "Ljava/lang/String;");
    class_entry(&mut body, 2, "Ljava/lang/Object;");
    transport.stub_ok(AllClassesWithGeneric::ID, body);

    let all = session.classes(None).expect("first load");
    assert_eq!(all.len(), 2);

    // No further response is stubbed for AllClassesWithGeneric; a second
    // call reissuing the command would panic inside FakeTransport.
    let filtered = session.classes(Some("Ljava/lang/Object;")).expect("cached lookup");
    assert_eq!(filtered.len(), 1);
    assert_eq!(filtered[0].name(), "java.lang.Object");

    let none = session.classes(Some("Lnot/a/class;")).expect("cached lookup");
    assert!(none.is_empty());
}

/// Scenario 2: `Thread::frames` issues `ThreadReference.Frames` with
/// `(tid, 0, -1)` — "all remaining frames, innermost first" — and interns
/// the resulting frames.
#[test]
fn thread_frames_requests_all_remaining_frames() {
    let (transport, session) = connect();

    transport.stub_ok(AllThreads::ID, {
        let mut body = Vec::new();
        wire::u32(&mut body, 1);
        wire::id(&mut body, 7);
        body
    });
    let threads = session.all_threads().expect("all threads");
    let thread = &threads[0];

    let mut body = Vec::new();
    wire::u32(&mut body, 1);
    wire::id(&mut body, 100); // frame id
    wire::u8(&mut body, 1); // location tag: Class
    wire::id(&mut body, 5); // reference type id
    wire::id(&mut body, 9); // method id
    wire::i64(&mut body, 3); // code index
    transport.stub_ok(Frames::ID, body);

    let frames = thread.frames(&session).expect("frames");
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].thread(), thread.id);
    let loc = frames[0].location();
    assert_eq!(loc.class_id, jdwp::protocol::ReferenceTypeID::from_raw(5));
    assert_eq!(loc.code_index, 3);

    // thread id (8 bytes) + start_frame (i32) + length (i32), per (tid, 0, -1).
    let sent = transport.last_payload(Frames::ID);
    assert_eq!(sent.len(), 16);
    assert_eq!(u64::from_be_bytes(sent[0..8].try_into().unwrap()), 7);
    assert_eq!(i32::from_be_bytes(sent[8..12].try_into().unwrap()), 0);
    assert_eq!(i32::from_be_bytes(sent[12..16].try_into().unwrap()), -1);

    transport.stub_ok(FrameCount::ID, {
        let mut body = Vec::new();
        wire::i32(&mut body, 1);
        body
    });
    assert_eq!(thread.frame_count(&session).unwrap(), 1);
}

/// Scenario 4: installing a location hook and then observing a matching
/// composite event delivers it to that hook's mailbox.
#[test]
fn location_hook_receives_matching_event() {
    let (transport, session) = connect();

    let mut classes_body = Vec::new();
    wire::u32(&mut classes_body, 1);
    class_entry(&mut classes_body, 5, "Lcom/example/Target;");
    transport.stub_ok(AllClassesWithGeneric::ID, classes_body);

    let location = session.location(
        jdwp::protocol::ReferenceTypeID::from_raw(5),
        jdwp::protocol::MethodID::from_raw(9),
        0,
    );

    transport.stub_ok(CommandId::new(15, 1), {
        let mut body = Vec::new();
        wire::i32(&mut body, 77); // request id
        body
    });
    let hook = session.watch_location(&location).expect("install hook");

    let mut event_body = Vec::new();
    wire::u8(&mut event_body, SuspendPolicy::EventThread as u8);
    wire::i32(&mut event_body, 1);
    wire::u8(&mut event_body, 40); // MethodEntry
    wire::i32(&mut event_body, 77); // request id
    wire::id(&mut event_body, 42); // thread
    wire::u8(&mut event_body, 1); // location tag
    wire::id(&mut event_body, 5);
    wire::id(&mut event_body, 9);
    wire::i64(&mut event_body, 0);
    transport.fire_event(&event_body);

    let event = hook.get(None).expect("event delivered").expect("event decoded cleanly");
    assert_eq!(event.request_id(), jdwp::protocol::RequestID::new(77));
}

/// Scenario 5: a composite event carrying an unrecognised event kind still
/// delivers the events that preceded it in the same packet.
#[test]
fn unrecognized_event_kind_does_not_drop_earlier_events() {
    let (transport, session) = connect();

    transport.stub_ok(CommandId::new(15, 1), {
        let mut body = Vec::new();
        wire::i32(&mut body, 3);
        body
    });
    let mut classes_body = Vec::new();
    wire::u32(&mut classes_body, 1);
    class_entry(&mut classes_body, 11, "Lcom/example/Other;");
    transport.stub_ok(AllClassesWithGeneric::ID, classes_body);
    let class = session.classes(Some("Lcom/example/Other;")).unwrap().remove(0);
    let hook = session.watch_class(&class).expect("install hook");

    let mut body = Vec::new();
    wire::u8(&mut body, SuspendPolicy::EventThread as u8);
    wire::i32(&mut body, 2);
    wire::u8(&mut body, 40);
    wire::i32(&mut body, 3);
    wire::id(&mut body, 1);
    wire::u8(&mut body, 1);
    wire::id(&mut body, 11);
    wire::id(&mut body, 1);
    wire::i64(&mut body, 0);
    wire::u8(&mut body, 200); // unrecognised kind; decoding stops here
    transport.fire_event(&body);

    let event = hook
        .get(None)
        .expect("first event still delivered")
        .expect("first event decoded cleanly");
    assert_eq!(event.request_id(), jdwp::protocol::RequestID::new(3));

    let err = hook
        .get(Some(std::time::Duration::from_millis(100)))
        .expect("unrecognised-kind error delivered")
        .expect_err("unrecognised kind surfaces as an error, not an event");
    assert!(matches!(err, ClientError::Request(0xc8)));
}

/// Scenario 6: object id 0 is a usage error through the direct constructor,
/// but the null sentinel through value-decode resolution.
#[test]
fn object_id_zero_is_rejected_but_resolves_to_none() {
    let (_transport, session) = connect();

    let zero = ObjectID::from_raw(0);
    assert!(matches!(session.object(zero), Err(ClientError::Void)));
    assert!(session.resolve_object(zero).is_none());
}
