//! A fake [`Transport`] that answers canned replies instead of talking to a
//! real VM, so the session/entity graph can be exercised without a JDWP
//! endpoint. Responses are queued per command id and popped in the order
//! tests enqueue them; a command with no queued response is a test bug, not
//! a runtime condition, so it panics loudly.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use jdwp::codec::IdSizes;
use jdwp::error::ClientError;
use jdwp::protocol::{CommandId, ErrorCode};
use jdwp::transport::Transport;

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub const ID_SIZES: IdSizes = IdSizes {
    field_id_size: 8,
    method_id_size: 8,
    object_id_size: 8,
    reference_type_id_size: 8,
    frame_id_size: 8,
};

#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<HashMap<CommandId, VecDeque<(ErrorCode, Vec<u8>)>>>,
    hook: Mutex<Option<(CommandId, Box<dyn Fn(&[u8]) + Send + Sync>)>>,
    requests: Mutex<HashMap<CommandId, Vec<u8>>>,
}

impl FakeTransport {
    pub fn stub(&self, command: CommandId, code: ErrorCode, body: Vec<u8>) {
        self.responses
            .lock()
            .unwrap()
            .entry(command)
            .or_default()
            .push_back((code, body));
    }

    pub fn stub_ok(&self, command: CommandId, body: Vec<u8>) {
        self.stub(command, ErrorCode::None, body);
    }

    /// Hands a composite-event packet body to whichever handler the session
    /// registered, as if it had just arrived off the wire.
    pub fn fire_event(&self, body: &[u8]) {
        let hook = self.hook.lock().unwrap();
        let (_, handler) = hook.as_ref().expect("no event hook registered");
        handler(body);
    }

    /// The payload most recently sent for `command`, for asserting the
    /// shape of an outgoing request.
    pub fn last_payload(&self, command: CommandId) -> Vec<u8> {
        self.requests
            .lock()
            .unwrap()
            .get(&command)
            .unwrap_or_else(|| panic!("command {command} was never sent"))
            .clone()
    }
}

impl Transport for FakeTransport {
    fn request(&self, command: CommandId, payload: Vec<u8>) -> Result<(ErrorCode, Vec<u8>), ClientError> {
        self.requests.lock().unwrap().insert(command, payload);
        let mut responses = self.responses.lock().unwrap();
        let queue = responses.get_mut(&command);
        match queue.and_then(VecDeque::pop_front) {
            Some(reply) => Ok(reply),
            None => panic!("no stubbed response for command {command}"),
        }
    }

    fn hook(&self, command: CommandId, handler: Box<dyn Fn(&[u8]) + Send + Sync>) {
        *self.hook.lock().unwrap() = Some((command, handler));
    }
}

/// Little-endian-free wire builders matching the encodings `JdwpWriter`
/// produces, for composing canned reply/event bodies by hand.
pub mod wire {
    pub fn u8(buf: &mut Vec<u8>, v: u8) {
        buf.push(v);
    }

    pub fn u32(buf: &mut Vec<u8>, v: u32) {
        buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn i32(buf: &mut Vec<u8>, v: i32) {
        buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn i64(buf: &mut Vec<u8>, v: i64) {
        buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn id(buf: &mut Vec<u8>, v: u64) {
        buf.extend_from_slice(&v.to_be_bytes());
    }

    pub fn string(buf: &mut Vec<u8>, s: &str) {
        let bytes = cesu8::to_java_cesu8(s);
        u32(buf, bytes.len() as u32);
        buf.extend_from_slice(&bytes);
    }
}
